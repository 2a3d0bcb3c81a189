//! The reference catalog: read-mostly lookup tables consulted by both
//! engines (spec §4.1, §5, §9).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::catalog::age_band::AgeBandMultiplier;
use crate::catalog::benefit_configuration::BenefitConfiguration;
use crate::catalog::product_template::ProductTemplate;
use crate::catalog::rate_table::RateTable;
use crate::catalog::tc_factor::{TcFactor, TcFactorOption};
use crate::error::{EngineError, EngineResult};
use crate::types::{BenefitCategory, RatingGender};

/// Read-mostly collection of product templates, age bands, T&C factors,
/// rate tables and benefit configurations.
///
/// Treated as immutable at runtime: consumers hold an `Arc` snapshot and a
/// reload swaps the whole catalog in under [`CatalogHandle`], so existing
/// policy selections (which store only string keys, never object
/// references) are never invalidated by a reload (spec §9).
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    templates: Vec<ProductTemplate>,
    age_bands: Vec<AgeBandMultiplier>,
    tc_factors: Vec<TcFactor>,
    tc_factor_options: HashMap<String, Vec<TcFactorOption>>,
    rate_tables: HashMap<String, RateTable>,
    benefit_configurations: HashMap<String, BenefitConfiguration>,
}

impl ReferenceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_template(&mut self, template: ProductTemplate) {
        self.templates.push(template);
    }

    pub fn add_age_band(&mut self, band: AgeBandMultiplier) {
        self.age_bands.push(band);
    }

    pub fn add_tc_factor(&mut self, factor: TcFactor, options: Vec<TcFactorOption>) -> EngineResult<()> {
        crate::catalog::tc_factor::validate_at_most_one_default(&options)?;
        self.tc_factor_options.insert(factor.factor_code.clone(), options);
        self.tc_factors.push(factor);
        Ok(())
    }

    pub fn add_rate_table(&mut self, table: RateTable) {
        self.rate_tables.insert(table.rate_code.clone(), table);
    }

    pub fn add_benefit_configuration(&mut self, config: BenefitConfiguration) {
        self.benefit_configurations.insert(config.benefit_code.clone(), config);
    }

    /// Template for `category` effective on `as_of` (spec §4.2). Returns
    /// the first match; catalog builders are expected to avoid overlapping
    /// effective windows for the same category.
    pub fn template_for_category(
        &self,
        category: BenefitCategory,
        as_of: NaiveDate,
    ) -> Option<&ProductTemplate> {
        self.templates
            .iter()
            .find(|t| t.category == category && t.is_effective_on(as_of))
    }

    pub fn template(&self, template_code: &str) -> Option<&ProductTemplate> {
        self.templates.iter().find(|t| t.template_code == template_code)
    }

    /// Multiplier for an age/gender pair against one template, defaulting
    /// to `1.000` when no band matches (spec §4.2).
    pub fn age_band_multiplier(&self, template_code: &str, age: u8, gender: RatingGender) -> Decimal {
        self.age_bands
            .iter()
            .find(|band| band.template_code == template_code && band.contains(age, gender))
            .map(|band| band.multiplier)
            .unwrap_or(Decimal::ONE)
    }

    /// Active T&C factors ordered by `display_order` (spec §4.4.1).
    pub fn active_tc_factors(&self) -> Vec<&TcFactor> {
        let mut factors: Vec<&TcFactor> = self.tc_factors.iter().filter(|f| f.active).collect();
        factors.sort_by_key(|f| f.display_order);
        factors
    }

    pub fn tc_factor_options(&self, factor_code: &str) -> &[TcFactorOption] {
        self.tc_factor_options.get(factor_code).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tc_factor_default_option(&self, factor_code: &str) -> Option<&TcFactorOption> {
        self.tc_factor_options(factor_code).iter().find(|o| o.is_default)
    }

    pub fn tc_factor_option(&self, factor_code: &str, option_value: &str) -> Option<&TcFactorOption> {
        self.tc_factor_options(factor_code).iter().find(|o| o.option_value == option_value)
    }

    pub fn rate_table(&self, rate_code: &str) -> Option<&RateTable> {
        self.rate_tables.get(rate_code)
    }

    pub fn benefit_configuration(&self, benefit_code: &str) -> Option<&BenefitConfiguration> {
        self.benefit_configurations.get(benefit_code)
    }

    pub fn benefit_configurations_for_category(
        &self,
        category: BenefitCategory,
    ) -> Vec<&BenefitConfiguration> {
        self.benefit_configurations.values().filter(|c| c.category == category).collect()
    }

    pub fn require_benefit_configuration(&self, benefit_code: &str) -> EngineResult<&BenefitConfiguration> {
        self.benefit_configuration(benefit_code)
            .ok_or_else(|| EngineError::not_found("BenefitConfiguration", benefit_code))
    }
}

/// Atomically-swappable handle to the live catalog (spec §9 "swap
/// atomically on reload"). Readers clone the `Arc` once and work against a
/// stable snapshot even if a reload happens mid-calculation.
#[derive(Debug, Clone)]
pub struct CatalogHandle(Arc<RwLock<Arc<ReferenceCatalog>>>);

impl CatalogHandle {
    pub fn new(catalog: ReferenceCatalog) -> Self {
        Self(Arc::new(RwLock::new(Arc::new(catalog))))
    }

    /// Current catalog snapshot.
    pub fn snapshot(&self) -> Arc<ReferenceCatalog> {
        self.0.read().expect("catalog lock poisoned").clone()
    }

    /// Replace the catalog with a new snapshot; in-flight readers holding
    /// an older `Arc` keep working against it.
    pub fn reload(&self, catalog: ReferenceCatalog) {
        *self.0.write().expect("catalog lock poisoned") = Arc::new(catalog);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tc_factor::TcFactorOption;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_catalog() -> ReferenceCatalog {
        let mut catalog = ReferenceCatalog::new();
        catalog.add_template(
            ProductTemplate::new(
                "INPATIENT_STD",
                BenefitCategory::Inpatient,
                dec!(1000000),
                dec!(1100000),
                dec!(600000),
                date(2025, 1, 1),
                None,
            )
            .unwrap(),
        );
        catalog.add_age_band(
            AgeBandMultiplier::new("INPATIENT_STD", 46, 60, RatingGender::Male, dec!(1.35)).unwrap(),
        );
        catalog
            .add_tc_factor(
                TcFactor { factor_code: "CLASS".into(), category: "PLAN".into(), display_order: 1, active: true },
                vec![
                    TcFactorOption::new("CLASS", "STANDARD", dec!(1.0), None, None, true).unwrap(),
                    TcFactorOption::new("CLASS", "EXECUTIVE", dec!(1.25), None, None, false).unwrap(),
                ],
            )
            .unwrap();
        catalog
    }

    #[test]
    fn template_lookup_respects_category_and_date() {
        let catalog = sample_catalog();
        assert!(catalog.template_for_category(BenefitCategory::Inpatient, date(2025, 6, 1)).is_some());
        assert!(catalog.template_for_category(BenefitCategory::Outpatient, date(2025, 6, 1)).is_none());
    }

    #[test]
    fn age_band_multiplier_defaults_to_one() {
        let catalog = sample_catalog();
        assert_eq!(catalog.age_band_multiplier("INPATIENT_STD", 50, RatingGender::Male), dec!(1.35));
        assert_eq!(catalog.age_band_multiplier("INPATIENT_STD", 25, RatingGender::Male), Decimal::ONE);
        assert_eq!(catalog.age_band_multiplier("UNKNOWN", 50, RatingGender::Male), Decimal::ONE);
    }

    #[test]
    fn default_tc_option_resolved() {
        let catalog = sample_catalog();
        let default_option = catalog.tc_factor_default_option("CLASS").unwrap();
        assert_eq!(default_option.option_value, "STANDARD");
    }

    #[test]
    fn handle_reload_does_not_disturb_existing_snapshot() {
        let handle = CatalogHandle::new(sample_catalog());
        let before = handle.snapshot();
        handle.reload(ReferenceCatalog::new());
        assert!(before.template_for_category(BenefitCategory::Inpatient, date(2025, 6, 1)).is_some());
        let after = handle.snapshot();
        assert!(after.template_for_category(BenefitCategory::Inpatient, date(2025, 6, 1)).is_none());
    }
}
