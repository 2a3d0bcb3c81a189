//! The policy configuration aggregate: status machine, numbering and the
//! selections that drive pricing (spec §3, §4.4.1).

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::policy::selection::{BenefitSelection, PolicyBenefitOverride, PolicyTcSelection};
use crate::types::{BenefitCategory, PolicyStatus, PricingMethod};

/// Quote numbers are `Q<YYYYMMDD><NNNN>`; policy numbers are
/// `PGH<YYYYMM><NNNNN>` (spec §3). Uniqueness is a caller responsibility —
/// see [`crate::policy::store::InMemoryPolicyConfigStore`] for the
/// sequence + collision-retry that backs it in this engine.
pub fn format_quote_number(as_of: NaiveDate, sequence: u32) -> String {
    format!("Q{}{:04}", as_of.format("%Y%m%d"), sequence)
}

pub fn format_policy_number(as_of: NaiveDate, sequence: u32) -> String {
    format!("PGH{}{:05}", as_of.format("%Y%m"), sequence)
}

/// A quote, and once bound a policy, for a group of members. Identified
/// throughout its lifecycle by `quote_number`; `policy_number` is minted
/// only once the config reaches APPROVED (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub quote_number: String,
    pub policy_number: Option<String>,
    pub group_name: String,
    pub coverage_start: NaiveDate,
    pub coverage_end: NaiveDate,
    pub status: PolicyStatus,
    pub pricing_method: PricingMethod,
    pub benefit_selections: Vec<BenefitSelection>,
    pub tc_selections: Vec<PolicyTcSelection>,
    pub benefit_overrides: Vec<PolicyBenefitOverride>,
    /// Cached from the last calculate (spec §4.4.4); zero until then.
    pub base_premium_total: Decimal,
    pub total_multiplier: Decimal,
    pub adjusted_premium: Decimal,
    pub admin_fee: Decimal,
    pub tpa_fee: Decimal,
    pub total_premium: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PolicyConfig {
    pub fn new(
        quote_number: impl Into<String>,
        group_name: impl Into<String>,
        coverage_start: NaiveDate,
        coverage_end: NaiveDate,
        pricing_method: PricingMethod,
        created_at: NaiveDateTime,
    ) -> EngineResult<Self> {
        if coverage_end <= coverage_start {
            return Err(EngineError::validation("coverage_end must be after coverage_start"));
        }
        let benefit_selections = BenefitCategory::ALL.into_iter().map(BenefitSelection::default_for).collect();
        Ok(Self {
            quote_number: quote_number.into(),
            policy_number: None,
            group_name: group_name.into(),
            coverage_start,
            coverage_end,
            status: PolicyStatus::Draft,
            pricing_method,
            benefit_selections,
            tc_selections: Vec::new(),
            benefit_overrides: Vec::new(),
            base_premium_total: Decimal::ZERO,
            total_multiplier: Decimal::ZERO,
            adjusted_premium: Decimal::ZERO,
            admin_fee: Decimal::ZERO,
            tpa_fee: Decimal::ZERO,
            total_premium: Decimal::ZERO,
            created_at,
            updated_at: created_at,
        })
    }

    /// Stable identifier for error messages and store keys, before and
    /// after policy_number is minted.
    pub fn identifier(&self) -> &str {
        self.policy_number.as_deref().unwrap_or(&self.quote_number)
    }

    pub fn selection_for(&self, category: BenefitCategory) -> Option<&BenefitSelection> {
        self.benefit_selections.iter().find(|s| s.category == category)
    }

    pub fn selection_for_mut(&mut self, category: BenefitCategory) -> Option<&mut BenefitSelection> {
        self.benefit_selections.iter_mut().find(|s| s.category == category)
    }

    pub fn tc_selection_for(&self, factor_code: &str) -> Option<&PolicyTcSelection> {
        self.tc_selections.iter().find(|s| s.factor_code == factor_code)
    }

    pub fn upsert_tc_selection(&mut self, selection: PolicyTcSelection, updated_at: NaiveDateTime) {
        if let Some(existing) = self.tc_selections.iter_mut().find(|s| s.factor_code == selection.factor_code) {
            *existing = selection;
        } else {
            self.tc_selections.push(selection);
        }
        self.updated_at = updated_at;
    }

    /// Status transitions allowed by the workflow (spec §4.4.6, §8 S3/S4):
    /// DRAFT -> QUOTED -> APPROVED -> ACTIVE, with CANCELLED and EXPIRED
    /// reachable from any pre-ACTIVE state.
    pub fn transition_to(&mut self, next: PolicyStatus, at: NaiveDateTime) -> EngineResult<()> {
        let allowed = match (self.status, next) {
            (PolicyStatus::Draft, PolicyStatus::Quoted) => true,
            (PolicyStatus::Quoted, PolicyStatus::Approved) => true,
            (PolicyStatus::Approved, PolicyStatus::Active) => true,
            (_, PolicyStatus::Cancelled) => !matches!(self.status, PolicyStatus::Active | PolicyStatus::Cancelled),
            (PolicyStatus::Active, PolicyStatus::Expired) => true,
            _ => false,
        };
        if !allowed {
            return Err(EngineError::state(
                "PolicyConfig",
                self.identifier(),
                format!("a valid predecessor of {next}"),
                self.status.to_string(),
            ));
        }
        self.status = next;
        self.updated_at = at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(9, 0, 0).unwrap()
    }

    fn sample() -> PolicyConfig {
        PolicyConfig::new(
            "Q202503040001",
            "Acme Corp",
            date(2025, 3, 1),
            date(2026, 2, 28),
            PricingMethod::FullyExperienced,
            at(2025, 3, 1),
        )
        .unwrap()
    }

    #[test]
    fn quote_and_policy_number_formats() {
        assert_eq!(format_quote_number(date(2025, 3, 4), 7), "Q202503040007");
        assert_eq!(format_policy_number(date(2025, 3, 4), 12), "PGH20250300012");
    }

    #[test]
    fn rejects_coverage_end_not_after_start() {
        let result = PolicyConfig::new(
            "Q202503040001",
            "Acme",
            date(2025, 3, 1),
            date(2025, 3, 1),
            PricingMethod::FullyExperienced,
            at(2025, 3, 1),
        );
        assert!(result.is_err());
    }

    #[test]
    fn new_config_defaults_inpatient_and_outpatient() {
        let config = sample();
        assert!(config.selection_for(BenefitCategory::Inpatient).unwrap().selected);
        assert!(config.selection_for(BenefitCategory::Outpatient).unwrap().selected);
        assert!(!config.selection_for(BenefitCategory::Dental).unwrap().selected);
    }

    #[test]
    fn status_machine_allows_forward_path() {
        let mut config = sample();
        config.transition_to(PolicyStatus::Quoted, at(2025, 3, 2)).unwrap();
        config.transition_to(PolicyStatus::Approved, at(2025, 3, 3)).unwrap();
        config.transition_to(PolicyStatus::Active, at(2025, 3, 4)).unwrap();
        assert_eq!(config.status, PolicyStatus::Active);
    }

    #[test]
    fn status_machine_rejects_skipping_quoted() {
        let mut config = sample();
        assert!(config.transition_to(PolicyStatus::Approved, at(2025, 3, 2)).is_err());
    }

    #[test]
    fn status_machine_rejects_cancel_after_active() {
        let mut config = sample();
        config.transition_to(PolicyStatus::Quoted, at(2025, 3, 2)).unwrap();
        config.transition_to(PolicyStatus::Approved, at(2025, 3, 3)).unwrap();
        config.transition_to(PolicyStatus::Active, at(2025, 3, 4)).unwrap();
        assert!(config.transition_to(PolicyStatus::Cancelled, at(2025, 3, 5)).is_err());
    }
}
