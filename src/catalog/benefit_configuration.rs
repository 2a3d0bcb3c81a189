//! Benefit configuration rows consulted by the claims rule set (spec §3, §4.6).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::BenefitCategory;

/// The unit a benefit's limit is expressed against. Sharpened from the
/// spec's "per-year caps (days/visits/cases)" using `LIMIT_NORM` in
/// `original_source`'s Excel importer (SPEC_FULL.md §11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitBasis {
    PerIncident,
    PerDay,
    PerYear,
}

/// A single covered benefit line: settlement terms, limits, and the
/// preconditions VAL-series rules check a claim against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitConfiguration {
    pub benefit_code: String,
    pub category: BenefitCategory,
    pub coverage_type: String,
    pub settlement_pct: Decimal,
    pub coinsurance_pct: Decimal,
    pub limit_value: Option<Decimal>,
    pub limit_basis: Option<LimitBasis>,
    pub max_days_per_year: Option<i64>,
    pub max_visits_per_year: Option<i64>,
    pub max_cases_per_year: Option<i64>,
    pub requires_preauth: bool,
    pub requires_medical_indication: bool,
    pub medical_indication_whitelist: Vec<String>,
    pub waiting_period_days: i64,
    pub pre_hospitalization_days: i64,
    pub post_hospitalization_days: i64,
    pub exclusions: Vec<String>,
    pub prerequisite_benefit_codes: Vec<String>,
    pub aso_applicable: bool,
    pub min_age_years: Option<u8>,
    pub max_age_years: Option<u8>,
}

impl BenefitConfiguration {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        benefit_code: impl Into<String>,
        category: BenefitCategory,
        coverage_type: impl Into<String>,
        settlement_pct: Decimal,
        coinsurance_pct: Decimal,
        limit_value: Option<Decimal>,
        limit_basis: Option<LimitBasis>,
    ) -> EngineResult<Self> {
        for (name, value) in [("settlement_pct", settlement_pct), ("coinsurance_pct", coinsurance_pct)] {
            if value.is_sign_negative() || value > Decimal::from(100) {
                return Err(EngineError::validation(format!("{name} must be within [0, 100]")));
            }
        }
        if let Some(limit) = limit_value {
            if limit.is_sign_negative() {
                return Err(EngineError::validation("limit_value must be non-negative"));
            }
            if limit_basis.is_none() {
                return Err(EngineError::validation("limit_basis is required when limit_value is set"));
            }
        }

        Ok(Self {
            benefit_code: benefit_code.into(),
            category,
            coverage_type: coverage_type.into(),
            settlement_pct,
            coinsurance_pct,
            limit_value,
            limit_basis,
            max_days_per_year: None,
            max_visits_per_year: None,
            max_cases_per_year: None,
            requires_preauth: false,
            requires_medical_indication: false,
            medical_indication_whitelist: Vec::new(),
            waiting_period_days: 0,
            pre_hospitalization_days: 0,
            post_hospitalization_days: 0,
            exclusions: Vec::new(),
            prerequisite_benefit_codes: Vec::new(),
            aso_applicable: false,
            min_age_years: None,
            max_age_years: None,
        })
    }

    /// VAL005 consults this: is `diagnosis_code` on the whitelist (empty
    /// whitelist means no restriction)?
    pub fn allows_diagnosis(&self, diagnosis_code: &str) -> bool {
        self.medical_indication_whitelist.is_empty()
            || self
                .medical_indication_whitelist
                .iter()
                .any(|code| diagnosis_code.starts_with(code.as_str()))
    }

    /// Is `diagnosis_code` explicitly excluded for this benefit?
    pub fn is_excluded(&self, diagnosis_code: &str) -> bool {
        self.exclusions.iter().any(|code| diagnosis_code.starts_with(code.as_str()))
    }
}
