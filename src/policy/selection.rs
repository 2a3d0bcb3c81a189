//! Selections a policy config holds against the reference catalog, keyed
//! by stable codes rather than object references (spec §4.4.1, §9).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::BenefitCategory;

/// A category the policy has opted into, carrying the category-level
/// factor applied in `total_multiplier` (spec §4.4.3 step 2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitSelection {
    pub category: BenefitCategory,
    pub selected: bool,
    pub category_factor: Decimal,
}

impl BenefitSelection {
    pub fn new(category: BenefitCategory, selected: bool, category_factor: Decimal) -> EngineResult<Self> {
        if category_factor.is_sign_negative() {
            return Err(EngineError::validation("category_factor must be non-negative"));
        }
        Ok(Self { category, selected, category_factor })
    }

    /// `category_factor` starts at `1.000` and is overwritten by the next
    /// `calculate_total_premium` pass if `selected`.
    pub fn default_for(category: BenefitCategory) -> Self {
        Self { category, selected: category.selected_by_default(), category_factor: Decimal::ONE }
    }
}

/// A chosen option under one of the catalog's T&C factors, referenced by
/// `factor_code`/`option_value` so a catalog reload never dangles a
/// selection (spec §9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyTcSelection {
    pub factor_code: String,
    pub option_value: String,
    pub applied_multiplier: Decimal,
}

impl PolicyTcSelection {
    pub fn new(
        factor_code: impl Into<String>,
        option_value: impl Into<String>,
        applied_multiplier: Decimal,
    ) -> EngineResult<Self> {
        if applied_multiplier <= Decimal::ZERO {
            return Err(EngineError::validation("applied_multiplier must be > 0"));
        }
        Ok(Self { factor_code: factor_code.into(), option_value: option_value.into(), applied_multiplier })
    }

    pub fn impact_label(&self) -> String {
        if self.applied_multiplier == Decimal::ONE {
            "No impact".to_string()
        } else {
            let pct = (self.applied_multiplier - Decimal::ONE) * Decimal::from(100);
            format!("{pct:.1}%")
        }
    }
}

/// A manual override of one benefit configuration field for a single
/// policy, identified by the benefit code it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyBenefitOverride {
    pub benefit_code: String,
    pub field_name: String,
    pub override_value: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn default_selection_matches_category_default() {
        let inpatient = BenefitSelection::default_for(BenefitCategory::Inpatient);
        assert!(inpatient.selected);
        let dental = BenefitSelection::default_for(BenefitCategory::Dental);
        assert!(!dental.selected);
    }

    #[test]
    fn rejects_non_positive_tc_multiplier() {
        assert!(PolicyTcSelection::new("CLASS", "STANDARD", dec!(0)).is_err());
    }

    #[test]
    fn tc_selection_impact_label() {
        let selection = PolicyTcSelection::new("CLASS", "EXECUTIVE", dec!(1.25)).unwrap();
        assert_eq!(selection.impact_label(), "25.0%");
    }
}
