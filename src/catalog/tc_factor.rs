//! Terms-and-conditions factors and their options (spec §3, §4.4.1, §4.4.5).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A policy-level T&C dimension (e.g. class structure, geographic
/// coverage). `display_order` drives the order factors are listed and
/// applied in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcFactor {
    pub factor_code: String,
    pub category: String,
    pub display_order: i32,
    pub active: bool,
}

/// One selectable option under a [`TcFactor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcFactorOption {
    pub factor_code: String,
    pub option_value: String,
    pub multiplier: Decimal,
    pub min_participants: Option<i64>,
    pub max_participants: Option<i64>,
    pub is_default: bool,
}

impl TcFactorOption {
    pub fn new(
        factor_code: impl Into<String>,
        option_value: impl Into<String>,
        multiplier: Decimal,
        min_participants: Option<i64>,
        max_participants: Option<i64>,
        is_default: bool,
    ) -> EngineResult<Self> {
        if multiplier <= Decimal::ZERO {
            return Err(EngineError::validation("option multiplier must be > 0"));
        }
        if let (Some(min), Some(max)) = (min_participants, max_participants) {
            if min > max {
                return Err(EngineError::validation("min_participants must be <= max_participants"));
            }
        }

        Ok(Self {
            factor_code: factor_code.into(),
            option_value: option_value.into(),
            multiplier,
            min_participants,
            max_participants,
            is_default,
        })
    }

    /// Participant-count bound check for §4.4.5's T&C update validation.
    /// Returns the name of the first violated bound, if any.
    pub fn violated_bound(&self, participant_count: i64) -> Option<&'static str> {
        if let Some(min) = self.min_participants {
            if participant_count < min {
                return Some("min_participants");
            }
        }
        if let Some(max) = self.max_participants {
            if participant_count > max {
                return Some("max_participants");
            }
        }
        None
    }

    /// Human-readable impact percentage, matching the original's
    /// `_format_tc_for_quote` (SPEC_FULL.md §11).
    pub fn impact_label(&self) -> String {
        if self.multiplier == Decimal::ONE {
            "No impact".to_string()
        } else {
            let pct = (self.multiplier - Decimal::ONE) * Decimal::from(100);
            format!("{pct:.1}%")
        }
    }
}

/// Validate a whole factor's option set carries at most one default (spec §3).
pub fn validate_at_most_one_default(options: &[TcFactorOption]) -> EngineResult<()> {
    let default_count = options.iter().filter(|o| o.is_default).count();
    if default_count > 1 {
        return Err(EngineError::validation("at most one option may be flagged default"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_non_positive_multiplier() {
        assert!(TcFactorOption::new("CLASS", "A", dec!(0), None, None, true).is_err());
        assert!(TcFactorOption::new("CLASS", "A", dec!(-1), None, None, true).is_err());
    }

    #[test]
    fn rejects_inverted_participant_bounds() {
        assert!(TcFactorOption::new("CLASS", "A", dec!(1.0), Some(50), Some(20), true).is_err());
    }

    #[test]
    fn violated_bound_reports_name() {
        let option = TcFactorOption::new("CLASS", "A", dec!(1.0), Some(50), Some(200), true).unwrap();
        assert_eq!(option.violated_bound(20), Some("min_participants"));
        assert_eq!(option.violated_bound(300), Some("max_participants"));
        assert_eq!(option.violated_bound(100), None);
    }

    #[test]
    fn impact_label_formats_signed_percentage() {
        let option = TcFactorOption::new("CLASS", "A", dec!(1.1), None, None, false).unwrap();
        assert_eq!(option.impact_label(), "10.0%");
        let neutral = TcFactorOption::new("CLASS", "B", dec!(1.0), None, None, true).unwrap();
        assert_eq!(neutral.impact_label(), "No impact");
    }

    #[test]
    fn at_most_one_default_enforced() {
        let options = vec![
            TcFactorOption::new("CLASS", "A", dec!(1.0), None, None, true).unwrap(),
            TcFactorOption::new("CLASS", "B", dec!(1.1), None, None, true).unwrap(),
        ];
        assert!(validate_at_most_one_default(&options).is_err());
    }
}
