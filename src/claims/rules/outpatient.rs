//! OUTPATIENT-only rules (spec §4.6.2): visit limits has real semantics
//! (VAL016); package benefits and referral are placeholders (spec §9 Open
//! Questions).

use std::sync::Arc;

use crate::catalog::BenefitConfiguration;
use crate::claims::context::ClaimContext;
use crate::claims::registry::{Applicability, RuleRegistry};
use crate::claims::result::ValidationResult;
use crate::claims::rules::no_op;
use crate::error::EngineResult;
use crate::types::BenefitCategory;

const OUTPATIENT: Applicability = Applicability::Categories(&[BenefitCategory::Outpatient]);

pub fn register_all(registry: &mut RuleRegistry) {
    registry.register_rule("VAL016", "Visit limits", OUTPATIENT, Arc::new(visit_limits));
    registry.register_rule("VAL019", "Package benefits", OUTPATIENT, no_op());
    registry.register_rule("VAL020", "Referral", OUTPATIENT, no_op());
}

fn visit_limits(context: &ClaimContext, benefit: &BenefitConfiguration) -> EngineResult<Option<ValidationResult>> {
    let Some(max_visits) = benefit.max_visits_per_year else { return Ok(None) };
    if context.accumulator.visits_used >= max_visits {
        return Ok(Some(ValidationResult::failed(
            "VAL016",
            "Visit limits",
            format!("{} of {max_visits} annual visits already used", context.accumulator.visits_used),
        )));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulators::AccumulatorSnapshot;
    use crate::types::ClaimChannel;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn context(visits_used: i64) -> ClaimContext {
        let mut ctx = ClaimContext::new(
            "CLM1",
            "MBR1",
            35,
            "GOLD",
            "OP_CONSULT",
            date(2025, 8, 15),
            dec!(200000),
            ClaimChannel::Reimbursement,
            date(2025, 1, 1),
        )
        .unwrap();
        ctx.accumulator = AccumulatorSnapshot { visits_used, ..Default::default() };
        ctx
    }

    fn benefit(max_visits: Option<i64>) -> BenefitConfiguration {
        let mut b = BenefitConfiguration::new(
            "OP_CONSULT",
            BenefitCategory::Outpatient,
            "CONSULTATION",
            dec!(80),
            dec!(20),
            None,
            None,
        )
        .unwrap();
        b.max_visits_per_year = max_visits;
        b
    }

    #[test]
    fn not_applicable_without_a_configured_cap() {
        assert!(visit_limits(&context(0), &benefit(None)).unwrap().is_none());
    }

    #[test]
    fn passes_under_the_cap() {
        assert!(visit_limits(&context(5), &benefit(Some(12))).unwrap().is_none());
    }

    #[test]
    fn fails_once_the_cap_is_reached() {
        let result = visit_limits(&context(12), &benefit(Some(12))).unwrap().unwrap();
        assert_eq!(result.rule_code, "VAL016");
    }
}
