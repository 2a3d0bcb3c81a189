//! INPATIENT-only rules (spec §4.6.2): pre/post hospitalization window has
//! real semantics (VAL013); room upgrade, surgery class, ICU limits and
//! recovery period are placeholders (spec §9 Open Questions).

use std::sync::Arc;

use chrono::Days;

use crate::catalog::BenefitConfiguration;
use crate::claims::context::ClaimContext;
use crate::claims::registry::{Applicability, RuleRegistry};
use crate::claims::result::ValidationResult;
use crate::claims::rules::no_op;
use crate::error::EngineResult;
use crate::types::BenefitCategory;

const INPATIENT: Applicability = Applicability::Categories(&[BenefitCategory::Inpatient]);

pub fn register_all(registry: &mut RuleRegistry) {
    registry.register_rule(
        "VAL013",
        "Pre/post hospitalization window",
        INPATIENT,
        Arc::new(pre_post_hospitalization),
    );
    registry.register_rule("VAL014", "Room upgrade", INPATIENT, no_op());
    registry.register_rule("VAL015", "Surgery class", INPATIENT, no_op());
    registry.register_rule("VAL017", "ICU limits", INPATIENT, no_op());
    registry.register_rule("VAL018", "Recovery period", INPATIENT, no_op());
}

fn pre_post_hospitalization(
    context: &ClaimContext,
    benefit: &BenefitConfiguration,
) -> EngineResult<Option<ValidationResult>> {
    let (Some(admission), Some(discharge)) = (context.admission_date, context.discharge_date) else {
        return Ok(None);
    };
    if benefit.pre_hospitalization_days == 0 && benefit.post_hospitalization_days == 0 {
        return Ok(None);
    }
    let window_start = admission - Days::new(benefit.pre_hospitalization_days.max(0) as u64);
    let window_end = discharge + Days::new(benefit.post_hospitalization_days.max(0) as u64);
    if context.service_date < window_start || context.service_date > window_end {
        return Ok(Some(ValidationResult::failed(
            "VAL013",
            "Pre/post hospitalization window",
            format!("service_date {} falls outside [{window_start}, {window_end}]", context.service_date),
        )));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LimitBasis;
    use crate::types::ClaimChannel;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn benefit(pre: i64, post: i64) -> BenefitConfiguration {
        let mut b = BenefitConfiguration::new(
            "IP_ROOM",
            BenefitCategory::Inpatient,
            "ROOM_BOARD",
            dec!(80),
            dec!(20),
            None,
            None,
        )
        .unwrap();
        b.pre_hospitalization_days = pre;
        b.post_hospitalization_days = post;
        b
    }

    fn context_on(service_date: NaiveDate) -> ClaimContext {
        ClaimContext::new(
            "CLM1",
            "MBR1",
            35,
            "GOLD",
            "IP_ROOM",
            service_date,
            dec!(100000),
            ClaimChannel::Cashless,
            date(2025, 1, 1),
        )
        .unwrap()
        .with_admission_discharge(date(2025, 8, 10), date(2025, 8, 15))
        .unwrap()
    }

    #[test]
    fn not_applicable_without_admission_and_discharge() {
        let ctx = ClaimContext::new(
            "CLM1", "MBR1", 35, "GOLD", "IP_ROOM", date(2025, 8, 1), dec!(1), ClaimChannel::Cashless,
            date(2025, 1, 1),
        )
        .unwrap();
        assert!(pre_post_hospitalization(&ctx, &benefit(7, 14)).unwrap().is_none());
    }

    #[test]
    fn passes_within_the_window() {
        let ctx = context_on(date(2025, 8, 20));
        assert!(pre_post_hospitalization(&ctx, &benefit(7, 14)).unwrap().is_none());
    }

    #[test]
    fn fails_outside_the_window() {
        let ctx = context_on(date(2025, 9, 10));
        let result = pre_post_hospitalization(&ctx, &benefit(7, 14)).unwrap().unwrap();
        assert_eq!(result.rule_code, "VAL013");
    }
}
