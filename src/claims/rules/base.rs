//! Base rules: run against every claim regardless of benefit category
//! (spec §4.6.2, §4.6.4). Codes VAL001-VAL012 and VAL025.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::catalog::BenefitConfiguration;
use crate::claims::context::ClaimContext;
use crate::claims::registry::{Applicability, RuleRegistry};
use crate::claims::result::ValidationResult;
use crate::claims::rules::no_op;
use crate::error::EngineResult;

pub fn register_all(registry: &mut RuleRegistry) {
    registry.register_rule("VAL001", "Age eligibility", Applicability::AllCategories, Arc::new(age));
    registry.register_rule("VAL002", "Waiting period", Applicability::AllCategories, Arc::new(waiting_period));
    registry.register_rule("VAL003", "Annual limit", Applicability::AllCategories, Arc::new(annual_limit));
    registry.register_rule("VAL004", "Preauthorization", Applicability::AllCategories, Arc::new(preauth));
    registry.register_rule(
        "VAL005",
        "Medical indication",
        Applicability::AllCategories,
        Arc::new(medical_indication),
    );
    registry.register_rule("VAL006", "Exclusions", Applicability::AllCategories, Arc::new(exclusions));
    registry.register_rule("VAL007", "Claim channel", Applicability::AllCategories, no_op());
    registry.register_rule("VAL008", "Duplicate claim", Applicability::AllCategories, Arc::new(duplicate));
    registry.register_rule("VAL009", "Prerequisites", Applicability::AllCategories, Arc::new(prerequisites));
    registry.register_rule("VAL010", "Accumulator usage", Applicability::AllCategories, no_op());
    registry.register_rule("VAL011", "ASO funds", Applicability::AllCategories, no_op());
    registry.register_rule("VAL012", "Buffer funds", Applicability::AllCategories, no_op());
    registry.register_rule("VAL025", "Coinsurance", Applicability::AllCategories, Arc::new(coinsurance));
}

fn age(context: &ClaimContext, benefit: &BenefitConfiguration) -> EngineResult<Option<ValidationResult>> {
    if let Some(min_age) = benefit.min_age_years {
        if context.age < min_age {
            return Ok(Some(ValidationResult::failed(
                "VAL001",
                "Age eligibility",
                format!("member age {} is below the minimum of {min_age}", context.age),
            )));
        }
    }
    if let Some(max_age) = benefit.max_age_years {
        if context.age > max_age {
            return Ok(Some(ValidationResult::failed(
                "VAL001",
                "Age eligibility",
                format!("member age {} exceeds the maximum of {max_age}", context.age),
            )));
        }
    }
    Ok(None)
}

fn waiting_period(context: &ClaimContext, benefit: &BenefitConfiguration) -> EngineResult<Option<ValidationResult>> {
    if benefit.waiting_period_days <= 0 {
        return Ok(None);
    }
    let elapsed = context.days_since_enrollment();
    if elapsed < benefit.waiting_period_days {
        return Ok(Some(ValidationResult::failed(
            "VAL002",
            "Waiting period",
            format!("only {elapsed} days since enrollment, {} required", benefit.waiting_period_days),
        )));
    }
    Ok(None)
}

fn annual_limit(context: &ClaimContext, benefit: &BenefitConfiguration) -> EngineResult<Option<ValidationResult>> {
    let Some(limit) = benefit.limit_value else { return Ok(None) };
    let used = context.accumulator.amount_used;
    if used >= limit {
        return Ok(Some(
            ValidationResult::failed("VAL003", "Annual limit", "annual limit already exhausted")
                .with_detail("used_amount", used)
                .with_detail("limit_value", limit),
        ));
    }
    let remaining = limit - used;
    if context.claimed_amount > remaining {
        return Ok(Some(
            ValidationResult::warning(
                "VAL003",
                "Annual limit",
                format!("claimed {} exceeds remaining limit {remaining}", context.claimed_amount),
                2,
            )
            .with_detail("remaining", remaining),
        ));
    }
    Ok(None)
}

fn preauth(context: &ClaimContext, benefit: &BenefitConfiguration) -> EngineResult<Option<ValidationResult>> {
    if !benefit.requires_preauth || context.is_emergency || context.has_preauth {
        return Ok(None);
    }
    Ok(Some(ValidationResult::warning(
        "VAL004",
        "Preauthorization",
        "benefit requires preauthorization and none was obtained",
        3,
    )))
}

fn medical_indication(
    context: &ClaimContext,
    benefit: &BenefitConfiguration,
) -> EngineResult<Option<ValidationResult>> {
    if !benefit.requires_medical_indication {
        return Ok(None);
    }
    if context.diagnosis_codes.is_empty() {
        return Ok(Some(ValidationResult::failed("VAL005", "Medical indication", "no diagnosis code supplied")));
    }
    if benefit.benefit_code.starts_with("CIRC") {
        let whitelisted = context.diagnosis_codes.iter().any(|code| benefit.allows_diagnosis(code));
        if !whitelisted {
            return Ok(Some(ValidationResult::failed(
                "VAL005",
                "Medical indication",
                "no diagnosis on the circumcision medical-indication whitelist",
            )));
        }
    }
    Ok(None)
}

fn exclusions(context: &ClaimContext, benefit: &BenefitConfiguration) -> EngineResult<Option<ValidationResult>> {
    let excluded = context.diagnosis_codes.iter().find(|code| benefit.is_excluded(code));
    match excluded {
        Some(code) => Ok(Some(ValidationResult::failed(
            "VAL006",
            "Exclusions",
            format!("diagnosis {code} is excluded for this benefit"),
        ))),
        None => Ok(None),
    }
}

fn duplicate(context: &ClaimContext, _benefit: &BenefitConfiguration) -> EngineResult<Option<ValidationResult>> {
    let found = context.prior_claims.iter().find(|prior| {
        prior.benefit_code == context.benefit_code
            && prior.claimed_amount == context.claimed_amount
            && (context.service_date - prior.service_date).num_days().abs() <= 30
    });
    match found {
        Some(prior) => Ok(Some(ValidationResult::warning(
            "VAL008",
            "Duplicate claim",
            format!("matches prior claim {} filed within 30 days", prior.claim_id),
            2,
        ))),
        None => Ok(None),
    }
}

fn prerequisites(context: &ClaimContext, benefit: &BenefitConfiguration) -> EngineResult<Option<ValidationResult>> {
    for required_code in &benefit.prerequisite_benefit_codes {
        let satisfied =
            context.prior_claims.iter().any(|prior| &prior.benefit_code == required_code && prior.approved);
        if !satisfied {
            return Ok(Some(ValidationResult::failed(
                "VAL009",
                "Prerequisites",
                format!("prerequisite benefit {required_code} has no approved prior claim"),
            )));
        }
    }
    Ok(None)
}

fn coinsurance(context: &ClaimContext, benefit: &BenefitConfiguration) -> EngineResult<Option<ValidationResult>> {
    if benefit.coinsurance_pct <= Decimal::ZERO {
        return Ok(None);
    }
    let member_liability = context.claimed_amount * benefit.coinsurance_pct / Decimal::from(100);
    let payer_liability = context.claimed_amount - member_liability;
    Ok(Some(
        ValidationResult::passed("VAL025", "Coinsurance", "coinsurance liability computed")
            .with_detail("member_liability", member_liability)
            .with_detail("payer_liability", payer_liability),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulators::AccumulatorSnapshot;
    use crate::catalog::LimitBasis;
    use crate::claims::context::PriorClaim;
    use crate::claims::result::RuleStatus;
    use crate::types::{BenefitCategory, ClaimChannel};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn context() -> ClaimContext {
        ClaimContext::new(
            "CLM1",
            "MBR1",
            35,
            "GOLD",
            "IP_ROOM",
            date(2025, 8, 15),
            dec!(1500000),
            ClaimChannel::Cashless,
            date(2025, 1, 1),
        )
        .unwrap()
        .with_preauth("PA-1")
    }

    fn benefit() -> BenefitConfiguration {
        BenefitConfiguration::new(
            "IP_ROOM",
            BenefitCategory::Inpatient,
            "ROOM_BOARD",
            dec!(100),
            dec!(0),
            Some(dec!(2000000)),
            Some(LimitBasis::PerYear),
        )
        .unwrap()
    }

    #[test]
    fn age_passes_silently_when_bounds_unset() {
        assert!(age(&context(), &benefit()).unwrap().is_none());
    }

    #[test]
    fn age_fails_below_minimum() {
        let mut b = benefit();
        b.min_age_years = Some(40);
        let result = age(&context(), &b).unwrap().unwrap();
        assert_eq!(result.status, RuleStatus::Failed);
    }

    #[test]
    fn waiting_period_passes_when_satisfied() {
        let mut b = benefit();
        b.waiting_period_days = 30;
        assert!(waiting_period(&context(), &b).unwrap().is_none());
    }

    #[test]
    fn waiting_period_fails_when_too_soon() {
        let mut b = benefit();
        b.waiting_period_days = 300;
        let result = waiting_period(&context(), &b).unwrap().unwrap();
        assert_eq!(result.status, RuleStatus::Failed);
    }

    #[test]
    fn annual_limit_warns_when_claim_exceeds_remaining() {
        let mut ctx = context();
        ctx.accumulator = AccumulatorSnapshot { amount_used: dec!(1800000), ..Default::default() };
        ctx.claimed_amount = dec!(500000);
        let result = annual_limit(&ctx, &benefit()).unwrap().unwrap();
        assert_eq!(result.status, RuleStatus::Warning);
        assert_eq!(result.required_authority_level, 2);
    }

    #[test]
    fn annual_limit_fails_when_already_exhausted() {
        let mut ctx = context();
        ctx.accumulator = AccumulatorSnapshot { amount_used: dec!(2000000), ..Default::default() };
        let result = annual_limit(&ctx, &benefit()).unwrap().unwrap();
        assert_eq!(result.status, RuleStatus::Failed);
    }

    #[test]
    fn preauth_passes_when_present() {
        let mut b = benefit();
        b.requires_preauth = true;
        assert!(preauth(&context(), &b).unwrap().is_none());
    }

    #[test]
    fn preauth_fails_without_emergency_or_preauth() {
        let mut b = benefit();
        b.requires_preauth = true;
        let mut ctx = context();
        ctx.has_preauth = false;
        let result = preauth(&ctx, &b).unwrap().unwrap();
        assert_eq!(result.required_authority_level, 3);
    }

    #[test]
    fn circumcision_benefit_requires_whitelisted_diagnosis() {
        let mut b = benefit();
        b.benefit_code = "CIRC_PROC".to_string();
        b.requires_medical_indication = true;
        b.medical_indication_whitelist = vec!["N47.0".to_string()];
        let mut ctx = context();
        ctx.diagnosis_codes = vec!["Z00.0".to_string()];
        let result = medical_indication(&ctx, &b).unwrap().unwrap();
        assert_eq!(result.status, RuleStatus::Failed);

        ctx.diagnosis_codes = vec!["N47.0".to_string()];
        assert!(medical_indication(&ctx, &b).unwrap().is_none());
    }

    #[test]
    fn exclusion_surfaces_the_matching_diagnosis() {
        let mut b = benefit();
        b.exclusions = vec!["COSM".to_string()];
        let mut ctx = context();
        ctx.diagnosis_codes = vec!["COSM-1".to_string()];
        let result = exclusions(&ctx, &b).unwrap().unwrap();
        assert!(result.message.contains("COSM-1"));
    }

    #[test]
    fn duplicate_warns_within_thirty_days() {
        let mut ctx = context();
        ctx.prior_claims = vec![PriorClaim {
            claim_id: "CLM0".to_string(),
            benefit_code: "IP_ROOM".to_string(),
            service_date: date(2025, 8, 5),
            claimed_amount: dec!(1500000),
            approved: true,
        }];
        let result = duplicate(&ctx, &benefit()).unwrap().unwrap();
        assert_eq!(result.status, RuleStatus::Warning);
    }

    #[test]
    fn duplicate_ignores_claims_outside_the_window() {
        let mut ctx = context();
        ctx.prior_claims = vec![PriorClaim {
            claim_id: "CLM0".to_string(),
            benefit_code: "IP_ROOM".to_string(),
            service_date: date(2025, 1, 1),
            claimed_amount: dec!(1500000),
            approved: true,
        }];
        assert!(duplicate(&ctx, &benefit()).unwrap().is_none());
    }

    #[test]
    fn prerequisites_fail_without_an_approved_prior_claim() {
        let mut b = benefit();
        b.prerequisite_benefit_codes = vec!["REFERRAL".to_string()];
        let result = prerequisites(&context(), &b).unwrap().unwrap();
        assert_eq!(result.status, RuleStatus::Failed);
    }

    #[test]
    fn prerequisites_pass_with_an_approved_prior_claim() {
        let mut b = benefit();
        b.prerequisite_benefit_codes = vec!["REFERRAL".to_string()];
        let mut ctx = context();
        ctx.prior_claims = vec![PriorClaim {
            claim_id: "CLM0".to_string(),
            benefit_code: "REFERRAL".to_string(),
            service_date: date(2025, 8, 1),
            claimed_amount: dec!(0),
            approved: true,
        }];
        assert!(prerequisites(&ctx, &b).unwrap().is_none());
    }

    #[test]
    fn coinsurance_computes_member_and_payer_liability() {
        let mut b = benefit();
        b.coinsurance_pct = dec!(20);
        let ctx = context();
        let result = coinsurance(&ctx, &b).unwrap().unwrap();
        assert_eq!(result.details["member_liability"], dec!(300000));
        assert_eq!(result.details["payer_liability"], dec!(1200000));
    }
}
