//! The claims validation engine: runs the applicable rule set for a claim
//! concurrently and aggregates a deterministic verdict (spec §4.6, §5).

use rayon::prelude::*;

use crate::catalog::BenefitConfiguration;
use crate::claims::context::ClaimContext;
use crate::claims::registry::{Applicability, RegisteredRule, RuleFn, RuleRegistry};
use crate::claims::result::{self, ValidationResult};

/// Evaluates a [`ClaimContext`] against a [`BenefitConfiguration`] by
/// running every applicable registered rule and aggregating the results
/// (spec §4.6.1, §5: "rules are independent, read-only... collected into
/// a single list").
pub struct ClaimsValidationEngine {
    registry: RuleRegistry,
}

impl Default for ClaimsValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimsValidationEngine {
    pub fn new() -> Self {
        Self { registry: RuleRegistry::with_base_rules() }
    }

    pub fn with_registry(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    /// Register an additional rule at startup (spec §6 validation-engine
    /// interface: `register_rule(code, name, fn)`).
    pub fn register_rule(&mut self, code: &'static str, name: &'static str, applicability: Applicability, eval: RuleFn) {
        self.registry.register_rule(code, name, applicability, eval);
    }

    /// Run every rule applicable to `benefit.category` against `context`
    /// concurrently (one rayon task per rule) and return the aggregated,
    /// deterministically ordered result list (spec §4.6.5, §5).
    pub fn validate_claim(&self, context: &ClaimContext, benefit: &BenefitConfiguration) -> Vec<ValidationResult> {
        self.validate_claim_excluding(context, benefit, &[])
    }

    /// As [`Self::validate_claim`], but rule codes in `disabled_codes`
    /// never run, even if applicable; unknown codes are logged and
    /// ignored (spec §4.6.1).
    pub fn validate_claim_excluding(
        &self,
        context: &ClaimContext,
        benefit: &BenefitConfiguration,
        disabled_codes: &[String],
    ) -> Vec<ValidationResult> {
        let rules = self.registry.active_rules(benefit.category, disabled_codes);
        let mut results: Vec<ValidationResult> = rules.par_iter().filter_map(|rule| Self::run_one(rule, context, benefit)).collect();
        result::sort_results(&mut results);
        results
    }

    /// A rule that errors never aborts the batch; its error becomes a
    /// synthetic FAILED result (spec §4.6.6).
    fn run_one(
        rule: &&RegisteredRule,
        context: &ClaimContext,
        benefit: &BenefitConfiguration,
    ) -> Option<ValidationResult> {
        match rule.evaluate(context, benefit) {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(err) => Some(ValidationResult::failed(rule.code, rule.name, format!("rule execution failed: {err}"))),
        }
    }
}

pub use result::{calculate_allowed_amount, can_auto_adjudicate, pend_reasons};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulators::AccumulatorSnapshot;
    use crate::catalog::LimitBasis;
    use crate::claims::result::RuleStatus;
    use crate::types::{BenefitCategory, ClaimChannel};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn happy_path_context() -> ClaimContext {
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

    fn happy_path_benefit() -> BenefitConfiguration {
        let mut b = BenefitConfiguration::new(
            "IP_ROOM",
            BenefitCategory::Inpatient,
            "ROOM_BOARD",
            dec!(100),
            dec!(0),
            Some(dec!(2000000)),
            Some(LimitBasis::PerYear),
        )
        .unwrap();
        b.requires_preauth = true;
        b.waiting_period_days = 30;
        b
    }

    #[test]
    fn happy_path_scenario_auto_adjudicates() {
        let engine = ClaimsValidationEngine::new();
        let results = engine.validate_claim(&happy_path_context(), &happy_path_benefit());
        assert!(can_auto_adjudicate(&results));
        let allowed = calculate_allowed_amount(&happy_path_context(), &happy_path_benefit());
        assert_eq!(allowed, dec!(1500000));
    }

    #[test]
    fn duplicate_and_limit_warnings_still_auto_adjudicate() {
        use crate::claims::context::PriorClaim;

        let mut ctx = happy_path_context();
        ctx.claimed_amount = dec!(500000);
        ctx.accumulator = AccumulatorSnapshot { amount_used: dec!(1800000), ..Default::default() };
        ctx.prior_claims = vec![PriorClaim {
            claim_id: "CLM0".to_string(),
            benefit_code: "IP_ROOM".to_string(),
            service_date: date(2025, 8, 5),
            claimed_amount: dec!(500000),
            approved: true,
        }];

        let engine = ClaimsValidationEngine::new();
        let results = engine.validate_claim(&ctx, &happy_path_benefit());
        assert!(can_auto_adjudicate(&results));
        assert!(!results.iter().any(|r| r.status == RuleStatus::Failed));
        let warnings: Vec<_> = results.iter().filter(|r| r.status == RuleStatus::Warning).collect();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn result_order_is_deterministic_across_runs() {
        let engine = ClaimsValidationEngine::new();
        let first = engine.validate_claim(&happy_path_context(), &happy_path_benefit());
        let second = engine.validate_claim(&happy_path_context(), &happy_path_benefit());
        let first_codes: Vec<_> = first.iter().map(|r| r.rule_code).collect();
        let second_codes: Vec<_> = second.iter().map(|r| r.rule_code).collect();
        assert_eq!(first_codes, second_codes);
    }

    #[test]
    fn disabling_a_rule_removes_it_from_the_result_set() {
        let engine = ClaimsValidationEngine::new();
        let results =
            engine.validate_claim_excluding(&happy_path_context(), &happy_path_benefit(), &["VAL025".to_string()]);
        assert!(!results.iter().any(|r| r.rule_code == "VAL025"));
    }
}
