//! Per-rule verdicts and the aggregation helpers over them (spec §4.6.3,
//! §4.6.5).

use std::cmp::Ordering;
use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::BenefitConfiguration;
use crate::claims::context::ClaimContext;

/// Outcome of a single rule (spec §4.6.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleStatus {
    Failed,
    Warning,
    Pending,
    Passed,
}

impl RuleStatus {
    /// FAILED before WARNING before PENDING before PASSED (spec §4.6.5).
    fn sort_rank(&self) -> u8 {
        match self {
            RuleStatus::Failed => 0,
            RuleStatus::Warning => 1,
            RuleStatus::Pending => 2,
            RuleStatus::Passed => 3,
        }
    }
}

/// The verdict produced by one rule for one (context, benefit) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub rule_code: &'static str,
    pub rule_name: &'static str,
    pub status: RuleStatus,
    pub message: String,
    pub details: HashMap<String, Decimal>,
    pub can_override: bool,
    pub required_authority_level: u8,
}

impl ValidationResult {
    pub fn passed(rule_code: &'static str, rule_name: &'static str, message: impl Into<String>) -> Self {
        Self {
            rule_code,
            rule_name,
            status: RuleStatus::Passed,
            message: message.into(),
            details: HashMap::new(),
            can_override: false,
            required_authority_level: 0,
        }
    }

    pub fn failed(rule_code: &'static str, rule_name: &'static str, message: impl Into<String>) -> Self {
        Self {
            rule_code,
            rule_name,
            status: RuleStatus::Failed,
            message: message.into(),
            details: HashMap::new(),
            can_override: false,
            required_authority_level: 0,
        }
    }

    pub fn warning(
        rule_code: &'static str,
        rule_name: &'static str,
        message: impl Into<String>,
        required_authority_level: u8,
    ) -> Self {
        Self {
            rule_code,
            rule_name,
            status: RuleStatus::Warning,
            message: message.into(),
            details: HashMap::new(),
            can_override: true,
            required_authority_level,
        }
    }

    pub fn pending(rule_code: &'static str, rule_name: &'static str, message: impl Into<String>) -> Self {
        Self {
            rule_code,
            rule_name,
            status: RuleStatus::Pending,
            message: message.into(),
            details: HashMap::new(),
            can_override: false,
            required_authority_level: 0,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: Decimal) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

/// Deterministic ordering used before returning results to a caller
/// (spec §4.6.5, §8 invariant 7).
pub fn sort_results(results: &mut [ValidationResult]) {
    results.sort_by(|a, b| match a.status.sort_rank().cmp(&b.status.sort_rank()) {
        Ordering::Equal => a.rule_code.cmp(b.rule_code),
        other => other,
    });
}

/// True iff no result is FAILED or PENDING (spec §4.6.5, §8 invariant 8).
pub fn can_auto_adjudicate(results: &[ValidationResult]) -> bool {
    !results.iter().any(|r| matches!(r.status, RuleStatus::Failed | RuleStatus::Pending))
}

/// Messages from FAILED and PENDING results, in the order they appear in
/// `results` (spec §4.6.5).
pub fn pend_reasons(results: &[ValidationResult]) -> Vec<String> {
    results
        .iter()
        .filter(|r| matches!(r.status, RuleStatus::Failed | RuleStatus::Pending))
        .map(|r| r.message.clone())
        .collect()
}

/// `min(claimed_amount, limit_value or claimed_amount) × settlement_pct /
/// 100` (spec §4.6.5).
pub fn calculate_allowed_amount(context: &ClaimContext, benefit: &BenefitConfiguration) -> Decimal {
    let capped = match benefit.limit_value {
        Some(limit) => context.claimed_amount.min(limit),
        None => context.claimed_amount,
    };
    capped * benefit.settlement_pct / Decimal::from(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(code: &'static str, status: RuleStatus) -> ValidationResult {
        ValidationResult {
            rule_code: code,
            rule_name: "x",
            status,
            message: String::new(),
            details: HashMap::new(),
            can_override: false,
            required_authority_level: 0,
        }
    }

    #[test]
    fn sort_orders_failed_before_warning_before_pending_before_passed() {
        let mut results = vec![
            r("VAL010", RuleStatus::Passed),
            r("VAL002", RuleStatus::Pending),
            r("VAL001", RuleStatus::Failed),
            r("VAL003", RuleStatus::Warning),
        ];
        sort_results(&mut results);
        let codes: Vec<_> = results.iter().map(|x| x.rule_code).collect();
        assert_eq!(codes, vec!["VAL001", "VAL003", "VAL002", "VAL010"]);
    }

    #[test]
    fn ties_within_a_tier_break_on_rule_code() {
        let mut results = vec![r("VAL009", RuleStatus::Failed), r("VAL001", RuleStatus::Failed)];
        sort_results(&mut results);
        assert_eq!(results[0].rule_code, "VAL001");
    }

    #[test]
    fn can_auto_adjudicate_is_false_with_any_failed_or_pending() {
        assert!(!can_auto_adjudicate(&[r("VAL001", RuleStatus::Failed)]));
        assert!(!can_auto_adjudicate(&[r("VAL001", RuleStatus::Pending)]));
        assert!(can_auto_adjudicate(&[r("VAL001", RuleStatus::Warning), r("VAL002", RuleStatus::Passed)]));
    }
}
