//! The rule registry: rules are values (code, name, applicability
//! predicate, pure evaluation function) rather than a hardwired selector
//! (spec §4.6.1, §9 "Dynamic rule registration").

use std::sync::Arc;

use crate::claims::context::ClaimContext;
use crate::claims::result::ValidationResult;
use crate::claims::rules;
use crate::error::EngineResult;
use crate::types::BenefitCategory;
use crate::catalog::BenefitConfiguration;

/// A rule's evaluation function: pure, read-only over its inputs (spec
/// §5). Returning `Ok(None)` means PASSED silently (spec §4.6.3).
pub type RuleFn =
    Arc<dyn Fn(&ClaimContext, &BenefitConfiguration) -> EngineResult<Option<ValidationResult>> + Send + Sync>;

/// Which benefit categories a rule runs against.
#[derive(Clone, Copy)]
pub enum Applicability {
    AllCategories,
    Categories(&'static [BenefitCategory]),
}

impl Applicability {
    fn matches(&self, category: BenefitCategory) -> bool {
        match self {
            Applicability::AllCategories => true,
            Applicability::Categories(categories) => categories.contains(&category),
        }
    }
}

#[derive(Clone)]
pub struct RegisteredRule {
    pub code: &'static str,
    pub name: &'static str,
    applicability: Applicability,
    eval: RuleFn,
}

impl RegisteredRule {
    pub fn evaluate(
        &self,
        context: &ClaimContext,
        benefit: &BenefitConfiguration,
    ) -> EngineResult<Option<ValidationResult>> {
        (self.eval)(context, benefit)
    }
}

/// Holds every registered rule and answers "which rules apply to this
/// claim's benefit category" (spec §4.6.2: "data-driven... rather than
/// hardwired in a selector function").
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<RegisteredRule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule, applicable to the given set of categories.
    pub fn register_rule(
        &mut self,
        code: &'static str,
        name: &'static str,
        applicability: Applicability,
        eval: RuleFn,
    ) {
        self.rules.push(RegisteredRule { code, name, applicability, eval });
    }

    /// The base rules (VAL001-012, VAL025) plus the category-specific set
    /// enumerated in spec §4.6.2 (VAL013-024).
    pub fn with_base_rules() -> Self {
        let mut registry = Self::new();
        rules::base::register_all(&mut registry);
        rules::inpatient::register_all(&mut registry);
        rules::outpatient::register_all(&mut registry);
        rules::category_stub::register_all(&mut registry);
        registry
    }

    /// Rules applicable to `category`, in registration order; evaluation
    /// order does not affect the aggregated result (spec §5: "result order
    /// is deterministic... regardless of completion order").
    pub fn rules_for(&self, category: BenefitCategory) -> Vec<&RegisteredRule> {
        self.rules.iter().filter(|rule| rule.applicability.matches(category)).collect()
    }

    /// Drop rules named in `disabled_codes` that do not exist in this
    /// registry, logging a warning for each (spec §4.6.1: "unknown codes
    /// referenced by configuration are ignored with a warning").
    pub fn active_rules(&self, category: BenefitCategory, disabled_codes: &[String]) -> Vec<&RegisteredRule> {
        for code in disabled_codes {
            if !self.rules.iter().any(|r| r.code == code) {
                log::warn!("configuration disables unknown rule code {code}");
            }
        }
        self.rules_for(category).into_iter().filter(|r| !disabled_codes.iter().any(|c| c == r.code)).collect()
    }
}
