//! Category-specific rules with no documented semantics yet (maternity,
//! dental, optical, mental-health). Registered as no-op PASSED
//! placeholders so the rule registry's coverage of VAL001-VAL025 is
//! complete without inventing behavior that was never described.

use crate::claims::registry::{Applicability, RuleRegistry};
use crate::claims::rules::no_op;
use crate::types::BenefitCategory;

pub fn register_all(registry: &mut RuleRegistry) {
    registry.register_rule(
        "VAL021",
        "Maternity eligibility",
        Applicability::Categories(&[BenefitCategory::Maternity]),
        no_op(),
    );
    registry.register_rule(
        "VAL022",
        "Dental classification",
        Applicability::Categories(&[BenefitCategory::Dental]),
        no_op(),
    );
    registry.register_rule(
        "VAL023",
        "Optical cycle",
        Applicability::Categories(&[BenefitCategory::Optical]),
        no_op(),
    );
    registry.register_rule(
        "VAL024",
        "Session limits",
        Applicability::Categories(&[BenefitCategory::MentalHealth]),
        no_op(),
    );
}
