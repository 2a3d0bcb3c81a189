//! The claims validation engine: an immutable claim snapshot evaluated by
//! a concurrently-run, dynamically-registered rule set producing a
//! deterministically ordered verdict (spec §4.6, §5).

pub mod context;
pub mod engine;
pub mod registry;
pub mod result;
pub mod rules;

pub use context::{ClaimContext, PriorClaim};
pub use engine::{calculate_allowed_amount, can_auto_adjudicate, pend_reasons, ClaimsValidationEngine};
pub use registry::{Applicability, RuleFn, RuleRegistry};
pub use result::{RuleStatus, ValidationResult};
