//! Rule implementations grouped the way spec §4.6.2 groups them: base
//! rules that run against every claim, then one module per benefit
//! category's additions.

pub mod base;
pub mod category_stub;
pub mod inpatient;
pub mod outpatient;

use std::sync::Arc;

use crate::claims::context::ClaimContext;
use crate::claims::registry::RuleFn;
use crate::claims::result::ValidationResult;
use crate::catalog::BenefitConfiguration;
use crate::error::EngineResult;

/// A rule with no specified semantics yet (spec §9 Open Questions:
/// "Placeholder rule implementations... return no result in the source.
/// Treat as no-op PASSED until explicit semantics are specified").
pub(crate) fn no_op() -> RuleFn {
    Arc::new(|_context: &ClaimContext, _benefit: &BenefitConfiguration| -> EngineResult<Option<ValidationResult>> {
        Ok(None)
    })
}
