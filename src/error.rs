//! Structured error kinds for the pricing and claims engines (spec §7)
//!
//! `RuleFailure` from §7 is deliberately not a variant here: a validation
//! rule that errors never propagates an `EngineError` (§4.6.6), it is
//! converted in place into a FAILED `ValidationResult` by
//! [`crate::claims::engine::ClaimsValidationEngine`].

use thiserror::Error;

/// Errors surfaced by the pricing engine and policy/catalog stores.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Caller input violates a documented precondition.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The operation is illegal in the entity's current status.
    #[error("illegal transition for {entity} {id}: expected {expected}, found {actual}")]
    State {
        entity: &'static str,
        id: String,
        expected: String,
        actual: String,
    },

    /// A unique-constraint collision (quote/policy numbering, workflow
    /// step) that exhausted its retry budget.
    #[error("concurrency conflict generating {resource} after {attempts} attempts")]
    Concurrency { resource: &'static str, attempts: u32 },

    /// The reference catalog is missing data an operation depends on.
    #[error("missing catalog dependency: {key}")]
    DependencyMissing { key: String },
}

impl EngineError {
    pub fn validation(reason: impl Into<String>) -> Self {
        EngineError::Validation { reason: reason.into() }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        EngineError::NotFound { entity, id: id.into() }
    }

    pub fn state(
        entity: &'static str,
        id: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        EngineError::State {
            entity,
            id: id.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn dependency_missing(key: impl Into<String>) -> Self {
        EngineError::DependencyMissing { key: key.into() }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
