//! Age-band multipliers (spec §3, §4.2).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::RatingGender;

/// An inclusive `[age_from, age_to]` x gender partition of a template's rate
/// grid, contributing a multiplier on top of the base rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeBandMultiplier {
    pub template_code: String,
    pub age_from: u8,
    pub age_to: u8,
    pub gender: RatingGender,
    pub multiplier: Decimal,
}

impl AgeBandMultiplier {
    pub fn new(
        template_code: impl Into<String>,
        age_from: u8,
        age_to: u8,
        gender: RatingGender,
        multiplier: Decimal,
    ) -> EngineResult<Self> {
        if age_to < age_from {
            return Err(EngineError::validation("age_to must be >= age_from"));
        }
        if multiplier.is_sign_negative() {
            return Err(EngineError::validation("multiplier must be non-negative"));
        }
        // CHILD bands apply iff age < 18 (spec §3).
        if gender == RatingGender::Child && age_from >= 18 {
            return Err(EngineError::validation("CHILD age bands must start below age 18"));
        }

        Ok(Self { template_code: template_code.into(), age_from, age_to, gender, multiplier })
    }

    /// Inclusive-bounds containment check (spec §4.2).
    pub fn contains(&self, age: u8, gender: RatingGender) -> bool {
        self.gender == gender && age >= self.age_from && age <= self.age_to
    }
}
