//! Product templates: base premiums per benefit category (spec §3, §4.3).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::{BenefitCategory, RatingGender};

/// A rate template: base adult-male/adult-female/child premiums for one
/// benefit category, effective over `[effective_from, effective_to)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductTemplate {
    pub template_code: String,
    pub category: BenefitCategory,
    pub base_premium_adult_male: Decimal,
    pub base_premium_adult_female: Decimal,
    pub base_premium_child: Decimal,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
}

impl ProductTemplate {
    pub fn new(
        template_code: impl Into<String>,
        category: BenefitCategory,
        base_premium_adult_male: Decimal,
        base_premium_adult_female: Decimal,
        base_premium_child: Decimal,
        effective_from: NaiveDate,
        effective_to: Option<NaiveDate>,
    ) -> EngineResult<Self> {
        if let Some(to) = effective_to {
            if to < effective_from {
                return Err(EngineError::validation(
                    "effective_to must be null or >= effective_from",
                ));
            }
        }
        for (name, value) in [
            ("base_premium_adult_male", base_premium_adult_male),
            ("base_premium_adult_female", base_premium_adult_female),
            ("base_premium_child", base_premium_child),
        ] {
            if value.is_sign_negative() {
                return Err(EngineError::validation(format!("{name} must be non-negative")));
            }
        }

        Ok(Self {
            template_code: template_code.into(),
            category,
            base_premium_adult_male,
            base_premium_adult_female,
            base_premium_child,
            effective_from,
            effective_to,
        })
    }

    /// Is this template effective on `as_of` (spec §4.2: look up templates
    /// effective on a date)?
    pub fn is_effective_on(&self, as_of: NaiveDate) -> bool {
        self.effective_from <= as_of && self.effective_to.map_or(true, |to| to >= as_of)
    }

    /// Base rate for the given rating gender (spec §4.4.3 step 1).
    pub fn base_rate_for(&self, rating_gender: RatingGender) -> Decimal {
        match rating_gender {
            RatingGender::Child => self.base_premium_child,
            RatingGender::Male => self.base_premium_adult_male,
            RatingGender::Female => self.base_premium_adult_female,
        }
    }
}
