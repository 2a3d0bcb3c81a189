//! Audit trail of premium recalculations (spec §3, §4.4.3).

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One recorded run of `PricingEngine::calculate_total_premium`, kept for
/// audit and for quote regeneration diffing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumCalculationLog {
    pub quote_number: String,
    pub calculated_at: NaiveDateTime,
    pub base_premium_total: Decimal,
    pub total_multiplier: Decimal,
    pub adjusted_premium: Decimal,
    pub admin_fee: Decimal,
    pub tpa_fee: Decimal,
    pub total_premium: Decimal,
    pub participant_count: i64,
}

impl PremiumCalculationLog {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        quote_number: impl Into<String>,
        calculated_at: NaiveDateTime,
        base_premium_total: Decimal,
        total_multiplier: Decimal,
        adjusted_premium: Decimal,
        admin_fee: Decimal,
        tpa_fee: Decimal,
        total_premium: Decimal,
        participant_count: i64,
    ) -> Self {
        Self {
            quote_number: quote_number.into(),
            calculated_at,
            base_premium_total,
            total_multiplier,
            adjusted_premium,
            admin_fee,
            tpa_fee,
            total_premium,
            participant_count,
        }
    }
}
