//! Engine configuration (spec §10.3)
//!
//! Deliberately narrow: database connection strings, downstream service
//! URLs, CORS origins and the other fields of the original
//! `services/claims-service/src/config/settings.py` belong to the
//! out-of-scope deployable (spec §1) and are never read here.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Tunable constants plus service identity, loaded via the `config` crate
/// layered over `dotenvy`-sourced environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub service_name: String,
    pub version: String,
    pub environment: String,
    pub log_level: String,

    /// Small-group loading thresholds and multipliers (§4.4.2), in
    /// ascending participant-count order.
    pub small_group_bands: Vec<SmallGroupBand>,

    /// Maternity demographic-loading threshold (fraction of participants)
    /// and multiplier (§4.4.2).
    pub maternity_female_fraction_threshold: Decimal,
    pub maternity_loading_multiplier: Decimal,

    /// Administrative fee floor and percentage-of-premium rate (§4.4.4).
    pub admin_fee_floor: Decimal,
    pub admin_fee_rate: Decimal,

    /// TPA fee floor and per-participant rate (§4.4.4).
    pub tpa_fee_floor: Decimal,
    pub tpa_fee_per_participant: Decimal,

    /// Minimum participant count required to submit (§4.4.6).
    pub minimum_participants_for_submission: i64,
}

/// One band of the small-group loading table (§4.4.2): applies when
/// `participant_count < upper_bound_exclusive`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SmallGroupBand {
    pub upper_bound_exclusive: i64,
    pub multiplier: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            service_name: "gh-claims-engine".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
            log_level: "info".to_string(),
            small_group_bands: vec![
                SmallGroupBand { upper_bound_exclusive: 15, multiplier: dec!(1.500) },
                SmallGroupBand { upper_bound_exclusive: 25, multiplier: dec!(1.250) },
                SmallGroupBand { upper_bound_exclusive: 50, multiplier: dec!(1.100) },
            ],
            maternity_female_fraction_threshold: dec!(0.40),
            maternity_loading_multiplier: dec!(1.150),
            admin_fee_floor: dec!(100000),
            admin_fee_rate: dec!(0.05),
            tpa_fee_floor: dec!(100000),
            tpa_fee_per_participant: dec!(10000),
            minimum_participants_for_submission: 5,
        }
    }
}

impl EngineConfig {
    /// Load from environment, falling back to the documented defaults for
    /// anything unset. Reads a `.env` file if present (teacher has no
    /// config-loading crate; `dotenvy` + `config` are pulled from the
    /// Open-insurance-core reference pack for this).
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            .add_source(config::Environment::with_prefix("GH").separator("__"));

        match builder.build() {
            Ok(cfg) => cfg.try_deserialize().unwrap_or_default(),
            Err(_) => EngineConfig::default(),
        }
    }

    /// Small-group loading multiplier for a given participant count
    /// (§4.4.2): the first band whose upper bound is not exceeded, else
    /// 1.000.
    pub fn small_group_multiplier(&self, participant_count: i64) -> Decimal {
        self.small_group_bands
            .iter()
            .find(|band| participant_count < band.upper_bound_exclusive)
            .map(|band| band.multiplier)
            .unwrap_or(Decimal::ONE)
    }
}
