//! AWS Lambda handler for pricing a group-health configuration
//!
//! Accepts a configuration request (group, coverage window, members) and
//! returns the calculated premium breakdown (spec §6).

use std::sync::Arc;

use chrono::NaiveDate;
use gh_claims_engine::catalog::{AgeBandMultiplier, CatalogHandle, ProductTemplate, ReferenceCatalog};
use gh_claims_engine::policy::{InMemoryPolicyConfigStore, PolicyConfigStore};
use gh_claims_engine::pricing::{MemberImportRow, PricingEngine};
use gh_claims_engine::types::{BenefitCategory, PricingMethod, RatingGender};
use gh_claims_engine::EngineConfig;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Input for one pricing run.
#[derive(Debug, Deserialize)]
pub struct PricingRequest {
    pub group_name: String,
    pub coverage_start: NaiveDate,
    pub coverage_end: NaiveDate,

    #[serde(default = "default_pricing_method")]
    pub pricing_method: String,

    #[serde(default)]
    pub members: Vec<MemberImportRow>,

    #[serde(default)]
    pub selected_categories: Vec<String>,
}

fn default_pricing_method() -> String {
    "FULLY_EXPERIENCED".to_string()
}

/// Output of a pricing run.
#[derive(Debug, Serialize)]
pub struct PricingResponse {
    pub quote_number: String,
    pub participant_count: i64,
    pub base_premium_total: Decimal,
    pub total_multiplier: Decimal,
    pub adjusted_premium: Decimal,
    pub admin_fee: Decimal,
    pub tpa_fee: Decimal,
    pub total_premium: Decimal,
    pub import_errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn parse_pricing_method(value: &str) -> PricingMethod {
    match value.trim().to_uppercase().as_str() {
        "MANUAL" => PricingMethod::Manual,
        "COMMUNITY" => PricingMethod::Community,
        _ => PricingMethod::FullyExperienced,
    }
}

fn seed_catalog() -> ReferenceCatalog {
    let effective_from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let mut catalog = ReferenceCatalog::new();
    for (code, category, male, female, child) in [
        ("INPATIENT_STD", BenefitCategory::Inpatient, dec!(1000000), dec!(1000000), dec!(600000)),
        ("OUTPATIENT_STD", BenefitCategory::Outpatient, dec!(1000000), dec!(1000000), dec!(600000)),
        ("MATERNITY_STD", BenefitCategory::Maternity, dec!(0), dec!(800000), dec!(0)),
        ("DENTAL_STD", BenefitCategory::Dental, dec!(300000), dec!(300000), dec!(200000)),
        ("OPTICAL_STD", BenefitCategory::Optical, dec!(200000), dec!(200000), dec!(150000)),
        ("MENTAL_HEALTH_STD", BenefitCategory::MentalHealth, dec!(400000), dec!(400000), dec!(250000)),
    ] {
        catalog.add_template(ProductTemplate::new(code, category, male, female, child, effective_from, None).unwrap());
        catalog.add_age_band(AgeBandMultiplier::new(code, 46, 60, RatingGender::Male, dec!(1.250)).unwrap());
        catalog.add_age_band(AgeBandMultiplier::new(code, 46, 60, RatingGender::Female, dec!(1.250)).unwrap());
    }
    catalog
}

async fn handler(event: LambdaEvent<PricingRequest>) -> Result<PricingResponse, Error> {
    let request = event.payload;

    let config = EngineConfig::load();
    let catalog = CatalogHandle::new(seed_catalog());
    let store: Arc<dyn PolicyConfigStore> = Arc::new(InMemoryPolicyConfigStore::new());
    let engine = PricingEngine::new(catalog, store, config);

    let at = request.coverage_start.and_hms_opt(0, 0, 0).expect("midnight is always valid");
    let pricing_method = parse_pricing_method(&request.pricing_method);

    let policy_config = match engine.create_config(
        request.group_name.clone(),
        request.coverage_start,
        request.coverage_end,
        pricing_method,
        at,
    ) {
        Ok(c) => c,
        Err(err) => return Ok(error_response(err)),
    };

    let member_count = request.members.len();
    let mut import_errors = Vec::new();
    if !request.members.is_empty() {
        match engine.import_members(&policy_config.quote_number, request.members, at) {
            Ok(outcome) => {
                import_errors = outcome.errors.into_iter().map(|(idx, msg)| format!("row {idx}: {msg}")).collect();
            }
            Err(err) => return Ok(error_response(err)),
        }
    }

    for category_name in &request.selected_categories {
        if let Some(category) = parse_category(category_name) {
            if let Err(err) = engine.set_benefit_selected(&policy_config.quote_number, category, true, at) {
                return Ok(error_response(err));
            }
        }
    }

    let priced = match engine.calculate_total_premium(&policy_config.quote_number, at, true) {
        Ok(p) => p,
        Err(err) => return Ok(error_response(err)),
    };

    Ok(PricingResponse {
        quote_number: priced.quote_number,
        participant_count: member_count.try_into().unwrap_or(0),
        base_premium_total: priced.base_premium_total,
        total_multiplier: priced.total_multiplier,
        adjusted_premium: priced.adjusted_premium,
        admin_fee: priced.admin_fee,
        tpa_fee: priced.tpa_fee,
        total_premium: priced.total_premium,
        import_errors,
        error: None,
    })
}

fn parse_category(name: &str) -> Option<BenefitCategory> {
    match name.trim().to_uppercase().as_str() {
        "INPATIENT" => Some(BenefitCategory::Inpatient),
        "OUTPATIENT" => Some(BenefitCategory::Outpatient),
        "MATERNITY" => Some(BenefitCategory::Maternity),
        "DENTAL" => Some(BenefitCategory::Dental),
        "OPTICAL" => Some(BenefitCategory::Optical),
        "MENTAL_HEALTH" => Some(BenefitCategory::MentalHealth),
        _ => None,
    }
}

fn error_response(err: gh_claims_engine::EngineError) -> PricingResponse {
    PricingResponse {
        quote_number: String::new(),
        participant_count: 0,
        base_premium_total: Decimal::ZERO,
        total_multiplier: Decimal::ZERO,
        adjusted_premium: Decimal::ZERO,
        admin_fee: Decimal::ZERO,
        tpa_fee: Decimal::ZERO,
        total_premium: Decimal::ZERO,
        import_errors: Vec::new(),
        error: Some(err.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    lambda_runtime::run(service_fn(handler)).await
}
