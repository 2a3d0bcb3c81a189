//! AWS Lambda handler for validating a single claim
//!
//! Accepts a claim snapshot plus its benefit configuration and returns the
//! rule verdicts and auto-adjudication outcome (spec §4.6, §6).

use chrono::NaiveDate;
use gh_claims_engine::catalog::{BenefitConfiguration, LimitBasis};
use gh_claims_engine::claims::{can_auto_adjudicate, calculate_allowed_amount, pend_reasons, ClaimContext, ClaimsValidationEngine, PriorClaim, ValidationResult};
use gh_claims_engine::types::{BenefitCategory, ClaimChannel};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Input for one claim validation run.
#[derive(Debug, Deserialize)]
pub struct ClaimValidationRequest {
    pub claim_id: String,
    pub member_id: String,
    pub age: u8,
    pub plan: String,
    pub benefit_code: String,
    pub service_date: NaiveDate,
    pub claimed_amount: Decimal,
    pub channel: String,
    pub member_since: NaiveDate,

    #[serde(default)]
    pub admission_date: Option<NaiveDate>,
    #[serde(default)]
    pub discharge_date: Option<NaiveDate>,
    #[serde(default)]
    pub diagnosis_codes: Vec<String>,
    #[serde(default)]
    pub has_preauth: bool,
    #[serde(default)]
    pub preauth_number: Option<String>,
    #[serde(default)]
    pub is_emergency: bool,
    #[serde(default)]
    pub prior_claims: Vec<PriorClaimInput>,

    pub benefit: BenefitConfigInput,
}

#[derive(Debug, Deserialize)]
pub struct PriorClaimInput {
    pub claim_id: String,
    pub benefit_code: String,
    pub service_date: NaiveDate,
    pub claimed_amount: Decimal,
    pub approved: bool,
}

/// The benefit configuration to validate the claim against; a production
/// deployment resolves this from the catalog by `benefit_code` instead of
/// accepting it inline.
#[derive(Debug, Deserialize)]
pub struct BenefitConfigInput {
    pub category: String,
    pub coverage_type: String,
    pub settlement_pct: Decimal,
    pub coinsurance_pct: Decimal,
    #[serde(default)]
    pub limit_value: Option<Decimal>,
    #[serde(default)]
    pub requires_preauth: bool,
}

/// Output of a claim validation run.
#[derive(Debug, Serialize)]
pub struct ClaimValidationResponse {
    pub claim_id: String,
    pub results: Vec<RuleResult>,
    pub can_auto_adjudicate: bool,
    pub pend_reasons: Vec<String>,
    pub allowed_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RuleResult {
    pub rule_code: String,
    pub rule_name: String,
    pub status: String,
    pub message: String,
    pub can_override: bool,
    pub required_authority_level: u8,
}

impl From<&ValidationResult> for RuleResult {
    fn from(r: &ValidationResult) -> Self {
        Self {
            rule_code: r.rule_code.to_string(),
            rule_name: r.rule_name.to_string(),
            status: format!("{:?}", r.status).to_uppercase(),
            message: r.message.clone(),
            can_override: r.can_override,
            required_authority_level: r.required_authority_level,
        }
    }
}

fn parse_channel(value: &str) -> ClaimChannel {
    match value.trim().to_uppercase().as_str() {
        "CASHLESS" => ClaimChannel::Cashless,
        _ => ClaimChannel::Reimbursement,
    }
}

fn parse_category(value: &str) -> BenefitCategory {
    match value.trim().to_uppercase().as_str() {
        "OUTPATIENT" => BenefitCategory::Outpatient,
        "MATERNITY" => BenefitCategory::Maternity,
        "DENTAL" => BenefitCategory::Dental,
        "OPTICAL" => BenefitCategory::Optical,
        "MENTAL_HEALTH" => BenefitCategory::MentalHealth,
        _ => BenefitCategory::Inpatient,
    }
}

fn build_context(req: &ClaimValidationRequest) -> gh_claims_engine::error::EngineResult<ClaimContext> {
    let mut context = ClaimContext::new(
        req.claim_id.clone(),
        req.member_id.clone(),
        req.age,
        req.plan.clone(),
        req.benefit_code.clone(),
        req.service_date,
        req.claimed_amount,
        parse_channel(&req.channel),
        req.member_since,
    )?;

    if let (Some(admission), Some(discharge)) = (req.admission_date, req.discharge_date) {
        context = context.with_admission_discharge(admission, discharge)?;
    }
    if !req.diagnosis_codes.is_empty() {
        context = context.with_diagnosis_codes(req.diagnosis_codes.clone());
    }
    if req.has_preauth {
        context = context.with_preauth(req.preauth_number.clone().unwrap_or_default());
    }
    context = context.with_emergency(req.is_emergency);

    if !req.prior_claims.is_empty() {
        let prior = req
            .prior_claims
            .iter()
            .map(|p| PriorClaim {
                claim_id: p.claim_id.clone(),
                benefit_code: p.benefit_code.clone(),
                service_date: p.service_date,
                claimed_amount: p.claimed_amount,
                approved: p.approved,
            })
            .collect();
        context = context.with_prior_claims(prior);
    }

    Ok(context)
}

fn build_benefit(req: &BenefitConfigInput) -> gh_claims_engine::error::EngineResult<BenefitConfiguration> {
    let mut benefit = BenefitConfiguration::new(
        "LAMBDA-REQUEST",
        parse_category(&req.category),
        req.coverage_type.clone(),
        req.settlement_pct,
        req.coinsurance_pct,
        req.limit_value,
        req.limit_value.map(|_| LimitBasis::PerYear),
    )?;
    benefit.requires_preauth = req.requires_preauth;
    Ok(benefit)
}

async fn handler(event: LambdaEvent<ClaimValidationRequest>) -> Result<ClaimValidationResponse, Error> {
    let request = event.payload;

    let context = match build_context(&request) {
        Ok(c) => c,
        Err(err) => return Ok(error_response(request.claim_id, err)),
    };
    let benefit = match build_benefit(&request.benefit) {
        Ok(b) => b,
        Err(err) => return Ok(error_response(request.claim_id, err)),
    };

    let engine = ClaimsValidationEngine::new();
    let results = engine.validate_claim(&context, &benefit);
    let auto = can_auto_adjudicate(&results);
    let reasons = pend_reasons(&results);
    let allowed = calculate_allowed_amount(&context, &benefit);

    Ok(ClaimValidationResponse {
        claim_id: request.claim_id,
        results: results.iter().map(RuleResult::from).collect(),
        can_auto_adjudicate: auto,
        pend_reasons: reasons,
        allowed_amount: allowed,
        error: None,
    })
}

fn error_response(claim_id: String, err: gh_claims_engine::EngineError) -> ClaimValidationResponse {
    ClaimValidationResponse {
        claim_id,
        results: Vec::new(),
        can_auto_adjudicate: false,
        pend_reasons: Vec::new(),
        allowed_amount: Decimal::ZERO,
        error: Some(err.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    lambda_runtime::run(service_fn(handler)).await
}
