//! Run claims validation for a batch of claims from a CSV file
//!
//! Outputs an adjudication summary per claim for comparison against a
//! downstream claims-adjudication run.

use std::fs::File;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::Parser;
use gh_claims_engine::catalog::{BenefitConfiguration, LimitBasis};
use gh_claims_engine::claims::{can_auto_adjudicate, pend_reasons, ClaimContext, ClaimsValidationEngine};
use gh_claims_engine::types::{BenefitCategory, ClaimChannel};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "run_claims_batch", about = "Validate a batch of claims from a CSV file")]
struct Args {
    /// Path to a CSV file with columns: claim_id,member_id,age,plan,
    /// benefit_code,service_date,claimed_amount,channel,has_preauth,
    /// is_emergency,member_since
    #[arg(long)]
    claims_csv: String,
}

#[derive(Debug, Deserialize)]
struct ClaimRow {
    claim_id: String,
    member_id: String,
    age: u8,
    plan: String,
    benefit_code: String,
    service_date: NaiveDate,
    claimed_amount: Decimal,
    channel: String,
    has_preauth: bool,
    is_emergency: bool,
    member_since: NaiveDate,
}

fn row_to_context(row: ClaimRow) -> gh_claims_engine::error::EngineResult<ClaimContext> {
    let channel = match row.channel.trim().to_uppercase().as_str() {
        "CASHLESS" => ClaimChannel::Cashless,
        _ => ClaimChannel::Reimbursement,
    };
    let mut context = ClaimContext::new(
        row.claim_id,
        row.member_id,
        row.age,
        row.plan,
        row.benefit_code,
        row.service_date,
        row.claimed_amount,
        channel,
        row.member_since,
    )?;
    if row.has_preauth {
        context = context.with_preauth("BATCH-PREAUTH");
    }
    context = context.with_emergency(row.is_emergency);
    Ok(context)
}

/// A single generic benefit configuration applied to every claim in the
/// batch; a production deployment resolves this per claim's benefit_code
/// against the reference catalog instead.
fn default_benefit() -> BenefitConfiguration {
    BenefitConfiguration::new(
        "IP_ROOM",
        BenefitCategory::Inpatient,
        "ROOM_BOARD",
        rust_decimal_macros::dec!(80),
        rust_decimal_macros::dec!(20),
        Some(rust_decimal_macros::dec!(5000000)),
        Some(LimitBasis::PerYear),
    )
    .expect("default benefit configuration is valid")
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let file = File::open(&args.claims_csv).expect("failed to open claims CSV");
    let mut reader = csv::Reader::from_reader(file);
    let rows: Vec<ClaimRow> =
        reader.deserialize().collect::<Result<Vec<_>, _>>().expect("failed to parse claims CSV");

    println!("Loaded {} claims from {}", rows.len(), args.claims_csv);

    let benefit = Arc::new(default_benefit());
    let engine = Arc::new(ClaimsValidationEngine::new());

    let outcomes: Vec<(String, bool, Vec<String>)> = rows
        .into_par_iter()
        .filter_map(|row| row_to_context(row).ok())
        .map(|context| {
            let results = engine.validate_claim(&context, &benefit);
            let auto = can_auto_adjudicate(&results);
            let reasons = pend_reasons(&results);
            (context.claim_id.clone(), auto, reasons)
        })
        .collect();

    let auto_count = outcomes.iter().filter(|(_, auto, _)| *auto).count();
    println!("\nAuto-adjudicated: {auto_count} / {}", outcomes.len());

    for (claim_id, auto, reasons) in &outcomes {
        if *auto {
            println!("  {claim_id}: AUTO-ADJUDICATED");
        } else {
            println!("  {claim_id}: MANUAL REVIEW — {}", reasons.join("; "));
        }
    }
}
