//! Premium calculation CLI
//!
//! Builds a sample group-health configuration against an in-memory
//! catalog and store, runs it through the pricing engine, and prints the
//! resulting breakdown.

use std::sync::Arc;

use chrono::NaiveDate;
use clap::Parser;
use gh_claims_engine::catalog::{AgeBandMultiplier, CatalogHandle, ProductTemplate, ReferenceCatalog, TcFactor, TcFactorOption};
use gh_claims_engine::policy::{InMemoryPolicyConfigStore, PolicyConfigStore, PolicyMember};
use gh_claims_engine::pricing::PricingEngine;
use gh_claims_engine::types::{BenefitCategory, Gender, MemberStatus, MemberType, PricingMethod, RatingGender};
use gh_claims_engine::EngineConfig;
use rust_decimal_macros::dec;

#[derive(Parser, Debug)]
#[command(name = "calculate_premium", about = "Price a sample group-health configuration")]
struct Args {
    #[arg(long, default_value = "Acme Manufacturing")]
    group_name: String,

    #[arg(long, default_value_t = 10)]
    participants: u32,

    /// Persist a PremiumCalculationLog entry for the run.
    #[arg(long, default_value_t = false)]
    save: bool,
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
        .add_tc_factor(
            TcFactor { factor_code: "CLASS".into(), category: "PLAN".into(), display_order: 1, active: true },
            vec![
                TcFactorOption::new("CLASS", "STANDARD", dec!(1.0), None, None, true).unwrap(),
                TcFactorOption::new("CLASS", "EXECUTIVE", dec!(1.25), None, None, false).unwrap(),
            ],
        )
        .unwrap();

    catalog
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = EngineConfig::load();
    let catalog = CatalogHandle::new(seed_catalog());
    let store: Arc<dyn PolicyConfigStore> = Arc::new(InMemoryPolicyConfigStore::new());
    let engine = PricingEngine::new(catalog, store.clone(), config);

    let coverage_start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let coverage_end = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
    let at = coverage_start.and_hms_opt(9, 0, 0).unwrap();

    let policy_config = engine
        .create_config(args.group_name.clone(), coverage_start, coverage_end, PricingMethod::FullyExperienced, at)
        .expect("failed to create configuration");

    println!("Group Health Premium Pricing Engine");
    println!("====================================\n");
    println!("Quote number: {}", policy_config.quote_number);
    println!("Group: {}\n", args.group_name);

    for i in 1..=args.participants {
        let dob = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        let gender = if i % 2 == 0 { Gender::Female } else { Gender::Male };
        let member = PolicyMember::new(
            format!("M{i}"),
            policy_config.quote_number.clone(),
            MemberType::Employee,
            dob,
            gender,
            MemberStatus::Active,
        )
        .expect("failed to build member");
        engine.add_member(&policy_config.quote_number, member, at).expect("failed to add member");
    }

    let priced = engine
        .calculate_total_premium(&policy_config.quote_number, at, args.save)
        .expect("premium calculation failed");

    println!("Participants: {}", args.participants);
    println!("Base premium total: {}", priced.base_premium_total);
    println!("Total multiplier: {}", priced.total_multiplier);
    println!("Adjusted premium: {}", priced.adjusted_premium);
    println!("Admin fee: {}", priced.admin_fee);
    println!("TPA fee: {}", priced.tpa_fee);
    println!("Total premium: {}", priced.total_premium);

    if args.save {
        let history = store.calculation_history(&policy_config.quote_number, 10).unwrap_or_default();
        println!("\nCalculation log entries: {}", history.len());
    }
}
