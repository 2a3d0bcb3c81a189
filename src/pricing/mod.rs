//! The premium pricing engine: defaults, category factors, member/total
//! premium, T&C updates, submission and approvals, member import, and
//! quote snapshots (spec §4.4).

pub mod engine;

pub use engine::{MemberImportOutcome, MemberImportRow, PricingEngine, QuoteSnapshot};
