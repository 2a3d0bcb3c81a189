//! Policy configuration aggregate: members, selections, approval workflow
//! and the store that persists them (spec §3, §4.4).

pub mod calculation_log;
pub mod config;
pub mod member;
pub mod selection;
pub mod store;
pub mod workflow;

pub use calculation_log::PremiumCalculationLog;
pub use config::{format_policy_number, format_quote_number, PolicyConfig};
pub use member::PolicyMember;
pub use selection::{BenefitSelection, PolicyBenefitOverride, PolicyTcSelection};
pub use store::{InMemoryPolicyConfigStore, PolicyConfigStore};
pub use workflow::{ApprovalTier, ApprovalWorkflow};
