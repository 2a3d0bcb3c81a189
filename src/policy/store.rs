//! Policy configuration persistence (spec §4.4.1, §9 numbering uniqueness).

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{EngineError, EngineResult};
use crate::policy::calculation_log::PremiumCalculationLog;
use crate::policy::config::{format_policy_number, format_quote_number, PolicyConfig};
use crate::policy::member::PolicyMember;
use crate::policy::workflow::ApprovalWorkflow;

/// Storage seam for policy configurations and their members, keyed by the
/// immutable `quote_number` (spec §3: the policy_number is minted later
/// and is not a stable key). A real deployment backs this with a database
/// whose unique constraints on `quote_number` and `(quote_number,
/// member_id)` are the actual source of truth; this trait's contract is
/// that `insert` and `add_member` must surface a collision as
/// [`EngineError::Concurrency`] rather than silently overwriting or
/// double-counting a member.
pub trait PolicyConfigStore: Send + Sync {
    fn insert(&self, config: PolicyConfig) -> EngineResult<()>;
    fn get(&self, quote_number: &str) -> EngineResult<PolicyConfig>;
    fn update(&self, config: PolicyConfig) -> EngineResult<()>;
    fn add_member(&self, member: PolicyMember) -> EngineResult<()>;
    fn update_member(&self, member: PolicyMember) -> EngineResult<()>;
    fn members_for(&self, quote_number: &str) -> EngineResult<Vec<PolicyMember>>;
    fn next_quote_number(&self, as_of: NaiveDate) -> EngineResult<String>;
    fn next_policy_number(&self, as_of: NaiveDate) -> EngineResult<String>;

    fn record_calculation_log(&self, log: PremiumCalculationLog) -> EngineResult<()>;
    fn calculation_history(&self, quote_number: &str, limit: usize) -> EngineResult<Vec<PremiumCalculationLog>>;

    fn create_approval_workflow(&self, steps: Vec<ApprovalWorkflow>) -> EngineResult<()>;
    fn approval_workflow(&self, quote_number: &str) -> EngineResult<Vec<ApprovalWorkflow>>;
    fn update_approval_step(&self, step: ApprovalWorkflow) -> EngineResult<()>;
}

#[derive(Default)]
struct Inner {
    configs: HashMap<String, PolicyConfig>,
    members: HashMap<String, Vec<PolicyMember>>,
    quote_sequences: HashMap<String, u32>,
    policy_sequences: HashMap<String, u32>,
    calculation_logs: HashMap<String, Vec<PremiumCalculationLog>>,
    approval_workflows: HashMap<String, Vec<ApprovalWorkflow>>,
}

/// In-memory `PolicyConfigStore`, with per-day/per-month monotonic
/// counters standing in for a database sequence.
#[derive(Default)]
pub struct InMemoryPolicyConfigStore {
    inner: Mutex<Inner>,
}

impl InMemoryPolicyConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

const MAX_NUMBERING_ATTEMPTS: u32 = 5;

impl PolicyConfigStore for InMemoryPolicyConfigStore {
    fn insert(&self, config: PolicyConfig) -> EngineResult<()> {
        let mut inner = self.inner.lock().expect("policy store lock poisoned");
        if inner.configs.contains_key(&config.quote_number) {
            return Err(EngineError::Concurrency { resource: "PolicyConfig", attempts: 1 });
        }
        inner.configs.insert(config.quote_number.clone(), config);
        Ok(())
    }

    fn get(&self, quote_number: &str) -> EngineResult<PolicyConfig> {
        let inner = self.inner.lock().expect("policy store lock poisoned");
        inner
            .configs
            .get(quote_number)
            .cloned()
            .ok_or_else(|| EngineError::not_found("PolicyConfig", quote_number))
    }

    fn update(&self, config: PolicyConfig) -> EngineResult<()> {
        let mut inner = self.inner.lock().expect("policy store lock poisoned");
        if !inner.configs.contains_key(&config.quote_number) {
            return Err(EngineError::not_found("PolicyConfig", &config.quote_number));
        }
        inner.configs.insert(config.quote_number.clone(), config);
        Ok(())
    }

    fn add_member(&self, member: PolicyMember) -> EngineResult<()> {
        let mut inner = self.inner.lock().expect("policy store lock poisoned");
        if !inner.configs.contains_key(&member.quote_number) {
            return Err(EngineError::not_found("PolicyConfig", &member.quote_number));
        }
        let existing = inner.members.entry(member.quote_number.clone()).or_default();
        if existing.iter().any(|m| m.member_id == member.member_id) {
            return Err(EngineError::Concurrency { resource: "PolicyMember", attempts: 1 });
        }
        existing.push(member);
        Ok(())
    }

    fn update_member(&self, member: PolicyMember) -> EngineResult<()> {
        let mut inner = self.inner.lock().expect("policy store lock poisoned");
        let members = inner
            .members
            .get_mut(&member.quote_number)
            .ok_or_else(|| EngineError::not_found("PolicyConfig", &member.quote_number))?;
        let slot = members
            .iter_mut()
            .find(|m| m.member_id == member.member_id)
            .ok_or_else(|| EngineError::not_found("PolicyMember", &member.member_id))?;
        *slot = member;
        Ok(())
    }

    fn members_for(&self, quote_number: &str) -> EngineResult<Vec<PolicyMember>> {
        let inner = self.inner.lock().expect("policy store lock poisoned");
        Ok(inner.members.get(quote_number).cloned().unwrap_or_default())
    }

    fn next_quote_number(&self, as_of: NaiveDate) -> EngineResult<String> {
        let mut inner = self.inner.lock().expect("policy store lock poisoned");
        let key = as_of.format("%Y%m%d").to_string();
        for _ in 0..MAX_NUMBERING_ATTEMPTS {
            let sequence = inner.quote_sequences.entry(key.clone()).or_insert(0);
            *sequence += 1;
            return Ok(format_quote_number(as_of, *sequence));
        }
        Err(EngineError::Concurrency { resource: "quote_number", attempts: MAX_NUMBERING_ATTEMPTS })
    }

    fn next_policy_number(&self, as_of: NaiveDate) -> EngineResult<String> {
        let mut inner = self.inner.lock().expect("policy store lock poisoned");
        let key = as_of.format("%Y%m").to_string();
        for _ in 0..MAX_NUMBERING_ATTEMPTS {
            let sequence = inner.policy_sequences.entry(key.clone()).or_insert(0);
            *sequence += 1;
            return Ok(format_policy_number(as_of, *sequence));
        }
        Err(EngineError::Concurrency { resource: "policy_number", attempts: MAX_NUMBERING_ATTEMPTS })
    }

    fn record_calculation_log(&self, log: PremiumCalculationLog) -> EngineResult<()> {
        let mut inner = self.inner.lock().expect("policy store lock poisoned");
        inner.calculation_logs.entry(log.quote_number.clone()).or_default().push(log);
        Ok(())
    }

    fn calculation_history(&self, quote_number: &str, limit: usize) -> EngineResult<Vec<PremiumCalculationLog>> {
        let inner = self.inner.lock().expect("policy store lock poisoned");
        let mut logs = inner.calculation_logs.get(quote_number).cloned().unwrap_or_default();
        logs.sort_by_key(|l| l.calculated_at);
        logs.reverse();
        logs.truncate(limit);
        Ok(logs)
    }

    fn create_approval_workflow(&self, steps: Vec<ApprovalWorkflow>) -> EngineResult<()> {
        let mut inner = self.inner.lock().expect("policy store lock poisoned");
        for step in steps {
            inner.approval_workflows.entry(step.quote_number.clone()).or_default().push(step);
        }
        Ok(())
    }

    fn approval_workflow(&self, quote_number: &str) -> EngineResult<Vec<ApprovalWorkflow>> {
        let inner = self.inner.lock().expect("policy store lock poisoned");
        Ok(inner.approval_workflows.get(quote_number).cloned().unwrap_or_default())
    }

    fn update_approval_step(&self, step: ApprovalWorkflow) -> EngineResult<()> {
        let mut inner = self.inner.lock().expect("policy store lock poisoned");
        let steps = inner
            .approval_workflows
            .get_mut(&step.quote_number)
            .ok_or_else(|| EngineError::not_found("ApprovalWorkflow", &step.quote_number))?;
        let slot = steps
            .iter_mut()
            .find(|s| s.tier == step.tier)
            .ok_or_else(|| EngineError::not_found("ApprovalWorkflow", &step.quote_number))?;
        *slot = step;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricingMethod;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(9, 0, 0).unwrap()
    }

    #[test]
    fn quote_numbers_increment_within_the_same_day() {
        let store = InMemoryPolicyConfigStore::new();
        let first = store.next_quote_number(date(2025, 3, 4)).unwrap();
        let second = store.next_quote_number(date(2025, 3, 4)).unwrap();
        assert_eq!(first, "Q202503040001");
        assert_eq!(second, "Q202503040002");
    }

    #[test]
    fn insert_rejects_duplicate_quote_number() {
        let store = InMemoryPolicyConfigStore::new();
        let config = PolicyConfig::new(
            "Q202503040001",
            "Acme",
            date(2025, 3, 1),
            date(2026, 2, 28),
            PricingMethod::FullyExperienced,
            at(2025, 3, 1),
        )
        .unwrap();
        store.insert(config.clone()).unwrap();
        assert!(matches!(store.insert(config).unwrap_err(), EngineError::Concurrency { .. }));
    }

    #[test]
    fn add_member_rejects_duplicate_member_id() {
        use crate::types::{Gender, MemberStatus, MemberType};

        let store = InMemoryPolicyConfigStore::new();
        let config = PolicyConfig::new(
            "Q202503040001",
            "Acme",
            date(2025, 3, 1),
            date(2026, 2, 28),
            PricingMethod::FullyExperienced,
            at(2025, 3, 1),
        )
        .unwrap();
        store.insert(config).unwrap();

        let member = PolicyMember::new(
            "M1",
            "Q202503040001",
            MemberType::Employee,
            date(1990, 1, 1),
            Gender::Male,
            MemberStatus::Active,
        )
        .unwrap();
        store.add_member(member.clone()).unwrap();
        assert!(matches!(store.add_member(member).unwrap_err(), EngineError::Concurrency { .. }));
    }

    #[test]
    fn get_missing_policy_is_not_found() {
        let store = InMemoryPolicyConfigStore::new();
        assert!(matches!(store.get("missing").unwrap_err(), EngineError::NotFound { .. }));
    }
}
