//! Per-member, per-benefit usage accumulators consulted by the claims
//! engine's limit rules (spec §4.5).

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifies one accumulator bucket: a member's usage of a benefit within
/// a policy year.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccumulatorKey {
    pub member_id: String,
    pub benefit_code: String,
    pub policy_year: i32,
}

impl AccumulatorKey {
    pub fn new(member_id: impl Into<String>, benefit_code: impl Into<String>, policy_year: i32) -> Self {
        Self { member_id: member_id.into(), benefit_code: benefit_code.into(), policy_year }
    }
}

/// Running totals for one accumulator bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccumulatorSnapshot {
    pub amount_used: Decimal,
    pub days_used: i64,
    pub visits_used: i64,
    pub cases_used: i64,
}

#[derive(Default)]
struct Bucket {
    snapshot: AccumulatorSnapshot,
    applied_claim_ids: HashSet<String>,
}

/// A usage increment to apply for one claim against one accumulator
/// bucket.
#[derive(Debug, Clone, Default)]
pub struct AccumulatorDelta {
    pub amount: Decimal,
    pub days: i64,
    pub visits: i64,
    pub cases: i64,
}

/// Thread-safe store of accumulator buckets. Applying the same
/// `claim_id` against the same key twice is a no-op after the first
/// application (spec §4.5: accumulator updates must be idempotent per
/// claim so retried submissions don't double-count usage).
#[derive(Default)]
pub struct AccumulatorStore {
    buckets: Mutex<HashMap<AccumulatorKey, Bucket>>,
}

impl AccumulatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &AccumulatorKey) -> AccumulatorSnapshot {
        let buckets = self.buckets.lock().expect("accumulator lock poisoned");
        buckets.get(key).map(|b| b.snapshot.clone()).unwrap_or_default()
    }

    /// Apply `delta` for `claim_id` against `key`, returning the resulting
    /// snapshot. A second call with the same `claim_id` returns the
    /// existing snapshot unchanged.
    pub fn apply_claim(
        &self,
        key: AccumulatorKey,
        claim_id: &str,
        delta: AccumulatorDelta,
    ) -> AccumulatorSnapshot {
        let mut buckets = self.buckets.lock().expect("accumulator lock poisoned");
        let bucket = buckets.entry(key).or_default();
        if !bucket.applied_claim_ids.insert(claim_id.to_string()) {
            return bucket.snapshot.clone();
        }
        bucket.snapshot.amount_used += delta.amount;
        bucket.snapshot.days_used += delta.days;
        bucket.snapshot.visits_used += delta.visits;
        bucket.snapshot.cases_used += delta.cases;
        bucket.snapshot.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn unknown_bucket_reads_as_zero() {
        let store = AccumulatorStore::new();
        let key = AccumulatorKey::new("M1", "INPATIENT_ROOM", 2025);
        let snapshot = store.get(&key);
        assert_eq!(snapshot.amount_used, Decimal::ZERO);
        assert_eq!(snapshot.days_used, 0);
    }

    #[test]
    fn applying_same_claim_twice_does_not_double_count() {
        let store = AccumulatorStore::new();
        let key = AccumulatorKey::new("M1", "INPATIENT_ROOM", 2025);
        let delta = AccumulatorDelta { amount: dec!(500000), days: 3, visits: 0, cases: 1 };
        let first = store.apply_claim(key.clone(), "CLM-1", delta.clone());
        let second = store.apply_claim(key.clone(), "CLM-1", delta);
        assert_eq!(first.amount_used, dec!(500000));
        assert_eq!(second.amount_used, dec!(500000));
        assert_eq!(second.days_used, 3);
    }

    #[test]
    fn distinct_claims_accumulate() {
        let store = AccumulatorStore::new();
        let key = AccumulatorKey::new("M1", "INPATIENT_ROOM", 2025);
        store.apply_claim(key.clone(), "CLM-1", AccumulatorDelta { amount: dec!(500000), days: 3, visits: 0, cases: 1 });
        let after_second = store.apply_claim(key.clone(), "CLM-2", AccumulatorDelta { amount: dec!(250000), days: 1, visits: 0, cases: 1 });
        assert_eq!(after_second.amount_used, dec!(750000));
        assert_eq!(after_second.days_used, 4);
        assert_eq!(after_second.cases_used, 2);
    }
}
