//! The immutable claim snapshot evaluated by the rule set (spec §3
//! ClaimContext, §5: "independent, read-only over an immutable
//! ClaimContext snapshot taken at entry").

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accumulators::AccumulatorSnapshot;
use crate::error::{EngineError, EngineResult};
use crate::types::ClaimChannel;

/// One prior claim, as far as the duplicate-detection and prerequisite
/// rules need to see it (spec §4.6.4 VAL008, VAL009).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorClaim {
    pub claim_id: String,
    pub benefit_code: String,
    pub service_date: NaiveDate,
    pub claimed_amount: Decimal,
    /// Whether this prior claim auto-adjudicated (spec §4.6.4 VAL009: a
    /// prerequisite benefit must "appear as PASSED" in claim history).
    pub approved: bool,
}

/// A claim as submitted for adjudication, resolved to everything the rule
/// set needs to evaluate it without further lookups (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimContext {
    pub claim_id: String,
    pub member_id: String,
    pub age: u8,
    pub plan: String,
    pub benefit_code: String,
    pub service_date: NaiveDate,
    pub admission_date: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
    pub diagnosis_codes: Vec<String>,
    pub procedure_codes: Vec<String>,
    pub claimed_amount: Decimal,
    pub channel: ClaimChannel,
    pub has_preauth: bool,
    pub preauth_number: Option<String>,
    pub is_emergency: bool,
    pub member_since: NaiveDate,
    pub prior_claims: Vec<PriorClaim>,
    pub accumulator: AccumulatorSnapshot,
}

impl ClaimContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        claim_id: impl Into<String>,
        member_id: impl Into<String>,
        age: u8,
        plan: impl Into<String>,
        benefit_code: impl Into<String>,
        service_date: NaiveDate,
        claimed_amount: Decimal,
        channel: ClaimChannel,
        member_since: NaiveDate,
    ) -> EngineResult<Self> {
        if claimed_amount.is_sign_negative() {
            return Err(EngineError::validation("claimed_amount must be >= 0"));
        }
        Ok(Self {
            claim_id: claim_id.into(),
            member_id: member_id.into(),
            age,
            plan: plan.into(),
            benefit_code: benefit_code.into(),
            service_date,
            admission_date: None,
            discharge_date: None,
            diagnosis_codes: Vec::new(),
            procedure_codes: Vec::new(),
            claimed_amount,
            channel,
            has_preauth: false,
            preauth_number: None,
            is_emergency: false,
            member_since,
            prior_claims: Vec::new(),
            accumulator: AccumulatorSnapshot::default(),
        })
    }

    pub fn with_admission_discharge(
        mut self,
        admission_date: NaiveDate,
        discharge_date: NaiveDate,
    ) -> EngineResult<Self> {
        if discharge_date < admission_date {
            return Err(EngineError::validation("discharge_date must be >= admission_date"));
        }
        self.admission_date = Some(admission_date);
        self.discharge_date = Some(discharge_date);
        Ok(self)
    }

    pub fn with_diagnosis_codes(mut self, codes: Vec<String>) -> Self {
        self.diagnosis_codes = codes;
        self
    }

    pub fn with_preauth(mut self, number: impl Into<String>) -> Self {
        self.has_preauth = true;
        self.preauth_number = Some(number.into());
        self
    }

    pub fn with_emergency(mut self, is_emergency: bool) -> Self {
        self.is_emergency = is_emergency;
        self
    }

    pub fn with_prior_claims(mut self, prior_claims: Vec<PriorClaim>) -> Self {
        self.prior_claims = prior_claims;
        self
    }

    pub fn with_accumulator(mut self, accumulator: AccumulatorSnapshot) -> Self {
        self.accumulator = accumulator;
        self
    }

    /// Days between `member_since` and `service_date` (spec §4.6.4 VAL002);
    /// negative if the claim predates enrollment.
    pub fn days_since_enrollment(&self) -> i64 {
        (self.service_date - self.member_since).num_days()
    }

    /// Stable fingerprint used by the duplicate rule (spec §4.6.4 VAL008,
    /// §8 invariant 9): same (member_id, benefit_code, service_date,
    /// claimed_amount) must always hash the same.
    pub fn duplicate_fingerprint(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.member_id.hash(&mut hasher);
        self.benefit_code.hash(&mut hasher);
        self.service_date.hash(&mut hasher);
        self.claimed_amount.hash(&mut hasher);
        hasher.finish()
    }
}
