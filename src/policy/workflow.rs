//! Approval workflow steps gated by premium thresholds (spec §4.4.6).

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::ApprovalStepStatus;

/// An approval tier, created only when the adjusted premium meets its
/// threshold (spec §4.4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalTier {
    Underwriting,
    Actuarial,
    Management,
}

impl ApprovalTier {
    pub const ORDERED: [ApprovalTier; 3] =
        [ApprovalTier::Underwriting, ApprovalTier::Actuarial, ApprovalTier::Management];

    pub fn threshold(&self) -> Decimal {
        match self {
            ApprovalTier::Underwriting => dec!(1000000),
            ApprovalTier::Actuarial => dec!(5000000),
            ApprovalTier::Management => dec!(10000000),
        }
    }
}

/// One step of a policy's approval workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalWorkflow {
    pub quote_number: String,
    pub tier: ApprovalTier,
    pub status: ApprovalStepStatus,
    pub approver: Option<String>,
    pub decided_at: Option<NaiveDateTime>,
    pub comments: Option<String>,
}

impl ApprovalWorkflow {
    pub fn pending(quote_number: impl Into<String>, tier: ApprovalTier) -> Self {
        Self {
            quote_number: quote_number.into(),
            tier,
            status: ApprovalStepStatus::Pending,
            approver: None,
            decided_at: None,
            comments: None,
        }
    }

    /// Build the ordered set of steps an `adjusted_premium` requires
    /// (spec §4.4.6: steps are created only if the threshold is met).
    pub fn required_steps(quote_number: &str, adjusted_premium: Decimal) -> Vec<ApprovalWorkflow> {
        ApprovalTier::ORDERED
            .into_iter()
            .filter(|tier| adjusted_premium >= tier.threshold())
            .map(|tier| ApprovalWorkflow::pending(quote_number, tier))
            .collect()
    }

    pub fn decide(
        &mut self,
        status: ApprovalStepStatus,
        approver: impl Into<String>,
        decided_at: NaiveDateTime,
        comments: Option<String>,
    ) -> EngineResult<()> {
        if self.status != ApprovalStepStatus::Pending {
            return Err(EngineError::state(
                "ApprovalWorkflow",
                &self.quote_number,
                "PENDING",
                format!("{:?}", self.status).to_uppercase(),
            ));
        }
        if matches!(status, ApprovalStepStatus::Pending) {
            return Err(EngineError::validation("decide() cannot set status back to PENDING"));
        }
        self.status = status;
        self.approver = Some(approver.into());
        self.decided_at = Some(decided_at);
        self.comments = comments;
        Ok(())
    }
}

pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).expect("midnight is always a valid time")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_steps_below_underwriting_threshold() {
        let steps = ApprovalWorkflow::required_steps("PGH202501-00001", dec!(999999));
        assert!(steps.is_empty());
    }

    #[test]
    fn only_underwriting_between_first_two_thresholds() {
        let steps = ApprovalWorkflow::required_steps("PGH202501-00001", dec!(2000000));
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].tier, ApprovalTier::Underwriting);
    }

    #[test]
    fn all_three_tiers_above_management_threshold() {
        let steps = ApprovalWorkflow::required_steps("PGH202501-00001", dec!(12000000));
        assert_eq!(steps.len(), 3);
    }

    #[test]
    fn decide_rejects_non_pending_step() {
        let mut step = ApprovalWorkflow::pending("PGH202501-00001", ApprovalTier::Underwriting);
        let when = midnight(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        step.decide(ApprovalStepStatus::Approved, "u1", when, None).unwrap();
        assert!(step.decide(ApprovalStepStatus::Approved, "u1", when, None).is_err());
    }
}
