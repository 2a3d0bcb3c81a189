//! Shared enums used across the catalog, policy and claims modules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Biological gender as stored on a member or product template row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// The gender dimension actually used to rate a premium (spec §4.2):
/// "when age < 18 use CHILD regardless of biological gender; otherwise use
/// MALE or FEMALE as stored."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatingGender {
    Male,
    Female,
    Child,
}

impl RatingGender {
    /// Apply the gender-selection rule of spec §4.2.
    pub fn for_age_and_gender(age: u8, gender: Gender) -> Self {
        if age < 18 {
            RatingGender::Child
        } else {
            match gender {
                Gender::Male => RatingGender::Male,
                Gender::Female => RatingGender::Female,
            }
        }
    }
}

/// The six benefit categories enumerated in spec §4.6.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BenefitCategory {
    Inpatient,
    Outpatient,
    Maternity,
    Dental,
    Optical,
    MentalHealth,
}

impl BenefitCategory {
    pub const ALL: [BenefitCategory; 6] = [
        BenefitCategory::Inpatient,
        BenefitCategory::Outpatient,
        BenefitCategory::Maternity,
        BenefitCategory::Dental,
        BenefitCategory::Optical,
        BenefitCategory::MentalHealth,
    ];

    /// INPATIENT and OUTPATIENT are selected by default on config creation
    /// (spec §4.4.1).
    pub fn selected_by_default(&self) -> bool {
        matches!(self, BenefitCategory::Inpatient | BenefitCategory::Outpatient)
    }
}

impl fmt::Display for BenefitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BenefitCategory::Inpatient => "INPATIENT",
            BenefitCategory::Outpatient => "OUTPATIENT",
            BenefitCategory::Maternity => "MATERNITY",
            BenefitCategory::Dental => "DENTAL",
            BenefitCategory::Optical => "OPTICAL",
            BenefitCategory::MentalHealth => "MENTAL_HEALTH",
        };
        f.write_str(s)
    }
}

/// Relationship of a member to the policy's primary employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberType {
    Employee,
    Spouse,
    Child,
}

impl std::str::FromStr for MemberType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EMPLOYEE" => Ok(MemberType::Employee),
            "SPOUSE" => Ok(MemberType::Spouse),
            "CHILD" => Ok(MemberType::Child),
            other => Err(format!("unrecognized member_type: {other}")),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MALE" | "M" => Ok(Gender::Male),
            "FEMALE" | "F" => Ok(Gender::Female),
            other => Err(format!("unrecognized gender: {other}")),
        }
    }
}

/// A member's enrollment status (spec §3 PolicyMember).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    Active,
    Terminated,
}

/// Lifecycle status of a `PolicyConfig` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyStatus {
    Draft,
    Quoted,
    Approved,
    Active,
    Expired,
    Cancelled,
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Status of a single `ApprovalWorkflow` step (spec §4.4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStepStatus {
    Pending,
    Approved,
    Rejected,
    Revision,
}

/// How the policy's premium is rated; stored verbatim, not interpreted by
/// the pricing engine beyond being echoed back on the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingMethod {
    FullyExperienced,
    Manual,
    Community,
}

/// How a claim was submitted (spec §3 ClaimContext `channel`; resolved
/// concretely from `original_source`'s `claim_type` column, see
/// SPEC_FULL.md §11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimChannel {
    Cashless,
    Reimbursement,
}
