//! Enrolled members of a policy configuration (spec §3, §4.4.2).

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::{Gender, MemberStatus, MemberType, RatingGender};

/// One enrolled individual under a [`crate::policy::PolicyConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyMember {
    pub member_id: String,
    pub quote_number: String,
    pub member_type: MemberType,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub status: MemberStatus,
    /// Sum of this member's benefit contributions from the last premium
    /// calculation (spec §4.4.3): `0` until the first calculate.
    pub base_premium: Decimal,
    /// Descriptive label of the age band last matched for this member,
    /// for audit display; `None` before the first calculate or when no
    /// band matched.
    pub age_band: Option<String>,
}

impl PolicyMember {
    pub fn new(
        member_id: impl Into<String>,
        quote_number: impl Into<String>,
        member_type: MemberType,
        date_of_birth: NaiveDate,
        gender: Gender,
        status: MemberStatus,
    ) -> EngineResult<Self> {
        Ok(Self {
            member_id: member_id.into(),
            quote_number: quote_number.into(),
            member_type,
            date_of_birth,
            gender,
            status,
            base_premium: Decimal::ZERO,
            age_band: None,
        })
    }

    /// Record the result of a premium calculation pass (spec §4.4.3: "base
    /// premium is... stored back on the member row").
    pub fn record_premium(&mut self, base_premium: Decimal, age_band: Option<String>) {
        self.base_premium = base_premium;
        self.age_band = age_band;
    }

    /// Age in whole years as of `as_of` (spec §4.2, §13: derived from
    /// `date_of_birth`, never stored or queried as a range).
    pub fn age_on(&self, as_of: NaiveDate) -> EngineResult<u8> {
        if as_of < self.date_of_birth {
            return Err(EngineError::validation("as_of predates member date_of_birth"));
        }
        let mut years = as_of.year() - self.date_of_birth.year();
        let had_birthday = (as_of.month(), as_of.day()) >= (self.date_of_birth.month(), self.date_of_birth.day());
        if !had_birthday {
            years -= 1;
        }
        u8::try_from(years).map_err(|_| EngineError::validation("computed age out of range"))
    }

    /// The gender dimension used for rating (spec §4.2).
    pub fn rating_gender_on(&self, as_of: NaiveDate) -> EngineResult<RatingGender> {
        Ok(RatingGender::for_age_and_gender(self.age_on(as_of)?, self.gender))
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, MemberStatus::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn member(dob: NaiveDate, gender: Gender) -> PolicyMember {
        PolicyMember::new("M1", "PGH202501-00001", MemberType::Employee, dob, gender, MemberStatus::Active)
            .unwrap()
    }

    #[test]
    fn age_before_birthday_this_year_is_not_yet_incremented() {
        let m = member(date(1990, 6, 15), Gender::Male);
        assert_eq!(m.age_on(date(2025, 6, 14)).unwrap(), 34);
        assert_eq!(m.age_on(date(2025, 6, 15)).unwrap(), 35);
    }

    #[test]
    fn rejects_as_of_before_birth() {
        let m = member(date(1990, 6, 15), Gender::Male);
        assert!(m.age_on(date(1980, 1, 1)).is_err());
    }

    #[test]
    fn minor_always_rates_as_child() {
        let m = member(date(2015, 1, 1), Gender::Female);
        assert_eq!(m.rating_gender_on(date(2025, 1, 1)).unwrap(), RatingGender::Child);
    }

    #[test]
    fn adult_rates_by_stored_gender() {
        let m = member(date(1990, 1, 1), Gender::Female);
        assert_eq!(m.rating_gender_on(date(2025, 1, 1)).unwrap(), RatingGender::Female);
    }
}
