//! Supplemental rate tables keyed on age band and gender (spec §3).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::RatingGender;

/// One age-band x gender cell in a [`RateTable`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateCell {
    pub age_from: u8,
    pub age_to: u8,
    pub gender: RatingGender,
    pub rate: Decimal,
}

/// A named, dated grid of rates, independent of any single product
/// template — used for supplemental rating inputs such as rider pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    pub rate_code: String,
    pub benefit_code: String,
    pub effective_date: NaiveDate,
    pub cells: Vec<RateCell>,
}

impl RateTable {
    pub fn new(
        rate_code: impl Into<String>,
        benefit_code: impl Into<String>,
        effective_date: NaiveDate,
        cells: Vec<RateCell>,
    ) -> EngineResult<Self> {
        for cell in &cells {
            if cell.age_to < cell.age_from {
                return Err(EngineError::validation("rate cell age_to must be >= age_from"));
            }
            if cell.rate.is_sign_negative() {
                return Err(EngineError::validation("rate cell rate must be non-negative"));
            }
        }

        Ok(Self {
            rate_code: rate_code.into(),
            benefit_code: benefit_code.into(),
            effective_date,
            cells,
        })
    }

    /// First matching cell's rate, or `None` when no cell covers this
    /// age/gender combination.
    pub fn rate_for(&self, age: u8, gender: RatingGender) -> Option<Decimal> {
        self.cells
            .iter()
            .find(|cell| cell.gender == gender && age >= cell.age_from && age <= cell.age_to)
            .map(|cell| cell.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_table() -> RateTable {
        RateTable::new(
            "RIDER_DENTAL_V1",
            "DENTAL_RIDER",
            date(2025, 1, 1),
            vec![
                RateCell { age_from: 0, age_to: 17, gender: RatingGender::Child, rate: dec!(10000) },
                RateCell { age_from: 18, age_to: 150, gender: RatingGender::Male, rate: dec!(20000) },
                RateCell { age_from: 18, age_to: 150, gender: RatingGender::Female, rate: dec!(22000) },
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_inverted_cell_band() {
        let result = RateTable::new(
            "BAD",
            "X",
            date(2025, 1, 1),
            vec![RateCell { age_from: 40, age_to: 30, gender: RatingGender::Male, rate: dec!(1) }],
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_negative_rate() {
        let result = RateTable::new(
            "BAD",
            "X",
            date(2025, 1, 1),
            vec![RateCell { age_from: 0, age_to: 10, gender: RatingGender::Child, rate: dec!(-1) }],
        );
        assert!(result.is_err());
    }

    #[test]
    fn looks_up_matching_cell() {
        let table = sample_table();
        assert_eq!(table.rate_for(10, RatingGender::Child), Some(dec!(10000)));
        assert_eq!(table.rate_for(40, RatingGender::Female), Some(dec!(22000)));
        assert_eq!(table.rate_for(40, RatingGender::Child), None);
    }
}
