//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API except [`MonthKey`].
//! They centralize parsing and mapping logic so the engine enforces
//! consistent invariants.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine};

/// A calendar month in `YYYY-MM` form.
///
/// Personal allowances are keyed by member and month; incomes may override
/// their natural month with an explicit allocation month.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// The month a date naturally falls into.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parses a `YYYY-MM` string, validating the month range.
    pub fn parse(value: &str) -> ResultEngine<Self> {
        let invalid = || EngineError::Validation(format!("invalid month: {value}"));

        let (year_str, month_str) = value.split_once('-').ok_or_else(invalid)?;
        if year_str.len() != 4 || month_str.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year_str.parse().map_err(|_| invalid())?;
        let month: u32 = month_str.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self { year, month })
    }

    /// The month following this one.
    #[must_use]
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MonthKey::parse(&value)
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::Validation(format!("invalid {label} id")))
}

/// Parse a currency code stored in the DB into a strongly typed `Currency`.
pub(crate) fn model_currency(value: &str) -> ResultEngine<Currency> {
    Currency::try_from(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_key_from_date_and_display() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(MonthKey::from_date(date).to_string(), "2026-03");
    }

    #[test]
    fn month_key_parse_validates() {
        assert_eq!(MonthKey::parse("2026-03").unwrap().to_string(), "2026-03");
        assert!(MonthKey::parse("2026-13").is_err());
        assert!(MonthKey::parse("2026-0").is_err());
        assert!(MonthKey::parse("march").is_err());
    }

    #[test]
    fn month_key_next_wraps_december() {
        let december = MonthKey::parse("2026-12").unwrap();
        assert_eq!(december.next().to_string(), "2027-01");
        let june = MonthKey::parse("2026-06").unwrap();
        assert_eq!(june.next().to_string(), "2026-07");
    }
}
