//! Tax period identifiers (`YYYYMM`).

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a [`PeriodId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodIdError {
    /// Input is not six ASCII digits.
    #[error("Period id must be six digits (YYYYMM), got {0:?}")]
    Format(String),

    /// Month outside 1..=12.
    #[error("Invalid month {0} in period id")]
    Month(u32),

    /// Year outside 1..=9999.
    #[error("Invalid year {0} in period id")]
    Year(i32),
}

/// Identifier of a calendar-month tax period, rendered as `YYYYMM`.
///
/// Internally this is the first day of the month, so ordering follows the
/// calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodId(NaiveDate);

impl PeriodId {
    /// Creates a period id from a year and month.
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodIdError> {
        if !(1..=9999).contains(&year) {
            return Err(PeriodIdError::Year(year));
        }
        if !(1..=12).contains(&month) {
            return Err(PeriodIdError::Month(month));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or(PeriodIdError::Month(month))
    }

    /// Returns the period containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date - Days::new(u64::from(date.day0())))
    }

    /// Calendar year.
    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Calendar month (1-12).
    #[must_use]
    pub fn month(self) -> u32 {
        self.0.month()
    }

    /// First day of the period.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        self.0
    }

    /// Last day of the period.
    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.next().0 - Days::new(1)
    }

    /// The following month.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + Months::new(1))
    }

    /// Returns true if `date` falls inside this calendar month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        Self::from_date(date) == self
    }
}

impl std::fmt::Display for PeriodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}{:02}", self.year(), self.month())
    }
}

impl std::str::FromStr for PeriodId {
    type Err = PeriodIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PeriodIdError::Format(s.to_string()));
        }
        let year: i32 = s[..4]
            .parse()
            .map_err(|_| PeriodIdError::Format(s.to_string()))?;
        let month: u32 = s[4..]
            .parse()
            .map_err(|_| PeriodIdError::Format(s.to_string()))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for PeriodId {
    type Error = PeriodIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PeriodId> for String {
    fn from(id: PeriodId) -> Self {
        id.to_string()
    }
}
