//! Tax period types.

use chrono::{DateTime, NaiveDate, Utc};
use partida_shared::types::PeriodId;
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// Status of a tax period. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Postings dated inside the period are accepted.
    Open,
    /// The period is locked, no new postings.
    Closed,
}

/// A calendar-month tax period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPeriod {
    /// `YYYYMM` identifier.
    pub id: PeriodId,
    /// First day covered.
    pub date_from: NaiveDate,
    /// Last day covered.
    pub date_until: NaiveDate,
    /// When the period was closed.
    #[serde(default)]
    pub closed: Option<DateTime<Utc>>,
}

impl TaxPeriod {
    /// Open period spanning the whole month of `id`.
    #[must_use]
    pub fn month(id: PeriodId) -> Self {
        Self {
            id,
            date_from: id.first_day(),
            date_until: id.last_day(),
            closed: None,
        }
    }

    /// Returns true if `date` falls within this period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.date_from && date <= self.date_until
    }

    /// Returns true once closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.is_some()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> PeriodStatus {
        if self.is_closed() {
            PeriodStatus::Closed
        } else {
            PeriodStatus::Open
        }
    }

    /// Closes the period at `at`.
    ///
    /// # Errors
    ///
    /// `AlreadyClosed` if the period was closed before.
    pub fn close(&mut self, at: DateTime<Utc>) -> Result<(), LedgerError> {
        if self.is_closed() {
            return Err(LedgerError::AlreadyClosed(self.id));
        }
        self.closed = Some(at);
        Ok(())
    }
}
