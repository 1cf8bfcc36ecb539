//! Open/closed state of tax periods and the posting gate built on it.

use chrono::{NaiveDate, Utc};
use partida_shared::types::PeriodId;
use tracing::{info, instrument};

use super::period::{PeriodStatus, TaxPeriod};
use crate::ledger::LedgerError;
use crate::store::{LedgerStore, StoreTx};

/// Reads and closes tax periods.
pub struct TaxPeriodLifecycle<'a, S> {
    store: &'a S,
}

impl<'a, S: LedgerStore> TaxPeriodLifecycle<'a, S> {
    /// Creates a lifecycle over `store`.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The period covering `date`, if any.
    ///
    /// # Errors
    ///
    /// Store failure.
    pub fn period_for(&self, date: NaiveDate) -> Result<Option<TaxPeriod>, LedgerError> {
        Ok(self.store.load_periods_for_date(date)?.into_iter().next())
    }

    /// True iff a period covers `date` and none of the covering periods is
    /// closed.
    ///
    /// # Errors
    ///
    /// Store failure.
    pub fn is_open_for(&self, date: NaiveDate) -> Result<bool, LedgerError> {
        match self.ensure_open_for(date) {
            Ok(_) => Ok(true),
            Err(LedgerError::NoTaxPeriod(_) | LedgerError::PeriodClosed(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Fails unless `date` may receive postings.
    ///
    /// # Errors
    ///
    /// `NoTaxPeriod`, `PeriodClosed` or a store failure.
    pub fn ensure_open_for(&self, date: NaiveDate) -> Result<PeriodId, LedgerError> {
        let periods = self.store.load_periods_for_date(date)?;
        if let Some(closed) = periods.iter().find(|p| p.is_closed()) {
            return Err(LedgerError::PeriodClosed(closed.id));
        }
        periods
            .first()
            .map(|p| p.id)
            .ok_or(LedgerError::NoTaxPeriod(date))
    }

    /// Status of a period.
    ///
    /// # Errors
    ///
    /// `PeriodNotFound` or a store failure.
    pub fn status(&self, id: PeriodId) -> Result<PeriodStatus, LedgerError> {
        self.store
            .load_period(id)?
            .map(|p| p.status())
            .ok_or(LedgerError::PeriodNotFound(id))
    }

    /// Closes a period. Irreversible.
    ///
    /// Journals already dated inside the period are not touched; only new
    /// postings are blocked.
    ///
    /// # Errors
    ///
    /// `PeriodNotFound`, `AlreadyClosed` or a store failure.
    #[instrument(skip(self, id), fields(period = %id))]
    pub fn close(&self, id: PeriodId) -> Result<TaxPeriod, LedgerError> {
        let closed = self.store.transaction(|tx| {
            let mut period = tx.load_period(id)?.ok_or(LedgerError::PeriodNotFound(id))?;
            period.close(Utc::now())?;
            tx.save_period(&period)?;
            Ok::<_, LedgerError>(period)
        })?;
        info!(period = %id, "Tax period closed");
        Ok(closed)
    }
}

/// Posting gate evaluated inside a transaction, so a concurrent close is
/// observed by the commit that would otherwise slip past it.
///
/// # Errors
///
/// `NoTaxPeriod`, `PeriodClosed` or a store failure.
pub fn ensure_open_in(tx: &dyn StoreTx, date: NaiveDate) -> Result<PeriodId, LedgerError> {
    let period = tx
        .load_period(PeriodId::from_date(date))?
        .filter(|p| p.contains(date))
        .ok_or(LedgerError::NoTaxPeriod(date))?;
    if period.is_closed() {
        return Err(LedgerError::PeriodClosed(period.id));
    }
    Ok(period.id)
}
