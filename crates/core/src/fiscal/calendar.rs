//! Bulk creation of the monthly periods of a year.

use tracing::info;

use super::period::TaxPeriod;
use crate::ledger::LedgerError;
use crate::store::LedgerStore;
use partida_shared::types::PeriodId;

/// The twelve open monthly periods of `year`.
///
/// # Errors
///
/// `InvalidPeriod` for a year outside 1..=9999.
pub fn monthly_periods(year: i32) -> Result<Vec<TaxPeriod>, LedgerError> {
    (1..=12)
        .map(|month| {
            PeriodId::new(year, month)
                .map(TaxPeriod::month)
                .map_err(LedgerError::from)
        })
        .collect()
}

/// Creates the periods of `year` that do not exist yet.
///
/// Existing periods are left untouched, so running this twice is harmless.
/// Returns the ids created by this call.
///
/// # Errors
///
/// `InvalidPeriod` for a bad year, or a store failure (nothing is created).
pub fn open_year<S: LedgerStore>(store: &S, year: i32) -> Result<Vec<PeriodId>, LedgerError> {
    let periods = monthly_periods(year)?;
    let created = store.transaction(|tx| {
        let mut created = Vec::new();
        for period in &periods {
            if tx.load_period(period.id)?.is_none() {
                tx.save_period(period)?;
                created.push(period.id);
            }
        }
        Ok::<_, LedgerError>(created)
    })?;
    info!(year, created = created.len(), "Tax year opened");
    Ok(created)
}
