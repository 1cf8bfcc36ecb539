//! Gap-free correlative issuance.
//!
//! A number is reserved by advancing the locked counter row inside a store
//! transaction. The reservation becomes durable only together with the
//! other writes of that transaction, so an aborted commit never burns a
//! number.

use chrono::Utc;
use tracing::{info, instrument};

use super::correlative::{Correlative, CorrelativeCategory, CorrelativeKey};
use crate::ledger::LedgerError;
use crate::store::{LedgerStore, StoreTx};

/// Reserves the next number inside an existing transaction.
///
/// # Errors
///
/// `BookClosed`, `CorrelativeExhausted` or a store failure.
pub fn reserve(
    tx: &mut dyn StoreTx,
    key: &CorrelativeKey,
    category: CorrelativeCategory,
) -> Result<u64, LedgerError> {
    let mut correlative = tx.lock_correlative(key)?;
    let number = correlative.advance(category)?;
    tx.save_correlative(&correlative)?;
    Ok(number)
}

/// Issues correlatives for (book, period) keys.
pub struct CorrelativeSequencer<'a, S> {
    store: &'a S,
}

impl<'a, S: LedgerStore> CorrelativeSequencer<'a, S> {
    /// Creates a sequencer over `store`.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Reserves the next number in its own transaction.
    ///
    /// # Errors
    ///
    /// `BookClosed`, `CorrelativeExhausted` or a store failure.
    #[instrument(skip(self, key), fields(key = %key))]
    pub fn next(
        &self,
        key: &CorrelativeKey,
        category: CorrelativeCategory,
    ) -> Result<u64, LedgerError> {
        self.store.transaction(|tx| reserve(tx, key, category))
    }

    /// Last number issued in `category`, without reserving.
    ///
    /// # Errors
    ///
    /// Store failure.
    pub fn current(
        &self,
        key: &CorrelativeKey,
        category: CorrelativeCategory,
    ) -> Result<u64, LedgerError> {
        Ok(self
            .store
            .load_correlative(key)?
            .map_or(0, |c| c.current(category)))
    }

    /// Seals the book for the period. No further numbers are issued.
    ///
    /// # Errors
    ///
    /// `BookClosed` if already sealed, or a store failure.
    #[instrument(skip(self, key), fields(key = %key))]
    pub fn seal(&self, key: &CorrelativeKey) -> Result<Correlative, LedgerError> {
        let sealed = self.store.transaction(|tx| {
            let mut correlative = tx.lock_correlative(key)?;
            correlative.seal(Utc::now())?;
            tx.save_correlative(&correlative)?;
            Ok::<_, LedgerError>(correlative)
        })?;
        info!(book = %key.book, period = %key.period, "Book sealed");
        Ok(sealed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use partida_shared::types::{BookCode, PeriodId};

    fn key() -> CorrelativeKey {
        CorrelativeKey::new(BookCode::new("05").unwrap(), PeriodId::new(2024, 3).unwrap())
    }

    #[test]
    fn test_next_is_sequential() {
        let store = MemoryStore::new();
        let seq = CorrelativeSequencer::new(&store);
        let k = key();
        assert_eq!(seq.next(&k, CorrelativeCategory::Movement).unwrap(), 1);
        assert_eq!(seq.next(&k, CorrelativeCategory::Movement).unwrap(), 2);
        assert_eq!(seq.next(&k, CorrelativeCategory::Closing).unwrap(), 1);
        assert_eq!(seq.current(&k, CorrelativeCategory::Movement).unwrap(), 2);
    }

    #[test]
    fn test_periods_number_independently() {
        let store = MemoryStore::new();
        let seq = CorrelativeSequencer::new(&store);
        let march = key();
        let april = CorrelativeKey::new(march.book.clone(), march.period.next());
        seq.next(&march, CorrelativeCategory::Movement).unwrap();
        assert_eq!(seq.next(&april, CorrelativeCategory::Movement).unwrap(), 1);
    }

    #[test]
    fn test_aborted_transaction_does_not_consume_number() {
        let store = MemoryStore::new();
        let k = key();
        let result: Result<u64, LedgerError> = store.transaction(|tx| {
            let n = reserve(tx, &k, CorrelativeCategory::Movement)?;
            assert_eq!(n, 1);
            Err(StoreError::Unavailable("disk full".into()).into())
        });
        assert!(result.is_err());

        let seq = CorrelativeSequencer::new(&store);
        assert_eq!(seq.current(&k, CorrelativeCategory::Movement).unwrap(), 0);
        assert_eq!(seq.next(&k, CorrelativeCategory::Movement).unwrap(), 1);
    }

    #[test]
    fn test_sealed_book() {
        let store = MemoryStore::new();
        let seq = CorrelativeSequencer::new(&store);
        let k = key();
        seq.next(&k, CorrelativeCategory::Movement).unwrap();
        let sealed = seq.seal(&k).unwrap();
        assert!(sealed.is_sealed());

        let err = seq.next(&k, CorrelativeCategory::Movement).unwrap_err();
        assert!(err.is_terminal());
        assert!(matches!(seq.seal(&k), Err(LedgerError::BookClosed { .. })));
        assert_eq!(seq.current(&k, CorrelativeCategory::Movement).unwrap(), 1);
    }
}
