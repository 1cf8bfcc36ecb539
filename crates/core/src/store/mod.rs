//! Persistence collaborator.
//!
//! The engine never owns storage. It reads immutable snapshots through
//! [`LedgerStore`] and performs every write inside
//! [`LedgerStore::transaction`], which either keeps all staged writes or
//! none of them.
//!
//! - [`MemoryStore`] - in-memory serializable store
//! - [`CachedStore`] - read cache for rates and periods over any store

mod cache;
mod error;
mod memory;

pub use cache::CachedStore;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;

use chrono::NaiveDate;
use partida_shared::types::{AccountCode, JournalId, PeriodId};

use crate::currency::XRate;
use crate::fiscal::TaxPeriod;
use crate::ledger::{Account, Journal};
use crate::sequence::{Correlative, CorrelativeKey};

/// Read access plus transactional write access to ledger state.
pub trait LedgerStore: Send + Sync {
    /// Loads an account by code.
    fn load_account(&self, code: &AccountCode) -> StoreResult<Option<Account>>;

    /// Loads every tax period whose span covers `date`, open or closed.
    fn load_periods_for_date(&self, date: NaiveDate) -> StoreResult<Vec<TaxPeriod>>;

    /// Loads a tax period by id.
    fn load_period(&self, id: PeriodId) -> StoreResult<Option<TaxPeriod>>;

    /// Loads the exchange rate quoted for `date`.
    fn load_rate(&self, date: NaiveDate) -> StoreResult<Option<XRate>>;

    /// Loads the counters of a book for a period.
    fn load_correlative(&self, key: &CorrelativeKey) -> StoreResult<Option<Correlative>>;

    /// Loads a committed journal.
    fn load_journal(&self, id: JournalId) -> StoreResult<Option<Journal>>;

    /// Runs `f` inside a serializable transaction.
    ///
    /// Writes staged through the [`StoreTx`] become visible only if `f`
    /// returns `Ok`. Any `Err` discards them all, counter reservations
    /// included.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or a [`StoreError`] raised while
    /// applying the staged writes.
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>;
}

/// Operations available inside a store transaction.
pub trait StoreTx {
    /// Loads a tax period, seeing writes staged in this transaction.
    fn load_period(&self, id: PeriodId) -> StoreResult<Option<TaxPeriod>>;

    /// Inserts or replaces a tax period. A closed period cannot be reopened.
    fn save_period(&mut self, period: &TaxPeriod) -> StoreResult<()>;

    /// Inserts or replaces the rate for its tax date.
    fn save_rate(&mut self, rate: &XRate) -> StoreResult<()>;

    /// Inserts or replaces an account.
    fn save_account(&mut self, account: &Account) -> StoreResult<()>;

    /// Locks the counters for `key` until the transaction ends and returns
    /// their current value. Missing counters start at zero.
    fn lock_correlative(&mut self, key: &CorrelativeKey) -> StoreResult<Correlative>;

    /// Stores counters previously obtained from
    /// [`lock_correlative`](Self::lock_correlative).
    fn save_correlative(&mut self, correlative: &Correlative) -> StoreResult<()>;

    /// Loads a journal, seeing writes staged in this transaction.
    fn load_journal(&self, id: JournalId) -> StoreResult<Option<Journal>>;

    /// Inserts or replaces a committed journal together with its lines.
    ///
    /// The journal must carry an id. A stored journal that was already
    /// reverted cannot be overwritten.
    fn persist_journal(&mut self, journal: &Journal) -> StoreResult<()>;
}
