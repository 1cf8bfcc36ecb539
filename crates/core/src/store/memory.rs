//! In-memory ledger store.
//!
//! Transactions are serialized by a writer lock and stage their writes in an
//! overlay. The overlay is applied to the shared state only when the
//! transaction closure succeeds. Snapshot reads take a short read lock and
//! never wait on a running transaction for longer than a map lookup.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};
use partida_shared::types::{AccountCode, JournalId, PeriodId};

use super::error::{StoreError, StoreResult};
use super::{LedgerStore, StoreTx};
use crate::currency::XRate;
use crate::fiscal::TaxPeriod;
use crate::ledger::{Account, Journal};
use crate::sequence::{Correlative, CorrelativeKey};

#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<AccountCode, Account>,
    periods: BTreeMap<PeriodId, TaxPeriod>,
    rates: BTreeMap<NaiveDate, XRate>,
    correlatives: HashMap<CorrelativeKey, Correlative>,
    journals: HashMap<JournalId, Journal>,
}

impl MemoryState {
    fn apply(&mut self, staged: Staged) {
        self.accounts.extend(staged.accounts);
        self.periods.extend(staged.periods);
        self.rates.extend(staged.rates);
        self.correlatives.extend(staged.correlatives);
        self.journals.extend(staged.journals);
    }
}

/// Writes staged by a running transaction.
#[derive(Debug, Default)]
struct Staged {
    accounts: HashMap<AccountCode, Account>,
    periods: BTreeMap<PeriodId, TaxPeriod>,
    rates: BTreeMap<NaiveDate, XRate>,
    correlatives: HashMap<CorrelativeKey, Correlative>,
    journals: HashMap<JournalId, Journal>,
}

/// Thread-safe in-memory store with serializable transactions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    writer: Mutex<()>,
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an account outside any transaction.
    pub fn insert_account(&self, account: Account) {
        let _writer = self.writer.lock();
        self.state
            .write()
            .accounts
            .insert(account.code.clone(), account);
    }

    /// Inserts or replaces a period outside any transaction.
    pub fn insert_period(&self, period: TaxPeriod) {
        let _writer = self.writer.lock();
        self.state.write().periods.insert(period.id, period);
    }

    /// Inserts or replaces a rate outside any transaction.
    pub fn insert_rate(&self, rate: XRate) {
        let _writer = self.writer.lock();
        self.state.write().rates.insert(rate.tax_date, rate);
    }

    /// Number of stored journals.
    #[must_use]
    pub fn journal_count(&self) -> usize {
        self.state.read().journals.len()
    }

    /// Stored journals ordered by book, period, category and correlative.
    #[must_use]
    pub fn journals(&self) -> Vec<Journal> {
        let mut journals: Vec<Journal> = self.state.read().journals.values().cloned().collect();
        journals.sort_by(|a, b| {
            (&a.book, a.period, a.category.prefix(), a.correlative).cmp(&(
                &b.book,
                b.period,
                b.category.prefix(),
                b.correlative,
            ))
        });
        journals
    }
}

impl LedgerStore for MemoryStore {
    fn load_account(&self, code: &AccountCode) -> StoreResult<Option<Account>> {
        Ok(self.state.read().accounts.get(code).cloned())
    }

    fn load_periods_for_date(&self, date: NaiveDate) -> StoreResult<Vec<TaxPeriod>> {
        Ok(self
            .state
            .read()
            .periods
            .values()
            .filter(|p| p.contains(date))
            .cloned()
            .collect())
    }

    fn load_period(&self, id: PeriodId) -> StoreResult<Option<TaxPeriod>> {
        Ok(self.state.read().periods.get(&id).cloned())
    }

    fn load_rate(&self, date: NaiveDate) -> StoreResult<Option<XRate>> {
        Ok(self.state.read().rates.get(&date).cloned())
    }

    fn load_correlative(&self, key: &CorrelativeKey) -> StoreResult<Option<Correlative>> {
        Ok(self.state.read().correlatives.get(key).cloned())
    }

    fn load_journal(&self, id: JournalId) -> StoreResult<Option<Journal>> {
        Ok(self.state.read().journals.get(&id).cloned())
    }

    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _writer = self.writer.lock();
        let mut tx = MemoryTx {
            state: &self.state,
            staged: Staged::default(),
        };
        let value = f(&mut tx)?;
        self.state.write().apply(tx.staged);
        Ok(value)
    }
}

struct MemoryTx<'a> {
    state: &'a RwLock<MemoryState>,
    staged: Staged,
}

impl MemoryTx<'_> {
    fn journal(&self, id: JournalId) -> Option<Journal> {
        self.staged
            .journals
            .get(&id)
            .cloned()
            .or_else(|| self.state.read().journals.get(&id).cloned())
    }

    /// Another journal already holds this book, period, lineage and number.
    fn correlative_taken(&self, journal: &Journal) -> bool {
        let same_slot = |other: &Journal| {
            other.id != journal.id
                && other.correlative.is_some()
                && other.correlative == journal.correlative
                && other.book == journal.book
                && other.period == journal.period
                && other.category == journal.category
        };
        if self.staged.journals.values().any(same_slot) {
            return true;
        }
        self.state
            .read()
            .journals
            .values()
            .filter(|j| j.id.is_none_or(|id| !self.staged.journals.contains_key(&id)))
            .any(same_slot)
    }
}

impl StoreTx for MemoryTx<'_> {
    fn load_period(&self, id: PeriodId) -> StoreResult<Option<TaxPeriod>> {
        Ok(self
            .staged
            .periods
            .get(&id)
            .cloned()
            .or_else(|| self.state.read().periods.get(&id).cloned()))
    }

    fn save_period(&mut self, period: &TaxPeriod) -> StoreResult<()> {
        if let Some(stored) = self.load_period(period.id)?
            && stored.is_closed()
            && stored.closed != period.closed
        {
            return Err(StoreError::Conflict(format!(
                "tax period {} is closed",
                period.id
            )));
        }
        self.staged.periods.insert(period.id, period.clone());
        Ok(())
    }

    fn save_rate(&mut self, rate: &XRate) -> StoreResult<()> {
        let existing = self
            .staged
            .rates
            .get(&rate.tax_date)
            .cloned()
            .or_else(|| self.state.read().rates.get(&rate.tax_date).cloned());
        if existing.is_some_and(|e| e.id != rate.id) {
            return Err(StoreError::Duplicate(format!(
                "exchange rate for {}",
                rate.tax_date
            )));
        }
        self.staged.rates.insert(rate.tax_date, rate.clone());
        Ok(())
    }

    fn save_account(&mut self, account: &Account) -> StoreResult<()> {
        self.staged
            .accounts
            .insert(account.code.clone(), account.clone());
        Ok(())
    }

    fn lock_correlative(&mut self, key: &CorrelativeKey) -> StoreResult<Correlative> {
        // The writer lock already excludes every other transaction.
        Ok(self
            .staged
            .correlatives
            .get(key)
            .cloned()
            .or_else(|| self.state.read().correlatives.get(key).cloned())
            .unwrap_or_else(|| Correlative::new(key.clone())))
    }

    fn save_correlative(&mut self, correlative: &Correlative) -> StoreResult<()> {
        self.staged
            .correlatives
            .insert(correlative.key.clone(), correlative.clone());
        Ok(())
    }

    fn load_journal(&self, id: JournalId) -> StoreResult<Option<Journal>> {
        Ok(self.journal(id))
    }

    fn persist_journal(&mut self, journal: &Journal) -> StoreResult<()> {
        let id = journal
            .id
            .ok_or_else(|| StoreError::Conflict("journal has no id".to_string()))?;
        if let Some(stored) = self.journal(id)
            && let Some(reversal) = stored.reverted_by
        {
            return Err(StoreError::Conflict(format!(
                "journal {id} was reverted by {reversal}"
            )));
        }
        if self.correlative_taken(journal) {
            return Err(StoreError::Duplicate(format!(
                "correlative {} in book {}",
                journal.correlative_code().unwrap_or_default(),
                journal.book
            )));
        }
        self.staged.journals.insert(id, journal.clone());
        Ok(())
    }
}
