//! Read cache for exchange rates and tax periods using Moka.
//!
//! Rates and period lookups are read on every commit but change rarely.
//! Entries are invalidated after any transaction that writes rates or
//! periods through this store.
//!
//! Every such write bumps a generation counter before invalidating. A miss
//! that raced with a write drops the value it loaded, so a value read before
//! the write is never left cached after it.

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use moka::sync::Cache;
use partida_shared::config::CacheConfig;
use partida_shared::types::{AccountCode, JournalId, PeriodId};
use tracing::debug;

use super::error::{StoreError, StoreResult};
use super::{LedgerStore, StoreTx};
use crate::currency::XRate;
use crate::fiscal::TaxPeriod;
use crate::ledger::{Account, Journal};
use crate::sequence::{Correlative, CorrelativeKey};

/// A [`LedgerStore`] with cached rate and period lookups.
pub struct CachedStore<S> {
    inner: S,
    rates: Cache<NaiveDate, Option<XRate>>,
    periods: Cache<NaiveDate, Vec<TaxPeriod>>,
    generation: AtomicU64,
}

impl<S: LedgerStore> CachedStore<S> {
    /// Wraps `inner` with caches sized by `config`.
    #[must_use]
    pub fn new(inner: S, config: &CacheConfig) -> Self {
        let ttl = Duration::from_secs(config.ttl_secs);
        Self {
            inner,
            rates: Cache::builder()
                .max_capacity(config.max_capacity)
                .time_to_live(ttl)
                .build(),
            periods: Cache::builder()
                .max_capacity(config.max_capacity)
                .time_to_live(ttl)
                .build(),
            generation: AtomicU64::new(0),
        }
    }

    /// The wrapped store.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drops every cached entry.
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.rates.invalidate_all();
        self.periods.invalidate_all();
    }
}

/// Loads `key` through `cache`, caching the value unless a write bumped
/// `generation` while it was being loaded.
fn load_through<K, V>(
    cache: &Cache<K, V>,
    generation: &AtomicU64,
    key: K,
    load: impl FnOnce() -> StoreResult<V>,
) -> StoreResult<V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let seen = generation.load(Ordering::SeqCst);
    let value = load()?;
    cache.insert(key.clone(), value.clone());
    if generation.load(Ordering::SeqCst) != seen {
        cache.invalidate(&key);
    }
    Ok(value)
}

impl<S: LedgerStore> LedgerStore for CachedStore<S> {
    fn load_account(&self, code: &AccountCode) -> StoreResult<Option<Account>> {
        self.inner.load_account(code)
    }

    fn load_periods_for_date(&self, date: NaiveDate) -> StoreResult<Vec<TaxPeriod>> {
        if let Some(periods) = self.periods.get(&date) {
            debug!(%date, "Period cache hit");
            return Ok(periods);
        }
        debug!(%date, "Period cache miss");
        load_through(&self.periods, &self.generation, date, || {
            self.inner.load_periods_for_date(date)
        })
    }

    fn load_period(&self, id: PeriodId) -> StoreResult<Option<TaxPeriod>> {
        self.inner.load_period(id)
    }

    fn load_rate(&self, date: NaiveDate) -> StoreResult<Option<XRate>> {
        if let Some(rate) = self.rates.get(&date) {
            debug!(%date, "Rate cache hit");
            return Ok(rate);
        }
        debug!(%date, "Rate cache miss");
        load_through(&self.rates, &self.generation, date, || self.inner.load_rate(date))
    }

    fn load_correlative(&self, key: &CorrelativeKey) -> StoreResult<Option<Correlative>> {
        self.inner.load_correlative(key)
    }

    fn load_journal(&self, id: JournalId) -> StoreResult<Option<Journal>> {
        self.inner.load_journal(id)
    }

    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut touched = Touched::default();
        let result = self.inner.transaction(|tx| {
            let mut caching = CachingTx {
                inner: tx,
                touched: &mut touched,
            };
            f(&mut caching)
        });
        if result.is_ok() && (touched.periods || !touched.rates.is_empty()) {
            self.generation.fetch_add(1, Ordering::SeqCst);
            for date in &touched.rates {
                self.rates.invalidate(date);
            }
            if touched.periods {
                self.periods.invalidate_all();
            }
        }
        result
    }
}

/// What a transaction wrote that the caches may hold.
#[derive(Default)]
struct Touched {
    rates: Vec<NaiveDate>,
    periods: bool,
}

struct CachingTx<'a, 'b> {
    inner: &'a mut (dyn StoreTx + 'b),
    touched: &'a mut Touched,
}

impl StoreTx for CachingTx<'_, '_> {
    fn load_period(&self, id: PeriodId) -> StoreResult<Option<TaxPeriod>> {
        self.inner.load_period(id)
    }

    fn save_period(&mut self, period: &TaxPeriod) -> StoreResult<()> {
        self.inner.save_period(period)?;
        self.touched.periods = true;
        Ok(())
    }

    fn save_rate(&mut self, rate: &XRate) -> StoreResult<()> {
        self.inner.save_rate(rate)?;
        self.touched.rates.push(rate.tax_date);
        Ok(())
    }

    fn save_account(&mut self, account: &Account) -> StoreResult<()> {
        self.inner.save_account(account)
    }

    fn lock_correlative(&mut self, key: &CorrelativeKey) -> StoreResult<Correlative> {
        self.inner.lock_correlative(key)
    }

    fn save_correlative(&mut self, correlative: &Correlative) -> StoreResult<()> {
        self.inner.save_correlative(correlative)
    }

    fn load_journal(&self, id: JournalId) -> StoreResult<Option<Journal>> {
        self.inner.load_journal(id)
    }

    fn persist_journal(&mut self, journal: &Journal) -> StoreResult<()> {
        self.inner.persist_journal(journal)
    }
}
