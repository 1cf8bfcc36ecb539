//! Core business logic for Partida.
//!
//! This crate contains the double-entry ledger engine with ZERO web or
//! database dependencies. Persistence is reached through the traits in
//! [`store`].
//!
//! # Modules
//!
//! - `ledger` - Journals, validation rules, commit and reversal
//! - `currency` - Exchange-rate resolution and FC to SC translation
//! - `fiscal` - Tax periods and their open/closed lifecycle
//! - `sequence` - Gap-free correlative numbering per book and period
//! - `store` - Persistence collaborator traits and implementations

pub mod currency;
pub mod fiscal;
pub mod ledger;
pub mod sequence;
pub mod store;

pub use currency::{CurrencyTranslationService, ExchangeRateResolver, RateDirection, XRate};
pub use fiscal::{PeriodStatus, TaxPeriod, TaxPeriodLifecycle};
pub use ledger::{
    Journal, JournalDt, JournalEngine, JournalStatus, LedgerError, ValidationIssue,
    ValidationIssues,
};
pub use sequence::{Correlative, CorrelativeCategory, CorrelativeKey, CorrelativeSequencer};
pub use store::{CachedStore, LedgerStore, MemoryStore, StoreError, StoreTx};
