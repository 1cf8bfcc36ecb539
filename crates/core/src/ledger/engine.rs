//! Journal engine: validation, commit and reversal.
//!
//! Commit flow:
//! 1. Re-validate the journal (never trust an earlier validation)
//! 2. Check the tax period covering `date_tax` is open
//! 3. Check every account exists and accepts postings
//! 4. Translate FC to SC with the pinned rate and check SC balance
//! 5. In one store transaction: re-check the period, reserve the
//!    correlative, assign id and timestamp, persist
//!
//! A failure anywhere in step 5 discards the correlative reservation along
//! with every other staged write.

use chrono::{NaiveDate, Utc};
use partida_shared::config::LedgerConfig;
use partida_shared::types::{Currency, JournalId};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use super::error::LedgerError;
use super::issue::{ValidationIssue, ValidationIssues};
use super::journal::{Journal, JournalDt};
use super::reversal::ReversalService;
use super::validation;
use crate::currency::{CurrencyTranslationService, ExchangeRateResolver, RateDirection};
use crate::fiscal::{TaxPeriodLifecycle, ensure_open_in};
use crate::sequence::{CorrelativeKey, CorrelativeSequencer, reserve};
use crate::store::{LedgerStore, StoreTx};

/// The double-entry ledger engine.
pub struct JournalEngine<S> {
    store: S,
    resolver: ExchangeRateResolver,
}

impl<S: LedgerStore> JournalEngine<S> {
    /// Creates an engine over `store`.
    #[must_use]
    pub fn new(store: S, config: &LedgerConfig) -> Self {
        Self {
            store,
            resolver: ExchangeRateResolver::new(config.neutral_rate_policy),
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tax period lifecycle over the same store.
    #[must_use]
    pub fn periods(&self) -> TaxPeriodLifecycle<'_, S> {
        TaxPeriodLifecycle::new(&self.store)
    }

    /// Correlative sequencer over the same store.
    #[must_use]
    pub fn sequencer(&self) -> CorrelativeSequencer<'_, S> {
        CorrelativeSequencer::new(&self.store)
    }

    /// Resolves the rate for `date`, `currency` and `direction`.
    ///
    /// # Errors
    ///
    /// `RateNotFound`, `DirectionRequired` or a store failure.
    pub fn resolve_rate(
        &self,
        date: NaiveDate,
        currency: Currency,
        direction: RateDirection,
    ) -> Result<Decimal, LedgerError> {
        self.resolver
            .resolve(date, currency, direction, |d| self.store.load_rate(d))
    }

    /// Resolves the rate for the draft's tax date and currency and pins it
    /// on the draft.
    ///
    /// # Errors
    ///
    /// `ReadOnly` for a committed journal, `ValidationFailed` without tax
    /// date or currency, or any [`resolve_rate`](Self::resolve_rate) error.
    pub fn pin_rate(
        &self,
        journal: &mut Journal,
        direction: RateDirection,
    ) -> Result<Decimal, LedgerError> {
        journal.ensure_editable()?;
        let date = journal
            .date_tax
            .ok_or_else(|| failed(ValidationIssue::MissingTaxDate))?;
        let currency = journal
            .currency
            .ok_or_else(|| failed(ValidationIssue::MissingCurrency))?;
        let rate = self.resolve_rate(date, currency, direction)?;
        journal.xrate = Some(rate);
        Ok(rate)
    }

    /// Recomputes the SC columns of `lines` with `rate`.
    ///
    /// # Errors
    ///
    /// `AmountOverflow` if a translated amount is out of range.
    pub fn translate_amounts(lines: &mut [JournalDt], rate: Decimal) -> Result<(), LedgerError> {
        CurrencyTranslationService::translate(lines, rate)
    }

    /// Validates a journal, collecting every broken rule.
    ///
    /// # Errors
    ///
    /// Every issue found.
    #[allow(clippy::unused_self)]
    pub fn validate(&self, journal: &Journal) -> Result<(), ValidationIssues> {
        validation::validate(journal)
    }

    /// Commits a draft and returns the committed journal.
    ///
    /// `journal` itself is left untouched.
    ///
    /// # Errors
    ///
    /// `ReadOnly`, `ValidationFailed`, `AccountNotFound`,
    /// `AccountNoPosting`, `NoTaxPeriod`, `PeriodClosed`,
    /// `TranslationUnbalanced`, `AmountOverflow`, `BookClosed`, `CorrelativeExhausted` or a
    /// store failure. Nothing is written on error.
    #[instrument(skip_all, fields(book = %journal.book))]
    pub fn commit(&self, journal: &Journal) -> Result<Journal, LedgerError> {
        let result = self
            .prepare(journal)
            .and_then(|draft| self.post(draft, |_, _| Ok(())));
        match &result {
            Ok(committed) => log_committed(committed, "Journal committed"),
            Err(e) => warn!(error_code = e.error_code(), error = %e, "Journal rejected"),
        }
        result
    }

    /// Reverses a committed journal on its own tax date.
    ///
    /// The reversal mirrors the stored journal with the id of `original`,
    /// whatever the rest of `original` holds. On success `original` is
    /// replaced by the stored journal, with `reverted_by` pointing to the
    /// returned reversal.
    ///
    /// # Errors
    ///
    /// `NotCommitted`, `AlreadyReverted`, `JournalNotFound`, or any
    /// [`commit`](Self::commit) error for the reversing journal.
    #[instrument(skip_all, fields(journal_id = ?original.id))]
    pub fn revert(&self, original: &mut Journal) -> Result<Journal, LedgerError> {
        self.revert_with(original, None)
    }

    /// Reverses a committed journal, dating the reversal on `date_tax`.
    ///
    /// Used when the original's period is already closed.
    ///
    /// # Errors
    ///
    /// Same as [`revert`](Self::revert).
    #[instrument(skip_all, fields(journal_id = ?original.id, date_tax = %date_tax))]
    pub fn revert_on(
        &self,
        original: &mut Journal,
        date_tax: NaiveDate,
    ) -> Result<Journal, LedgerError> {
        self.revert_with(original, Some(date_tax))
    }

    fn revert_with(
        &self,
        original: &mut Journal,
        date_tax: Option<NaiveDate>,
    ) -> Result<Journal, LedgerError> {
        // Only the id of the caller's copy is trusted.
        let result = original
            .id
            .ok_or(LedgerError::NotCommitted)
            .and_then(|id| {
                let stored = self
                    .store
                    .load_journal(id)?
                    .ok_or(LedgerError::JournalNotFound(id))?;
                let draft = ReversalService::reversing_draft(&stored, date_tax)?;
                let draft = self.prepare(&draft)?;
                let reversal =
                    self.post(draft, |tx, reversal_id| mark_reverted(tx, id, reversal_id))?;
                Ok((stored, reversal))
            });

        match result {
            Ok((mut stored, reversal)) => {
                stored.reverted_by = reversal.id;
                *original = stored;
                log_committed(&reversal, "Journal reverted");
                Ok(reversal)
            }
            Err(e) => {
                warn!(error_code = e.error_code(), error = %e, "Reversal rejected");
                Err(e)
            }
        }
    }

    /// Checks that can run on snapshots, then translates.
    fn prepare(&self, journal: &Journal) -> Result<Journal, LedgerError> {
        if let Some(id) = journal.id {
            return Err(LedgerError::ReadOnly(id));
        }
        validation::validate(journal).map_err(LedgerError::ValidationFailed)?;
        let (date_tax, rate) = pinned_header(journal)?;

        self.periods().ensure_open_for(date_tax)?;

        for line in journal.detail() {
            let Some(code) = line.account.as_ref() else {
                return Err(failed(ValidationIssue::MissingAccount { line: line.line }));
            };
            let account = self
                .store
                .load_account(code)?
                .ok_or_else(|| LedgerError::AccountNotFound(code.clone()))?;
            if !account.accepts_postings {
                return Err(LedgerError::AccountNoPosting(code.clone()));
            }
        }

        let mut draft = journal.clone();
        Self::translate_amounts(draft.detail_mut(), rate)?;

        let totals = CurrencyTranslationService::totals(draft.detail())?;
        if !totals.is_balanced_sc() {
            return Err(LedgerError::TranslationUnbalanced {
                debit: totals.debit_sc,
                credit: totals.credit_sc,
            });
        }

        Ok(draft)
    }

    /// Numbers and persists a prepared draft in one transaction. `also` runs
    /// inside the same transaction with the new id.
    fn post<F>(&self, draft: Journal, also: F) -> Result<Journal, LedgerError>
    where
        F: FnOnce(&mut dyn StoreTx, JournalId) -> Result<(), LedgerError>,
    {
        let (date_tax, _) = pinned_header(&draft)?;
        self.store.transaction(move |tx| {
            let period = ensure_open_in(tx, date_tax)?;
            let key = CorrelativeKey::new(draft.book.clone(), period);
            let number = reserve(tx, &key, draft.category)?;

            let id = JournalId::new();
            let mut committed = draft;
            committed.id = Some(id);
            committed.correlative = Some(number);
            committed.created_at = Some(Utc::now());

            tx.persist_journal(&committed)?;
            also(tx, id)?;
            Ok(committed)
        })
    }
}

/// Marks the stored original as reverted by `reversal_id`.
fn mark_reverted(
    tx: &mut dyn StoreTx,
    original_id: JournalId,
    reversal_id: JournalId,
) -> Result<(), LedgerError> {
    let mut stored = tx
        .load_journal(original_id)?
        .ok_or(LedgerError::JournalNotFound(original_id))?;
    if let Some(existing) = stored.reverted_by {
        return Err(LedgerError::AlreadyReverted {
            journal: original_id,
            reversal: existing,
        });
    }
    stored.reverted_by = Some(reversal_id);
    tx.persist_journal(&stored)?;
    Ok(())
}

/// Tax date and rate of a validated journal.
fn pinned_header(journal: &Journal) -> Result<(NaiveDate, Decimal), LedgerError> {
    let date_tax = journal
        .date_tax
        .ok_or_else(|| failed(ValidationIssue::MissingTaxDate))?;
    let rate = journal
        .xrate
        .ok_or_else(|| failed(ValidationIssue::MissingRate))?;
    Ok((date_tax, rate))
}

fn failed(issue: ValidationIssue) -> LedgerError {
    LedgerError::ValidationFailed(ValidationIssues::from(vec![issue]))
}

fn log_committed(journal: &Journal, message: &'static str) {
    info!(
        journal_id = ?journal.id,
        book = %journal.book,
        period = ?journal.period,
        correlative = ?journal.correlative_code(),
        "{message}"
    );
}
