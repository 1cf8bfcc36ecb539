//! Ledger error types for validation, period, sequencing and store errors.
//!
//! This module defines every error the engine can return from `commit`,
//! `revert`, rate resolution, period closing and correlative issuance.

use chrono::NaiveDate;
use partida_shared::types::{AccountCode, BookCode, JournalId, PeriodId, PeriodIdError};
use rust_decimal::Decimal;
use thiserror::Error;

use super::issue::ValidationIssues;
use crate::sequence::CorrelativeCategory;
use crate::store::StoreError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// The journal broke one or more validation rules.
    #[error("Journal failed validation: {0}")]
    ValidationFailed(ValidationIssues),

    /// After translation the local-currency columns do not balance.
    #[error("Translated amounts are not balanced. Debit SC: {debit}, Credit SC: {credit}")]
    TranslationUnbalanced {
        /// Total debit in local currency.
        debit: Decimal,
        /// Total credit in local currency.
        credit: Decimal,
    },

    /// An amount or total does not fit in a `Decimal`.
    #[error("Amount out of range while translating or totalling the journal")]
    AmountOverflow,

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountCode),

    /// Account is a grouping account and does not accept postings.
    #[error("Account {0} does not accept postings")]
    AccountNoPosting(AccountCode),

    // ========== Exchange Rate Errors ==========
    /// No exchange rate row exists for the date.
    #[error("No exchange rate found for {0}")]
    RateNotFound(NaiveDate),

    /// A neutral direction was requested while the policy rejects it.
    #[error("A purchase or sale direction is required to resolve the exchange rate")]
    DirectionRequired,

    /// Exchange rate must be positive with at most three decimals.
    #[error("Invalid exchange rate {0}: must be positive with at most 3 decimals")]
    InvalidRate(Decimal),

    // ========== Tax Period Errors ==========
    /// No tax period covers the date.
    #[error("No tax period found for date {0}")]
    NoTaxPeriod(NaiveDate),

    /// The tax period does not exist.
    #[error("Tax period not found: {0}")]
    PeriodNotFound(PeriodId),

    /// The tax period is closed, no posting allowed.
    #[error("Tax period {0} is closed, no posting allowed")]
    PeriodClosed(PeriodId),

    /// The tax period was already closed.
    #[error("Tax period {0} is already closed")]
    AlreadyClosed(PeriodId),

    /// Period id could not be built.
    #[error(transparent)]
    InvalidPeriod(#[from] PeriodIdError),

    // ========== Correlative Errors ==========
    /// The book is sealed for the period.
    #[error("Book {book} is sealed for period {period}")]
    BookClosed {
        /// The sealed book.
        book: BookCode,
        /// The period it was sealed for.
        period: PeriodId,
    },

    /// A counter reached its maximum value.
    #[error("Correlative counter exhausted for book {book}, period {period}, category {category}")]
    CorrelativeExhausted {
        /// The book.
        book: BookCode,
        /// The period.
        period: PeriodId,
        /// The counter lineage.
        category: CorrelativeCategory,
    },

    // ========== Journal State Errors ==========
    /// Committed and reverted journals cannot be modified or committed again.
    #[error("Journal {0} is read-only")]
    ReadOnly(JournalId),

    /// The journal has not been committed yet.
    #[error("Journal has not been committed")]
    NotCommitted,

    /// The journal was already reverted.
    #[error("Journal {journal} was already reverted by {reversal}")]
    AlreadyReverted {
        /// The original journal.
        journal: JournalId,
        /// The existing reversal.
        reversal: JournalId,
    },

    /// Journal not found.
    #[error("Journal not found: {0}")]
    JournalNotFound(JournalId),

    /// No line with the given number.
    #[error("Line {0} does not exist")]
    LineNotFound(u32),

    // ========== Store Errors ==========
    /// The persistence collaborator failed; nothing was written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Returns the stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationFailed(_) => "VALIDATION_FAILED",
            Self::TranslationUnbalanced { .. } => "TRANSLATION_UNBALANCED",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountNoPosting(_) => "ACCOUNT_NO_POSTING",
            Self::RateNotFound(_) => "RATE_NOT_FOUND",
            Self::DirectionRequired => "DIRECTION_REQUIRED",
            Self::InvalidRate(_) => "INVALID_RATE",
            Self::NoTaxPeriod(_) => "NO_TAX_PERIOD",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::PeriodClosed(_) => "PERIOD_CLOSED",
            Self::AlreadyClosed(_) => "ALREADY_CLOSED",
            Self::InvalidPeriod(_) => "INVALID_PERIOD",
            Self::BookClosed { .. } => "BOOK_CLOSED",
            Self::CorrelativeExhausted { .. } => "CORRELATIVE_EXHAUSTED",
            Self::ReadOnly(_) => "READ_ONLY",
            Self::NotCommitted => "NOT_COMMITTED",
            Self::AlreadyReverted { .. } => "ALREADY_REVERTED",
            Self::JournalNotFound(_) => "JOURNAL_NOT_FOUND",
            Self::LineNotFound(_) => "LINE_NOT_FOUND",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns true if the attempted operation must not be retried with the
    /// same data: the entry has to be re-dated or abandoned.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::PeriodClosed(_)
                | Self::NoTaxPeriod(_)
                | Self::BookClosed { .. }
                | Self::AlreadyClosed(_)
                | Self::AlreadyReverted { .. }
                | Self::ReadOnly(_)
        )
    }

    /// Returns true if the caller can fix the input and try again.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed(_)
                | Self::TranslationUnbalanced { .. }
                | Self::AmountOverflow
                | Self::RateNotFound(_)
                | Self::DirectionRequired
                | Self::InvalidRate(_)
                | Self::AccountNotFound(_)
                | Self::AccountNoPosting(_)
        )
    }

    /// Returns the validation issues carried by a `ValidationFailed` error.
    #[must_use]
    pub fn issues(&self) -> Option<&ValidationIssues> {
        match self {
            Self::ValidationFailed(issues) => Some(issues),
            _ => None,
        }
    }
}
