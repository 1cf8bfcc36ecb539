//! Correlative counters.

use chrono::{DateTime, Utc};
use partida_shared::types::{BookCode, PeriodId};
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// Scope of a counter family: one book in one tax period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CorrelativeKey {
    /// The book.
    pub book: BookCode,
    /// The tax period.
    pub period: PeriodId,
}

impl CorrelativeKey {
    /// Creates a key.
    #[must_use]
    pub fn new(book: BookCode, period: PeriodId) -> Self {
        Self { book, period }
    }
}

impl std::fmt::Display for CorrelativeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.book, self.period)
    }
}

/// Counter lineage inside a book. Each lineage numbers independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelativeCategory {
    /// Opening entries.
    Opening,
    /// Regular movements.
    #[default]
    Movement,
    /// Closing entries.
    Closing,
}

impl CorrelativeCategory {
    /// All lineages in display order.
    pub const ALL: [Self; 3] = [Self::Opening, Self::Movement, Self::Closing];

    /// Single-letter prefix used when rendering a correlative.
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Opening => 'A',
            Self::Movement => 'M',
            Self::Closing => 'C',
        }
    }
}

impl std::fmt::Display for CorrelativeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Opening => "opening",
            Self::Movement => "movement",
            Self::Closing => "closing",
        };
        f.write_str(name)
    }
}

/// The three counters of a book for a period, plus its seal.
///
/// A counter holds the last number issued; zero means nothing was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correlative {
    /// Book and period.
    pub key: CorrelativeKey,
    opening: u64,
    movement: u64,
    closing: u64,
    /// When the book was sealed for the period.
    pub closed_at: Option<DateTime<Utc>>,
}

impl Correlative {
    /// Fresh counters, nothing issued.
    #[must_use]
    pub fn new(key: CorrelativeKey) -> Self {
        Self {
            key,
            opening: 0,
            movement: 0,
            closing: 0,
            closed_at: None,
        }
    }

    /// Counters starting after `last` in `category`.
    #[must_use]
    pub fn starting_at(key: CorrelativeKey, category: CorrelativeCategory, last: u64) -> Self {
        let mut correlative = Self::new(key);
        *correlative.slot(category) = last;
        correlative
    }

    /// Last number issued in `category`.
    #[must_use]
    pub fn current(&self, category: CorrelativeCategory) -> u64 {
        match category {
            CorrelativeCategory::Opening => self.opening,
            CorrelativeCategory::Movement => self.movement,
            CorrelativeCategory::Closing => self.closing,
        }
    }

    /// Returns true once the book is sealed.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Issues the next number in `category`.
    ///
    /// # Errors
    ///
    /// `BookClosed` if sealed, `CorrelativeExhausted` on overflow.
    pub fn advance(&mut self, category: CorrelativeCategory) -> Result<u64, LedgerError> {
        if self.is_sealed() {
            return Err(self.book_closed());
        }
        let key = self.key.clone();
        let slot = self.slot(category);
        let next = slot
            .checked_add(1)
            .ok_or(LedgerError::CorrelativeExhausted {
                book: key.book,
                period: key.period,
                category,
            })?;
        *slot = next;
        Ok(next)
    }

    /// Seals the book for the period.
    ///
    /// # Errors
    ///
    /// `BookClosed` if already sealed.
    pub fn seal(&mut self, at: DateTime<Utc>) -> Result<(), LedgerError> {
        if self.is_sealed() {
            return Err(self.book_closed());
        }
        self.closed_at = Some(at);
        Ok(())
    }

    fn slot(&mut self, category: CorrelativeCategory) -> &mut u64 {
        match category {
            CorrelativeCategory::Opening => &mut self.opening,
            CorrelativeCategory::Movement => &mut self.movement,
            CorrelativeCategory::Closing => &mut self.closing,
        }
    }

    fn book_closed(&self) -> LedgerError {
        LedgerError::BookClosed {
            book: self.key.book.clone(),
            period: self.key.period,
        }
    }
}
