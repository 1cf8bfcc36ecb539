//! Journals (vouchers) and their lines.
//!
//! A journal owns its lines. Lines are numbered 1..N without gaps and are
//! only ever added, moved or removed through the journal, which keeps the
//! numbering contiguous. Once a journal has an id it is read-only.

use chrono::{DateTime, NaiveDate, Utc};
use partida_shared::types::{AccountCode, BookCode, Currency, JournalId, PeriodId, SubdiaryCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use crate::currency::UNIT_RATE;
use crate::sequence::{CorrelativeCategory, CorrelativeKey};

/// Lifecycle state of a journal instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    /// Being edited, not yet committed.
    Draft,
    /// Committed with an id and correlative.
    Committed,
    /// Committed and later reversed.
    Reverted,
}

/// Link to the external document a journal was derived from.
///
/// Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Book of the source document.
    pub book: Option<String>,
    /// Correlative of the source document.
    pub correlative: Option<String>,
    /// Identifier of the source document.
    pub id: Option<String>,
    /// Period of the source document.
    pub period: Option<String>,
}

/// One debit/credit movement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalDt {
    /// 1-based position in the journal.
    #[serde(default)]
    pub line: u32,
    /// Ledger account.
    pub account: Option<AccountCode>,
    /// Cost center reference.
    #[serde(default)]
    pub cost_center: Option<String>,
    /// Counterparty reference.
    #[serde(default)]
    pub person: Option<String>,
    /// External document (invoice, receipt) reference.
    #[serde(default)]
    pub folio: Option<String>,
    /// Free-text remark.
    #[serde(default)]
    pub reference: Option<String>,
    /// Debit in the journal currency.
    #[serde(default)]
    pub debit_fc: Decimal,
    /// Credit in the journal currency.
    #[serde(default)]
    pub credit_fc: Decimal,
    /// Debit in local currency. Derived from `debit_fc` at commit.
    #[serde(default)]
    pub debit_sc: Decimal,
    /// Credit in local currency. Derived from `credit_fc` at commit.
    #[serde(default)]
    pub credit_sc: Decimal,
}

impl JournalDt {
    /// A debit line.
    #[must_use]
    pub fn debit(account: AccountCode, amount: Decimal) -> Self {
        Self {
            account: Some(account),
            debit_fc: amount,
            ..Self::default()
        }
    }

    /// A credit line.
    #[must_use]
    pub fn credit(account: AccountCode, amount: Decimal) -> Self {
        Self {
            account: Some(account),
            credit_fc: amount,
            ..Self::default()
        }
    }

    /// Sets the free-text remark.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// The same movement on the opposite side, in both currencies.
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            debit_fc: self.credit_fc,
            credit_fc: self.debit_fc,
            debit_sc: self.credit_sc,
            credit_sc: self.debit_sc,
            ..self.clone()
        }
    }
}

/// A journal header with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    /// Assigned at commit (the CUO).
    #[serde(default)]
    pub id: Option<JournalId>,
    /// Book the journal is numbered in.
    pub book: BookCode,
    /// Counter lineage within the book.
    #[serde(default)]
    pub category: CorrelativeCategory,
    /// Tax period.
    #[serde(default)]
    pub period: Option<PeriodId>,
    /// Subdiary.
    #[serde(default)]
    pub subdiary: Option<SubdiaryCode>,
    /// Number inside (book, period, category). Assigned at commit.
    #[serde(default)]
    pub correlative: Option<u64>,
    /// Document date.
    #[serde(default)]
    pub date_doc: Option<NaiveDate>,
    /// Due date.
    #[serde(default)]
    pub date_due: Option<NaiveDate>,
    /// Tax date. Selects the tax period and the exchange rate.
    #[serde(default)]
    pub date_tax: Option<NaiveDate>,
    /// Journal currency.
    #[serde(default)]
    pub currency: Option<Currency>,
    /// Rate used to translate into local currency.
    #[serde(default)]
    pub xrate: Option<Decimal>,
    /// Description.
    #[serde(default)]
    pub briefing: String,
    /// Commit timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// The journal reversing this one.
    #[serde(default)]
    pub reverted_by: Option<JournalId>,
    /// The journal this one reverses.
    #[serde(default)]
    pub reverses: Option<JournalId>,
    /// External document linkage.
    #[serde(default)]
    pub source: Option<SourceDocument>,
    #[serde(default)]
    detail: Vec<JournalDt>,
}

impl Journal {
    /// An empty local-currency draft in `book`.
    #[must_use]
    pub fn draft(book: BookCode) -> Self {
        Self {
            id: None,
            book,
            category: CorrelativeCategory::default(),
            period: None,
            subdiary: None,
            correlative: None,
            date_doc: None,
            date_due: None,
            date_tax: None,
            currency: Some(Currency::LOCAL),
            xrate: Some(UNIT_RATE),
            briefing: String::new(),
            created_at: None,
            reverted_by: None,
            reverses: None,
            source: None,
            detail: Vec::new(),
        }
    }

    /// Sets the tax date, the document date and the period they fall in.
    #[must_use]
    pub fn dated(mut self, date: NaiveDate) -> Self {
        self.date_tax = Some(date);
        self.date_doc = Some(date);
        self.period = Some(PeriodId::from_date(date));
        self
    }

    /// Lines in order.
    #[must_use]
    pub fn detail(&self) -> &[JournalDt] {
        &self.detail
    }

    pub(crate) fn detail_mut(&mut self) -> &mut [JournalDt] {
        &mut self.detail
    }

    pub(crate) fn with_detail(mut self, detail: Vec<JournalDt>) -> Self {
        self.detail = detail;
        self
    }

    /// Lifecycle state.
    #[must_use]
    pub fn status(&self) -> JournalStatus {
        match (self.id, self.reverted_by) {
            (None, _) => JournalStatus::Draft,
            (Some(_), None) => JournalStatus::Committed,
            (Some(_), Some(_)) => JournalStatus::Reverted,
        }
    }

    /// Committed and reverted journals cannot be edited.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.id.is_some()
    }

    /// Counter scope, once the period is known.
    #[must_use]
    pub fn correlative_key(&self) -> Option<CorrelativeKey> {
        self.period
            .map(|period| CorrelativeKey::new(self.book.clone(), period))
    }

    /// Correlative rendered with its lineage prefix, e.g. `M12`.
    #[must_use]
    pub fn correlative_code(&self) -> Option<String> {
        self.correlative
            .map(|n| format!("{}{n}", self.category.prefix()))
    }

    /// Appends a line and returns its number. SC columns are cleared; they
    /// are derived at commit.
    ///
    /// # Errors
    ///
    /// `ReadOnly` once committed.
    pub fn add_line(&mut self, mut line: JournalDt) -> Result<u32, LedgerError> {
        self.ensure_editable()?;
        let number = self.next_line_number();
        line.line = number;
        line.debit_sc = Decimal::ZERO;
        line.credit_sc = Decimal::ZERO;
        self.detail.push(line);
        Ok(number)
    }

    /// Removes line `number` and renumbers the following lines.
    ///
    /// # Errors
    ///
    /// `ReadOnly` once committed, `LineNotFound` for an unknown number.
    pub fn remove_line(&mut self, number: u32) -> Result<JournalDt, LedgerError> {
        self.ensure_editable()?;
        let index = self.index_of(number)?;
        let removed = self.detail.remove(index);
        self.renumber();
        Ok(removed)
    }

    /// Moves line `from` to position `to` and renumbers.
    ///
    /// # Errors
    ///
    /// `ReadOnly` once committed, `LineNotFound` for an unknown number.
    pub fn move_line(&mut self, from: u32, to: u32) -> Result<(), LedgerError> {
        self.ensure_editable()?;
        let source = self.index_of(from)?;
        let target = self.index_of(to)?;
        let line = self.detail.remove(source);
        self.detail.insert(target, line);
        self.renumber();
        Ok(())
    }

    /// Mutable access to line `number`.
    ///
    /// # Errors
    ///
    /// `ReadOnly` once committed, `LineNotFound` for an unknown number.
    pub fn line_mut(&mut self, number: u32) -> Result<&mut JournalDt, LedgerError> {
        self.ensure_editable()?;
        let index = self.index_of(number)?;
        Ok(&mut self.detail[index])
    }

    /// Fails with `ReadOnly` unless the journal is still a draft.
    ///
    /// # Errors
    ///
    /// `ReadOnly` once committed.
    pub fn ensure_editable(&self) -> Result<(), LedgerError> {
        match self.id {
            Some(id) => Err(LedgerError::ReadOnly(id)),
            None => Ok(()),
        }
    }

    fn next_line_number(&self) -> u32 {
        u32::try_from(self.detail.len())
            .unwrap_or(u32::MAX)
            .saturating_add(1)
    }

    fn index_of(&self, number: u32) -> Result<usize, LedgerError> {
        self.detail
            .iter()
            .position(|l| l.line == number)
            .ok_or(LedgerError::LineNotFound(number))
    }

    fn renumber(&mut self) {
        for (number, line) in (1u32..).zip(self.detail.iter_mut()) {
            line.line = number;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account(code: &str) -> AccountCode {
        AccountCode::new(code).unwrap()
    }

    fn draft() -> Journal {
        Journal::draft(BookCode::new("05").unwrap())
    }

    fn three_lines() -> Journal {
        let mut j = draft();
        j.add_line(JournalDt::debit(account("A"), dec!(10.00))).unwrap();
        j.add_line(JournalDt::debit(account("B"), dec!(20.00))).unwrap();
        j.add_line(JournalDt::credit(account("C"), dec!(30.00))).unwrap();
        j
    }

    fn accounts(j: &Journal) -> Vec<&str> {
        j.detail()
            .iter()
            .map(|l| l.account.as_ref().map_or("", AccountCode::as_str))
            .collect()
    }

    fn numbers(j: &Journal) -> Vec<u32> {
        j.detail().iter().map(|l| l.line).collect()
    }

    #[test]
    fn test_draft_defaults() {
        let j = draft();
        assert_eq!(j.status(), JournalStatus::Draft);
        assert_eq!(j.currency, Some(Currency::Pen));
        assert_eq!(j.xrate, Some(dec!(1.000)));
        assert_eq!(j.category, CorrelativeCategory::Movement);
        assert!(j.detail().is_empty());
        assert!(!j.is_read_only());
    }

    #[test]
    fn test_add_line_numbers_and_clears_sc() {
        let mut j = draft();
        let mut line = JournalDt::debit(account("A"), dec!(10.00));
        line.line = 42;
        line.debit_sc = dec!(37.00);
        assert_eq!(j.add_line(line).unwrap(), 1);
        assert_eq!(j.detail()[0].line, 1);
        assert_eq!(j.detail()[0].debit_sc, Decimal::ZERO);
    }

    #[test]
    fn test_remove_line_renumbers() {
        let mut j = three_lines();
        let removed = j.remove_line(2).unwrap();
        assert_eq!(removed.account, Some(account("B")));
        assert_eq!(numbers(&j), vec![1, 2]);
        assert_eq!(accounts(&j), vec!["A", "C"]);
        assert!(matches!(j.remove_line(3), Err(LedgerError::LineNotFound(3))));
    }

    #[test]
    fn test_move_line() {
        let mut j = three_lines();
        j.move_line(3, 1).unwrap();
        assert_eq!(accounts(&j), vec!["C", "A", "B"]);
        assert_eq!(numbers(&j), vec![1, 2, 3]);

        j.move_line(1, 3).unwrap();
        assert_eq!(accounts(&j), vec!["A", "B", "C"]);
        assert!(matches!(j.move_line(1, 9), Err(LedgerError::LineNotFound(9))));
    }

    #[test]
    fn test_committed_journal_is_read_only() {
        let mut j = three_lines();
        let id = JournalId::new();
        j.id = Some(id);
        assert_eq!(j.status(), JournalStatus::Committed);
        assert!(j.is_read_only());
        assert!(matches!(
            j.add_line(JournalDt::debit(account("D"), dec!(1.00))),
            Err(LedgerError::ReadOnly(x)) if x == id
        ));
        assert!(matches!(j.remove_line(1), Err(LedgerError::ReadOnly(_))));
        assert!(matches!(j.move_line(1, 2), Err(LedgerError::ReadOnly(_))));
        assert!(matches!(j.line_mut(1), Err(LedgerError::ReadOnly(_))));
        assert_eq!(j.detail().len(), 3);

        j.reverted_by = Some(JournalId::new());
        assert_eq!(j.status(), JournalStatus::Reverted);
    }

    #[test]
    fn test_correlative_code() {
        let mut j = draft();
        assert_eq!(j.correlative_code(), None);
        j.correlative = Some(12);
        assert_eq!(j.correlative_code().as_deref(), Some("M12"));
        j.category = CorrelativeCategory::Opening;
        assert_eq!(j.correlative_code().as_deref(), Some("A12"));
    }

    #[test]
    fn test_dated_sets_period() {
        let j = draft().dated(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(j.period.map(|p| p.to_string()).as_deref(), Some("202402"));
        assert_eq!(j.date_doc, j.date_tax);
        assert_eq!(
            j.correlative_key().map(|k| k.to_string()).as_deref(),
            Some("05/202402")
        );
    }

    #[test]
    fn test_negated_swaps_both_currencies() {
        let mut line = JournalDt::debit(account("A"), dec!(50.00)).with_reference("inv 1");
        line.debit_sc = dec!(185.00);
        let neg = line.negated();
        assert_eq!(neg.credit_fc, dec!(50.00));
        assert_eq!(neg.debit_fc, Decimal::ZERO);
        assert_eq!(neg.credit_sc, dec!(185.00));
        assert_eq!(neg.reference.as_deref(), Some("inv 1"));
    }

    #[test]
    fn test_deserialize_minimal_draft() {
        let json = r#"{
            "book": "05",
            "date_tax": "2024-03-10",
            "currency": "USD",
            "xrate": "3.700",
            "briefing": "Sale",
            "detail": [
                {"line": 1, "account": "1212", "debit_fc": "50.00"},
                {"line": 2, "account": "7011", "credit_fc": "50.00"}
            ]
        }"#;
        let j: Journal = serde_json::from_str(json).unwrap();
        assert_eq!(j.status(), JournalStatus::Draft);
        assert_eq!(j.category, CorrelativeCategory::Movement);
        assert_eq!(j.currency, Some(Currency::Usd));
        assert_eq!(j.xrate, Some(dec!(3.700)));
        assert_eq!(j.detail().len(), 2);
        assert_eq!(j.detail()[1].credit_fc, dec!(50.00));
        assert_eq!(j.detail()[1].debit_fc, Decimal::ZERO);
    }
}
