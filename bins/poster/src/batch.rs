//! Batch file format and its replay against a [`JournalEngine`].

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use partida_core::currency::RateDirection;
use partida_core::fiscal::open_year;
use partida_core::ledger::Account;
use partida_core::{
    CorrelativeKey, CurrencyTranslationService, Journal, JournalDt, JournalEngine, LedgerError,
    LedgerStore, XRate,
};
use partida_shared::types::{BookCode, PeriodId};

/// A sequence of operations applied in order.
#[derive(Debug, Deserialize)]
pub struct Batch {
    /// Operations to apply.
    pub operations: Vec<Operation>,
}

/// One batch operation.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Create the twelve monthly periods of a year.
    OpenYear {
        /// Calendar year.
        year: i32,
    },
    /// Register the quotation of a day.
    Rate {
        /// Tax date of the quotation.
        date: NaiveDate,
        /// Purchase rate.
        purchase: Decimal,
        /// Sale rate.
        sale: Decimal,
    },
    /// Register an account of the chart.
    Account(Account),
    /// Commit a draft.
    Commit(Box<DraftEntry>),
    /// Close a tax period.
    Close {
        /// Period to close.
        period: PeriodId,
    },
    /// Seal a book for a period.
    Seal {
        /// Book to seal.
        book: BookCode,
        /// Period to seal it for.
        period: PeriodId,
    },
    /// Reverse a journal committed earlier in the batch.
    Revert {
        /// Label given to the commit.
        label: String,
        /// Tax date of the reversal, defaults to the original's.
        #[serde(default)]
        date_tax: Option<NaiveDate>,
    },
}

/// A draft journal as written in a batch file.
///
/// Header fields are those of [`Journal`]. Lines are numbered in the order
/// given. Without `xrate` the rate is resolved for the tax date using
/// `direction`.
#[derive(Debug, Deserialize)]
pub struct DraftEntry {
    /// Name to refer to the committed journal by.
    #[serde(default)]
    pub label: Option<String>,
    /// Quotation side used when the rate is resolved.
    #[serde(default)]
    pub direction: RateDirection,
    /// Lines in order.
    #[serde(default)]
    pub lines: Vec<JournalDt>,
    /// Header.
    #[serde(flatten)]
    pub header: Journal,
}

/// Why a batch operation was refused.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The engine refused the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A revert named a label no earlier commit in the batch used.
    #[error("No journal was committed under label {0:?}")]
    UnknownLabel(String),
}

impl BatchError {
    /// Stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::UnknownLabel(_) => "UNKNOWN_LABEL",
        }
    }
}

/// Result of one operation.
#[derive(Debug)]
pub enum Outcome {
    /// The operation succeeded.
    Done(String),
    /// The operation was refused.
    Rejected {
        /// Operation name.
        op: &'static str,
        /// Stable error code.
        code: &'static str,
        /// Human-readable reason.
        message: String,
    },
}

impl Outcome {
    /// Whether the operation was refused.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done(summary) => write!(f, "ok    {summary}"),
            Self::Rejected { op, code, message } => write!(f, "error {op} [{code}] {message}"),
        }
    }
}

/// Applies batch operations to an engine.
pub struct Runner<'a, S> {
    engine: &'a JournalEngine<S>,
    committed: HashMap<String, Journal>,
}

impl<'a, S: LedgerStore> Runner<'a, S> {
    /// A runner over `engine`.
    pub fn new(engine: &'a JournalEngine<S>) -> Self {
        Self {
            engine,
            committed: HashMap::new(),
        }
    }

    /// Applies one operation.
    pub fn apply(&mut self, op: &Operation) -> Outcome {
        let (name, result) = match op {
            Operation::OpenYear { year } => ("open_year", self.open_year(*year)),
            Operation::Rate {
                date,
                purchase,
                sale,
            } => ("rate", self.rate(*date, *purchase, *sale)),
            Operation::Account(account) => ("account", self.account(account)),
            Operation::Commit(entry) => ("commit", self.commit(entry)),
            Operation::Close { period } => ("close", self.close(*period)),
            Operation::Seal { book, period } => ("seal", self.seal(book, *period)),
            Operation::Revert { label, date_tax } => ("revert", self.revert(label, *date_tax)),
        };
        match result {
            Ok(summary) => Outcome::Done(summary),
            Err(e) => Outcome::Rejected {
                op: name,
                code: e.error_code(),
                message: e.to_string(),
            },
        }
    }

    fn open_year(&self, year: i32) -> Result<String, BatchError> {
        let created = open_year(self.engine.store(), year)?;
        Ok(format!("year {year} opened ({} new periods)", created.len()))
    }

    fn rate(&self, date: NaiveDate, purchase: Decimal, sale: Decimal) -> Result<String, BatchError> {
        let rate = XRate::new(date, purchase, sale)?;
        self.engine
            .store()
            .transaction(|tx| Ok::<_, LedgerError>(tx.save_rate(&rate)?))?;
        Ok(format!("rate {date} purchase {purchase} sale {sale}"))
    }

    fn account(&self, account: &Account) -> Result<String, BatchError> {
        self.engine
            .store()
            .transaction(|tx| Ok::<_, LedgerError>(tx.save_account(account)?))?;
        Ok(format!("account {} {}", account.code, account.name))
    }

    fn commit(&mut self, entry: &DraftEntry) -> Result<String, BatchError> {
        let mut draft = entry.header.clone();
        for line in &entry.lines {
            draft.add_line(line.clone())?;
        }
        if draft.xrate.is_none() {
            self.engine.pin_rate(&mut draft, entry.direction)?;
        }

        let committed = self.engine.commit(&draft)?;
        let summary = describe(&committed)?;
        if let Some(label) = &entry.label {
            self.committed.insert(label.clone(), committed);
        }
        Ok(summary)
    }

    fn close(&self, period: PeriodId) -> Result<String, BatchError> {
        self.engine.periods().close(period)?;
        Ok(format!("period {period} closed"))
    }

    fn seal(&self, book: &BookCode, period: PeriodId) -> Result<String, BatchError> {
        let key = CorrelativeKey::new(book.clone(), period);
        self.engine.sequencer().seal(&key)?;
        Ok(format!("book {key} sealed"))
    }

    fn revert(&mut self, label: &str, date_tax: Option<NaiveDate>) -> Result<String, BatchError> {
        let Some(original) = self.committed.get_mut(label) else {
            return Err(BatchError::UnknownLabel(label.to_string()));
        };
        let reversal = match date_tax {
            Some(date) => self.engine.revert_on(original, date)?,
            None => self.engine.revert(original)?,
        };
        Ok(format!("{label} reversed by {}", describe(&reversal)?))
    }
}

fn describe(journal: &Journal) -> Result<String, LedgerError> {
    let totals = CurrencyTranslationService::totals(journal.detail())?;
    let key = journal
        .correlative_key()
        .map_or_else(|| journal.book.to_string(), |k| k.to_string());
    let code = journal.correlative_code().unwrap_or_default();
    let id = journal.id.map(|id| id.to_string()).unwrap_or_default();
    Ok(format!(
        "{key} {code} {id} debit {} credit {} (local)",
        totals.debit_sc, totals.credit_sc
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use partida_core::{CachedStore, MemoryStore};
    use partida_shared::config::{CacheConfig, LedgerConfig};

    const BATCH: &str = r#"{
        "operations": [
            {"op": "open_year", "year": 2024},
            {"op": "rate", "date": "2024-03-10", "purchase": "3.695", "sale": "3.700"},
            {"op": "account", "code": "1212", "name": "Receivables"},
            {"op": "account", "code": "7011", "name": "Sales of goods"},
            {"op": "account", "code": "12", "name": "Receivables group", "accepts_postings": false},
            {
                "op": "commit", "label": "invoice", "direction": "sale",
                "book": "05", "subdiary": "01", "currency": "USD",
                "period": "202403", "date_tax": "2024-03-10", "date_doc": "2024-03-10",
                "briefing": "Invoice F001-12",
                "lines": [
                    {"account": "1212", "debit_fc": "50.00"},
                    {"account": "7011", "credit_fc": "50.00"}
                ]
            },
            {
                "op": "commit",
                "book": "05", "subdiary": "01", "currency": "PEN",
                "period": "202403", "date_tax": "2024-03-10", "date_doc": "2024-03-10",
                "briefing": "Posting to a group",
                "lines": [
                    {"account": "12", "debit_fc": "10.00"},
                    {"account": "7011", "credit_fc": "10.00"}
                ]
            },
            {"op": "close", "period": "202403"},
            {"op": "revert", "label": "invoice"},
            {"op": "revert", "label": "invoice", "date_tax": "2024-04-02"},
            {"op": "revert", "label": "missing"}
        ]
    }"#;

    fn engine() -> JournalEngine<CachedStore<MemoryStore>> {
        JournalEngine::new(
            CachedStore::new(MemoryStore::new(), &CacheConfig::default()),
            &LedgerConfig::default(),
        )
    }

    #[test]
    fn test_batch_replay() {
        let batch: Batch = serde_json::from_str(BATCH).unwrap();
        let engine = engine();
        let mut runner = Runner::new(&engine);
        let outcomes: Vec<Outcome> = batch.operations.iter().map(|op| runner.apply(op)).collect();

        let codes: Vec<&str> = outcomes
            .iter()
            .map(|o| match o {
                Outcome::Done(_) => "OK",
                Outcome::Rejected { code, .. } => code,
            })
            .collect();
        assert_eq!(
            codes,
            vec![
                "OK",
                "OK",
                "OK",
                "OK",
                "OK",
                "OK",
                "ACCOUNT_NO_POSTING",
                "OK",
                "PERIOD_CLOSED",
                "OK",
                "UNKNOWN_LABEL",
            ]
        );

        let Outcome::Done(summary) = &outcomes[5] else {
            panic!("commit should succeed");
        };
        assert!(summary.starts_with("05/202403 M1 "));
        assert!(summary.ends_with("debit 185.00 credit 185.00 (local)"));

        let Outcome::Done(summary) = &outcomes[9] else {
            panic!("redated reversal should succeed");
        };
        assert!(summary.starts_with("invoice reversed by 05/202404 M1 "));
        assert_eq!(
            outcomes[10].to_string(),
            r#"error revert [UNKNOWN_LABEL] No journal was committed under label "missing""#
        );
        assert_eq!(engine.store().inner().journal_count(), 2);
    }

    #[test]
    fn test_outcome_display() {
        let rejected = Outcome::Rejected {
            op: "close",
            code: "ALREADY_CLOSED",
            message: "Period 202403 is already closed".to_string(),
        };
        assert!(rejected.is_rejection());
        assert_eq!(
            rejected.to_string(),
            "error close [ALREADY_CLOSED] Period 202403 is already closed"
        );
        assert_eq!(Outcome::Done("x".into()).to_string(), "ok    x");
    }
}
