//! Validation issues reported for a draft journal.
//!
//! Issues are user-correctable and are always reported together so the
//! caller can show the complete list at once.

use chrono::NaiveDate;
use partida_shared::types::PeriodId;
use rust_decimal::Decimal;
use serde::Serialize;

/// A single broken validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// No tax period reference.
    MissingPeriod,
    /// No subdiary code.
    MissingSubdiary,
    /// No tax date.
    MissingTaxDate,
    /// No document date.
    MissingDocumentDate,
    /// No currency.
    MissingCurrency,
    /// Exchange rate absent, zero or negative.
    MissingRate,
    /// Local-currency journal whose rate is not 1.000.
    LocalRateNotUnity {
        /// The rate found on the journal.
        rate: Decimal,
    },
    /// Exchange rate with more than three decimals.
    RateScale {
        /// The rate found on the journal.
        rate: Decimal,
    },
    /// `period` does not match the month of the tax date.
    PeriodMismatch {
        /// Period on the header.
        period: PeriodId,
        /// Tax date on the header.
        date_tax: NaiveDate,
    },
    /// Due date earlier than the document date.
    DueBeforeDocument {
        /// Document date.
        date_doc: NaiveDate,
        /// Due date.
        date_due: NaiveDate,
    },
    /// Blank description.
    BlankBriefing,
    /// Journal without lines.
    EmptyDetail,
    /// Line number differs from its 1-based position.
    LineOutOfSequence {
        /// Expected line number.
        position: u32,
        /// Line number found.
        line: u32,
    },
    /// Line without account.
    MissingAccount {
        /// Line number.
        line: u32,
    },
    /// Debit equals credit on the line (0 == 0 included).
    NoAmount {
        /// Line number.
        line: u32,
    },
    /// Negative debit or credit on the line.
    NegativeAmount {
        /// Line number.
        line: u32,
    },
    /// Amount with more than two decimals on the line.
    AmountScale {
        /// Line number.
        line: u32,
    },
    /// Foreign-currency totals do not fit in a `Decimal`.
    AmountOverflow,
    /// Foreign-currency debits and credits differ.
    Unbalanced {
        /// Total debit FC.
        debit: Decimal,
        /// Total credit FC.
        credit: Decimal,
    },
}

impl ValidationIssue {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingPeriod => "MISSING_PERIOD",
            Self::MissingSubdiary => "MISSING_SUBDIARY",
            Self::MissingTaxDate => "MISSING_TAX_DATE",
            Self::MissingDocumentDate => "MISSING_DOCUMENT_DATE",
            Self::MissingCurrency => "MISSING_CURRENCY",
            Self::MissingRate => "MISSING_RATE",
            Self::LocalRateNotUnity { .. } => "LOCAL_RATE_NOT_UNITY",
            Self::RateScale { .. } => "RATE_SCALE",
            Self::PeriodMismatch { .. } => "PERIOD_MISMATCH",
            Self::DueBeforeDocument { .. } => "DUE_BEFORE_DOCUMENT",
            Self::BlankBriefing => "BLANK_BRIEFING",
            Self::EmptyDetail => "EMPTY_DETAIL",
            Self::LineOutOfSequence { .. } => "LINE_OUT_OF_SEQUENCE",
            Self::MissingAccount { .. } => "MISSING_ACCOUNT",
            Self::NoAmount { .. } => "NO_AMOUNT",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::AmountScale { .. } => "AMOUNT_SCALE",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::Unbalanced { .. } => "UNBALANCED",
        }
    }

    /// Line the issue refers to, if any.
    #[must_use]
    pub fn line(&self) -> Option<u32> {
        match self {
            Self::LineOutOfSequence { position: line, .. }
            | Self::MissingAccount { line }
            | Self::NoAmount { line }
            | Self::NegativeAmount { line }
            | Self::AmountScale { line } => Some(*line),
            _ => None,
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPeriod => f.write_str("tax period is required"),
            Self::MissingSubdiary => f.write_str("subdiary is required"),
            Self::MissingTaxDate => f.write_str("tax date is required"),
            Self::MissingDocumentDate => f.write_str("document date is required"),
            Self::MissingCurrency => f.write_str("currency is required"),
            Self::MissingRate => f.write_str("a positive exchange rate is required"),
            Self::LocalRateNotUnity { rate } => {
                write!(f, "exchange rate must be 1.000 for local currency, got {rate}")
            }
            Self::RateScale { rate } => {
                write!(f, "exchange rate {rate} has more than 3 decimals")
            }
            Self::PeriodMismatch { period, date_tax } => {
                write!(f, "tax date {date_tax} is outside period {period}")
            }
            Self::DueBeforeDocument { date_doc, date_due } => {
                write!(f, "due date {date_due} is before document date {date_doc}")
            }
            Self::BlankBriefing => f.write_str("briefing is required"),
            Self::EmptyDetail => f.write_str("journal has no lines"),
            Self::LineOutOfSequence { position, line } => {
                write!(f, "line {line} found at position {position}")
            }
            Self::MissingAccount { line } => write!(f, "no account on line {line}"),
            Self::NoAmount { line } => write!(f, "no amount entered on line {line}"),
            Self::NegativeAmount { line } => write!(f, "negative amount on line {line}"),
            Self::AmountScale { line } => {
                write!(f, "amount on line {line} has more than 2 decimals")
            }
            Self::AmountOverflow => f.write_str("amounts are too large to total"),
            Self::Unbalanced { debit, credit } => {
                write!(f, "debits ({debit}) do not equal credits ({credit})")
            }
        }
    }
}

/// Ordered collection of issues, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationIssues(Vec<ValidationIssue>);

impl ValidationIssues {
    /// Number of issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no issues.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the issues in rule order.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationIssue> {
        self.0.iter()
    }

    /// Returns true if an issue with `code` is present.
    #[must_use]
    pub fn contains_code(&self, code: &str) -> bool {
        self.0.iter().any(|issue| issue.code() == code)
    }

    /// Consumes the collection.
    #[must_use]
    pub fn into_vec(self) -> Vec<ValidationIssue> {
        self.0
    }
}

impl From<Vec<ValidationIssue>> for ValidationIssues {
    fn from(issues: Vec<ValidationIssue>) -> Self {
        Self(issues)
    }
}

impl<'a> IntoIterator for &'a ValidationIssues {
    type Item = &'a ValidationIssue;
    type IntoIter = std::slice::Iter<'a, ValidationIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}
