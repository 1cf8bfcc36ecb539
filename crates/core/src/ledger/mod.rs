//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Journals and their lines
//! - Validation rules collected into an issue list
//! - Commit and reversal through [`JournalEngine`]
//! - Error types for ledger operations

pub mod account;
pub mod engine;
pub mod error;
pub mod issue;
pub mod journal;
pub mod reversal;
pub mod validation;

#[cfg(test)]
mod engine_props;
#[cfg(test)]
mod validation_props;

pub use account::Account;
pub use engine::JournalEngine;
pub use error::LedgerError;
pub use issue::{ValidationIssue, ValidationIssues};
pub use journal::{Journal, JournalDt, JournalStatus, SourceDocument};
pub use reversal::ReversalService;
pub use validation::validate;
