//! Chart-of-accounts entries as seen by the posting rules.

use partida_shared::types::AccountCode;
use serde::{Deserialize, Serialize};

/// A ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account code.
    pub code: AccountCode,
    /// Display name.
    pub name: String,
    /// Grouping accounts only aggregate their children and reject postings.
    #[serde(default = "default_accepts_postings")]
    pub accepts_postings: bool,
}

fn default_accepts_postings() -> bool {
    true
}

impl Account {
    /// Creates a postable account.
    #[must_use]
    pub fn new(code: AccountCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            accepts_postings: true,
        }
    }

    /// Creates a grouping account that rejects postings.
    #[must_use]
    pub fn grouping(code: AccountCode, name: impl Into<String>) -> Self {
        Self {
            accepts_postings: false,
            ..Self::new(code, name)
        }
    }
}
