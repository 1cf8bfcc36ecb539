//! Typed IDs and codes for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `BookCode` where an
//! `AccountCode` is expected.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

/// A code was blank after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} code cannot be blank")]
pub struct BlankCodeError {
    /// The kind of code that was rejected.
    pub kind: &'static str,
}

/// Macro to generate non-blank string code wrappers.
///
/// Codes are trimmed on construction and compared verbatim afterwards.
macro_rules! code {
    ($name:ident, $kind:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a code, rejecting blank input.
            pub fn new(code: impl AsRef<str>) -> Result<Self, BlankCodeError> {
                let trimmed = code.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(BlankCodeError { kind: $kind });
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Returns the code as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = BlankCodeError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(code: $name) -> Self {
                code.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = BlankCodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

typed_id!(
    JournalId,
    "Unique identifier of a committed journal (the CUO)."
);

code!(AccountCode, "account", "Chart-of-accounts code, e.g. `1041`.");
code!(BookCode, "book", "Sub-ledger book code, e.g. `05` for the journal book.");
code!(SubdiaryCode, "subdiary", "Subdiary (sub-journal) code.");
