//! Common types used across the workspace.

pub mod currency;
pub mod id;
pub mod period;

pub use currency::Currency;
pub use id::*;
pub use period::{PeriodId, PeriodIdError};
