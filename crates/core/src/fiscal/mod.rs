//! Tax periods and their open/closed lifecycle.

pub mod calendar;
pub mod lifecycle;
pub mod period;

pub use calendar::{monthly_periods, open_year};
pub use lifecycle::{TaxPeriodLifecycle, ensure_open_in};
pub use period::{PeriodStatus, TaxPeriod};
