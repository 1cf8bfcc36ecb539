//! Exchange rates and FC to SC translation.

pub mod rate;
pub mod translation;

#[cfg(test)]
mod props;

pub use rate::{ExchangeRateResolver, RateDirection, UNIT_RATE, XRate};
pub use translation::{CurrencyTranslationService, JournalTotals};
