//! Daily exchange rates and their resolution.

use chrono::NaiveDate;
use partida_shared::config::NeutralRatePolicy;
use partida_shared::types::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::ledger::LedgerError;
use crate::store::StoreError;

/// The rate every local-currency amount is translated with.
pub const UNIT_RATE: Decimal = Decimal::from_parts(1000, 0, 0, false, 3);

/// Maximum number of decimals a quoted rate may carry.
pub const RATE_DECIMALS: u32 = 3;

/// A daily quotation: one row per tax date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XRate {
    /// Row identifier.
    pub id: Uuid,
    /// Tax date the quotation applies to (unique).
    pub tax_date: NaiveDate,
    /// Purchase rate.
    pub purchase: Decimal,
    /// Sale rate.
    pub sale: Decimal,
}

impl XRate {
    /// Creates a quotation.
    ///
    /// # Errors
    ///
    /// `InvalidRate` if either rate is not positive or has more than three
    /// decimals.
    pub fn new(tax_date: NaiveDate, purchase: Decimal, sale: Decimal) -> Result<Self, LedgerError> {
        for rate in [purchase, sale] {
            if !is_valid_rate(rate) {
                return Err(LedgerError::InvalidRate(rate));
            }
        }
        Ok(Self {
            id: Uuid::now_v7(),
            tax_date,
            purchase,
            sale,
        })
    }

    /// Rate quoted for a buy or sell direction. Neutral has no quote.
    #[must_use]
    pub fn quote(&self, direction: RateDirection) -> Option<Decimal> {
        match direction {
            RateDirection::Purchase => Some(self.purchase),
            RateDirection::Sale => Some(self.sale),
            RateDirection::Neutral => None,
        }
    }
}

/// Returns true for a positive rate with at most three decimals.
#[must_use]
pub fn is_valid_rate(rate: Decimal) -> bool {
    rate > Decimal::ZERO && rate.normalize().scale() <= RATE_DECIMALS
}

/// Which side of the quotation applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateDirection {
    /// Purchase (buy) rate.
    Purchase,
    /// Sale (sell) rate.
    Sale,
    /// No side chosen.
    #[default]
    Neutral,
}

/// Resolves the rate a journal should be translated with.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExchangeRateResolver {
    neutral_policy: NeutralRatePolicy,
}

impl ExchangeRateResolver {
    /// Creates a resolver applying `neutral_policy` when no side is chosen.
    #[must_use]
    pub const fn new(neutral_policy: NeutralRatePolicy) -> Self {
        Self { neutral_policy }
    }

    /// The configured neutral-direction policy.
    #[must_use]
    pub const fn neutral_policy(&self) -> NeutralRatePolicy {
        self.neutral_policy
    }

    /// Resolves the rate for `date`, `currency` and `direction`.
    ///
    /// The local currency is always 1.000 and never triggers a lookup.
    /// Otherwise the quotation for `date` must exist, even when the neutral
    /// policy ends up ignoring it.
    ///
    /// # Errors
    ///
    /// `RateNotFound` when no quotation exists for `date`,
    /// `DirectionRequired` for a neutral lookup under the reject policy,
    /// or the lookup's store error.
    pub fn resolve<L>(
        &self,
        date: NaiveDate,
        currency: Currency,
        direction: RateDirection,
        lookup: L,
    ) -> Result<Decimal, LedgerError>
    where
        L: FnOnce(NaiveDate) -> Result<Option<XRate>, StoreError>,
    {
        if currency.is_local() {
            return Ok(UNIT_RATE);
        }

        let xrate = lookup(date)?.ok_or(LedgerError::RateNotFound(date))?;

        let rate = match (direction, self.neutral_policy) {
            (RateDirection::Purchase, _) | (RateDirection::Neutral, NeutralRatePolicy::Purchase) => {
                xrate.purchase
            }
            (RateDirection::Sale, _) | (RateDirection::Neutral, NeutralRatePolicy::Sale) => {
                xrate.sale
            }
            (RateDirection::Neutral, NeutralRatePolicy::Unity) => UNIT_RATE,
            (RateDirection::Neutral, NeutralRatePolicy::Reject) => {
                return Err(LedgerError::DirectionRequired);
            }
        };

        debug!(%date, %currency, ?direction, %rate, "Exchange rate resolved");
        Ok(rate)
    }
}
