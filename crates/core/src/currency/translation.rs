//! Translation of foreign-currency (FC) amounts into the local currency (SC).
//!
//! CRITICAL: Never use floating-point for money calculations.
//!
//! Every SC amount is `round(FC * rate, 2, HALF_UP)`. The rounding mode and
//! scale are fixed; changing either changes ledger totals.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::{JournalDt, LedgerError};

/// Scale of every ledger amount.
pub const AMOUNT_SCALE: u32 = 2;

/// FC to SC translation.
///
/// Provides HALF_UP rounding (`RoundingStrategy::MidpointAwayFromZero`):
/// - 0.125 -> 0.13
/// - 0.135 -> 0.14
/// - -0.125 -> -0.13
pub struct CurrencyTranslationService;

impl CurrencyTranslationService {
    /// Rounds `value` to the amount scale, HALF_UP.
    ///
    /// The result always carries exactly two decimals.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use partida_core::CurrencyTranslationService;
    ///
    /// assert_eq!(CurrencyTranslationService::round_half_up(dec!(2.345)), dec!(2.35));
    /// assert_eq!(CurrencyTranslationService::round_half_up(dec!(185)).to_string(), "185.00");
    /// ```
    #[must_use]
    pub fn round_half_up(value: Decimal) -> Decimal {
        let mut rounded =
            value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(AMOUNT_SCALE);
        rounded
    }

    /// Converts one FC amount with `rate`.
    ///
    /// # Errors
    ///
    /// `AmountOverflow` if the product does not fit in a `Decimal`.
    pub fn convert(amount: Decimal, rate: Decimal) -> Result<Decimal, LedgerError> {
        amount
            .checked_mul(rate)
            .map(Self::round_half_up)
            .ok_or(LedgerError::AmountOverflow)
    }

    /// Recomputes the SC columns of every line in place.
    ///
    /// # Errors
    ///
    /// `AmountOverflow`. The lines are left unchanged in that case.
    pub fn translate(lines: &mut [JournalDt], rate: Decimal) -> Result<(), LedgerError> {
        let converted = lines
            .iter()
            .map(|line| {
                Ok::<_, LedgerError>((
                    Self::convert(line.debit_fc, rate)?,
                    Self::convert(line.credit_fc, rate)?,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        for (line, (debit_sc, credit_sc)) in lines.iter_mut().zip(converted) {
            line.debit_sc = debit_sc;
            line.credit_sc = credit_sc;
        }
        Ok(())
    }

    /// Returns translated copies of `lines`.
    ///
    /// # Errors
    ///
    /// `AmountOverflow`.
    pub fn translated(lines: &[JournalDt], rate: Decimal) -> Result<Vec<JournalDt>, LedgerError> {
        let mut out = lines.to_vec();
        Self::translate(&mut out, rate)?;
        Ok(out)
    }

    /// Sums the four amount columns.
    ///
    /// # Errors
    ///
    /// `AmountOverflow` if a column total does not fit in a `Decimal`.
    pub fn totals(lines: &[JournalDt]) -> Result<JournalTotals, LedgerError> {
        lines
            .iter()
            .try_fold(JournalTotals::default(), |acc, line| {
                Some(JournalTotals {
                    debit_fc: acc.debit_fc.checked_add(line.debit_fc)?,
                    credit_fc: acc.credit_fc.checked_add(line.credit_fc)?,
                    debit_sc: acc.debit_sc.checked_add(line.debit_sc)?,
                    credit_sc: acc.credit_sc.checked_add(line.credit_sc)?,
                })
            })
            .ok_or(LedgerError::AmountOverflow)
    }

    /// Checked sum of `amounts`, `None` on overflow.
    #[must_use]
    pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
        amounts
            .into_iter()
            .try_fold(Decimal::ZERO, Decimal::checked_add)
    }
}

/// Column totals of a journal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JournalTotals {
    /// Sum of debit FC.
    pub debit_fc: Decimal,
    /// Sum of credit FC.
    pub credit_fc: Decimal,
    /// Sum of debit SC.
    pub debit_sc: Decimal,
    /// Sum of credit SC.
    pub credit_sc: Decimal,
}

impl JournalTotals {
    /// FC debits equal FC credits.
    #[must_use]
    pub fn is_balanced_fc(&self) -> bool {
        self.debit_fc == self.credit_fc
    }

    /// SC debits equal SC credits.
    #[must_use]
    pub fn is_balanced_sc(&self) -> bool {
        self.debit_sc == self.credit_sc
    }

    /// Debit minus credit, FC. `None` on overflow.
    #[must_use]
    pub fn difference_fc(&self) -> Option<Decimal> {
        self.debit_fc.checked_sub(self.credit_fc)
    }

    /// Debit minus credit, SC. `None` on overflow.
    #[must_use]
    pub fn difference_sc(&self) -> Option<Decimal> {
        self.debit_sc.checked_sub(self.credit_sc)
    }
}
