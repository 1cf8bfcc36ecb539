//! Property-based tests for rate resolution and translation.
//!
//! - Translated SC equals HALF_UP(FC * rate) at two decimals
//! - Totals are an order-independent fold
//! - The local currency always resolves to 1.000

use chrono::NaiveDate;
use partida_shared::config::NeutralRatePolicy;
use partida_shared::types::{AccountCode, Currency};
use proptest::prelude::*;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use super::rate::{ExchangeRateResolver, RateDirection, UNIT_RATE};
use super::translation::CurrencyTranslationService;
use crate::ledger::JournalDt;

/// Strategy to generate FC amounts (0.00 to 1,000,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate rates (0.001 to 99.999).
fn rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|v| Decimal::new(v, 3))
}

fn direction() -> impl Strategy<Value = RateDirection> {
    prop_oneof![
        Just(RateDirection::Purchase),
        Just(RateDirection::Sale),
        Just(RateDirection::Neutral),
    ]
}

fn policy() -> impl Strategy<Value = NeutralRatePolicy> {
    prop_oneof![
        Just(NeutralRatePolicy::Unity),
        Just(NeutralRatePolicy::Sale),
        Just(NeutralRatePolicy::Purchase),
        Just(NeutralRatePolicy::Reject),
    ]
}

fn line() -> impl Strategy<Value = JournalDt> {
    (amount(), any::<bool>()).prop_map(|(value, is_debit)| {
        let account = AccountCode::new("1041").unwrap();
        if is_debit {
            JournalDt::debit(account, value)
        } else {
            JournalDt::credit(account, value)
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_convert_has_two_decimals(fc in amount(), r in rate()) {
        let sc = CurrencyTranslationService::convert(fc, r).unwrap();
        prop_assert_eq!(sc.scale(), 2);
    }

    #[test]
    fn prop_convert_is_within_half_cent(fc in amount(), r in rate()) {
        let exact = fc * r;
        let sc = CurrencyTranslationService::convert(fc, r).unwrap();
        let half_cent = Decimal::new(5, 3);
        prop_assert!((sc - exact).abs() <= half_cent);
        // Midpoints always round away from zero.
        if (sc - exact).abs() == half_cent {
            prop_assert!(sc > exact);
        }
    }

    #[test]
    fn prop_convert_matches_away_from_zero(fc in amount(), r in rate()) {
        let expected = (fc * r).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        prop_assert_eq!(CurrencyTranslationService::convert(fc, r).unwrap(), expected);
    }

    #[test]
    fn prop_unit_rate_is_identity(fc in amount()) {
        prop_assert_eq!(CurrencyTranslationService::convert(fc, UNIT_RATE).unwrap(), fc);
    }

    #[test]
    fn prop_translate_sets_each_column(lines in prop::collection::vec(line(), 1..20), r in rate()) {
        let out = CurrencyTranslationService::translated(&lines, r).unwrap();
        for (before, after) in lines.iter().zip(&out) {
            prop_assert_eq!(after.debit_fc, before.debit_fc);
            prop_assert_eq!(after.credit_fc, before.credit_fc);
            prop_assert_eq!(after.debit_sc, CurrencyTranslationService::convert(before.debit_fc, r).unwrap());
            prop_assert_eq!(after.credit_sc, CurrencyTranslationService::convert(before.credit_fc, r).unwrap());
        }
    }

    #[test]
    fn prop_totals_ignore_order(lines in prop::collection::vec(line(), 0..20), r in rate()) {
        let lines = CurrencyTranslationService::translated(&lines, r).unwrap();
        let mut reversed = lines.clone();
        reversed.reverse();
        prop_assert_eq!(
            CurrencyTranslationService::totals(&lines).unwrap(),
            CurrencyTranslationService::totals(&reversed).unwrap()
        );
    }

    #[test]
    fn prop_local_currency_is_unity(d in direction(), p in policy(), day in 1u32..=28) {
        let date = NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
        let resolver = ExchangeRateResolver::new(p);
        let rate = resolver.resolve(date, Currency::Pen, d, |_| Ok(None)).unwrap();
        prop_assert_eq!(rate, UNIT_RATE);
    }
}
