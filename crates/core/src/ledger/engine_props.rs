//! Property-based tests for commit and reversal.
//!
//! - Committed journals balance in FC and SC
//! - Every committed SC amount is HALF_UP(FC * xrate)
//! - A rejected commit is always an SC imbalance and writes nothing
//! - Reversal lines mirror the original's

use chrono::NaiveDate;
use partida_shared::config::LedgerConfig;
use partida_shared::types::{AccountCode, BookCode, Currency, SubdiaryCode};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::account::Account;
use super::engine::JournalEngine;
use super::error::LedgerError;
use super::journal::{Journal, JournalDt};
use crate::currency::CurrencyTranslationService;
use crate::fiscal::open_year;
use crate::store::{LedgerStore, MemoryStore};

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate rates (0.100 to 9.999).
fn rate() -> impl Strategy<Value = Decimal> {
    (100i64..10_000i64).prop_map(|v| Decimal::new(v, 3))
}

fn engine() -> JournalEngine<MemoryStore> {
    let store = MemoryStore::new();
    open_year(&store, 2024).unwrap();
    for code in ["1212", "7011"] {
        store.insert_account(Account::new(AccountCode::new(code).unwrap(), code));
    }
    JournalEngine::new(store, &LedgerConfig::default())
}

/// Debits `amounts` to receivables and closes them with one credit.
fn journal(amounts: &[Decimal], xrate: Decimal) -> Journal {
    let date = NaiveDate::from_ymd_opt(2024, 8, 14).unwrap();
    let mut j = Journal::draft(BookCode::new("14").unwrap()).dated(date);
    j.subdiary = Some(SubdiaryCode::new("01").unwrap());
    j.briefing = "Generated sale".to_string();
    j.currency = Some(Currency::Usd);
    j.xrate = Some(xrate);
    for amount in amounts {
        j.add_line(JournalDt::debit(AccountCode::new("1212").unwrap(), *amount))
            .unwrap();
    }
    let total: Decimal = amounts.iter().copied().sum();
    j.add_line(JournalDt::credit(AccountCode::new("7011").unwrap(), total))
        .unwrap();
    j
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_committed_journal_balances(
        amounts in prop::collection::vec(positive_amount(), 1..8),
        xrate in rate(),
    ) {
        let engine = engine();
        let draft = journal(&amounts, xrate);

        match engine.commit(&draft) {
            Ok(committed) => {
                let totals = CurrencyTranslationService::totals(committed.detail()).unwrap();
                prop_assert!(totals.is_balanced_fc());
                prop_assert!(totals.is_balanced_sc());
                for line in committed.detail() {
                    prop_assert_eq!(line.debit_sc, CurrencyTranslationService::convert(line.debit_fc, xrate).unwrap());
                    prop_assert_eq!(line.credit_sc, CurrencyTranslationService::convert(line.credit_fc, xrate).unwrap());
                }
                prop_assert_eq!(committed.correlative, Some(1));
            }
            Err(LedgerError::TranslationUnbalanced { debit, credit }) => {
                let translated = CurrencyTranslationService::translated(draft.detail(), xrate).unwrap();
                let totals = CurrencyTranslationService::totals(&translated).unwrap();
                prop_assert_eq!(debit, totals.debit_sc);
                prop_assert_eq!(credit, totals.credit_sc);
                prop_assert_ne!(debit, credit);
                prop_assert_eq!(engine.store().journal_count(), 0);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn prop_single_debit_always_commits(amount in positive_amount(), xrate in rate()) {
        let engine = engine();
        let committed = engine.commit(&journal(&[amount], xrate)).unwrap();
        let totals = CurrencyTranslationService::totals(committed.detail()).unwrap();
        prop_assert_eq!(totals.debit_sc, CurrencyTranslationService::convert(amount, xrate).unwrap());
    }

    #[test]
    fn prop_reversal_mirrors_original(amount in positive_amount(), xrate in rate()) {
        let engine = engine();
        let mut original = engine.commit(&journal(&[amount], xrate)).unwrap();
        let reversal = engine.revert(&mut original).unwrap();

        prop_assert_eq!(original.reverted_by, reversal.id);
        prop_assert_eq!(original.detail().len(), reversal.detail().len());
        for (o, r) in original.detail().iter().zip(reversal.detail()) {
            prop_assert_eq!(r.debit_fc, o.credit_fc);
            prop_assert_eq!(r.credit_fc, o.debit_fc);
            prop_assert_eq!(r.debit_sc, o.credit_sc);
            prop_assert_eq!(r.credit_sc, o.debit_sc);
        }

        let stored = engine.store().load_journal(original.id.unwrap()).unwrap().unwrap();
        prop_assert_eq!(stored.reverted_by, reversal.id);
    }
}
