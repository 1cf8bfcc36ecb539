//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use partida_core::currency::XRate;
use partida_core::fiscal::open_year;
use partida_core::ledger::Account;
use partida_core::{Journal, JournalDt, MemoryStore};
use partida_shared::types::{AccountCode, BookCode, SubdiaryCode};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn code(c: &str) -> AccountCode {
    AccountCode::new(c).unwrap()
}

/// A store with 2024 opened, a small chart of accounts and one USD quote.
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    open_year(&store, 2024).unwrap();
    for (c, name) in [
        ("A", "Cash"),
        ("B", "Sales"),
        ("C", "Suspense"),
        ("1212", "Receivables"),
        ("7011", "Sales of goods"),
    ] {
        store.insert_account(Account::new(code(c), name));
    }
    store.insert_rate(XRate::new(date(2024, 3, 10), dec!(3.695), dec!(3.700)).unwrap());
    store
}

/// A local-currency draft in book 05 dated 2024-03-10.
pub fn draft(lines: &[(&str, Decimal, Decimal)]) -> Journal {
    let mut j = Journal::draft(BookCode::new("05").unwrap()).dated(date(2024, 3, 10));
    j.subdiary = Some(SubdiaryCode::new("01").unwrap());
    j.briefing = "Integration test".to_string();
    for (account, debit, credit) in lines {
        let mut line = JournalDt::debit(code(account), *debit);
        line.credit_fc = *credit;
        j.add_line(line).unwrap();
    }
    j
}
