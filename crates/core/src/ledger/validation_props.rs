//! Property-based tests for journal validation.
//!
//! - Balanced, well-formed journals never report issues
//! - An FC imbalance is always reported with the exact totals
//! - Every 0/0 line is reported by its own line number

use chrono::NaiveDate;
use partida_shared::types::{AccountCode, BookCode, Currency, SubdiaryCode};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::issue::ValidationIssue;
use super::journal::{Journal, JournalDt};
use super::validation::{collect_issues, validate};

/// Strategy to generate positive amounts (0.01 to 100,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn header(currency: Currency, xrate: Decimal) -> Journal {
    let date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
    let mut j = Journal::draft(BookCode::new("05").unwrap()).dated(date);
    j.subdiary = Some(SubdiaryCode::new("01").unwrap());
    j.briefing = "Generated".to_string();
    j.currency = Some(currency);
    j.xrate = Some(xrate);
    j
}

/// A journal whose debits are `amounts` and whose single credit closes them.
fn balanced(amounts: &[Decimal]) -> Journal {
    let mut j = header(Currency::Usd, Decimal::new(3_712, 3));
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
    fn prop_balanced_journal_is_valid(amounts in prop::collection::vec(positive_amount(), 1..10)) {
        prop_assert!(validate(&balanced(&amounts)).is_ok());
    }

    #[test]
    fn prop_imbalance_is_reported(
        amounts in prop::collection::vec(positive_amount(), 1..10),
        extra in positive_amount(),
    ) {
        let mut j = balanced(&amounts);
        let last = u32::try_from(j.detail().len()).unwrap();
        j.line_mut(last).unwrap().credit_fc += extra;

        let total: Decimal = amounts.iter().copied().sum();
        let issues = collect_issues(&j);
        prop_assert_eq!(
            issues,
            vec![ValidationIssue::Unbalanced { debit: total, credit: total + extra }]
        );
    }

    #[test]
    fn prop_zero_lines_are_reported_by_number(
        amounts in prop::collection::vec(positive_amount(), 1..6),
        zero_at in 0usize..6,
    ) {
        let mut j = balanced(&amounts);
        let zero = j
            .add_line(JournalDt::debit(AccountCode::new("1212").unwrap(), Decimal::ZERO))
            .unwrap();
        let target = u32::try_from(zero_at.min(j.detail().len() - 1) + 1).unwrap();
        j.move_line(zero, target).unwrap();

        let issues = collect_issues(&j);
        prop_assert_eq!(issues, vec![ValidationIssue::NoAmount { line: target }]);
    }

    #[test]
    fn prop_local_rate_other_than_unity_fails(rate in (1i64..100_000i64).prop_map(|v| Decimal::new(v, 3))) {
        let mut j = header(Currency::Pen, rate);
        j.add_line(JournalDt::debit(AccountCode::new("1041").unwrap(), Decimal::ONE)).unwrap();
        j.add_line(JournalDt::credit(AccountCode::new("7011").unwrap(), Decimal::ONE)).unwrap();

        let has_issue = collect_issues(&j)
            .iter()
            .any(|i| matches!(i, ValidationIssue::LocalRateNotUnity { .. }));
        prop_assert_eq!(has_issue, rate != Decimal::ONE);
    }
}
