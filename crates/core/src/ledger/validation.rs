//! Business rule validation for draft journals.
//!
//! Every rule is evaluated; issues are returned together in rule order so
//! the caller can show the complete list.

use partida_shared::types::PeriodId;
use rust_decimal::Decimal;

use super::issue::{ValidationIssue, ValidationIssues};
use super::journal::{Journal, JournalDt};
use crate::currency::rate::{RATE_DECIMALS, UNIT_RATE};
use crate::currency::translation::{AMOUNT_SCALE, CurrencyTranslationService};

/// Validates a journal.
///
/// # Errors
///
/// Returns every broken rule.
pub fn validate(journal: &Journal) -> Result<(), ValidationIssues> {
    let issues = collect_issues(journal);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues.into())
    }
}

/// Collects every broken rule, in rule order.
#[must_use]
pub fn collect_issues(journal: &Journal) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_header(journal, &mut issues);
    check_detail(journal.detail(), &mut issues);
    issues
}

fn check_header(journal: &Journal, issues: &mut Vec<ValidationIssue>) {
    if journal.period.is_none() {
        issues.push(ValidationIssue::MissingPeriod);
    }
    if journal.subdiary.is_none() {
        issues.push(ValidationIssue::MissingSubdiary);
    }
    if journal.date_tax.is_none() {
        issues.push(ValidationIssue::MissingTaxDate);
    }
    if journal.date_doc.is_none() {
        issues.push(ValidationIssue::MissingDocumentDate);
    }
    if journal.currency.is_none() {
        issues.push(ValidationIssue::MissingCurrency);
    }

    match journal.xrate {
        Some(rate) if rate > Decimal::ZERO => {
            if journal.currency.is_some_and(|c| c.is_local()) && rate != UNIT_RATE {
                issues.push(ValidationIssue::LocalRateNotUnity { rate });
            }
            if rate.normalize().scale() > RATE_DECIMALS {
                issues.push(ValidationIssue::RateScale { rate });
            }
        }
        _ => issues.push(ValidationIssue::MissingRate),
    }

    if let (Some(period), Some(date_tax)) = (journal.period, journal.date_tax)
        && PeriodId::from_date(date_tax) != period
    {
        issues.push(ValidationIssue::PeriodMismatch { period, date_tax });
    }

    if let (Some(date_doc), Some(date_due)) = (journal.date_doc, journal.date_due)
        && date_due < date_doc
    {
        issues.push(ValidationIssue::DueBeforeDocument { date_doc, date_due });
    }

    if journal.briefing.trim().is_empty() {
        issues.push(ValidationIssue::BlankBriefing);
    }
}

fn check_detail(detail: &[JournalDt], issues: &mut Vec<ValidationIssue>) {
    if detail.is_empty() {
        issues.push(ValidationIssue::EmptyDetail);
        return;
    }

    for (position, line) in (1u32..).zip(detail) {
        if line.line != position {
            issues.push(ValidationIssue::LineOutOfSequence {
                position,
                line: line.line,
            });
        }
        if line.account.is_none() {
            issues.push(ValidationIssue::MissingAccount { line: line.line });
        }
        // Equal debit and credit counts as no amount, 0 == 0 included.
        if line.debit_fc == line.credit_fc {
            issues.push(ValidationIssue::NoAmount { line: line.line });
        }
        if line.debit_fc < Decimal::ZERO || line.credit_fc < Decimal::ZERO {
            issues.push(ValidationIssue::NegativeAmount { line: line.line });
        }
        if line.debit_fc.normalize().scale() > AMOUNT_SCALE
            || line.credit_fc.normalize().scale() > AMOUNT_SCALE
        {
            issues.push(ValidationIssue::AmountScale { line: line.line });
        }
    }

    let debit = CurrencyTranslationService::checked_sum(detail.iter().map(|l| l.debit_fc));
    let credit = CurrencyTranslationService::checked_sum(detail.iter().map(|l| l.credit_fc));
    match (debit, credit) {
        (Some(debit), Some(credit)) if debit != credit => {
            issues.push(ValidationIssue::Unbalanced { debit, credit });
        }
        (Some(_), Some(_)) => {}
        _ => issues.push(ValidationIssue::AmountOverflow),
    }
}
