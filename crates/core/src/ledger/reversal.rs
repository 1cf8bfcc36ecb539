//! Reversing drafts for committed journals.

use chrono::NaiveDate;
use partida_shared::types::PeriodId;

use super::error::LedgerError;
use super::journal::{Journal, JournalDt};
use crate::sequence::CorrelativeCategory;

/// Stateless builder of reversing entries.
pub struct ReversalService;

impl ReversalService {
    /// Builds the draft that reverses `original`.
    ///
    /// Every line keeps its account and references with debit and credit
    /// swapped in both currencies. The rate stays pinned to the original's.
    /// With `date_tax` the reversal is dated into that day's period and the
    /// due date is dropped.
    ///
    /// # Errors
    ///
    /// `NotCommitted` for a draft, `AlreadyReverted` if `original` already
    /// carries a reversal.
    pub fn reversing_draft(
        original: &Journal,
        date_tax: Option<NaiveDate>,
    ) -> Result<Journal, LedgerError> {
        let id = original.id.ok_or(LedgerError::NotCommitted)?;
        if let Some(reversal) = original.reverted_by {
            return Err(LedgerError::AlreadyReverted {
                journal: id,
                reversal,
            });
        }

        let code = original
            .correlative_code()
            .unwrap_or_else(|| id.to_string());
        let detail: Vec<JournalDt> = original.detail().iter().map(JournalDt::negated).collect();

        let mut draft = Journal::draft(original.book.clone()).with_detail(detail);
        draft.category = CorrelativeCategory::Movement;
        draft.subdiary = original.subdiary.clone();
        draft.currency = original.currency;
        draft.xrate = original.xrate;
        draft.briefing = format!("Reversal of {code}: {}", original.briefing);
        draft.reverses = Some(id);
        draft.source = original.source.clone();

        match date_tax {
            Some(date) => {
                draft.date_tax = Some(date);
                draft.date_doc = Some(date);
                draft.period = Some(PeriodId::from_date(date));
            }
            None => {
                draft.date_tax = original.date_tax;
                draft.date_doc = original.date_doc;
                draft.date_due = original.date_due;
                draft.period = original.period;
            }
        }

        Ok(draft)
    }
}
