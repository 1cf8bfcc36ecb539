//! Correlative numbering per book and tax period.

mod correlative;
mod sequencer;

pub use correlative::{Correlative, CorrelativeCategory, CorrelativeKey};
pub use sequencer::{CorrelativeSequencer, reserve};
