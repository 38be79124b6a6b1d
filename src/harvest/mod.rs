//! Incremental harvesting of an infinitely scrolling results list.
//!
//! Each pass reads the cards rendered past the [`Cursor`], appends them to
//! the [`AppendStore`], and the [`Harvester`] then scrolls one step and
//! repeats until the bottom stays quiet.

mod cursor;
mod engine;
mod error;
mod extract;
mod scroll;
mod store;

pub use cursor::Cursor;
pub use engine::{HarvestEvent, HarvestSummary, Harvester, LoopState, StopReason};
pub use error::{HarvestError, PersistError};
pub use extract::{build_batch, extract, Pass};
pub use scroll::{classify, step, ScrollOutcome, ScrollStep};
pub use store::AppendStore;
