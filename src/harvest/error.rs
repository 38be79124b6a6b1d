//! Harvest error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::driver::DriverError;
use crate::models::CardField;

/// Failures of the append store.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} does not contain a listing array: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode listings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Anything that stops a harvest.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// A rendered card lacks a sub-element the selectors promise. Points at
    /// a selector mismatch rather than a transient page state.
    #[error("Card {index} has no {field} element")]
    Extraction { index: usize, field: CardField },
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Driver(#[from] DriverError),
}
