//! Data models for jobscroll.

mod listing;

pub use listing::{Batch, CardField, CardFields, ListingRecord};
