//! Page driver abstraction over a live browser tab.
//!
//! The harvest loop only needs to count cards, read their fields, and
//! scroll ([`PageDriver`]). Opening the search is a separate, one-shot
//! concern ([`SessionDriver`]). Both are implemented by the chromiumoxide
//! backed [`ChromiumPage`] when the `browser` feature is enabled, and by
//! in-memory pages in tests.

#[cfg(feature = "browser")]
mod chromium;
mod scripts;

#[cfg(feature = "browser")]
pub use chromium::ChromiumPage;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ListingSelectors;
use crate::models::CardFields;

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Failures talking to the page.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Timed out after {seconds}s waiting for {operation}")]
    Timeout { operation: String, seconds: u64 },
    #[error("Element not found: {0}")]
    ElementNotFound(String),
    #[error("Script evaluation failed: {0}")]
    Script(String),
    #[error("Browser error: {0}")]
    Browser(String),
}

/// Scroll position and extent of the document, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    /// Current vertical scroll offset.
    pub offset: f64,
    /// Full scrollable height of the document.
    pub max_height: f64,
    /// Height of the visible viewport.
    pub viewport_height: f64,
}

/// Read and scroll access to a rendered results page.
///
/// Every call may suspend while the browser works; callers await each one
/// before issuing the next.
#[async_trait]
pub trait PageDriver: Send {
    /// Number of elements currently matching `selector`.
    async fn count_matching(&mut self, selector: &str) -> DriverResult<usize>;

    /// Field maps of every card at index `start` and beyond, in document
    /// order, with sub-elements resolved relative to each card.
    async fn read_cards(
        &mut self,
        selectors: &ListingSelectors,
        start: usize,
    ) -> DriverResult<Vec<CardFields>>;

    async fn scroll_metrics(&mut self) -> DriverResult<ScrollMetrics>;

    /// Start a smooth scroll to `offset`. Returns once the instruction is
    /// issued, not when the viewport has arrived.
    async fn scroll_to(&mut self, offset: f64) -> DriverResult<()>;
}

/// Navigation and form interaction used to open a search.
#[async_trait]
pub trait SessionDriver: Send {
    async fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// Allow geolocation and notifications for `origin` so that permission
    /// prompts don't cover the page.
    async fn grant_permissions(&mut self, origin: &str) -> DriverResult<()>;

    /// Wait until an element matching `selector` exists.
    async fn wait_for(&mut self, selector: &str) -> DriverResult<()>;

    async fn click(&mut self, selector: &str) -> DriverResult<()>;

    /// Type `text` into the field matching `selector`, pausing
    /// `delay_ms` between keystrokes.
    async fn type_text(&mut self, selector: &str, text: &str, delay_ms: u64) -> DriverResult<()>;

    /// Click the first list item inside the element matching `selector`.
    async fn click_first_in(&mut self, selector: &str) -> DriverResult<()>;

    async fn wait_for_navigation(&mut self) -> DriverResult<()>;
}
