//! Count of listing cards already harvested.

/// Position in the results list up to which cards have been harvested.
///
/// This is the only deduplication there is. It relies on the results list
/// growing strictly at its end: cards already rendered are never removed,
/// reordered, or preceded by newly inserted ones. A page that breaks this
/// will see cards skipped or harvested twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    seen: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cards harvested so far.
    pub fn seen(&self) -> usize {
        self.seen
    }

    /// Move past `rendered` cards. Never moves backwards.
    #[must_use]
    pub fn advance(self, rendered: usize) -> Self {
        Self {
            seen: self.seen.max(rendered),
        }
    }

    /// Number of cards beyond the cursor when `rendered` are on the page.
    pub fn unseen(&self, rendered: usize) -> usize {
        rendered.saturating_sub(self.seen)
    }
}
