//! Stepwise scrolling and end-of-content detection.
//!
//! The end of the list is judged from metrics sampled *before* the scroll is
//! issued, and the scroll itself is a smooth animation that may still be
//! running when the next pass starts. With lazily loaded results this is a
//! heuristic: a step large enough to reach the bottom in one go can report
//! [`ScrollOutcome::Completed`] before the next page of results has been
//! requested. Keep `step_px` small relative to the page, or give
//! `settle_delay_ms` room, when results load slowly.

use tracing::debug;

use crate::driver::{DriverResult, PageDriver, ScrollMetrics};

/// Whether more content lies below the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// The step reaches (or overshoots) the bottom of the document.
    Completed,
    MoreAvailable,
}

/// A planned scroll step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollStep {
    pub target: f64,
    pub outcome: ScrollOutcome,
}

/// Plan a step of `step_px` from the current position.
pub fn classify(metrics: ScrollMetrics, step_px: u32) -> ScrollStep {
    let target = metrics.offset + f64::from(step_px);
    let outcome = if (target + metrics.viewport_height).ceil() >= metrics.max_height {
        ScrollOutcome::Completed
    } else {
        ScrollOutcome::MoreAvailable
    };
    ScrollStep { target, outcome }
}

/// Scroll one step down and report whether the bottom has been reached.
pub async fn step<D>(driver: &mut D, step_px: u32) -> DriverResult<ScrollStep>
where
    D: PageDriver + ?Sized,
{
    let metrics = driver.scroll_metrics().await?;
    let planned = classify(metrics, step_px);

    debug!(
        "Scrolling {} -> {} (viewport {}, height {}): {:?}",
        metrics.offset, planned.target, metrics.viewport_height, metrics.max_height, planned.outcome
    );

    driver.scroll_to(planned.target).await?;
    Ok(planned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(offset: f64, viewport_height: f64, max_height: f64) -> ScrollMetrics {
        ScrollMetrics {
            offset,
            max_height,
            viewport_height,
        }
    }

    #[test]
    fn near_bottom_is_completed() {
        let step = classify(metrics(900.0, 800.0, 1000.0), 100);
        assert_eq!(step.target, 1000.0);
        assert_eq!(step.outcome, ScrollOutcome::Completed);
    }

    #[test]
    fn tall_page_has_more() {
        let step = classify(metrics(900.0, 800.0, 5000.0), 100);
        assert_eq!(step.target, 1000.0);
        assert_eq!(step.outcome, ScrollOutcome::MoreAvailable);
    }

    #[test]
    fn exactly_reaching_bottom_is_completed() {
        let step = classify(metrics(0.0, 800.0, 900.0), 100);
        assert_eq!(step.outcome, ScrollOutcome::Completed);
    }

    #[test]
    fn one_pixel_short_has_more() {
        let step = classify(metrics(0.0, 800.0, 901.0), 100);
        assert_eq!(step.outcome, ScrollOutcome::MoreAvailable);
    }

    #[test]
    fn fractional_offset_rounds_up() {
        // 0.4 + 100 + 800 = 900.4, ceil 901 reaches a 901px page
        let step = classify(metrics(0.4, 800.0, 901.0), 100);
        assert_eq!(step.outcome, ScrollOutcome::Completed);
    }

    #[test]
    fn large_step_claims_completion_early() {
        // Only 2000px rendered so far; a 1500px step declares the end even
        // though the page would have kept growing.
        let small = classify(metrics(0.0, 800.0, 2000.0), 100);
        let large = classify(metrics(0.0, 800.0, 2000.0), 1500);
        assert_eq!(small.outcome, ScrollOutcome::MoreAvailable);
        assert_eq!(large.outcome, ScrollOutcome::Completed);
    }
}
