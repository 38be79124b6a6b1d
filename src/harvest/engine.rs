//! The scrape/scroll state machine.

use tracing::{debug, info};

use super::cursor::Cursor;
use super::error::HarvestError;
use super::extract::extract;
use super::scroll::{self, ScrollOutcome};
use super::store::AppendStore;
use crate::config::{ListingSelectors, ScrollConfig};
use crate::driver::PageDriver;

/// States of the harvest loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Scraping,
    Scrolling,
    Done,
}

/// Why a harvest ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The bottom was reached and settling produced no new listings.
    EndOfContent,
    /// `max_cycles` scrape passes were run.
    CycleLimit,
}

/// Progress notifications for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HarvestEvent {
    /// A batch was written; `total` counts records persisted this run.
    Persisted { new: usize, total: usize },
    Scrolled { target: f64, outcome: ScrollOutcome },
    /// Waiting at the bottom before looking again.
    Settling { attempt: u32 },
}

/// Totals for a finished harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestSummary {
    pub passes: u64,
    pub scroll_steps: u64,
    pub settles: u64,
    /// Records persisted by this run.
    pub records: usize,
    pub stop_reason: StopReason,
}

type Observer<'d> = Box<dyn FnMut(HarvestEvent) + Send + 'd>;

/// Alternates extraction passes with scroll steps until the list is
/// exhausted.
///
/// Owns the cursor and the store for the duration of the run; nothing else
/// should write to the same output file meanwhile.
pub struct Harvester<'d, D: PageDriver + ?Sized> {
    driver: &'d mut D,
    store: AppendStore,
    selectors: ListingSelectors,
    scroll: ScrollConfig,
    cursor: Cursor,
    persisted: usize,
    observer: Option<Observer<'d>>,
}

impl<'d, D: PageDriver + ?Sized> Harvester<'d, D> {
    pub fn new(
        driver: &'d mut D,
        store: AppendStore,
        selectors: ListingSelectors,
        scroll: ScrollConfig,
    ) -> Self {
        Self {
            driver,
            store,
            selectors,
            scroll,
            cursor: Cursor::new(),
            persisted: 0,
            observer: None,
        }
    }

    /// Receive a [`HarvestEvent`] as the loop makes progress.
    pub fn with_observer(mut self, observer: impl FnMut(HarvestEvent) + Send + 'd) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn store(&self) -> &AppendStore {
        &self.store
    }

    fn emit(&mut self, event: HarvestEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer(event);
        }
    }

    /// Harvest whatever was rendered since the last pass.
    ///
    /// Returns the number of records persisted. On error neither the store
    /// nor the cursor has changed.
    pub async fn scrape_pass(&mut self) -> Result<usize, HarvestError> {
        let pass = extract(&mut *self.driver, self.cursor, &self.selectors).await?;
        let new = pass.records.len();

        if new > 0 {
            self.store.append(&pass.records)?;
            self.persisted += new;
            info!(
                "Harvested {} listings (cards {}..{}), {} this run",
                new,
                self.cursor.seen(),
                pass.rendered_count,
                self.persisted
            );
            self.emit(HarvestEvent::Persisted {
                new,
                total: self.persisted,
            });
        }

        self.cursor = self.cursor.advance(pass.rendered_count);
        Ok(new)
    }

    /// Run the loop to completion.
    ///
    /// Stops when a scroll step reports the bottom and the last
    /// `settle_retries` settle-and-rescrape cycles found nothing new, or
    /// after `max_cycles` passes. Errors end the run immediately; anything
    /// already persisted stays on disk.
    pub async fn run(mut self) -> Result<HarvestSummary, HarvestError> {
        let mut state = LoopState::Scraping;
        let mut passes = 0u64;
        let mut scroll_steps = 0u64;
        let mut settles = 0u64;
        let mut idle_settles = 0u32;
        let mut after_settle = false;
        let mut stop_reason = StopReason::EndOfContent;

        while state != LoopState::Done {
            state = match state {
                LoopState::Scraping => {
                    let new = self.scrape_pass().await?;
                    passes += 1;

                    if after_settle {
                        idle_settles = if new == 0 { idle_settles + 1 } else { 0 };
                        after_settle = false;
                    }
                    LoopState::Scrolling
                }
                LoopState::Scrolling => {
                    if self.scroll.cycle_limit().is_some_and(|limit| passes >= limit) {
                        stop_reason = StopReason::CycleLimit;
                        LoopState::Done
                    } else {
                        let step = scroll::step(&mut *self.driver, self.scroll.step_px).await?;
                        scroll_steps += 1;
                        self.emit(HarvestEvent::Scrolled {
                            target: step.target,
                            outcome: step.outcome,
                        });

                        match step.outcome {
                            ScrollOutcome::MoreAvailable => {
                                idle_settles = 0;
                                LoopState::Scraping
                            }
                            ScrollOutcome::Completed
                                if idle_settles >= self.scroll.settle_retries =>
                            {
                                stop_reason = StopReason::EndOfContent;
                                LoopState::Done
                            }
                            ScrollOutcome::Completed => {
                                let attempt = idle_settles + 1;
                                debug!(
                                    "Reached bottom, settling for {:?} (attempt {})",
                                    self.scroll.settle_delay(),
                                    attempt
                                );
                                self.emit(HarvestEvent::Settling { attempt });
                                tokio::time::sleep(self.scroll.settle_delay()).await;
                                settles += 1;
                                after_settle = true;
                                LoopState::Scraping
                            }
                        }
                    }
                }
                LoopState::Done => LoopState::Done,
            };
        }

        let summary = HarvestSummary {
            passes,
            scroll_steps,
            settles,
            records: self.persisted,
            stop_reason,
        };
        info!(
            "Harvest finished ({:?}): {} listings in {} passes, {} scroll steps",
            summary.stop_reason, summary.records, summary.passes, summary.scroll_steps
        );
        Ok(summary)
    }
}
