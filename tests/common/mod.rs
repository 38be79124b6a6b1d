//! In-memory results page that lazily loads more cards as it is scrolled.

#![allow(dead_code)]

use async_trait::async_trait;
use jobscroll::config::{ListingSelectors, ScrollConfig};
use jobscroll::driver::{DriverResult, PageDriver, ScrollMetrics};
use jobscroll::models::CardFields;

/// A results list of `total` cards, rendered `page_size` at a time.
///
/// Reaching the bottom of the rendered cards requests the next page, which
/// arrives after `load_latency` calls to `scroll_metrics` (and to
/// `count_matching` as well when `background_loading` is set).
pub struct SimulatedPage {
    pub total: usize,
    pub rendered: usize,
    pub page_size: usize,
    pub card_height: f64,
    pub viewport_height: f64,
    pub offset: f64,
    pub load_latency: u32,
    /// Keep loading while the page is only being read, not scrolled.
    pub background_loading: bool,
    pending: Option<u32>,
    /// Cards with no salary element.
    pub missing_salary: Vec<usize>,
    /// Cards whose only link is on the title anchor.
    pub title_link_only: Vec<usize>,
    /// Cards that render between the count and the next read.
    pub grow_during_read: usize,
    pub scrolls: Vec<f64>,
}

impl SimulatedPage {
    pub fn new(total: usize, page_size: usize) -> Self {
        Self {
            total,
            rendered: page_size.min(total),
            page_size,
            card_height: 100.0,
            viewport_height: 800.0,
            offset: 0.0,
            load_latency: 1,
            background_loading: false,
            pending: None,
            missing_salary: Vec::new(),
            title_link_only: Vec::new(),
            grow_during_read: 0,
            scrolls: Vec::new(),
        }
    }

    pub fn with_latency(mut self, ticks: u32) -> Self {
        self.load_latency = ticks;
        self
    }

    /// Render `n` more cards right away.
    pub fn render_more(&mut self, n: usize) {
        self.rendered = (self.rendered + n).min(self.total);
    }

    pub fn max_height(&self) -> f64 {
        (self.rendered as f64 * self.card_height).max(self.viewport_height)
    }

    fn load_page(&mut self) {
        self.render_more(self.page_size);
    }

    fn tick(&mut self) {
        if let Some(remaining) = self.pending {
            if remaining <= 1 {
                self.pending = None;
                self.load_page();
            } else {
                self.pending = Some(remaining - 1);
            }
        }
    }

    fn card(&self, index: usize) -> CardFields {
        let link = format!("https://jobs.example/offer/{}", index);
        let (card_link, title_link) = if self.title_link_only.contains(&index) {
            (None, Some(link))
        } else {
            (Some(link), None)
        };
        CardFields {
            title: Some(format!("Job {}", index)),
            card_link,
            title_link,
            company: Some(format!("Company {}", index % 7)),
            location: Some("Lyon".to_string()),
            salary: (!self.missing_salary.contains(&index)).then(|| "35 000 €".to_string()),
        }
    }
}

#[async_trait]
impl PageDriver for SimulatedPage {
    async fn count_matching(&mut self, _selector: &str) -> DriverResult<usize> {
        if self.background_loading {
            self.tick();
        }
        Ok(self.rendered)
    }

    async fn read_cards(
        &mut self,
        _selectors: &ListingSelectors,
        start: usize,
    ) -> DriverResult<Vec<CardFields>> {
        if self.grow_during_read > 0 {
            let n = std::mem::take(&mut self.grow_during_read);
            self.render_more(n);
        }
        Ok((start..self.rendered).map(|i| self.card(i)).collect())
    }

    async fn scroll_metrics(&mut self) -> DriverResult<ScrollMetrics> {
        self.tick();
        Ok(ScrollMetrics {
            offset: self.offset,
            max_height: self.max_height(),
            viewport_height: self.viewport_height,
        })
    }

    async fn scroll_to(&mut self, offset: f64) -> DriverResult<()> {
        self.scrolls.push(offset);
        let bottom = self.max_height() - self.viewport_height;
        self.offset = offset.clamp(0.0, bottom);

        let near_bottom = self.offset + self.viewport_height >= self.max_height() - self.card_height;
        if near_bottom && self.rendered < self.total && self.pending.is_none() {
            if self.load_latency == 0 {
                self.load_page();
            } else {
                self.pending = Some(self.load_latency);
            }
        }
        Ok(())
    }
}

/// Scroll settings with no real waiting.
pub fn scroll(step_px: u32) -> ScrollConfig {
    ScrollConfig {
        step_px,
        settle_delay_ms: 0,
        ..Default::default()
    }
}
