//! Configuration management for jobscroll.
//!
//! A config file is discovered with the prefer crate (or given explicitly)
//! and parsed with serde according to its extension. Every section has
//! defaults, so running without any file searches monster.fr for
//! "alternance developpeur" around Paris.

mod browser;
mod loader;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub use browser::BrowserConfig;
pub use loader::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub selectors: ListingSelectors,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// File this config was read from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Check the values the harvest loop relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scroll.step_px == 0 {
            return Err(ConfigError::Invalid(
                "scroll.step_px must be a positive number of pixels".to_string(),
            ));
        }
        self.selectors.validate()?;
        url::Url::parse(&self.search.website).map_err(|e| {
            ConfigError::Invalid(format!(
                "search.website '{}' is not a valid URL: {}",
                self.search.website, e
            ))
        })?;
        Ok(())
    }

    /// Directory containing the config file, if one was loaded.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }
}

/// How to treat the cookie consent banner shown on first visit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CookiePolicy {
    /// Click the "reject all" button
    #[default]
    Reject,
    /// Click the "accept all" button
    Accept,
    /// Leave the banner alone
    Ignore,
}

/// Cookie banner buttons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieBannerConfig {
    #[serde(default)]
    pub policy: CookiePolicy,
    #[serde(default = "default_accept_selector")]
    pub accept_selector: String,
    #[serde(default = "default_reject_selector")]
    pub reject_selector: String,
}

impl Default for CookieBannerConfig {
    fn default() -> Self {
        Self {
            policy: CookiePolicy::default(),
            accept_selector: default_accept_selector(),
            reject_selector: default_reject_selector(),
        }
    }
}

impl CookieBannerConfig {
    /// Selector of the button to click, or None when the banner is ignored.
    pub fn button(&self) -> Option<&str> {
        match self.policy {
            CookiePolicy::Reject => Some(&self.reject_selector),
            CookiePolicy::Accept => Some(&self.accept_selector),
            CookiePolicy::Ignore => None,
        }
    }
}

fn default_accept_selector() -> String {
    r#"button[id="onetrust-accept-btn-handler"]"#.to_string()
}

fn default_reject_selector() -> String {
    r#"button[id="onetrust-reject-all-handler"]"#.to_string()
}

/// The search form and how to fill it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_website")]
    pub website: String,
    #[serde(default = "default_query")]
    pub query: String,
    /// Location to search around. Empty skips the location field and its
    /// dropdown entirely.
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_query_selector")]
    pub query_selector: String,
    #[serde(default = "default_location_selector")]
    pub location_selector: String,
    /// Suggestion list shown under the location field; its first entry is
    /// clicked.
    #[serde(default = "default_dropdown_selector")]
    pub dropdown_selector: String,
    #[serde(default = "default_submit_selector")]
    pub submit_selector: String,
    /// Delay between keystrokes when typing into the form.
    #[serde(default = "default_typing_delay_ms")]
    pub typing_delay_ms: u64,
    /// Pause before clicking buttons.
    #[serde(default = "default_click_delay_ms")]
    pub click_delay_ms: u64,
    /// Pause after the dropdown appears and before picking its first entry.
    #[serde(default = "default_dropdown_pause_ms")]
    pub dropdown_pause_ms: u64,
    #[serde(default)]
    pub cookie_banner: CookieBannerConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            website: default_website(),
            query: default_query(),
            location: default_location(),
            query_selector: default_query_selector(),
            location_selector: default_location_selector(),
            dropdown_selector: default_dropdown_selector(),
            submit_selector: default_submit_selector(),
            typing_delay_ms: default_typing_delay_ms(),
            click_delay_ms: default_click_delay_ms(),
            dropdown_pause_ms: default_dropdown_pause_ms(),
            cookie_banner: CookieBannerConfig::default(),
        }
    }
}

fn default_website() -> String {
    "https://www.monster.fr".to_string()
}
fn default_query() -> String {
    "alternance developpeur".to_string()
}
fn default_location() -> String {
    "Paris, Île-de-France".to_string()
}
fn default_query_selector() -> String {
    r#"input[type="search"][name="q"]"#.to_string()
}
fn default_location_selector() -> String {
    r#"input[type="search"][name="where"]"#.to_string()
}
fn default_dropdown_selector() -> String {
    r#"ul[data-testid="datalist"]"#.to_string()
}
fn default_submit_selector() -> String {
    r#"button[aria-label="Rechercher"]"#.to_string()
}
fn default_typing_delay_ms() -> u64 {
    100
}
fn default_click_delay_ms() -> u64 {
    1000
}
fn default_dropdown_pause_ms() -> u64 {
    1000
}

/// Selectors locating listing cards and their sub-elements.
///
/// The field selectors are evaluated relative to each card. None of them
/// are interpreted here; they are handed to the page as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSelectors {
    #[serde(default = "default_card_selector")]
    pub card: String,
    #[serde(default = "default_title_selector")]
    pub title: String,
    #[serde(default = "default_company_selector")]
    pub company: String,
    #[serde(default = "default_location_field_selector")]
    pub location: String,
    #[serde(default = "default_salary_selector")]
    pub salary: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            card: default_card_selector(),
            title: default_title_selector(),
            company: default_company_selector(),
            location: default_location_field_selector(),
            salary: default_salary_selector(),
        }
    }
}

impl ListingSelectors {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("card", &self.card),
            ("title", &self.title),
            ("company", &self.company),
            ("location", &self.location),
            ("salary", &self.salary),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "selectors.{} must not be empty",
                    name
                )));
            }
        }
        Ok(())
    }
}

fn default_card_selector() -> String {
    r#"[data-testid="svx_jobCard"]"#.to_string()
}
fn default_title_selector() -> String {
    r#"[data-testid="svx_jobCard-title"]"#.to_string()
}
fn default_company_selector() -> String {
    r#"[data-testid="svx_jobCard-company"]"#.to_string()
}
fn default_location_field_selector() -> String {
    r#"[data-testid="svx_jobCard-location"]"#.to_string()
}
fn default_salary_selector() -> String {
    r#"[data-testid="svx_jobCard-details"]"#.to_string()
}

/// Scroll and termination tuning for the harvest loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Pixels to advance per scroll step.
    ///
    /// End of content is judged from metrics sampled before each scroll, so
    /// a large step can declare the list finished while more results are
    /// still loading below. Smaller steps give lazy loading more chances to
    /// keep up at the cost of more passes.
    #[serde(default = "default_step_px")]
    pub step_px: u32,

    /// Wait after reaching the apparent end before looking again.
    /// Too short a delay has the same risk as too large a step.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Consecutive settle-and-rescrape cycles without new listings after
    /// which the end of the list is accepted.
    #[serde(default = "default_settle_retries")]
    pub settle_retries: u32,

    /// Stop after this many scrape/scroll cycles (0 = unlimited).
    #[serde(default)]
    pub max_cycles: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            step_px: default_step_px(),
            settle_delay_ms: default_settle_delay_ms(),
            settle_retries: default_settle_retries(),
            max_cycles: 0,
        }
    }
}

impl ScrollConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn cycle_limit(&self) -> Option<u64> {
        (self.max_cycles > 0).then_some(self.max_cycles)
    }
}

fn default_step_px() -> u32 {
    100
}
fn default_settle_delay_ms() -> u64 {
    1000
}
fn default_settle_retries() -> u32 {
    1
}

/// Where harvested listings are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for harvest files. `~` is expanded; relative paths are
    /// resolved against the config file's directory when there is one.
    #[serde(default = "default_output_directory")]
    pub directory: String,
    /// Fixed file name. When unset each run gets a timestamped file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            file: None,
        }
    }
}

impl OutputConfig {
    /// Output file path for a run started at `started`.
    pub fn file_path(&self, base_dir: Option<&Path>, started: DateTime<Local>) -> PathBuf {
        let expanded = shellexpand::tilde(&self.directory);
        let dir = Path::new(expanded.as_ref());
        let dir = match base_dir {
            Some(base) if dir.is_relative() => base.join(dir),
            _ => dir.to_path_buf(),
        };

        let name = self
            .file
            .clone()
            .unwrap_or_else(|| format!("{}.json", started.format("%Y-%m-%d-%H-%M-%S")));
        dir.join(name)
    }
}

fn default_output_directory() -> String {
    "data".to_string()
}
