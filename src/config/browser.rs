//! Browser session configuration.
//!
//! These types live outside `#[cfg(feature = "browser")]` so that config
//! parsing and serialization work without the browser feature.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings for launching or attaching to a Chrome/Chromium instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run in headless mode (default: true).
    /// Set to false to watch the search being driven.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Proxy server URL (e.g., "socks5://127.0.0.1:1080").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Upper bound, in seconds, on any single wait for the page
    /// (navigation, selector, script evaluation).
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Explicit Chrome executable. Can also be set via CHROME_PATH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,

    /// Additional Chrome arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chrome_args: Vec<String>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to an existing browser instead of launching one.
    /// Can also be set via BROWSER_URL environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            proxy: None,
            timeout: default_timeout(),
            executable: None,
            chrome_args: Vec::new(),
            remote_url: None,
        }
    }
}

impl BrowserConfig {
    /// Apply environment variable overrides.
    ///
    /// - `BROWSER_URL` - Remote Chrome DevTools URL
    /// - `CHROME_PATH` - Chrome executable to launch
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = lookup("BROWSER_URL").filter(|v| !v.is_empty()) {
            self.remote_url = Some(val);
        }
        if let Some(val) = lookup("CHROME_PATH").filter(|v| !v.is_empty()) {
            self.executable = Some(PathBuf::from(val));
        }
        self
    }
}

pub fn default_headless() -> bool {
    true
}

pub fn default_timeout() -> u64 {
    30
}
