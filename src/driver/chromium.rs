//! Chrome DevTools driver built on chromiumoxide.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::{GrantPermissionsParams, PermissionType};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::element::Element;
use chromiumoxide::handler::{Handler, HandlerConfig};
use chromiumoxide::js::EvaluationResult;
use chromiumoxide::{Browser, BrowserConfig as LaunchConfig, Page};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::scripts;
use super::{DriverError, DriverResult, PageDriver, ScrollMetrics, SessionDriver};
use crate::config::{BrowserConfig, ListingSelectors};
use crate::models::CardFields;

/// Interval between checks while waiting for a selector.
const SELECTOR_POLL: Duration = Duration::from_millis(250);

/// A single browser tab driven over CDP.
pub struct ChromiumPage {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    timeout: Duration,
}

impl ChromiumPage {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Launch a local browser, or attach to `remote_url`, and open a blank tab.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let (browser, handler) = match config.remote_url.as_deref() {
            Some(remote_url) => Self::connect_remote(remote_url, config.timeout).await?,
            None => Self::launch_local(config).await?,
        };

        let handler = spawn_handler(handler);
        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to open browser tab")?;

        Ok(Self {
            browser,
            page,
            handler,
            timeout: Duration::from_secs(config.timeout),
        })
    }

    /// Find Chrome executable.
    fn find_chrome(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(anyhow::anyhow!(
                "Configured Chrome executable not found: {}",
                path.display()
            ));
        }

        for path in Self::CHROME_PATHS {
            let p = Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(path) = which::which(cmd) {
                info!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(anyhow::anyhow!(
            "Chrome/Chromium not found. Please install it:\n\
             - Arch/Manjaro: sudo pacman -S chromium\n\
             - Ubuntu/Debian: sudo apt install chromium-browser\n\
             - Fedora: sudo dnf install chromium\n\
             - Or set CHROME_PATH / browser.executable"
        ))
    }

    async fn launch_local(config: &BrowserConfig) -> Result<(Browser, Handler)> {
        info!("Launching browser (headless={})", config.headless);

        let chrome_path = Self::find_chrome(config.executable.as_deref())?;
        let mut builder = LaunchConfig::builder()
            .chrome_executable(chrome_path)
            .request_timeout(Duration::from_secs(config.timeout));

        // with_head means NOT headless
        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref proxy) = config.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }

        builder = builder
            .arg("--disable-notifications")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox") // Often needed for headless in containers
            .arg("--disable-setuid-sandbox");

        for arg in &config.chrome_args {
            builder = builder.arg(arg);
        }

        let launch_config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        Browser::launch(launch_config)
            .await
            .context("Failed to launch browser")
    }

    /// Connect to a remote Chrome instance.
    async fn connect_remote(url: &str, timeout: u64) -> Result<(Browser, Handler)> {
        info!(
            "Connecting to remote browser at {} (timeout: {}s)",
            url, timeout
        );

        // Get WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .timeout(Duration::from_secs(timeout))
            .send()
            .await
            .context("Failed to connect to remote browser")?
            .json()
            .await
            .context("Failed to parse browser version info")?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("No webSocketDebuggerUrl in response"))?;

        info!("Connecting to WebSocket: {}", ws_url);

        let handler_config = HandlerConfig {
            request_timeout: Duration::from_secs(timeout),
            ..Default::default()
        };

        Browser::connect_with_config(ws_url, handler_config)
            .await
            .context("Failed to connect to remote browser")
    }

    /// Close the tab and the browser.
    pub async fn close(mut self) {
        if let Err(e) = self.page.close().await {
            debug!("Failed to close tab: {}", e);
        }
        if let Err(e) = self.browser.close().await {
            debug!("Failed to close browser: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler.abort();
    }

    /// Run a CDP call under the configured timeout.
    async fn bounded<T, F>(&self, operation: &str, fut: F) -> DriverResult<T>
    where
        F: Future<Output = Result<T, CdpError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => {
                result.map_err(|e| DriverError::Browser(format!("{}: {}", operation, e)))
            }
            Err(_) => Err(DriverError::Timeout {
                operation: operation.to_string(),
                seconds: self.timeout.as_secs(),
            }),
        }
    }

    async fn eval_raw(
        &self,
        operation: &str,
        script: String,
    ) -> DriverResult<EvaluationResult> {
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(DriverError::Script)?;

        self.bounded(operation, self.page.evaluate_expression(params))
            .await
    }

    async fn eval<T: DeserializeOwned>(&self, operation: &str, script: String) -> DriverResult<T> {
        self.eval_raw(operation, script)
            .await?
            .into_value()
            .map_err(|e| DriverError::Script(format!("{}: {}", operation, e)))
    }

    /// Look up an element, bounded by the configured timeout.
    async fn find(&self, selector: &str) -> DriverResult<Element> {
        match tokio::time::timeout(self.timeout, self.page.find_element(selector)).await {
            Ok(result) => result.map_err(|e| lookup_error(selector, e)),
            Err(_) => Err(DriverError::Timeout {
                operation: format!("element {}", selector),
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

/// A failed element lookup. Protocol-level rejections mean the node is not
/// there; transport failures are reported as such.
fn lookup_error(selector: &str, err: CdpError) -> DriverError {
    match err {
        CdpError::NotFound | CdpError::Chrome(_) => {
            DriverError::ElementNotFound(selector.to_string())
        }
        other => DriverError::Browser(format!("finding {}: {}", selector, other)),
    }
}

/// Interpret one presence check while waiting for `selector`.
///
/// Script exceptions (such as an invalid selector) and non-boolean results
/// fail at once. Other errors are treated as "not yet", since the execution
/// context is replaced while a navigation is in flight.
fn selector_present(
    selector: &str,
    result: Result<EvaluationResult, CdpError>,
) -> DriverResult<bool> {
    match result {
        Ok(value) => value
            .into_value::<bool>()
            .map_err(|e| DriverError::Script(format!("selector {}: {}", selector, e))),
        Err(CdpError::JavascriptException(details)) => Err(DriverError::Script(format!(
            "selector {}: {}",
            selector, details.text
        ))),
        Err(e) => {
            debug!("Presence check for {} failed, retrying: {}", selector, e);
            Ok(false)
        }
    }
}

fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    })
}

#[async_trait]
impl PageDriver for ChromiumPage {
    async fn count_matching(&mut self, selector: &str) -> DriverResult<usize> {
        self.eval("card count", scripts::count_script(selector))
            .await
    }

    async fn read_cards(
        &mut self,
        selectors: &ListingSelectors,
        start: usize,
    ) -> DriverResult<Vec<CardFields>> {
        self.eval("card fields", scripts::read_cards_script(selectors, start))
            .await
    }

    async fn scroll_metrics(&mut self) -> DriverResult<ScrollMetrics> {
        self.eval(
            "scroll metrics",
            scripts::SCROLL_METRICS_SCRIPT.to_string(),
        )
        .await
    }

    async fn scroll_to(&mut self, offset: f64) -> DriverResult<()> {
        self.eval_raw("scroll", scripts::scroll_to_script(offset))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl SessionDriver for ChromiumPage {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        info!("Navigating to {}", url);
        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| DriverError::Browser(format!("Invalid URL {}: {}", url, e)))?;

        self.bounded("navigation", self.page.execute(nav_params))
            .await
            .map(|_| ())
    }

    async fn grant_permissions(&mut self, origin: &str) -> DriverResult<()> {
        let params = GrantPermissionsParams::builder()
            .origin(origin)
            .permissions(vec![
                PermissionType::Geolocation,
                PermissionType::Notifications,
            ])
            .build()
            .map_err(DriverError::Browser)?;

        self.bounded("permission grant", self.page.execute(params))
            .await
            .map(|_| ())
    }

    async fn wait_for(&mut self, selector: &str) -> DriverResult<()> {
        debug!("Waiting for selector: {}", selector);
        let params = EvaluateParams::builder()
            .expression(scripts::exists_script(selector))
            .return_by_value(true)
            .build()
            .map_err(DriverError::Script)?;
        let poll = async {
            loop {
                let result = self.page.evaluate_expression(params.clone()).await;
                if selector_present(selector, result)? {
                    return Ok::<(), DriverError>(());
                }
                tokio::time::sleep(SELECTOR_POLL).await;
            }
        };

        match tokio::time::timeout(self.timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(DriverError::Timeout {
                operation: format!("selector {}", selector),
                seconds: self.timeout.as_secs(),
            }),
        }
    }

    async fn click(&mut self, selector: &str) -> DriverResult<()> {
        let element = self.find(selector).await?;
        self.bounded("click", element.click()).await.map(|_| ())
    }

    async fn type_text(&mut self, selector: &str, text: &str, delay_ms: u64) -> DriverResult<()> {
        let element = self.find(selector).await?;
        self.bounded("focus", element.click()).await?;

        let delay = Duration::from_millis(delay_ms);
        for ch in text.chars() {
            self.bounded("typing", element.type_str(ch.to_string()))
                .await?;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(())
    }

    async fn click_first_in(&mut self, selector: &str) -> DriverResult<()> {
        let clicked: bool = self
            .eval("dropdown click", scripts::click_first_item_script(selector))
            .await?;
        if clicked {
            Ok(())
        } else {
            warn!("No list item to click in {}", selector);
            Err(DriverError::ElementNotFound(format!(
                "{} li:first-of-type",
                selector
            )))
        }
    }

    async fn wait_for_navigation(&mut self) -> DriverResult<()> {
        self.bounded("navigation", self.page.wait_for_navigation())
            .await
            .map(|_| ())
    }
}
