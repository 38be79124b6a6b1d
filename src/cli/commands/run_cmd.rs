//! The `run` command: open a search and harvest it.

use std::path::PathBuf;

use clap::Args;
use jobscroll::config::{Config, CookiePolicy};

/// Flags that override the loaded configuration for a single run.
#[derive(Args, Debug, Default)]
pub struct RunOptions {
    /// Search keywords
    #[arg(short, long)]
    query: Option<String>,
    /// Location to search around (empty string skips the location field)
    #[arg(short, long)]
    location: Option<String>,
    /// Search page URL
    #[arg(long)]
    website: Option<String>,
    /// Output file (defaults to a timestamped file in the output directory)
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Pixels to scroll per step
    #[arg(long)]
    step: Option<u32>,
    /// Milliseconds to wait at the bottom before looking again
    #[arg(long)]
    settle_ms: Option<u64>,
    /// Empty settle cycles to accept as the end of the list
    #[arg(long)]
    settle_retries: Option<u32>,
    /// Stop after this many scrape passes (0 = unlimited)
    #[arg(long)]
    max_cycles: Option<u64>,
    /// What to do with the cookie banner
    #[arg(long, value_enum)]
    cookies: Option<CookiePolicy>,
    /// Show the browser window
    #[arg(long)]
    headed: bool,
    /// Attach to a running browser instead of launching one
    #[arg(long, env = "BROWSER_URL")]
    browser_url: Option<String>,
}

impl RunOptions {
    /// Fold the flags into `config`.
    fn apply(self, config: &mut Config) {
        if let Some(query) = self.query {
            config.search.query = query;
        }
        if let Some(location) = self.location {
            config.search.location = location;
        }
        if let Some(website) = self.website {
            config.search.website = website;
        }
        if let Some(policy) = self.cookies {
            config.search.cookie_banner.policy = policy;
        }
        if let Some(step) = self.step {
            config.scroll.step_px = step;
        }
        if let Some(ms) = self.settle_ms {
            config.scroll.settle_delay_ms = ms;
        }
        if let Some(retries) = self.settle_retries {
            config.scroll.settle_retries = retries;
        }
        if let Some(cycles) = self.max_cycles {
            config.scroll.max_cycles = cycles;
        }
        if self.headed {
            config.browser.headless = false;
        }
        if let Some(url) = self.browser_url.filter(|u| !u.is_empty()) {
            config.browser.remote_url = Some(url);
        }
    }
}

/// Resolve the output path and settings, then harvest.
pub async fn cmd_run(mut config: Config, mut options: RunOptions) -> anyhow::Result<()> {
    let out = options.out.take();
    options.apply(&mut config);
    config.validate()?;

    let out = out.unwrap_or_else(|| {
        config
            .output
            .file_path(config.base_dir().as_deref(), chrono::Local::now())
    });

    harvest(config, out).await
}

#[cfg(feature = "browser")]
async fn harvest(config: Config, out: PathBuf) -> anyhow::Result<()> {
    use std::time::Duration;

    use anyhow::Context;
    use console::style;
    use indicatif::{ProgressBar, ProgressStyle};
    use jobscroll::driver::ChromiumPage;
    use jobscroll::harvest::{AppendStore, HarvestEvent, Harvester, ScrollOutcome, StopReason};
    use jobscroll::session::open_search;

    use crate::cli::icons;

    println!(
        "{} Searching {} for {:?}",
        icons::info(),
        style(&config.search.website).cyan(),
        config.search.query
    );
    println!("  {} Writing to {}", icons::dim_arrow(), out.display());

    let mut page = ChromiumPage::launch(&config.browser).await?;

    let outcome = async {
        open_search(&mut page, &config.search, &config.selectors)
            .await
            .context("Failed to open the search results")?;

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message("Harvesting listings...");

        let observer_spinner = spinner.clone();
        let mut total = 0usize;
        let harvester = Harvester::new(
            &mut page,
            AppendStore::new(&out),
            config.selectors.clone(),
            config.scroll.clone(),
        )
        .with_observer(move |event| match event {
            HarvestEvent::Persisted { total: t, .. } => {
                total = t;
                observer_spinner.set_message(format!("{} listings saved", total));
            }
            HarvestEvent::Scrolled {
                outcome: ScrollOutcome::MoreAvailable,
                ..
            } => observer_spinner.set_message(format!("{} listings saved, scrolling", total)),
            HarvestEvent::Scrolled { .. } => {
                observer_spinner.set_message(format!("{} listings saved, at the bottom", total))
            }
            HarvestEvent::Settling { attempt } => observer_spinner.set_message(format!(
                "{} listings saved, waiting for more (attempt {})",
                total, attempt
            )),
        });

        let result = tokio::select! {
            result = harvester.run() => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };
        spinner.finish_and_clear();
        Ok::<_, anyhow::Error>(result)
    }
    .await;

    page.close().await;

    match outcome? {
        Some(summary) => {
            let summary = summary?;
            let reason = match summary.stop_reason {
                StopReason::EndOfContent => "end of results",
                StopReason::CycleLimit => "cycle limit reached",
            };
            println!(
                "{} Saved {} listings ({})",
                icons::success(),
                style(summary.records).cyan(),
                reason
            );
            println!(
                "  {} {} passes, {} scroll steps, {} settle waits",
                icons::bullet(),
                summary.passes,
                summary.scroll_steps,
                summary.settles
            );
            if summary.records > 0 {
                println!("  {} {}", icons::dim_arrow(), out.display());
            }
        }
        None => {
            println!(
                "{} Interrupted; listings saved so far are in {}",
                icons::warn(),
                out.display()
            );
        }
    }

    Ok(())
}

#[cfg(not(feature = "browser"))]
async fn harvest(_config: Config, _out: PathBuf) -> anyhow::Result<()> {
    anyhow::bail!("Browser support not compiled. Rebuild with: cargo build --features browser")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        let options = RunOptions {
            query: Some("rust".to_string()),
            location: Some(String::new()),
            step: Some(250),
            settle_retries: Some(3),
            cookies: Some(CookiePolicy::Accept),
            headed: true,
            browser_url: Some("ws://localhost:9222".to_string()),
            ..Default::default()
        };
        options.apply(&mut config);

        assert_eq!(config.search.query, "rust");
        assert!(config.search.location.is_empty());
        assert_eq!(config.scroll.step_px, 250);
        assert_eq!(config.scroll.settle_retries, 3);
        assert_eq!(config.search.cookie_banner.policy, CookiePolicy::Accept);
        assert!(!config.browser.headless);
        assert_eq!(
            config.browser.remote_url.as_deref(),
            Some("ws://localhost:9222")
        );
    }

    #[test]
    fn absent_flags_keep_config() {
        let mut config = Config::default();
        config.scroll.max_cycles = 7;
        RunOptions::default().apply(&mut config);
        assert_eq!(config, {
            let mut expected = Config::default();
            expected.scroll.max_cycles = 7;
            expected
        });
    }

    #[tokio::test]
    async fn invalid_step_is_rejected_before_launch() {
        let options = RunOptions {
            step: Some(0),
            ..Default::default()
        };
        assert!(cmd_run(Config::default(), options).await.is_err());
    }
}
