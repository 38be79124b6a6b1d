//! Opening a keyword search before harvesting.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{ListingSelectors, SearchConfig};
use crate::driver::{DriverResult, SessionDriver};

/// Fill in and submit the search form, then wait for the first results.
///
/// Permission grants are best-effort; everything else must succeed.
pub async fn open_search<D>(
    driver: &mut D,
    search: &SearchConfig,
    selectors: &ListingSelectors,
) -> DriverResult<()>
where
    D: SessionDriver + ?Sized,
{
    let click_delay = Duration::from_millis(search.click_delay_ms);

    if let Some(origin) = origin_of(&search.website) {
        if let Err(e) = driver.grant_permissions(&origin).await {
            warn!("Could not pre-grant permissions for {}: {}", origin, e);
        }
    }
    driver.navigate(&search.website).await?;

    if let Some(button) = search.cookie_banner.button() {
        debug!("Dismissing cookie banner via {}", button);
        driver.wait_for(button).await?;
        tokio::time::sleep(click_delay).await;
        driver.click(button).await?;
    }

    info!("Searching for {:?} in {:?}", search.query, search.location);
    driver
        .type_text(&search.query_selector, &search.query, search.typing_delay_ms)
        .await?;

    if !search.location.is_empty() {
        driver
            .type_text(
                &search.location_selector,
                &search.location,
                search.typing_delay_ms,
            )
            .await?;

        driver.wait_for(&search.dropdown_selector).await?;
        tokio::time::sleep(Duration::from_millis(search.dropdown_pause_ms)).await;
        driver.click_first_in(&search.dropdown_selector).await?;
    }

    driver.wait_for(&search.submit_selector).await?;
    tokio::time::sleep(click_delay).await;
    driver.click(&search.submit_selector).await?;

    driver.wait_for_navigation().await?;
    driver.wait_for(&selectors.card).await?;
    Ok(())
}

/// Scheme, host and port of `url`.
fn origin_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .map(|u| u.origin().ascii_serialization())
        .filter(|o| o != "null")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CookiePolicy;
    use crate::driver::DriverError;
    use async_trait::async_trait;

    #[derive(Default)]
    struct RecordingDriver {
        calls: Vec<String>,
        deny_permissions: bool,
    }

    #[async_trait]
    impl SessionDriver for RecordingDriver {
        async fn navigate(&mut self, url: &str) -> DriverResult<()> {
            self.calls.push(format!("navigate {}", url));
            Ok(())
        }

        async fn grant_permissions(&mut self, origin: &str) -> DriverResult<()> {
            self.calls.push(format!("grant {}", origin));
            if self.deny_permissions {
                return Err(DriverError::Browser("not allowed".to_string()));
            }
            Ok(())
        }

        async fn wait_for(&mut self, selector: &str) -> DriverResult<()> {
            self.calls.push(format!("wait {}", selector));
            Ok(())
        }

        async fn click(&mut self, selector: &str) -> DriverResult<()> {
            self.calls.push(format!("click {}", selector));
            Ok(())
        }

        async fn type_text(&mut self, selector: &str, text: &str, _delay_ms: u64) -> DriverResult<()> {
            self.calls.push(format!("type {} {}", selector, text));
            Ok(())
        }

        async fn click_first_in(&mut self, selector: &str) -> DriverResult<()> {
            self.calls.push(format!("first {}", selector));
            Ok(())
        }

        async fn wait_for_navigation(&mut self) -> DriverResult<()> {
            self.calls.push("navigation".to_string());
            Ok(())
        }
    }

    fn search() -> SearchConfig {
        SearchConfig {
            website: "https://jobs.example/fr".to_string(),
            query: "rust".to_string(),
            location: "Lille".to_string(),
            query_selector: "#q".to_string(),
            location_selector: "#where".to_string(),
            dropdown_selector: "ul.suggest".to_string(),
            submit_selector: "button.go".to_string(),
            typing_delay_ms: 0,
            click_delay_ms: 0,
            dropdown_pause_ms: 0,
            ..Default::default()
        }
    }

    fn selectors() -> ListingSelectors {
        ListingSelectors {
            card: "li.card".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_steps_run_in_order() {
        let mut driver = RecordingDriver::default();
        let mut search = search();
        search.cookie_banner.reject_selector = "#reject".to_string();

        open_search(&mut driver, &search, &selectors()).await.unwrap();

        assert_eq!(
            driver.calls,
            [
                "grant https://jobs.example",
                "navigate https://jobs.example/fr",
                "wait #reject",
                "click #reject",
                "type #q rust",
                "type #where Lille",
                "wait ul.suggest",
                "first ul.suggest",
                "wait button.go",
                "click button.go",
                "navigation",
                "wait li.card",
            ]
        );
    }

    #[tokio::test]
    async fn test_accept_policy_clicks_accept_button() {
        let mut driver = RecordingDriver::default();
        let mut search = search();
        search.cookie_banner.policy = CookiePolicy::Accept;
        search.cookie_banner.accept_selector = "#accept".to_string();

        open_search(&mut driver, &search, &selectors()).await.unwrap();

        assert!(driver.calls.contains(&"click #accept".to_string()));
    }

    #[tokio::test]
    async fn test_ignore_policy_and_empty_location_skip_steps() {
        let mut driver = RecordingDriver::default();
        let mut search = search();
        search.cookie_banner.policy = CookiePolicy::Ignore;
        search.location = String::new();

        open_search(&mut driver, &search, &selectors()).await.unwrap();

        assert_eq!(
            driver.calls,
            [
                "grant https://jobs.example",
                "navigate https://jobs.example/fr",
                "type #q rust",
                "wait button.go",
                "click button.go",
                "navigation",
                "wait li.card",
            ]
        );
    }

    #[tokio::test]
    async fn test_permission_failure_is_not_fatal() {
        let mut driver = RecordingDriver {
            deny_permissions: true,
            ..Default::default()
        };
        let mut search = search();
        search.cookie_banner.policy = CookiePolicy::Ignore;

        open_search(&mut driver, &search, &selectors()).await.unwrap();

        assert!(driver.calls.contains(&"navigate https://jobs.example/fr".to_string()));
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(
            origin_of("https://www.monster.fr/emploi?q=x").as_deref(),
            Some("https://www.monster.fr")
        );
        assert_eq!(
            origin_of("http://localhost:8080/").as_deref(),
            Some("http://localhost:8080")
        );
        assert_eq!(origin_of("not a url"), None);
    }
}
