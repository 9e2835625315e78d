//! Navigation and scroll-until-stable loading of lazy playlist pages

use crate::{PageDriver, ScrapeError, ScrollPolicy};
use std::time::Instant;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// Markup captured after scrolling, plus how the scroll phase ended.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub html: String,
    pub scroll: ScrollOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollOutcome {
    /// Scrolls performed
    pub iterations: usize,
    /// Two consecutive height measurements matched
    pub stabilized: bool,
    /// Scroll phase hit `ScrollPolicy::timeout`
    pub timed_out: bool,
    pub final_height: u64,
}

pub struct PageLoader {
    policy: ScrollPolicy,
}

impl PageLoader {
    pub fn new(policy: ScrollPolicy) -> Self {
        Self { policy }
    }

    /// Navigate to `url`, scroll until the page height stops growing and
    /// return the rendered markup.
    pub async fn load<D: PageDriver>(
        &self,
        driver: &mut D,
        url: &str,
    ) -> Result<LoadedPage, ScrapeError> {
        let start_time = Instant::now();

        println!("Opening URL: {url}");
        driver.navigate(url).await?;

        if !self.policy.initial_wait.is_zero() {
            debug!("Waiting {:?} for initial render", self.policy.initial_wait);
            sleep(self.policy.initial_wait).await;
        }

        println!("Scrolling to load all tracks...");
        let scroll = self.scroll_until_stable(driver).await?;

        info!(
            "Scroll phase finished: iterations={}, stabilized={}, timed_out={}, height={}",
            scroll.iterations, scroll.stabilized, scroll.timed_out, scroll.final_height
        );

        let html = driver.content().await?;
        info!(
            "Page loaded in {} ({} bytes of markup)",
            crate::format_duration(start_time.elapsed()),
            html.len()
        );
        println!("Loading finished. Parsing page...");

        Ok(LoadedPage { html, scroll })
    }

    async fn scroll_until_stable<D: PageDriver>(
        &self,
        driver: &mut D,
    ) -> Result<ScrollOutcome, ScrapeError> {
        let mut outcome = ScrollOutcome::default();

        let Some(limit) = self.policy.timeout else {
            self.scroll_loop(driver, &mut outcome).await?;
            return Ok(outcome);
        };

        let bounded = timeout(limit, self.scroll_loop(driver, &mut outcome)).await;
        match bounded {
            Ok(result) => result?,
            Err(_) => {
                warn!("Scroll phase timed out after {:?}", limit);
                outcome.timed_out = true;
            }
        }

        Ok(outcome)
    }

    async fn scroll_loop<D: PageDriver>(
        &self,
        driver: &mut D,
        outcome: &mut ScrollOutcome,
    ) -> Result<(), ScrapeError> {
        let mut last_height = driver.page_height().await?;
        outcome.final_height = last_height;

        for i in 0..self.policy.max_iterations {
            driver.scroll_to_bottom().await?;
            outcome.iterations = i + 1;
            sleep(self.policy.settle_interval).await;

            let new_height = driver.page_height().await?;
            outcome.final_height = new_height;

            if new_height == last_height {
                outcome.stabilized = true;
                println!("Reached the end of the page.");
                break;
            }

            last_height = new_height;
            println!("Scroll {}...", i + 1);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MockPageDriver;
    use mockall::Sequence;
    use std::time::Duration;

    fn heights_driver(heights: Vec<u64>) -> MockPageDriver {
        let mut driver = MockPageDriver::new();
        let mut heights = heights.into_iter();
        driver.expect_navigate().times(1).returning(|_| Ok(()));
        driver
            .expect_page_height()
            .returning(move || Ok(heights.next().expect("height oracle exhausted")));
        driver
            .expect_content()
            .times(1)
            .returning(|| Ok("<html></html>".to_string()));
        driver
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_stable_height() {
        let mut driver = MockPageDriver::new();
        let mut seq = Sequence::new();
        driver.expect_navigate().times(1).returning(|_| Ok(()));

        let mut heights = vec![100u64, 200, 200].into_iter();
        driver
            .expect_page_height()
            .times(3)
            .returning(move || Ok(heights.next().unwrap()));
        driver
            .expect_scroll_to_bottom()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        driver
            .expect_content()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok("<html></html>".to_string()));

        let loader = PageLoader::new(ScrollPolicy::default());
        let page = loader.load(&mut driver, "https://open.spotify.com/playlist/x").await.unwrap();

        assert_eq!(page.scroll.iterations, 2);
        assert!(page.scroll.stabilized);
        assert!(!page.scroll.timed_out);
        assert_eq!(page.scroll.final_height, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_iteration_cap() {
        let mut driver = heights_driver((1..=20).map(|h| h * 100).collect());
        driver.expect_scroll_to_bottom().times(10).returning(|| Ok(()));

        let loader = PageLoader::new(ScrollPolicy::default());
        let page = loader.load(&mut driver, "https://example.com").await.unwrap();

        assert_eq!(page.scroll.iterations, 10);
        assert!(!page.scroll.stabilized);
        assert_eq!(page.scroll.final_height, 1100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_follow_policy() {
        let mut driver = heights_driver(vec![100, 200, 200]);
        driver.expect_scroll_to_bottom().times(2).returning(|| Ok(()));

        let policy = ScrollPolicy::default();
        let expected = policy.initial_wait + policy.settle_interval * 2;

        let started = tokio::time::Instant::now();
        PageLoader::new(policy)
            .load(&mut driver, "https://example.com")
            .await
            .unwrap();

        assert_eq!(started.elapsed(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_ends_scrolling_without_error() {
        let mut driver = heights_driver((1..=20).map(|h| h * 100).collect());
        driver.expect_scroll_to_bottom().returning(|| Ok(()));

        let policy = ScrollPolicy {
            timeout: Some(Duration::from_secs(7)),
            ..Default::default()
        };
        let page = PageLoader::new(policy)
            .load(&mut driver, "https://example.com")
            .await
            .unwrap();

        assert!(page.scroll.timed_out);
        assert!(!page.scroll.stabilized);
        assert_eq!(page.scroll.iterations, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_error_propagates() {
        let mut driver = MockPageDriver::new();
        driver
            .expect_navigate()
            .returning(|_| Err(ScrapeError::UnexpectedFailure("net::ERR_NAME_NOT_RESOLVED".into())));
        driver.expect_content().never();

        let result = PageLoader::new(ScrollPolicy::default())
            .load(&mut driver, "https://example.invalid")
            .await;

        assert!(matches!(result, Err(ScrapeError::UnexpectedFailure(_))));
    }
}
