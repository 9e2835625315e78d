//! Scrape service orchestrating one playlist run
//!
//! Acquires a browser session, loads and extracts the playlist, releases the
//! session and finally writes the result. The session is closed exactly once
//! on every path after it was acquired, including a panic inside the load or
//! extract steps.

use crate::{
    validate_url, ChromeSession, Config, ContentExtractor, PageDriver, PageLoader, ResultWriter,
    ScrapeError, TrackRecord, WriteOutcome,
};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::{error, info, warn};

/// Stages of a run, logged as they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Start,
    InitFailed,
    SessionAcquired,
    PageLoaded,
    Blocked,
    Extracted,
    SessionReleased,
    Written,
    ReportedEmpty,
}

fn log_state(state: RunState) {
    info!("run_state={:?}", state);
}

/// Playlist scraper
///
/// # Examples
///
/// ```rust,no_run
/// use playlist_scraper::{Config, ScrapeService};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let service = ScrapeService::new(Config::default())?;
///     let outcome = service
///         .run("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M")
///         .await?;
///     println!("{outcome:?}");
///     Ok(())
/// }
/// ```
pub struct ScrapeService {
    config: Config,
    loader: PageLoader,
    extractor: ContentExtractor,
    writer: ResultWriter,
}

impl ScrapeService {
    pub fn new(config: Config) -> Result<Self, ScrapeError> {
        let loader = PageLoader::new(config.scroll.clone());
        let extractor = ContentExtractor::new(&config.base_url, config.output.clone())?;
        let writer = ResultWriter::new(config.output.tracks_file.clone());

        Ok(Self {
            config,
            loader,
            extractor,
            writer,
        })
    }

    /// Scrape `url` and write the result file.
    pub async fn run(&self, url: &str) -> Result<WriteOutcome, ScrapeError> {
        let tracks = self.scrape(url).await?;
        self.write_result(&tracks).await
    }

    /// Same as [`run`](Self::run) with an already acquired session.
    pub async fn run_with<D: PageDriver>(
        &self,
        driver: D,
        url: &str,
    ) -> Result<WriteOutcome, ScrapeError> {
        let tracks = self.scrape_with(driver, url).await?;
        self.write_result(&tracks).await
    }

    async fn write_result(&self, tracks: &[TrackRecord]) -> Result<WriteOutcome, ScrapeError> {
        let outcome = self.writer.write(tracks).await?;
        log_state(match outcome {
            WriteOutcome::Written { .. } => RunState::Written,
            WriteOutcome::ReportedEmpty => RunState::ReportedEmpty,
        });

        Ok(outcome)
    }

    /// Launch a browser and extract the playlist at `url`.
    pub async fn scrape(&self, url: &str) -> Result<Vec<TrackRecord>, ScrapeError> {
        validate_url(url)?;
        log_state(RunState::Start);

        println!("Setting up the browser...");
        let session = match ChromeSession::launch(&self.config.browser).await {
            Ok(session) => session,
            Err(e) => {
                log_state(RunState::InitFailed);
                error!("Browser initialization failed: {}", e);
                return Err(e);
            }
        };

        self.scrape_with(session, url).await
    }

    /// Extract the playlist using an already acquired session, then close it.
    pub async fn scrape_with<D: PageDriver>(
        &self,
        mut driver: D,
        url: &str,
    ) -> Result<Vec<TrackRecord>, ScrapeError> {
        log_state(RunState::SessionAcquired);
        let start_time = Instant::now();

        let result = AssertUnwindSafe(self.load_and_extract(&mut driver, url))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(ScrapeError::UnexpectedFailure(format!(
                    "panic during scrape: {}",
                    panic_message(panic.as_ref())
                )))
            });

        if let Err(e) = driver.close().await {
            warn!("Error while releasing browser session: {}", e);
        }
        log_state(RunState::SessionReleased);

        match &result {
            Ok(tracks) => info!(
                "Scrape of {} finished in {} with {} tracks",
                url,
                crate::format_duration(start_time.elapsed()),
                tracks.len()
            ),
            Err(e) => error!("Scrape of {} failed: {}", url, e),
        }

        result
    }

    async fn load_and_extract<D: PageDriver>(
        &self,
        driver: &mut D,
        url: &str,
    ) -> Result<Vec<TrackRecord>, ScrapeError> {
        let page = self.loader.load(driver, url).await?;
        log_state(RunState::PageLoaded);

        match self.extractor.extract(&page.html).await {
            Ok(tracks) => {
                log_state(RunState::Extracted);
                Ok(tracks)
            }
            Err(e) => {
                if matches!(e, ScrapeError::BlockedAccess) {
                    log_state(RunState::Blocked);
                }
                Err(e)
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
