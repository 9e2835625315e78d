//! Configuration management with serde serialization/deserialization
//!
//! Every knob the scraper reads lives here: browser launch flags, the scroll
//! policy used while waiting for lazy rows, and the file names the run writes.
//! Nothing is read from ambient globals; a `Config` is built once in `main`
//! and handed down.

use crate::ScrapeError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Origin prefixed to relative track links.
pub const DEFAULT_BASE_URL: &str = "https://open.spotify.com";

/// Main configuration structure for the playlist scraper
///
/// # Examples
///
/// ```rust
/// use playlist_scraper::Config;
///
/// let config = Config {
///     base_url: "https://open.spotify.com".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(config.scroll.max_iterations, 10);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Chrome launch settings, including the anti-detection flags
    pub browser: BrowserSettings,

    /// How long and how often to scroll while rows are lazy-loaded
    pub scroll: ScrollPolicy,

    /// Output and diagnostic file locations
    pub output: OutputSettings,

    /// Origin used to build canonical track URLs (default: https://open.spotify.com)
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: BrowserSettings::default(),
            scroll: ScrollPolicy::default(),
            output: OutputSettings::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Browser launch configuration
///
/// Defaults match what the playlist page needs to render for an automated
/// client: headless, no GPU, no sandbox, maximized, stealth on.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run without a visible window (default: true)
    pub headless: bool,

    /// Pass `--disable-gpu` (default: true)
    pub disable_gpu: bool,

    /// Pass `--no-sandbox` (default: true)
    pub no_sandbox: bool,

    /// Pass `--start-maximized` (default: true)
    pub start_maximized: bool,

    /// Hide automation fingerprints from page scripts (default: true)
    ///
    /// Adds `--disable-blink-features=AutomationControlled` and installs a
    /// script that runs before every document to mask `navigator.webdriver`
    /// and friends.
    pub stealth: bool,

    /// Window width in pixels (default: 1920)
    pub window_width: u32,

    /// Window height in pixels (default: 1080)
    pub window_height: u32,

    /// Path to Chrome/Chromium executable (default: auto-detect)
    pub chrome_path: Option<String>,

    /// Custom User-Agent string (default: Chrome default)
    pub user_agent: Option<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            disable_gpu: true,
            no_sandbox: true,
            start_maximized: true,
            stealth: true,
            window_width: 1920,
            window_height: 1080,
            chrome_path: None,
            user_agent: None,
        }
    }
}

/// Scroll-until-stable policy for lazy-loaded pages
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrollPolicy {
    /// Pause after navigation before the first height measurement (default: 10s)
    pub initial_wait: Duration,

    /// Upper bound on scroll iterations (default: 10)
    pub max_iterations: usize,

    /// Pause after each scroll so new rows can be injected (default: 3s)
    pub settle_interval: Duration,

    /// Optional bound on the whole scroll phase (default: none)
    ///
    /// When it expires scrolling stops and the markup is taken as it is.
    pub timeout: Option<Duration>,
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        Self {
            initial_wait: Duration::from_secs(10),
            max_iterations: 10,
            settle_interval: Duration::from_secs(3),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Extracted tracks, written only on a non-empty result
    pub tracks_file: PathBuf,

    /// Raw markup saved when the site serves a block page
    pub blocked_dump: PathBuf,

    /// Raw markup saved when no track rows are found
    pub debug_dump: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            tracks_file: PathBuf::from("spotify_playlist.json"),
            blocked_dump: PathBuf::from("spotify_page_source_blocked.html"),
            debug_dump: PathBuf::from("spotify_page_source_debug.html"),
        }
    }
}

/// Generate Chrome command-line arguments from the browser settings.
///
/// Headless mode is not part of this list: the chromiumoxide builder adds
/// `--headless` itself unless `with_head()` is called.
///
/// # Examples
///
/// ```rust
/// use playlist_scraper::{BrowserSettings, get_chrome_args};
///
/// let args = get_chrome_args(&BrowserSettings::default());
/// assert!(args.contains(&"--no-sandbox".to_string()));
/// ```
pub fn get_chrome_args(settings: &BrowserSettings) -> Vec<String> {
    let mut args = Vec::new();

    if settings.disable_gpu {
        args.push("--disable-gpu".to_string());
    }
    if settings.no_sandbox {
        args.push("--no-sandbox".to_string());
    }
    if settings.start_maximized {
        args.push("--start-maximized".to_string());
    }

    args.push("--disable-dev-shm-usage".to_string());
    args.push("--no-first-run".to_string());
    args.push(format!(
        "--window-size={},{}",
        settings.window_width, settings.window_height
    ));

    if settings.stealth {
        args.push("--disable-blink-features=AutomationControlled".to_string());
    }

    if let Some(user_agent) = &settings.user_agent {
        args.push(format!("--user-agent={user_agent}"));
    }

    args
}

pub fn create_browser_config(
    settings: &BrowserSettings,
) -> Result<chromiumoxide::browser::BrowserConfig, ScrapeError> {
    use chromiumoxide::browser::BrowserConfig;

    let mut builder = BrowserConfig::builder()
        .window_size(settings.window_width, settings.window_height)
        .args(get_chrome_args(settings));

    if !settings.headless {
        builder = builder.with_head();
    }

    if let Some(chrome_path) = &settings.chrome_path {
        builder = builder.chrome_executable(chrome_path);
    }

    builder.build().map_err(ScrapeError::InitFailure)
}

/// Reject configurations that cannot produce a meaningful run.
pub fn validate_config(config: &Config) -> Result<(), ScrapeError> {
    if config.scroll.max_iterations == 0 {
        return Err(ScrapeError::Configuration(
            "Scroll iterations must be greater than 0".to_string(),
        ));
    }

    if config.browser.window_width == 0 || config.browser.window_height == 0 {
        return Err(ScrapeError::Configuration(
            "Window dimensions must be greater than 0".to_string(),
        ));
    }

    if matches!(config.scroll.timeout, Some(t) if t.is_zero()) {
        return Err(ScrapeError::Configuration(
            "Scroll timeout must be greater than 0".to_string(),
        ));
    }

    if url::Url::parse(&config.base_url).is_err() {
        return Err(ScrapeError::Configuration(format!(
            "Base URL is not a valid URL: {}",
            config.base_url
        )));
    }

    if config.output.tracks_file.as_os_str().is_empty() {
        return Err(ScrapeError::Configuration(
            "Output file path must not be empty".to_string(),
        ));
    }

    Ok(())
}
