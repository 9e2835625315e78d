use crate::{Config, ErrorSeverity, ScrapeError, ScrapeService, WriteOutcome};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn, Level};

#[derive(Parser, Debug)]
#[command(name = "playlist-scraper")]
#[command(about = "Scrape track names, artists and links from a Spotify playlist page")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, help = "Full link to the Spotify playlist")]
    pub url: String,

    #[arg(short, long, help = "Output JSON file (default: spotify_playlist.json)")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Chrome executable path")]
    pub chrome_path: Option<String>,

    #[arg(long, help = "Show the browser window instead of running headless")]
    pub headful: bool,

    #[arg(long, help = "Enable verbose logging")]
    pub verbose: bool,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            config.output.tracks_file = output.clone();
        }
        if let Some(chrome_path) = &self.chrome_path {
            config.browser.chrome_path = Some(chrome_path.clone());
        }
        if self.headful {
            config.browser.headless = false;
        }
    }
}

pub struct CliRunner {
    pub service: ScrapeService,
}

impl CliRunner {
    pub fn new(config: Config) -> Result<Self, ScrapeError> {
        let service = ScrapeService::new(config)?;
        Ok(Self { service })
    }

    pub async fn run(&self, url: &str) -> Result<WriteOutcome, ScrapeError> {
        println!("Starting playlist scan: {url}");

        match self.service.run(url).await {
            Ok(outcome) => {
                info!("Run finished: {:?}", outcome);
                Ok(outcome)
            }
            Err(e) => {
                match failure_log_level(&e) {
                    Level::ERROR => error!("Run failed: {}", e),
                    Level::WARN => warn!("Run failed: {}", e),
                    _ => info!("Run failed: {}", e),
                }
                println!("{e}");
                println!("{}", e.operator_hint());
                Err(e)
            }
        }
    }
}

/// Log level for a failed run, by error severity.
pub fn failure_log_level(error: &ScrapeError) -> Level {
    match error.severity() {
        ErrorSeverity::High => Level::ERROR,
        ErrorSeverity::Medium => Level::WARN,
        ErrorSeverity::Low => Level::INFO,
    }
}

pub fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_url_is_required() {
        assert!(Cli::try_parse_from(["playlist-scraper"]).is_err());

        let cli = Cli::try_parse_from([
            "playlist-scraper",
            "--url",
            "https://open.spotify.com/playlist/abc",
        ])
        .unwrap();
        assert_eq!(cli.url, "https://open.spotify.com/playlist/abc");
        assert!(cli.output.is_none());
        assert!(!cli.headful);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "playlist-scraper",
            "-u",
            "https://open.spotify.com/playlist/abc",
            "-o",
            "out/tracks.json",
            "--chrome-path",
            "/usr/bin/chromium",
            "--headful",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.output.tracks_file, PathBuf::from("out/tracks.json"));
        assert_eq!(config.browser.chrome_path.as_deref(), Some("/usr/bin/chromium"));
        assert!(!config.browser.headless);
    }

    #[test]
    fn test_failure_log_level_follows_severity() {
        assert_eq!(
            failure_log_level(&ScrapeError::InitFailure("chrome missing".into())),
            Level::ERROR
        );
        assert_eq!(failure_log_level(&ScrapeError::BlockedAccess), Level::WARN);
        assert_eq!(
            failure_log_level(&ScrapeError::InvalidUrl("ftp://x".into())),
            Level::INFO
        );
    }

    #[test]
    fn test_runner_builds_from_config() {
        let runner = CliRunner::new(Config::default());
        assert!(runner.is_ok());
    }
}
