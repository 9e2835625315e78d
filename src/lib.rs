//! # Playlist Scraper
//!
//! Extracts track names, artists and canonical links from a public Spotify
//! playlist page. The page is rendered in headless Chrome (with automation
//! fingerprints masked), scrolled until lazy-loaded rows stop appearing, and
//! the resulting markup is parsed into a JSON file.
//!
//! ## Flow
//!
//! 1. **Session**: launch Chrome with the configured flags ([`ChromeSession`])
//! 2. **Load**: navigate and scroll until the page height is stable ([`PageLoader`])
//! 3. **Extract**: detect block pages and parse track rows ([`ContentExtractor`])
//! 4. **Write**: save `{"tracks": [...]}` and echo it ([`ResultWriter`])
//!
//! The browser session is released on every path once it has been acquired.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use playlist_scraper::{Config, ScrapeService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = ScrapeService::new(Config::default())?;
//!     let tracks = service
//!         .scrape("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M")
//!         .await?;
//!     println!("Found {} tracks", tracks.len());
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! playlist-scraper --url https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M
//! ```

/// Configuration and settings for the scraper
pub mod config;

/// Error types and error handling utilities
pub mod error;

/// Browser session lifecycle and the page driver seam
pub mod session;

/// Navigation and scroll-until-stable loading
pub mod loader;

/// Block detection and track row parsing
pub mod extract;

/// Track record data model
pub mod track;

/// JSON output
pub mod writer;

/// Run orchestration
pub mod scrape_service;

/// Command-line interface implementation
pub mod cli;

/// Utility functions and helpers
pub mod utils;


pub use cli::*;
pub use config::*;
pub use error::*;
pub use extract::*;
pub use loader::*;
pub use scrape_service::*;
pub use session::*;
pub use track::*;
pub use utils::*;
pub use writer::*;
