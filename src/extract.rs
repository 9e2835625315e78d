//! Playlist markup extraction
//!
//! Parsing is a pure function of the markup ([`parse_playlist`]). The
//! [`ContentExtractor`] wraps it with block-page detection and the diagnostic
//! dumps written when something looks wrong.

use crate::{OutputSettings, ScrapeError, TrackRecord};
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};
use url::Url;

/// Strings that only appear on the access-denial pages.
pub const BLOCK_MARKERS: [&str; 2] = [
    "Unsupported browser",
    "To play this content, you'll need the Spotify app",
];

const ROW_SELECTOR: &str = r#"div[data-testid="tracklist-row"]"#;
const LINK_SELECTOR: &str = "a[href]";
const LABEL_SELECTOR: &str = "div";

const TRACK_SEGMENT: &str = "/track/";
const ARTIST_SEGMENT: &str = "/artist/";

pub fn is_blocked(html: &str) -> bool {
    BLOCK_MARKERS.iter().any(|marker| html.contains(marker))
}

/// Result of a single parsing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPlaylist {
    /// Track-row nodes found, including rows that produced no record
    pub rows: usize,
    pub tracks: Vec<TrackRecord>,
}

/// Parse rendered playlist markup into track records, preserving row order.
///
/// Rows without a resolvable track link are skipped. If a row holds more than
/// one track link the last one wins.
pub fn parse_playlist(html: &str, base: &Url) -> Result<ParsedPlaylist, ScrapeError> {
    let row_selector = parse_selector(ROW_SELECTOR)?;
    let link_selector = parse_selector(LINK_SELECTOR)?;
    let label_selector = parse_selector(LABEL_SELECTOR)?;

    let document = Html::parse_document(html);
    let mut rows = 0;
    let mut tracks = Vec::new();

    for row in document.select(&row_selector) {
        rows += 1;

        let mut name = String::new();
        let mut canonical_url = None;
        let mut artists = Vec::new();

        for link in row.select(&link_selector) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };

            if href.contains(TRACK_SEGMENT) {
                name = match link.select(&label_selector).next() {
                    Some(label) => element_text(label),
                    None => element_text(link),
                };
                canonical_url = Some(canonical_track_url(base, href));
            } else if href.contains(ARTIST_SEGMENT) {
                artists.push(element_text(link));
            }
        }

        match canonical_url {
            Some(url) => tracks.push(TrackRecord::new(name, &artists, url)),
            None => debug!("Skipping row {} without a track link", rows),
        }
    }

    Ok(ParsedPlaylist { rows, tracks })
}

/// Prefix a track link with the site origin. The href is taken verbatim.
pub fn canonical_track_url(base: &Url, href: &str) -> String {
    format!("{}{}", base.as_str().trim_end_matches('/'), href)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn parse_selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css)
        .map_err(|e| ScrapeError::UnexpectedFailure(format!("Invalid selector {css}: {e}")))
}

pub struct ContentExtractor {
    base: Url,
    output: OutputSettings,
}

impl ContentExtractor {
    pub fn new(base_url: &str, output: OutputSettings) -> Result<Self, ScrapeError> {
        let base = Url::parse(base_url)
            .map_err(|e| ScrapeError::Configuration(format!("Invalid base URL {base_url}: {e}")))?;
        Ok(Self { base, output })
    }

    /// Extract tracks from rendered markup.
    ///
    /// A block page saves the markup and fails with
    /// [`ScrapeError::BlockedAccess`] without scanning rows. A page with no
    /// rows saves the markup and yields an empty list.
    pub async fn extract(&self, html: &str) -> Result<Vec<TrackRecord>, ScrapeError> {
        if is_blocked(html) {
            println!("ERROR: Spotify blocked access.");
            save_dump(&self.output.blocked_dump, html).await;
            println!(
                "Page source saved to '{}'",
                self.output.blocked_dump.display()
            );
            return Err(ScrapeError::BlockedAccess);
        }

        let parsed = parse_playlist(html, &self.base)?;
        println!("Found {} rows to analyze.", parsed.rows);

        if parsed.rows == 0 {
            save_dump(&self.output.debug_dump, html).await;
            println!(
                "No track rows found. Page source saved to '{}'.",
                self.output.debug_dump.display()
            );
        }

        info!(
            "Extracted {} tracks from {} rows",
            parsed.tracks.len(),
            parsed.rows
        );
        Ok(parsed.tracks)
    }
}

/// Diagnostic dumps are best effort; a failed write must not mask the
/// condition being diagnosed.
async fn save_dump(path: &Path, html: &str) {
    match fs::write(path, html).await {
        Ok(()) => info!("Saved page source to {}", path.display()),
        Err(e) => warn!("Failed to save page source to {}: {}", path.display(), e),
    }
}
