use crate::{PlaylistDocument, ScrapeError, TrackRecord};
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { path: PathBuf, count: usize },
    ReportedEmpty,
}

pub struct ResultWriter {
    path: PathBuf,
}

impl ResultWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write non-empty results to the output file and echo them to stdout.
    /// An empty result prints guidance and leaves the file system untouched.
    pub async fn write(&self, tracks: &[TrackRecord]) -> Result<WriteOutcome, ScrapeError> {
        if tracks.is_empty() {
            warn!("No tracks extracted; nothing written");
            println!();
            println!(
                "Could not find any tracks. Check the link or try running the command again."
            );
            return Ok(WriteOutcome::ReportedEmpty);
        }

        let json = render_json(tracks)?;

        println!();
        println!("--- Successfully found {} tracks ---", tracks.len());
        println!("{json}");

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(&self.path, json.as_bytes()).await?;

        info!("Saved {} tracks to {}", tracks.len(), self.path.display());
        println!();
        println!("Data saved to '{}'", self.path.display());

        Ok(WriteOutcome::Written {
            path: self.path.clone(),
            count: tracks.len(),
        })
    }
}

/// Pretty JSON with two-space indentation; non-ASCII is kept as-is.
pub fn render_json(tracks: &[TrackRecord]) -> Result<String, ScrapeError> {
    let document = PlaylistDocument {
        tracks: tracks.to_vec(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}
