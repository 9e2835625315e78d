use serde::{Deserialize, Serialize};

/// Artist value used when a row carries no artist links.
pub const UNKNOWN_ARTIST: &str = "unknown artist";

/// One playable item extracted from the playlist listing
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TrackRecord {
    pub name: String,
    /// Comma-joined artist names, or [`UNKNOWN_ARTIST`]
    pub artist: String,
    #[serde(rename = "spotify_url")]
    pub canonical_url: String,
}

impl TrackRecord {
    pub fn new(name: impl Into<String>, artists: &[String], canonical_url: impl Into<String>) -> Self {
        let artist = if artists.is_empty() {
            UNKNOWN_ARTIST.to_string()
        } else {
            artists.join(", ")
        };

        Self {
            name: name.into(),
            artist,
            canonical_url: canonical_url.into(),
        }
    }
}

/// On-disk shape of the output file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlaylistDocument {
    pub tracks: Vec<TrackRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_join_and_sentinel() {
        let record = TrackRecord::new(
            "Song A",
            &["Alice".to_string(), "Bob".to_string()],
            "https://open.spotify.com/track/111",
        );
        assert_eq!(record.artist, "Alice, Bob");

        let record = TrackRecord::new("Song B", &[], "https://open.spotify.com/track/222");
        assert_eq!(record.artist, UNKNOWN_ARTIST);
    }

    #[test]
    fn test_serialized_key_order() {
        let record = TrackRecord::new("N", &[], "U");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"name":"N","artist":"unknown artist","spotify_url":"U"}"#);
    }
}
