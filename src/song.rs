//! The `Song` value passed between the catalog, the recommender and the queue.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A track as the bot knows it.
///
/// Songs queued by free-text query only carry a track name; songs coming from
/// the catalog also know their artist and genre.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Song {
    pub track_name: String,
    pub artist_name: Option<String>,
    pub genre: Option<String>,
}

impl Song {
    /// Song built from a user query, e.g. `/queue never gonna give you up`.
    #[must_use]
    pub fn new(track_name: impl Into<String>) -> Self {
        Self {
            track_name: track_name.into(),
            artist_name: None,
            genre: None,
        }
    }

    #[must_use]
    pub fn with_details(
        track_name: impl Into<String>,
        artist_name: impl Into<String>,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            track_name: track_name.into(),
            artist_name: Some(artist_name.into()),
            genre: Some(genre.into()),
        }
    }

    /// `<track> by <artist> (<genre>)`, leaving out whatever is unknown.
    /// Used for poll and recommendation listings.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.genre {
            Some(genre) => format!("{self} ({genre})"),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.artist_name {
            Some(artist) => write!(f, "{} by {}", self.track_name, artist),
            None => write!(f, "{}", self.track_name),
        }
    }
}
