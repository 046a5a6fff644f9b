//! Genre-based song recommendations.
//!
//! Given the songs a user picked in a poll, suggest catalog songs that share a
//! genre with one of the picks while introducing new artists and tracks.
//!
//! ```text
//! candidates = catalog
//!     where genre ∈ genres(selected)
//!     and artist ∉ artists(selected)
//!     and track ∉ tracks(selected)
//! shuffle(candidates)
//! take first songs, at most `artist_limit` per artist, up to `max_results`
//! ```

use crate::song::Song;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Bounds applied to every recommendation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendConfig {
    /// How many songs by the same artist one list may contain.
    pub artist_limit: usize,
    /// Maximum list length. Polls and recommendation lists are numbered with
    /// the ten keycap emojis, so this stays at or below 10 in practice.
    pub max_results: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            artist_limit: 2,
            max_results: 10,
        }
    }
}

/// Recommend songs from `catalog` based on the user's `selected` songs.
///
/// Returns an empty list when nothing was selected or nothing matches.
/// Songs without an artist share one bucket for the per-artist cap.
///
/// # Examples
///
/// ```
/// use enigma::recommend::{generate_recommendations, RecommendConfig};
/// use enigma::song::Song;
/// use rand::SeedableRng;
///
/// let catalog = vec![
///     Song::with_details("Song1", "Artist1", "pop"),
///     Song::with_details("Song2", "Artist2", "pop"),
///     Song::with_details("Song3", "Artist3", "jazz"),
/// ];
/// let selected = vec![Song::with_details("Song1", "Artist1", "pop")];
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
///
/// let picks = generate_recommendations(&selected, &catalog, &RecommendConfig::default(), &mut rng);
/// assert_eq!(picks, vec![Song::with_details("Song2", "Artist2", "pop")]);
/// ```
#[must_use]
pub fn generate_recommendations<R: Rng + ?Sized>(
    selected: &[Song],
    catalog: &[Song],
    config: &RecommendConfig,
    rng: &mut R,
) -> Vec<Song> {
    if selected.is_empty() || config.max_results == 0 {
        return Vec::new();
    }

    let genres: HashSet<&str> = selected.iter().filter_map(|s| s.genre.as_deref()).collect();
    let known_artists: HashSet<&str> = selected
        .iter()
        .filter_map(|s| s.artist_name.as_deref())
        .collect();
    let known_tracks: HashSet<&str> = selected.iter().map(|s| s.track_name.as_str()).collect();

    let mut candidates: Vec<&Song> = catalog
        .iter()
        .filter(|song| {
            song.genre.as_deref().is_some_and(|g| genres.contains(g))
                && !song
                    .artist_name
                    .as_deref()
                    .is_some_and(|a| known_artists.contains(a))
                && !known_tracks.contains(song.track_name.as_str())
        })
        .collect();
    log::debug!(
        "{} candidate songs across {} genre(s)",
        candidates.len(),
        genres.len()
    );

    candidates.shuffle(rng);

    let mut per_artist: HashMap<Option<&str>, usize> = HashMap::new();
    let mut recommendations: Vec<Song> = Vec::with_capacity(config.max_results);

    for song in candidates {
        let count = per_artist.entry(song.artist_name.as_deref()).or_insert(0);
        if *count >= config.artist_limit || recommendations.contains(song) {
            continue;
        }
        *count += 1;
        recommendations.push(song.clone());

        if recommendations.len() >= config.max_results {
            break;
        }
    }

    recommendations
}
