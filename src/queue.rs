//! # Playback Queue
//!
//! Ordered list of songs waiting to be played. Chat users address songs by
//! *track number* (1-based), so every mutating operation takes the raw text the
//! user typed and translates it here:
//!
//! - a **track number** addresses an existing song: `1..=len`
//! - an **insert number** addresses a gap between songs: `1..=len + 1`
//!
//! Both translate to a 0-based index, or fail with
//! [`CommandError::InvalidTrackNumber`] carrying the raw input.

use crate::error::CommandError;
use crate::song::Song;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Index-addressable song queue. Duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongQueue {
    songs: VecDeque<Song>,
}

impl SongQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Song> {
        self.songs.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    #[must_use]
    pub fn front(&self) -> Option<&Song> {
        self.songs.front()
    }

    /// Translate a 1-based track number into a 0-based index of an existing song.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidTrackNumber`] if `raw` is not an integer
    /// in `1..=len`.
    pub fn track_index(&self, raw: &str) -> Result<usize, CommandError> {
        parse_number(raw, self.songs.len())
    }

    /// Translate a 1-based insert number into a 0-based insertion index.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidTrackNumber`] if `raw` is not an integer
    /// in `1..=len + 1`.
    pub fn insert_index(&self, raw: &str) -> Result<usize, CommandError> {
        parse_number(raw, self.songs.len() + 1)
    }

    /// Append to the back of the queue.
    pub fn push(&mut self, song: Song) {
        self.songs.push_back(song);
    }

    /// Insert `song` so that it becomes track number `raw`.
    pub fn insert(&mut self, raw: &str, song: Song) -> Result<(), CommandError> {
        let index = self.insert_index(raw)?;
        self.songs.insert(index, song);
        Ok(())
    }

    /// Remove and return track number `raw`.
    pub fn remove(&mut self, raw: &str) -> Result<Song, CommandError> {
        let index = self.track_index(raw)?;
        self.songs
            .remove(index)
            .ok_or_else(|| CommandError::InvalidTrackNumber(raw.to_string()))
    }

    /// Move track `src` so it ends up as track `dest`.
    ///
    /// `dest` must name an existing track, checked before anything is removed,
    /// so a failed move leaves the queue untouched.
    pub fn move_track(&mut self, src: &str, dest: &str) -> Result<Song, CommandError> {
        let dest_index = self.track_index(dest)?;
        let src_index = self.track_index(src)?;
        let song = self
            .songs
            .remove(src_index)
            .ok_or_else(|| CommandError::InvalidTrackNumber(src.to_string()))?;
        // dest_index <= len after the removal
        self.songs.insert(dest_index, song.clone());
        Ok(song)
    }

    pub fn move_to_front(&mut self, src: &str) -> Result<Song, CommandError> {
        self.move_track(src, "1")
    }

    pub fn move_to_back(&mut self, src: &str) -> Result<Song, CommandError> {
        let last = self.songs.len().to_string();
        self.move_track(src, &last)
    }

    /// Drop every song before track `raw`, making it the next one to play.
    pub fn jump_to(&mut self, raw: &str) -> Result<(), CommandError> {
        let index = self.track_index(raw)?;
        self.songs.drain(..index);
        Ok(())
    }

    /// Uniformly shuffle the queue.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.songs.make_contiguous().shuffle(rng);
    }

    pub fn pop_front(&mut self) -> Option<Song> {
        self.songs.pop_front()
    }

    /// Numbered listing, one song per line: `1. A\n2. B\n`.
    #[must_use]
    pub fn render(&self) -> String {
        self.songs
            .iter()
            .enumerate()
            .map(|(i, song)| format!("{}. {song}\n", i + 1))
            .collect()
    }
}

impl FromIterator<Song> for SongQueue {
    fn from_iter<T: IntoIterator<Item = Song>>(iter: T) -> Self {
        Self {
            songs: iter.into_iter().collect(),
        }
    }
}

/// Parse a 1-based number and check it against `1..=upper`.
fn parse_number(raw: &str, upper: usize) -> Result<usize, CommandError> {
    let invalid = || CommandError::InvalidTrackNumber(raw.to_string());
    let number: i64 = raw.trim().parse().map_err(|_| invalid())?;
    match usize::try_from(number) {
        Ok(n) if (1..=upper).contains(&n) => Ok(n - 1),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn queue_of(names: &[&str]) -> SongQueue {
        names.iter().map(|name| Song::new(*name)).collect()
    }

    fn names(queue: &SongQueue) -> Vec<String> {
        queue.iter().map(|song| song.track_name.clone()).collect()
    }

    #[test]
    fn test_track_index_translation() {
        let queue = queue_of(&["a", "b", "c"]);

        let cases = [
            ("1", Ok(0)),
            ("3", Ok(2)),
            (" 2 ", Ok(1)),
            ("0", Err(())),
            ("4", Err(())),
            ("-1", Err(())),
            ("two", Err(())),
            ("", Err(())),
        ];

        for (raw, expected) in cases {
            let result = queue.track_index(raw).map_err(|_| ());
            assert_eq!(result, expected, "track number {raw:?}");
        }
    }

    #[test]
    fn test_insert_index_allows_one_past_end() {
        let queue = queue_of(&["a", "b"]);
        assert_eq!(queue.insert_index("3"), Ok(2));
        assert_eq!(
            queue.insert_index("4"),
            Err(CommandError::InvalidTrackNumber("4".to_string()))
        );

        let empty = SongQueue::new();
        assert_eq!(empty.insert_index("1"), Ok(0));
        assert!(empty.track_index("1").is_err());
    }

    #[test]
    fn test_insert_places_song_at_track_number() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.insert("2", Song::new("x")).unwrap();
        assert_eq!(names(&queue), ["a", "x", "b", "c"]);

        queue.insert("5", Song::new("y")).unwrap();
        assert_eq!(names(&queue), ["a", "x", "b", "c", "y"]);

        assert!(queue.insert("7", Song::new("z")).is_err());
        assert_eq!(queue.len(), 5);
    }

    #[test]
    fn test_remove_returns_song() {
        let mut queue = queue_of(&["a", "b", "c"]);
        let removed = queue.remove("2").unwrap();
        assert_eq!(removed.track_name, "b");
        assert_eq!(names(&queue), ["a", "c"]);
        assert!(queue.remove("3").is_err());
    }

    #[test]
    fn test_move_track() {
        let mut queue = queue_of(&["a", "b", "c", "d"]);
        let moved = queue.move_track("1", "3").unwrap();
        assert_eq!(moved.track_name, "a");
        assert_eq!(names(&queue), ["b", "c", "a", "d"]);

        queue.move_track("4", "1").unwrap();
        assert_eq!(names(&queue), ["d", "b", "c", "a"]);

        queue.move_track("1", "4").unwrap();
        assert_eq!(names(&queue), ["b", "c", "a", "d"]);
    }

    #[test]
    fn test_move_with_invalid_destination_leaves_queue_untouched() {
        let mut queue = queue_of(&["a", "b", "c"]);
        assert!(queue.move_track("1", "4").is_err());
        assert!(queue.move_track("9", "1").is_err());
        assert_eq!(names(&queue), ["a", "b", "c"]);
    }

    #[test]
    fn test_move_to_front_and_back() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.move_to_front("3").unwrap();
        assert_eq!(names(&queue), ["c", "a", "b"]);

        queue.move_to_back("1").unwrap();
        assert_eq!(names(&queue), ["a", "b", "c"]);
    }

    #[test]
    fn test_jump_to_discards_earlier_songs() {
        let mut queue = queue_of(&["a", "b", "c", "d"]);
        queue.jump_to("3").unwrap();
        assert_eq!(names(&queue), ["c", "d"]);

        queue.jump_to("1").unwrap();
        assert_eq!(names(&queue), ["c", "d"]);
        assert!(queue.jump_to("3").is_err());
    }

    #[test]
    fn test_shuffle_keeps_the_same_songs() {
        let mut queue = queue_of(&["a", "b", "c", "d", "e", "f"]);
        let mut rng = StdRng::seed_from_u64(7);
        queue.shuffle(&mut rng);

        let mut shuffled = names(&queue);
        shuffled.sort();
        assert_eq!(shuffled, ["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_render_numbers_from_one() {
        let mut queue = queue_of(&["a"]);
        queue.push(Song::with_details("b", "Artist", "pop"));
        assert_eq!(queue.render(), "1. a\n2. b by Artist\n");
    }

    #[test]
    fn test_duplicates_allowed() {
        let mut queue = queue_of(&["a"]);
        queue.push(Song::new("a"));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop_front(), Some(Song::new("a")));
        assert_eq!(queue.front(), Some(&Song::new("a")));
    }
}
