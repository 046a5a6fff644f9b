//! Shared playback state.
//!
//! One [`Session`] exists per bot. It holds what is playing, the pause and loop
//! flags, the pending queue and the user's poll favorites. Transitions that
//! touch audio take the [`Voice`] client so state and stream never disagree.
//!
//! ```text
//!            start(song)            pause()
//!   Idle ─────────────────▶ Playing ───────▶ Paused
//!     ▲                       │  ▲             │
//!     │        stop()         │  └─ unpause() ─┘
//!     └───────────────────────┴────────────────┘
//! ```

use crate::queue::SongQueue;
use crate::song::Song;
use crate::voice::Voice;

#[derive(Debug, Default)]
pub struct Session {
    current: Option<Song>,
    paused: bool,
    looping: bool,
    pub queue: SongQueue,
    /// Songs picked in the last poll; recommendations are built from these.
    pub favorites: Vec<Song>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A song is loaded, whether playing or paused.
    #[must_use]
    pub fn is_in_use(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub fn current(&self) -> Option<&Song> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Record that `song` started streaming.
    pub fn start(&mut self, song: Song) {
        self.current = Some(song);
        self.paused = false;
    }

    /// Pause if something is playing and not already paused.
    pub fn pause(&mut self, voice: &mut dyn Voice) {
        if !self.paused && self.is_in_use() {
            if voice.is_connected() && !voice.is_paused() {
                voice.pause();
            }
            self.paused = true;
        }
    }

    /// Resume if something is loaded and paused.
    pub fn unpause(&mut self, voice: &mut dyn Voice) {
        if self.paused && self.is_in_use() {
            if voice.is_connected() && voice.is_paused() {
                voice.resume();
            }
            self.paused = false;
        }
    }

    /// Stop playback and forget the current song, returning it.
    pub fn stop(&mut self, voice: &mut dyn Voice) -> Option<Song> {
        if self.is_in_use() {
            voice.stop();
        }
        self.paused = false;
        self.current.take()
    }

    /// First part of `/view`.
    #[must_use]
    pub fn status_line(&self) -> String {
        match &self.current {
            Some(song) => {
                let mut line = format!("Now playing: {song}");
                if self.paused {
                    line.push_str(" **[PAUSED]**");
                }
                if self.looping {
                    line.push_str(" **[LOOPING]**");
                }
                line
            }
            None => "Currently not playing anything".to_string(),
        }
    }
}
