//! User-facing command failures.
//!
//! Every variant renders to the exact chat message the user sees, so handlers
//! can turn an `Err` straight into a reply. Infrastructure failures (database,
//! files, configuration) stay on `anyhow::Error`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("\"{0}\" is not a valid track number")]
    InvalidTrackNumber(String),

    #[error("Please enter a song")]
    EmptyQuery,

    #[error("No songs in queue. Try /queue <query> to get started")]
    EmptyQueue,

    #[error("Please add a song to the queue first")]
    NothingQueued,

    #[error("I am currently not connected to a voice channel")]
    NotConnected,

    #[error("I am currently not playing anything")]
    NotPlaying,

    #[error("Please join a voice channel before executing /join")]
    UserNotInVoice,

    #[error("Voice connection failed: {0}")]
    Voice(String),

    #[error("Could not play {song}: {reason}")]
    Playback { song: String, reason: String },
}
