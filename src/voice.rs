//! Voice connection seam.
//!
//! The bot never streams audio itself. Everything it needs from a voice
//! channel goes through [`Voice`], so the chat platform's voice client can be
//! swapped for [`ConsoleVoice`] when running locally or for a recorder in tests.

use crate::song::Song;
use anyhow::{bail, Result};
use log::info;

pub trait Voice {
    /// Channel the bot is connected to, if any.
    fn channel(&self) -> Option<&str>;

    fn is_connected(&self) -> bool {
        self.channel().is_some()
    }

    fn connect(&mut self, channel: &str) -> Result<()>;

    fn move_to(&mut self, channel: &str) -> Result<()>;

    fn disconnect(&mut self) -> Result<()>;

    /// Start streaming `song`, replacing whatever was playing.
    fn play(&mut self, song: &Song) -> Result<()>;

    fn pause(&mut self);

    fn resume(&mut self);

    fn stop(&mut self);

    fn is_paused(&self) -> bool;
}

/// Voice client for the console front end: keeps connection state and logs
/// what a real client would stream.
#[derive(Debug, Default)]
pub struct ConsoleVoice {
    channel: Option<String>,
    playing: Option<Song>,
    paused: bool,
}

impl ConsoleVoice {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn playing(&self) -> Option<&Song> {
        self.playing.as_ref()
    }
}

impl Voice for ConsoleVoice {
    fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    fn connect(&mut self, channel: &str) -> Result<()> {
        info!("Connecting to voice channel {channel}");
        self.channel = Some(channel.to_string());
        Ok(())
    }

    fn move_to(&mut self, channel: &str) -> Result<()> {
        if self.channel.is_none() {
            bail!("Cannot move to {channel}: not connected");
        }
        info!("Moving to voice channel {channel}");
        self.channel = Some(channel.to_string());
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        info!("Disconnecting from voice");
        self.channel = None;
        self.playing = None;
        self.paused = false;
        Ok(())
    }

    fn play(&mut self, song: &Song) -> Result<()> {
        let Some(channel) = &self.channel else {
            bail!("Cannot play {song}: not connected");
        };
        info!("Streaming \"{song}\" to {channel}");
        self.playing = Some(song.clone());
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn stop(&mut self) {
        self.playing = None;
        self.paused = false;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}
