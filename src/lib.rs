//! Chat music bot that learns what you like from a quick poll.
//!
//! Core modules:
//! - [`catalog`] - SQLite song catalog, imported from CSV
//! - [`recommend`] - Genre-based recommendations with a per-artist cap
//! - [`queue`] - Playback queue addressed by 1-based track numbers
//! - [`session`] - Playback state (current song, pause, loop)
//! - [`interaction`] - Reaction-driven `/poll` and `/recommend` conversations
//! - [`bot`] - Command dispatch tying everything together
//!
//! ### Supporting Modules
//!
//! - [`commands`] - Chat command grammar
//! - [`voice`] - Voice connection seam
//! - [`reply`] - Outgoing messages
//! - [`error`] - User-facing command failures
//! - [`config`] - Settings and data directory management
//! - [`console`] - Stdin/stdout front end
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```
//! use enigma::bot::{Bot, Message};
//! use enigma::config::BotConfig;
//! use enigma::song::Song;
//! use enigma::voice::ConsoleVoice;
//! use std::time::Instant;
//!
//! let catalog = vec![
//!     Song::with_details("Take On Me", "a-ha", "pop"),
//!     Song::with_details("Africa", "Toto", "rock"),
//! ];
//! let mut bot = Bot::new(BotConfig::default(), catalog, ConsoleVoice::new());
//!
//! let join = Message::new("alice", "general", "/join").in_voice("Lounge");
//! bot.handle_message(&join, Instant::now());
//!
//! let queue = Message::new("alice", "general", "/queue never gonna give you up");
//! let replies = bot.handle_message(&queue, Instant::now());
//! assert_eq!(replies[0].text(), "Queued song: never gonna give you up");
//!
//! let next = Message::new("alice", "general", "/next");
//! let replies = bot.handle_message(&next, Instant::now());
//! assert_eq!(replies[0].text(), "Now playing: **never gonna give you up**");
//! ```
//!
//! ## Recommendations
//!
//! `/poll` offers one song from each of up to ten random genres. The user
//! reacts to pick up to three favorites. `/recommend` then suggests songs
//! that share a genre with a favorite, skipping the favorites' artists and
//! allowing at most two songs per artist. Reacting with a number queues the
//! song, 🆕 draws a fresh list and ⏹️ ends the session.
//!
//! ## Error Handling
//!
//! Infrastructure (database, CSV, settings, I/O) returns
//! `Result<T, anyhow::Error>`. Mistakes in chat never fail: they become a
//! [`error::CommandError`] whose message is sent back to the user.

pub mod bot;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod completion;
pub mod config;
pub mod console;
pub mod error;
pub mod interaction;
pub mod queue;
pub mod recommend;
pub mod reply;
pub mod session;
pub mod song;
pub mod voice;
