//! # Enigma - Chat Music Bot
//!
//! Command-line entry point. Manages the song catalog and runs the bot on the
//! console.
//!
//! ```bash
//! # Load the catalog once
//! enigma import songs.csv
//!
//! # See what is in it
//! enigma genres
//!
//! # Talk to the bot
//! RUST_LOG=info enigma run --user alice --voice-channel Lounge
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use enigma::bot::Bot;
use enigma::catalog::Catalog;
use enigma::cli::{Args, Command};
use enigma::completion;
use enigma::config::{self, BotConfig};
use enigma::console::{self, ConsoleUser};
use enigma::recommend::{generate_recommendations, RecommendConfig};
use enigma::song::Song;
use enigma::voice::ConsoleVoice;
use log::{debug, info, warn};
use std::io;
use std::path::Path;

/// Main entry point for Enigma.
///
/// Initializes logging, loads settings and routes the subcommand.
///
/// # Logging
///
/// Controlled via `RUST_LOG`:
/// - `RUST_LOG=info enigma run` - Show every bot reply as a log line
/// - `RUST_LOG=enigma::catalog=debug enigma import songs.csv` - Module-specific logging
fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => config::absolute(path)?,
        None => config::get_config_path()?,
    };
    let settings = BotConfig::load(&config_path)?;
    let db_path = match &args.db {
        Some(path) => config::absolute(path)?,
        None => settings.db_path()?,
    };
    debug!("Using catalog at {}", db_path.display());

    match args.command {
        Command::Import { path, replace } => {
            let path = config::absolute(&path)?;
            let mut catalog = Catalog::open(&db_path)?;
            let imported = catalog.import_csv(&path, replace)?;
            println!(
                "Imported {imported} songs into {} ({} total)",
                db_path.display(),
                catalog.len()?
            );
        }
        Command::Genres => {
            let catalog = Catalog::open(&db_path)?;
            let genres = catalog.genres()?;
            if genres.is_empty() {
                println!("The catalog is empty. Run `enigma import <csv>` first.");
            }
            for (genre, count) in genres {
                println!("{genre:<24} {count:>6}");
            }
        }
        Command::Recommend {
            track,
            artist,
            genre,
            count,
        } => {
            let songs = Catalog::open(&db_path)?.songs()?;
            let liked = Song {
                track_name: track,
                artist_name: artist,
                genre: Some(genre),
            };
            let rules = RecommendConfig {
                max_results: count,
                ..settings.recommend_config()
            };

            let picks = generate_recommendations(
                std::slice::from_ref(&liked),
                &songs,
                &rules,
                &mut rand::thread_rng(),
            );
            if picks.is_empty() {
                println!("No recommendations found for {}", liked.describe());
            }
            for (i, song) in picks.iter().enumerate() {
                println!("{:>2}. {}", i + 1, song.describe());
            }
        }
        Command::Run {
            user,
            voice_channel,
            channel,
        } => {
            let songs = load_songs(&db_path)?;
            if songs.is_empty() {
                warn!(
                    "The catalog at {} is empty; /poll will have nothing to offer",
                    db_path.display()
                );
            }
            info!("Loaded {} songs", songs.len());

            let user = ConsoleUser {
                name: user,
                channel: channel.unwrap_or_else(|| settings.command_channel.clone()),
                voice: voice_channel,
            };
            let mut bot = Bot::new(settings, songs, ConsoleVoice::new());
            console::run(&mut bot, user)?;
        }
        Command::Completion { shell } => {
            let mut cmd = Args::command();
            completion::generate_completions(
                completion::shell_to_completion_shell(shell),
                &mut cmd,
                &mut io::stdout(),
            );
        }
        Command::CompletionEnhanced { shell } => {
            completion::generate_enhanced_completion(shell, &mut io::stdout())?;
        }
        Command::CompleteSongs { shell } => {
            completion::print_song_completions(&db_path, shell.as_deref())?;
        }
    }

    Ok(())
}

fn load_songs(db_path: &Path) -> Result<Vec<Song>> {
    Catalog::open(db_path)
        .and_then(|catalog| catalog.songs())
        .with_context(|| format!("Failed to load the catalog from {}", db_path.display()))
}
