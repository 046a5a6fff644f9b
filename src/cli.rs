//! # Command-Line Interface Module
//!
//! Clap derive definitions for the `enigma` binary.
//!
//! ## Commands
//!
//! - `import`: Load a song catalog from CSV into the database
//! - `genres`: List genres with their song counts
//! - `recommend`: Print recommendations for a single song
//! - `run`: Start the chat bot on the console
//! - `completion`: Generate shell completions
//! - `completion-enhanced`: Bash and fish scripts that complete track names
//!   and genres from the catalog
//!
//! ## Examples
//!
//! ```bash
//! enigma import songs.csv
//! enigma recommend "Take On Me" --artist a-ha --genre pop
//! RUST_LOG=info enigma run --user alice --voice-channel Lounge
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "enigma")]
#[command(about = "Enigma: a chat music bot that polls your taste and recommends songs")]
#[command(version)]
pub struct Args {
    /// Settings file (JSON). Defaults to the platform config directory.
    #[arg(long, global = true, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Catalog database. Overrides the `db_path` setting.
    #[arg(long, global = true, env = "ENIGMA_DB", value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub db: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import songs from a CSV file
    ///
    /// The file needs a `track_name` column; `artist_name` (or `artist`),
    /// `genre` and `year` are optional. Rows without a track name are skipped.
    Import {
        /// Path to the CSV file
        #[arg(value_hint = clap::ValueHint::FilePath)]
        path: PathBuf,

        /// Drop the existing catalog before importing
        #[arg(long)]
        replace: bool,
    },

    /// List genres in the catalog with their song counts
    Genres,

    /// Print recommendations for a single song
    ///
    /// Uses the same rules as the chat `/recommend` command: songs from the
    /// same genre, by other artists, at most two per artist.
    Recommend {
        /// Track name of the song you like
        track: String,

        #[arg(long)]
        artist: Option<String>,

        /// Genre to draw recommendations from
        #[arg(long)]
        genre: String,

        /// Maximum number of recommendations
        #[arg(long, short = 'n', default_value = "10")]
        count: usize,
    },

    /// Run the bot against the console
    ///
    /// Lines starting with the command prefix are chat messages. Reactions and
    /// playback events are typed as directives; `!help` lists them.
    Run {
        /// Name to post messages as
        #[arg(long, default_value = "listener")]
        user: String,

        /// Voice channel the user starts in
        #[arg(long)]
        voice_channel: Option<String>,

        /// Text channel to post in. Defaults to the configured command channel.
        #[arg(long)]
        channel: Option<String>,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },

    /// Generate completions that also offer catalog track names and genres
    ///
    /// Only bash and fish are supported. The scripts call the hidden
    /// `complete-songs` command while you type.
    CompletionEnhanced {
        /// Shell to generate completions for (bash or fish)
        shell: Shell,
    },

    /// Print track names and genres for shell completion (internal use)
    #[command(hide = true)]
    CompleteSongs {
        /// Format output for this shell
        #[arg(long)]
        shell: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_recommend() {
        let args = Args::parse_from([
            "enigma",
            "recommend",
            "Take On Me",
            "--artist",
            "a-ha",
            "--genre",
            "pop",
        ]);
        match args.command {
            Command::Recommend {
                track,
                artist,
                genre,
                count,
            } => {
                assert_eq!(track, "Take On Me");
                assert_eq!(artist.as_deref(), Some("a-ha"));
                assert_eq!(genre, "pop");
                assert_eq!(count, 10);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_db_flag_after_subcommand() {
        let args = Args::parse_from(["enigma", "genres", "--db", "songs.db"]);
        assert_eq!(args.db, Some(PathBuf::from("songs.db")));
        assert!(matches!(args.command, Command::Genres));
    }
}
