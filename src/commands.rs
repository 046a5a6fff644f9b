//! # Chat Command Grammar
//!
//! Chat messages such as `/insert 2 never gonna give you up` are split on
//! whitespace and parsed with the same clap derive machinery the binary uses
//! for its own arguments.
//!
//! Track numbers are kept as the raw text the user typed: the queue validates
//! them and echoes the original input back in its error message.

use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "enigma-chat",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true,
    disable_help_subcommand = true
)]
struct ChatLine {
    #[command(subcommand)]
    command: ChatCommand,
}

/// Every command the bot answers to in chat.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Joins the voice channel of the user
    Join,

    /// Leaves the voice channel
    Leave,

    /// Pauses the song
    Pause,

    /// Unpauses the song
    Unpause,

    /// Queue a custom song
    Queue {
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },

    /// Insert a custom song at a track number
    Insert {
        #[arg(allow_hyphen_values = true)]
        index: String,
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },

    /// Insert a custom song at the front
    Insertfront {
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },

    /// Immediately jump to the next song in the queue
    Next,

    /// Show current queue and currently playing song
    View,

    /// Shuffle songs in queue
    Shuffle,

    /// Jump to a track number
    Jumpto {
        #[arg(allow_hyphen_values = true)]
        index: String,
    },

    /// Move the song at the given track number to a different position
    Move {
        #[arg(allow_hyphen_values = true)]
        src: String,
        #[arg(allow_hyphen_values = true)]
        dest: String,
    },

    /// Remove the song at the given track number
    Remove {
        #[arg(allow_hyphen_values = true)]
        index: String,
    },

    /// Move a song to the front of the queue
    Movefront {
        #[arg(allow_hyphen_values = true)]
        index: String,
    },

    /// Move a song to the back of the queue
    Moveback {
        #[arg(allow_hyphen_values = true)]
        index: String,
    },

    /// Replay the currently playing song once after it ends
    Replay,

    /// Immediately restart the currently playing song
    Replaynow,

    /// Toggle looping of the currently playing song
    Loop,

    /// Pick favorite songs from a genre sample
    Poll,

    /// Recommendations based on the songs picked in the last poll
    Recommend,

    /// List available commands
    Help,
}

impl ChatCommand {
    /// Parse a message. Returns `None` when the message is not addressed to the
    /// bot (missing prefix), `Some(Err(..))` with clap's rendered error when it
    /// is but does not parse.
    #[must_use]
    pub fn parse(content: &str, prefix: &str) -> Option<Result<Self, String>> {
        let body = content.trim().strip_prefix(prefix)?;
        let tokens: Vec<&str> = body.split_whitespace().collect();
        if tokens.is_empty() {
            return None;
        }
        // command names are case-insensitive in chat
        let name = tokens[0].to_lowercase();
        let args = std::iter::once(name.as_str()).chain(tokens[1..].iter().copied());

        Some(
            ChatLine::try_parse_from(args)
                .map(|line| line.command)
                .map_err(|err| err.to_string().trim_end().to_string()),
        )
    }

    /// Command name as typed in chat, used in log lines.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::Leave => "leave",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::Queue { .. } => "queue",
            Self::Insert { .. } => "insert",
            Self::Insertfront { .. } => "insertfront",
            Self::Next => "next",
            Self::View => "view",
            Self::Shuffle => "shuffle",
            Self::Jumpto { .. } => "jumpto",
            Self::Move { .. } => "move",
            Self::Remove { .. } => "remove",
            Self::Movefront { .. } => "movefront",
            Self::Moveback { .. } => "moveback",
            Self::Replay => "replay",
            Self::Replaynow => "replaynow",
            Self::Loop => "loop",
            Self::Poll => "poll",
            Self::Recommend => "recommend",
            Self::Help => "help",
        }
    }
}

/// `/name - description` for every command.
#[must_use]
pub fn help_text(prefix: &str) -> String {
    ChatLine::command()
        .get_subcommands()
        .map(|cmd| {
            let about = cmd.get_about().map(ToString::to_string).unwrap_or_default();
            format!("{prefix}{} - {about}", cmd.get_name())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rejoin a free-text query split by the parser.
#[must_use]
pub fn join_query(words: &[String]) -> String {
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ChatCommand, String> {
        ChatCommand::parse(content, "/").expect("addressed to bot")
    }

    #[test]
    fn test_messages_without_prefix_are_ignored() {
        assert!(ChatCommand::parse("hello there", "/").is_none());
        assert!(ChatCommand::parse("/", "/").is_none());
        assert!(ChatCommand::parse("   ", "/").is_none());
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("/join"), Ok(ChatCommand::Join));
        assert_eq!(parse("/VIEW"), Ok(ChatCommand::View));
        assert_eq!(parse("  /next  "), Ok(ChatCommand::Next));
    }

    #[test]
    fn test_free_text_query_keeps_every_word() {
        let cmd = parse("/queue never gonna give you up").unwrap();
        let ChatCommand::Queue { query } = cmd else {
            panic!("expected queue");
        };
        assert_eq!(join_query(&query), "never gonna give you up");

        let cmd = parse("/queue help me -rhonda").unwrap();
        let ChatCommand::Queue { query } = cmd else {
            panic!("expected queue");
        };
        assert_eq!(join_query(&query), "help me -rhonda");
    }

    #[test]
    fn test_empty_query_still_parses() {
        assert_eq!(parse("/queue"), Ok(ChatCommand::Queue { query: vec![] }));
    }

    #[test]
    fn test_insert_splits_index_from_query() {
        assert_eq!(
            parse("/insert 2 take on me"),
            Ok(ChatCommand::Insert {
                index: "2".to_string(),
                query: vec!["take".into(), "on".into(), "me".into()],
            })
        );
    }

    #[test]
    fn test_indices_are_kept_raw() {
        assert_eq!(
            parse("/move -1 abc"),
            Ok(ChatCommand::Move {
                src: "-1".to_string(),
                dest: "abc".to_string(),
            })
        );
        assert_eq!(
            parse("/insert -1 take on me"),
            Ok(ChatCommand::Insert {
                index: "-1".to_string(),
                query: vec!["take".to_string(), "on".to_string(), "me".to_string()],
            })
        );
        assert_eq!(
            parse("/jumpto -3"),
            Ok(ChatCommand::Jumpto {
                index: "-3".to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_and_incomplete_commands_report_errors() {
        assert!(parse("/dance").is_err());
        assert!(parse("/remove").is_err());
        assert!(parse("/move 1").is_err());
    }

    #[test]
    fn test_help_lists_commands() {
        let help = help_text("/");
        assert!(help.contains("/queue - Queue a custom song"));
        assert!(help.contains("/recommend"));
        assert!(!help.contains("/enigma-chat"));
    }

    #[test]
    fn test_name_matches_subcommand() {
        assert_eq!(parse("/movefront 2").unwrap().name(), "movefront");
        assert_eq!(parse("/replaynow").unwrap().name(), "replaynow");
    }
}
