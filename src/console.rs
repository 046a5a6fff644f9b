//! # Console Front End
//!
//! Runs a [`Bot`] against stdin/stdout so it can be used without a chat
//! service. Lines beginning with the command prefix are posted as chat
//! messages from the console user; everything that is not a message in chat
//! is typed as a directive:
//!
//! | Directive                  | Meaning                                         |
//! |----------------------------|-------------------------------------------------|
//! | `+<reaction>`              | react to your newest open poll/recommendation   |
//! | `!react <id> <reaction>`   | react to message `<id>`                         |
//! | `!end`                     | the current song finished playing               |
//! | `!user <name>`             | switch the user you post as                     |
//! | `!voice <channel \| none>` | move the user into a voice channel, or out      |
//! | `!channel <name>`          | switch the text channel you post in             |
//! | `!help`                    | show this table                                 |
//! | `!quit`                    | exit                                            |
//!
//! Reactions are numbers (`1`..`10`), keycap emojis, `new` or `stop`.
//!
//! Stdin is read on its own thread and forwarded over a channel; the main
//! loop waits at most until the nearest conversation deadline so timeouts
//! fire even while nobody types.

use crate::bot::{Bot, Message};
use crate::interaction::Reaction;
use crate::reply::{MessageId, Reply};
use crate::voice::Voice;
use anyhow::{Context as _, Result};
use log::{debug, warn};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

const DIRECTIVES: &str = "\
+<reaction>              react to your newest open poll/recommendation
!react <id> <reaction>   react to message <id>
!end                     the current song finished playing
!user <name>             switch the user you post as
!voice <channel|none>    move into a voice channel, or out
!channel <name>          switch the text channel you post in
!quit                    exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Say(String),
    /// `None` targets the newest open conversation of the current user.
    React {
        message_id: Option<MessageId>,
        reaction: Reaction,
    },
    TrackEnd,
    User(String),
    Voice(Option<String>),
    Channel(String),
    Help,
    Quit,
    /// Malformed directive, with the reason.
    Invalid(String),
}

impl Directive {
    /// Parse one console line. Blank lines yield `None`.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(raw) = line.strip_prefix('+') {
            return Some(match Reaction::parse(raw) {
                Some(reaction) => Self::React {
                    message_id: None,
                    reaction,
                },
                None => Self::Invalid(format!("Unknown reaction {raw:?}")),
            });
        }

        let Some(directive) = line.strip_prefix('!') else {
            return Some(Self::Say(line.to_string()));
        };
        let (name, rest) = directive
            .split_once(char::is_whitespace)
            .map_or((directive, ""), |(name, rest)| (name, rest.trim()));

        Some(match (name, rest) {
            ("end", _) => Self::TrackEnd,
            ("help", _) => Self::Help,
            ("quit" | "exit", _) => Self::Quit,
            ("user" | "channel", "") => Self::Invalid(format!("Usage: !{name} <name>")),
            ("user", name) => Self::User(name.to_string()),
            ("channel", name) => Self::Channel(name.to_string()),
            ("voice", "" | "none") => Self::Voice(None),
            ("voice", channel) => Self::Voice(Some(channel.to_string())),
            ("react", args) => parse_react(args),
            _ => Self::Invalid(format!("Unknown directive !{name}. Try !help")),
        })
    }
}

fn parse_react(args: &str) -> Directive {
    let mut parts = args.split_whitespace();
    let (Some(id), Some(raw)) = (parts.next(), parts.next()) else {
        return Directive::Invalid("Usage: !react <message-id> <reaction>".to_string());
    };
    let Ok(message_id) = id.trim_start_matches('#').parse::<MessageId>() else {
        return Directive::Invalid(format!("{id:?} is not a message id"));
    };
    match Reaction::parse(raw) {
        Some(reaction) => Directive::React {
            message_id: Some(message_id),
            reaction,
        },
        None => Directive::Invalid(format!("Unknown reaction {raw:?}")),
    }
}

/// Who is typing at the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleUser {
    pub name: String,
    pub channel: String,
    pub voice: Option<String>,
}

/// What the loop should do after a directive.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Continue(Vec<Reply>),
    /// Text for the console only; nothing was posted.
    Notice(String),
    Quit,
}

pub struct Console {
    user: ConsoleUser,
}

impl Console {
    #[must_use]
    pub fn new(user: ConsoleUser) -> Self {
        Self { user }
    }

    #[must_use]
    pub fn user(&self) -> &ConsoleUser {
        &self.user
    }

    pub fn apply<V: Voice>(
        &mut self,
        bot: &mut Bot<V>,
        directive: Directive,
        now: Instant,
    ) -> Step {
        match directive {
            Directive::Say(content) => {
                let mut message =
                    Message::new(self.user.name.as_str(), self.user.channel.as_str(), content);
                message.author_voice = self.user.voice.clone();
                Step::Continue(bot.handle_message(&message, now))
            }
            Directive::React {
                message_id,
                reaction,
            } => {
                let Some(message_id) =
                    message_id.or_else(|| bot.latest_interaction(&self.user.name))
                else {
                    return Step::Notice(format!("{} has nothing to react to", self.user.name));
                };
                Step::Continue(bot.handle_reaction(message_id, &self.user.name, reaction, now))
            }
            Directive::TrackEnd => Step::Continue(bot.on_track_end()),
            Directive::User(name) => {
                self.user.name = name;
                Step::Notice(format!("Posting as {}", self.user.name))
            }
            Directive::Channel(channel) => {
                self.user.channel = channel;
                Step::Notice(format!("Posting in #{}", self.user.channel))
            }
            Directive::Voice(channel) => {
                self.user.voice = channel;
                Step::Notice(match &self.user.voice {
                    Some(channel) => format!("{} joined voice channel {channel}", self.user.name),
                    None => format!("{} left voice", self.user.name),
                })
            }
            Directive::Help => Step::Notice(DIRECTIVES.to_string()),
            Directive::Invalid(reason) => Step::Notice(reason),
            Directive::Quit => Step::Quit,
        }
    }
}

/// Print replies, listing the reactions still accepted under each message.
pub fn render<V: Voice>(bot: &Bot<V>, replies: &[Reply], out: &mut dyn Write) -> io::Result<()> {
    for reply in replies {
        writeln!(out, "{reply}")?;
        let reactions = bot.reactions(reply.message_id());
        if !reactions.is_empty() {
            let emojis: Vec<&str> = reactions.iter().map(|r| r.emoji()).collect();
            writeln!(out, "  react with: {}", emojis.join(" "))?;
        }
    }
    out.flush()
}

/// Read stdin until EOF or `!quit`, driving `bot`.
pub fn run<V: Voice>(bot: &mut Bot<V>, user: ConsoleUser) -> Result<()> {
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!("Failed to read stdin: {err}");
                    break;
                }
            }
        }
    });

    let mut console = Console::new(user);
    let mut stdout = io::stdout();
    writeln!(
        stdout,
        "Posting as {} in #{}. Type {}help for commands, !help for directives.",
        console.user().name,
        console.user().channel,
        bot.config().command_prefix
    )?;

    loop {
        let line = match bot.next_deadline() {
            Some(deadline) => {
                match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(line) => Some(line),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match rx.recv() {
                Ok(line) => Some(line),
                Err(_) => break,
            },
        };

        let now = Instant::now();
        let expired = bot.expire(now);
        render(bot, &expired, &mut stdout).context("Failed to write to stdout")?;

        let Some(directive) = line.as_deref().and_then(Directive::parse) else {
            continue;
        };
        debug!("Console directive: {directive:?}");
        match console.apply(bot, directive, now) {
            Step::Continue(replies) => {
                render(bot, &replies, &mut stdout).context("Failed to write to stdout")?;
            }
            Step::Notice(text) => writeln!(stdout, "{text}")?,
            Step::Quit => break,
        }
    }
    Ok(())
}
