//! Reaction-driven conversations.
//!
//! `/poll` and `/recommend` post a numbered list and then wait for the author
//! to react. Each open conversation is a small state machine owned by the bot,
//! keyed by the id of the message users react to. Timeouts are explicit: every
//! session carries a deadline that the front end checks with
//! [`crate::bot::Bot::expire`]. An accepted reaction pushes the deadline back
//! by the full timeout again.

use crate::reply::MessageId;
use crate::song::Song;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Keycap emojis used to number list entries.
pub const NUMBER_EMOJIS: [&str; 10] = [
    "1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟",
];
pub const NEW_EMOJI: &str = "🆕";
pub const STOP_EMOJI: &str = "⏹️";

lazy_static::lazy_static! {
    /// Every accepted spelling of a reaction: emoji, digit, or keyword.
    static ref REACTIONS: HashMap<String, Reaction> = {
        let mut map = HashMap::new();
        for (i, emoji) in NUMBER_EMOJIS.iter().enumerate() {
            map.insert((*emoji).to_string(), Reaction::Number(i));
            map.insert((i + 1).to_string(), Reaction::Number(i));
        }
        for (spelling, reaction) in [
            (NEW_EMOJI, Reaction::New),
            ("new", Reaction::New),
            (STOP_EMOJI, Reaction::Stop),
            ("⏹", Reaction::Stop),
            ("stop", Reaction::Stop),
        ] {
            map.insert(spelling.to_string(), reaction);
        }
        map
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// 0-based list position.
    Number(usize),
    New,
    Stop,
}

impl Reaction {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        REACTIONS.get(raw.trim().to_lowercase().as_str()).copied()
    }

    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Number(i) => NUMBER_EMOJIS.get(i).copied().unwrap_or("?"),
            Self::New => NEW_EMOJI,
            Self::Stop => STOP_EMOJI,
        }
    }
}

/// Render `songs` as `<emoji><sep><description>` lines.
fn numbered(songs: &[Song], separator: &str) -> String {
    songs
        .iter()
        .zip(NUMBER_EMOJIS)
        .map(|(song, emoji)| format!("{emoji}{separator}{}", song.describe()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Not a number reaction, or outside the list.
    Ignored,
    AlreadySelected,
    Selected { song: Song, complete: bool },
}

/// Waiting for the author to pick favorites out of a genre sample.
#[derive(Debug, Clone)]
pub struct PollSession {
    pub author: String,
    pub message_id: MessageId,
    candidates: Vec<Song>,
    selected: Vec<Song>,
    max_selections: usize,
    timeout: Duration,
    deadline: Instant,
}

impl PollSession {
    #[must_use]
    pub fn new(
        author: impl Into<String>,
        message_id: MessageId,
        candidates: Vec<Song>,
        max_selections: usize,
        timeout: Duration,
        now: Instant,
    ) -> Self {
        Self {
            author: author.into(),
            message_id,
            candidates,
            selected: Vec::new(),
            max_selections,
            timeout,
            deadline: now + timeout,
        }
    }

    #[must_use]
    pub fn candidates(&self) -> &[Song] {
        &self.candidates
    }

    #[must_use]
    pub fn selected(&self) -> &[Song] {
        &self.selected
    }

    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.selected.len() >= self.max_selections
    }

    /// Reactions the bot adds under the poll message.
    #[must_use]
    pub fn reactions(&self) -> Vec<Reaction> {
        (0..self.candidates.len().min(NUMBER_EMOJIS.len()))
            .map(Reaction::Number)
            .collect()
    }

    /// `1️⃣ - Track by Artist (genre)` lines.
    #[must_use]
    pub fn listing(&self) -> String {
        numbered(&self.candidates, " - ")
    }

    pub fn on_reaction(&mut self, reaction: Reaction, now: Instant) -> PollOutcome {
        let Reaction::Number(index) = reaction else {
            return PollOutcome::Ignored;
        };
        let Some(song) = self.candidates.get(index) else {
            return PollOutcome::Ignored;
        };
        if self.is_complete() {
            return PollOutcome::Ignored;
        }

        self.deadline = now + self.timeout;
        if self.selected.iter().any(|s| s.track_name == song.track_name) {
            return PollOutcome::AlreadySelected;
        }

        self.selected.push(song.clone());
        PollOutcome::Selected {
            song: song.clone(),
            complete: self.is_complete(),
        }
    }

    /// Track names of the picks, joined the way the summary embed shows them.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        if self.selected.is_empty() {
            return None;
        }
        Some(
            self.selected
                .iter()
                .map(|song| song.track_name.as_str())
                .collect::<Vec<_>>()
                .join(" , "),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendOutcome {
    Ignored,
    Picked(Song),
    Regenerate,
    Stop,
}

/// Waiting for the author to queue recommended songs, ask for new ones, or stop.
#[derive(Debug, Clone)]
pub struct RecommendSession {
    pub author: String,
    pub message_id: MessageId,
    recommendations: Vec<Song>,
    timeout: Duration,
    deadline: Instant,
}

impl RecommendSession {
    #[must_use]
    pub fn new(
        author: impl Into<String>,
        message_id: MessageId,
        recommendations: Vec<Song>,
        timeout: Duration,
        now: Instant,
    ) -> Self {
        Self {
            author: author.into(),
            message_id,
            recommendations,
            timeout,
            deadline: now + timeout,
        }
    }

    #[must_use]
    pub fn recommendations(&self) -> &[Song] {
        &self.recommendations
    }

    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Numbers for each song, then the two controls.
    #[must_use]
    pub fn reactions(&self) -> Vec<Reaction> {
        (0..self.recommendations.len().min(NUMBER_EMOJIS.len()))
            .map(Reaction::Number)
            .chain([Reaction::New, Reaction::Stop])
            .collect()
    }

    /// `1️⃣ Track by Artist (genre)` lines.
    #[must_use]
    pub fn listing(&self) -> String {
        numbered(&self.recommendations, " ")
    }

    pub fn on_reaction(&mut self, reaction: Reaction, now: Instant) -> RecommendOutcome {
        let outcome = match reaction {
            Reaction::Number(index) => match self.recommendations.get(index) {
                Some(song) => RecommendOutcome::Picked(song.clone()),
                None => return RecommendOutcome::Ignored,
            },
            Reaction::New => RecommendOutcome::Regenerate,
            Reaction::Stop => RecommendOutcome::Stop,
        };
        self.deadline = now + self.timeout;
        outcome
    }

    /// Swap in a fresh list after a `New` reaction.
    pub fn replace(&mut self, recommendations: Vec<Song>) {
        self.recommendations = recommendations;
    }
}

/// Any open conversation.
#[derive(Debug, Clone)]
pub enum Interaction {
    Poll(PollSession),
    Recommend(RecommendSession),
}

impl Interaction {
    #[must_use]
    pub fn author(&self) -> &str {
        match self {
            Self::Poll(poll) => &poll.author,
            Self::Recommend(rec) => &rec.author,
        }
    }

    #[must_use]
    pub fn message_id(&self) -> MessageId {
        match self {
            Self::Poll(poll) => poll.message_id,
            Self::Recommend(rec) => rec.message_id,
        }
    }

    #[must_use]
    pub fn deadline(&self) -> Instant {
        match self {
            Self::Poll(poll) => poll.deadline(),
            Self::Recommend(rec) => rec.deadline(),
        }
    }

    /// Name of the command that opened it, for log lines.
    #[must_use]
    pub fn command(&self) -> &'static str {
        match self {
            Self::Poll(_) => "poll",
            Self::Recommend(_) => "recommend",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn songs(n: usize) -> Vec<Song> {
        (1..=n)
            .map(|i| Song::with_details(format!("Song{i}"), format!("Artist{i}"), "pop"))
            .collect()
    }

    #[test]
    fn test_reaction_parsing() {
        assert_eq!(Reaction::parse("1️⃣"), Some(Reaction::Number(0)));
        assert_eq!(Reaction::parse("🔟"), Some(Reaction::Number(9)));
        assert_eq!(Reaction::parse(" 3 "), Some(Reaction::Number(2)));
        assert_eq!(Reaction::parse("NEW"), Some(Reaction::New));
        assert_eq!(Reaction::parse("⏹️"), Some(Reaction::Stop));
        assert_eq!(Reaction::parse("11"), None);
        assert_eq!(Reaction::parse("👍"), None);
        assert_eq!(Reaction::Number(1).emoji(), "2️⃣");
    }

    #[test]
    fn test_poll_collects_up_to_three_distinct_songs() {
        let now = Instant::now();
        let mut poll = PollSession::new("alice", 1, songs(10), 3, Duration::from_secs(60), now);

        assert!(matches!(
            poll.on_reaction(Reaction::Number(0), now),
            PollOutcome::Selected { complete: false, .. }
        ));
        assert_eq!(
            poll.on_reaction(Reaction::Number(0), now),
            PollOutcome::AlreadySelected
        );
        assert_eq!(poll.on_reaction(Reaction::Stop, now), PollOutcome::Ignored);
        assert_eq!(
            poll.on_reaction(Reaction::Number(4), now),
            PollOutcome::Selected {
                song: Song::with_details("Song5", "Artist5", "pop"),
                complete: false,
            }
        );
        assert!(matches!(
            poll.on_reaction(Reaction::Number(9), now),
            PollOutcome::Selected { complete: true, .. }
        ));

        assert!(poll.is_complete());
        assert_eq!(poll.on_reaction(Reaction::Number(1), now), PollOutcome::Ignored);
        assert_eq!(poll.summary().as_deref(), Some("Song1 , Song5 , Song10"));
    }

    #[test]
    fn test_poll_ignores_reactions_past_the_list() {
        let now = Instant::now();
        let mut poll = PollSession::new("alice", 1, songs(4), 3, Duration::from_secs(60), now);
        assert_eq!(poll.on_reaction(Reaction::Number(6), now), PollOutcome::Ignored);
        assert_eq!(poll.reactions().len(), 4);
        assert!(poll.summary().is_none());
    }

    #[test]
    fn test_accepted_reaction_extends_deadline() {
        let start = Instant::now();
        let timeout = Duration::from_secs(60);
        let mut poll = PollSession::new("alice", 1, songs(3), 3, timeout, start);
        assert_eq!(poll.deadline(), start + timeout);

        let later = start + Duration::from_secs(30);
        poll.on_reaction(Reaction::Number(0), later);
        assert_eq!(poll.deadline(), later + timeout);
    }

    #[test]
    fn test_poll_listing() {
        let poll = PollSession::new(
            "alice",
            1,
            songs(2),
            3,
            Duration::from_secs(60),
            Instant::now(),
        );
        assert_eq!(
            poll.listing(),
            "1️⃣ - Song1 by Artist1 (pop)\n2️⃣ - Song2 by Artist2 (pop)"
        );
    }

    #[test]
    fn test_recommend_session_outcomes() {
        let now = Instant::now();
        let mut rec = RecommendSession::new("bob", 2, songs(2), Duration::from_secs(300), now);

        assert_eq!(
            rec.on_reaction(Reaction::Number(1), now),
            RecommendOutcome::Picked(Song::with_details("Song2", "Artist2", "pop"))
        );
        assert_eq!(rec.on_reaction(Reaction::Number(2), now), RecommendOutcome::Ignored);
        assert_eq!(rec.on_reaction(Reaction::New, now), RecommendOutcome::Regenerate);
        assert_eq!(rec.on_reaction(Reaction::Stop, now), RecommendOutcome::Stop);

        rec.replace(songs(1));
        assert_eq!(rec.recommendations().len(), 1);
        assert_eq!(
            rec.reactions(),
            vec![Reaction::Number(0), Reaction::New, Reaction::Stop]
        );
        assert_eq!(rec.listing(), "1️⃣ Song1 by Artist1 (pop)");
    }
}
