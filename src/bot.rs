//! # Bot
//!
//! Turns chat messages, reactions and voice events into [`Reply`]s.
//!
//! The bot owns everything a running instance needs: the playback
//! [`Session`], the voice client, the song catalog, the settings and every
//! open `/poll` or `/recommend` conversation. The front end (the console
//! loop, or a chat gateway) feeds it events and posts whatever comes back.
//!
//! Every reply a command produces is also logged as
//! `ENIGMA (<author> /<command>) <message>`.

use crate::catalog;
use crate::commands::{help_text, join_query, ChatCommand};
use crate::config::BotConfig;
use crate::error::CommandError;
use crate::interaction::{
    Interaction, PollOutcome, PollSession, Reaction, RecommendOutcome, RecommendSession,
};
use crate::recommend::generate_recommendations;
use crate::reply::{color, MessageId, Reply};
use crate::session::Session;
use crate::song::Song;
use crate::voice::Voice;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::time::Instant;

/// An incoming chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub author: String,
    /// Text channel the message was posted in.
    pub channel: String,
    pub content: String,
    /// Voice channel the author is currently sitting in.
    pub author_voice: Option<String>,
}

impl Message {
    #[must_use]
    pub fn new(
        author: impl Into<String>,
        channel: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            channel: channel.into(),
            content: content.into(),
            author_voice: None,
        }
    }

    #[must_use]
    pub fn in_voice(mut self, channel: impl Into<String>) -> Self {
        self.author_voice = Some(channel.into());
        self
    }
}

/// Who a batch of replies answers, and the replies themselves.
struct Context {
    author: String,
    command: &'static str,
    replies: Vec<Reply>,
}

impl Context {
    fn new(author: &str, command: &'static str) -> Self {
        Self {
            author: author.to_string(),
            command,
            replies: Vec::new(),
        }
    }
}

type Handled = Result<(), CommandError>;

pub struct Bot<V: Voice> {
    config: BotConfig,
    session: Session,
    voice: V,
    catalog: Vec<Song>,
    rng: StdRng,
    interactions: HashMap<MessageId, Interaction>,
    last_message_id: MessageId,
    /// Author and command that started the current song. Track-end log lines
    /// are attributed to them.
    requester: Option<(String, &'static str)>,
}

impl<V: Voice> Bot<V> {
    #[must_use]
    pub fn new(config: BotConfig, catalog: Vec<Song>, voice: V) -> Self {
        Self::with_rng(config, catalog, voice, StdRng::from_entropy())
    }

    /// Same as [`Bot::new`] with a caller-supplied RNG, for reproducible polls
    /// and recommendations.
    #[must_use]
    pub fn with_rng(config: BotConfig, catalog: Vec<Song>, voice: V, rng: StdRng) -> Self {
        Self {
            config,
            session: Session::new(),
            voice,
            catalog,
            rng,
            interactions: HashMap::new(),
            last_message_id: 0,
            requester: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn voice(&self) -> &V {
        &self.voice
    }

    #[must_use]
    pub fn catalog(&self) -> &[Song] {
        &self.catalog
    }

    #[must_use]
    pub fn interaction(&self, message_id: MessageId) -> Option<&Interaction> {
        self.interactions.get(&message_id)
    }

    /// Newest open conversation started by `user`.
    #[must_use]
    pub fn latest_interaction(&self, user: &str) -> Option<MessageId> {
        self.interactions
            .values()
            .filter(|interaction| interaction.author() == user)
            .map(Interaction::message_id)
            .max()
    }

    /// Reactions offered under `message_id`, empty once the conversation ended.
    #[must_use]
    pub fn reactions(&self, message_id: MessageId) -> Vec<Reaction> {
        match self.interactions.get(&message_id) {
            Some(Interaction::Poll(poll)) => poll.reactions(),
            Some(Interaction::Recommend(rec)) => rec.reactions(),
            None => Vec::new(),
        }
    }

    /// Earliest point at which [`Bot::expire`] has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.interactions.values().map(Interaction::deadline).min()
    }

    pub fn handle_message(&mut self, message: &Message, now: Instant) -> Vec<Reply> {
        if message.author == self.config.bot_name {
            return Vec::new();
        }
        if message.channel != self.config.command_channel {
            debug!(
                "Ignoring message from {} in #{}",
                message.author, message.channel
            );
            return Vec::new();
        }
        let Some(parsed) = ChatCommand::parse(&message.content, &self.config.command_prefix) else {
            return Vec::new();
        };

        match parsed {
            Ok(command) => {
                debug!("Dispatching /{} from {}", command.name(), message.author);
                let mut ctx = Context::new(&message.author, command.name());
                if let Err(err) = self.dispatch(&mut ctx, command, message, now) {
                    self.log_and_send(&mut ctx, err.to_string());
                }
                ctx.replies
            }
            Err(usage) => {
                warn!(
                    "Could not parse {:?} from {}: {}",
                    message.content,
                    message.author,
                    usage.lines().next().unwrap_or_default()
                );
                vec![Reply::Text {
                    message_id: self.next_id(),
                    text: usage,
                }]
            }
        }
    }

    /// A user reacted to one of the bot's messages.
    pub fn handle_reaction(
        &mut self,
        message_id: MessageId,
        user: &str,
        reaction: Reaction,
        now: Instant,
    ) -> Vec<Reply> {
        let Some(interaction) = self.interactions.remove(&message_id) else {
            debug!("No open conversation on message {message_id}");
            return Vec::new();
        };
        if interaction.author() != user {
            debug!(
                "Ignoring reaction from {user} on a /{} owned by {}",
                interaction.command(),
                interaction.author()
            );
            self.interactions.insert(message_id, interaction);
            return Vec::new();
        }

        let mut ctx = Context::new(user, interaction.command());
        match interaction {
            Interaction::Poll(poll) => self.on_poll_reaction(&mut ctx, poll, reaction, now),
            Interaction::Recommend(rec) => {
                self.on_recommend_reaction(&mut ctx, rec, reaction, now);
            }
        }
        ctx.replies
    }

    /// Close every conversation whose deadline has passed.
    pub fn expire(&mut self, now: Instant) -> Vec<Reply> {
        let mut expired: Vec<MessageId> = self
            .interactions
            .values()
            .filter(|interaction| interaction.deadline() <= now)
            .map(Interaction::message_id)
            .collect();
        expired.sort_unstable();

        let mut replies = Vec::new();
        for message_id in expired {
            let Some(interaction) = self.interactions.remove(&message_id) else {
                continue;
            };
            warn!(
                "/{} from {} on message {message_id} timed out",
                interaction.command(),
                interaction.author()
            );
            let mut ctx = Context::new(interaction.author(), interaction.command());
            match interaction {
                Interaction::Poll(poll) => self.finish_poll(&mut ctx, &poll),
                Interaction::Recommend(_) => {
                    self.log_and_send(&mut ctx, "Timeout occurred. No response received.");
                }
            }
            replies.extend(ctx.replies);
        }
        replies
    }

    /// The current song finished on its own.
    pub fn on_track_end(&mut self) -> Vec<Reply> {
        if !self.session.is_in_use() {
            debug!("Track end with nothing playing");
            return Vec::new();
        }

        let (author, command) = self
            .requester
            .clone()
            .unwrap_or_else(|| (self.config.bot_name.clone(), "next"));
        let mut ctx = Context::new(&author, command);
        self.log_command(&ctx, "Finished playing song");

        let finished = self.session.stop(&mut self.voice);
        if self.voice.is_connected() {
            let outcome = match finished {
                Some(song) if self.session.is_looping() => self.play_song(&mut ctx, song),
                _ if !self.session.queue.is_empty() => self.play_next(&mut ctx),
                _ => Ok(()),
            };
            if let Err(err) = outcome {
                self.log_and_send(&mut ctx, err.to_string());
            }
        }
        ctx.replies
    }

    /// The bot's own voice connection changed.
    ///
    /// Connecting fresh or dropping out stops playback; being moved between
    /// channels pauses it.
    pub fn on_voice_state_update(&mut self, before: Option<&str>, after: Option<&str>) {
        match (before, after) {
            (None, _) | (_, None) => {
                if let Some(song) = self.session.stop(&mut self.voice) {
                    debug!("Voice connection changed, stopped {song}");
                }
            }
            (Some(from), Some(to)) if from != to => {
                debug!("Moved from {from} to {to}, pausing");
                self.session.pause(&mut self.voice);
            }
            _ => {}
        }
    }

    fn dispatch(
        &mut self,
        ctx: &mut Context,
        command: ChatCommand,
        message: &Message,
        now: Instant,
    ) -> Handled {
        match command {
            ChatCommand::Join => self.join(ctx, message.author_voice.as_deref()),
            ChatCommand::Leave => self.leave(ctx),
            ChatCommand::Pause => self.pause(ctx),
            ChatCommand::Unpause => self.unpause(ctx),
            ChatCommand::Queue { query } => {
                let song = ensure_song(&query)?;
                self.session.queue.push(song.clone());
                self.log_and_send(ctx, format!("Queued song: {song}"));
                Ok(())
            }
            ChatCommand::Insert { index, query } => self.insert(ctx, &index, &query),
            ChatCommand::Insertfront { query } => self.insert(ctx, "1", &query),
            ChatCommand::Next => self.next(ctx),
            ChatCommand::View => {
                self.view(ctx);
                Ok(())
            }
            ChatCommand::Shuffle => {
                self.shuffle(ctx);
                Ok(())
            }
            ChatCommand::Jumpto { index } => {
                self.session.queue.jump_to(&index)?;
                self.log_and_send(ctx, format!("Jumped to track number {index} in the queue"));
                Ok(())
            }
            ChatCommand::Move { src, dest } => self.move_track(ctx, &src, &dest),
            ChatCommand::Remove { index } => {
                let removed = self.session.queue.remove(&index)?;
                self.log_and_send(ctx, format!("Removed {removed} (track number {index})"));
                Ok(())
            }
            ChatCommand::Movefront { index } => {
                let moved = self.session.queue.move_to_front(&index)?;
                self.log_and_send(ctx, format!("Moved {moved} from track {index} to track 1"));
                Ok(())
            }
            ChatCommand::Moveback { index } => {
                let last = self.session.queue.len();
                let moved = self.session.queue.move_to_back(&index)?;
                self.log_and_send(
                    ctx,
                    format!("Moved {moved} from track {index} to track {last}"),
                );
                Ok(())
            }
            ChatCommand::Replay => self.replay(ctx),
            ChatCommand::Replaynow => self.replay_now(ctx),
            ChatCommand::Loop => {
                self.toggle_loop(ctx);
                Ok(())
            }
            ChatCommand::Poll => {
                self.poll(ctx, now);
                Ok(())
            }
            ChatCommand::Recommend => {
                self.recommend(ctx, now);
                Ok(())
            }
            ChatCommand::Help => {
                let help = help_text(&self.config.command_prefix);
                self.send(ctx, help);
                self.log_command(ctx, "Acknowledged");
                Ok(())
            }
        }
    }

    fn join(&mut self, ctx: &mut Context, user_channel: Option<&str>) -> Handled {
        let target = user_channel.ok_or(CommandError::UserNotInVoice)?;
        let current = self.voice.channel().map(str::to_owned);

        match current {
            Some(channel) if channel == target => {
                self.log_and_send(ctx, format!("I am already in this voice channel ({target})"));
            }
            Some(channel) => {
                self.voice.move_to(target).map_err(voice_error)?;
                self.on_voice_state_update(Some(&channel), Some(target));
                self.log_and_send(ctx, format!("Switched to voice channel: {target}"));
            }
            None => {
                self.voice.connect(target).map_err(voice_error)?;
                self.on_voice_state_update(None, Some(target));
                self.log_and_send(ctx, format!("Joined voice channel: {target}"));
            }
        }
        Ok(())
    }

    fn leave(&mut self, ctx: &mut Context) -> Handled {
        let channel = self
            .voice
            .channel()
            .map(str::to_owned)
            .ok_or(CommandError::NotConnected)?;

        self.voice.disconnect().map_err(voice_error)?;
        self.on_voice_state_update(Some(&channel), None);
        self.log_and_send(ctx, format!("Left voice channel: {channel}"));
        Ok(())
    }

    fn pause(&mut self, ctx: &mut Context) -> Handled {
        self.ensure_playing()?;
        if self.session.is_paused() {
            self.log_and_send(ctx, "I am already paused");
        } else {
            self.session.pause(&mut self.voice);
            self.log_and_send(ctx, "Pausing music");
        }
        Ok(())
    }

    fn unpause(&mut self, ctx: &mut Context) -> Handled {
        self.ensure_playing()?;
        if self.session.is_paused() {
            self.session.unpause(&mut self.voice);
            self.log_and_send(ctx, "Unpausing music");
        } else {
            self.log_and_send(ctx, "I am already unpaused");
        }
        Ok(())
    }

    fn ensure_playing(&self) -> Handled {
        if !self.voice.is_connected() {
            return Err(CommandError::NotConnected);
        }
        if !self.session.is_in_use() {
            return Err(CommandError::NotPlaying);
        }
        Ok(())
    }

    fn insert(&mut self, ctx: &mut Context, index: &str, query: &[String]) -> Handled {
        let song = ensure_song(query)?;
        self.session.queue.insert(index, song.clone())?;
        self.log_and_send(ctx, format!("Inserted song {song} as track number {index}"));
        Ok(())
    }

    fn move_track(&mut self, ctx: &mut Context, src: &str, dest: &str) -> Handled {
        let moved = self.session.queue.move_track(src, dest)?;
        self.log_and_send(ctx, format!("Moved {moved} from track {src} to track {dest}"));
        Ok(())
    }

    /// Manual skip. Looping is not consulted: the next queued song plays.
    fn next(&mut self, ctx: &mut Context) -> Handled {
        if let Some(skipped) = self.session.stop(&mut self.voice) {
            self.log_command(ctx, &format!("Skipping {skipped}"));
        }
        self.play_next(ctx)
    }

    fn play_next(&mut self, ctx: &mut Context) -> Handled {
        if self.session.queue.is_empty() {
            return Err(CommandError::NothingQueued);
        }
        if !self.voice.is_connected() {
            return Err(CommandError::NotConnected);
        }
        let song = self
            .session
            .queue
            .pop_front()
            .ok_or(CommandError::NothingQueued)?;
        self.play_song(ctx, song)
    }

    fn play_song(&mut self, ctx: &mut Context, song: Song) -> Handled {
        if !self.voice.is_connected() {
            return Err(CommandError::NotConnected);
        }
        if let Some(previous) = self.session.stop(&mut self.voice) {
            self.log_command(ctx, &format!("Terminating current song {previous}"));
        }

        self.voice
            .play(&song)
            .map_err(|err| CommandError::Playback {
                song: song.to_string(),
                reason: format!("{err:#}"),
            })?;
        self.log_and_send(ctx, format!("Now playing: **{song}**"));
        self.session.start(song);
        self.requester = Some((ctx.author.clone(), ctx.command));
        Ok(())
    }

    fn view(&mut self, ctx: &mut Context) {
        let mut msg = self.session.status_line();
        msg.push_str("\n\n");
        if self.session.queue.is_empty() {
            msg.push_str(&CommandError::EmptyQueue.to_string());
        } else {
            msg.push_str("Current Queue:\n");
            msg.push_str(&self.session.queue.render());
        }
        self.send(ctx, msg);
        self.log_command(ctx, "Acknowledged");
    }

    fn shuffle(&mut self, ctx: &mut Context) {
        if self.session.queue.is_empty() {
            self.send(ctx, CommandError::EmptyQueue.to_string());
        } else {
            self.session.queue.shuffle(&mut self.rng);
            self.send(ctx, "Shuffled! Do /view to see the current queue");
        }
        self.log_command(ctx, "Acknowledged");
    }

    fn replay(&mut self, ctx: &mut Context) -> Handled {
        let Some(current) = self.session.current().cloned() else {
            self.log_and_send(ctx, "I am currently not playing any songs");
            return Ok(());
        };
        if self.session.is_looping() {
            self.log_and_send(ctx, "I am already set to loop");
            return Ok(());
        }
        self.session.queue.insert("1", current)?;
        self.log_and_send(
            ctx,
            "Got it, I will add this song to the front of the queue again",
        );
        Ok(())
    }

    fn replay_now(&mut self, ctx: &mut Context) -> Handled {
        let Some(current) = self.session.current().cloned() else {
            self.log_and_send(ctx, "I am currently not playing any songs");
            return Ok(());
        };
        self.log_and_send(ctx, "Got it, I will immediately restart this song");
        self.session.queue.insert("1", current)?;
        self.next(ctx)
    }

    fn toggle_loop(&mut self, ctx: &mut Context) {
        if !self.session.is_in_use() {
            self.log_and_send(ctx, "I am currently not playing any songs");
            return;
        }
        let looping = !self.session.is_looping();
        self.session.set_looping(looping);
        let msg = if looping {
            "Looping enabled"
        } else {
            "Looping disabled"
        };
        self.log_and_send(ctx, msg);
    }

    fn poll(&mut self, ctx: &mut Context, now: Instant) {
        let candidates =
            catalog::sample_by_genre(&self.catalog, self.config.poll_size, &mut self.rng);
        if candidates.is_empty() {
            self.log_and_send(ctx, "No songs to choose from. Import a catalog first.");
            return;
        }

        let max = self.config.poll_max_selections;
        self.log_and_send(
            ctx,
            format!(
                "React with the numbers to the songs you like. You can select up to {max} songs."
            ),
        );

        let message_id = self.next_id();
        let poll = PollSession::new(
            ctx.author.clone(),
            message_id,
            candidates,
            max,
            self.config.poll_timeout(),
            now,
        );
        self.push_embed(ctx, message_id, "Song Selection", poll.listing(), color::GREEN);
        self.interactions.insert(message_id, Interaction::Poll(poll));
    }

    fn on_poll_reaction(
        &mut self,
        ctx: &mut Context,
        mut poll: PollSession,
        reaction: Reaction,
        now: Instant,
    ) {
        match poll.on_reaction(reaction, now) {
            PollOutcome::Ignored => debug!("Ignoring {} on poll", reaction.emoji()),
            PollOutcome::AlreadySelected => {
                debug!("{} already picked {}", ctx.author, reaction.emoji());
            }
            PollOutcome::Selected { song, complete } => {
                self.send_embed(
                    ctx,
                    "Added to Favorites",
                    song.describe(),
                    color::BRIGHT_GREEN,
                );
                self.session.favorites = poll.selected().to_vec();
                if complete {
                    self.finish_poll(ctx, &poll);
                    return;
                }
            }
        }
        self.interactions
            .insert(poll.message_id, Interaction::Poll(poll));
    }

    fn finish_poll(&mut self, ctx: &mut Context, poll: &PollSession) {
        match poll.summary() {
            Some(summary) => {
                self.send_embed(ctx, "Selected Songs", summary, color::GREEN);
            }
            None => self.log_and_send(ctx, "No songs were selected."),
        }
    }

    fn recommend(&mut self, ctx: &mut Context, now: Instant) {
        if self.session.favorites.is_empty() {
            self.send_embed(
                ctx,
                "No Songs Selected",
                "Use /poll to select some songs first.",
                color::RED,
            );
            return;
        }

        let recommendations = self.fresh_recommendations();
        if recommendations.is_empty() {
            self.send_embed(
                ctx,
                "No Recommendations Found",
                "Try different selections.",
                color::RED,
            );
            return;
        }

        let message_id = self.next_id();
        let rec = RecommendSession::new(
            ctx.author.clone(),
            message_id,
            recommendations,
            self.config.recommend_timeout(),
            now,
        );
        self.push_embed(
            ctx,
            message_id,
            "Recommended Songs",
            rec.listing(),
            color::BRIGHT_GREEN,
        );
        self.interactions
            .insert(message_id, Interaction::Recommend(rec));
    }

    fn on_recommend_reaction(
        &mut self,
        ctx: &mut Context,
        mut rec: RecommendSession,
        reaction: Reaction,
        now: Instant,
    ) {
        match rec.on_reaction(reaction, now) {
            RecommendOutcome::Ignored => debug!("Ignoring {} on recommendations", reaction.emoji()),
            RecommendOutcome::Picked(song) => {
                self.session.queue.push(song.clone());
                self.send_embed(ctx, "Song Added", format!("Added {song}"), color::BRIGHT_GREEN);
            }
            RecommendOutcome::Regenerate => {
                let fresh = self.fresh_recommendations();
                if fresh.is_empty() {
                    self.log_and_send(ctx, "No further recommendations found.");
                    return;
                }
                rec.replace(fresh);
                self.log_command(ctx, "New Recommended Songs");
                ctx.replies.push(Reply::Edit {
                    message_id: rec.message_id,
                    title: "New Recommended Songs".to_string(),
                    description: rec.listing(),
                });
            }
            RecommendOutcome::Stop => {
                self.send_embed(
                    ctx,
                    "Ending recommendation session",
                    "Use /recommend command for music recommendation",
                    color::RED,
                );
                return;
            }
        }
        self.interactions
            .insert(rec.message_id, Interaction::Recommend(rec));
    }

    fn fresh_recommendations(&mut self) -> Vec<Song> {
        generate_recommendations(
            &self.session.favorites,
            &self.catalog,
            &self.config.recommend_config(),
            &mut self.rng,
        )
    }

    fn next_id(&mut self) -> MessageId {
        self.last_message_id += 1;
        self.last_message_id
    }

    fn log_command(&self, ctx: &Context, msg: &str) {
        info!(
            "{} ({} /{}) {}",
            self.config.bot_name, ctx.author, ctx.command, msg
        );
    }

    /// Post `text` without logging it.
    fn send(&mut self, ctx: &mut Context, text: impl Into<String>) {
        let message_id = self.next_id();
        ctx.replies.push(Reply::Text {
            message_id,
            text: text.into(),
        });
    }

    fn log_and_send(&mut self, ctx: &mut Context, text: impl Into<String>) {
        let text = text.into();
        self.log_command(ctx, &text);
        self.send(ctx, text);
    }

    fn send_embed(
        &mut self,
        ctx: &mut Context,
        title: &str,
        description: impl Into<String>,
        color: u32,
    ) -> MessageId {
        let message_id = self.next_id();
        self.push_embed(ctx, message_id, title, description, color);
        message_id
    }

    fn push_embed(
        &self,
        ctx: &mut Context,
        message_id: MessageId,
        title: &str,
        description: impl Into<String>,
        color: u32,
    ) {
        self.log_command(ctx, title);
        ctx.replies.push(Reply::Embed {
            message_id,
            title: title.to_string(),
            description: description.into(),
            color,
        });
    }
}

fn ensure_song(query: &[String]) -> Result<Song, CommandError> {
    let query = join_query(query);
    let query = query.trim();
    if query.is_empty() {
        return Err(CommandError::EmptyQuery);
    }
    Ok(Song::new(query))
}

fn voice_error(err: anyhow::Error) -> CommandError {
    CommandError::Voice(format!("{err:#}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::ConsoleVoice;
    use std::time::Duration;

    fn catalog() -> Vec<Song> {
        vec![
            Song::with_details("Song1", "Artist1", "pop"),
            Song::with_details("Song2", "Artist2", "pop"),
            Song::with_details("Song3", "Artist3", "rock"),
            Song::with_details("Song4", "Artist4", "rock"),
            Song::with_details("Song5", "Artist5", "jazz"),
        ]
    }

    fn bot() -> Bot<ConsoleVoice> {
        Bot::with_rng(
            BotConfig::default(),
            catalog(),
            ConsoleVoice::new(),
            StdRng::seed_from_u64(7),
        )
    }

    fn say(bot: &mut Bot<ConsoleVoice>, content: &str) -> Vec<String> {
        let msg = Message::new("alice", "general", content).in_voice("Lounge");
        bot.handle_message(&msg, Instant::now())
            .iter()
            .map(Reply::text)
            .collect()
    }

    #[test]
    fn test_ignores_other_channels_and_itself() {
        let mut bot = bot();
        let elsewhere = Message::new("alice", "random", "/queue a");
        assert!(bot.handle_message(&elsewhere, Instant::now()).is_empty());

        let own = Message::new("ENIGMA", "general", "/queue a");
        assert!(bot.handle_message(&own, Instant::now()).is_empty());

        let chatter = Message::new("alice", "general", "hello");
        assert!(bot.handle_message(&chatter, Instant::now()).is_empty());
        assert!(bot.session().queue.is_empty());
    }

    #[test]
    fn test_join_switch_and_leave() {
        let mut bot = bot();
        let lonely = Message::new("alice", "general", "/join");
        let replies = bot.handle_message(&lonely, Instant::now());
        assert_eq!(
            replies[0].text(),
            "Please join a voice channel before executing /join"
        );

        assert_eq!(say(&mut bot, "/join"), vec!["Joined voice channel: Lounge"]);
        assert_eq!(
            say(&mut bot, "/join"),
            vec!["I am already in this voice channel (Lounge)"]
        );

        let studio = Message::new("alice", "general", "/join").in_voice("Studio");
        let replies = bot.handle_message(&studio, Instant::now());
        assert_eq!(replies[0].text(), "Switched to voice channel: Studio");

        assert_eq!(say(&mut bot, "/leave"), vec!["Left voice channel: Studio"]);
        assert_eq!(
            say(&mut bot, "/leave"),
            vec!["I am currently not connected to a voice channel"]
        );
    }

    #[test]
    fn test_queue_commands() {
        let mut bot = bot();
        assert_eq!(say(&mut bot, "/queue"), vec!["Please enter a song"]);
        assert_eq!(say(&mut bot, "/queue take on me"), vec!["Queued song: take on me"]);
        assert_eq!(
            say(&mut bot, "/insertfront africa"),
            vec!["Inserted song africa as track number 1"]
        );
        assert_eq!(
            say(&mut bot, "/insert 9 hello"),
            vec!["\"9\" is not a valid track number"]
        );
        assert_eq!(
            say(&mut bot, "/insert -1 hello"),
            vec!["\"-1\" is not a valid track number"]
        );
        assert_eq!(
            say(&mut bot, "/insert 0 hello"),
            vec!["\"0\" is not a valid track number"]
        );
        assert_eq!(bot.session().queue.len(), 2);
        assert_eq!(
            say(&mut bot, "/moveback 1"),
            vec!["Moved africa from track 1 to track 2"]
        );
        assert_eq!(
            say(&mut bot, "/remove 1"),
            vec!["Removed take on me (track number 1)"]
        );
        assert_eq!(
            say(&mut bot, "/view"),
            vec!["Currently not playing anything\n\nCurrent Queue:\n1. africa\n"]
        );
    }

    #[test]
    fn test_next_requires_queue_and_connection() {
        let mut bot = bot();
        assert_eq!(say(&mut bot, "/next"), vec!["Please add a song to the queue first"]);

        say(&mut bot, "/queue africa");
        assert_eq!(
            say(&mut bot, "/next"),
            vec!["I am currently not connected to a voice channel"]
        );
        assert_eq!(bot.session().queue.len(), 1);

        say(&mut bot, "/join");
        assert_eq!(say(&mut bot, "/next"), vec!["Now playing: **africa**"]);
        assert_eq!(bot.voice().playing(), Some(&Song::new("africa")));
        assert!(bot.session().queue.is_empty());
    }

    #[test]
    fn test_pause_unpause_messages() {
        let mut bot = bot();
        assert_eq!(
            say(&mut bot, "/pause"),
            vec!["I am currently not connected to a voice channel"]
        );
        say(&mut bot, "/join");
        assert_eq!(say(&mut bot, "/pause"), vec!["I am currently not playing anything"]);

        say(&mut bot, "/queue africa");
        say(&mut bot, "/next");
        assert_eq!(say(&mut bot, "/pause"), vec!["Pausing music"]);
        assert_eq!(say(&mut bot, "/pause"), vec!["I am already paused"]);
        assert_eq!(say(&mut bot, "/unpause"), vec!["Unpausing music"]);
        assert_eq!(say(&mut bot, "/unpause"), vec!["I am already unpaused"]);
    }

    #[test]
    fn test_looping_replays_finished_song() {
        let mut bot = bot();
        say(&mut bot, "/join");
        say(&mut bot, "/queue africa");
        say(&mut bot, "/queue hello");
        say(&mut bot, "/next");
        assert_eq!(say(&mut bot, "/loop"), vec!["Looping enabled"]);
        assert_eq!(say(&mut bot, "/replay"), vec!["I am already set to loop"]);

        let replies = bot.on_track_end();
        assert_eq!(replies[0].text(), "Now playing: **africa**");
        assert_eq!(bot.session().queue.len(), 1);

        assert_eq!(say(&mut bot, "/loop"), vec!["Looping disabled"]);
        let replies = bot.on_track_end();
        assert_eq!(replies[0].text(), "Now playing: **hello**");

        assert!(bot.on_track_end().is_empty());
        assert!(!bot.session().is_in_use());
    }

    #[test]
    fn test_replaynow_restarts_current_song() {
        let mut bot = bot();
        say(&mut bot, "/join");
        say(&mut bot, "/queue africa");
        say(&mut bot, "/queue hello");
        say(&mut bot, "/next");

        assert_eq!(
            say(&mut bot, "/replaynow"),
            vec![
                "Got it, I will immediately restart this song",
                "Now playing: **africa**"
            ]
        );
        assert_eq!(bot.session().queue.len(), 1);
    }

    #[test]
    fn test_moving_channels_pauses_and_leaving_stops() {
        let mut bot = bot();
        say(&mut bot, "/join");
        say(&mut bot, "/queue africa");
        say(&mut bot, "/next");

        bot.on_voice_state_update(Some("Lounge"), Some("Studio"));
        assert!(bot.session().is_paused());

        bot.on_voice_state_update(Some("Studio"), None);
        assert!(!bot.session().is_in_use());
    }

    #[test]
    fn test_parse_errors_are_replied() {
        let mut bot = bot();
        let replies = say(&mut bot, "/dance");
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("dance"));
    }

    #[test]
    fn test_poll_then_recommend() {
        let mut bot = bot();
        let now = Instant::now();
        let msg = Message::new("alice", "general", "/poll");
        let replies = bot.handle_message(&msg, now);
        assert_eq!(
            replies[0].text(),
            "React with the numbers to the songs you like. You can select up to 3 songs."
        );
        let poll_id = replies[1].message_id();
        let Some(Interaction::Poll(poll)) = bot.interaction(poll_id) else {
            panic!("poll should be open");
        };
        // one candidate per genre
        assert_eq!(poll.candidates().len(), 3);

        // someone else cannot vote
        assert!(bot
            .handle_reaction(poll_id, "bob", Reaction::Number(0), now)
            .is_empty());

        for i in 0..3 {
            bot.handle_reaction(poll_id, "alice", Reaction::Number(i), now);
        }
        assert!(bot.interaction(poll_id).is_none());
        assert_eq!(bot.session().favorites.len(), 3);

        let replies = bot.handle_message(&Message::new("alice", "general", "/recommend"), now);
        assert_eq!(replies.len(), 1);
        let Reply::Embed { title, .. } = &replies[0] else {
            panic!("expected embed");
        };
        assert_eq!(title, "Recommended Songs");

        let rec_id = replies[0].message_id();
        let added = bot.handle_reaction(rec_id, "alice", Reaction::Number(0), now);
        assert!(added[0].text().starts_with("Song Added\nAdded "));
        assert_eq!(bot.session().queue.len(), 1);

        let stopped = bot.handle_reaction(rec_id, "alice", Reaction::Stop, now);
        assert!(stopped[0].text().starts_with("Ending recommendation session"));
        assert!(bot.interaction(rec_id).is_none());
    }

    #[test]
    fn test_recommend_without_favorites() {
        let mut bot = bot();
        let replies = say(&mut bot, "/recommend");
        assert_eq!(
            replies,
            vec!["No Songs Selected\nUse /poll to select some songs first."]
        );
    }

    /// Open a poll and pick only the candidate from `genre`.
    fn pick_from_poll(bot: &mut Bot<ConsoleVoice>, genre: &str, now: Instant) -> MessageId {
        let replies = bot.handle_message(&Message::new("alice", "general", "/poll"), now);
        let poll_id = replies[1].message_id();
        let Some(Interaction::Poll(poll)) = bot.interaction(poll_id) else {
            panic!("poll should be open");
        };
        let index = poll
            .candidates()
            .iter()
            .position(|song| song.genre.as_deref() == Some(genre))
            .unwrap();
        bot.handle_reaction(poll_id, "alice", Reaction::Number(index), now);
        poll_id
    }

    #[test]
    fn test_recommend_with_no_matches() {
        let mut bot = bot();
        let now = Instant::now();
        // the only jazz song is the pick itself
        pick_from_poll(&mut bot, "jazz", now);
        assert_eq!(
            bot.session().favorites,
            vec![Song::with_details("Song5", "Artist5", "jazz")]
        );

        let replies = bot.handle_message(&Message::new("alice", "general", "/recommend"), now);
        assert_eq!(replies.len(), 1);
        assert_eq!(
            replies[0].text(),
            "No Recommendations Found\nTry different selections."
        );
        assert!(bot.reactions(replies[0].message_id()).is_empty());
    }

    #[test]
    fn test_new_recommendations_edit_or_end_session() {
        let mut bot = bot();
        let now = Instant::now();
        pick_from_poll(&mut bot, "pop", now);

        let replies = bot.handle_message(&Message::new("alice", "general", "/recommend"), now);
        let rec_id = replies[0].message_id();
        assert!(replies[0].text().contains("Song2 by Artist2"));

        let edited = bot.handle_reaction(rec_id, "alice", Reaction::New, now);
        assert!(matches!(
            &edited[0],
            Reply::Edit { message_id, title, .. }
                if *message_id == rec_id && title == "New Recommended Songs"
        ));
        assert!(bot.interaction(rec_id).is_some());

        // favorites change under the open session and leave nothing to suggest
        pick_from_poll(&mut bot, "jazz", now);
        let replies = bot.handle_reaction(rec_id, "alice", Reaction::New, now);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].text(), "No further recommendations found.");
        assert!(bot.interaction(rec_id).is_none());
    }

    #[test]
    fn test_track_end_after_leaving_plays_nothing() {
        let mut bot = bot();
        say(&mut bot, "/join");
        say(&mut bot, "/queue africa");
        say(&mut bot, "/queue hello");
        say(&mut bot, "/next");
        say(&mut bot, "/leave");

        assert!(bot.on_track_end().is_empty());
        assert!(bot.voice().playing().is_none());
        assert!(!bot.session().is_in_use());
        assert_eq!(bot.session().queue.len(), 1);
    }

    #[test]
    fn test_poll_timeout_summarizes() {
        let mut bot = bot();
        let start = Instant::now();
        let replies = bot.handle_message(&Message::new("alice", "general", "/poll"), start);
        let poll_id = replies[1].message_id();
        assert_eq!(bot.next_deadline(), Some(start + Duration::from_secs(60)));

        assert!(bot.expire(start + Duration::from_secs(59)).is_empty());
        let replies = bot.expire(start + Duration::from_secs(60));
        assert_eq!(replies[0].text(), "No songs were selected.");
        assert!(bot.interaction(poll_id).is_none());
        assert!(bot.next_deadline().is_none());
    }
}
