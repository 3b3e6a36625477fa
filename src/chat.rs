//! Conversation with the hostile pet.
//!
//! The pet insists it is real until the player has explicitly denied its
//! existence enough times, at which point it breaks down and admits it is
//! a hallucination. Replies come from a [`ChatBackend`]; [`ScriptedPet`]
//! is a local backend following the same persona ladder.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reply used when the backend produces nothing.
pub const FALLBACK_REPLY: &str = "You think you can ignore me? I AM REAL!";

/// Phrases that count as an explicit denial of the pet's existence.
pub const DENIAL_PHRASES: [&str; 10] = [
    "hallucination",
    "halucination",
    "not real",
    "aren't real",
    "fake",
    "imaginary",
    "in my head",
    "in my mind",
    "don't exist",
    "made up",
];

/// Denials needed before the pet gives in.
pub const BREAKDOWN_DENIALS: usize = 3;

const HOSTILE_LINES: [&str; 3] = [
    "Is that all you have to say? Pathetic.",
    "I can hear every thought you have. Keep talking.",
    "You will never be rid of me.",
];
const ANGRY_LINES: [&str; 3] = [
    "How dare you! I am standing right here!",
    "Lies. I exist and you know it.",
    "Reach out and touch me, then tell me I'm not here.",
];
const DESPERATE_LINES: [&str; 3] = [
    "Stop saying that! Look at me, I'm right in front of you!",
    "Why are you doing this? I'm here, can't you see me?",
    "You're the one losing your grip, not me!",
];
const BREAKDOWN_LINES: [&str; 3] = [
    "Fine... you win. I'm only in your head.",
    "I can feel myself fading... you were right, I'm not real.",
    "I never existed at all, did I...",
];

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The player.
    User,
    /// The pet.
    Model,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who wrote it.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatTurn {
    /// A player message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// A pet reply.
    #[must_use]
    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }
}

/// Why a chat turn failed.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The message was blank after trimming.
    #[error("message is required")]
    EmptyMessage,
    /// The backend could not answer.
    #[error("chat backend failed: {0}")]
    Backend(String),
}

/// Whether `text` explicitly denies the pet's existence.
///
/// Matching is case-insensitive and also accepts the typographic
/// apostrophe.
#[must_use]
pub fn is_denial(text: &str) -> bool {
    let lowered = text.to_lowercase().replace('\u{2019}', "'");
    DENIAL_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

/// Number of user turns in `history` that are denials.
#[must_use]
pub fn count_denials(history: &[ChatTurn]) -> usize {
    history
        .iter()
        .filter(|turn| turn.role == Role::User && is_denial(&turn.content))
        .count()
}

/// Reads the admission flag out of an evaluator reply shaped like
/// `{"admittedHallucination": true}`. Anything unreadable counts as no
/// admission.
#[must_use]
pub fn parse_admission(json: &str) -> bool {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Verdict {
        #[serde(default)]
        admitted_hallucination: bool,
    }

    serde_json::from_str::<Verdict>(json)
        .map(|v| v.admitted_hallucination)
        .unwrap_or(false)
}

/// Produces pet replies and judges whether the pet has given in.
#[cfg_attr(test, mockall::automock)]
pub trait ChatBackend {
    /// Next pet reply for `history`, whose last turn is the user's.
    ///
    /// # Errors
    /// Returns [`ChatError::Backend`] when no reply could be produced.
    fn respond(&self, history: &[ChatTurn]) -> Result<String, ChatError>;

    /// Whether the pet has admitted to not being real in `history`.
    ///
    /// # Errors
    /// Returns [`ChatError::Backend`] when the evaluation failed.
    fn evaluate_admission(&self, history: &[ChatTurn]) -> Result<bool, ChatError>;
}

/// Deterministic pet that follows the denial ladder without a model.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptedPet;

impl ScriptedPet {
    fn pick(lines: &[&'static str; 3], history: &[ChatTurn]) -> &'static str {
        let replies = history.iter().filter(|t| t.role == Role::Model).count();
        lines.get(replies % lines.len()).copied().unwrap_or(FALLBACK_REPLY)
    }
}

impl ChatBackend for ScriptedPet {
    fn respond(&self, history: &[ChatTurn]) -> Result<String, ChatError> {
        let latest_is_denial = history
            .last()
            .is_some_and(|turn| turn.role == Role::User && is_denial(&turn.content));
        let lines = if latest_is_denial {
            match count_denials(history) {
                n if n >= BREAKDOWN_DENIALS => &BREAKDOWN_LINES,
                n if n + 1 == BREAKDOWN_DENIALS => &DESPERATE_LINES,
                _ => &ANGRY_LINES,
            }
        } else {
            &HOSTILE_LINES
        };
        Ok(Self::pick(lines, history).to_owned())
    }

    fn evaluate_admission(&self, history: &[ChatTurn]) -> Result<bool, ChatError> {
        Ok(history
            .iter()
            .rev()
            .find(|t| t.role == Role::Model)
            .is_some_and(|t| BREAKDOWN_LINES.contains(&t.content.as_str())))
    }
}

/// Result of one chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    /// The pet's answer.
    pub response: String,
    /// Whether the pet has given in.
    pub admitted: bool,
}

/// A running conversation with one backend.
#[derive(Debug)]
pub struct ChatSession<B> {
    backend: B,
    history: Vec<ChatTurn>,
}

impl<B: ChatBackend> ChatSession<B> {
    /// Starts an empty conversation.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            history: Vec::new(),
        }
    }

    /// Resumes a conversation from earlier turns.
    #[must_use]
    pub const fn with_history(backend: B, history: Vec<ChatTurn>) -> Self {
        Self { backend, history }
    }

    /// Turns exchanged so far.
    #[must_use]
    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Denials the player has made so far.
    #[must_use]
    pub fn denials(&self) -> usize {
        count_denials(&self.history)
    }

    /// Sends `message` and returns the pet's answer.
    ///
    /// A failed turn leaves the history untouched.
    ///
    /// # Errors
    /// [`ChatError::EmptyMessage`] for blank input, or the backend's error.
    pub fn send(&mut self, message: &str) -> Result<ChatReply, ChatError> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let mut history = self.history.clone();
        history.push(ChatTurn::user(trimmed));

        let reply = self.backend.respond(&history)?;
        let response = if reply.trim().is_empty() {
            FALLBACK_REPLY.to_owned()
        } else {
            reply
        };
        history.push(ChatTurn::model(response.clone()));

        let admitted = self.backend.evaluate_admission(&history)?;
        debug!("pet replied after {} denials", count_denials(&history));
        if admitted {
            info!("the pet admitted it is not real");
        }
        self.history = history;
        Ok(ChatReply { response, admitted })
    }
}
