//! Admin mode: the passphrase gate and the question editor form.
//!
//! The gate is a convenience switch that hides authoring controls from
//! casual users. It compares a plain shared string and is not a security
//! boundary: anyone with access to the config or the binary can read it.

use crate::models::{Question, QuestionDraft};
use crate::transcript;

pub const DEFAULT_ADMIN_PASSPHRASE: &str = "listen-admin";

#[derive(Debug, Clone)]
pub struct AdminGate {
    passphrase: String,
    unlocked: bool,
}

impl AdminGate {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
            unlocked: false,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Unlock when `attempt` equals the passphrase exactly.
    pub fn try_unlock(&mut self, attempt: &str) -> bool {
        if attempt == self.passphrase {
            self.unlocked = true;
        }
        self.unlocked
    }

    pub fn lock(&mut self) {
        self.unlocked = false;
    }
}

impl Default for AdminGate {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_PASSPHRASE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Title,
    Transcript,
    AudioUrl,
    TimeLimit,
}

impl EditorField {
    pub const ALL: [EditorField; 4] = [
        EditorField::Title,
        EditorField::Transcript,
        EditorField::AudioUrl,
        EditorField::TimeLimit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EditorField::Title => "Title",
            EditorField::Transcript => "Transcript",
            EditorField::AudioUrl => "Audio URL",
            EditorField::TimeLimit => "Time limit (s)",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("time limit must be a whole number of seconds, got {0:?}")]
    InvalidTimeLimit(String),
}

/// Text fields being edited for a new (`editing == None`) or existing question.
#[derive(Debug, Clone)]
pub struct EditorForm {
    pub editing: Option<String>,
    pub title: String,
    pub transcript: String,
    pub audio_url: String,
    pub time_limit: String,
    pub focused: EditorField,
    pub error: Option<String>,
}

impl EditorForm {
    pub fn new() -> Self {
        Self {
            editing: None,
            title: String::new(),
            transcript: String::new(),
            audio_url: String::new(),
            time_limit: String::new(),
            focused: EditorField::Title,
            error: None,
        }
    }

    /// Pre-fill from `question`, turning its tokens back into a bracketed transcript.
    pub fn for_question(question: &Question) -> Self {
        Self {
            editing: Some(question.id.clone()),
            title: question.title.clone(),
            transcript: transcript::render(&question.tokens, &question.blanks),
            audio_url: question.audio_url.clone(),
            time_limit: question
                .time_limit_sec
                .map(|secs| secs.to_string())
                .unwrap_or_default(),
            focused: EditorField::Title,
            error: None,
        }
    }

    pub fn field(&self, field: EditorField) -> &str {
        match field {
            EditorField::Title => &self.title,
            EditorField::Transcript => &self.transcript,
            EditorField::AudioUrl => &self.audio_url,
            EditorField::TimeLimit => &self.time_limit,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focused {
            EditorField::Title => &mut self.title,
            EditorField::Transcript => &mut self.transcript,
            EditorField::AudioUrl => &mut self.audio_url,
            EditorField::TimeLimit => &mut self.time_limit,
        }
    }

    pub fn push(&mut self, c: char) {
        self.error = None;
        self.focused_mut().push(c);
    }

    pub fn pop(&mut self) {
        self.error = None;
        self.focused_mut().pop();
    }

    pub fn focus_next(&mut self) {
        let next = (self.focused.position() + 1) % EditorField::ALL.len();
        self.focused = EditorField::ALL[next];
    }

    pub fn focus_previous(&mut self) {
        let len = EditorField::ALL.len();
        let previous = (self.focused.position() + len - 1) % len;
        self.focused = EditorField::ALL[previous];
    }

    /// Convert the text fields into a draft. A blank time limit means untimed.
    pub fn to_draft(&self) -> Result<QuestionDraft, FormError> {
        let time_limit = self.time_limit.trim();
        let time_limit_sec = if time_limit.is_empty() {
            None
        } else {
            Some(
                time_limit
                    .parse::<u32>()
                    .map_err(|_| FormError::InvalidTimeLimit(time_limit.to_string()))?,
            )
        };

        Ok(QuestionDraft {
            title: self.title.clone(),
            transcript: self.transcript.clone(),
            audio_url: self.audio_url.clone(),
            time_limit_sec,
        })
    }
}

impl Default for EditorForm {
    fn default() -> Self {
        Self::new()
    }
}
