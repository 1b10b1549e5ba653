//! The ordered question collection and its persistence.

use std::path::Path;

use log::{info, warn};
use uuid::Uuid;

use crate::models::{Question, QuestionDraft};
use crate::transcript;

use super::mirror::Mirror;
use super::seed::seed_questions;
use super::storage::{LocalStorage, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("no question with id {0}")]
    NotFound(String),
    #[error("the last remaining question cannot be deleted")]
    LastQuestion,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Questions in play order, saved locally after every change and mirrored remotely.
pub struct QuestionStore {
    questions: Vec<Question>,
    storage: LocalStorage,
    mirror: Option<Box<dyn Mirror>>,
}

impl QuestionStore {
    /// Load from `storage`, falling back to the built-in seed set when the
    /// file is missing, unreadable, malformed or empty.
    pub fn open(storage: LocalStorage, mirror: Option<Box<dyn Mirror>>) -> Self {
        let questions = match storage.load() {
            Ok(Some(questions)) if !questions.is_empty() => questions,
            Ok(Some(_)) => {
                warn!("{} is empty, using seed questions", storage.path().display());
                seed_questions()
            }
            Ok(None) => {
                info!(
                    "no stored questions at {}, using seed questions",
                    storage.path().display()
                );
                seed_questions()
            }
            Err(e) => {
                warn!("{}, using seed questions", e);
                seed_questions()
            }
        };

        Self {
            questions,
            storage,
            mirror,
        }
    }

    pub fn storage_path(&self) -> &Path {
        self.storage.path()
    }

    pub fn all(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }

    /// Append a new question built from `draft` and return its id.
    pub fn add(&mut self, draft: &QuestionDraft) -> Result<String, StoreError> {
        validate_draft(draft)?;

        let id = Uuid::new_v4().to_string();
        let mut next = self.questions.clone();
        next.push(build_question(id.clone(), draft));
        self.commit(next)?;

        info!("added question {}", id);
        Ok(id)
    }

    /// Replace the content of question `id`, keeping its id and position.
    pub fn update(&mut self, id: &str, draft: &QuestionDraft) -> Result<(), StoreError> {
        validate_draft(draft)?;

        let position = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut next = self.questions.clone();
        next[position] = build_question(id.to_string(), draft);
        self.commit(next)?;

        info!("updated question {}", id);
        Ok(())
    }

    /// Remove question `id`, keeping the order of the rest.
    pub fn delete(&mut self, id: &str) -> Result<Question, StoreError> {
        let position = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if self.questions.len() == 1 {
            return Err(StoreError::LastQuestion);
        }

        let mut next = self.questions.clone();
        let removed = next.remove(position);
        self.commit(next)?;

        info!("deleted question {}", id);
        Ok(removed)
    }

    fn commit(&mut self, next: Vec<Question>) -> Result<(), StoreError> {
        self.storage.save(&next)?;
        self.questions = next;

        if let Some(mirror) = &self.mirror {
            mirror.replace_all(&self.questions);
        }
        Ok(())
    }
}

fn validate_draft(draft: &QuestionDraft) -> Result<(), StoreError> {
    if draft.title.trim().is_empty() {
        return Err(StoreError::MissingField("title"));
    }
    if draft.transcript.trim().is_empty() {
        return Err(StoreError::MissingField("transcript"));
    }
    if draft.audio_url.trim().is_empty() {
        return Err(StoreError::MissingField("audio URL"));
    }
    Ok(())
}

fn build_question(id: String, draft: &QuestionDraft) -> Question {
    let parsed = transcript::parse(&draft.transcript);
    Question {
        id,
        title: draft.title.trim().to_string(),
        audio_url: draft.audio_url.trim().to_string(),
        time_limit_sec: draft.time_limit_sec,
        tokens: parsed.tokens,
        blanks: parsed.blanks,
    }
}
