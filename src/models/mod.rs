mod question;

pub use question::{Question, QuestionDraft, Token};

/// Which screen currently owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Playing the active question.
    Quiz,
    /// Prompting for the admin passphrase.
    Unlock,
    /// Listing questions for add/edit/delete.
    Manage,
    /// Editing a new or existing question.
    Editor,
}
