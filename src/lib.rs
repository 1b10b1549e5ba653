//! # listening-quiz
//!
//! A terminal listening-comprehension quiz. Each question pairs an audio clip
//! with a transcript containing fill-in blanks; answers are graded per blank,
//! ignoring case and surrounding whitespace.
//!
//! Questions are authored in admin mode by typing a transcript with the
//! answers in square brackets, e.g. `"The gym is open for [exercise]."`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use listening_quiz::{Config, Quiz, QuizError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizError> {
//!     let quiz = Quiz::from_config(Config::default())?;
//!     quiz.run().await
//! }
//! ```

pub mod admin;
mod app;
pub mod audio;
mod config;
pub mod data;
pub mod grading;
mod models;
pub mod session;
pub mod terminal;
pub mod timer;
pub mod transcript;
mod ui;

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::info;
use tokio::sync::mpsc;

pub use app::App;
pub use config::Config;
pub use data::{HttpMirror, LocalStorage, Mirror, QuestionStore, StoreError};
pub use models::{AppState, Question, QuestionDraft, Token};

use admin::AdminGate;
use terminal::TerminalGuard;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Error type for quiz operations.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    /// The remote mirror client could not be built.
    #[error("failed to set up remote sync: {0}")]
    Mirror(#[from] reqwest::Error),
    /// IO error during quiz execution.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A quiz instance that can be run in the terminal.
pub struct Quiz {
    app: App,
}

impl Quiz {
    /// Wrap an already assembled app.
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// Open the question store and wire up the optional remote mirror and player.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: Config) -> Result<Self, QuizError> {
        let storage = LocalStorage::new(&config.store_path);

        let (mirror, outcomes) = match &config.remote_url {
            Some(url) => {
                let (tx, rx) = mpsc::unbounded_channel();
                let mirror: Box<dyn Mirror> = Box::new(HttpMirror::new(url.as_str())?.with_outcomes(tx));
                info!("mirroring questions to {}", url);
                (Some(mirror), Some(rx))
            }
            None => (None, None),
        };

        let store = QuestionStore::open(storage, mirror);
        let mut app = App::new(store, AdminGate::new(config.admin_passphrase), config.player);
        if let Some(outcomes) = outcomes {
            app = app.with_mirror_outcomes(outcomes);
        }

        Ok(Self::new(app))
    }

    /// Run the quiz in the terminal.
    ///
    /// This will take over the terminal, display the quiz UI, and return
    /// when the user quits.
    pub async fn run(mut self) -> Result<(), QuizError> {
        let mut guard = TerminalGuard::enter()?;
        run_event_loop(&mut guard, &mut self.app).await
    }
}

async fn run_event_loop(guard: &mut TerminalGuard, app: &mut App) -> Result<(), QuizError> {
    loop {
        app.pump();
        guard.terminal().draw(|frame| ui::render(frame, app))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if handle_input(app, key) {
                    break;
                }
            }
        } else {
            tokio::task::yield_now().await;
        }
    }

    Ok(())
}

/// Returns true if the app should exit.
fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match app.state {
        AppState::Quiz => handle_quiz_input(app, key),
        AppState::Unlock => handle_unlock_input(app, key),
        AppState::Manage => handle_manage_input(app, key),
        AppState::Editor => handle_editor_input(app, key),
    }
}

fn handle_quiz_input(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => return true,
        KeyCode::F(2) => app.open_admin(),
        KeyCode::PageUp => app.previous_question(),
        KeyCode::PageDown => app.next_question(),
        KeyCode::Tab => app.focus_next_blank(),
        KeyCode::BackTab => app.focus_previous_blank(),
        KeyCode::Enter => app.check(),
        KeyCode::Left if ctrl => app.seek_backward(),
        KeyCode::Right if ctrl => app.seek_forward(),
        KeyCode::Up if ctrl => app.faster(),
        KeyCode::Down if ctrl => app.slower(),
        KeyCode::Char('a') if ctrl => app.show_answers(),
        KeyCode::Char('r') if ctrl => app.reset(),
        KeyCode::Char('p') if ctrl => app.toggle_playback(),
        KeyCode::Char('b') if ctrl => app.restart_audio(),
        KeyCode::Char(c) if !ctrl => app.type_char(c),
        KeyCode::Backspace => app.backspace(),
        _ => {}
    }
    false
}

fn handle_unlock_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => app.back_to_quiz(),
        KeyCode::Enter => app.submit_unlock(),
        KeyCode::Backspace => app.unlock_pop(),
        KeyCode::Char(c) => app.unlock_push(c),
        _ => {}
    }
    false
}

fn handle_manage_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => app.back_to_quiz(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_question(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_question(),
        KeyCode::Enter => app.play_selected(),
        KeyCode::Char('a') => app.new_question(),
        KeyCode::Char('e') => app.edit_selected(),
        KeyCode::Char('d') => app.delete_selected(),
        KeyCode::Char('l') => app.lock_admin(),
        _ => {}
    }
    false
}

fn handle_editor_input(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => app.cancel_editor(),
        KeyCode::Char('s') if ctrl => app.save_editor(),
        KeyCode::Tab | KeyCode::Enter => app.editor_focus_next(),
        KeyCode::BackTab => app.editor_focus_previous(),
        KeyCode::Backspace => app.editor_pop(),
        KeyCode::Char(c) if !ctrl => app.editor_push(c),
        _ => {}
    }
    false
}
