use std::time::Duration;

use log::debug;
use tokio::sync::mpsc;

use crate::admin::{AdminGate, EditorForm};
use crate::audio::Playback;
use crate::data::{MirrorOutcome, QuestionStore, StoreError};
use crate::models::{AppState, Question};
use crate::session::{Session, SessionEvent, Transition};
use crate::timer::{CountdownTimer, TimerTick};

const SEEK_STEP_SECS: f32 = 5.0;

/// Everything the UI reads and mutates, owned in one place.
///
/// Creating an `App` may start the countdown for the first question, so it
/// must happen inside a tokio runtime.
pub struct App {
    pub state: AppState,
    store: QuestionStore,
    session: Session,
    timer: Option<CountdownTimer>,
    tick_tx: mpsc::UnboundedSender<TimerTick>,
    tick_rx: mpsc::UnboundedReceiver<TimerTick>,
    mirror_rx: Option<mpsc::UnboundedReceiver<MirrorOutcome>>,
    playback: Playback,
    gate: AdminGate,
    focused_blank: usize,
    unlock_input: String,
    unlock_error: Option<String>,
    manage_selected: usize,
    editor: EditorForm,
    status: Option<String>,
}

impl App {
    pub fn new(store: QuestionStore, gate: AdminGate, player: Option<String>) -> Self {
        let session = Session::new(store.all());
        let audio_url = store
            .all()
            .first()
            .map(|q| q.audio_url.clone())
            .unwrap_or_default();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();

        let mut app = Self {
            state: AppState::Quiz,
            store,
            session,
            timer: None,
            tick_tx,
            tick_rx,
            mirror_rx: None,
            playback: Playback::new(audio_url, player),
            gate,
            focused_blank: 0,
            unlock_input: String::new(),
            unlock_error: None,
            manage_selected: 0,
            editor: EditorForm::new(),
            status: None,
        };
        app.restart_timer();
        app
    }

    /// Show remote sync results in the status line.
    pub fn with_mirror_outcomes(mut self, outcomes: mpsc::UnboundedReceiver<MirrorOutcome>) -> Self {
        self.mirror_rx = Some(outcomes);
        self
    }

    pub fn questions(&self) -> &[Question] {
        self.store.all()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.store.all().get(self.session.active_index())
    }

    pub fn current_question_number(&self) -> usize {
        self.session.active_index() + 1
    }

    pub fn total_questions(&self) -> usize {
        self.store.len()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn is_admin(&self) -> bool {
        self.gate.is_unlocked()
    }

    pub fn focused_blank(&self) -> usize {
        self.focused_blank
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn unlock_input(&self) -> &str {
        &self.unlock_input
    }

    pub fn unlock_error(&self) -> Option<&str> {
        self.unlock_error.as_deref()
    }

    pub fn manage_selected(&self) -> usize {
        self.manage_selected
    }

    pub fn editor(&self) -> &EditorForm {
        &self.editor
    }

    /// Feed pending timer ticks, player exits and mirror outcomes into the state.
    pub fn pump(&mut self) {
        self.playback.poll();

        while let Ok(TimerTick { attempt }) = self.tick_rx.try_recv() {
            self.dispatch(SessionEvent::TimerTick { attempt });
        }

        if let Some(outcomes) = self.mirror_rx.as_mut() {
            while let Ok(outcome) = outcomes.try_recv() {
                self.status = Some(match outcome {
                    MirrorOutcome::Synced { count } => format!("Synced {} questions", count),
                    MirrorOutcome::Failed { reason } => format!("Remote sync failed: {}", reason),
                });
            }
        }
    }

    pub fn dispatch(&mut self, event: SessionEvent) -> Transition {
        let previous_index = self.session.active_index();
        let transition = self.session.apply(event, self.store.all());

        match transition {
            Transition::Restarted => {
                self.focused_blank = 0;
                self.restart_timer();
                if self.session.active_index() != previous_index {
                    self.load_audio();
                }
            }
            Transition::Graded { score } => {
                let total = self.current_question().map_or(0, |q| q.blank_count());
                self.status = Some(format!("Score {}/{}", score, total));
            }
            Transition::Updated | Transition::Unchanged => {}
        }

        if self.session.time_remaining() == Some(0) && self.timer.take().is_some() {
            debug!("countdown finished for attempt {}", self.session.attempt());
        }
        transition
    }

    /// Start the countdown for the current attempt. A zero limit expires at once.
    fn restart_timer(&mut self) {
        let attempt = self.session.attempt();
        self.timer = None;
        match self.session.time_remaining() {
            Some(0) => {
                self.dispatch(SessionEvent::TimerTick { attempt });
            }
            Some(_) => self.timer = Some(CountdownTimer::start(attempt, self.tick_tx.clone())),
            None => {}
        }
    }

    fn load_audio(&mut self) {
        if let Some(url) = self.current_question().map(|q| q.audio_url.clone()) {
            self.playback.load(url);
        }
    }

    pub fn next_question(&mut self) {
        self.dispatch(SessionEvent::Next);
    }

    pub fn previous_question(&mut self) {
        self.dispatch(SessionEvent::Previous);
    }

    pub fn check(&mut self) {
        self.dispatch(SessionEvent::Check);
    }

    pub fn show_answers(&mut self) {
        self.dispatch(SessionEvent::ShowAnswers);
    }

    pub fn reset(&mut self) {
        self.status = None;
        self.dispatch(SessionEvent::Reset);
    }

    fn blank_count(&self) -> usize {
        self.current_question().map_or(0, |q| q.blank_count())
    }

    pub fn focus_next_blank(&mut self) {
        let count = self.blank_count();
        if count > 0 {
            self.focused_blank = (self.focused_blank + 1) % count;
        }
    }

    pub fn focus_previous_blank(&mut self) {
        let count = self.blank_count();
        if count > 0 {
            self.focused_blank = (self.focused_blank + count - 1) % count;
        }
    }

    /// Append to the focused blank. Ignored once the attempt is checked.
    pub fn type_char(&mut self, c: char) {
        if self.session.is_checked() || self.blank_count() == 0 {
            return;
        }
        let mut text = self.session.answer(self.focused_blank).to_string();
        text.push(c);
        self.dispatch(SessionEvent::TypeAnswer {
            blank: self.focused_blank,
            text,
        });
    }

    pub fn backspace(&mut self) {
        if self.session.is_checked() || self.blank_count() == 0 {
            return;
        }
        let mut text = self.session.answer(self.focused_blank).to_string();
        if text.pop().is_some() {
            self.dispatch(SessionEvent::TypeAnswer {
                blank: self.focused_blank,
                text,
            });
        }
    }

    pub fn toggle_playback(&mut self) {
        self.playback.toggle();
    }

    pub fn seek_forward(&mut self) {
        self.playback.seek_by(SEEK_STEP_SECS);
    }

    pub fn seek_backward(&mut self) {
        self.playback.seek_by(-SEEK_STEP_SECS);
    }

    pub fn restart_audio(&mut self) {
        self.playback.seek(Duration::ZERO);
    }

    pub fn faster(&mut self) {
        self.playback.faster();
    }

    pub fn slower(&mut self) {
        self.playback.slower();
    }

    /// Enter admin mode, asking for the passphrase first if still locked.
    pub fn open_admin(&mut self) {
        if self.gate.is_unlocked() {
            self.manage_selected = self.session.active_index();
            self.state = AppState::Manage;
        } else {
            self.unlock_input.clear();
            self.unlock_error = None;
            self.state = AppState::Unlock;
        }
    }

    pub fn unlock_push(&mut self, c: char) {
        self.unlock_error = None;
        self.unlock_input.push(c);
    }

    pub fn unlock_pop(&mut self) {
        self.unlock_error = None;
        self.unlock_input.pop();
    }

    pub fn submit_unlock(&mut self) {
        let attempt = std::mem::take(&mut self.unlock_input);
        if self.gate.try_unlock(&attempt) {
            self.open_admin();
        } else {
            self.unlock_error = Some("Incorrect passphrase".to_string());
        }
    }

    pub fn lock_admin(&mut self) {
        self.gate.lock();
        self.state = AppState::Quiz;
    }

    pub fn back_to_quiz(&mut self) {
        self.state = AppState::Quiz;
    }

    pub fn select_next_question(&mut self) {
        if self.manage_selected + 1 < self.store.len() {
            self.manage_selected += 1;
        }
    }

    pub fn select_previous_question(&mut self) {
        self.manage_selected = self.manage_selected.saturating_sub(1);
    }

    /// Leave admin mode on the selected question.
    pub fn play_selected(&mut self) {
        if self.manage_selected != self.session.active_index() {
            self.dispatch(SessionEvent::Navigate(self.manage_selected));
        }
        self.state = AppState::Quiz;
    }

    pub fn new_question(&mut self) {
        self.editor = EditorForm::new();
        self.state = AppState::Editor;
    }

    pub fn edit_selected(&mut self) {
        if let Some(question) = self.store.all().get(self.manage_selected) {
            self.editor = EditorForm::for_question(question);
            self.state = AppState::Editor;
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self
            .store
            .all()
            .get(self.manage_selected)
            .map(|q| q.id.clone())
        else {
            return;
        };

        let active_id = self.current_question().map(|q| q.id.clone());
        match self.store.delete(&id) {
            Ok(removed) => {
                self.status = Some(format!("Deleted \"{}\"", removed.title));
                self.manage_selected = self.manage_selected.min(self.store.len().saturating_sub(1));
                self.resync_session(active_id, false);
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    pub fn editor_push(&mut self, c: char) {
        self.editor.push(c);
    }

    pub fn editor_pop(&mut self) {
        self.editor.pop();
    }

    pub fn editor_focus_next(&mut self) {
        self.editor.focus_next();
    }

    pub fn editor_focus_previous(&mut self) {
        self.editor.focus_previous();
    }

    pub fn cancel_editor(&mut self) {
        self.state = AppState::Manage;
    }

    /// Validate the form and add or update the question. Errors stay on the form.
    pub fn save_editor(&mut self) {
        let draft = match self.editor.to_draft() {
            Ok(draft) => draft,
            Err(e) => {
                self.editor.error = Some(e.to_string());
                return;
            }
        };

        let active_id = self.current_question().map(|q| q.id.clone());
        let saved: Result<String, StoreError> = match self.editor.editing.clone() {
            Some(id) => self.store.update(&id, &draft).map(|()| id),
            None => self.store.add(&draft),
        };

        match saved {
            Ok(id) => {
                let edited_active = active_id.as_deref() == Some(id.as_str());
                self.manage_selected = self.store.position(&id).unwrap_or(0);
                self.status = Some(format!("Saved \"{}\"", draft.title.trim()));
                self.state = AppState::Manage;
                self.resync_session(active_id, edited_active);
            }
            Err(e) => self.editor.error = Some(e.to_string()),
        }
    }

    /// Point the session back at the question it was showing after the collection changed.
    fn resync_session(&mut self, active_id: Option<String>, content_changed: bool) {
        let position = active_id.and_then(|id| self.store.position(&id));
        let target = position.unwrap_or_else(|| {
            self.session
                .active_index()
                .min(self.store.len().saturating_sub(1))
        });

        let moved = target != self.session.active_index();
        if content_changed || position.is_none() || moved {
            self.dispatch(SessionEvent::Navigate(target));
            if !moved {
                self.load_audio();
            }
        }
    }
}
