//! Play state for the active question.
//!
//! [`Session`] is a small reducer: every user action and timer tick is a
//! [`SessionEvent`], and [`Session::apply`] reports what changed so the caller
//! knows when to restart the countdown.

use log::debug;

use crate::grading::{self, Answers};
use crate::models::Question;

/// Discrete inputs to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Jump to a question by position. Out-of-range positions are ignored.
    Navigate(usize),
    /// Step back one question, stopping at the first.
    Previous,
    /// Step forward one question, stopping at the last.
    Next,
    /// Replace the text entered for one blank.
    TypeAnswer { blank: usize, text: String },
    /// Grade the current attempt. No-op once checked.
    Check,
    /// Fill every blank with its expected answer and grade.
    ShowAnswers,
    /// Start the current question over.
    Reset,
    /// One second elapsed on the countdown belonging to `attempt`.
    TimerTick { attempt: u64 },
}

/// What an event did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed.
    Unchanged,
    /// Answers or the countdown changed.
    Updated,
    /// The attempt was graded.
    Graded { score: usize },
    /// A fresh attempt began; any running countdown is stale.
    Restarted,
}

#[derive(Debug, Clone)]
pub struct Session {
    active_index: usize,
    answers: Answers,
    checked: bool,
    score: usize,
    time_remaining: Option<u32>,
    attempt: u64,
}

impl Session {
    /// Start on the first question of `questions`.
    pub fn new(questions: &[Question]) -> Self {
        Self {
            active_index: 0,
            answers: Answers::new(),
            checked: false,
            score: 0,
            time_remaining: questions.first().and_then(|q| q.time_limit_sec),
            attempt: 0,
        }
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// Text entered for `blank`, empty when untouched.
    pub fn answer(&self, blank: usize) -> &str {
        self.answers.get(&blank).map(String::as_str).unwrap_or("")
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Graded score; meaningful only once checked.
    pub fn score(&self) -> usize {
        self.score
    }

    pub fn time_remaining(&self) -> Option<u32> {
        self.time_remaining
    }

    /// Identifies the current attempt; bumped on every navigate and reset.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Per-blank verdict, available after checking.
    pub fn blank_status(&self, blank: usize, question: &Question) -> Option<bool> {
        self.checked
            .then(|| grading::is_correct(blank, &self.answers, &question.blanks))
    }

    pub fn apply(&mut self, event: SessionEvent, questions: &[Question]) -> Transition {
        debug!("session event {:?} at question {}", event, self.active_index);

        match event {
            SessionEvent::Navigate(index) => match questions.get(index) {
                Some(question) => self.restart_at(index, question),
                None => Transition::Unchanged,
            },
            SessionEvent::Previous => match self.active_index.checked_sub(1) {
                Some(index) => self.apply(SessionEvent::Navigate(index), questions),
                None => Transition::Unchanged,
            },
            SessionEvent::Next => self.apply(SessionEvent::Navigate(self.active_index + 1), questions),
            SessionEvent::TypeAnswer { blank, text } => {
                self.answers.insert(blank, text);
                Transition::Updated
            }
            SessionEvent::Check => match questions.get(self.active_index) {
                Some(question) => self.check(question),
                None => Transition::Unchanged,
            },
            SessionEvent::ShowAnswers => match questions.get(self.active_index) {
                Some(question) => {
                    self.answers = grading::reveal_all(&question.blanks);
                    self.checked = false;
                    self.check(question)
                }
                None => Transition::Unchanged,
            },
            SessionEvent::Reset => match questions.get(self.active_index) {
                Some(question) => self.restart_at(self.active_index, question),
                None => Transition::Unchanged,
            },
            SessionEvent::TimerTick { attempt } => self.tick(attempt, questions),
        }
    }

    fn restart_at(&mut self, index: usize, question: &Question) -> Transition {
        self.active_index = index;
        self.answers.clear();
        self.checked = false;
        self.score = 0;
        self.time_remaining = question.time_limit_sec;
        self.attempt += 1;
        Transition::Restarted
    }

    fn check(&mut self, question: &Question) -> Transition {
        if self.checked {
            return Transition::Unchanged;
        }

        self.score = grading::score(&self.answers, &question.blanks);
        self.checked = true;
        debug!(
            "graded question {}: {}/{}",
            question.id,
            self.score,
            question.blank_count()
        );
        Transition::Graded { score: self.score }
    }

    fn tick(&mut self, attempt: u64, questions: &[Question]) -> Transition {
        if attempt != self.attempt {
            return Transition::Unchanged;
        }

        let remaining = match self.time_remaining {
            Some(0) if !self.checked => return self.apply(SessionEvent::Check, questions),
            Some(remaining) if remaining > 0 => remaining - 1,
            _ => return Transition::Unchanged,
        };
        self.time_remaining = Some(remaining);

        if remaining == 0 && !self.checked {
            return self.apply(SessionEvent::Check, questions);
        }
        Transition::Updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript;

    fn question(id: &str, transcript_text: &str, time_limit_sec: Option<u32>) -> Question {
        let parsed = transcript::parse(transcript_text);
        Question {
            id: id.to_string(),
            title: id.to_string(),
            audio_url: format!("https://example.com/{id}.mp3"),
            time_limit_sec,
            tokens: parsed.tokens,
            blanks: parsed.blanks,
        }
    }

    fn questions() -> Vec<Question> {
        vec![
            question("one", "Capital: [Paris], count: [5]", Some(3)),
            question("two", "Only [one] blank", None),
            question("three", "Third [q]", Some(10)),
        ]
    }

    fn type_answer(blank: usize, text: &str) -> SessionEvent {
        SessionEvent::TypeAnswer {
            blank,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_new_session_starts_on_first_question() {
        let qs = questions();
        let session = Session::new(&qs);
        assert_eq!(session.active_index(), 0);
        assert!(!session.is_checked());
        assert_eq!(session.time_remaining(), Some(3));
    }

    #[test]
    fn test_check_scores_answers() {
        let qs = questions();
        let mut session = Session::new(&qs);
        session.apply(type_answer(0, " paris "), &qs);
        session.apply(type_answer(1, "5"), &qs);

        assert_eq!(session.apply(SessionEvent::Check, &qs), Transition::Graded { score: 2 });
        assert!(session.is_checked());
        assert_eq!(session.blank_status(0, &qs[0]), Some(true));
        assert_eq!(session.blank_status(1, &qs[0]), Some(true));
    }

    #[test]
    fn test_check_is_idempotent() {
        let qs = questions();
        let mut session = Session::new(&qs);
        session.apply(type_answer(0, "Paris"), &qs);
        session.apply(SessionEvent::Check, &qs);

        session.apply(type_answer(1, "5"), &qs);
        assert_eq!(session.apply(SessionEvent::Check, &qs), Transition::Unchanged);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_blank_status_hidden_until_checked() {
        let qs = questions();
        let mut session = Session::new(&qs);
        session.apply(type_answer(0, "Paris"), &qs);
        assert_eq!(session.blank_status(0, &qs[0]), None);
    }

    #[test]
    fn test_show_answers_fills_and_scores_all() {
        let qs = questions();
        let mut session = Session::new(&qs);
        session.apply(type_answer(0, "wrong"), &qs);
        session.apply(SessionEvent::Check, &qs);

        assert_eq!(
            session.apply(SessionEvent::ShowAnswers, &qs),
            Transition::Graded { score: 2 }
        );
        assert_eq!(session.answer(0), "Paris");
        assert_eq!(session.answer(1), "5");
        assert_eq!(session.score(), qs[0].blank_count());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let qs = questions();
        let mut session = Session::new(&qs);
        session.apply(type_answer(0, "Paris"), &qs);
        session.apply(SessionEvent::TimerTick { attempt: 0 }, &qs);
        session.apply(SessionEvent::Check, &qs);
        let before = session.attempt();

        assert_eq!(session.apply(SessionEvent::Reset, &qs), Transition::Restarted);
        assert!(session.answers().is_empty());
        assert!(!session.is_checked());
        assert_eq!(session.score(), 0);
        assert_eq!(session.time_remaining(), Some(3));
        assert!(session.attempt() > before);
    }

    #[test]
    fn test_navigation_is_clamped() {
        let qs = questions();
        let mut session = Session::new(&qs);
        assert_eq!(session.apply(SessionEvent::Previous, &qs), Transition::Unchanged);
        assert_eq!(session.active_index(), 0);

        session.apply(SessionEvent::Navigate(2), &qs);
        assert_eq!(session.apply(SessionEvent::Next, &qs), Transition::Unchanged);
        assert_eq!(session.active_index(), 2);

        assert_eq!(session.apply(SessionEvent::Navigate(7), &qs), Transition::Unchanged);
        assert_eq!(session.active_index(), 2);
    }

    #[test]
    fn test_navigation_resets_attempt() {
        let qs = questions();
        let mut session = Session::new(&qs);
        session.apply(type_answer(0, "Paris"), &qs);
        session.apply(SessionEvent::Check, &qs);

        assert_eq!(session.apply(SessionEvent::Next, &qs), Transition::Restarted);
        assert_eq!(session.active_index(), 1);
        assert!(session.answers().is_empty());
        assert!(!session.is_checked());
        assert_eq!(session.time_remaining(), None);

        session.apply(SessionEvent::Next, &qs);
        assert_eq!(session.time_remaining(), Some(10));
    }

    #[test]
    fn test_timer_expiry_checks_exactly_once() {
        let qs = questions();
        let mut session = Session::new(&qs);
        session.apply(type_answer(0, "paris"), &qs);
        let attempt = session.attempt();

        assert_eq!(
            session.apply(SessionEvent::TimerTick { attempt }, &qs),
            Transition::Updated
        );
        assert_eq!(
            session.apply(SessionEvent::TimerTick { attempt }, &qs),
            Transition::Updated
        );
        assert_eq!(
            session.apply(SessionEvent::TimerTick { attempt }, &qs),
            Transition::Graded { score: 1 }
        );
        assert_eq!(session.time_remaining(), Some(0));

        session.apply(type_answer(1, "5"), &qs);
        assert_eq!(
            session.apply(SessionEvent::TimerTick { attempt }, &qs),
            Transition::Unchanged
        );
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_expiry_after_manual_check_does_not_regrade() {
        let qs = questions();
        let mut session = Session::new(&qs);
        session.apply(type_answer(0, "paris"), &qs);
        session.apply(SessionEvent::Check, &qs);
        session.apply(type_answer(1, "5"), &qs);

        let attempt = session.attempt();
        for _ in 0..3 {
            assert_eq!(
                session.apply(SessionEvent::TimerTick { attempt }, &qs),
                Transition::Updated
            );
        }
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let qs = questions();
        let mut session = Session::new(&qs);
        let stale = session.attempt();
        session.apply(SessionEvent::Reset, &qs);

        assert_eq!(
            session.apply(SessionEvent::TimerTick { attempt: stale }, &qs),
            Transition::Unchanged
        );
        assert_eq!(session.time_remaining(), Some(3));
    }

    #[test]
    fn test_zero_time_limit_checks_on_first_tick() {
        let qs = vec![question("instant", "Say [now]", Some(0))];
        let mut session = Session::new(&qs);
        session.apply(type_answer(0, "now"), &qs);
        let attempt = session.attempt();

        assert_eq!(
            session.apply(SessionEvent::TimerTick { attempt }, &qs),
            Transition::Graded { score: 1 }
        );
        for _ in 0..4 {
            assert_eq!(
                session.apply(SessionEvent::TimerTick { attempt }, &qs),
                Transition::Unchanged
            );
        }
        assert!(session.is_checked());
        assert_eq!(session.time_remaining(), Some(0));
    }

    #[test]
    fn test_untimed_question_ignores_ticks() {
        let qs = questions();
        let mut session = Session::new(&qs);
        session.apply(SessionEvent::Navigate(1), &qs);
        let attempt = session.attempt();
        assert_eq!(
            session.apply(SessionEvent::TimerTick { attempt }, &qs),
            Transition::Unchanged
        );
        assert_eq!(session.time_remaining(), None);
    }

    #[test]
    fn test_repeated_placeholder_scores_once() {
        let mut repeated = question("rep", "[yes] and [yes]", None);
        repeated.tokens.push(crate::models::Token::blank(0));
        let qs = vec![repeated];
        let mut session = Session::new(&qs);
        session.apply(type_answer(0, "yes"), &qs);
        session.apply(type_answer(1, "yes"), &qs);
        assert_eq!(session.apply(SessionEvent::Check, &qs), Transition::Graded { score: 2 });
    }
}
