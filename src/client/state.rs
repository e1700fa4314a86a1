//! Client view state layered over the latest session snapshot.

use crate::models::Question;
use crate::session::{QuizStatus, SessionSnapshot};

const MAX_CODE_LEN: usize = 32;

/// Screen shown for the current session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    CodeEntry,
    Waiting,
    Quiz,
    Finished,
}

impl From<QuizStatus> for Screen {
    fn from(status: QuizStatus) -> Self {
        match status {
            QuizStatus::Idle => Screen::CodeEntry,
            QuizStatus::Waiting => Screen::Waiting,
            QuizStatus::Active => Screen::Quiz,
            QuizStatus::Completed | QuizStatus::Error => Screen::Finished,
        }
    }
}

/// Client application state.
pub struct ClientApp {
    /// Last state published by the session task.
    pub snapshot: SessionSnapshot,
    /// Quiz code being typed.
    pub code_input: String,
    /// Question currently on screen.
    pub current_index: usize,
    /// Highlighted option of the current question.
    pub selected_option: usize,
    /// Whether the client should quit.
    pub should_quit: bool,
}

impl ClientApp {
    pub fn new(initial_code: Option<&str>) -> Self {
        Self {
            snapshot: SessionSnapshot::default(),
            code_input: initial_code.unwrap_or_default().to_string(),
            current_index: 0,
            selected_option: 0,
            should_quit: false,
        }
    }

    pub fn screen(&self) -> Screen {
        Screen::from(self.snapshot.status)
    }

    /// Takes a new snapshot, keeping the cursor on a valid question.
    pub fn update(&mut self, snapshot: SessionSnapshot) {
        let entered_quiz = snapshot.status == QuizStatus::Active && self.snapshot.status != QuizStatus::Active;
        let previous_choice = self.recorded_choice();
        self.snapshot = snapshot;

        if entered_quiz || self.current_index >= self.snapshot.questions.len() {
            self.current_index = 0;
            self.sync_selection();
        } else if self.recorded_choice() != previous_choice {
            // A poll or submit changed the answer under the cursor.
            self.sync_selection();
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.snapshot.questions.get(self.current_index)
    }

    pub fn total_questions(&self) -> usize {
        self.snapshot.questions.len()
    }

    pub fn answered_count(&self) -> usize {
        self.snapshot.answers.len()
    }

    /// Option recorded on the server for the current question, if any.
    pub fn recorded_choice(&self) -> Option<usize> {
        let question = self.current_question()?;
        self.snapshot.answers.get(question.id)
    }

    pub fn next_question(&mut self) {
        if self.current_index + 1 < self.total_questions() {
            self.current_index += 1;
            self.sync_selection();
        }
    }

    pub fn previous_question(&mut self) {
        if self.current_index > 0 {
            self.current_index -= 1;
            self.sync_selection();
        }
    }

    pub fn select_next_option(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.selected_option = (self.selected_option + 1) % count;
        }
    }

    pub fn select_previous_option(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.selected_option = (self.selected_option + count - 1) % count;
        }
    }

    pub fn code_input_push(&mut self, c: char) {
        if c.is_ascii_alphanumeric() && self.code_input.len() < MAX_CODE_LEN {
            self.code_input.push(c);
        }
    }

    pub fn code_input_pop(&mut self) {
        self.code_input.pop();
    }

    fn option_count(&self) -> usize {
        self.current_question().map_or(0, |q| q.options.len())
    }

    fn sync_selection(&mut self) {
        self.selected_option = self.recorded_choice().unwrap_or(0);
    }
}
