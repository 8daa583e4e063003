//! TUI application state types.

use std::sync::Arc;
use std::time::Instant;

use crate::job::{FormField, JobForm};
use crate::submission::{present, Presentation, SubmissionController, SubmissionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Form,
    ErrorModal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Navigate,
    Edit,
}

#[derive(Debug, Clone)]
pub(crate) struct ErrorModalState {
    pub title: String,
    pub message: String,
    pub kind: ModalKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModalKind {
    Error,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TuiExit {
    Quit,
}

pub(crate) struct AnimationState {
    pub tick: u64,
}

impl AnimationState {
    pub fn new() -> Self {
        Self { tick: 0 }
    }

    pub fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn spinner_char(&self) -> char {
        const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        FRAMES[(self.tick as usize / 6) % FRAMES.len()]
    }
}

pub(crate) struct App {
    pub screen: Screen,
    pub form: JobForm,
    pub cursor: usize,
    pub mode: InputMode,
    /// Path being typed for the selected file field.
    pub path_input: String,
    pub controller: Arc<SubmissionController>,
    pub error_modal: Option<ErrorModalState>,
    pub error_return_screen: Screen,
    pub exit: Option<TuiExit>,
    pub last_tick: Instant,
    pub animation: AnimationState,
}

impl App {
    pub fn new(controller: Arc<SubmissionController>) -> Self {
        Self {
            screen: Screen::Form,
            form: JobForm::new(),
            cursor: 0,
            mode: InputMode::Navigate,
            path_input: String::new(),
            controller,
            error_modal: None,
            error_return_screen: Screen::Form,
            exit: None,
            last_tick: Instant::now(),
            animation: AnimationState::new(),
        }
    }

    pub fn field(&self) -> FormField {
        FormField::ALL[self.cursor.min(FormField::ALL.len() - 1)]
    }

    pub fn next_field(&mut self) {
        self.cursor = (self.cursor + 1) % FormField::ALL.len();
    }

    pub fn prev_field(&mut self) {
        self.cursor = if self.cursor == 0 {
            FormField::ALL.len() - 1
        } else {
            self.cursor - 1
        };
    }

    pub fn submission(&self) -> SubmissionState {
        self.controller.state()
    }

    pub fn presentation(&self) -> Option<Presentation> {
        present(&self.submission(), self.controller.client().base())
    }

    pub fn can_submit(&self) -> bool {
        self.form.is_submittable() && !self.controller.is_pending()
    }

    /// Job ZIP link of the last successful submission, if the service returned one.
    pub fn job_zip_url(&self) -> Option<String> {
        match self.submission() {
            SubmissionState::Succeeded { result, .. } => result
                .job_zip()
                .map(|link| self.controller.client().base().resolve_link(link)),
            _ => None,
        }
    }

    pub fn set_error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.show_modal(ModalKind::Error, title.into(), message.into());
    }

    pub fn set_info(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.show_modal(ModalKind::Info, title.into(), message.into());
    }

    fn show_modal(&mut self, kind: ModalKind, title: String, message: String) {
        self.error_return_screen = self.screen;
        self.error_modal = Some(ErrorModalState {
            title,
            message,
            kind,
        });
        self.screen = Screen::ErrorModal;
    }
}
