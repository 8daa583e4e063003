//! Fullscreen terminal UI (TUI).
//!
//! One form screen. Submissions run on the tokio runtime while this thread
//! keeps drawing from the controller's state.

pub(crate) mod input;
pub(crate) mod screens;
pub(crate) mod state;
pub(crate) mod theme;
pub(crate) mod widgets;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Terminal;

use crate::job::FormField;
use crate::submission::SubmissionController;
use state::*;
use theme::Theme;

const FRAME_TIME: Duration = Duration::from_millis(16);

pub(crate) use state::TuiExit;

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

pub(crate) fn run_tui(
    rt: &tokio::runtime::Runtime,
    controller: Arc<SubmissionController>,
) -> Result<TuiExit> {
    let _guard = TerminalGuard::enter()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(controller);

    loop {
        terminal.draw(|f| draw(f.area(), f, &app))?;

        let timeout = FRAME_TIME.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && input::handle_key(rt, &mut app, key)? {
                    break;
                }
            }
        }

        if app.last_tick.elapsed() >= FRAME_TIME {
            app.last_tick = Instant::now();
            app.animation.advance();
        }
    }

    Ok(app.exit.unwrap_or(TuiExit::Quit))
}

fn draw(area: Rect, f: &mut ratatui::Frame, app: &App) {
    let theme = Theme::default();

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Length(FormField::ALL.len() as u16 + 2),
            Constraint::Min(0),
            Constraint::Length(1), // footer
        ])
        .split(area);

    let endpoint = app.controller.client().base().pipeline_url();
    widgets::header::draw_header(outer[0], f, &theme, Some(endpoint.as_str()));

    screens::form::draw_form(outer[1], f, app, &theme);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(outer[2]);
    screens::form::draw_readiness(bottom[0], f, app, &theme);
    screens::result::draw_result(bottom[1], f, app, &theme);

    widgets::footer::draw_footer(outer[3], f, &theme, &footer_hints(app));

    if app.screen == Screen::ErrorModal {
        screens::error::draw_error_modal(area, f, app, theme);
    }
}

/// Key hints for the footer; the flag dims hints whose action is unavailable.
fn footer_hints(app: &App) -> Vec<(&'static str, &'static str, bool)> {
    if app.screen == Screen::ErrorModal {
        return vec![("Enter", "Close", true)];
    }
    if app.mode == InputMode::Edit {
        return vec![("Type", "Edit", true), ("Enter/Esc", "Done", true), ("Tab", "Next", true)];
    }

    let mut hints = vec![("↑/↓", "Field", true)];
    match app.field() {
        FormField::FrameworkFile | FormField::TargetFile => {
            hints.push(("Enter", "Enter path", true));
            hints.push(("Del", "Clear", true));
        }
        FormField::Hotspots | FormField::DesignLoops => {
            hints.push(("Enter", "Edit", true));
            hints.push(("Del", "Default", true));
        }
        FormField::Mode | FormField::Fold => hints.push(("◄/►", "Cycle", true)),
        FormField::RfDiffusionDeterministic => hints.push(("Space", "Toggle", true)),
        _ => hints.push(("Enter", "Edit", true)),
    }
    hints.push(("F5", "Submit", app.can_submit()));
    hints.push(("o", "Open ZIP", app.job_zip_url().is_some()));
    hints.push(("Esc", "Quit", true));
    hints
}
