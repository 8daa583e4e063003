//! TUI keyboard input handling.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::job::{Attachment, FormField};

use super::state::*;

pub(crate) fn handle_key(
    rt: &tokio::runtime::Runtime,
    app: &mut App,
    key: KeyEvent,
) -> Result<bool> {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.exit = Some(TuiExit::Quit);
        return Ok(true);
    }

    match app.screen {
        Screen::Form => match app.mode {
            InputMode::Edit => handle_edit_key(app, key),
            InputMode::Navigate => handle_navigate_key(rt, app, key),
        },
        Screen::ErrorModal => handle_error_modal_key(app, key),
    }
}

fn handle_error_modal_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
        app.error_modal = None;
        app.screen = app.error_return_screen;
    }
    Ok(false)
}

fn handle_navigate_key(
    rt: &tokio::runtime::Runtime,
    app: &mut App,
    key: KeyEvent,
) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.exit = Some(TuiExit::Quit);
            return Ok(true);
        }
        KeyCode::Up | KeyCode::BackTab => app.prev_field(),
        KeyCode::Down | KeyCode::Tab => app.next_field(),
        KeyCode::Left | KeyCode::Right => match app.field() {
            FormField::Mode => {
                let mode = app.form.mode().next();
                app.form.set_mode(mode);
            }
            FormField::Fold => {
                let fold = app.form.fold().next();
                app.form.set_fold(fold);
            }
            _ => {}
        },
        KeyCode::Char(' ') => {
            if app.field() == FormField::RfDiffusionDeterministic {
                let value = !app.form.rf_diffusion_deterministic();
                app.form.set_rf_diffusion_deterministic(value);
            }
        }
        KeyCode::Enter => begin_edit(app),
        KeyCode::Delete => {
            let field = app.field();
            match field {
                FormField::FrameworkFile => app.form.select_framework_file(None),
                FormField::TargetFile => app.form.select_target_file(None),
                FormField::Hotspots | FormField::DesignLoops => {
                    if let Some(optional) = app.form.optional_mut(field) {
                        optional.reset();
                    }
                }
                _ => {}
            }
        }
        KeyCode::F(5) => start_submit(rt, app),
        KeyCode::Char('o') | KeyCode::Char('O') => open_job_zip(app),
        _ => {}
    }
    Ok(false)
}

fn begin_edit(app: &mut App) {
    let field = app.field();
    if field.is_file() {
        app.path_input.clear();
    } else if let Some(optional) = app.form.optional_mut(field) {
        optional.focus();
    } else if !field.is_text() {
        return;
    }
    app.mode = InputMode::Edit;
}

fn handle_edit_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Tab | KeyCode::BackTab => {
            commit_edit(app);
            match key.code {
                KeyCode::Tab => app.next_field(),
                KeyCode::BackTab => app.prev_field(),
                _ => {}
            }
        }
        KeyCode::Backspace => {
            if let Some(buffer) = edit_buffer(app) {
                buffer.pop();
            }
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) || ch.is_control() {
                return Ok(false);
            }
            if let Some(buffer) = edit_buffer(app) {
                buffer.push(ch);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn edit_buffer(app: &mut App) -> Option<&mut String> {
    let field = app.field();
    match field {
        FormField::FrameworkFile | FormField::TargetFile => Some(&mut app.path_input),
        FormField::Hotspots | FormField::DesignLoops => {
            app.form.optional_mut(field).map(|optional| optional.buffer_mut())
        }
        _ => app.form.text_mut(field),
    }
}

fn commit_edit(app: &mut App) {
    app.mode = InputMode::Navigate;
    let field = app.field();

    if let Some(optional) = app.form.optional_mut(field) {
        optional.blur();
        return;
    }

    if field.is_file() {
        let raw = std::mem::take(&mut app.path_input);
        let path = raw.trim();
        if path.is_empty() {
            return;
        }
        match Attachment::from_path(Path::new(path)) {
            Ok(attachment) => {
                if field == FormField::FrameworkFile {
                    app.form.select_framework_file(Some(attachment));
                } else {
                    app.form.select_target_file(Some(attachment));
                }
            }
            Err(err) => {
                warn!(error = %err, "could not load structure file");
                app.set_error("Could not load file", err.to_string());
            }
        }
    }
}

/// Spawn the submission on the runtime so the UI keeps drawing while it runs.
pub(crate) fn start_submit(rt: &tokio::runtime::Runtime, app: &mut App) {
    if !app.can_submit() {
        return;
    }
    let controller = Arc::clone(&app.controller);
    let snapshot = app.form.snapshot();
    rt.spawn(async move {
        controller.submit(snapshot).await;
    });
}

fn open_job_zip(app: &mut App) {
    let Some(url) = app.job_zip_url() else {
        app.set_info(
            "No download yet",
            "The job ZIP link appears once the pipeline accepts a job.",
        );
        return;
    };
    if let Err(err) = open::that(&url) {
        app.set_error("Could not open link", format!("{url}\n\n{err}"));
    }
}
