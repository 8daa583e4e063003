//! Job form and readiness checklist.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::job::{FormField, JobForm};
use crate::tui::state::{App, InputMode};
use crate::tui::theme::Theme;
use crate::tui::widgets::card::CardWidget;

pub(crate) fn draw_form(area: Rect, f: &mut ratatui::Frame, app: &App, theme: &Theme) {
    let selected = app.field();
    let mut card = CardWidget::new("Job").border_color(if app.mode == InputMode::Edit {
        theme.oracle
    } else {
        theme.border
    });

    for field in FormField::ALL {
        let is_selected = field == selected;
        let editing = is_selected && app.mode == InputMode::Edit;
        let (value, placeholder) = if editing && field.is_file() {
            (app.path_input.clone(), false)
        } else {
            field_value(&app.form, field)
        };
        card = card.line(field_line(
            field.label(),
            value,
            placeholder,
            is_selected,
            editing,
            theme,
        ));
    }

    card.render(area, f, theme);
}

/// Display text for a field and whether it is showing a default.
fn field_value(form: &JobForm, field: FormField) -> (String, bool) {
    match field {
        FormField::JobName => {
            if form.job_name().trim().is_empty() {
                ("auto: RFantibody_<timestamp>".to_string(), true)
            } else {
                (form.job_name().to_string(), false)
            }
        }
        FormField::Fold => (format!("◄ {} ►", form.fold().label()), false),
        FormField::Mode => (format!("◄ {} ►", form.mode().as_api_value()), false),
        FormField::FrameworkFile => attachment_value(form.framework_file()),
        FormField::TargetFile => attachment_value(form.target_file()),
        FormField::Hotspots | FormField::DesignLoops => {
            let optional = if field == FormField::Hotspots {
                form.hotspots()
            } else {
                form.design_loops()
            };
            let shown = optional.display_value();
            if optional.is_placeholder() && shown.is_empty() {
                ("none".to_string(), true)
            } else {
                (shown.to_string(), optional.is_placeholder())
            }
        }
        FormField::RfDiffusionDesigns => (form.rf_diffusion_designs().to_string(), false),
        FormField::RfDiffusionFinalStep => (form.rf_diffusion_final_step().to_string(), false),
        FormField::RfDiffusionDeterministic => {
            let mark = if form.rf_diffusion_deterministic() { "[x]" } else { "[ ]" };
            (mark.to_string(), false)
        }
        FormField::RfDiffusionDiffuserT => (form.rf_diffusion_diffuser_t().to_string(), false),
        FormField::ProteinMpnnDesigns => (form.protein_mpnn_designs().to_string(), false),
    }
}

fn attachment_value(attachment: Option<&crate::job::Attachment>) -> (String, bool) {
    match attachment {
        Some(file) if file.is_empty() => (format!("{} (empty file)", file.file_name()), true),
        Some(file) => (format!("{} ({} bytes)", file.file_name(), file.len()), false),
        None => ("not selected".to_string(), true),
    }
}

fn field_line(
    label: &'static str,
    value: String,
    placeholder: bool,
    selected: bool,
    editing: bool,
    theme: &Theme,
) -> Line<'static> {
    let label_style = if selected {
        Style::default()
            .fg(theme.oracle)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_dim)
    };

    let value_style = if editing {
        Style::default()
            .fg(theme.oracle)
            .add_modifier(Modifier::UNDERLINED)
    } else if placeholder {
        Style::default()
            .fg(theme.muted)
            .add_modifier(Modifier::ITALIC)
    } else if selected {
        Style::default()
            .fg(theme.oracle)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text)
    };

    let selector = if selected { "›" } else { " " };
    let value = if editing { format!("{value}_") } else { value };

    Line::from(vec![
        Span::styled(format!(" {selector} "), label_style),
        Span::styled(format!("{label:<18}"), label_style),
        Span::styled(value, value_style),
        Span::styled(
            if editing { " [EDIT]" } else { "" },
            Style::default().fg(theme.oracle),
        ),
    ])
}

pub(crate) fn draw_readiness(area: Rect, f: &mut ratatui::Frame, app: &App, theme: &Theme) {
    let missing = app.form.missing_fields();
    let advisories = app.form.advisories();
    let pending = app.controller.is_pending();

    let (badge, color) = if pending {
        ("SUBMITTING", theme.oracle)
    } else if missing.is_empty() {
        ("READY", theme.optimal)
    } else {
        ("INCOMPLETE", theme.caution)
    };

    let mut card = CardWidget::new("Readiness")
        .badge(badge, color)
        .border_color(color);

    if missing.is_empty() {
        let hint = if pending {
            "  Waiting for the pipeline to answer"
        } else {
            "  All required inputs present. Press F5 to submit."
        };
        card = card.line(Line::from(Span::styled(hint, Style::default().fg(color))));
    } else {
        card = card.line(Line::from(Span::styled(
            "  Missing inputs:",
            Style::default().fg(theme.text),
        )));
        for field in missing {
            card = card.line(Line::from(Span::styled(
                format!("   ✕ {}", field.label()),
                Style::default().fg(theme.critical),
            )));
        }
    }

    if !advisories.is_empty() {
        card = card.line(Line::from(""));
        for advisory in advisories {
            card = card.line(Line::from(Span::styled(
                format!("  ! {advisory}"),
                Style::default().fg(theme.caution),
            )));
        }
    }

    card.render(area, f, theme);
}
