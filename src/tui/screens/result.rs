//! Submission status and pipeline response.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::submission::{Presentation, SubmissionState};
use crate::tui::state::App;
use crate::tui::theme::Theme;
use crate::tui::widgets::card::CardWidget;

pub(crate) fn draw_result(area: Rect, f: &mut ratatui::Frame, app: &App, theme: &Theme) {
    let state = app.submission();

    if let SubmissionState::Pending { job_name } = &state {
        let spinner = app.animation.spinner_char();
        CardWidget::new("Result")
            .border_color(theme.oracle)
            .line(Line::from(""))
            .line(Line::from(vec![
                Span::styled(format!("  {spinner}  "), Style::default().fg(theme.oracle)),
                Span::styled(
                    format!("Submitting {job_name}..."),
                    Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
                ),
            ]))
            .line(Line::from(Span::styled(
                "  Pipeline runs can take a long time; the form stays editable.",
                Style::default().fg(theme.muted),
            )))
            .render(area, f, theme);
        return;
    }

    match app.presentation() {
        None => CardWidget::new("Result")
            .line(Line::from(""))
            .line(Line::from(Span::styled(
                "  No submission yet.",
                Style::default().fg(theme.muted),
            )))
            .render(area, f, theme),
        Some(Presentation::Error(view)) => CardWidget::new("Result")
            .badge("FAILED", theme.critical)
            .border_color(theme.critical)
            .line(Line::from(""))
            .line(Line::from(Span::styled(
                format!("  {}", view.line),
                Style::default().fg(theme.critical),
            )))
            .line(Line::from(""))
            .line(Line::from(Span::styled(
                "  Fix the inputs and press F5 to try again.",
                Style::default().fg(theme.muted),
            )))
            .render(area, f, theme),
        Some(Presentation::Result(view)) => {
            let color = theme.status_color(&view.status);
            let mut card = CardWidget::new("Result")
                .badge("RECEIVED", color)
                .border_color(color)
                .line(Line::from(Span::styled(
                    format!("  {}", view.summary),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )));

            if let Some(failure) = &view.pipeline_error {
                if let Some(stage) = &failure.stage {
                    card = card.line(Line::from(Span::styled(
                        format!("  Failed stage: {stage}"),
                        Style::default().fg(theme.critical),
                    )));
                }
                if let Some(log_tail) = &failure.log_tail {
                    card = card.lines(log_tail.lines().map(|line| {
                        Line::from(Span::styled(
                            format!("    {line}"),
                            Style::default().fg(theme.text_dim),
                        ))
                    }));
                }
            }

            for link in &view.downloads {
                card = card.line(Line::from(vec![
                    Span::styled(
                        format!("  {:<11}", link.label),
                        Style::default().fg(theme.text_dim),
                    ),
                    Span::styled(
                        link.url.clone(),
                        Style::default()
                            .fg(theme.oracle)
                            .add_modifier(Modifier::UNDERLINED),
                    ),
                ]));
            }

            card.line(Line::from(""))
                .lines(view.pretty.lines().map(|line| {
                    Line::from(Span::styled(
                        format!("  {line}"),
                        Style::default().fg(theme.muted),
                    ))
                }))
                .render(area, f, theme);
        }
    }
}
