//! Top header bar with title and pipeline endpoint.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::theme::Theme;

pub(crate) fn draw_header(
    area: Rect,
    f: &mut ratatui::Frame,
    theme: &Theme,
    endpoint: Option<&str>,
) {
    let mut spans = vec![
        Span::styled(
            "RFANTIBODY",
            Style::default()
                .fg(theme.oracle)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  job submission", Style::default().fg(theme.text)),
    ];

    if let Some(endpoint) = endpoint {
        spans.push(Span::styled(
            format!("  //  {endpoint}"),
            Style::default().fg(theme.text_dim),
        ));
    }

    let rule = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(theme.border),
    ));

    f.render_widget(Paragraph::new(vec![Line::from(spans), rule]), area);
}
