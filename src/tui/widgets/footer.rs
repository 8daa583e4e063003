//! Context-sensitive keybind footer bar.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::theme::Theme;

/// `hints` are `(key, action, enabled)`; disabled hints render dimmed.
pub(crate) fn draw_footer(
    area: Rect,
    f: &mut ratatui::Frame,
    theme: &Theme,
    hints: &[(&str, &str, bool)],
) {
    let mut spans = Vec::new();
    for (i, (key, action, enabled)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(theme.muted)));
        }
        let key_color = if *enabled { theme.oracle } else { theme.muted };
        spans.push(Span::styled(key.to_string(), Style::default().fg(key_color)));
        spans.push(Span::styled(
            format!(" {action}"),
            Style::default().fg(theme.muted),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
