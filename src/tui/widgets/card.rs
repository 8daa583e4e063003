//! Rounded bordered panel widget.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use crate::tui::theme::Theme;

pub(crate) struct CardWidget<'a> {
    title: &'a str,
    lines: Vec<Line<'a>>,
    badge: Option<(&'a str, Color)>,
    border_color: Option<Color>,
}

impl<'a> CardWidget<'a> {
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            lines: Vec::new(),
            badge: None,
            border_color: None,
        }
    }

    pub fn line(mut self, line: Line<'a>) -> Self {
        self.lines.push(line);
        self
    }

    pub fn lines(mut self, lines: impl IntoIterator<Item = Line<'a>>) -> Self {
        self.lines.extend(lines);
        self
    }

    pub fn badge(mut self, label: &'a str, color: Color) -> Self {
        self.badge = Some((label, color));
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = Some(color);
        self
    }

    pub fn render(self, area: Rect, f: &mut ratatui::Frame, theme: &Theme) {
        let mut title = vec![Span::styled(
            format!(" {} ", self.title),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )];
        if let Some((label, color)) = self.badge {
            title.push(Span::styled(
                format!("{label} "),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
        }

        let block = Block::default()
            .title(Line::from(title))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.border_color.unwrap_or(theme.border)));

        // Leading spaces are part of the layout.
        let para = Paragraph::new(Text::from(self.lines))
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(para, area);
    }
}
