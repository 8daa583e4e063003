//! Modal for file-loading errors and notices.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use crate::tui::state::{App, ModalKind};
use crate::tui::theme::Theme;

pub(crate) fn draw_error_modal(area: Rect, f: &mut ratatui::Frame, app: &App, theme: Theme) {
    let Some(modal) = &app.error_modal else {
        return;
    };

    let (icon, color) = match modal.kind {
        ModalKind::Error => ("✕", theme.critical),
        ModalKind::Info => ("i", theme.oracle),
    };

    let popup_area = centered_rect(70, 40, area);
    f.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("  {icon}  "), Style::default().fg(color)),
            Span::styled(
                modal.title.as_str(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ];
    lines.extend(modal.message.lines().map(|line| {
        Line::from(Span::styled(
            format!("  {line}"),
            Style::default().fg(theme.text),
        ))
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  [Enter to close]",
        Style::default().fg(theme.muted),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color));

    f.render_widget(
        Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: false }),
        popup_area,
    );
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(rows[1])[1]
}
