//! TUI color theme.

use ratatui::style::Color;

#[derive(Clone, Copy)]
pub(crate) struct Theme {
    // Primary palette
    pub oracle: Color,
    pub optimal: Color,
    pub caution: Color,
    pub critical: Color,

    // UI chrome
    pub border: Color,
    pub muted: Color,
    pub text: Color,
    pub text_dim: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            oracle: Color::Rgb(0, 212, 255),
            optimal: Color::Rgb(163, 230, 53),
            caution: Color::Rgb(251, 191, 36),
            critical: Color::Rgb(255, 68, 85),
            border: Color::Gray,
            muted: Color::DarkGray,
            text: Color::White,
            text_dim: Color::Gray,
        }
    }
}

impl Theme {
    /// Color for a pipeline status string.
    pub fn status_color(&self, status: &str) -> Color {
        match status.to_ascii_lowercase().as_str() {
            "error" | "failed" => self.critical,
            "done" | "completed" | "success" | "ok" => self.optimal,
            "queued" | "running" | "pending" => self.oracle,
            _ => self.caution,
        }
    }
}
