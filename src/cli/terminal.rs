//! Terminal capability detection and output styling

use owo_colors::{OwoColorize, colors::css};

/// Detects whether coloured output should be enabled
fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<usize> {
    terminal_size::terminal_size().map(|(w, _)| usize::from(w.0))
}

/// Check if terminal is narrow (< 80 columns)
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|w| w < 80)
}

/// Shortens `text` to at most `width` characters, marking the cut with '…'.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[derive(Clone, Copy)]
enum Style {
    Success,
    Warning,
    Error,
    Info,
    Dim,
}

fn paint(text: &str, style: Style) -> String {
    if !supports_color() {
        return text.to_string();
    }
    match style {
        Style::Success => text.fg::<css::Green>().to_string(),
        Style::Warning => text.fg::<css::Orange>().to_string(),
        Style::Error => text.fg::<css::Red>().to_string(),
        Style::Info => text.fg::<css::LightBlue>().to_string(),
        Style::Dim => text.dimmed().to_string(),
    }
}

/// Extension trait for colourising output
pub trait Colorize {
    /// Colour as success (green)
    fn success(&self) -> String;
    /// Colour as warning (amber)
    fn warning(&self) -> String;
    /// Colour as error (red)
    fn error(&self) -> String;
    /// Colour as info (blue)
    fn info(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), Style::Success)
    }

    fn warning(&self) -> String {
        paint(self.as_ref(), Style::Warning)
    }

    fn error(&self) -> String {
        paint(self.as_ref(), Style::Error)
    }

    fn info(&self) -> String {
        paint(self.as_ref(), Style::Info)
    }

    fn dim(&self) -> String {
        paint(self.as_ref(), Style::Dim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("oil", 10), "oil");
        assert_eq!(truncate("oil change", 10), "oil change");
    }

    #[test]
    fn truncate_marks_the_cut() {
        assert_eq!(truncate("replace brake pads", 8), "replace…");
        assert_eq!(truncate("ÄÖÜäöü", 3), "ÄÖ…");
    }
}
