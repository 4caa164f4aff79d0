//! Terminal styling for user-facing status lines.

/// Kind of message being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Info,
    Success,
    Warning,
    Error,
    Plain,
}

impl Style {
    fn ansi_code(self) -> Option<&'static str> {
        match self {
            Style::Info => Some("36"),
            Style::Success => Some("32"),
            Style::Warning => Some("33"),
            Style::Error => Some("31"),
            Style::Plain => None,
        }
    }
}

/// Wraps `message` in the escape codes for `style`. With `color` off the
/// message is returned unchanged.
pub fn paint(message: &str, style: Style, color: bool) -> String {
    match style.ansi_code() {
        Some(code) if color => format!("\x1b[{}m{}\x1b[0m", code, message),
        _ => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_in_escape_codes() {
        assert_eq!(paint("done", Style::Success, true), "\x1b[32mdone\x1b[0m");
    }

    #[test]
    fn plain_or_uncolored_is_untouched() {
        assert_eq!(paint("x", Style::Plain, true), "x");
        assert_eq!(paint("x", Style::Error, false), "x");
    }
}
