//! Styling for the scheduler's terminal output

use owo_colors::OwoColorize;
use supports_color::Stream;

/// Placeholder printed in place of an empty table.
pub const NONE: &str = "(none)";

/// What a piece of output means to the user, which decides its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// A change was applied, e.g. an entry added or a schedule saved.
    Done,
    /// Something needs a look, e.g. entries left unmatched.
    Attention,
    /// A table title such as `Cargo (3)`.
    Title,
    /// Filler: empty-table placeholders, cancelled actions.
    Muted,
}

impl Tone {
    /// Styles `text` for standard output.
    #[must_use]
    pub fn paint(self, text: &str) -> String {
        self.paint_for(Stream::Stdout, text)
    }

    /// Styles `text` for standard error.
    #[must_use]
    pub fn paint_err(self, text: &str) -> String {
        self.paint_for(Stream::Stderr, text)
    }

    fn paint_for(self, stream: Stream, text: &str) -> String {
        if supports_color::on(stream).is_none() {
            return text.to_string();
        }
        match self {
            Self::Done => text.green().to_string(),
            Self::Attention => text.yellow().to_string(),
            Self::Title => text.bold().to_string(),
            Self::Muted => text.dimmed().to_string(),
        }
    }

    /// The tone for one line of a listed table, given the table's title line.
    ///
    /// Plain rows get no tone.
    #[must_use]
    pub fn of_table_line(line: &str, title: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            None
        } else if line == title.trim() {
            Some(Self::Title)
        } else if line == NONE {
            Some(Self::Muted)
        } else {
            None
        }
    }
}

/// Whether a block `width` columns wide fits the terminal.
///
/// Output that is not going to a terminal always fits.
#[must_use]
pub fn fits(width: usize) -> bool {
    terminal_size::terminal_size().is_none_or(|(columns, _)| usize::from(columns.0) >= width)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("Cargo (2)", Some(Tone::Title); "title")]
    #[test_case("Cargo (2)      ", Some(Tone::Title); "padded title")]
    #[test_case(NONE, Some(Tone::Muted); "placeholder")]
    #[test_case("C1   Seattle  0900", None; "row")]
    #[test_case("", None; "blank")]
    fn picks_tone_for_table_line(line: &str, expected: Option<Tone>) {
        assert_eq!(Tone::of_table_line(line, "Cargo (2)"), expected);
    }
}
