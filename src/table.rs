//! Column-aligned plain-text tables
//!
//! Used both for the schedule view and for listing the collections, so every
//! table the tool prints lines up the same way.

const GAP: &str = "  ";

/// A table with `N` columns, rendered as padded text lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<const N: usize> {
    headers: [&'static str; N],
    rows: Vec<[String; N]>,
}

impl<const N: usize> Table<N> {
    /// Creates an empty table with the given column headers.
    #[must_use]
    pub const fn new(headers: [&'static str; N]) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    pub fn push(&mut self, row: [String; N]) {
        self.rows.push(row);
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders the header, a dashed rule and every row.
    ///
    /// Each column is as wide as its widest cell or header. Trailing padding
    /// is trimmed.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let widths = self.widths();

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(format_row(self.headers, &widths));
        lines.push(format_row(widths.map(|width| "-".repeat(width)), &widths));
        lines.extend(self.rows.iter().map(|row| format_row(row, &widths)));
        lines
    }

    fn widths(&self) -> [usize; N] {
        std::array::from_fn(|idx| {
            self.rows
                .iter()
                .map(|row| row[idx].len())
                .max()
                .unwrap_or(0)
                .max(self.headers[idx].len())
        })
    }
}

impl<const N: usize> Extend<[String; N]> for Table<N> {
    fn extend<T: IntoIterator<Item = [String; N]>>(&mut self, iter: T) {
        self.rows.extend(iter);
    }
}

fn format_row<S: AsRef<str>>(cells: impl IntoIterator<Item = S>, widths: &[usize]) -> String {
    let line = cells
        .into_iter()
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref()))
        .collect::<Vec<_>>()
        .join(GAP);
    line.trim_end().to_string()
}
