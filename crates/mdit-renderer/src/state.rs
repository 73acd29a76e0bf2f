//! Shared rendering helpers: escaping, table alignment and the heading
//! outline.

use mdit_parser::Alignment;

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Emitted heading level (1-6), after the configured offset.
    pub level: u8,
    /// Heading text without markup.
    pub title: String,
}

/// Collects headings as they are rendered.
#[derive(Debug, Default)]
pub(crate) struct HeadingState {
    toc: Vec<TocEntry>,
}

impl HeadingState {
    /// Record a rendered heading.
    pub(crate) fn push(&mut self, level: u8, title: &str) {
        self.toc.push(TocEntry {
            level,
            title: title.trim().to_owned(),
        });
    }

    /// Take the table of contents entries.
    pub(crate) fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }
}

/// Style attribute for a table cell in a column with the given alignment.
pub(crate) fn alignment_style(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => r#" style="text-align:left""#,
        Alignment::Center => r#" style="text-align:center""#,
        Alignment::Right => r#" style="text-align:right""#,
        Alignment::None => "",
    }
}

/// Escape HTML special characters.
///
/// Covers `&`, `<`, `>` and `"`, which is enough for both text content and
/// double-quoted attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    push_escaped(s, &mut result);
    result
}

/// Append `s` to `out` with HTML special characters escaped.
pub(crate) fn push_escaped(s: &str, out: &mut String) {
    let mut last = 0;
    for (i, b) in s.bytes().enumerate() {
        let escaped = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            _ => continue,
        };
        out.push_str(&s[last..i]);
        out.push_str(escaped);
        last = i + 1;
    }
    out.push_str(&s[last..]);
}
