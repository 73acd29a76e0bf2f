//! Link reference definitions.

use std::collections::HashMap;

use crate::link::{scan_destination, scan_label, scan_title, skip_spnl};
use crate::url::{normalize_link, validate_link};

/// Target of a `[label]: destination "title"` definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkReference {
    /// Normalized destination.
    pub destination: String,
    /// Title, if one was given and is non-empty.
    pub title: Option<String>,
}

/// Reference definitions keyed by normalized label.
///
/// Populated during the block phase and read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceMap {
    entries: HashMap<String, LinkReference>,
}

impl ReferenceMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition unless the label is already defined.
    ///
    /// Returns `false` when an earlier definition was kept.
    pub fn insert(&mut self, label: &str, reference: LinkReference) -> bool {
        let key = normalize_label(label);
        if key.is_empty() || self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, reference);
        true
    }

    /// Look up a label (brackets excluded) case-insensitively.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&LinkReference> {
        self.entries.get(&normalize_label(label))
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no definitions were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(normalized label, reference)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LinkReference)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Normalize a label for matching: trim, collapse whitespace, fold case.
///
/// # Examples
///
/// ```
/// use mdit_parser::normalize_label;
///
/// assert_eq!(normalize_label("  Foo \n  Bar "), "FOO BAR");
/// assert_eq!(normalize_label("ẞ"), normalize_label("ss"));
/// ```
#[must_use]
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .to_uppercase()
}

/// Try to parse one reference definition at the start of `s`.
///
/// On success the definition is recorded (first one wins) and the number of
/// bytes consumed, including the trailing newline, is returned.
pub(crate) fn parse_reference(s: &str, refs: &mut ReferenceMap) -> Option<usize> {
    let label_end = scan_label(s, 0)?;
    let raw_label = &s[1..label_end - 1];
    if raw_label.trim().is_empty() {
        return None;
    }

    if s.as_bytes().get(label_end) != Some(&b':') {
        return None;
    }
    let dest_start = skip_spnl(s, label_end + 1);
    let (destination, dest_end) = scan_destination(s, dest_start)?;
    if dest_end == dest_start && !s[dest_start..].starts_with("<>") {
        return None;
    }
    if !validate_link(&destination) {
        return None;
    }

    let before_title = dest_end;
    let title_start = skip_spnl(s, before_title);
    let title = if title_start == before_title {
        None
    } else {
        scan_title(s, title_start)
    };

    if let Some((text, title_end)) = title
        && let Some(end) = at_line_end(s, title_end)
    {
        record(refs, raw_label, &destination, Some(text));
        return Some(end);
    }

    // A title that does not end the line is not part of the definition
    let end = at_line_end(s, before_title)?;
    record(refs, raw_label, &destination, None);
    Some(end)
}

fn record(refs: &mut ReferenceMap, label: &str, destination: &str, title: Option<String>) {
    let reference = LinkReference {
        destination: normalize_link(destination),
        title: title.filter(|t| !t.is_empty()),
    };
    if !refs.insert(label, reference) {
        tracing::trace!(label, "duplicate reference definition ignored");
    }
}

/// Offset after trailing spaces and the newline, if only spaces remain.
fn at_line_end(s: &str, pos: usize) -> Option<usize> {
    let rest = &s[pos..];
    let trimmed = rest.trim_start_matches(' ');
    let spaces = rest.len() - trimmed.len();
    if trimmed.is_empty() {
        Some(pos + spaces)
    } else if trimmed.starts_with('\n') {
        Some(pos + spaces + 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> (Option<usize>, ReferenceMap) {
        let mut refs = ReferenceMap::new();
        let consumed = parse_reference(s, &mut refs);
        (consumed, refs)
    }

    #[test]
    fn test_simple_definition() {
        let (consumed, refs) = parse("[Foo]: /url \"title\"\nrest");
        assert_eq!(consumed, Some(20));
        let reference = refs.get("foo").unwrap();
        assert_eq!(reference.destination, "/url");
        assert_eq!(reference.title.as_deref(), Some("title"));
    }

    #[test]
    fn test_title_on_next_line() {
        let (consumed, refs) = parse("[a]:\n/url\n'the title'\n");
        assert_eq!(consumed, Some(22));
        assert_eq!(refs.get("A").unwrap().title.as_deref(), Some("the title"));
    }

    #[test]
    fn test_trailing_garbage_after_title_drops_title() {
        // The title line is not part of the definition
        let (consumed, refs) = parse("[a]: /url\n\"title\" ok\n");
        assert_eq!(consumed, Some(10));
        assert_eq!(refs.get("a").unwrap().title, None);
    }

    #[test]
    fn test_garbage_after_destination_rejected() {
        let (consumed, refs) = parse("[a]: /url \"title\" ok\n");
        assert_eq!(consumed, None);
        assert!(refs.is_empty());
    }

    #[test]
    fn test_missing_destination_rejected() {
        assert_eq!(parse("[a]:\n").0, None);
        assert_eq!(parse("[a]: <>\n").0, Some(8));
    }

    #[test]
    fn test_unsafe_destination_rejected() {
        assert_eq!(parse("[a]: javascript:alert(1)\n").0, None);
    }

    #[test]
    fn test_blank_label_rejected() {
        assert_eq!(parse("[ ]: /url\n").0, None);
    }

    #[test]
    fn test_first_definition_wins() {
        let mut refs = ReferenceMap::new();
        parse_reference("[a]: /first\n", &mut refs);
        parse_reference("[A]: /second\n", &mut refs);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs.get("a").unwrap().destination, "/first");
    }

    #[test]
    fn test_destination_is_encoded() {
        let (_, refs) = parse("[a]: <my url>\n");
        assert_eq!(refs.get("a").unwrap().destination, "my%20url");
    }
}
