//! HTML entity and backslash-escape decoding.
//!
//! Named entities cover the full HTML 5 list. Unknown names are left as
//! literal text, which is the behavior `CommonMark` requires.

mod names;

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use self::names::NAMED_ENTITIES;

/// Entity or numeric character reference anchored at the start of the input.
static ENTITY_HERE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("invalid entity regex")
});

/// Backslash escape or entity anywhere in the input.
static ESCAPE_OR_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\[!-/:-@\[-`{-~]|&(?:#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[A-Za-z][A-Za-z0-9]{1,31});",
    )
    .expect("invalid escape regex")
});

/// Map a named entity (without `&` and `;`) to its replacement text.
#[must_use]
pub fn entity_to_unicode(name: &str) -> Option<Cow<'static, str>> {
    NAMED_ENTITIES
        .binary_search_by(|(candidate, _)| candidate.cmp(&name))
        .ok()
        .map(|idx| Cow::Borrowed(NAMED_ENTITIES[idx].1))
}

/// Decode a numeric character reference body (`#123` or `#x7B`).
///
/// Zero, surrogates and out-of-range values become U+FFFD.
fn numeric_reference(body: &str) -> Option<char> {
    let digits = body.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    Some(match code {
        0 => '\u{fffd}',
        _ => char::from_u32(code).unwrap_or('\u{fffd}'),
    })
}

/// Decode a complete reference such as `&amp;` or `&#x41;`.
///
/// Returns `None` for unknown names so callers can keep the literal text.
#[must_use]
pub fn decode_entity(entity: &str) -> Option<Cow<'static, str>> {
    let body = entity.strip_prefix('&')?.strip_suffix(';')?;
    if body.starts_with('#') {
        numeric_reference(body).map(|c| Cow::Owned(c.to_string()))
    } else {
        entity_to_unicode(body)
    }
}

/// Match an entity at the start of `input`.
///
/// Returns the decoded text (or the literal entity when the name is
/// unknown) and the number of bytes consumed.
pub(crate) fn match_entity(input: &str) -> Option<(Cow<'static, str>, usize)> {
    let m = ENTITY_HERE.find(input)?;
    let text = m.as_str();
    let decoded = decode_entity(text).unwrap_or_else(|| Cow::Owned(text.to_owned()));
    Some((decoded, m.end()))
}

/// Resolve backslash escapes and entities in link destinations, titles and
/// fence info strings.
#[must_use]
pub fn unescape(input: &str) -> Cow<'_, str> {
    if !input.contains(['\\', '&']) {
        return Cow::Borrowed(input);
    }
    ESCAPE_OR_ENTITY.replace_all(input, |caps: &regex::Captures| {
        let matched = &caps[0];
        if let Some(escaped) = matched.strip_prefix('\\') {
            escaped.to_owned()
        } else {
            decode_entity(matched).map_or_else(|| matched.to_owned(), Cow::into_owned)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_entities() {
        assert_eq!(decode_entity("&amp;").as_deref(), Some("&"));
        assert_eq!(decode_entity("&nbsp;").as_deref(), Some("\u{00a0}"));
        assert_eq!(decode_entity("&copy;").as_deref(), Some("\u{00a9}"));
        assert_eq!(decode_entity("&yuml;").as_deref(), Some("\u{00ff}"));
        assert_eq!(decode_entity("&AElig;").as_deref(), Some("\u{00c6}"));
        assert_eq!(decode_entity("&mdash;").as_deref(), Some("\u{2014}"));
        assert_eq!(decode_entity("&ngE;").as_deref(), Some("\u{2267}\u{0338}"));
        assert_eq!(decode_entity("&check;").as_deref(), Some("\u{2713}"));
        assert_eq!(decode_entity("&NewLine;").as_deref(), Some("\n"));
    }

    #[test]
    fn test_greek_entities() {
        assert_eq!(decode_entity("&Alpha;").as_deref(), Some("\u{0391}"));
        assert_eq!(decode_entity("&Sigma;").as_deref(), Some("\u{03a3}"));
        assert_eq!(decode_entity("&omega;").as_deref(), Some("\u{03c9}"));
        assert_eq!(decode_entity("&sigmaf;").as_deref(), Some("\u{03c2}"));
    }

    #[test]
    fn test_entity_names_are_case_sensitive() {
        assert_eq!(decode_entity("&AMP;").as_deref(), Some("&"));
        assert_eq!(decode_entity("&aMP;"), None);
        assert_eq!(decode_entity("&Copy;"), None);
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(decode_entity("&#35;").as_deref(), Some("#"));
        assert_eq!(decode_entity("&#x22;").as_deref(), Some("\""));
        assert_eq!(decode_entity("&#XD06;").as_deref(), Some("\u{0d06}"));
        assert_eq!(decode_entity("&#0;").as_deref(), Some("\u{fffd}"));
        assert_eq!(decode_entity("&#xD800;").as_deref(), Some("\u{fffd}"));
        assert_eq!(decode_entity("&#1234567;").as_deref(), Some("\u{fffd}"));
    }

    #[test]
    fn test_match_entity_keeps_unknown_literal() {
        let (text, len) = match_entity("&madeup; rest").unwrap();
        assert_eq!(text, "&madeup;");
        assert_eq!(len, 8);
        assert!(match_entity("&#87654321;").is_none());
        assert!(match_entity("& amp;").is_none());
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"foo\*bar"), "foo*bar");
        assert_eq!(unescape(r"a\b"), r"a\b");
        assert_eq!(unescape("&auml;&#33;"), "\u{00e4}!");
        assert_eq!(unescape("plain"), "plain");
    }
}
