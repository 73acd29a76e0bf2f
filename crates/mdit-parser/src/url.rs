//! Link destination normalization and safety checks.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left as-is in destinations: alphanumerics plus URL reserved
/// and mark characters. `%` is handled separately so existing escapes survive.
const LINK_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#')
    .remove(b'%');

/// Percent-encode a destination, keeping valid `%XX` escapes.
///
/// # Examples
///
/// ```
/// use mdit_parser::normalize_link;
///
/// assert_eq!(normalize_link("/a b"), "/a%20b");
/// assert_eq!(normalize_link("/caf%C3%A9"), "/caf%C3%A9");
/// assert_eq!(normalize_link("/100%"), "/100%25");
/// ```
#[must_use]
pub fn normalize_link(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let mut rest = url;

    while let Some(idx) = rest.find('%') {
        out.extend(utf8_percent_encode(&rest[..idx], LINK_ENCODE_SET));
        let after = &rest[idx + 1..];
        let escaped = after
            .as_bytes()
            .get(..2)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        out.push_str(if escaped { "%" } else { "%25" });
        rest = after;
    }
    out.extend(utf8_percent_encode(rest, LINK_ENCODE_SET));

    out
}

/// Whether a destination may be emitted as a link.
///
/// Script-capable schemes are rejected; `data:` is allowed only for common
/// raster image types.
#[must_use]
pub fn validate_link(url: &str) -> bool {
    const BAD_SCHEMES: [&str; 4] = ["vbscript:", "javascript:", "file:", "data:"];
    const GOOD_DATA: [&str; 4] = [
        "data:image/gif;",
        "data:image/png;",
        "data:image/jpeg;",
        "data:image/webp;",
    ];

    let url = url.trim().to_ascii_lowercase();
    if !BAD_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
        return true;
    }
    GOOD_DATA.iter().any(|prefix| url.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_link_encodes_unsafe_characters() {
        assert_eq!(normalize_link("foo bar"), "foo%20bar");
        assert_eq!(normalize_link("a\"b"), "a%22b");
        assert_eq!(normalize_link("[x]"), "%5Bx%5D");
        assert_eq!(normalize_link("a\\b"), "a%5Cb");
    }

    #[test]
    fn test_normalize_link_keeps_reserved() {
        let url = "https://example.com/p?q=1&r=(2)#frag";
        assert_eq!(normalize_link(url), url);
    }

    #[test]
    fn test_normalize_link_encodes_utf8() {
        assert_eq!(normalize_link("/föö"), "/f%C3%B6%C3%B6");
    }

    #[test]
    fn test_normalize_link_percent_handling() {
        assert_eq!(normalize_link("%20"), "%20");
        assert_eq!(normalize_link("%2"), "%252");
        assert_eq!(normalize_link("%zz"), "%25zz");
        assert_eq!(normalize_link("%"), "%25");
    }

    #[test]
    fn test_validate_link() {
        assert!(validate_link("https://example.com"));
        assert!(validate_link("/relative"));
        assert!(validate_link(""));
        assert!(!validate_link("javascript:alert(1)"));
        assert!(!validate_link(" JavaScript:alert(1)"));
        assert!(!validate_link("vbscript:msgbox"));
        assert!(!validate_link("file:///etc/passwd"));
        assert!(!validate_link("data:text/html;base64,xyz"));
        assert!(validate_link("data:image/png;base64,xyz"));
    }
}
