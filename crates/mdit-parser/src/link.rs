//! Scanners for link labels, destinations and titles.
//!
//! Shared by reference definitions (block phase) and inline links. All
//! positions are byte offsets into the subject.

use crate::entities::unescape;

/// Maximum number of characters inside a link label.
const MAX_LABEL_CHARS: usize = 999;

/// Maximum parenthesis nesting in a bare destination.
const MAX_PAREN_DEPTH: usize = 32;

fn char_at(s: &str, pos: usize) -> Option<char> {
    s.get(pos..).and_then(|rest| rest.chars().next())
}

/// Scan a `[label]` starting at `pos`; returns the offset after `]`.
pub(crate) fn scan_label(s: &str, pos: usize) -> Option<usize> {
    if char_at(s, pos) != Some('[') {
        return None;
    }

    let mut i = pos + 1;
    let mut count = 0;
    while let Some(c) = char_at(s, i) {
        match c {
            ']' => return Some(i + 1),
            '[' => return None,
            '\\' => {
                let escaped = char_at(s, i + 1)?;
                i += 1 + escaped.len_utf8();
            }
            _ => i += c.len_utf8(),
        }
        count += 1;
        if count > MAX_LABEL_CHARS {
            return None;
        }
    }
    None
}

/// Scan a link destination starting at `pos`.
///
/// Returns the unescaped destination and the offset after it. A bare
/// destination may be empty only when it is directly followed by `)`.
pub(crate) fn scan_destination(s: &str, pos: usize) -> Option<(String, usize)> {
    if char_at(s, pos) == Some('<') {
        let mut i = pos + 1;
        loop {
            match char_at(s, i)? {
                '>' => return Some((unescape(&s[pos + 1..i]).into_owned(), i + 1)),
                '<' | '\n' => return None,
                '\\' => match char_at(s, i + 1) {
                    Some('\n') | None => return None,
                    Some(escaped) => i += 1 + escaped.len_utf8(),
                },
                c => i += c.len_utf8(),
            }
        }
    }

    let mut i = pos;
    let mut depth = 0usize;
    let mut last = None;
    while let Some(c) = char_at(s, i) {
        last = Some(c);
        match c {
            '\\' if char_at(s, i + 1).is_some_and(|n| n.is_ascii_punctuation()) => i += 2,
            '(' => {
                depth += 1;
                if depth > MAX_PAREN_DEPTH {
                    return None;
                }
                i += 1;
            }
            ')' if depth == 0 => break,
            ')' => {
                depth -= 1;
                i += 1;
            }
            c if c == ' ' || c.is_ascii_control() => break,
            c => i += c.len_utf8(),
        }
    }

    if i == pos && last != Some(')') {
        return None;
    }
    if depth != 0 {
        return None;
    }
    Some((unescape(&s[pos..i]).into_owned(), i))
}

/// Scan a `"title"`, `'title'` or `(title)` starting at `pos`.
pub(crate) fn scan_title(s: &str, pos: usize) -> Option<(String, usize)> {
    let open = char_at(s, pos)?;
    let close = match open {
        '"' => '"',
        '\'' => '\'',
        '(' => ')',
        _ => return None,
    };

    let mut i = pos + 1;
    loop {
        let c = char_at(s, i)?;
        if c == close {
            return Some((unescape(&s[pos + 1..i]).into_owned(), i + 1));
        }
        match c {
            '(' if open == '(' => return None,
            '\\' => {
                let escaped = char_at(s, i + 1)?;
                i += 1 + escaped.len_utf8();
            }
            _ => i += c.len_utf8(),
        }
    }
}

/// Skip spaces with at most one newline.
pub(crate) fn skip_spnl(s: &str, pos: usize) -> usize {
    let bytes = s.as_bytes();
    let mut i = pos;
    while bytes.get(i) == Some(&b' ') {
        i += 1;
    }
    if bytes.get(i) == Some(&b'\n') {
        i += 1;
        while bytes.get(i) == Some(&b' ') {
            i += 1;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_label() {
        assert_eq!(scan_label("[foo] bar", 0), Some(5));
        assert_eq!(scan_label(r"[a\]b]", 0), Some(6));
        assert_eq!(scan_label("[a[b]", 0), None);
        assert_eq!(scan_label("[unclosed", 0), None);
        assert_eq!(scan_label("x[a]", 1), Some(4));
    }

    #[test]
    fn test_scan_label_length_limit() {
        let long = format!("[{}]", "a".repeat(1000));
        assert_eq!(scan_label(&long, 0), None);
        let ok = format!("[{}]", "a".repeat(999));
        assert_eq!(scan_label(&ok, 0), Some(ok.len()));
    }

    #[test]
    fn test_scan_destination_bare() {
        assert_eq!(scan_destination("/url rest", 0), Some(("/url".to_owned(), 4)));
        assert_eq!(scan_destination("a(b)c)", 0), Some(("a(b)c".to_owned(), 5)));
        assert_eq!(scan_destination(r"a\*b", 0), Some(("a*b".to_owned(), 4)));
        assert_eq!(scan_destination(")", 0), Some((String::new(), 0)));
        assert_eq!(scan_destination("", 0), None);
        assert_eq!(scan_destination("a(b", 0), None);
    }

    #[test]
    fn test_scan_destination_pointy() {
        assert_eq!(scan_destination("<a b>", 0), Some(("a b".to_owned(), 5)));
        assert_eq!(scan_destination("<>", 0), Some((String::new(), 2)));
        assert_eq!(scan_destination("<a\nb>", 0), None);
        assert_eq!(scan_destination("<a<b>", 0), None);
    }

    #[test]
    fn test_scan_title() {
        assert_eq!(scan_title(r#""a \"b\"""#, 0), Some((r#"a "b""#.to_owned(), 9)));
        assert_eq!(scan_title("'x'", 0), Some(("x".to_owned(), 3)));
        assert_eq!(scan_title("(x)", 0), Some(("x".to_owned(), 3)));
        assert_eq!(scan_title("(x(y)", 0), None);
        assert_eq!(scan_title("\"open", 0), None);
        assert_eq!(scan_title("x", 0), None);
    }

    #[test]
    fn test_skip_spnl() {
        assert_eq!(skip_spnl("  \n  x", 0), 5);
        assert_eq!(skip_spnl(" \n\nx", 0), 2);
        assert_eq!(skip_spnl("x", 0), 0);
    }
}
