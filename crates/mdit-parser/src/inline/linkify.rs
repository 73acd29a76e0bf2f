//! Bare `http://` and `https://` URLs in running text become links.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{Inline, Link};
use crate::url::{normalize_link, validate_link};

static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bhttps?://[\p{L}\p{N}][^\s<>]*").expect("invalid bare url regex")
});

/// Turn bare URLs in text nodes into links.
///
/// Text already inside a link or image is left alone.
pub(super) fn linkify(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out = Vec::with_capacity(inlines.len());
    for inline in inlines {
        match inline {
            Inline::Text(text) if text.contains("://") => split_urls(&text, &mut out),
            Inline::Emphasis(children) => out.push(Inline::Emphasis(linkify(children))),
            Inline::Strong(children) => out.push(Inline::Strong(linkify(children))),
            Inline::Strikethrough(children) => out.push(Inline::Strikethrough(linkify(children))),
            other => out.push(other),
        }
    }
    out
}

fn split_urls(text: &str, out: &mut Vec<Inline>) {
    let mut last = 0;
    for m in BARE_URL.find_iter(text) {
        let url = trim_url_end(m.as_str());
        if !validate_link(url) {
            continue;
        }
        if m.start() > last {
            out.push(Inline::Text(text[last..m.start()].to_owned()));
        }
        out.push(Inline::Link(Link {
            destination: normalize_link(url),
            title: None,
            children: vec![Inline::Text(display_text(url).to_owned())],
            autolink: true,
        }));
        last = m.start() + url.len();
    }
    if last < text.len() {
        out.push(Inline::Text(text[last..].to_owned()));
    }
}

/// Drop trailing punctuation that belongs to the sentence, and closing
/// parentheses without a partner inside the URL.
fn trim_url_end(url: &str) -> &str {
    let mut url = url;
    while let Some(last) = url.chars().next_back() {
        let strip = match last {
            '.' | ',' | ':' | ';' | '!' | '?' | '"' | '\'' | '*' | '_' | '~' => true,
            ')' => url.matches(')').count() > url.matches('(').count(),
            _ => false,
        };
        if !strip {
            break;
        }
        url = &url[..url.len() - last.len_utf8()];
    }
    url
}

/// Link text shown for a bare URL: the address without its scheme.
fn display_text(url: &str) -> &str {
    url.split_once("://").map_or(url, |(_, rest)| rest)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_owned())
    }

    fn bare(destination: &str, shown: &str) -> Inline {
        Inline::Link(Link {
            destination: destination.to_owned(),
            title: None,
            children: vec![text(shown)],
            autolink: true,
        })
    }

    #[test]
    fn test_bare_url_in_text() {
        assert_eq!(
            linkify(vec![text("see https://kyoto.dosue.jp/a?b=c for more")]),
            vec![
                text("see "),
                bare("https://kyoto.dosue.jp/a?b=c", "kyoto.dosue.jp/a?b=c"),
                text(" for more"),
            ]
        );
    }

    #[test]
    fn test_trailing_punctuation_excluded() {
        assert_eq!(
            linkify(vec![text("(at http://a.org/x_(y)).")]),
            vec![text("(at "), bare("http://a.org/x_(y)", "a.org/x_(y)"), text(").")]
        );
    }

    #[test]
    fn test_requires_word_boundary_and_host() {
        assert_eq!(linkify(vec![text("xhttps://a.b")]), vec![text("xhttps://a.b")]);
        assert_eq!(linkify(vec![text("https:// a")]), vec![text("https:// a")]);
        assert_eq!(linkify(vec![text("ftp://a.b")]), vec![text("ftp://a.b")]);
    }

    #[test]
    fn test_nested_markup_linkified() {
        assert_eq!(
            linkify(vec![Inline::Strong(vec![text("https://a.b")])]),
            vec![Inline::Strong(vec![bare("https://a.b", "a.b")])]
        );
    }

    #[test]
    fn test_link_text_untouched() {
        let link = Inline::Link(Link {
            destination: "/x".to_owned(),
            title: None,
            children: vec![text("https://a.b")],
            autolink: false,
        });
        assert_eq!(linkify(vec![link.clone()]), vec![link]);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(display_text("https://a.b/c"), "a.b/c");
        assert_eq!(display_text("HTTP://a.b"), "a.b");
    }
}
