//! HTML backend for markdown rendering.
//!
//! Produces the HTML shape of the reference markdown-it renderer.

use std::borrow::Cow;
use std::fmt::Write;

use crate::backend::RenderBackend;
use crate::state::escape_html;

/// HTML render backend.
///
/// Produces:
/// - `<pre><code class="language-…">` for fenced code with an info string
/// - `<img src alt title>` for images
/// - `<table class="…">` when a table class is configured
/// - Internal destinations prefixed with the configured base URL
/// - `target="_blank" rel="noopener noreferrer"` on links leaving the site
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        if let Some(lang) = lang {
            let _ = write!(
                out,
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                escape_html(lang),
                escape_html(content)
            );
        } else {
            let _ = write!(out, "<pre><code>{}</code></pre>", escape_html(content));
        }
    }

    fn image(src: &str, alt: &str, title: Option<&str>, out: &mut String) {
        let _ = write!(
            out,
            r#"<img src="{}" alt="{}""#,
            escape_html(src),
            escape_html(alt)
        );
        if let Some(title) = title {
            let _ = write!(out, r#" title="{}""#, escape_html(title));
        }
        out.push('>');
    }

    fn transform_link<'a>(url: &'a str, base_url: Option<&str>) -> Cow<'a, str> {
        match base_url {
            Some(base) if is_internal(url) => Cow::Owned(join_base_url(base, url)),
            _ => Cow::Borrowed(url),
        }
    }

    fn external_link_attrs(out: &mut String) {
        out.push_str(r#" target="_blank" rel="noopener noreferrer""#);
    }

    fn table_start(class: Option<&str>, out: &mut String) {
        match class {
            Some(class) => {
                let _ = write!(out, r#"<table class="{}">"#, escape_html(class));
            }
            None => out.push_str("<table>"),
        }
    }
}

/// Whether a destination points inside the site.
///
/// Empty destinations, fragments, protocol-relative URLs and anything with
/// a URI scheme are external.
pub(crate) fn is_internal(url: &str) -> bool {
    !(url.is_empty() || url.starts_with('#') || url.starts_with("//") || has_scheme(url))
}

/// `[A-Za-z][A-Za-z0-9+.-]*:` prefix.
fn has_scheme(url: &str) -> bool {
    let bytes = url.as_bytes();
    if !bytes.first().is_some_and(u8::is_ascii_alphabetic) {
        return false;
    }
    bytes[1..]
        .iter()
        .find(|&&b| !(b.is_ascii_alphanumeric() || matches!(b, b'+' | b'.' | b'-')))
        == Some(&b':')
}

/// Prefix an internal destination with the base URL.
///
/// Trailing slashes on the base are dropped; a single `/` separates the two
/// unless the destination already starts with `/` or `?`.
pub(crate) fn join_base_url(base: &str, url: &str) -> String {
    let base = base.trim_end_matches('/');
    if url.starts_with(['/', '?']) {
        format!("{base}{url}")
    } else {
        format!("{base}/{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block_with_language() {
        let mut out = String::new();
        HtmlBackend::code_block(Some("rust"), "fn main() {}\n", &mut out);
        assert_eq!(
            out,
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"
        );
    }

    #[test]
    fn test_code_block_without_language() {
        let mut out = String::new();
        HtmlBackend::code_block(None, "a < b\n", &mut out);
        assert_eq!(out, "<pre><code>a &lt; b\n</code></pre>");
    }

    #[test]
    fn test_image() {
        let mut out = String::new();
        HtmlBackend::image("image.png", "Alt text", None, &mut out);
        assert_eq!(out, r#"<img src="image.png" alt="Alt text">"#);
    }

    #[test]
    fn test_image_with_title() {
        let mut out = String::new();
        HtmlBackend::image("image.png", "Alt \"text\"", Some("Title"), &mut out);
        assert_eq!(
            out,
            r#"<img src="image.png" alt="Alt &quot;text&quot;" title="Title">"#
        );
    }

    #[test]
    fn test_table_start() {
        let mut out = String::new();
        HtmlBackend::table_start(None, &mut out);
        HtmlBackend::table_start(Some("a\"b"), &mut out);
        assert_eq!(out, r#"<table><table class="a&quot;b">"#);
    }

    #[test]
    fn test_external_link_attrs() {
        let mut out = String::new();
        HtmlBackend::external_link_attrs(&mut out);
        assert_eq!(out, r#" target="_blank" rel="noopener noreferrer""#);
    }

    #[test]
    fn test_is_internal() {
        assert!(is_internal("/internal"));
        assert!(is_internal("page.html"));
        assert!(is_internal("../up"));
        assert!(is_internal("?q=1"));
        assert!(is_internal("a/b:c"));
        assert!(!is_internal(""));
        assert!(!is_internal("#section"));
        assert!(!is_internal("//cdn.example.com/x"));
        assert!(!is_internal("https://other.com/x"));
        assert!(!is_internal("mailto:me@example.com"));
        assert!(!is_internal("tel:+123"));
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("http:"));
        assert!(has_scheme("svn+ssh://host"));
        assert!(!has_scheme("1http://x"));
        assert!(!has_scheme("no-colon"));
        assert!(!has_scheme(":x"));
    }

    #[test]
    fn test_join_base_url() {
        assert_eq!(
            join_base_url("https://example.com", "/internal"),
            "https://example.com/internal"
        );
        assert_eq!(
            join_base_url("https://example.com/", "/internal"),
            "https://example.com/internal"
        );
        assert_eq!(
            join_base_url("https://example.com/docs//", "page"),
            "https://example.com/docs/page"
        );
        assert_eq!(
            join_base_url("https://example.com", "?page=2"),
            "https://example.com?page=2"
        );
    }

    #[test]
    fn test_transform_link() {
        let base = Some("https://example.com");
        assert_eq!(
            HtmlBackend::transform_link("/internal", base),
            "https://example.com/internal"
        );
        assert_eq!(
            HtmlBackend::transform_link("https://other.com/x", base),
            "https://other.com/x"
        );
        assert_eq!(HtmlBackend::transform_link("#top", base), "#top");
        assert_eq!(HtmlBackend::transform_link("/internal", None), "/internal");
    }
}
