//! Render backend trait for format-specific output.
//!
//! The generic renderer owns document structure (block nesting, lists,
//! tables, inline markup) and delegates the pieces whose markup differs
//! between targets to a backend.

use std::borrow::Cow;

/// Backend trait for format-specific rendering operations.
///
/// Implementations provide:
/// - Code blocks (HTML uses `<pre><code>`)
/// - Block quote wrappers
/// - Images
/// - Link destination transformation (HTML prefixes internal links)
/// - Attributes for links leaving the site
/// - The table opening tag
pub trait RenderBackend {
    /// Render a code block.
    ///
    /// # Arguments
    ///
    /// * `lang` - First word of the fence info string, if any
    /// * `content` - Literal code, each line terminated by `\n`
    /// * `out` - Output buffer to write to
    fn code_block(lang: Option<&str>, content: &str, out: &mut String);

    /// Render block quote start tag.
    fn blockquote_start(out: &mut String) {
        out.push_str("<blockquote>");
    }

    /// Render block quote end tag.
    fn blockquote_end(out: &mut String) {
        out.push_str("</blockquote>");
    }

    /// Render an image.
    ///
    /// `src` has already been through [`transform_link`](Self::transform_link).
    fn image(src: &str, alt: &str, title: Option<&str>, out: &mut String);

    /// Transform a link or image destination.
    ///
    /// Default implementation returns the URL unchanged.
    #[must_use]
    fn transform_link<'a>(url: &'a str, _base_url: Option<&str>) -> Cow<'a, str> {
        Cow::Borrowed(url)
    }

    /// Write extra attributes for a link outside the internal domain.
    ///
    /// Called right after the `href` attribute. Default implementation adds
    /// nothing.
    fn external_link_attrs(_out: &mut String) {}

    /// Render the table opening tag.
    fn table_start(class: Option<&str>, out: &mut String);

    /// Render a hard break.
    fn hard_break(out: &mut String) {
        out.push_str("<br>");
    }

    /// Render a thematic break.
    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr>");
    }
}
