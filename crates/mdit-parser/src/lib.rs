//! CommonMark parser producing an owned document tree.
//!
//! Parsing runs in two phases. The block phase consumes the input line by
//! line and builds the container structure (quotes, lists, items) and leaf
//! blocks (paragraphs, headings, code, HTML, tables), collecting link
//! reference definitions along the way. The inline phase then resolves the
//! raw text of every paragraph, heading and table cell against those
//! definitions.
//!
//! Parsing never fails: any input produces a [`Document`], with malformed
//! constructs degrading to literal text.
//!
//! # Example
//!
//! ```
//! use mdit_parser::{Block, Inline, parse};
//!
//! let doc = parse("# Hello\n\nSome *text*.\n");
//! assert_eq!(doc.blocks.len(), 2);
//! assert!(matches!(doc.blocks[0], Block::Heading { level: 1, .. }));
//! if let Block::Paragraph(inlines) = &doc.blocks[1] {
//!     assert!(matches!(inlines[1], Inline::Emphasis(_)));
//! }
//! ```

pub mod ast;
mod block;
mod entities;
mod html;
mod inline;
mod link;
mod preprocess;
mod refs;
mod url;

pub use ast::{
    Alignment, Block, Document, Inline, Link, List, ListKind, Table, plain_text, plain_text_into,
};
pub use entities::{decode_entity, entity_to_unicode, unescape};
pub use preprocess::{TAB_STOP, preprocess};
pub use refs::{LinkReference, ReferenceMap, normalize_label};
pub use url::{normalize_link, validate_link};

use block::BlockParser;

/// Deepest nesting the parser builds.
///
/// Containers (block quotes, lists and their items) and inline markup
/// (emphasis, links, images) are limited separately. Markers past the limit
/// stay literal text.
pub const MAX_NESTING: usize = 100;

/// Parse markdown source into a [`Document`].
#[must_use]
pub fn parse(input: &str) -> Document {
    let text = preprocess(input);
    let document = BlockParser::new().parse(&text);

    tracing::debug!(
        input_len = input.len(),
        blocks = document.blocks.len(),
        references = document.references.len(),
        "Parsed markdown"
    );

    document
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Document: Send, Sync, Clone);

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse(""), Document::default());
        assert_eq!(parse("\n\n  \n").blocks, vec![]);
    }

    #[test]
    fn test_parse_normalizes_input() {
        let doc = parse("\u{feff}a\r\nb\r\n");
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph(vec![
                Inline::Text("a".to_owned()),
                Inline::SoftBreak,
                Inline::Text("b".to_owned()),
            ])]
        );
    }

    #[test]
    fn test_parse_collects_references() {
        let doc = parse("[a]: /x\n[b]: /y \"t\"\n\n[a] [b]\n");
        assert_eq!(doc.references.len(), 2);
        assert_eq!(
            doc.references.get("B").map(|r| r.title.as_deref()),
            Some(Some("t"))
        );
        assert_eq!(doc.blocks.len(), 1);

        let mut labels: Vec<&str> = doc.references.iter().map(|(label, _)| label).collect();
        labels.sort_unstable();
        assert_eq!(labels, vec![normalize_label("a"), normalize_label("b")]);
    }

    #[test]
    fn test_parse_tab_indented_code() {
        let doc = parse("\tcode\n");
        assert_eq!(
            doc.blocks,
            vec![Block::CodeBlock {
                info: None,
                literal: "code\n".to_owned(),
            }]
        );
    }
}
