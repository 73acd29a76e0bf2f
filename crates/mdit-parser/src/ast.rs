//! Parsed document tree.
//!
//! The tree is balanced by construction: container blocks own their children
//! and inline containers own their inline children, so there is no separate
//! open/close pairing to validate.

use crate::refs::ReferenceMap;

/// A fully parsed markdown document.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    /// Top-level blocks in source order.
    pub blocks: Vec<Block>,
    /// Link reference definitions collected during the block phase.
    pub references: ReferenceMap,
}

/// Block-level node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Block {
    /// Paragraph with resolved inline content.
    Paragraph(Vec<Inline>),
    /// ATX or setext heading. `level` is the source level (1-6).
    Heading {
        /// Source heading level.
        level: u8,
        /// Inline content.
        content: Vec<Inline>,
    },
    /// `***`, `---` or `___`.
    ThematicBreak,
    /// `>` block quote.
    BlockQuote(Vec<Block>),
    /// Bullet or ordered list.
    List(List),
    /// Fenced or indented code block.
    CodeBlock {
        /// Info string of a fenced block (unescaped, trimmed). `None` for
        /// indented blocks and fences without info.
        info: Option<String>,
        /// Literal content, each line terminated by `\n`.
        literal: String,
    },
    /// Raw HTML block, emitted verbatim.
    HtmlBlock(String),
    /// Pipe table.
    Table(Table),
}

/// List block.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct List {
    /// Bullet or ordered, with its marker character.
    pub kind: ListKind,
    /// Start number of an ordered list (1 for bullet lists).
    pub start: u32,
    /// Tight lists render their paragraphs without `<p>` tags.
    pub tight: bool,
    /// Items, each a sequence of blocks.
    pub items: Vec<Vec<Block>>,
}

/// List marker family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ListKind {
    /// Bullet list with its marker (`-`, `+` or `*`).
    Bullet(char),
    /// Ordered list with its delimiter (`.` or `)`).
    Ordered(char),
}

impl ListKind {
    /// Whether the list renders as `<ol>`.
    #[must_use]
    pub fn is_ordered(self) -> bool {
        matches!(self, Self::Ordered(_))
    }
}

/// Pipe table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    /// Column alignments; its length is the column count.
    pub alignments: Vec<Alignment>,
    /// Header cells.
    pub header: Vec<Vec<Inline>>,
    /// Body rows, each normalized to the column count.
    pub rows: Vec<Vec<Vec<Inline>>>,
}

/// Table column alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alignment {
    /// No colon in the delimiter cell.
    #[default]
    None,
    /// `:--`
    Left,
    /// `:-:`
    Center,
    /// `--:`
    Right,
}

/// Inline-level node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Inline {
    /// Literal text (already unescaped and entity-decoded).
    Text(String),
    /// Code span content.
    Code(String),
    /// Raw inline HTML, emitted verbatim.
    Html(String),
    /// Line break inside a paragraph.
    SoftBreak,
    /// Forced line break.
    HardBreak,
    /// `*text*` or `_text_`.
    Emphasis(Vec<Inline>),
    /// `**text**` or `__text__`.
    Strong(Vec<Inline>),
    /// `~~text~~`.
    Strikethrough(Vec<Inline>),
    /// Hyperlink.
    Link(Link),
    /// Image; `children` hold the alt text.
    Image(Link),
}

/// Link or image target with its content.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    /// Normalized (percent-encoded) destination.
    pub destination: String,
    /// Optional title.
    pub title: Option<String>,
    /// Link text or image description.
    pub children: Vec<Inline>,
    /// Whether the link came from `<scheme:...>` or `<user@host>`.
    pub autolink: bool,
}

impl Inline {
    /// Concatenated plain text of this node, without markup.
    ///
    /// Used for image `alt` attributes and heading outlines.
    pub fn push_plain_text(&self, out: &mut String) {
        match self {
            Self::Text(text) | Self::Code(text) => out.push_str(text),
            Self::Html(_) => {}
            Self::SoftBreak | Self::HardBreak => out.push('\n'),
            Self::Emphasis(children) | Self::Strong(children) | Self::Strikethrough(children) => {
                plain_text_into(children, out);
            }
            Self::Link(link) | Self::Image(link) => plain_text_into(&link.children, out),
        }
    }
}

/// Append the plain text of a sequence of inlines to `out`.
pub fn plain_text_into(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        inline.push_plain_text(out);
    }
}

/// Plain text of a sequence of inlines.
#[must_use]
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    plain_text_into(inlines, &mut out);
    out
}
