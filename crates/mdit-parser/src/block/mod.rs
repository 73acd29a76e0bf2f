//! Block structure phase.
//!
//! Lines are consumed one at a time against a stack of open blocks kept in an
//! index arena. Once the input is exhausted the arena is converted into the
//! owned [`Block`] tree, running the inline phase on every leaf.

mod starts;
mod table;

use crate::MAX_NESTING;
use crate::ast::{Alignment, Block, Document, List, ListKind, Table};
use crate::entities::unescape;
use crate::html::HtmlBlockKind;
use crate::inline::parse_inlines;
use crate::refs::{ReferenceMap, parse_reference};

use self::starts::{BLOCK_STARTS, BlockStart, maybe_special};

/// Indentation that turns a line into indented code.
const CODE_INDENT: usize = 4;

const DOCUMENT: usize = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ListData {
    kind: ListKind,
    start: u32,
    marker_offset: usize,
    padding: usize,
}

#[derive(Debug)]
enum NodeKind {
    Document,
    BlockQuote,
    List { data: ListData, tight: bool },
    Item(ListData),
    Paragraph,
    Heading(u8),
    ThematicBreak,
    FencedCode {
        fence_char: u8,
        fence_len: usize,
        fence_offset: usize,
    },
    IndentedCode,
    Html(HtmlBlockKind),
    Table {
        alignments: Vec<Alignment>,
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl NodeKind {
    fn can_contain(&self, child: &Self) -> bool {
        match self {
            Self::Document | Self::BlockQuote | Self::Item(_) => !matches!(child, Self::Item(_)),
            Self::List { .. } => matches!(child, Self::Item(_)),
            _ => false,
        }
    }

    fn accepts_lines(&self) -> bool {
        matches!(
            self,
            Self::Paragraph
                | Self::FencedCode { .. }
                | Self::IndentedCode
                | Self::Html(_)
                | Self::Table { .. }
        )
    }
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<usize>,
    children: Vec<usize>,
    open: bool,
    start_line: usize,
    end_line: usize,
    content: String,
    info: Option<String>,
}

impl Node {
    fn new(kind: NodeKind, parent: Option<usize>, line: usize) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            open: true,
            start_line: line,
            end_line: line,
            content: String::new(),
            info: None,
        }
    }
}

enum Continuation {
    Matched,
    Failed,
    /// The line was fully consumed (closing code fence).
    LineDone,
}

/// Line-oriented block parser.
pub(crate) struct BlockParser<'a> {
    nodes: Vec<Node>,
    tip: usize,
    old_tip: usize,
    last_matched: usize,
    all_closed: bool,
    line: &'a str,
    line_number: usize,
    offset: usize,
    next_nonspace: usize,
    indent: usize,
    indented: bool,
    blank: bool,
    references: ReferenceMap,
}

impl<'a> BlockParser<'a> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document, None, 0)],
            tip: DOCUMENT,
            old_tip: DOCUMENT,
            last_matched: DOCUMENT,
            all_closed: true,
            line: "",
            line_number: 0,
            offset: 0,
            next_nonspace: 0,
            indent: 0,
            indented: false,
            blank: false,
            references: ReferenceMap::new(),
        }
    }

    /// Parse normalized input (see [`crate::preprocess`]) into a document.
    pub(crate) fn parse(mut self, input: &'a str) -> Document {
        let body = input.strip_suffix('\n').unwrap_or(input);
        for line in body.split('\n') {
            self.incorporate_line(line);
        }
        self.finish()
    }

    fn incorporate_line(&mut self, line: &'a str) {
        self.line = line;
        self.offset = 0;
        self.blank = false;
        self.line_number += 1;
        self.old_tip = self.tip;

        let mut container = DOCUMENT;
        while let Some(&last) = self.nodes[container].children.last() {
            if !self.nodes[last].open {
                break;
            }
            container = last;
            self.find_next_nonspace();
            match self.continue_block(container) {
                Continuation::Matched => {}
                Continuation::Failed => {
                    container = self.parent_of(container);
                    break;
                }
                Continuation::LineDone => return,
            }
        }

        self.all_closed = container == self.old_tip;
        self.last_matched = container;

        let kind = &self.nodes[container].kind;
        let mut matched_leaf = !matches!(kind, NodeKind::Paragraph) && kind.accepts_lines();
        while !matched_leaf {
            self.find_next_nonspace();
            if !self.indented && !maybe_special(self.rest()) {
                self.advance_next_nonspace();
                break;
            }

            let started = BLOCK_STARTS
                .iter()
                .map(|start| start(self, container))
                .find(|started| *started != BlockStart::None)
                .unwrap_or(BlockStart::None);

            match started {
                BlockStart::Container => container = self.tip,
                BlockStart::Leaf => {
                    container = self.tip;
                    matched_leaf = true;
                }
                BlockStart::None => {
                    self.advance_next_nonspace();
                    break;
                }
            }
        }

        if !self.all_closed && !self.blank && matches!(self.nodes[self.tip].kind, NodeKind::Paragraph)
        {
            // Lazy paragraph continuation
            self.add_line();
            return;
        }

        self.close_unmatched_blocks();
        if self.nodes[container].kind.accepts_lines() {
            self.add_line();
            if let NodeKind::Html(kind) = self.nodes[container].kind
                && kind.is_closed_by(self.remainder())
            {
                self.finalize(container, self.line_number);
            }
        } else if self.offset < self.line.len() && !self.blank {
            self.add_child(NodeKind::Paragraph);
            self.advance_next_nonspace();
            self.add_line();
        }
    }

    fn continue_block(&mut self, idx: usize) -> Continuation {
        match self.nodes[idx].kind {
            NodeKind::Document | NodeKind::List { .. } => Continuation::Matched,
            NodeKind::BlockQuote => {
                if self.indented || self.peek(self.next_nonspace) != Some(b'>') {
                    return Continuation::Failed;
                }
                self.advance_next_nonspace();
                self.advance_offset(1);
                if self.peek(self.offset) == Some(b' ') {
                    self.advance_offset(1);
                }
                Continuation::Matched
            }
            NodeKind::Item(data) => {
                let width = data.marker_offset + data.padding;
                if self.blank {
                    if self.nodes[idx].children.is_empty() {
                        return Continuation::Failed;
                    }
                    self.advance_next_nonspace();
                } else if self.indent >= width {
                    self.advance_offset(width);
                } else {
                    return Continuation::Failed;
                }
                Continuation::Matched
            }
            NodeKind::Heading(_) | NodeKind::ThematicBreak => Continuation::Failed,
            NodeKind::FencedCode {
                fence_char,
                fence_len,
                fence_offset,
            } => {
                if self.indent <= 3 && starts::closing_fence_len(self.rest(), fence_char) >= fence_len
                {
                    self.finalize(idx, self.line_number);
                    return Continuation::LineDone;
                }
                let mut remaining = fence_offset;
                while remaining > 0 && self.peek(self.offset) == Some(b' ') {
                    self.advance_offset(1);
                    remaining -= 1;
                }
                Continuation::Matched
            }
            NodeKind::IndentedCode => {
                if self.indent >= CODE_INDENT {
                    self.advance_offset(CODE_INDENT);
                } else if self.blank {
                    self.advance_next_nonspace();
                } else {
                    return Continuation::Failed;
                }
                Continuation::Matched
            }
            NodeKind::Html(kind) => {
                if self.blank && kind.ends_at_blank_line() {
                    Continuation::Failed
                } else {
                    Continuation::Matched
                }
            }
            NodeKind::Paragraph => {
                if self.blank {
                    Continuation::Failed
                } else {
                    Continuation::Matched
                }
            }
            NodeKind::Table { .. } => {
                if self.blank || self.indented || starts::interrupts_table(self.rest()) {
                    Continuation::Failed
                } else {
                    Continuation::Matched
                }
            }
        }
    }

    fn parent_of(&self, idx: usize) -> usize {
        self.nodes[idx].parent.unwrap_or(DOCUMENT)
    }

    /// Whether `count` more containers fit below `idx`.
    fn has_room(&self, idx: usize, count: usize) -> bool {
        let mut depth = 0;
        let mut current = idx;
        while let Some(parent) = self.nodes[current].parent {
            depth += 1;
            current = parent;
        }
        depth + count <= MAX_NESTING
    }

    fn peek(&self, pos: usize) -> Option<u8> {
        self.line.as_bytes().get(pos).copied()
    }

    /// Line text from the next non-space character.
    fn rest(&self) -> &'a str {
        self.line.get(self.next_nonspace..).unwrap_or("")
    }

    /// Line text from the current offset.
    fn remainder(&self) -> &'a str {
        self.line.get(self.offset..).unwrap_or("")
    }

    fn find_next_nonspace(&mut self) {
        let bytes = self.line.as_bytes();
        let mut i = self.offset;
        while bytes.get(i) == Some(&b' ') {
            i += 1;
        }
        self.next_nonspace = i;
        self.indent = i - self.offset;
        self.indented = self.indent >= CODE_INDENT;
        self.blank = i >= bytes.len();
    }

    fn advance_offset(&mut self, count: usize) {
        self.offset = (self.offset + count).min(self.line.len());
    }

    fn advance_next_nonspace(&mut self) {
        self.offset = self.next_nonspace;
    }

    fn advance_to_end(&mut self) {
        self.offset = self.line.len();
    }

    fn add_line(&mut self) {
        let text = self.remainder();
        let tip = self.tip;
        if let NodeKind::Table {
            ref alignments,
            ref mut rows,
            ..
        } = self.nodes[tip].kind
        {
            // The delimiter row leaves nothing behind
            if !text.trim_matches(' ').is_empty() {
                rows.push(table::parse_body_row(text, alignments.len()));
            }
            return;
        }

        let content = &mut self.nodes[tip].content;
        content.push_str(text);
        content.push('\n');
    }

    fn add_child(&mut self, kind: NodeKind) -> usize {
        while !self.nodes[self.tip].kind.can_contain(&kind) {
            self.finalize(self.tip, self.line_number - 1);
        }

        tracing::trace!(line = self.line_number, kind = ?kind, "open block");

        let idx = self.nodes.len();
        self.nodes
            .push(Node::new(kind, Some(self.tip), self.line_number));
        self.nodes[self.tip].children.push(idx);
        self.tip = idx;
        idx
    }

    fn unlink(&mut self, idx: usize) {
        if let Some(parent) = self.nodes[idx].parent {
            self.nodes[parent].children.retain(|&child| child != idx);
        }
    }

    fn close_unmatched_blocks(&mut self) {
        if self.all_closed {
            return;
        }
        while self.old_tip != self.last_matched {
            let parent = self.parent_of(self.old_tip);
            self.finalize(self.old_tip, self.line_number - 1);
            self.old_tip = parent;
        }
        self.all_closed = true;
    }

    /// Peel link reference definitions off the start of a paragraph.
    fn strip_reference_definitions(&mut self, idx: usize) {
        let mut content = std::mem::take(&mut self.nodes[idx].content);
        while content.starts_with('[') {
            match parse_reference(&content, &mut self.references) {
                Some(consumed) => {
                    content.drain(..consumed);
                }
                None => break,
            }
        }
        self.nodes[idx].content = content;
    }

    fn finalize(&mut self, idx: usize, line_number: usize) {
        let parent = self.nodes[idx].parent;
        self.nodes[idx].open = false;
        self.nodes[idx].end_line = line_number;

        match self.nodes[idx].kind {
            NodeKind::Paragraph => {
                self.strip_reference_definitions(idx);
                if self.nodes[idx].content.trim_matches([' ', '\n']).is_empty() {
                    self.unlink(idx);
                }
            }
            NodeKind::FencedCode { .. } => {
                let node = &mut self.nodes[idx];
                let content = std::mem::take(&mut node.content);
                let (first, rest) = content.split_once('\n').unwrap_or((content.as_str(), ""));
                let info = unescape(first.trim());
                node.info = (!info.is_empty()).then(|| info.into_owned());
                node.content = rest.to_owned();
            }
            NodeKind::IndentedCode => {
                let node = &mut self.nodes[idx];
                let mut lines: Vec<&str> = node.content.split('\n').collect();
                while lines.last().is_some_and(|l| l.trim_matches(' ').is_empty()) {
                    lines.pop();
                }
                let kept = lines.len();
                let mut literal = lines.join("\n");
                literal.push('\n');
                node.content = literal;
                // Trailing blank lines are not part of the block
                node.end_line = node.start_line + kept.saturating_sub(1);
            }
            NodeKind::Html(_) => trim_trailing_blank_lines(&mut self.nodes[idx].content),
            NodeKind::Item(_) => {
                let last_end = self.nodes[idx]
                    .children
                    .last()
                    .map(|&child| self.nodes[child].end_line);
                let node = &mut self.nodes[idx];
                node.end_line = last_end.unwrap_or(node.start_line);
            }
            NodeKind::List { .. } => {
                let tight = self.is_tight(idx);
                let last_end = self.nodes[idx]
                    .children
                    .last()
                    .map(|&child| self.nodes[child].end_line);
                let node = &mut self.nodes[idx];
                if let NodeKind::List { tight: ref mut t, .. } = node.kind {
                    *t = tight;
                }
                if let Some(end) = last_end {
                    node.end_line = end;
                }
            }
            _ => {}
        }

        self.tip = parent.unwrap_or(DOCUMENT);
    }

    /// A list is loose when any item, or any direct child of an item, is
    /// followed by a sibling after a blank line.
    fn is_tight(&self, list: usize) -> bool {
        let gap_after = |siblings: &[usize]| {
            siblings
                .windows(2)
                .any(|pair| self.nodes[pair[0]].end_line + 1 != self.nodes[pair[1]].start_line)
        };

        let items = &self.nodes[list].children;
        !gap_after(items) && !items.iter().any(|&item| gap_after(&self.nodes[item].children))
    }

    fn finish(mut self) -> Document {
        let last_line = self.line_number;
        loop {
            let tip = self.tip;
            let parent = self.nodes[tip].parent;
            self.finalize(tip, last_line);
            if parent.is_none() {
                break;
            }
        }

        let references = std::mem::take(&mut self.references);
        let blocks = build_children(&mut self.nodes, DOCUMENT, &references);
        Document { blocks, references }
    }
}

fn trim_trailing_blank_lines(content: &mut String) {
    while let Some(rest) = content.trim_end_matches(' ').strip_suffix('\n') {
        let len = rest.len();
        content.truncate(len);
    }
}

fn build_children(nodes: &mut [Node], idx: usize, refs: &ReferenceMap) -> Vec<Block> {
    let children = std::mem::take(&mut nodes[idx].children);
    children
        .into_iter()
        .filter_map(|child| build_block(nodes, child, refs))
        .collect()
}

fn build_block(nodes: &mut [Node], idx: usize, refs: &ReferenceMap) -> Option<Block> {
    let kind = std::mem::replace(&mut nodes[idx].kind, NodeKind::Document);
    let content = std::mem::take(&mut nodes[idx].content);

    let block = match kind {
        NodeKind::Paragraph => Block::Paragraph(parse_inlines(&content, refs)),
        NodeKind::Heading(level) => Block::Heading {
            level,
            content: parse_inlines(&content, refs),
        },
        NodeKind::ThematicBreak => Block::ThematicBreak,
        NodeKind::BlockQuote => Block::BlockQuote(build_children(nodes, idx, refs)),
        NodeKind::FencedCode { .. } => Block::CodeBlock {
            info: nodes[idx].info.take(),
            literal: content,
        },
        NodeKind::IndentedCode => Block::CodeBlock {
            info: None,
            literal: content,
        },
        NodeKind::Html(_) => Block::HtmlBlock(content),
        NodeKind::List { data, tight } => {
            let items = std::mem::take(&mut nodes[idx].children)
                .into_iter()
                .map(|item| build_children(nodes, item, refs))
                .collect();
            Block::List(List {
                kind: data.kind,
                start: data.start,
                tight,
                items,
            })
        }
        NodeKind::Table {
            alignments,
            header,
            rows,
        } => {
            let cells = |row: Vec<String>| -> Vec<_> {
                row.iter().map(|cell| parse_inlines(cell, refs)).collect()
            };
            Block::Table(Table {
                alignments,
                header: cells(header),
                rows: rows.into_iter().map(cells).collect(),
            })
        }
        NodeKind::Document | NodeKind::Item(_) => return None,
    };

    Some(block)
}
