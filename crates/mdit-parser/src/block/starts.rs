//! Block start rules, tried in priority order on each line.

use crate::ast::ListKind;
use crate::html::HtmlBlockKind;

use super::{BlockParser, CODE_INDENT, ListData, NodeKind, table};

/// Outcome of a block start rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum BlockStart {
    None,
    /// A container was opened; keep looking for starts inside it.
    Container,
    /// A leaf was opened; the rest of the line belongs to it.
    Leaf,
}

type StartRule = fn(&mut BlockParser<'_>, usize) -> BlockStart;

/// Start rules; the first one that matches wins.
pub(super) const BLOCK_STARTS: [StartRule; 9] = [
    indented_code,
    thematic_break,
    atx_heading,
    fenced_code,
    html_block,
    block_quote,
    list_item,
    table_start,
    setext_heading,
];

/// Cheap pre-check: can any start rule match a non-indented line?
pub(super) fn maybe_special(rest: &str) -> bool {
    rest.bytes()
        .next()
        .is_some_and(|b| b"#`~*+_=<>-|:".contains(&b) || b.is_ascii_digit())
}

fn is_paragraph(parser: &BlockParser<'_>, idx: usize) -> bool {
    matches!(parser.nodes[idx].kind, NodeKind::Paragraph)
}

fn indented_code(parser: &mut BlockParser<'_>, _container: usize) -> BlockStart {
    if !parser.indented || parser.blank || is_paragraph(parser, parser.tip) {
        return BlockStart::None;
    }
    parser.advance_offset(CODE_INDENT);
    parser.close_unmatched_blocks();
    parser.add_child(NodeKind::IndentedCode);
    BlockStart::Leaf
}

fn thematic_break(parser: &mut BlockParser<'_>, container: usize) -> BlockStart {
    if parser.indented || !is_thematic_break(parser.rest()) {
        return BlockStart::None;
    }

    // `---` under a paragraph is a setext underline
    if is_paragraph(parser, container) && setext_level(parser.rest()).is_some() {
        let started = setext_heading(parser, container);
        if started != BlockStart::None {
            return started;
        }
    }

    parser.close_unmatched_blocks();
    parser.add_child(NodeKind::ThematicBreak);
    parser.advance_to_end();
    BlockStart::Leaf
}

fn atx_heading(parser: &mut BlockParser<'_>, _container: usize) -> BlockStart {
    if parser.indented {
        return BlockStart::None;
    }
    let Some(level) = atx_level(parser.rest()) else {
        return BlockStart::None;
    };

    parser.advance_next_nonspace();
    parser.advance_offset(usize::from(level));
    parser.close_unmatched_blocks();
    let idx = parser.add_child(NodeKind::Heading(level));
    parser.nodes[idx].content = strip_closing_sequence(parser.remainder()).to_owned();
    parser.advance_to_end();
    BlockStart::Leaf
}

fn fenced_code(parser: &mut BlockParser<'_>, _container: usize) -> BlockStart {
    if parser.indented {
        return BlockStart::None;
    }
    let Some((fence_char, fence_len)) = opening_fence(parser.rest()) else {
        return BlockStart::None;
    };

    let fence_offset = parser.indent;
    parser.close_unmatched_blocks();
    parser.add_child(NodeKind::FencedCode {
        fence_char,
        fence_len,
        fence_offset,
    });
    parser.advance_next_nonspace();
    parser.advance_offset(fence_len);
    BlockStart::Leaf
}

fn html_block(parser: &mut BlockParser<'_>, container: usize) -> BlockStart {
    if parser.indented {
        return BlockStart::None;
    }
    let Some(kind) = HtmlBlockKind::detect(parser.rest()) else {
        return BlockStart::None;
    };

    let lazy_paragraph = !parser.all_closed && !parser.blank && is_paragraph(parser, parser.tip);
    if !kind.can_interrupt_paragraph() && (is_paragraph(parser, container) || lazy_paragraph) {
        return BlockStart::None;
    }

    parser.close_unmatched_blocks();
    parser.add_child(NodeKind::Html(kind));
    BlockStart::Leaf
}

fn block_quote(parser: &mut BlockParser<'_>, container: usize) -> BlockStart {
    if parser.indented
        || parser.peek(parser.next_nonspace) != Some(b'>')
        || !parser.has_room(container, 1)
    {
        return BlockStart::None;
    }

    parser.advance_next_nonspace();
    parser.advance_offset(1);
    if parser.peek(parser.offset) == Some(b' ') {
        parser.advance_offset(1);
    }
    parser.close_unmatched_blocks();
    parser.add_child(NodeKind::BlockQuote);
    BlockStart::Container
}

fn list_item(parser: &mut BlockParser<'_>, container: usize) -> BlockStart {
    // A new list and its item
    if !parser.has_room(container, 2) {
        return BlockStart::None;
    }
    let Some(data) = parse_list_marker(parser, container) else {
        return BlockStart::None;
    };

    parser.close_unmatched_blocks();
    let continues_list = matches!(
        parser.nodes[parser.tip].kind,
        NodeKind::List { data: existing, .. } if existing.kind == data.kind
    );
    if !continues_list {
        parser.add_child(NodeKind::List { data, tight: true });
    }
    parser.add_child(NodeKind::Item(data));
    BlockStart::Container
}

fn parse_list_marker(parser: &mut BlockParser<'_>, container: usize) -> Option<ListData> {
    if parser.indent >= CODE_INDENT {
        return None;
    }

    let rest = parser.rest();
    let bytes = rest.as_bytes();
    let interrupts_paragraph = is_paragraph(parser, container);

    let (kind, start, marker_len) = match *bytes.first()? {
        b @ (b'*' | b'+' | b'-') => (ListKind::Bullet(char::from(b)), 1, 1),
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > 9 {
                return None;
            }
            let delimiter = *bytes.get(digits)?;
            if delimiter != b'.' && delimiter != b')' {
                return None;
            }
            let start: u32 = rest[..digits].parse().ok()?;
            if interrupts_paragraph && start != 1 {
                return None;
            }
            (ListKind::Ordered(char::from(delimiter)), start, digits + 1)
        }
        _ => return None,
    };

    if !matches!(bytes.get(marker_len), None | Some(b' ')) {
        return None;
    }
    if interrupts_paragraph && rest[marker_len..].trim_matches(' ').is_empty() {
        return None;
    }

    let marker_offset = parser.indent;
    parser.advance_next_nonspace();
    parser.advance_offset(marker_len);

    let spaces = parser
        .remainder()
        .bytes()
        .take_while(|&b| b == b' ')
        .count();
    let blank_item = spaces == parser.remainder().len();

    let padding = if spaces == 0 || spaces > CODE_INDENT || blank_item {
        // Content starts one space after the marker
        if spaces > 0 {
            parser.advance_offset(1);
        }
        marker_len + 1
    } else {
        parser.advance_offset(spaces);
        marker_len + spaces
    };

    Some(ListData {
        kind,
        start,
        marker_offset,
        padding,
    })
}

fn table_start(parser: &mut BlockParser<'_>, container: usize) -> BlockStart {
    if parser.indented || !is_paragraph(parser, container) {
        return BlockStart::None;
    }
    let Some(alignments) = table::parse_delimiter_row(parser.rest()) else {
        return BlockStart::None;
    };

    let content = &parser.nodes[container].content;
    let body = content.strip_suffix('\n').unwrap_or(content);
    let (before, header_line) = match body.rfind('\n') {
        Some(i) => (&body[..=i], &body[i + 1..]),
        None => ("", body),
    };
    let Some(header) = table::parse_header_row(header_line, alignments.len()) else {
        return BlockStart::None;
    };
    let before = before.to_owned();

    parser.close_unmatched_blocks();
    if before.is_empty() {
        parser.unlink(container);
        parser.tip = parser.parent_of(container);
    } else {
        parser.nodes[container].content = before;
        parser.finalize(container, parser.line_number - 1);
    }

    let idx = parser.add_child(NodeKind::Table {
        alignments,
        header,
        rows: Vec::new(),
    });
    parser.nodes[idx].start_line = parser.line_number - 1;
    parser.advance_to_end();
    BlockStart::Leaf
}

fn setext_heading(parser: &mut BlockParser<'_>, container: usize) -> BlockStart {
    if parser.indented || !is_paragraph(parser, container) {
        return BlockStart::None;
    }
    let Some(level) = setext_level(parser.rest()) else {
        return BlockStart::None;
    };

    parser.close_unmatched_blocks();
    parser.strip_reference_definitions(container);
    if parser.nodes[container].content.is_empty() {
        return BlockStart::None;
    }

    parser.nodes[container].kind = NodeKind::Heading(level);
    parser.advance_to_end();
    BlockStart::Leaf
}

/// `***`, `- - -`, `___` and friends.
pub(super) fn is_thematic_break(rest: &str) -> bool {
    let Some(marker) = rest.bytes().next() else {
        return false;
    };
    if !matches!(marker, b'*' | b'-' | b'_') {
        return false;
    }
    let mut count = 0;
    for b in rest.bytes() {
        if b == marker {
            count += 1;
        } else if b != b' ' {
            return false;
        }
    }
    count >= 3
}

fn atx_level(rest: &str) -> Option<u8> {
    let hashes = rest.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    if !matches!(rest.as_bytes().get(hashes), None | Some(b' ')) {
        return None;
    }
    u8::try_from(hashes).ok()
}

/// Remove an optional closing `#` sequence from ATX heading text.
fn strip_closing_sequence(text: &str) -> &str {
    let trimmed = text.trim_end_matches(' ');
    let without_hashes = trimmed.trim_end_matches('#');
    if without_hashes.len() == trimmed.len() {
        return trimmed;
    }
    if without_hashes.trim_start_matches(' ').is_empty() {
        return "";
    }
    if without_hashes.ends_with(' ') {
        without_hashes.trim_end_matches(' ')
    } else {
        trimmed
    }
}

fn setext_level(rest: &str) -> Option<u8> {
    let underline = rest.trim_end_matches(' ');
    if underline.is_empty() {
        None
    } else if underline.bytes().all(|b| b == b'=') {
        Some(1)
    } else if underline.bytes().all(|b| b == b'-') {
        Some(2)
    } else {
        None
    }
}

fn opening_fence(rest: &str) -> Option<(u8, usize)> {
    let fence_char = *rest.as_bytes().first()?;
    if fence_char != b'`' && fence_char != b'~' {
        return None;
    }
    let len = rest.bytes().take_while(|&b| b == fence_char).count();
    if len < 3 {
        return None;
    }
    // Backtick fences may not have backticks in the info string
    if fence_char == b'`' && rest[len..].contains('`') {
        return None;
    }
    Some((fence_char, len))
}

/// Length of a closing fence made of `fence_char`, or 0 if `rest` is not one.
pub(super) fn closing_fence_len(rest: &str, fence_char: u8) -> usize {
    let len = rest.bytes().take_while(|&b| b == fence_char).count();
    if len < 3 || !rest[len..].trim_end_matches(' ').is_empty() {
        return 0;
    }
    len
}

fn starts_list_item(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    let marker_len = match bytes.first() {
        Some(b'*' | b'+' | b'-') => 1,
        Some(b) if b.is_ascii_digit() => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > 9 || !matches!(bytes.get(digits), Some(b'.' | b')')) {
                return false;
            }
            digits + 1
        }
        _ => return false,
    };
    bytes.get(marker_len) == Some(&b' ') && !rest[marker_len..].trim_matches(' ').is_empty()
}

/// Whether a line ends a table body by starting another block.
pub(super) fn interrupts_table(rest: &str) -> bool {
    rest.starts_with('>')
        || atx_level(rest).is_some()
        || opening_fence(rest).is_some()
        || is_thematic_break(rest)
        || starts_list_item(rest)
        || HtmlBlockKind::detect(rest).is_some_and(HtmlBlockKind::can_interrupt_paragraph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thematic_break_detection() {
        assert!(is_thematic_break("***"));
        assert!(is_thematic_break("- - -"));
        assert!(is_thematic_break("_____   "));
        assert!(!is_thematic_break("**"));
        assert!(!is_thematic_break("*-*"));
        assert!(!is_thematic_break("--- a"));
    }

    #[test]
    fn test_atx_level() {
        assert_eq!(atx_level("# a"), Some(1));
        assert_eq!(atx_level("######"), Some(6));
        assert_eq!(atx_level("#######"), None);
        assert_eq!(atx_level("#a"), None);
    }

    #[test]
    fn test_strip_closing_sequence() {
        assert_eq!(strip_closing_sequence("foo ##"), "foo");
        assert_eq!(strip_closing_sequence("foo#"), "foo#");
        assert_eq!(strip_closing_sequence("##"), "");
        assert_eq!(strip_closing_sequence(r"foo \#"), r"foo \#");
        assert_eq!(strip_closing_sequence("foo   "), "foo");
    }

    #[test]
    fn test_setext_level() {
        assert_eq!(setext_level("==="), Some(1));
        assert_eq!(setext_level("-  "), Some(2));
        assert_eq!(setext_level("- -"), None);
        assert_eq!(setext_level("=-"), None);
    }

    #[test]
    fn test_fences() {
        assert_eq!(opening_fence("```rust"), Some((b'`', 3)));
        assert_eq!(opening_fence("~~~~ a`b"), Some((b'~', 4)));
        assert_eq!(opening_fence("``` a`b"), None);
        assert_eq!(opening_fence("``"), None);
        assert_eq!(closing_fence_len("````  ", b'`'), 4);
        assert_eq!(closing_fence_len("``` x", b'`'), 0);
        assert_eq!(closing_fence_len("~~~", b'`'), 0);
    }

    #[test]
    fn test_interrupts_table() {
        assert!(interrupts_table("> q"));
        assert!(interrupts_table("# h"));
        assert!(interrupts_table("- item"));
        assert!(interrupts_table("<div>"));
        assert!(!interrupts_table("| a | b |"));
        assert!(!interrupts_table("-5 | x"));
        assert!(!interrupts_table("<span>"));
    }

    #[test]
    fn test_maybe_special() {
        assert!(maybe_special("# x"));
        assert!(maybe_special("1. x"));
        assert!(maybe_special("|a|"));
        assert!(!maybe_special("plain"));
        assert!(!maybe_special(""));
    }
}
