//! Inline phase: resolves the raw text of a leaf block into inline nodes.
//!
//! A single left-to-right scan produces text, code, HTML and break nodes,
//! pushing `*`/`_`/`~~` runs onto a delimiter stack and `[`/`![` onto a
//! bracket stack. Brackets resolve when their `]` is seen; remaining
//! delimiters resolve once the scan is complete. Bare web addresses left in
//! the text are linkified last.

mod delimiter;
mod linkify;
mod tree;

use std::sync::LazyLock;

use regex::Regex;

use crate::MAX_NESTING;
use crate::ast::Inline;
use crate::entities::match_entity;
use crate::html::match_inline_html;
use crate::link::{scan_destination, scan_label, scan_title, skip_spnl};
use crate::refs::ReferenceMap;
use crate::url::{normalize_link, validate_link};

use self::delimiter::{Delimiter, flanking};
use self::tree::{LinkTarget, NodeValue, ROOT, Tree};

static EMAIL_AUTOLINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^<([a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
        r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*)>",
    ))
    .expect("invalid email autolink regex")
});

static URI_AUTOLINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<([A-Za-z][A-Za-z0-9.+-]{1,31}:[^<>\x00-\x20]*)>")
        .expect("invalid autolink regex")
});

/// Characters that may start something other than plain text.
const SPECIAL: &[char] = &[
    '\n', '`', '[', ']', '\\', '!', '<', '&', '*', '_', '~',
];

/// Parse the raw text of a leaf block.
///
/// Never fails: anything that does not form a construct stays literal text.
pub(crate) fn parse_inlines(text: &str, refs: &ReferenceMap) -> Vec<Inline> {
    let mut parser = InlineParser {
        subject: text.trim_matches([' ', '\t', '\n']),
        pos: 0,
        refs,
        tree: Tree::new(),
        delimiters: Vec::new(),
        brackets: Vec::new(),
    };
    parser.parse();
    linkify::linkify(parser.tree.into_inlines())
}

/// Pending `[` or `![`.
#[derive(Clone, Copy, Debug)]
struct Bracket {
    /// Text node holding the bracket.
    node: usize,
    /// Offset of the `[` in the subject.
    index: usize,
    image: bool,
    /// Cleared when a link forms around an earlier bracket.
    active: bool,
    /// Another bracket was opened after this one.
    bracket_after: bool,
    /// Delimiter stack height when the bracket was pushed.
    delimiter_bottom: usize,
}

struct InlineParser<'a> {
    subject: &'a str,
    pos: usize,
    refs: &'a ReferenceMap,
    tree: Tree,
    delimiters: Vec<Delimiter>,
    brackets: Vec<Bracket>,
}

impl InlineParser<'_> {
    fn parse(&mut self) {
        while let Some(c) = self.peek() {
            let handled = match c {
                '\n' => self.parse_newline(),
                '\\' => self.parse_backslash(),
                '`' => self.parse_backticks(),
                '*' | '_' | '~' => self.handle_delimiter(c),
                '[' => self.parse_open_bracket(),
                '!' => self.parse_bang(),
                ']' => self.parse_close_bracket(),
                '<' => self.parse_autolink() || self.parse_html(),
                '&' => self.parse_entity(),
                _ => self.parse_string(),
            };
            if !handled {
                self.pos += c.len_utf8();
                self.append(NodeValue::Text(c.to_string()));
            }
        }
        self.process_emphasis(0);
    }

    fn peek(&self) -> Option<char> {
        self.subject[self.pos..].chars().next()
    }

    fn rest(&self) -> &str {
        &self.subject[self.pos..]
    }

    fn append(&mut self, value: NodeValue) -> usize {
        let idx = self.tree.add(value);
        self.tree.append_child(ROOT, idx);
        idx
    }

    fn append_text(&mut self, text: &str) -> usize {
        self.append(NodeValue::Text(text.to_owned()))
    }

    fn skip_spaces(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start_matches(' ').len();
    }

    fn parse_string(&mut self) -> bool {
        let rest = self.rest();
        let len = rest.find(SPECIAL).unwrap_or(rest.len());
        if len == 0 {
            return false;
        }
        let text = rest[..len].to_owned();
        self.pos += len;
        self.append(NodeValue::Text(text));
        true
    }

    /// A newline is a hard break after two or more spaces, a soft break
    /// otherwise. Trailing spaces before it are dropped.
    fn parse_newline(&mut self) -> bool {
        self.pos += 1;

        let mut hard = false;
        if let Some(last) = self.tree.last_child(ROOT)
            && let NodeValue::Text(text) = self.tree.value_mut(last)
            && text.ends_with(' ')
        {
            hard = text.ends_with("  ");
            let len = text.trim_end_matches(' ').len();
            text.truncate(len);
        }

        self.append(if hard {
            NodeValue::HardBreak
        } else {
            NodeValue::SoftBreak
        });
        self.skip_spaces();
        true
    }

    fn parse_backslash(&mut self) -> bool {
        self.pos += 1;
        match self.peek() {
            Some('\n') => {
                self.pos += 1;
                self.append(NodeValue::HardBreak);
                self.skip_spaces();
            }
            Some(c) if c.is_ascii_punctuation() => {
                self.pos += 1;
                self.append(NodeValue::Text(c.to_string()));
            }
            _ => {
                self.append_text("\\");
            }
        }
        true
    }

    fn parse_backticks(&mut self) -> bool {
        let ticks = self.rest().bytes().take_while(|&b| b == b'`').count();
        let after_open = self.pos + ticks;

        let mut search = after_open;
        while let Some(found) = self.subject[search..].find('`') {
            let run_start = search + found;
            let run_len = self.subject[run_start..]
                .bytes()
                .take_while(|&b| b == b'`')
                .count();

            if run_len == ticks {
                let contents = self.subject[after_open..run_start].replace('\n', " ");
                let code = if contents.len() >= 2
                    && contents.starts_with(' ')
                    && contents.ends_with(' ')
                    && contents.bytes().any(|b| b != b' ')
                {
                    contents[1..contents.len() - 1].to_owned()
                } else {
                    contents
                };
                self.pos = run_start + run_len;
                self.append(NodeValue::Code(code));
                return true;
            }
            search = run_start + run_len;
        }

        // No matching closer: the opening run is literal
        self.pos = after_open;
        self.append(NodeValue::Text("`".repeat(ticks)));
        true
    }

    fn handle_delimiter(&mut self, marker: char) -> bool {
        let Ok(byte) = u8::try_from(marker) else {
            return false;
        };
        let subject = self.subject;
        let start = self.pos;
        let count = subject[start..].bytes().take_while(|&b| b == byte).count();
        let before = subject[..start].chars().next_back().unwrap_or('\n');
        let after = subject[start + count..].chars().next().unwrap_or('\n');
        let (can_open, can_close) = flanking(byte, before, after);

        self.pos += count;
        let node = self.append_text(&subject[start..start + count]);

        // Strikethrough uses runs of exactly two
        if byte == b'~' && count != 2 {
            return true;
        }
        if can_open || can_close {
            self.delimiters.push(Delimiter {
                marker: byte,
                count,
                original: count,
                node,
                can_open,
                can_close,
                active: true,
            });
        }
        true
    }

    fn push_bracket(&mut self, node: usize, index: usize, image: bool) {
        if self.brackets.len() >= MAX_NESTING {
            return;
        }
        if let Some(top) = self.brackets.last_mut() {
            top.bracket_after = true;
        }
        self.brackets.push(Bracket {
            node,
            index,
            image,
            active: true,
            bracket_after: false,
            delimiter_bottom: self.delimiters.len(),
        });
    }

    fn parse_open_bracket(&mut self) -> bool {
        let start = self.pos;
        self.pos += 1;
        let node = self.append_text("[");
        self.push_bracket(node, start, false);
        true
    }

    fn parse_bang(&mut self) -> bool {
        let start = self.pos;
        self.pos += 1;
        if self.peek() == Some('[') {
            self.pos += 1;
            let node = self.append_text("![");
            self.push_bracket(node, start + 1, true);
        } else {
            self.append_text("!");
        }
        true
    }

    fn parse_close_bracket(&mut self) -> bool {
        self.pos += 1;
        let after_bracket = self.pos;

        let Some(opener) = self.brackets.last().copied() else {
            self.append_text("]");
            return true;
        };
        if !opener.active {
            self.append_text("]");
            self.brackets.pop();
            return true;
        }

        let mut target = None;
        if self.peek() == Some('(') {
            target = self.parse_inline_target();
        }
        if target.is_none() {
            target = self.parse_reference_target(&opener, after_bracket);
        }

        let too_deep = self.tree.wrapped_height(opener.node, None) >= MAX_NESTING;
        let Some((destination, title)) = target.filter(|_| !too_deep) else {
            self.brackets.pop();
            self.pos = after_bracket;
            self.append_text("]");
            return true;
        };

        let link = LinkTarget {
            destination,
            title,
            autolink: false,
        };
        let node = self.tree.add(if opener.image {
            NodeValue::Image(link)
        } else {
            NodeValue::Link(link)
        });
        self.tree.adopt_siblings(opener.node, None, node);
        self.tree.append_child(ROOT, node);

        self.process_emphasis(opener.delimiter_bottom);
        self.brackets.pop();
        self.tree.unlink(opener.node);

        // No links inside links
        if !opener.image {
            for bracket in &mut self.brackets {
                if !bracket.image {
                    bracket.active = false;
                }
            }
        }
        true
    }

    /// `(destination "title")` after the closing bracket.
    fn parse_inline_target(&mut self) -> Option<(String, Option<String>)> {
        let save = self.pos;
        let target = self.scan_inline_target();
        if target.is_none() {
            self.pos = save;
        }
        target
    }

    fn scan_inline_target(&mut self) -> Option<(String, Option<String>)> {
        let subject = self.subject;
        let dest_start = skip_spnl(subject, self.pos + 1);
        let (destination, dest_end) = scan_destination(subject, dest_start)?;

        let title_start = skip_spnl(subject, dest_end);
        let mut end = title_start;
        let mut title = None;
        if title_start > dest_end
            && let Some((text, title_end)) = scan_title(subject, title_start)
        {
            title = Some(text);
            end = title_end;
        }

        end = skip_spnl(subject, end);
        if subject.as_bytes().get(end) != Some(&b')') {
            return None;
        }
        if !validate_link(&destination) {
            return None;
        }

        self.pos = end + 1;
        Some((
            normalize_link(&destination),
            title.filter(|t| !t.is_empty()),
        ))
    }

    /// Full `[text][label]`, collapsed `[text][]` or shortcut `[text]`
    /// reference.
    fn parse_reference_target(
        &mut self,
        opener: &Bracket,
        after_bracket: usize,
    ) -> Option<(String, Option<String>)> {
        let subject = self.subject;
        let label_end = scan_label(subject, self.pos);
        let label = match label_end {
            Some(end) if end - self.pos > 2 => Some(&subject[self.pos + 1..end - 1]),
            _ if !opener.bracket_after => Some(&subject[opener.index + 1..after_bracket - 1]),
            _ => None,
        };

        let reference = self.refs.get(label?)?;
        if let Some(end) = label_end {
            self.pos = end;
        }
        Some((reference.destination.clone(), reference.title.clone()))
    }

    fn parse_autolink(&mut self) -> bool {
        let rest = self.rest();
        let (address, destination, len) = if let Some(caps) = EMAIL_AUTOLINK.captures(rest) {
            let address = caps[1].to_owned();
            let destination = format!("mailto:{address}");
            (address, destination, caps[0].len())
        } else if let Some(caps) = URI_AUTOLINK.captures(rest) {
            let address = caps[1].to_owned();
            (address.clone(), address, caps[0].len())
        } else {
            return false;
        };

        if !validate_link(&destination) {
            return false;
        }

        self.pos += len;
        let link = self.append(NodeValue::Link(LinkTarget {
            destination: normalize_link(&destination),
            title: None,
            autolink: true,
        }));
        let text = self.tree.add(NodeValue::Text(address));
        self.tree.append_child(link, text);
        true
    }

    fn parse_html(&mut self) -> bool {
        let Some(len) = match_inline_html(self.rest()) else {
            return false;
        };
        let html = self.rest()[..len].to_owned();
        self.pos += len;
        self.append(NodeValue::Html(html));
        true
    }

    fn parse_entity(&mut self) -> bool {
        let Some((text, len)) = match_entity(self.rest()) else {
            return false;
        };
        self.pos += len;
        self.append(NodeValue::Text(text.into_owned()));
        true
    }
}
