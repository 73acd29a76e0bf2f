//! Emphasis and strikethrough delimiter runs.

use std::sync::LazyLock;

use regex::Regex;

use super::InlineParser;
use crate::MAX_NESTING;
use super::tree::NodeValue;

static UNICODE_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{P}\p{S}]$").expect("invalid punctuation regex"));

/// One `*`, `_` or `~~` run on the delimiter stack.
#[derive(Clone, Copy, Debug)]
pub(super) struct Delimiter {
    pub marker: u8,
    /// Characters still available for matching.
    pub count: usize,
    /// Run length as scanned, used by the rule of three.
    pub original: usize,
    /// Text node holding the run.
    pub node: usize,
    pub can_open: bool,
    pub can_close: bool,
    pub active: bool,
}

impl Delimiter {
    /// Index into the openers-bottom table; runs that cannot match each other
    /// never share a slot.
    fn bottom_slot(&self) -> usize {
        let base = match self.marker {
            b'_' => 0,
            b'*' => 6,
            _ => return 12,
        };
        base + if self.can_open { 3 } else { 0 } + self.original % 3
    }
}

fn is_punctuation(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_punctuation();
    }
    let mut buf = [0; 4];
    UNICODE_PUNCTUATION.is_match(c.encode_utf8(&mut buf))
}

/// Opening and closing capability of a delimiter run.
pub(super) fn flanking(marker: u8, before: char, after: char) -> (bool, bool) {
    let after_space = after.is_whitespace();
    let after_punct = is_punctuation(after);
    let before_space = before.is_whitespace();
    let before_punct = is_punctuation(before);

    let left = !after_space && (!after_punct || before_space || before_punct);
    let right = !before_space && (!before_punct || after_space || after_punct);

    if marker == b'_' {
        (left && (!right || before_punct), right && (!left || after_punct))
    } else {
        (left, right)
    }
}

impl InlineParser<'_> {
    /// Resolve delimiters above `bottom` into emphasis, strong and
    /// strikethrough nodes, then drop them from the stack.
    pub(super) fn process_emphasis(&mut self, bottom: usize) {
        let mut openers_bottom = [bottom; 13];
        let mut closer_idx = bottom;

        while closer_idx < self.delimiters.len() {
            let closer = self.delimiters[closer_idx];
            if !closer.active || !closer.can_close {
                closer_idx += 1;
                continue;
            }

            let slot = closer.bottom_slot();
            let opener_idx = (openers_bottom[slot]..closer_idx).rev().find(|&i| {
                let opener = &self.delimiters[i];
                if !opener.active || opener.marker != closer.marker || !opener.can_open {
                    return false;
                }
                if closer.marker == b'~' {
                    return true;
                }
                let odd_match = (closer.can_open || opener.can_close)
                    && closer.original % 3 != 0
                    && (opener.original + closer.original) % 3 == 0;
                !odd_match
            });

            // Too deep to wrap: the closer stays literal
            let opener_idx = opener_idx.filter(|&i| {
                self.tree
                    .wrapped_height(self.delimiters[i].node, Some(closer.node))
                    < MAX_NESTING
            });

            let Some(opener_idx) = opener_idx else {
                openers_bottom[slot] = closer_idx;
                if !closer.can_open {
                    self.delimiters[closer_idx].active = false;
                }
                closer_idx += 1;
                continue;
            };

            let opener = self.delimiters[opener_idx];
            let used = if closer.marker == b'~' || (closer.count >= 2 && opener.count >= 2) {
                2
            } else {
                1
            };

            self.delimiters[opener_idx].count -= used;
            self.delimiters[closer_idx].count -= used;
            self.shrink_run(opener.node, used);
            self.shrink_run(closer.node, used);

            let value = match (closer.marker, used) {
                (b'~', _) => NodeValue::Strikethrough,
                (_, 1) => NodeValue::Emphasis,
                _ => NodeValue::Strong,
            };
            let wrapper = self.tree.add(value);
            self.tree
                .adopt_siblings(opener.node, Some(closer.node), wrapper);
            self.tree.insert_after(opener.node, wrapper);

            for between in &mut self.delimiters[opener_idx + 1..closer_idx] {
                between.active = false;
            }

            if self.delimiters[opener_idx].count == 0 {
                self.tree.unlink(opener.node);
                self.delimiters[opener_idx].active = false;
            }
            if self.delimiters[closer_idx].count == 0 {
                self.tree.unlink(closer.node);
                self.delimiters[closer_idx].active = false;
                closer_idx += 1;
            }
        }

        self.delimiters.truncate(bottom);
    }

    fn shrink_run(&mut self, node: usize, used: usize) {
        if let NodeValue::Text(run) = self.tree.value_mut(node) {
            let len = run.len().saturating_sub(used);
            run.truncate(len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flanking_rules() {
        // `*foo` : left-flanking only
        assert_eq!(flanking(b'*', '\n', 'f'), (true, false));
        // `foo*` : right-flanking only
        assert_eq!(flanking(b'*', 'o', '\n'), (false, true));
        // `a*b` : both for `*`
        assert_eq!(flanking(b'*', 'a', 'b'), (true, true));
        // `a_b` : intraword underscore neither opens nor closes
        assert_eq!(flanking(b'_', 'a', 'b'), (false, false));
        // `* a` : followed by whitespace
        assert_eq!(flanking(b'*', ' ', ' '), (false, false));
    }

    #[test]
    fn test_punctuation_classes() {
        assert!(is_punctuation('!'));
        assert!(is_punctuation('\u{00a3}'));
        assert!(is_punctuation('\u{201c}'));
        assert!(!is_punctuation('a'));
        assert!(!is_punctuation('\u{00e9}'));
    }

    #[test]
    fn test_bottom_slots_distinct() {
        let delim = |marker, can_open, original| Delimiter {
            marker,
            count: original,
            original,
            node: 0,
            can_open,
            can_close: true,
            active: true,
        };
        assert_eq!(delim(b'_', false, 1).bottom_slot(), 1);
        assert_eq!(delim(b'*', true, 3).bottom_slot(), 9);
        assert_eq!(delim(b'~', true, 2).bottom_slot(), 12);
    }
}
