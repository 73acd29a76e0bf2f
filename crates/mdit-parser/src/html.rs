//! Raw HTML recognition for blocks and inline spans.

use std::sync::LazyLock;

use regex::Regex;

const TAG_NAME: &str = "[A-Za-z][A-Za-z0-9-]*";
const ATTRIBUTE_NAME: &str = "[a-zA-Z_:][a-zA-Z0-9:._-]*";
const ATTRIBUTE_VALUE: &str = r#"(?:[^"'=<>`\x00-\x20]+|'[^']*'|"[^"]*")"#;

fn open_tag() -> String {
    format!(r"<{TAG_NAME}(?:\s+{ATTRIBUTE_NAME}(?:\s*=\s*{ATTRIBUTE_VALUE})?)*\s*/?>")
}

fn close_tag() -> String {
    format!(r"</{TAG_NAME}\s*>")
}

/// Any inline HTML construct anchored at the start of the input.
static INLINE_HTML: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"^(?:{open}|{close}|<!-->|<!--->|(?s:<!--.*?-->)|(?s:<\?.*?\?>)|<![A-Za-z]+[^>]*>|(?s:<!\[CDATA\[.*?\]\]>))",
        open = open_tag(),
        close = close_tag(),
    );
    Regex::new(&pattern).expect("invalid inline html regex")
});

static BLOCK_RAW_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^<(?:script|pre|textarea|style)(?:\s|>|$)").expect("invalid html regex")
});

static BLOCK_KNOWN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^</?(?:address|article|aside|base|basefont|blockquote|body|caption|center|col",
        r"|colgroup|dd|details|dialog|dir|div|dl|dt|fieldset|figcaption|figure|footer|form",
        r"|frame|frameset|h[1-6]|head|header|hr|html|iframe|legend|li|link|main|menu|menuitem",
        r"|nav|noframes|ol|optgroup|option|p|param|search|section|summary|table|tbody|td",
        r"|tfoot|th|thead|title|tr|track|ul)(?:\s|/?>|$)",
    ))
    .expect("invalid html regex")
});

static BLOCK_COMPLETE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"^(?:{}|{})\s*$", open_tag(), close_tag());
    Regex::new(&pattern).expect("invalid html regex")
});

static BLOCK_RAW_TEXT_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</(?:script|pre|textarea|style)>").expect("invalid html regex")
});

/// The seven kinds of HTML block, distinguished by how they end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HtmlBlockKind {
    /// `<script>`, `<pre>`, `<textarea>`, `<style>`
    RawText,
    /// `<!-- ... -->`
    Comment,
    /// `<? ... ?>`
    ProcessingInstruction,
    /// `<!DOCTYPE ...>`
    Declaration,
    /// `<![CDATA[ ... ]]>`
    Cdata,
    /// Known block-level tag; ends at a blank line.
    BlockTag,
    /// Any other complete tag alone on its line; ends at a blank line.
    CompleteTag,
}

impl HtmlBlockKind {
    /// Detect an HTML block start. `line` begins at the first non-space.
    pub(crate) fn detect(line: &str) -> Option<Self> {
        if !line.starts_with('<') {
            return None;
        }
        if BLOCK_RAW_TEXT.is_match(line) {
            Some(Self::RawText)
        } else if line.starts_with("<!--") {
            Some(Self::Comment)
        } else if line.starts_with("<?") {
            Some(Self::ProcessingInstruction)
        } else if line
            .as_bytes()
            .get(2)
            .is_some_and(u8::is_ascii_alphabetic)
            && line.starts_with("<!")
        {
            Some(Self::Declaration)
        } else if line.starts_with("<![CDATA[") {
            Some(Self::Cdata)
        } else if BLOCK_KNOWN_TAG.is_match(line) {
            Some(Self::BlockTag)
        } else if BLOCK_COMPLETE_TAG.is_match(line) {
            Some(Self::CompleteTag)
        } else {
            None
        }
    }

    /// Whether this kind may interrupt a paragraph.
    pub(crate) fn can_interrupt_paragraph(self) -> bool {
        self != Self::CompleteTag
    }

    /// Whether a blank line ends the block.
    pub(crate) fn ends_at_blank_line(self) -> bool {
        matches!(self, Self::BlockTag | Self::CompleteTag)
    }

    /// Whether `line` contains this kind's end marker.
    pub(crate) fn is_closed_by(self, line: &str) -> bool {
        match self {
            Self::RawText => BLOCK_RAW_TEXT_END.is_match(line),
            Self::Comment => line.contains("-->"),
            Self::ProcessingInstruction => line.contains("?>"),
            Self::Declaration => line.contains('>'),
            Self::Cdata => line.contains("]]>"),
            Self::BlockTag | Self::CompleteTag => false,
        }
    }
}

/// Length of an inline HTML construct at the start of `input`.
pub(crate) fn match_inline_html(input: &str) -> Option<usize> {
    INLINE_HTML.find(input).map(|m| m.end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_block_kinds() {
        assert_eq!(HtmlBlockKind::detect("<script>"), Some(HtmlBlockKind::RawText));
        assert_eq!(HtmlBlockKind::detect("<PRE class=x>"), Some(HtmlBlockKind::RawText));
        assert_eq!(HtmlBlockKind::detect("<!-- c"), Some(HtmlBlockKind::Comment));
        assert_eq!(HtmlBlockKind::detect("<?php"), Some(HtmlBlockKind::ProcessingInstruction));
        assert_eq!(HtmlBlockKind::detect("<!DOCTYPE html>"), Some(HtmlBlockKind::Declaration));
        assert_eq!(HtmlBlockKind::detect("<![CDATA[x"), Some(HtmlBlockKind::Cdata));
        assert_eq!(HtmlBlockKind::detect("<div class=\"a\">"), Some(HtmlBlockKind::BlockTag));
        assert_eq!(HtmlBlockKind::detect("</table>"), Some(HtmlBlockKind::BlockTag));
        assert_eq!(HtmlBlockKind::detect("<custom-el a='1'>"), Some(HtmlBlockKind::CompleteTag));
        assert_eq!(HtmlBlockKind::detect("<span>text"), None);
        assert_eq!(HtmlBlockKind::detect("<divx"), None);
        assert_eq!(HtmlBlockKind::detect("text"), None);
    }

    #[test]
    fn test_block_end_conditions() {
        assert!(HtmlBlockKind::RawText.is_closed_by("x</STYLE>"));
        assert!(HtmlBlockKind::Comment.is_closed_by("end -->"));
        assert!(!HtmlBlockKind::Comment.is_closed_by("end ->"));
        assert!(HtmlBlockKind::BlockTag.ends_at_blank_line());
        assert!(!HtmlBlockKind::CompleteTag.can_interrupt_paragraph());
    }

    #[test]
    fn test_inline_html() {
        assert_eq!(match_inline_html("<a href=\"x\">t"), Some(12));
        assert_eq!(match_inline_html("<br/>"), Some(5));
        assert_eq!(match_inline_html("</em >x"), Some(6));
        assert_eq!(match_inline_html("<!-- c -->x"), Some(10));
        assert_eq!(match_inline_html("<!-->"), Some(5));
        assert_eq!(match_inline_html("<?x ?>"), Some(6));
        assert_eq!(match_inline_html("<![CDATA[a]]>"), Some(13));
        assert_eq!(match_inline_html("<a b=c d>"), Some(9));
        assert_eq!(match_inline_html("<33>"), None);
        assert_eq!(match_inline_html("<a h*#ref=\"x\">"), None);
        assert_eq!(match_inline_html("< a>"), None);
    }
}
