//! Input normalization ahead of block parsing.
//!
//! Produces text where every line ends in `\n` (except possibly the last),
//! contains no tabs and no NUL characters.

use std::borrow::Cow;

/// Column stop used for tab expansion.
pub const TAB_STOP: usize = 4;

/// Normalize raw input.
///
/// - strips a leading byte-order mark
/// - converts `\r\n` and lone `\r` to `\n`
/// - replaces NUL with U+FFFD
/// - expands tabs to the next multiple-of-4 column, counted from line start
///
/// Returns the input unchanged (borrowed) when none of these apply.
///
/// # Examples
///
/// ```
/// use mdit_parser::preprocess;
///
/// assert_eq!(preprocess("a\r\nb"), "a\nb");
/// assert_eq!(preprocess("\tcode"), "    code");
/// assert_eq!(preprocess("ab\tc"), "ab  c");
/// ```
#[must_use]
pub fn preprocess(input: &str) -> Cow<'_, str> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    if !input.contains(['\r', '\t', '\0']) {
        return Cow::Borrowed(input);
    }

    let mut output = String::with_capacity(input.len() + input.len() / 8);
    let mut column = 0;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                output.push('\n');
                column = 0;
            }
            '\n' => {
                output.push('\n');
                column = 0;
            }
            '\t' => {
                let width = TAB_STOP - column % TAB_STOP;
                output.extend(std::iter::repeat_n(' ', width));
                column += width;
            }
            '\0' => {
                output.push('\u{fffd}');
                column += 1;
            }
            _ => {
                output.push(c);
                column += 1;
            }
        }
    }

    Cow::Owned(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_input_is_borrowed() {
        assert!(matches!(preprocess("plain\ntext"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_line_endings() {
        assert_eq!(preprocess("a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(preprocess("\r\r\n"), "\n\n");
    }

    #[test]
    fn test_bom_stripped() {
        assert_eq!(preprocess("\u{feff}# Title"), "# Title");
        // Only a leading BOM is removed
        assert_eq!(preprocess("a\u{feff}"), "a\u{feff}");
    }

    #[test]
    fn test_nul_replaced() {
        assert_eq!(preprocess("a\0b"), "a\u{fffd}b");
    }

    #[test]
    fn test_tab_stops() {
        assert_eq!(preprocess("\tx"), "    x");
        assert_eq!(preprocess(" \tx"), "    x");
        assert_eq!(preprocess("abc\tx"), "abc x");
        assert_eq!(preprocess("abcd\tx"), "abcd    x");
        assert_eq!(preprocess("a\n\tb"), "a\n    b");
    }

    #[test]
    fn test_tab_columns_count_characters() {
        assert_eq!(preprocess("é\tx"), "é   x");
    }

    #[test]
    fn test_tab_after_carriage_return_resets_column() {
        assert_eq!(preprocess("ab\r\tc"), "ab\n    c");
    }
}
