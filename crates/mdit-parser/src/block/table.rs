//! Pipe table rows.

use crate::ast::Alignment;

/// Whitespace trimmed around cells. Other Unicode spaces are content.
const CELL_PADDING: [char; 2] = [' ', '\t'];

/// Parse a delimiter row such as `| :-- | --: |`.
///
/// `line` starts at the first non-space character. The row must contain a
/// pipe; empty cells are allowed only at either end.
pub(super) fn parse_delimiter_row(line: &str) -> Option<Vec<Alignment>> {
    let line = line.trim_end();
    if !matches!(line.bytes().next()?, b'|' | b'-' | b':') || !line.contains('|') {
        return None;
    }
    if !line
        .bytes()
        .all(|b| matches!(b, b'|' | b'-' | b':' | b' '))
    {
        return None;
    }

    let cells: Vec<&str> = line.split('|').collect();
    let last = cells.len() - 1;
    let mut alignments = Vec::with_capacity(cells.len());

    for (i, cell) in cells.iter().enumerate() {
        let cell = cell.trim_matches(CELL_PADDING);
        if cell.is_empty() {
            if i == 0 || i == last {
                continue;
            }
            return None;
        }

        let left = cell.starts_with(':');
        let right = cell.len() > 1 && cell.ends_with(':');
        let dashes = &cell[usize::from(left)..cell.len() - usize::from(right)];
        if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
            return None;
        }

        alignments.push(match (left, right) {
            (true, true) => Alignment::Center,
            (true, false) => Alignment::Left,
            (false, true) => Alignment::Right,
            (false, false) => Alignment::None,
        });
    }

    (!alignments.is_empty()).then_some(alignments)
}

/// Split a row into trimmed cells.
///
/// Leading and trailing pipes are optional; `\|` is a literal pipe.
pub(super) fn split_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for c in line.trim_matches(CELL_PADDING).chars() {
        match c {
            '|' if escaped => {
                current.pop();
                current.push('|');
            }
            '|' => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
        escaped = c == '\\';
    }
    cells.push(current);

    if cells.first().is_some_and(String::is_empty) {
        cells.remove(0);
    }
    if cells.last().is_some_and(String::is_empty) {
        cells.pop();
    }

    cells
        .into_iter()
        .map(|c| c.trim_matches(CELL_PADDING).to_owned())
        .collect()
}

/// Split a header row, requiring exactly `columns` cells.
pub(super) fn parse_header_row(line: &str, columns: usize) -> Option<Vec<String>> {
    if !line.contains('|') {
        return None;
    }
    let cells = split_row(line);
    (cells.len() == columns).then_some(cells)
}

/// Split a body row, padding or truncating it to `columns` cells.
pub(super) fn parse_body_row(line: &str, columns: usize) -> Vec<String> {
    let mut cells = split_row(line);
    cells.resize(columns, String::new());
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_row_alignments() {
        assert_eq!(
            parse_delimiter_row("| :-- | :-: | --: | --- |"),
            Some(vec![
                Alignment::Left,
                Alignment::Center,
                Alignment::Right,
                Alignment::None
            ])
        );
        assert_eq!(parse_delimiter_row("--|--"), Some(vec![Alignment::None; 2]));
        assert_eq!(parse_delimiter_row("|-|"), Some(vec![Alignment::None]));
    }

    #[test]
    fn test_delimiter_row_rejects() {
        assert_eq!(parse_delimiter_row("---"), None);
        assert_eq!(parse_delimiter_row("--||--"), None);
        assert_eq!(parse_delimiter_row("| : |"), None);
        assert_eq!(parse_delimiter_row("| -x- |"), None);
        assert_eq!(parse_delimiter_row("||"), None);
    }

    #[test]
    fn test_split_row() {
        assert_eq!(split_row("| a | b |"), vec!["a", "b"]);
        assert_eq!(split_row("a | b"), vec!["a", "b"]);
        assert_eq!(split_row(r"| a \| b | c |"), vec!["a | b", "c"]);
        assert_eq!(split_row("|  | b |"), vec!["", "b"]);
        assert_eq!(split_row("| \u{a0}a |\t"), vec!["\u{a0}a"]);
    }

    #[test]
    fn test_header_row_column_count() {
        assert_eq!(parse_header_row("| a | b |", 2), Some(vec!["a".to_owned(), "b".to_owned()]));
        assert_eq!(parse_header_row("| a | b |", 3), None);
        assert_eq!(parse_header_row("no pipes", 1), None);
    }

    #[test]
    fn test_body_row_normalized() {
        assert_eq!(parse_body_row("| a |", 2), vec!["a", ""]);
        assert_eq!(parse_body_row("| a | b | c |", 2), vec!["a", "b"]);
    }
}
