//! A1 notation helpers.

use super::{AppendedRange, RowRange};
use crate::error::{LedgerError, LedgerResult};
use regex::Regex;
use std::sync::OnceLock;

/// Column letters for a 0-based index: 0 -> A, 25 -> Z, 26 -> AA.
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Inverse of [`column_letters`].
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

/// Sheet names that are not plain identifiers must be single-quoted.
pub fn quote_sheet(sheet: &str) -> String {
    let plain = sheet
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain && !sheet.is_empty() {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    }
}

/// Renders a row span: `Sheet1!1:1`, or an open-ended `Sheet1!A2:ZZZ`.
/// A span starting at row 1 with no end addresses the whole tab.
pub fn row_range(sheet: &str, range: RowRange) -> String {
    let sheet = quote_sheet(sheet);
    match range.end {
        Some(end) => format!("{}!{}:{}", sheet, range.start, end),
        None if range.start <= 1 => sheet,
        None => format!("{}!A{}:ZZZ", sheet, range.start),
    }
}

fn range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^.+!\$?([A-Za-z]{1,3})\$?(\d+)(?::\$?([A-Za-z]{1,3})\$?(\d+))?$")
            .expect("valid A1 range pattern")
    })
}

/// Parses the range reported by an append, e.g. `Sheet1!A5:D5`.
pub fn parse_appended_range(range: &str) -> LedgerResult<AppendedRange> {
    let caps = range_re()
        .captures(range.trim())
        .ok_or_else(|| LedgerError::Transport(format!("unrecognized range '{}'", range)))?;
    let first_column = column_index(&caps[1])
        .ok_or_else(|| LedgerError::Transport(format!("bad column in '{}'", range)))?;
    let row: u32 = caps[2]
        .parse()
        .ok()
        .filter(|row| *row > 0)
        .ok_or_else(|| LedgerError::Transport(format!("bad row in '{}'", range)))?;
    let last_column = match caps.get(3) {
        Some(m) => column_index(m.as_str())
            .ok_or_else(|| LedgerError::Transport(format!("bad column in '{}'", range)))?,
        None => first_column,
    };
    Ok(AppendedRange {
        row,
        first_column,
        last_column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_roll_over_past_z() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
        assert_eq!(column_index("AA"), Some(26));
        assert_eq!(column_index("zz"), Some(701));
        assert_eq!(column_index(""), None);
    }

    #[test]
    fn appended_range_is_parsed_with_sheet_prefix() {
        let parsed = parse_appended_range("Sheet1!A12:AB12").unwrap();
        assert_eq!(parsed.row, 12);
        assert_eq!(parsed.first_column, 0);
        assert_eq!(parsed.last_column, 27);

        let quoted = parse_appended_range("'Policy Data'!C3").unwrap();
        assert_eq!(quoted.row, 3);
        assert_eq!(quoted.first_column, 2);
        assert_eq!(quoted.last_column, 2);

        assert!(parse_appended_range("Sheet1").is_err());
        assert!(parse_appended_range("A5:D5").is_err());
        assert!(parse_appended_range("Sheet1!A0").is_err());
        assert!(parse_appended_range("Sheet1!ABCD5").is_err());
    }

    #[test]
    fn row_ranges_render() {
        assert_eq!(row_range("Sheet1", RowRange::single(1)), "Sheet1!1:1");
        assert_eq!(row_range("Sheet1", RowRange::from_row(1)), "Sheet1");
        assert_eq!(row_range("My Tab", RowRange::from_row(2)), "'My Tab'!A2:ZZZ");
    }
}
