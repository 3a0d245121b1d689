//! A1-style cell references.
use regex::Regex;
use std::sync::LazyLock;

static REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$?([A-Za-z]{1,3})\$?([1-9]\d*)$").expect("Hardcode regex pattern"));

/// Converts column letters ("A", "AB") to a 0-based column index.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0usize, |index, letter| {
        let digit = letter.to_ascii_uppercase() as usize;
        if !letter.is_ascii_alphabetic() {
            return None;
        }
        Some(index * 26 + (digit - 'A' as usize + 1))
    }).map(|index| index - 1)
}

/// Converts a 0-based column index to column letters.
pub(crate) fn index_to_col(index: usize) -> String {
    let mut letters = Vec::<u8>::new();
    let mut number = index + 1;
    while number > 0 {
        let remainder = (number - 1) % 26;
        letters.push(b'A' + remainder as u8);
        number = (number - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Parses a reference such as "B3" into 0-based (row, col).
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let captures = REFERENCE_PATTERN.captures(reference)?;
    let col = col_to_index(captures.get(1)?.as_str())?;
    let row = captures.get(2)?.as_str().parse::<usize>().ok()?;
    Some((row - 1, col))
}

/// Formats 0-based (row, col) as a reference such as "B3".
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_col(col), row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references() {
        assert_eq!(reference_to_index("A1"), Some((0, 0)));
        assert_eq!(reference_to_index("b3"), Some((2, 1)));
        assert_eq!(reference_to_index("$AA$10"), Some((9, 26)));
        assert_eq!(reference_to_index("A0"), None);
        assert_eq!(reference_to_index("1A"), None);

        assert_eq!(index_to_reference(0, 0), "A1");
        assert_eq!(index_to_reference(9, 26), "AA10");
        assert_eq!(index_to_col(701), "ZZ");
        assert_eq!(col_to_index("ZZ"), Some(701));
    }
}
