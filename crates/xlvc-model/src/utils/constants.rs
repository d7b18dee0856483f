//! Excel limit constants and default values.
//!
//! These constants mirror the hard limits enforced by Microsoft Excel 2007+
//! (OOXML / `.xlsx` format).

/// Maximum number of columns (XFD = 16 384 = 2^14).
pub const MAX_COLUMNS: u32 = 16_384;

/// Maximum number of rows (1 048 576 = 2^20).
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum length (in characters) of a sheet name.
pub const MAX_SHEET_NAME_LENGTH: usize = 31;

/// Characters that are not allowed in Excel sheet names.
pub const SHEET_NAME_INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_columns() {
        assert_eq!(MAX_COLUMNS, 16_384);
    }

    #[test]
    fn test_max_rows() {
        assert_eq!(MAX_ROWS, 1_048_576);
    }

    #[test]
    fn test_max_sheet_name_length() {
        assert_eq!(MAX_SHEET_NAME_LENGTH, 31);
    }

    #[test]
    fn test_sheet_name_invalid_chars() {
        assert_eq!(SHEET_NAME_INVALID_CHARS.len(), 7);
        assert!(SHEET_NAME_INVALID_CHARS.contains(&':'));
        assert!(SHEET_NAME_INVALID_CHARS.contains(&'\\'));
        assert!(SHEET_NAME_INVALID_CHARS.contains(&'/'));
        assert!(SHEET_NAME_INVALID_CHARS.contains(&'?'));
        assert!(SHEET_NAME_INVALID_CHARS.contains(&'*'));
        assert!(SHEET_NAME_INVALID_CHARS.contains(&'['));
        assert!(SHEET_NAME_INVALID_CHARS.contains(&']'));
    }
}
