//! Defined-name (named range) validation.
//!
//! The document model stores defined names as a flat mapping from name to
//! reference string (§3); this module only validates the name itself. The
//! reference string is carried verbatim and is not itself parsed as a
//! formula (that is a cell-formula concern, see [`crate::formula`]).

use crate::error::{Error, Result};

/// Characters that are not allowed in defined names.
const DEFINED_NAME_INVALID_CHARS: &[char] = &['\\', '/', '?', '*', '[', ']'];

/// Validate a defined name.
///
/// A valid defined name must:
/// - Be non-empty
/// - Not start or end with whitespace
/// - Not contain any of the characters `\ / ? * [ ]`
pub fn validate_defined_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidDefinedName(
            "defined name cannot be empty".into(),
        ));
    }
    if name != name.trim() {
        return Err(Error::InvalidDefinedName(
            "defined name cannot start or end with whitespace".into(),
        ));
    }
    for ch in DEFINED_NAME_INVALID_CHARS {
        if name.contains(*ch) {
            return Err(Error::InvalidDefinedName(format!(
                "defined name '{}' contains invalid character '{}'",
                name, ch
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_defined_name_empty() {
        assert!(validate_defined_name("").is_err());
    }

    #[test]
    fn test_validate_defined_name_whitespace_boundary() {
        assert!(validate_defined_name(" TaxRate").is_err());
        assert!(validate_defined_name("TaxRate ").is_err());
    }

    #[test]
    fn test_validate_defined_name_invalid_chars() {
        for ch in DEFINED_NAME_INVALID_CHARS {
            let name = format!("Name{}", ch);
            assert!(validate_defined_name(&name).is_err());
        }
    }

    #[test]
    fn test_validate_defined_name_valid() {
        assert!(validate_defined_name("TaxRate").is_ok());
        assert!(validate_defined_name("_Hidden").is_ok());
    }
}
