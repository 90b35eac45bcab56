//! Symbol-by-symbol substitution and format validation.
//!
//! [`transform`] maps every symbol of a text through one side of a
//! [`SubstitutionTable`], position for position. [`validate`] then checks the
//! result really is format preserving: same symbol count, every symbol inside
//! the domain. Validation runs on every call; a failure means the table or
//! an extension is broken.

use crate::domain::Domain;
use crate::error::{FpeError, Result};
use crate::permute::SubstitutionTable;

/// Which side of the table to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Reject empty input before anything else touches it.
pub fn check_input(text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(FpeError::Input("\"input\" length is 0".to_string()));
    }
    Ok(())
}

/// Map `text` through `table`. A symbol without a mapping fails with
/// [`FpeError::Domain`]; there is no pass-through.
pub fn transform(text: &str, table: &SubstitutionTable, direction: Direction) -> Result<String> {
    text.chars()
        .map(|symbol| {
            let image = match direction {
                Direction::Encrypt => table.forward(symbol),
                Direction::Decrypt => table.inverse(symbol),
            };
            image.ok_or_else(|| {
                FpeError::Domain(format!("symbol {symbol:?} is outside the cipher domain"))
            })
        })
        .collect()
}

/// Check that `transformed` has the length of `original` and lies entirely
/// within `domain`.
pub fn validate(original: &str, transformed: &str, domain: &Domain) -> Result<()> {
    let (expected, actual) = (original.chars().count(), transformed.chars().count());
    if expected != actual {
        tracing::warn!(expected, actual, "transformed text changed length");
        return Err(FpeError::Format(format!(
            "output length {actual} differs from input length {expected}"
        )));
    }
    if let Some(position) = transformed.chars().position(|symbol| !domain.contains(symbol)) {
        tracing::warn!(position, "transformed text left the domain");
        return Err(FpeError::Format(format!(
            "output symbol at position {position} is outside the domain"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::FpeAlgorithm;
    use crate::crypto::{BlockCipher, CipherAlgorithm};
    use crate::domain::{self, DomainOptions, DomainSpec};
    use crate::permute;

    fn digits() -> (Domain, SubstitutionTable) {
        let spec = DomainSpec::try_from(&DomainOptions::preset("digits")).unwrap();
        let domain = domain::resolve(&spec, FpeAlgorithm::PrefixSubstitution).unwrap();
        let cipher = BlockCipher::new(CipherAlgorithm::Aes128Cbc, &[1u8; 16], &[2u8; 16]).unwrap();
        let table = permute::shuffle(FpeAlgorithm::PrefixSubstitution, &cipher, domain.symbols()).unwrap();
        (domain, table)
    }

    #[test]
    fn test_transform_round_trip_preserves_positions() {
        let (domain, table) = digits();
        let encrypted = transform("0011223344", &table, Direction::Encrypt).unwrap();
        validate("0011223344", &encrypted, &domain).unwrap();
        let bytes: Vec<char> = encrypted.chars().collect();
        assert_eq!(bytes[0], bytes[1]);
        assert_eq!(bytes[8], bytes[9]);
        assert_eq!(transform(&encrypted, &table, Direction::Decrypt).unwrap(), "0011223344");
    }

    #[test]
    fn test_transform_rejects_unmapped_symbols() {
        let (_, table) = digits();
        let err = transform("12a4", &table, Direction::Encrypt).unwrap_err();
        assert!(matches!(err, FpeError::Domain(_)));
    }

    #[test]
    fn test_validate_catches_length_and_domain_violations() {
        let (domain, _) = digits();
        assert!(matches!(validate("123", "12", &domain), Err(FpeError::Format(_))));
        assert!(matches!(validate("123", "1x3", &domain), Err(FpeError::Format(_))));
        assert!(validate("123", "987", &domain).is_ok());
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(check_input(""), Err(FpeError::Input(_))));
        assert!(check_input("0").is_ok());
    }
}
