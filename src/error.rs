//! Error types for formcrypt.
//!
//! Every variant is a distinct failure class. Configuration problems surface
//! while a context is being built; input, domain and format problems surface
//! from individual `encrypt`/`decrypt` calls. Messages never carry key
//! material, plaintext or ciphertext.

use thiserror::Error;

/// The single error type for all formcrypt operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FpeError {
    /// The domain specification, FPE algorithm name or preset name was
    /// invalid or missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The block-cipher adapter rejected the algorithm, key or IV.
    #[error("cipher configuration error for {algorithm:?}: {reason}")]
    CipherConfiguration { algorithm: String, reason: String },

    /// The text handed to `encrypt`/`decrypt` was unusable.
    #[error("input error: {0}")]
    Input(String),

    /// A symbol has no mapping and the domain may not grow to cover it.
    #[error("domain error: {0}")]
    Domain(String),

    /// Output failed format validation. Indicates a broken table.
    #[error("format error: {0}")]
    Format(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FpeError>;

impl FpeError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn cipher(algorithm: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CipherConfiguration {
            algorithm: algorithm.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_offending_algorithm() {
        let err = FpeError::cipher("aes-512-cbc", "unknown algorithm");
        assert_eq!(
            err.to_string(),
            "cipher configuration error for \"aes-512-cbc\": unknown algorithm"
        );
    }

    #[test]
    fn test_display_configuration() {
        let err = FpeError::config("\"key\" is required");
        assert_eq!(err.to_string(), "configuration error: \"key\" is required");
    }
}
