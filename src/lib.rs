//! # formcrypt
//!
//! Format-preserving encryption over configurable symbol domains.
//!
//! A cipher context turns text drawn from a bounded symbol domain (digits,
//! letters, a custom alphabet, code-point ranges) into ciphertext of the same
//! length drawn from the same domain. The domain is permuted by a keyed
//! bijection derived from a block cipher and applied symbol by symbol; every
//! result is validated before it is returned.
//!
//! ```rust
//! use formcrypt::{cipher, DomainOptions};
//!
//! let key = [7u8; 32];
//! let iv = [9u8; 16];
//! let options = DomainOptions::preset("digits").with_additional(" ");
//! let mut ctx = cipher(&key, &iv, None, None, Some(&options)).unwrap();
//!
//! let encrypted = ctx.encrypt("4916 1234 5678 9012").unwrap();
//! assert_eq!(encrypted.len(), 19);
//! assert_eq!(ctx.decrypt(&encrypted).unwrap(), "4916 1234 5678 9012");
//! ```
//!
//! ## Public API
//!
//! [`cipher`] and [`presets`] are the entry points. [`CipherOptions`] builds
//! a context from JSON configuration. Block-cipher and permutation internals
//! are `pub(crate)`.

pub mod algorithm;
pub mod config;
pub mod context;
pub(crate) mod crypto;
pub mod domain;
pub mod error;
pub mod keys;
pub(crate) mod permute;
pub mod presets;
pub mod substitution;

pub use algorithm::FpeAlgorithm;
pub use config::CipherOptions;
pub use context::{CipherContext, DomainState};
pub use crypto::CipherAlgorithm;
pub use domain::{Domain, DomainKind, DomainOptions, DomainSpec, Growth, OneOrMany};
pub use error::{FpeError, Result};
pub use keys::KeyMaterial;
pub use permute::SubstitutionTable;

/// Build a cipher context.
///
/// `fpe_algorithm` defaults to `prefix-substitution` and `cipher_algorithm`
/// to `aes-256-cbc`. Without `domain_options` the domain is inferred from
/// the text the context encrypts.
///
/// Fails with [`FpeError::Configuration`] for a missing key, an unknown FPE
/// algorithm or an invalid domain, and with
/// [`FpeError::CipherConfiguration`] when the block cipher rejects the
/// algorithm, key or IV.
pub fn cipher(
    key: &[u8],
    iv: &[u8],
    fpe_algorithm: Option<&str>,
    cipher_algorithm: Option<&str>,
    domain_options: Option<&DomainOptions>,
) -> Result<CipherContext> {
    let keys = KeyMaterial::new(key, iv)?;
    cipher_with(keys, fpe_algorithm, cipher_algorithm, domain_options)
}

/// [`cipher`] over already-owned key material.
pub fn cipher_with(
    keys: KeyMaterial,
    fpe_algorithm: Option<&str>,
    cipher_algorithm: Option<&str>,
    domain_options: Option<&DomainOptions>,
) -> Result<CipherContext> {
    let fpe_algorithm = fpe_algorithm
        .map(str::parse::<FpeAlgorithm>)
        .transpose()?
        .unwrap_or_default();
    let cipher_algorithm = cipher_algorithm
        .map(str::parse::<CipherAlgorithm>)
        .transpose()?
        .unwrap_or_default();
    let spec = domain_options
        .map(DomainSpec::try_from)
        .transpose()?
        .unwrap_or_default();

    CipherContext::new(keys, fpe_algorithm, cipher_algorithm, &spec)
}

/// A versioned, human-readable catalog of every algorithm's domain presets.
pub fn presets() -> String {
    let mut report = vec![format!(
        "{} v{} domain presets",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )];
    for algorithm in FpeAlgorithm::ALL {
        report.push(format!("{}:\n{}", algorithm.name(), algorithm.algorithm_presets()));
    }
    report.join("\n")
}
