//! JSON-configurable context construction.
//!
//! ```json
//! {
//!   "key": "<hex>",
//!   "iv": "<hex>",
//!   "fpe_algorithm": "prefix-substitution",
//!   "cipher_algorithm": "aes-256-cbc",
//!   "domain": { "type": "preset", "domain": "digits", "additional_chars": " " }
//! }
//! ```
//!
//! Only `key` is required. The key and IV strings are zeroised on drop.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::context::CipherContext;
use crate::domain::DomainOptions;
use crate::error::{FpeError, Result};
use crate::keys::KeyMaterial;

/// Everything [`crate::cipher`] takes, in serialisable form.
#[derive(Clone, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct CipherOptions {
    pub key: String,
    #[serde(default)]
    pub iv: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub fpe_algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub cipher_algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub domain: Option<DomainOptions>,
}

impl fmt::Debug for CipherOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherOptions")
            .field("fpe_algorithm", &self.fpe_algorithm)
            .field("cipher_algorithm", &self.cipher_algorithm)
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

impl CipherOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FpeError::config(format!("invalid cipher options: {e}")))
    }

    /// Decode the key material and build a context.
    pub fn build(&self) -> Result<CipherContext> {
        if self.key.trim().is_empty() {
            return Err(FpeError::config("\"key\" is required"));
        }
        let keys = KeyMaterial::from_hex(&self.key, &self.iv)?;
        crate::cipher_with(
            keys,
            self.fpe_algorithm.as_deref(),
            self.cipher_algorithm.as_deref(),
            self.domain.as_ref(),
        )
    }
}
