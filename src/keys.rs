//! Key material ownership.
//!
//! [`KeyMaterial`] holds the key and IV a cipher context is built from.
//! - Not `Clone`. Cannot be duplicated without explicit conversion.
//! - Zeroised on drop.
//! - `Debug` prints lengths only.
//!
//! Key management and distribution are the caller's concern. The helpers
//! here only decode hex and generate fresh random material.

use std::fmt;

use ring::rand::{SecureRandom, SystemRandom};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::CipherAlgorithm;
use crate::error::{FpeError, Result};

/// The key and IV of a cipher context.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    key: Vec<u8>,
    iv: Vec<u8>,
}

impl KeyMaterial {
    /// Construct from raw bytes. An empty key is rejected.
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self> {
        if key.is_empty() {
            return Err(FpeError::config("\"key\" is required"));
        }
        Ok(Self {
            key: key.to_vec(),
            iv: iv.to_vec(),
        })
    }

    /// Decode a hex-encoded key and IV. An empty IV string means "no IV".
    pub fn from_hex(key_hex: &str, iv_hex: &str) -> Result<Self> {
        let mut key = hex::decode(key_hex.trim())
            .map_err(|e| FpeError::config(format!("\"key\" is not valid hex: {e}")))?;
        let mut iv = hex::decode(iv_hex.trim())
            .map_err(|e| FpeError::config(format!("\"iv\" is not valid hex: {e}")))?;
        let material = Self::new(&key, &iv);
        key.zeroize();
        iv.zeroize();
        material
    }

    /// Generate random key and IV of the sizes `algorithm` requires.
    ///
    /// Uses `ring::rand::SystemRandom`. In production, callers should source
    /// keys from a dedicated KMS instead.
    pub fn generate(algorithm: CipherAlgorithm) -> Result<Self> {
        let rng = SystemRandom::new();
        let mut key = vec![0u8; algorithm.key_len()];
        let mut iv = vec![0u8; algorithm.iv_len()];
        rng.fill(&mut key)
            .map_err(|_| FpeError::cipher(algorithm.name(), "randomness source failed"))?;
        rng.fill(&mut iv)
            .map_err(|_| FpeError::cipher(algorithm.name(), "randomness source failed"))?;
        Ok(Self { key, iv })
    }

    /// `pub(crate)`: raw bytes never leave the crate.
    pub(crate) fn key(&self) -> &[u8] {
        &self.key
    }

    pub(crate) fn iv(&self) -> &[u8] {
        &self.iv
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key_len", &self.key.len())
            .field("iv_len", &self.iv.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_is_rejected() {
        let err = KeyMaterial::new(&[], &[0u8; 16]).unwrap_err();
        assert!(matches!(err, FpeError::Configuration(_)));
    }

    #[test]
    fn test_from_hex_decodes_both_parts() {
        let material = KeyMaterial::from_hex("00ff10", "").unwrap();
        assert_eq!(material.key(), &[0x00, 0xff, 0x10]);
        assert!(material.iv().is_empty());
        assert!(KeyMaterial::from_hex("zz", "").is_err());
    }

    #[test]
    fn test_generate_matches_algorithm_sizes() {
        let material = KeyMaterial::generate(CipherAlgorithm::Aes128Gcm).unwrap();
        assert_eq!(material.key().len(), 16);
        assert_eq!(material.iv().len(), 12);
    }

    #[test]
    fn test_debug_redacts_bytes() {
        let material = KeyMaterial::new(&[0xab; 4], &[]).unwrap();
        let printed = format!("{material:?}");
        assert!(!printed.contains("171"));
        assert!(printed.contains("key_len: 4"));
    }
}
