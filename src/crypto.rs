//! Block-cipher adapter.
//!
//! This module is the only place in the crate that touches the `aes` and
//! `ring` primitives. Everything else sees a [`BlockCipher`]: a keyed,
//! IV-parameterised, deterministic encryption function that the domain
//! permuter uses as a pseudorandom source.
//!
//! Supported algorithms:
//! - **AES-CBC / AES-ECB** (128/192/256): PKCS#7 padded, built on the `aes`
//!   block primitive.
//! - **AES-GCM / ChaCha20-Poly1305**: `ring` AEAD with the IV as a fixed
//!   nonce; output is ciphertext followed by the tag.
//!
//! The output of [`BlockCipher::encrypt`] never leaves the crate. It only
//! ranks and mixes domain symbols.

use std::fmt;
use std::str::FromStr;

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use ring::aead::{self, Aad, LessSafeKey, Nonce, UnboundKey};

use crate::error::{FpeError, Result};

/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

/// AEAD nonce size in bytes (96 bits).
pub const NONCE_LEN: usize = aead::NONCE_LEN;

/// A block-cipher identifier, parsed from names such as `"aes-256-cbc"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CipherAlgorithm {
    Aes128Cbc,
    Aes192Cbc,
    #[default]
    Aes256Cbc,
    Aes128Ecb,
    Aes192Ecb,
    Aes256Ecb,
    Aes128Gcm,
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl CipherAlgorithm {
    /// Every recognised algorithm, in listing order.
    pub const ALL: [CipherAlgorithm; 9] = [
        Self::Aes128Cbc,
        Self::Aes192Cbc,
        Self::Aes256Cbc,
        Self::Aes128Ecb,
        Self::Aes192Ecb,
        Self::Aes256Ecb,
        Self::Aes128Gcm,
        Self::Aes256Gcm,
        Self::ChaCha20Poly1305,
    ];

    /// The canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Aes128Cbc => "aes-128-cbc",
            Self::Aes192Cbc => "aes-192-cbc",
            Self::Aes256Cbc => "aes-256-cbc",
            Self::Aes128Ecb => "aes-128-ecb",
            Self::Aes192Ecb => "aes-192-ecb",
            Self::Aes256Ecb => "aes-256-ecb",
            Self::Aes128Gcm => "aes-128-gcm",
            Self::Aes256Gcm => "aes-256-gcm",
            Self::ChaCha20Poly1305 => "chacha20-poly1305",
        }
    }

    /// Required key length in bytes.
    pub fn key_len(&self) -> usize {
        match self {
            Self::Aes128Cbc | Self::Aes128Ecb | Self::Aes128Gcm => 16,
            Self::Aes192Cbc | Self::Aes192Ecb => 24,
            Self::Aes256Cbc | Self::Aes256Ecb | Self::Aes256Gcm | Self::ChaCha20Poly1305 => 32,
        }
    }

    /// Required IV length in bytes. ECB modes take no IV.
    pub fn iv_len(&self) -> usize {
        match self {
            Self::Aes128Cbc | Self::Aes192Cbc | Self::Aes256Cbc => BLOCK_LEN,
            Self::Aes128Ecb | Self::Aes192Ecb | Self::Aes256Ecb => 0,
            Self::Aes128Gcm | Self::Aes256Gcm | Self::ChaCha20Poly1305 => NONCE_LEN,
        }
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherAlgorithm {
    type Err = FpeError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == lowered)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|a| a.name()).collect();
                FpeError::cipher(
                    s,
                    format!("unknown cipher algorithm. Required (one of): {}", names.join(", ")),
                )
            })
    }
}

enum Engine {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
    Aead(LessSafeKey),
}

/// A constructed, validated block cipher. Construction is the only point at
/// which key and IV problems can surface.
pub struct BlockCipher {
    algorithm: CipherAlgorithm,
    engine: Engine,
    iv: Vec<u8>,
}

impl fmt::Debug for BlockCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockCipher")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl BlockCipher {
    /// Build a cipher for `algorithm`, validating key and IV lengths.
    pub fn new(algorithm: CipherAlgorithm, key: &[u8], iv: &[u8]) -> Result<Self> {
        if key.len() != algorithm.key_len() {
            return Err(FpeError::cipher(
                algorithm.name(),
                format!("invalid key length {} (expected {})", key.len(), algorithm.key_len()),
            ));
        }
        if iv.len() != algorithm.iv_len() {
            return Err(FpeError::cipher(
                algorithm.name(),
                format!("invalid IV length {} (expected {})", iv.len(), algorithm.iv_len()),
            ));
        }

        let invalid_key = |_| FpeError::cipher(algorithm.name(), "invalid key");
        let engine = match algorithm {
            CipherAlgorithm::Aes128Cbc | CipherAlgorithm::Aes128Ecb => {
                Engine::Aes128(Aes128::new_from_slice(key).map_err(invalid_key)?)
            }
            CipherAlgorithm::Aes192Cbc | CipherAlgorithm::Aes192Ecb => {
                Engine::Aes192(Aes192::new_from_slice(key).map_err(invalid_key)?)
            }
            CipherAlgorithm::Aes256Cbc | CipherAlgorithm::Aes256Ecb => {
                Engine::Aes256(Aes256::new_from_slice(key).map_err(invalid_key)?)
            }
            CipherAlgorithm::Aes128Gcm => Engine::Aead(aead_key(algorithm, &aead::AES_128_GCM, key)?),
            CipherAlgorithm::Aes256Gcm => Engine::Aead(aead_key(algorithm, &aead::AES_256_GCM, key)?),
            CipherAlgorithm::ChaCha20Poly1305 => {
                Engine::Aead(aead_key(algorithm, &aead::CHACHA20_POLY1305, key)?)
            }
        };

        Ok(Self {
            algorithm,
            engine,
            iv: iv.to_vec(),
        })
    }

    /// The algorithm this cipher was built for.
    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    /// Encrypt `data` deterministically. Equal inputs give equal outputs and
    /// distinct inputs give distinct outputs.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let chain = match self.iv.len() {
            BLOCK_LEN => self.iv.as_slice().try_into().ok(),
            _ => None,
        };
        match &self.engine {
            Engine::Aes128(cipher) => Ok(encrypt_padded(cipher, chain, data)),
            Engine::Aes192(cipher) => Ok(encrypt_padded(cipher, chain, data)),
            Engine::Aes256(cipher) => Ok(encrypt_padded(cipher, chain, data)),
            Engine::Aead(key) => {
                let nonce = Nonce::try_assume_unique_for_key(&self.iv)
                    .map_err(|_| FpeError::cipher(self.algorithm.name(), "invalid nonce"))?;
                let mut output = data.to_vec();
                key.seal_in_place_append_tag(nonce, Aad::empty(), &mut output)
                    .map_err(|_| FpeError::cipher(self.algorithm.name(), "encryption failed"))?;
                Ok(output)
            }
        }
    }
}

fn aead_key(
    algorithm: CipherAlgorithm,
    aead_algorithm: &'static aead::Algorithm,
    key: &[u8],
) -> Result<LessSafeKey> {
    let unbound = UnboundKey::new(aead_algorithm, key)
        .map_err(|_| FpeError::cipher(algorithm.name(), "invalid key"))?;
    Ok(LessSafeKey::new(unbound))
}

/// PKCS#7 pad `data` and encrypt it block by block. With `chain` set the
/// blocks are CBC-chained starting from that IV, otherwise ECB.
fn encrypt_padded<C: BlockEncrypt>(cipher: &C, chain: Option<[u8; BLOCK_LEN]>, data: &[u8]) -> Vec<u8> {
    let pad = BLOCK_LEN - data.len() % BLOCK_LEN;
    let mut buf = Vec::with_capacity(data.len() + pad);
    buf.extend_from_slice(data);
    buf.resize(data.len() + pad, pad as u8);

    let mut previous = chain;
    for chunk in buf.chunks_exact_mut(BLOCK_LEN) {
        if let Some(prev) = previous {
            for (byte, mask) in chunk.iter_mut().zip(prev.iter()) {
                *byte ^= mask;
            }
        }
        let block = GenericArray::from_mut_slice(chunk);
        cipher.encrypt_block(block);
        if previous.is_some() {
            let mut next = [0u8; BLOCK_LEN];
            next.copy_from_slice(chunk);
            previous = Some(next);
        }
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("AES-256-CBC".parse::<CipherAlgorithm>().unwrap(), CipherAlgorithm::Aes256Cbc);
        assert_eq!(
            " chacha20-poly1305 ".parse::<CipherAlgorithm>().unwrap(),
            CipherAlgorithm::ChaCha20Poly1305
        );
    }

    #[test]
    fn test_unknown_algorithm_lists_alternatives() {
        let err = "des-cbc".parse::<CipherAlgorithm>().unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, FpeError::CipherConfiguration { .. }));
        assert!(message.contains("aes-256-cbc"));
        assert!(message.contains("chacha20-poly1305"));
    }

    #[test]
    fn test_rejects_bad_key_and_iv_lengths() {
        let alg = CipherAlgorithm::Aes256Cbc;
        assert!(BlockCipher::new(alg, &[0u8; 16], &[0u8; 16]).is_err());
        assert!(BlockCipher::new(alg, &[0u8; 32], &[0u8; 12]).is_err());
        assert!(BlockCipher::new(CipherAlgorithm::Aes128Ecb, &[0u8; 16], &[0u8; 16]).is_err());
        assert!(BlockCipher::new(CipherAlgorithm::Aes256Gcm, &[0u8; 32], &[0u8; 16]).is_err());
    }

    #[test]
    fn test_aes_128_ecb_matches_fips_197_vector() {
        // FIPS-197 appendix C.1, first block only (padding block follows).
        let key: Vec<u8> = (0u8..16).collect();
        let plaintext = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ];
        let expected = [
            0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4,
            0xc5, 0x5a,
        ];
        let cipher = BlockCipher::new(CipherAlgorithm::Aes128Ecb, &key, &[]).unwrap();
        let output = cipher.encrypt(&plaintext).unwrap();
        assert_eq!(output.len(), 2 * BLOCK_LEN);
        assert_eq!(&output[..BLOCK_LEN], &expected);
    }

    #[test]
    fn test_cbc_depends_on_iv() {
        let key = [7u8; 32];
        let a = BlockCipher::new(CipherAlgorithm::Aes256Cbc, &key, &[0u8; 16]).unwrap();
        let b = BlockCipher::new(CipherAlgorithm::Aes256Cbc, &key, &[1u8; 16]).unwrap();
        assert_eq!(a.encrypt(b"x").unwrap(), a.encrypt(b"x").unwrap());
        assert_ne!(a.encrypt(b"x").unwrap(), b.encrypt(b"x").unwrap());
    }

    #[test]
    fn test_aead_output_carries_tag() {
        for alg in [CipherAlgorithm::Aes128Gcm, CipherAlgorithm::Aes256Gcm, CipherAlgorithm::ChaCha20Poly1305] {
            let key = vec![3u8; alg.key_len()];
            let cipher = BlockCipher::new(alg, &key, &[9u8; NONCE_LEN]).unwrap();
            let output = cipher.encrypt(b"abc").unwrap();
            assert_eq!(output.len(), 3 + 16);
            assert_eq!(output, cipher.encrypt(b"abc").unwrap());
        }
    }
}
