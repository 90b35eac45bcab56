//! Keyed domain permutations.
//!
//! Each FPE algorithm derives an index permutation over a batch of distinct
//! symbols sorted by code point. Sorting first means only the symbol *set*
//! feeds the derivation, never the order the domain was declared in. The
//! block cipher is the sole source of unpredictability.
//!
//! ```text
//! prefix-substitution   rank symbols by E(utf8(symbol))
//! cycle-walking         binary Feistel over [0, 2^b), walk back into [0, n)
//! feistel-network       mixed-radix Feistel over Z_a x Z_b, walk into [0, n)
//! ```
//!
//! A [`SubstitutionTable`] built from a permutation is a bijection by
//! construction; [`check_bijective`] verifies it anyway before the table is
//! handed out.

use std::collections::HashMap;
use std::fmt;

use crate::algorithm::FpeAlgorithm;
use crate::crypto::BlockCipher;
use crate::error::{FpeError, Result};

/// Feistel rounds for both index-based strategies. Must stay even so the
/// half sizes return to where they started.
const ROUNDS: u8 = 8;

const CYCLE_WALKING_TAG: u8 = 0x01;
const FEISTEL_TAG: u8 = 0x02;

/// Forward and inverse symbol maps over the same domain.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SubstitutionTable {
    forward: HashMap<char, char>,
    inverse: HashMap<char, char>,
}

impl fmt::Debug for SubstitutionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubstitutionTable")
            .field("len", &self.forward.len())
            .finish()
    }
}

impl SubstitutionTable {
    /// Number of mapped symbols.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Image of `symbol` under the forward map.
    pub fn forward(&self, symbol: char) -> Option<char> {
        self.forward.get(&symbol).copied()
    }

    /// Image of `symbol` under the inverse map.
    pub fn inverse(&self, symbol: char) -> Option<char> {
        self.inverse.get(&symbol).copied()
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.forward.contains_key(&symbol)
    }

    /// Add `symbols[i] -> symbols[perm[i]]` for every `i`. None of the
    /// symbols may be mapped already.
    fn insert_permutation(&mut self, symbols: &[char], perm: &[usize]) -> Result<()> {
        check_bijective(perm, symbols.len())?;
        for (i, &target) in perm.iter().enumerate() {
            let (from, to) = (symbols[i], symbols[target]);
            if self.forward.insert(from, to).is_some() || self.inverse.insert(to, from).is_some() {
                return Err(FpeError::Format(format!(
                    "symbol {from:?} mapped twice while building the table"
                )));
            }
        }
        Ok(())
    }

    /// Copy of this table with `batch` permuted among itself and appended.
    /// Existing mappings are untouched, so earlier ciphertext stays
    /// decryptable.
    pub(crate) fn extended(
        &self,
        algorithm: FpeAlgorithm,
        cipher: &BlockCipher,
        batch: &[char],
    ) -> Result<Self> {
        let symbols = canonical(batch);
        if let Some(&known) = symbols.iter().find(|&&s| self.contains(s)) {
            return Err(FpeError::Domain(format!("{known:?} is already in the domain")));
        }
        let perm = algorithm.permutation(cipher, &symbols)?;
        let mut table = self.clone();
        table.insert_permutation(&symbols, &perm)?;
        Ok(table)
    }

    /// Every `(symbol, image)` pair of the forward map, in no fixed order.
    pub fn pairs(&self) -> impl Iterator<Item = (char, char)> + '_ {
        self.forward.iter().map(|(&k, &v)| (k, v))
    }
}

/// Build the full table for `domain` with the given strategy.
pub(crate) fn shuffle(
    algorithm: FpeAlgorithm,
    cipher: &BlockCipher,
    domain: &[char],
) -> Result<SubstitutionTable> {
    SubstitutionTable::default().extended(algorithm, cipher, domain)
}

/// Distinct symbols in code-point order.
fn canonical(symbols: &[char]) -> Vec<char> {
    let mut distinct = symbols.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    distinct
}

/// Fail unless `perm` is a permutation of `0..n`.
pub(crate) fn check_bijective(perm: &[usize], n: usize) -> Result<()> {
    if perm.len() != n {
        return Err(FpeError::Format(format!(
            "permutation covers {} of {n} symbols",
            perm.len()
        )));
    }
    let mut seen = vec![false; n];
    for &target in perm {
        match seen.get_mut(target) {
            Some(slot) if !*slot => *slot = true,
            _ => {
                return Err(FpeError::Format(format!(
                    "permutation is not a bijection (index {target})"
                )))
            }
        }
    }
    Ok(())
}

fn identity(n: usize) -> Vec<usize> {
    (0..n).collect()
}

/// Rank symbols by their encryption. `perm[i]` is the index of the symbol
/// whose weight has rank `i`.
pub(crate) fn prefix_rank(cipher: &BlockCipher, symbols: &[char]) -> Result<Vec<usize>> {
    let mut buf = [0u8; 4];
    let mut weighted = Vec::with_capacity(symbols.len());
    for (index, symbol) in symbols.iter().enumerate() {
        let weight = cipher.encrypt(symbol.encode_utf8(&mut buf).as_bytes())?;
        weighted.push((weight, index));
    }
    weighted.sort();

    if weighted.windows(2).any(|pair| pair[0].0 == pair[1].0) {
        return Err(FpeError::Format(
            "block cipher produced colliding weights".to_string(),
        ));
    }
    Ok(weighted.into_iter().map(|(_, index)| index).collect())
}

/// Keyed round function: the first eight bytes of
/// `E(tag || round || n || value)` as a little-endian integer.
fn round_value(cipher: &BlockCipher, tag: u8, round: u8, n: usize, value: u64) -> Result<u64> {
    let mut input = [0u8; 18];
    input[0] = tag;
    input[1] = round;
    input[2..10].copy_from_slice(&(n as u64).to_le_bytes());
    input[10..18].copy_from_slice(&value.to_le_bytes());

    let output = cipher.encrypt(&input)?;
    let head: [u8; 8] = output
        .get(..8)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| FpeError::Format("block cipher output too short".to_string()))?;
    Ok(u64::from_le_bytes(head))
}

/// Walk `permute` from each index in `0..n` until it lands back below `n`.
fn walk_cycles<F>(n: usize, space: u64, mut permute: F) -> Result<Vec<usize>>
where
    F: FnMut(u64) -> Result<u64>,
{
    let bound = n as u64;
    let mut perm = Vec::with_capacity(n);
    for start in 0..bound {
        let mut value = permute(start)?;
        let mut steps = 1u64;
        while value >= bound {
            if steps > space {
                return Err(FpeError::Format("cycle walk did not terminate".to_string()));
            }
            value = permute(value)?;
            steps += 1;
        }
        perm.push(value as usize);
    }
    Ok(perm)
}

/// Binary Feistel over `b`-bit values with cycle walking.
pub(crate) fn cycle_walking(cipher: &BlockCipher, n: usize) -> Result<Vec<usize>> {
    if n < 2 {
        return Ok(identity(n));
    }
    let bits = (usize::BITS - (n - 1).leading_zeros()).max(2);
    let high_bits = bits / 2;
    let low_bits = bits - high_bits;
    let mask = |width: u32| (1u64 << width) - 1;

    walk_cycles(n, 1u64 << bits, |mut x| {
        let (mut hi_w, mut lo_w) = (high_bits, low_bits);
        for round in 0..ROUNDS {
            let hi = x >> lo_w;
            let lo = x & mask(lo_w);
            let f = round_value(cipher, CYCLE_WALKING_TAG, round, n, lo)? & mask(hi_w);
            x = (lo << hi_w) | (hi ^ f);
            std::mem::swap(&mut hi_w, &mut lo_w);
        }
        Ok(x)
    })
}

/// Mixed-radix Feistel over `Z_a x Z_b` with `a*b >= n`, then cycle walking.
pub(crate) fn feistel_network(cipher: &BlockCipher, n: usize) -> Result<Vec<usize>> {
    if n < 2 {
        return Ok(identity(n));
    }
    let mut a = 1u64;
    while a * a < n as u64 {
        a += 1;
    }
    let b = (n as u64).div_ceil(a);

    walk_cycles(n, a * b, |mut x| {
        // x = hi * q + lo with hi in Z_p and lo in Z_q.
        let (mut p, mut q) = (a, b);
        for round in 0..ROUNDS {
            let hi = x / q;
            let lo = x % q;
            let f = round_value(cipher, FEISTEL_TAG, round, n, lo)? % p;
            x = lo * p + (hi + f) % p;
            std::mem::swap(&mut p, &mut q);
        }
        Ok(x)
    })
}
