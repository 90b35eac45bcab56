//! FPE algorithm selection.
//!
//! The three strategies form a closed set chosen once, when a context is
//! built. They share domain resolution, dynamic extension, the substitution
//! engine and validation; they differ only in how a batch of symbols is
//! permuted.

use std::fmt;
use std::str::FromStr;

use crate::crypto::BlockCipher;
use crate::error::{FpeError, Result};
use crate::permute;
use crate::presets::{self, Preset};

/// The registered FPE strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FpeAlgorithm {
    /// Global per-symbol substitution table ranked by block-cipher output.
    #[default]
    PrefixSubstitution,
    /// Binary Feistel permutation over a power-of-two index space, walked
    /// back into the domain.
    CycleWalking,
    /// Mixed-radix Feistel permutation over a near-square index space.
    FeistelNetwork,
}

impl FpeAlgorithm {
    pub const ALL: [FpeAlgorithm; 3] = [
        Self::PrefixSubstitution,
        Self::CycleWalking,
        Self::FeistelNetwork,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::PrefixSubstitution => "prefix-substitution",
            Self::CycleWalking => "cycle-walking",
            Self::FeistelNetwork => "feistel-network",
        }
    }

    /// Presets this algorithm accepts for `type: "preset"` domains.
    pub fn domain_presets(&self) -> &'static [Preset] {
        presets::PRESETS
    }

    /// Human-readable listing of [`Self::domain_presets`], one per line.
    pub fn algorithm_presets(&self) -> String {
        self.domain_presets()
            .iter()
            .map(|preset| format!("  {}: {}", preset.name, preset.sets.join(" + ")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Index permutation over `symbols`, which must be distinct and in
    /// code-point order.
    pub(crate) fn permutation(&self, cipher: &BlockCipher, symbols: &[char]) -> Result<Vec<usize>> {
        match self {
            Self::PrefixSubstitution => permute::prefix_rank(cipher, symbols),
            Self::CycleWalking => permute::cycle_walking(cipher, symbols.len()),
            Self::FeistelNetwork => permute::feistel_network(cipher, symbols.len()),
        }
    }
}

impl fmt::Display for FpeAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FpeAlgorithm {
    type Err = FpeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|a| a.name()).collect();
                FpeError::config(format!(
                    "Invalid FPE algorithm provided: {s:?}. Required (one of): {:?}",
                    names.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registered_names() {
        for algorithm in FpeAlgorithm::ALL {
            assert_eq!(algorithm.name().parse::<FpeAlgorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn test_unknown_name_lists_registered_ones() {
        let err = "prefix-cipher".parse::<FpeAlgorithm>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("\"prefix-cipher\""));
        assert!(message.contains("prefix-substitution, cycle-walking, feistel-network"));
    }

    #[test]
    fn test_algorithm_presets_lists_every_entry() {
        let listing = FpeAlgorithm::CycleWalking.algorithm_presets();
        assert_eq!(listing.lines().count(), presets::PRESETS.len());
        assert!(listing.contains("  digits: 0123456789"));
        assert!(listing.contains("  alpha: abcdefghijklmnopqrstuvwxyz + ABCDEFGHIJKLMNOPQRSTUVWXYZ"));
    }
}
