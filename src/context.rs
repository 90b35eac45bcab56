//! The cipher context.
//!
//! A [`CipherContext`] owns the key material, the chosen algorithms, the
//! resolved domain and its substitution table. `encrypt` takes `&mut self`
//! because it may grow the domain; `decrypt` only reads. Exclusive ownership
//! is the whole concurrency story: share a context across threads only
//! behind a lock.
//!
//! ## Growth
//!
//! ```text
//! TextDerived  every symbol of the text not yet in the domain is admitted
//! Residual     explicit domain, out-of-domain symbols admitted on demand
//! Fixed        out-of-domain symbols fail with FpeError::Domain
//! ```
//!
//! Each admission is one batch, permuted among itself. The enlarged domain
//! and table are staged and only committed once the encryption they serve
//! has validated.

use serde::{Deserialize, Serialize};

use crate::algorithm::FpeAlgorithm;
use crate::crypto::{BlockCipher, CipherAlgorithm};
use crate::domain::{self, Domain, DomainSpec, Growth};
use crate::error::{FpeError, Result};
use crate::keys::KeyMaterial;
use crate::permute::{self, SubstitutionTable};
use crate::substitution::{self, Direction};

/// The symbols a context's domain was built from, plus every batch admitted
/// since. Holds no table entries and no key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainState {
    pub fpe_algorithm: String,
    pub cipher_algorithm: String,
    pub base: String,
    pub extensions: Vec<String>,
}

impl DomainState {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| FpeError::config(format!("domain state serialisation failed: {e}")))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| FpeError::config(format!("invalid domain state: {e}")))
    }
}

/// A keyed, domain-bound format-preserving cipher.
#[derive(Debug)]
pub struct CipherContext {
    keys: KeyMaterial,
    fpe_algorithm: FpeAlgorithm,
    cipher: BlockCipher,
    domain: Domain,
    table: SubstitutionTable,
    base: String,
    extensions: Vec<String>,
}

impl CipherContext {
    /// Build a context. Cipher problems surface before the domain is
    /// resolved, so nothing is derived from a key the adapter rejects.
    pub fn new(
        keys: KeyMaterial,
        fpe_algorithm: FpeAlgorithm,
        cipher_algorithm: CipherAlgorithm,
        spec: &DomainSpec,
    ) -> Result<Self> {
        let cipher = BlockCipher::new(cipher_algorithm, keys.key(), keys.iv())?;
        let domain = domain::resolve(spec, fpe_algorithm)?;
        let table = permute::shuffle(fpe_algorithm, &cipher, domain.symbols())?;

        tracing::debug!(
            fpe_algorithm = %fpe_algorithm,
            cipher_algorithm = %cipher_algorithm,
            domain_len = domain.len(),
            distinct = domain.distinct_len(),
            growth = ?domain.growth(),
            "cipher context created"
        );

        Ok(Self {
            keys,
            fpe_algorithm,
            cipher,
            base: domain.as_string(),
            domain,
            table,
            extensions: Vec::new(),
        })
    }

    pub fn fpe_algorithm(&self) -> FpeAlgorithm {
        self.fpe_algorithm
    }

    pub fn cipher_algorithm(&self) -> CipherAlgorithm {
        self.cipher.algorithm()
    }

    /// The key material this context was built with.
    pub fn key_material(&self) -> &KeyMaterial {
        &self.keys
    }

    /// The current domain, including every admitted batch.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// The current substitution table.
    pub fn table(&self) -> &SubstitutionTable {
        &self.table
    }

    /// Encrypt `text`, growing the domain first when its policy allows.
    pub fn encrypt(&mut self, text: &str) -> Result<String> {
        substitution::check_input(text)?;

        let staged = match self.domain.growth() {
            Growth::Fixed => None,
            Growth::TextDerived | Growth::Residual => {
                let missing = self.domain.missing_from(text);
                if missing.is_empty() {
                    None
                } else {
                    Some((self.stage(&missing)?, missing))
                }
            }
        };

        let (domain, table) = match &staged {
            Some(((domain, table), _)) => (domain, table),
            None => (&self.domain, &self.table),
        };
        let encrypted = substitution::transform(text, table, Direction::Encrypt)?;
        substitution::validate(text, &encrypted, domain)?;

        if let Some(((domain, table), batch)) = staged {
            self.commit(domain, table, &batch);
        }
        Ok(encrypted)
    }

    /// Decrypt `text`. Never grows the domain: every symbol must already be
    /// mapped, either by earlier `encrypt` calls on this context or by
    /// [`Self::restore`].
    pub fn decrypt(&self, text: &str) -> Result<String> {
        substitution::check_input(text)?;
        let decrypted = substitution::transform(text, &self.table, Direction::Decrypt)?;
        substitution::validate(text, &decrypted, &self.domain)?;
        Ok(decrypted)
    }

    /// Admit every symbol of `text` missing from the domain.
    ///
    /// Allowed for text-derived domains, and for residual domains when
    /// `allow_residual` is set. Returns how many symbols were admitted.
    pub fn extend_for_text(&mut self, text: &str, allow_residual: bool) -> Result<usize> {
        let permitted = match self.domain.growth() {
            Growth::TextDerived => true,
            Growth::Residual => allow_residual,
            Growth::Fixed => false,
        };
        let missing = self.domain.missing_from(text);
        if missing.is_empty() {
            return Ok(0);
        }
        if !permitted {
            return Err(FpeError::Domain(format!(
                "{} symbol(s) outside a fixed domain, first {:?}",
                missing.len(),
                missing[0]
            )));
        }
        let (domain, table) = self.stage(&missing)?;
        self.commit(domain, table, &missing);
        Ok(missing.len())
    }

    /// Export the symbols this context's domain was built from and grown by.
    pub fn domain_state(&self) -> DomainState {
        DomainState {
            fpe_algorithm: self.fpe_algorithm.name().to_string(),
            cipher_algorithm: self.cipher.algorithm().name().to_string(),
            base: self.base.clone(),
            extensions: self.extensions.clone(),
        }
    }

    /// Replay the batches of `state` this context has not admitted yet.
    ///
    /// `state` must come from a context with the same algorithms and base
    /// domain whose batches extend this context's own. With the same key and
    /// IV the replayed table is identical to the exporter's.
    pub fn restore(&mut self, state: &DomainState) -> Result<()> {
        if state.fpe_algorithm != self.fpe_algorithm.name()
            || state.cipher_algorithm != self.cipher.algorithm().name()
        {
            return Err(FpeError::Domain(format!(
                "domain state was built with {}/{}, this context uses {}/{}",
                state.fpe_algorithm,
                state.cipher_algorithm,
                self.fpe_algorithm,
                self.cipher.algorithm()
            )));
        }
        if state.base != self.base {
            return Err(FpeError::Domain("domain state has a different base domain".to_string()));
        }
        if !state.extensions.starts_with(&self.extensions) {
            return Err(FpeError::Domain(
                "domain state diverges from this context's extensions".to_string(),
            ));
        }
        let pending = &state.extensions[self.extensions.len()..];
        if !pending.is_empty() && self.domain.growth() == Growth::Fixed {
            return Err(FpeError::Domain("cannot replay extensions into a fixed domain".to_string()));
        }

        // Stage every batch before committing any of them.
        let mut domain = self.domain.clone();
        let mut table = self.table.clone();
        for batch in pending {
            let symbols: Vec<char> = batch.chars().collect();
            if let Some(&known) = symbols.iter().find(|&&s| domain.contains(s)) {
                return Err(FpeError::Domain(format!("{known:?} is already in the domain")));
            }
            table = table.extended(self.fpe_algorithm, &self.cipher, &symbols)?;
            domain = domain.grown(&symbols);
        }

        tracing::trace!(batches = pending.len(), "domain state restored");
        self.domain = domain;
        self.table = table;
        self.extensions.extend(pending.iter().cloned());
        Ok(())
    }

    fn stage(&self, batch: &[char]) -> Result<(Domain, SubstitutionTable)> {
        let table = self.table.extended(self.fpe_algorithm, &self.cipher, batch)?;
        Ok((self.domain.grown(batch), table))
    }

    fn commit(&mut self, domain: Domain, table: SubstitutionTable, batch: &[char]) {
        tracing::trace!(
            admitted = batch.len(),
            domain_len = domain.len(),
            growth = ?domain.growth(),
            "domain extended"
        );
        self.domain = domain;
        self.table = table;
        self.extensions.push(batch.iter().collect());
    }
}
