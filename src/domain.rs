//! Domain specification and resolution.
//!
//! Two layers:
//! - [`DomainOptions`] is the loose wire shape callers configure with
//!   (`type`, `domain`, `residual_chars`, `additional_chars`). It
//!   deserialises from JSON.
//! - [`DomainSpec`] is the validated sum type. `TryFrom<&DomainOptions>`
//!   performs every check that does not need the algorithm's preset
//!   catalog; [`resolve`] performs the rest and produces a [`Domain`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::algorithm::FpeAlgorithm;
use crate::error::{FpeError, Result};
use crate::presets;

const EXPLICIT_TYPES: [&str; 3] = ["input", "preset", "ascii-range"];

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

/// A string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn is_empty(&self) -> bool {
        match self {
            Self::One(s) => s.is_empty(),
            Self::Many(items) => items.is_empty(),
        }
    }

    fn iter(&self) -> impl Iterator<Item = &str> {
        let items: Vec<&str> = match self {
            Self::One(s) => vec![s.as_str()],
            Self::Many(items) => items.iter().map(String::as_str).collect(),
        };
        items.into_iter()
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<Vec<&str>> for OneOrMany {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// The declarative domain request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainOptions {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<OneOrMany>,
    #[serde(default)]
    pub residual_chars: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_chars: Option<OneOrMany>,
}

impl DomainOptions {
    fn explicit(kind: &str, domain: OneOrMany) -> Self {
        Self {
            kind: Some(kind.to_string()),
            domain: Some(domain),
            ..Self::default()
        }
    }

    /// `type: "input"` over the characters of `chars`.
    pub fn input(chars: &str) -> Self {
        Self::explicit("input", chars.into())
    }

    /// `type: "preset"` naming a catalog entry.
    pub fn preset(name: &str) -> Self {
        Self::explicit("preset", name.into())
    }

    /// `type: "ascii-range"` over one or more `"start-end"` ranges.
    pub fn ascii_range(ranges: impl Into<OneOrMany>) -> Self {
        Self::explicit("ascii-range", ranges.into())
    }

    /// Permit later growth for out-of-domain symbols.
    pub fn with_residual(mut self) -> Self {
        self.residual_chars = true;
        self
    }

    /// Union extra symbols into the domain.
    pub fn with_additional(mut self, chars: impl Into<OneOrMany>) -> Self {
        self.additional_chars = Some(chars.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Validated spec
// ---------------------------------------------------------------------------

/// The base of a domain. Exactly one is active per context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainKind {
    /// No explicit domain; it is inferred from the text processed.
    Default,
    /// Literal characters.
    Input(String),
    /// Name of a preset in the active algorithm's catalog.
    Preset(String),
    /// Inclusive code-point ranges, in declaration order.
    AsciiRange(Vec<(u32, u32)>),
}

/// A validated domain request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSpec {
    pub kind: DomainKind,
    /// Only meaningful for explicit kinds.
    pub residual: bool,
    pub additional: Vec<char>,
}

impl Default for DomainSpec {
    fn default() -> Self {
        Self {
            kind: DomainKind::Default,
            residual: false,
            additional: Vec::new(),
        }
    }
}

impl TryFrom<&DomainOptions> for DomainSpec {
    type Error = FpeError;

    fn try_from(options: &DomainOptions) -> Result<Self> {
        let kind = match options.kind.as_deref() {
            None | Some("default") => DomainKind::Default,
            Some(kind) if EXPLICIT_TYPES.contains(&kind) => {
                let domain = options
                    .domain
                    .as_ref()
                    .filter(|domain| !domain.is_empty())
                    .ok_or_else(|| {
                        FpeError::config(format!(
                            "\"domain\" argument not provided for domain type {kind:?} (domain_options)"
                        ))
                    })?;
                match kind {
                    "input" => DomainKind::Input(single_string(domain, "string of chars")?),
                    "preset" => DomainKind::Preset(single_string(domain, "preset name")?),
                    _ => DomainKind::AsciiRange(
                        domain.iter().map(parse_range).collect::<Result<Vec<_>>>()?,
                    ),
                }
            }
            Some(other) => {
                return Err(FpeError::config(format!(
                    "Invalid domain \"type\" argument provided: {other:?} (domain_options). Required (one of): {:?}",
                    EXPLICIT_TYPES.join(", ")
                )))
            }
        };

        let residual = options.residual_chars && kind != DomainKind::Default;
        let mut additional = Vec::new();
        for set in options.additional_chars.iter().flat_map(OneOrMany::iter) {
            for symbol in set.chars() {
                if !additional.contains(&symbol) {
                    additional.push(symbol);
                }
            }
        }

        Ok(Self {
            kind,
            residual,
            additional,
        })
    }
}

fn single_string(domain: &OneOrMany, required: &str) -> Result<String> {
    match domain {
        OneOrMany::One(s) => Ok(s.clone()),
        OneOrMany::Many(items) => Err(FpeError::config(format!(
            "Invalid \"domain\" argument format: {items:?} (domain_options). Required: {required}"
        ))),
    }
}

/// Parse `"start-end"` into an inclusive code-point range.
fn parse_range(range: &str) -> Result<(u32, u32)> {
    let parts: Vec<&str> = range.split('-').collect();
    let [start, end] = parts.as_slice() else {
        return Err(FpeError::config(format!(
            "Invalid \"ASCII range\" argument format: {range:?} (domain_options). Required: string of format \"startNo-endNo\""
        )));
    };
    let parse = |part: &str, name: &str| -> Result<u32> {
        let part = part.trim();
        if part.is_empty() {
            return Err(FpeError::config(format!(
                "ASCII range {name:?} argument required (domain_options)"
            )));
        }
        part.parse::<u32>().map_err(|_| {
            FpeError::config(format!(
                "ASCII range {name:?} argument must be a number (domain_options), got {part:?}"
            ))
        })
    };
    let (start, end) = (parse(*start, "start")?, parse(*end, "end")?);

    if start > end {
        return Err(FpeError::config(
            "ASCII range \"start\" argument greater than \"end\" argument (domain_options)",
        ));
    }
    if start == end {
        return Err(FpeError::config(
            "ASCII range \"start\" argument same as \"end\" argument (domain_options)",
        ));
    }
    Ok((start, end))
}

// ---------------------------------------------------------------------------
// Resolved domain
// ---------------------------------------------------------------------------

/// How a domain may grow once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Growth {
    /// Inferred from text: every new symbol is admitted.
    TextDerived,
    /// Explicit, but out-of-domain symbols may be admitted.
    Residual,
    /// Explicit and closed.
    Fixed,
}

/// An ordered symbol sequence. Appended to, never reordered or shrunk.
///
/// Preset resolution may leave repeated symbols in the sequence; membership
/// and table construction treat them as one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    symbols: Vec<char>,
    members: HashSet<char>,
    growth: Growth,
    additional: bool,
}

impl Domain {
    fn empty(growth: Growth) -> Self {
        Self {
            symbols: Vec::new(),
            members: HashSet::new(),
            growth,
            additional: false,
        }
    }

    fn push(&mut self, symbol: char) {
        self.symbols.push(symbol);
        self.members.insert(symbol);
    }

    fn push_unique(&mut self, symbol: char) {
        if !self.members.contains(&symbol) {
            self.push(symbol);
        }
    }

    /// Symbols in domain order, repeats included.
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Length of the symbol sequence, repeats included.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of distinct symbols.
    pub fn distinct_len(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.members.contains(&symbol)
    }

    pub fn growth(&self) -> Growth {
        self.growth
    }

    /// Whether `additional_chars` contributed to this domain.
    pub fn has_additional(&self) -> bool {
        self.additional
    }

    /// Distinct symbols of `text` not yet in the domain, first occurrence
    /// first.
    pub fn missing_from(&self, text: &str) -> Vec<char> {
        let mut missing = Vec::new();
        for symbol in text.chars() {
            if !self.contains(symbol) && !missing.contains(&symbol) {
                missing.push(symbol);
            }
        }
        missing
    }

    /// Copy of this domain with `batch` appended.
    pub(crate) fn grown(&self, batch: &[char]) -> Self {
        let mut domain = self.clone();
        for &symbol in batch {
            domain.push_unique(symbol);
        }
        domain
    }

    /// Render the symbol sequence as a string.
    pub fn as_string(&self) -> String {
        self.symbols.iter().collect()
    }
}

/// Turn a validated spec into a concrete domain.
pub fn resolve(spec: &DomainSpec, algorithm: FpeAlgorithm) -> Result<Domain> {
    let growth = match (&spec.kind, spec.residual) {
        (DomainKind::Default, _) => Growth::TextDerived,
        (_, true) => Growth::Residual,
        (_, false) => Growth::Fixed,
    };
    let mut domain = Domain::empty(growth);

    match &spec.kind {
        DomainKind::Default => {}
        DomainKind::Input(chars) => chars.chars().for_each(|c| domain.push_unique(c)),
        DomainKind::Preset(name) => {
            let catalog = algorithm.domain_presets();
            let preset = presets::find(catalog, name).ok_or_else(|| {
                FpeError::config(format!(
                    "Invalid domain \"preset\": {name:?} provided for {:?} (domain_options). Required (one of): {:?}",
                    algorithm.name(),
                    presets::names(catalog)
                ))
            })?;
            for set in preset.sets {
                set.chars().for_each(|c| domain.push(c));
            }
        }
        DomainKind::AsciiRange(ranges) => {
            for &(start, end) in ranges {
                for code in start..=end {
                    let symbol = char::from_u32(code).ok_or_else(|| {
                        FpeError::config(format!(
                            "ASCII range {start}-{end} contains {code}, which is not a valid character (domain_options)"
                        ))
                    })?;
                    domain.push(symbol);
                }
            }
        }
    }

    if !spec.additional.is_empty() {
        spec.additional.iter().for_each(|&c| domain.push_unique(c));
        domain.additional = true;
    }

    Ok(domain)
}
