//! Named domain presets.
//!
//! A preset is one or more symbol strings. Resolution pushes every symbol of
//! every string in order and keeps repeats, so `hex-mixed` carries the ten
//! digits twice.

/// A named, canonical symbol set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub sets: &'static [&'static str],
}

impl Preset {
    /// Total symbol count, repeats included.
    pub fn len(&self) -> usize {
        self.sets.iter().map(|s| s.chars().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

const DIGITS: &str = "0123456789";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const HEX_LOWER: &str = "0123456789abcdef";
const HEX_UPPER: &str = "0123456789ABCDEF";
const PRINTABLE: &str = " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

/// The catalog shared by every FPE algorithm, in listing order.
pub const PRESETS: &[Preset] = &[
    Preset { name: "digits", sets: &[DIGITS] },
    Preset { name: "alpha-lower", sets: &[LOWER] },
    Preset { name: "alpha-upper", sets: &[UPPER] },
    Preset { name: "alpha", sets: &[LOWER, UPPER] },
    Preset { name: "alphanumeric", sets: &[DIGITS, LOWER, UPPER] },
    Preset { name: "hex", sets: &[HEX_LOWER] },
    Preset { name: "hex-upper", sets: &[HEX_UPPER] },
    Preset { name: "hex-mixed", sets: &[HEX_LOWER, HEX_UPPER] },
    Preset { name: "printable", sets: &[PRINTABLE] },
];

/// Look a preset up by exact name.
pub fn find(catalog: &'static [Preset], name: &str) -> Option<&'static Preset> {
    catalog.iter().find(|preset| preset.name == name)
}

/// Comma-separated preset names, for error messages.
pub fn names(catalog: &[Preset]) -> String {
    catalog.iter().map(|p| p.name).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_covers_ascii_32_to_126() {
        let expected: String = (32u8..=126).map(char::from).collect();
        assert_eq!(PRINTABLE, expected);
    }

    #[test]
    fn test_hex_mixed_repeats_digits() {
        let preset = find(PRESETS, "hex-mixed").unwrap();
        assert_eq!(preset.len(), 32);
    }

    #[test]
    fn test_names_are_unique() {
        let mut seen: Vec<&str> = PRESETS.iter().map(|p| p.name).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), PRESETS.len());
    }
}
