// Capability flags carried in automaton headers.

use std::fmt;

use crate::FsaError;

/// A single capability bit.
///
/// The low byte holds the legacy flags every plain-format reader
/// understands; the high byte holds extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsaFlag {
    /// Arcs may have variable size.
    Flexible,
    /// The last arc of a state is marked explicitly.
    Stopbit,
    /// Arcs may point at the state that immediately follows them.
    Nextbit,
    /// Tail compression was applied.
    Tails,
    /// Each state carries its right-language count.
    Numbers,
    /// Filler and annotation separator bytes are meaningful.
    Separators,
}

impl FsaFlag {
    pub const ALL: [FsaFlag; 6] = [
        FsaFlag::Flexible,
        FsaFlag::Stopbit,
        FsaFlag::Nextbit,
        FsaFlag::Tails,
        FsaFlag::Numbers,
        FsaFlag::Separators,
    ];

    /// Bit of this flag in the 16-bit header bitset.
    pub const fn bit(self) -> u16 {
        match self {
            FsaFlag::Flexible => 1 << 0,
            FsaFlag::Stopbit => 1 << 1,
            FsaFlag::Nextbit => 1 << 2,
            FsaFlag::Tails => 1 << 3,
            FsaFlag::Numbers => 1 << 8,
            FsaFlag::Separators => 1 << 9,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            FsaFlag::Flexible => "FLEXIBLE",
            FsaFlag::Stopbit => "STOPBIT",
            FsaFlag::Nextbit => "NEXTBIT",
            FsaFlag::Tails => "TAILS",
            FsaFlag::Numbers => "NUMBERS",
            FsaFlag::Separators => "SEPARATORS",
        }
    }
}

/// Set of [`FsaFlag`]s.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FsaFlags(u16);

impl FsaFlags {
    pub const fn empty() -> Self {
        FsaFlags(0)
    }

    /// Flags shared by every automaton this crate writes.
    pub const fn standard() -> Self {
        FsaFlags(FsaFlag::Flexible.bit() | FsaFlag::Stopbit.bit() | FsaFlag::Nextbit.bit())
    }

    pub const fn with(self, flag: FsaFlag) -> Self {
        FsaFlags(self.0 | flag.bit())
    }

    pub const fn contains(self, flag: FsaFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    pub fn insert(&mut self, flag: FsaFlag) {
        self.0 |= flag.bit();
    }

    /// Raw 16-bit encoding.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Decodes a raw bitset, failing on any bit that no flag claims.
    pub fn from_bits(bits: u16) -> Result<Self, FsaError> {
        let flags = FsaFlag::ALL
            .iter()
            .filter(|flag| bits & flag.bit() != 0)
            .fold(FsaFlags::empty(), |acc, &flag| acc.with(flag));
        if flags.bits() != bits {
            return Err(FsaError::InvalidFlags(bits));
        }
        Ok(flags)
    }

    pub fn iter(self) -> impl Iterator<Item = FsaFlag> {
        FsaFlag::ALL.into_iter().filter(move |&flag| self.contains(flag))
    }
}

impl fmt::Debug for FsaFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(FsaFlag::name)).finish()
    }
}

impl fmt::Display for FsaFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for flag in self.iter() {
            if !first {
                f.write_str(" | ")?;
            }
            f.write_str(flag.name())?;
            first = false;
        }
        Ok(())
    }
}

impl FromIterator<FsaFlag> for FsaFlags {
    fn from_iter<I: IntoIterator<Item = FsaFlag>>(iter: I) -> Self {
        iter.into_iter().fold(FsaFlags::empty(), FsaFlags::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_flags_live_in_low_byte() {
        for flag in [FsaFlag::Flexible, FsaFlag::Stopbit, FsaFlag::Nextbit, FsaFlag::Tails] {
            assert!(flag.bit() <= 0xFF);
        }
        for flag in [FsaFlag::Numbers, FsaFlag::Separators] {
            assert!(flag.bit() > 0xFF);
        }
    }

    #[test]
    fn bits_round_trip() {
        let flags = FsaFlags::standard().with(FsaFlag::Numbers);
        assert_eq!(flags.bits(), 0x0107);
        assert_eq!(FsaFlags::from_bits(0x0107).unwrap(), flags);
    }

    #[test]
    fn reject_unknown_bits() {
        assert!(matches!(
            FsaFlags::from_bits(0x0017),
            Err(FsaError::InvalidFlags(0x0017))
        ));
        assert!(FsaFlags::from_bits(0x8000).is_err());
    }

    #[test]
    fn contains_and_insert() {
        let mut flags = FsaFlags::empty();
        assert!(!flags.contains(FsaFlag::Numbers));
        flags.insert(FsaFlag::Numbers);
        assert!(flags.contains(FsaFlag::Numbers));
        assert!(!flags.contains(FsaFlag::Tails));
    }

    #[test]
    fn display_lists_names() {
        let flags: FsaFlags = [FsaFlag::Stopbit, FsaFlag::Numbers].into_iter().collect();
        assert_eq!(flags.to_string(), "STOPBIT | NUMBERS");
        assert_eq!(format!("{flags:?}"), "{\"STOPBIT\", \"NUMBERS\"}");
    }
}
