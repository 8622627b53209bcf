// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! Bitmask fields decoded into sets of named flags.
//!
//! A `FlagSet` knows a fixed vocabulary of `(bits, name)` entries. Decoding
//! an integer yields the names whose bits are all set, plus whatever bits are
//! left over; those are kept in `FlagSetValue::additional` so that encoding
//! the value again reproduces the original integer exactly.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::error::{ElfError, ElfResult};

/// A decoded bitmask.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FlagSetValue {
    flags:       BTreeSet<String>,
    additional:  u64,
}

impl FlagSetValue {
    pub fn new<I, S>(flags: I, additional: u64) -> FlagSetValue
        where I: IntoIterator<Item = S>, S: Into<String>
    {
        FlagSetValue {
            flags:       flags.into_iter().map(Into::into).collect(),
            additional:  additional,
        }
    }

    pub fn flags(&self) -> &BTreeSet<String> {
        &self.flags
    }

    /// Bits not covered by any named flag.
    pub fn additional(&self) -> u64 {
        self.additional
    }

    pub fn contains(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    pub fn insert<S: Into<String>>(&mut self, name: S) -> bool {
        self.flags.insert(name.into())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.flags.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }

    /// Renders the set as a fixed-width string, one glyph per entry of
    /// `glyphs`: the glyph if the flag is present, `absent` otherwise.
    pub fn abbreviate(&self, glyphs: &[(&str, char)], absent: char) -> String {
        glyphs.iter()
            .map(|&(name, glyph)| if self.contains(name) { glyph } else { absent })
            .collect()
    }
}

impl fmt::Display for FlagSetValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        f.write_str(&names.join(", "))?;
        if self.additional != 0 {
            write!(f, " + {:#x}", self.additional)?;
        }
        Ok(())
    }
}

/// A vocabulary of named bit patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSet {
    entries: Vec<(u64, &'static str)>,
}

impl FlagSet {
    /// Builds a flag set. Names and bit patterns must each be unique, and no
    /// two patterns may share a bit, so decoding does not depend on the order
    /// of the entries.
    pub fn new(entries: &[(u64, &'static str)]) -> ElfResult<FlagSet> {
        let mut names = HashSet::new();
        let mut bits = HashSet::new();
        for (i, &(value, name)) in entries.iter().enumerate() {
            if !names.insert(name) {
                return Err(ElfError::DuplicateFlag(name.to_string()));
            }
            if !bits.insert(value) {
                return Err(ElfError::DuplicateFlag(format!("{:#x}", value)));
            }
            if let Some(&(_, other)) = entries[..i].iter().find(|&&(v, _)| v & value != 0) {
                return Err(ElfError::OverlappingFlags(other.to_string(), name.to_string()));
            }
        }

        Ok(FlagSet { entries: entries.to_vec() })
    }

    pub fn entries(&self) -> &[(u64, &'static str)] {
        &self.entries
    }

    /// Bits of the named flag, if it is part of the vocabulary.
    pub fn bits(&self, name: &str) -> Option<u64> {
        self.entries.iter().find(|&&(_, n)| n == name).map(|&(v, _)| v)
    }

    /// Splits `value` into named flags. Every entry is matched as a whole,
    /// so multi-bit entries only appear when all of their bits are set.
    pub fn decode(&self, value: u64) -> FlagSetValue {
        let mut rest = value;
        let mut flags = BTreeSet::new();

        for &(bits, name) in &self.entries {
            if rest & bits == bits {
                rest &= !bits;
                flags.insert(name.to_string());
            }
        }

        FlagSetValue { flags: flags, additional: rest }
    }

    /// Packs a value back into an integer. The additional bits may not hold
    /// a whole entry, nor any bit of an entry that is named in the value;
    /// such a value would decode differently.
    pub fn encode(&self, value: &FlagSetValue) -> ElfResult<u64> {
        let extra = value.additional;
        let clash = self.entries.iter().find(|&&(bits, name)| {
            (bits != 0 && extra & bits == bits) || (extra & bits != 0 && value.contains(name))
        });
        if let Some(&(_, name)) = clash {
            return Err(ElfError::AdditionalOverlap {
                name:        name.to_string(),
                additional:  extra,
            });
        }

        let mut out = extra;
        for name in value.iter() {
            match self.bits(name) {
                Some(bits) => out |= bits,
                None => return Err(ElfError::UnknownFlag(name.to_string())),
            }
        }
        Ok(out)
    }

    pub fn abbreviate(&self, value: &FlagSetValue, glyphs: &[(&str, char)], absent: char) -> String {
        value.abbreviate(glyphs, absent)
    }
}
