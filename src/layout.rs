// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! Declarative descriptions of fixed-size binary records. A `Layout` is
//! nothing more than an ordered list of `(Primitive, name)` pairs; the byte
//! offset of every field follows from the sizes of the fields before it.

use std::collections::HashSet;
use std::fmt;

use crate::error::{ElfError, ElfResult};

/// The primitive types a field can be stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    U8,
    U16,
    U32,
    U64,
    /// Fixed-length byte array
    Bytes(usize),
}

impl Primitive {
    /// Size of the primitive in bytes.
    pub fn size(self) -> usize {
        match self {
            Primitive::U8        => 1,
            Primitive::U16       => 2,
            Primitive::U32       => 4,
            Primitive::U64       => 8,
            Primitive::Bytes(n)  => n,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, Primitive::Bytes(_))
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Primitive::U8        => f.write_str("u8"),
            Primitive::U16       => f.write_str("u16"),
            Primitive::U32       => f.write_str("u32"),
            Primitive::U64       => f.write_str("u64"),
            Primitive::Bytes(n)  => write!(f, "[u8; {}]", n),
        }
    }
}

/// An ordered, immutable list of named fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    fields:  Vec<(Primitive, &'static str)>,
    size:    usize,
}

impl Layout {
    /// Builds a layout from its field list. Field names must be unique.
    pub fn new(fields: &[(Primitive, &'static str)]) -> ElfResult<Layout> {
        let mut seen = HashSet::new();
        for &(_, name) in fields {
            if !seen.insert(name) {
                return Err(ElfError::Layout(format!("field `{}` declared twice", name)));
            }
        }

        Ok(Layout {
            fields:  fields.to_vec(),
            size:    fields.iter().map(|&(p, _)| p.size()).sum(),
        })
    }

    /// Total size of one record in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn fields(&self) -> &[(Primitive, &'static str)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Index of the named field, if the layout has one.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|&(_, n)| n == name)
    }

    /// Byte offset of the named field within a record.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        let idx = self.position(name)?;
        Some(self.fields[..idx].iter().map(|&(p, _)| p.size()).sum())
    }
}
