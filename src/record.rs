// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! Named field values, as produced by `StructCodec::unpack` and consumed by
//! `StructCodec::pack`.

use std::fmt;

use crate::error::{ElfError, ElfResult};
use crate::flags::FlagSetValue;
use crate::format::{Enumeration, Resolved};

/// A raw value that a decode hook found in its vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Enumerant {
    pub kind:   &'static str,
    pub name:   &'static str,
    pub value:  u64,
}

/// The value of one field of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Int(u64),
    Bytes(Vec<u8>),
    Enum(Enumerant),
    Flags(FlagSetValue),

    /// A decode hook did not recognize this value; it is copied literally.
    Unresolved(u64),
}

impl Value {
    /// The integer behind the value, if it has one without the help of a
    /// hook.
    pub fn as_int(&self) -> Option<u64> {
        match *self {
            Value::Int(v) | Value::Unresolved(v) => Some(v),
            Value::Enum(ref e) => Some(e.value),
            Value::Bytes(_) | Value::Flags(_) => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(*self, Value::Unresolved(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Value::Int(v) => write!(f, "{:#x}", v),
            Value::Bytes(ref b) => write!(f, "{:02x?}", b),
            Value::Enum(ref e) => f.write_str(e.name),
            Value::Flags(ref s) => write!(f, "<{}>", s),
            Value::Unresolved(v) => write!(f, "{:#x}?", v),
        }
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Value { Value::Int(v) }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Value { Value::Bytes(v) }
}

impl From<FlagSetValue> for Value {
    fn from(v: FlagSetValue) -> Value { Value::Flags(v) }
}

/// An ordered list of named values.
///
/// Records returned by `unpack` hold exactly the fields of their layout, in
/// layout order. Records built by hand with `from_pairs` may hold fields in
/// any order; `pack` looks every field up by name and fails if one is
/// missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(&'static str, Value)>,
}

impl Record {
    pub fn new() -> Record {
        Record { fields: Vec::new() }
    }

    pub fn from_pairs<I>(pairs: I) -> Record
        where I: IntoIterator<Item = (&'static str, Value)>
    {
        let mut r = Record::new();
        for (name, value) in pairs {
            r.set(name, value);
        }
        r
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|&(name, ref value)| (name, value))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|&&(n, _)| n == name).map(|(_, v)| v)
    }

    /// Replaces the named field, or appends it if the record lacks it.
    /// Returns the previous value.
    pub fn set<V: Into<Value>>(&mut self, name: &'static str, value: V) -> Option<Value> {
        let value = value.into();
        match self.fields.iter_mut().find(|slot| slot.0 == name) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, value)),
            None => {
                self.fields.push((name, value));
                None
            },
        }
    }

    /// Copy of the record with one field overridden.
    pub fn with<V: Into<Value>>(&self, name: &'static str, value: V) -> Record {
        let mut r = self.clone();
        r.set(name, value);
        r
    }

    fn require(&self, name: &str) -> ElfResult<&Value> {
        self.get(name).ok_or_else(|| ElfError::MissingField(name.to_string()))
    }

    /// Integer view of a field. Works for plain integers, enumerants and
    /// unresolved values alike.
    pub fn int(&self, name: &str) -> ElfResult<u64> {
        self.require(name)?.as_int().ok_or_else(|| ElfError::FieldType {
            field:     name.to_string(),
            expected:  "an integer",
        })
    }

    pub fn bytes(&self, name: &str) -> ElfResult<&[u8]> {
        match *self.require(name)? {
            Value::Bytes(ref b) => Ok(b),
            _ => Err(ElfError::FieldType { field: name.to_string(), expected: "bytes" }),
        }
    }

    pub fn flags(&self, name: &str) -> ElfResult<&FlagSetValue> {
        match *self.require(name)? {
            Value::Flags(ref f) => Ok(f),
            _ => Err(ElfError::FieldType { field: name.to_string(), expected: "a flag set" }),
        }
    }

    /// Typed view of an enumeration field.
    pub fn resolved<E: Enumeration>(&self, name: &str) -> ElfResult<Resolved<E>> {
        self.int(name).map(Resolved::from_raw)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}
