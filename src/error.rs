// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! The error type shared by every module in the crate.
//!
//! Values that merely fail to match a known enumerant are *not* errors; see
//! `record::Value::Unresolved`.

use std::io;

use thiserror::Error;

pub type ElfResult<T> = Result<T, ElfError>;

#[derive(Debug, Error)]
pub enum ElfError {
    /// A buffer handed to `unpack` is shorter than the record.
    #[error("{what}: need {expected} bytes, got {actual}")]
    Length {
        what:      &'static str,
        expected:  usize,
        actual:    usize,
    },

    /// The input ended before a record or payload could be read in full.
    #[error("{what} at offset {offset:#x} is truncated: need {expected} bytes, only {actual} available")]
    Truncated {
        what:      &'static str,
        offset:    u64,
        expected:  u64,
        actual:    u64,
    },

    #[error("field `{field}`: value {value:#x} does not fit in {width} bytes")]
    ValueTooLarge {
        field:     &'static str,
        value:     u64,
        width:     usize,
    },

    #[error("field `{field}`: {len} bytes do not fit in a {width} byte slot")]
    BytesTooLong {
        field:     &'static str,
        len:       usize,
        width:     usize,
    },

    #[error("field `{0}` is missing from the record")]
    MissingField(String),

    /// A value has the wrong shape for the slot or accessor it is used with.
    #[error("field `{field}`: expected {expected}")]
    FieldType {
        field:     String,
        expected:  &'static str,
    },

    /// A layout or codec was declared inconsistently.
    #[error("bad layout: {0}")]
    Layout(String),

    #[error("flag `{0}` is not known to this flag set")]
    UnknownFlag(String),

    #[error("flag set declares `{0}` more than once")]
    DuplicateFlag(String),

    #[error("flags `{0}` and `{1}` share bits")]
    OverlappingFlags(String, String),

    /// Leftover bits of a flag value that belong to a named flag.
    #[error("additional bits {additional:#x} overlap flag `{name}`")]
    AdditionalOverlap {
        name:        String,
        additional:  u64,
    },

    #[error("segment header says filesize {declared} but payload has {actual} bytes")]
    SegmentSize {
        declared:  u64,
        actual:    usize,
    },

    #[error("missing magic number (found {0:02x?})")]
    BadMagic(Vec<u8>),

    #[error("EI_CLASS field has unknown value {0}")]
    UnsupportedClass(u64),

    #[error("EI_DATA field has unknown value {0}")]
    UnsupportedEncoding(u64),

    #[error(transparent)]
    Io(#[from] io::Error),
}
