// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! The generic record codec. A `StructCodec` couples a `Layout` with a byte
//! order and a set of per-field hooks, and converts between byte buffers and
//! `Record`s.
//!
//! Hooks are how raw integers become something nicer: an enumerant, or a set
//! of named flags. Decode hooks that do not recognize a value never fail the
//! record as a whole; the field is left as `Value::Unresolved` holding the
//! raw integer, since unknown values are common in real binaries.

use std::collections::HashMap;
use std::fmt;
use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::{trace, warn};

use crate::error::{ElfError, ElfResult};
use crate::flags::FlagSet;
use crate::format::{self, Enumeration};
use crate::layout::{Layout, Primitive};
use crate::record::{Enumerant, Record, Value};

/// Byte order of multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    fn read(self, p: Primitive, buf: &[u8]) -> u64 {
        match (self, p) {
            (_, Primitive::U8)              => buf[0] as u64,
            (Endian::Little, Primitive::U16) => LittleEndian::read_u16(buf) as u64,
            (Endian::Little, Primitive::U32) => LittleEndian::read_u32(buf) as u64,
            (Endian::Little, Primitive::U64) => LittleEndian::read_u64(buf),
            (Endian::Big, Primitive::U16)    => BigEndian::read_u16(buf) as u64,
            (Endian::Big, Primitive::U32)    => BigEndian::read_u32(buf) as u64,
            (Endian::Big, Primitive::U64)    => BigEndian::read_u64(buf),
            (_, Primitive::Bytes(_))         => unreachable!("byte arrays are not integers"),
        }
    }

    fn write(self, p: Primitive, buf: &mut [u8], v: u64) {
        match (self, p) {
            (_, Primitive::U8)              => buf[0] = v as u8,
            (Endian::Little, Primitive::U16) => LittleEndian::write_u16(buf, v as u16),
            (Endian::Little, Primitive::U32) => LittleEndian::write_u32(buf, v as u32),
            (Endian::Little, Primitive::U64) => LittleEndian::write_u64(buf, v),
            (Endian::Big, Primitive::U16)    => BigEndian::write_u16(buf, v as u16),
            (Endian::Big, Primitive::U32)    => BigEndian::write_u32(buf, v as u32),
            (Endian::Big, Primitive::U64)    => BigEndian::write_u64(buf, v),
            (_, Primitive::Bytes(_))         => unreachable!("byte arrays are not integers"),
        }
    }
}

/// Returned by a decode hook that does not know a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unrecognized {
    pub kind:   &'static str,
    pub value:  u64,
}

impl fmt::Display for Unrecognized {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#x} is not a known {}", self.value, self.kind)
    }
}

/// A per-field transform between the raw integer in the file and a `Value`.
#[derive(Clone)]
pub enum Hook {
    /// Maps raw integers to enumerants of one vocabulary.
    Enum {
        kind:    &'static str,
        lookup:  fn(u64) -> Option<&'static str>,
    },

    /// Splits bitmasks into named flags.
    Flags(Arc<FlagSet>),
}

impl Hook {
    pub fn enumeration<E: Enumeration>() -> Hook {
        Hook::Enum { kind: E::KIND, lookup: format::lookup::<E> }
    }

    pub fn flags(set: FlagSet) -> Hook {
        Hook::Flags(Arc::new(set))
    }

    pub fn decode(&self, raw: u64) -> Result<Value, Unrecognized> {
        match *self {
            Hook::Enum { kind, lookup } => match lookup(raw) {
                Some(name) => Ok(Value::Enum(Enumerant { kind: kind, name: name, value: raw })),
                None => Err(Unrecognized { kind: kind, value: raw }),
            },
            Hook::Flags(ref set) => Ok(Value::Flags(set.decode(raw))),
        }
    }

    /// Turns a value back into the integer stored in the file.
    pub fn encode(&self, field: &str, value: &Value) -> ElfResult<u64> {
        match (self, value) {
            (&Hook::Flags(ref set), &Value::Flags(ref v)) => set.encode(v),
            (_, v) => v.as_int().ok_or_else(|| ElfError::FieldType {
                field:     field.to_string(),
                expected:  "an integer",
            }),
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Hook::Enum { kind, .. } => write!(f, "Hook::Enum({})", kind),
            Hook::Flags(ref set) => write!(f, "Hook::Flags({:?})", set),
        }
    }
}

pub type Hooks = HashMap<&'static str, Hook>;

/// Packs and unpacks records of one layout in one byte order.
#[derive(Debug, Clone)]
pub struct StructCodec {
    name:          &'static str,
    layout:        Layout,
    endian:        Endian,
    unpack_hooks:  Vec<Option<Hook>>,
    pack_hooks:    Vec<Option<Hook>>,
}

fn place_hooks(layout: &Layout, hooks: Hooks) -> ElfResult<Vec<Option<Hook>>> {
    let mut placed = vec![None; layout.len()];
    for (name, hook) in hooks {
        let idx = layout.position(name).ok_or_else(|| {
            ElfError::Layout(format!("hook for unknown field `{}`", name))
        })?;
        if !layout.fields()[idx].0.is_integer() {
            return Err(ElfError::Layout(format!("hook on byte array field `{}`", name)));
        }
        placed[idx] = Some(hook);
    }
    Ok(placed)
}

impl StructCodec {
    pub fn new(layout: Layout, endian: Endian, unpack_hooks: Hooks, pack_hooks: Hooks) -> ElfResult<StructCodec> {
        let unpack_hooks = place_hooks(&layout, unpack_hooks)?;
        let pack_hooks = place_hooks(&layout, pack_hooks)?;

        Ok(StructCodec {
            name:          "record",
            layout:        layout,
            endian:        endian,
            unpack_hooks:  unpack_hooks,
            pack_hooks:    pack_hooks,
        })
    }

    /// A codec without any hooks.
    pub fn plain(layout: Layout, endian: Endian) -> StructCodec {
        StructCodec {
            name:          "record",
            unpack_hooks:  vec![None; layout.len()],
            pack_hooks:    vec![None; layout.len()],
            layout:        layout,
            endian:        endian,
        }
    }

    /// Sets the record kind named in length and truncation errors.
    pub fn named(mut self, name: &'static str) -> StructCodec {
        self.name = name;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Size of one record in bytes.
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn pack(&self, record: &Record) -> ElfResult<Vec<u8>> {
        let mut out = vec![0u8; self.size()];
        let mut at = 0;

        for (idx, &(prim, name)) in self.layout.fields().iter().enumerate() {
            let value = record.get(name).ok_or_else(|| ElfError::MissingField(name.to_string()))?;
            let slot = &mut out[at..at + prim.size()];
            at += prim.size();

            if let Primitive::Bytes(width) = prim {
                let b = match *value {
                    Value::Bytes(ref b) => b,
                    _ => return Err(ElfError::FieldType { field: name.to_string(), expected: "bytes" }),
                };
                if b.len() > width {
                    return Err(ElfError::BytesTooLong { field: name, len: b.len(), width: width });
                }
                slot[..b.len()].copy_from_slice(b);
                continue;
            }

            let raw = match self.pack_hooks[idx] {
                Some(ref hook) => hook.encode(name, value)?,
                None => match value.as_int() {
                    Some(v) => v,
                    None => return Err(ElfError::FieldType {
                        field:     name.to_string(),
                        expected:  "an integer",
                    }),
                },
            };

            if prim.size() < 8 && raw >> (8 * prim.size()) != 0 {
                return Err(ElfError::ValueTooLarge { field: name, value: raw, width: prim.size() });
            }

            self.endian.write(prim, slot, raw);
        }

        Ok(out)
    }

    /// Decodes a record from the head of `data`. Bytes past `size()` are
    /// ignored.
    pub fn unpack(&self, data: &[u8]) -> ElfResult<Record> {
        if data.len() < self.size() {
            return Err(ElfError::Length {
                what:      self.name,
                expected:  self.size(),
                actual:    data.len(),
            });
        }

        let mut record = Record::new();
        let mut at = 0;

        for (idx, &(prim, name)) in self.layout.fields().iter().enumerate() {
            let buf = &data[at..at + prim.size()];
            at += prim.size();

            let value = match prim {
                Primitive::Bytes(_) => Value::Bytes(buf.to_vec()),
                _ => {
                    let raw = self.endian.read(prim, buf);
                    match self.unpack_hooks[idx] {
                        Some(ref hook) => match hook.decode(raw) {
                            Ok(v) => v,
                            Err(e) => {
                                warn!("field `{}`: {}, keeping raw value", name, e);
                                Value::Unresolved(raw)
                            },
                        },
                        None => Value::Int(raw),
                    }
                },
            };

            record.set(name, value);
        }

        Ok(record)
    }

    /// Reads one record from `r`, first seeking to `offset` if one is given.
    pub fn unpack_from<R: Read + Seek>(&self, r: &mut R, offset: Option<u64>) -> ElfResult<Record> {
        let at = match offset {
            Some(off) => r.seek(SeekFrom::Start(off))?,
            None => r.stream_position()?,
        };

        let mut buf = Vec::with_capacity(self.size());
        Read::take(&mut *r, self.size() as u64).read_to_end(&mut buf)?;
        if buf.len() < self.size() {
            return Err(ElfError::Truncated {
                what:      self.name,
                offset:    at,
                expected:  self.size() as u64,
                actual:    buf.len() as u64,
            });
        }

        trace!("unpacking {} byte {} at {:#x}", self.size(), self.name, at);
        self.unpack(&buf)
    }
}
