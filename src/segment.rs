// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! Segments (program header table entries together with their contents), and
//! the code that lays them out again when a file is written.
//!
//! On output, segment contents are packed back to back right after the
//! program header table, each padded to `FILE_ALIGN` bytes. The original
//! file offsets are discarded; every other header field is written as is.

use std::slice;

use log::trace;

use crate::error::{ElfError, ElfResult};
use crate::flags::FlagSetValue;
use crate::format::{Resolved, SegmentType, FILE_ALIGN};
use crate::codec::StructCodec;
use crate::layouts::SEGMENT_FLAG_GLYPHS;
use crate::record::{Record, Value};

/// A program header paired with the bytes it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    header:   Record,
    content:  Vec<u8>,
}

impl Segment {
    /// Pairs a header with its contents. The header's `filesize` must match
    /// the length of `content`.
    pub fn new(header: Record, content: Vec<u8>) -> ElfResult<Segment> {
        let declared = header.int("filesize")?;
        if declared != content.len() as u64 {
            return Err(ElfError::SegmentSize { declared: declared, actual: content.len() });
        }

        Ok(Segment { header: header, content: content })
    }

    pub fn header(&self) -> &Record {
        &self.header
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Replaces the contents, updating `filesize` to match.
    pub fn set_content(&mut self, content: Vec<u8>) {
        self.header.set("filesize", content.len() as u64);
        self.content = content;
    }

    /// Changes one header field. Edits that would make `filesize` disagree
    /// with the contents are refused.
    pub fn set_field<V: Into<Value>>(&mut self, name: &'static str, value: V) -> ElfResult<()> {
        let value = value.into();
        if name == "filesize" && value.as_int() != Some(self.content.len() as u64) {
            return Err(ElfError::SegmentSize {
                declared:  value.as_int().unwrap_or(0),
                actual:    self.content.len(),
            });
        }
        self.header.set(name, value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Size of the contents rounded up to `FILE_ALIGN`.
    pub fn aligned_size(&self) -> usize {
        (self.len() + FILE_ALIGN - 1) / FILE_ALIGN * FILE_ALIGN
    }

    pub fn padding_size(&self) -> usize {
        self.aligned_size() - self.len()
    }

    pub fn segment_type(&self) -> ElfResult<Resolved<SegmentType>> {
        self.header.resolved("segment_type")
    }

    pub fn flags(&self) -> ElfResult<&FlagSetValue> {
        self.header.flags("flags")
    }

    /// Flags as a three letter `RWX` string, with `absent` for unset flags.
    pub fn abbreviated_flags(&self, absent: char) -> ElfResult<String> {
        Ok(self.flags()?.abbreviate(SEGMENT_FLAG_GLYPHS, absent))
    }

    pub fn offset(&self) -> ElfResult<u64> { self.header.int("offset") }
    pub fn vaddr(&self) -> ElfResult<u64> { self.header.int("vaddr") }
    pub fn paddr(&self) -> ElfResult<u64> { self.header.int("paddr") }
    pub fn filesize(&self) -> ElfResult<u64> { self.header.int("filesize") }
    pub fn memsize(&self) -> ElfResult<u64> { self.header.int("memsize") }
    pub fn align(&self) -> ElfResult<u64> { self.header.int("align") }
}

/// The segments of a file, in program header table order.
#[derive(Debug, Clone)]
pub struct Segments {
    codec:     StructCodec,
    segments:  Vec<Segment>,
}

impl Segments {
    /// An empty collection whose headers will be written with `codec`.
    pub fn new(codec: StructCodec) -> Segments {
        Segments { codec: codec, segments: Vec::new() }
    }

    pub fn codec(&self) -> &StructCodec {
        &self.codec
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn insert(&mut self, index: usize, segment: Segment) {
        self.segments.insert(index, segment);
    }

    pub fn remove(&mut self, index: usize) -> Segment {
        self.segments.remove(index)
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Segment> {
        self.segments.get_mut(index)
    }

    pub fn iter(&self) -> slice::Iter<Segment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// File offsets the segment contents will be written at, given the
    /// offset of the program header table.
    pub fn offsets(&self, table_offset: u64) -> Vec<u64> {
        let mut at = table_offset + (self.len() * self.codec.size()) as u64;
        self.segments.iter().map(|s| {
            let here = at;
            at += s.aligned_size() as u64;
            here
        }).collect()
    }

    /// The program header table, with each `offset` pointing at where
    /// `serialize_data` puts the segment's contents.
    pub fn serialize_table(&self, table_offset: u64) -> ElfResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.len() * self.codec.size());
        for (segment, offset) in self.segments.iter().zip(self.offsets(table_offset)) {
            trace!("segment at {:#x}, {} bytes", offset, segment.len());
            out.extend(self.codec.pack(&segment.header.with("offset", offset))?);
        }
        Ok(out)
    }

    /// Segment contents, each followed by zero padding up to `FILE_ALIGN`.
    pub fn serialize_data(&self) -> Vec<u8> {
        let total: usize = self.segments.iter().map(Segment::aligned_size).sum();
        let mut out = Vec::with_capacity(total);
        for segment in &self.segments {
            out.extend_from_slice(&segment.content);
            out.resize(out.len() + segment.padding_size(), 0);
        }
        out
    }

    /// Table followed by data, ready to be written at `table_offset`.
    pub fn serialize(&self, table_offset: u64) -> ElfResult<Vec<u8>> {
        let mut out = self.serialize_table(table_offset)?;
        out.extend(self.serialize_data());
        Ok(out)
    }
}

impl<'a> IntoIterator for &'a Segments {
    type Item = &'a Segment;
    type IntoIter = slice::Iter<'a, Segment>;

    fn into_iter(self) -> slice::Iter<'a, Segment> {
        self.segments.iter()
    }
}
