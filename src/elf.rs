// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! A whole ELF file: its headers, its segments, and its section headers,
//! along with the code to load and save it.
//!
//! Saving is lossy with respect to sections. Section headers are read and
//! made available, but a saved file has no section header table; the
//! segments are laid out again from scratch right after the file header.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, info};

use crate::codec::Endian;
use crate::error::{ElfError, ElfResult};
use crate::format::{Class, DataEncoding, Machine, ObjectType, OsAbi, Resolved, ELFMAG};
use crate::layouts::{ident_codec, Arch, Codecs, Width};
use crate::record::Record;
use crate::segment::{Segment, Segments};

/// Top level structure for an ELF file. Main output or input of the load and
/// save routines.
#[derive(Debug, Clone)]
pub struct ElfFile {
    codecs:    Codecs,

    /// The identification bytes, `e_ident`
    ident:     Record,

    /// The remainder of the file header
    header:    Record,

    segments:  Segments,
    sections:  Vec<Record>,
}

/// Works out the layouts a file uses from its identification bytes.
fn arch_of(ident: &Record) -> ElfResult<Arch> {
    let magic = ident.bytes("magic")?;
    if magic != ELFMAG {
        return Err(ElfError::BadMagic(magic.to_vec()));
    }

    let width = match ident.resolved::<Class>("ident_class")? {
        Resolved::Known(Class::Bit32) => Width::W32,
        Resolved::Known(Class::Bit64) => Width::W64,
        Resolved::Raw(raw) => return Err(ElfError::UnsupportedClass(raw)),
    };

    let endian = match ident.resolved::<DataEncoding>("ident_byteorder")? {
        Resolved::Known(DataEncoding::Little) => Endian::Little,
        Resolved::Known(DataEncoding::Big) => Endian::Big,
        Resolved::Raw(raw) => return Err(ElfError::UnsupportedEncoding(raw)),
    };

    Ok(Arch::new(endian, width))
}

/// Reads exactly `len` bytes at `offset`, or fails saying how many there were.
fn read_payload<R: Read + Seek>(r: &mut R, offset: u64, len: u64) -> ElfResult<Vec<u8>> {
    r.seek(SeekFrom::Start(offset))?;

    let mut buf = Vec::new();
    Read::take(&mut *r, len).read_to_end(&mut buf)?;
    if (buf.len() as u64) < len {
        return Err(ElfError::Truncated {
            what:      "segment contents",
            offset:    offset,
            expected:  len,
            actual:    buf.len() as u64,
        });
    }

    Ok(buf)
}

impl ElfFile {
    /// Loads a file from disk.
    pub fn read<P: AsRef<Path>>(path: P) -> ElfResult<ElfFile> {
        let path = path.as_ref();
        debug!("reading {}", path.display());
        ElfFile::load(&mut BufReader::new(File::open(path)?))
    }

    pub fn load<R: Read + Seek>(r: &mut R) -> ElfResult<ElfFile> {
        let ident = ident_codec()?.unpack_from(r, Some(0))?;
        let arch = arch_of(&ident)?;
        let codecs = Codecs::new(arch)?;
        debug!("{}-bit {:?} endian file", arch.width.bits(), arch.endian);

        let header = codecs.header.unpack_from(r, None)?;

        let phoff = header.int("phoff")?;
        let phentsize = header.int("phentsize")?;
        let phnum = header.int("phnum")?;

        let mut segments = Segments::new(codecs.segment.clone());
        for i in 0..phnum {
            let seg = codecs.segment.unpack_from(r, Some(phoff.saturating_add(i * phentsize)))?;
            let offset = seg.int("offset")?;
            let filesize = seg.int("filesize")?;
            debug!("segment {}: {} bytes at {:#x}", i, filesize, offset);

            let content = read_payload(r, offset, filesize)?;
            segments.push(Segment::new(seg, content)?);
        }

        let shoff = header.int("shoff")?;
        let shentsize = header.int("shentsize")?;
        let shnum = header.int("shnum")?;

        let mut sections = Vec::with_capacity(shnum as usize);
        for i in 0..shnum {
            sections.push(codecs.section.unpack_from(r, Some(shoff.saturating_add(i * shentsize)))?);
        }
        debug!("{} segments, {} sections", segments.len(), sections.len());

        Ok(ElfFile {
            codecs:    codecs,
            ident:     ident,
            header:    header,
            segments:  segments,
            sections:  sections,
        })
    }

    /// Writes the file to disk.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> ElfResult<()> {
        let path = path.as_ref();
        let mut w = BufWriter::new(File::create(path)?);
        self.save(&mut w)?;
        w.flush()?;
        info!("wrote {} segments to {}", self.segments.len(), path.display());
        Ok(())
    }

    pub fn save<W: Write>(&self, w: &mut W) -> ElfResult<()> {
        w.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    /// The file as it would be written: identification, file header with
    /// recomputed table fields, program header table, segment contents.
    pub fn to_bytes(&self) -> ElfResult<Vec<u8>> {
        let phoff = (self.codecs.ident.size() + self.codecs.header.size()) as u64;

        let mut header = self.header.clone();
        header.set("phoff", phoff);
        header.set("phentsize", self.codecs.segment.size() as u64);
        header.set("phnum", self.segments.len() as u64);
        header.set("shoff", 0u64);
        header.set("shnum", 0u64);
        header.set("shentsize", 0u64);
        header.set("shstrndx", 0u64);

        let mut out = self.codecs.ident.pack(&self.ident)?;
        out.extend(self.codecs.header.pack(&header)?);
        out.extend(self.segments.serialize(phoff)?);
        Ok(out)
    }

    pub fn arch(&self) -> Arch {
        self.codecs.arch
    }

    pub fn ident(&self) -> &Record {
        &self.ident
    }

    pub fn header(&self) -> &Record {
        &self.header
    }

    /// Table offsets, counts and entry sizes in here are recomputed on save.
    pub fn header_mut(&mut self) -> &mut Record {
        &mut self.header
    }

    pub fn segments(&self) -> &Segments {
        &self.segments
    }

    pub fn segments_mut(&mut self) -> &mut Segments {
        &mut self.segments
    }

    pub fn sections(&self) -> &[Record] {
        &self.sections
    }

    pub fn object_type(&self) -> ElfResult<Resolved<ObjectType>> {
        self.header.resolved("obj_type")
    }

    pub fn machine(&self) -> ElfResult<Resolved<Machine>> {
        self.header.resolved("machine")
    }

    pub fn os_abi(&self) -> ElfResult<Resolved<OsAbi>> {
        self.ident.resolved("ident_osabi")
    }

    /// The entry point address, if one is provided
    pub fn entry(&self) -> ElfResult<Option<u64>> {
        match self.header.int("entry")? {
            0 => Ok(None),
            x => Ok(Some(x)),
        }
    }
}
