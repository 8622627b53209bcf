// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! Record layouts for the headers of an ELF file, parameterized by class
//! (32 or 64 bit) and data encoding. Field names are shared between the
//! 32-bit and 64-bit flavors of a header, so code working with the decoded
//! records does not care which one it got.

use crate::codec::{Endian, Hook, Hooks, StructCodec};
use crate::error::ElfResult;
use crate::flags::FlagSet;
use crate::format::{Class, DataEncoding, Machine, ObjectType, OsAbi, SectionType, SegmentType};
use crate::layout::{Layout, Primitive};
use crate::layout::Primitive::{U16, U32, U8};

/// Address width of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    W32,
    W64,
}

impl Width {
    /// The primitive addresses, offsets and sizes are stored as.
    pub fn word(self) -> Primitive {
        match self {
            Width::W32 => Primitive::U32,
            Width::W64 => Primitive::U64,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            Width::W32 => 32,
            Width::W64 => 64,
        }
    }
}

/// Everything needed to pick a set of layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arch {
    pub endian:  Endian,
    pub width:   Width,
}

impl Arch {
    pub fn new(endian: Endian, width: Width) -> Arch {
        Arch { endian: endian, width: width }
    }

    pub fn class(self) -> Class {
        match self.width {
            Width::W32 => Class::Bit32,
            Width::W64 => Class::Bit64,
        }
    }

    pub fn encoding(self) -> DataEncoding {
        match self.endian {
            Endian::Little => DataEncoding::Little,
            Endian::Big => DataEncoding::Big,
        }
    }
}

pub const SEGMENT_FLAGS: &[(u64, &str)] = &[
    (0x1,    "Execute"),
    (0x2,    "Write"),
    (0x4,    "Read"),
];

pub const SECTION_FLAGS: &[(u64, &str)] = &[
    (0x1,    "Write"),
    (0x2,    "Alloc"),
    (0x4,    "ExecInstr"),
    (0x10,   "Merge"),
    (0x20,   "Strings"),
    (0x40,   "InfoLink"),
    (0x80,   "LinkOrder"),
    (0x100,  "OsNonConforming"),
    (0x200,  "Group"),
    (0x400,  "Tls"),
];

/// Glyphs used when abbreviating segment flags, in display order.
pub const SEGMENT_FLAG_GLYPHS: &[(&str, char)] = &[
    ("Read",     'R'),
    ("Write",    'W'),
    ("Execute",  'X'),
];

pub fn segment_flags() -> ElfResult<FlagSet> {
    FlagSet::new(SEGMENT_FLAGS)
}

pub fn section_flags() -> ElfResult<FlagSet> {
    FlagSet::new(SECTION_FLAGS)
}

/// The 16 identification bytes at the start of every file. Single bytes
/// only, so byte order does not matter.
pub fn ident_codec() -> ElfResult<StructCodec> {
    let layout = Layout::new(&[
        (Primitive::Bytes(4),  "magic"),
        (U8,                   "ident_class"),
        (U8,                   "ident_byteorder"),
        (U8,                   "ident_version"),
        (U8,                   "ident_osabi"),
        (U8,                   "ident_abiversion"),
        (Primitive::Bytes(7),  "padding"),
    ])?;

    let mut unpack = Hooks::new();
    unpack.insert("ident_class", Hook::enumeration::<Class>());
    unpack.insert("ident_byteorder", Hook::enumeration::<DataEncoding>());
    unpack.insert("ident_osabi", Hook::enumeration::<OsAbi>());

    StructCodec::new(layout, Endian::Little, unpack, Hooks::new())
        .map(|c| c.named("identification"))
}

/// The rest of the file header, following the identification bytes.
pub fn file_header_codec(arch: Arch) -> ElfResult<StructCodec> {
    let word = arch.width.word();
    let layout = Layout::new(&[
        (U16,   "obj_type"),
        (U16,   "machine"),
        (U32,   "version"),
        (word,  "entry"),
        (word,  "phoff"),
        (word,  "shoff"),
        (U32,   "flags"),
        (U16,   "ehsize"),
        (U16,   "phentsize"),
        (U16,   "phnum"),
        (U16,   "shentsize"),
        (U16,   "shnum"),
        (U16,   "shstrndx"),
    ])?;

    let mut unpack = Hooks::new();
    unpack.insert("obj_type", Hook::enumeration::<ObjectType>());
    unpack.insert("machine", Hook::enumeration::<Machine>());

    StructCodec::new(layout, arch.endian, unpack, Hooks::new())
        .map(|c| c.named("file header"))
}

/// A program header table entry. The 64-bit layout moves `flags` up next
/// to `segment_type` so the words stay naturally aligned.
pub fn segment_header_codec(arch: Arch) -> ElfResult<StructCodec> {
    let word = arch.width.word();
    let layout = match arch.width {
        Width::W32 => Layout::new(&[
            (U32,   "segment_type"),
            (word,  "offset"),
            (word,  "vaddr"),
            (word,  "paddr"),
            (word,  "filesize"),
            (word,  "memsize"),
            (U32,   "flags"),
            (word,  "align"),
        ])?,
        Width::W64 => Layout::new(&[
            (U32,   "segment_type"),
            (U32,   "flags"),
            (word,  "offset"),
            (word,  "vaddr"),
            (word,  "paddr"),
            (word,  "filesize"),
            (word,  "memsize"),
            (word,  "align"),
        ])?,
    };

    let flags = segment_flags()?;

    let mut unpack = Hooks::new();
    unpack.insert("segment_type", Hook::enumeration::<SegmentType>());
    unpack.insert("flags", Hook::flags(flags.clone()));
    let mut pack = Hooks::new();
    pack.insert("flags", Hook::flags(flags));

    StructCodec::new(layout, arch.endian, unpack, pack)
        .map(|c| c.named("segment header"))
}

/// A section header table entry.
pub fn section_header_codec(arch: Arch) -> ElfResult<StructCodec> {
    let word = arch.width.word();
    let layout = Layout::new(&[
        (U32,   "name_offset"),
        (U32,   "section_type"),
        (word,  "flags"),
        (word,  "addr"),
        (word,  "offset"),
        (word,  "size"),
        (U32,   "link"),
        (U32,   "info"),
        (word,  "addr_align"),
        (word,  "entry_size"),
    ])?;

    let flags = section_flags()?;

    let mut unpack = Hooks::new();
    unpack.insert("section_type", Hook::enumeration::<SectionType>());
    unpack.insert("flags", Hook::flags(flags.clone()));
    let mut pack = Hooks::new();
    pack.insert("flags", Hook::flags(flags));

    StructCodec::new(layout, arch.endian, unpack, pack)
        .map(|c| c.named("section header"))
}

/// All the codecs one file needs, built once for its arch.
#[derive(Debug, Clone)]
pub struct Codecs {
    pub arch:     Arch,
    pub ident:    StructCodec,
    pub header:   StructCodec,
    pub segment:  StructCodec,
    pub section:  StructCodec,
}

impl Codecs {
    pub fn new(arch: Arch) -> ElfResult<Codecs> {
        Ok(Codecs {
            arch:     arch,
            ident:    ident_codec()?,
            header:   file_header_codec(arch)?,
            segment:  segment_header_codec(arch)?,
            section:  section_header_codec(arch)?,
        })
    }
}
