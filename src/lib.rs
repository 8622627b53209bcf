// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! This crate reads ELF files into editable structures and writes them back
//! out again.
//!
//! # Record codec
//! Underneath everything is a small toolkit for fixed-size binary records:
//! a `layout::Layout` lists the fields of a record, and a
//! `codec::StructCodec` packs and unpacks `record::Record`s of that layout in
//! a given byte order. Per-field hooks turn raw integers into enumerants
//! (`format`) or sets of named flags (`flags`).
//!
//! # ELF library
//! The `layouts` module describes the ELF headers with that toolkit, for
//! both classes and both byte orders. `elf::ElfFile` loads a whole file:
//! headers, segments with their contents, and section headers. Saving
//! lays the segments out again after the file header (see `segment`) and
//! drops the section header table.
//!
//! # Dumping
//! `dump` prints files in a readable form and can save segment contents to
//! separate files. The `elfdump` binary is a thin wrapper around it.

pub mod error;
pub mod format;
pub mod layout;
pub mod record;
pub mod flags;
pub mod codec;
pub mod layouts;
pub mod segment;
pub mod elf;
pub mod dump;

pub use crate::elf::ElfFile;
pub use crate::error::{ElfError, ElfResult};
