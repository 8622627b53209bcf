// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! Human readable listings of files and segments, and a helper to save each
//! segment's contents to its own file. Everything in here goes through the
//! public accessors of `ElfFile` and `Segment`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::elf::ElfFile;
use crate::error::{ElfError, ElfResult};
use crate::format::{Class, DataEncoding};
use crate::segment::Segment;

pub trait Dumpable {
    fn dump<W: Write>(&self, w: &mut W) -> ElfResult<()>;
}

/// Glyph printed in place of flags that are not set.
pub const DEFAULT_ABSENT_GLYPH: char = ' ';

impl Segment {
    /// One line summary: type, flags, addresses and sizes. Physical address,
    /// file size and alignment are only shown when they say something.
    pub fn describe(&self, absent: char) -> ElfResult<String> {
        let vaddr = self.vaddr()?;
        let paddr = self.paddr()?;
        let memsize = self.memsize()?;
        let filesize = self.filesize()?;
        let align = self.align()?;

        let mut parts = vec![
            format!("{:<13}", self.segment_type()?.to_string()),
            self.abbreviated_flags(absent)?,
            format!("{:<#10x}", vaddr),
        ];
        if paddr != vaddr {
            parts.push(format!("phys {:<#10x}", paddr));
        }
        parts.push(format!("length {:<#8x}", memsize));
        parts.push(format!("file offset {:<#6x}", self.offset()?));
        if filesize != memsize {
            parts.push(format!("file size {:<#6x}", filesize));
        }
        if align > 1 {
            parts.push(format!("align {:<#6x}", align));
        }

        Ok(parts.join("   "))
    }
}

impl Dumpable for Segment {
    fn dump<W: Write>(&self, w: &mut W) -> ElfResult<()> {
        writeln!(w, "{}", self.describe(DEFAULT_ABSENT_GLYPH)?)?;
        Ok(())
    }
}

impl ElfFile {
    /// Same as `Dumpable::dump`, with a choice of glyph for absent flags.
    pub fn dump_with<W: Write>(&self, w: &mut W, absent: char) -> ElfResult<()> {
        let ident = self.ident();
        writeln!(w, "ELF class {}, byteorder {}, version {}, OS ABI {} v{}.",
                 ident.resolved::<Class>("ident_class")?,
                 ident.resolved::<DataEncoding>("ident_byteorder")?,
                 ident.int("ident_version")?,
                 self.os_abi()?,
                 ident.int("ident_abiversion")?)?;
        writeln!(w, "Machine {}, type {}, {} segments, {} sections.",
                 self.machine()?,
                 self.object_type()?,
                 self.segments().len(),
                 self.sections().len())?;
        if let Some(entry) = self.entry()? {
            writeln!(w, "Entry point {:#x}.", entry)?;
        }
        writeln!(w)?;

        if !self.segments().is_empty() {
            writeln!(w, "Segments:")?;
            for (i, segment) in self.segments().iter().enumerate() {
                writeln!(w, "{:2}: {}", i, segment.describe(absent)?)?;
            }
            writeln!(w)?;
        }

        if !self.sections().is_empty() {
            writeln!(w, "Sections:")?;
            for (i, section) in self.sections().iter().enumerate() {
                writeln!(w, "{:2}: {}", i, section)?;
            }
            writeln!(w)?;
        }

        Ok(())
    }
}

impl Dumpable for ElfFile {
    fn dump<W: Write>(&self, w: &mut W) -> ElfResult<()> {
        self.dump_with(w, DEFAULT_ABSENT_GLYPH)
    }
}

/// Writes every segment's contents to `dir/segment_NNN.bin`. The directory
/// must already exist. Returns the paths written, in segment order.
pub fn extract_segments<P: AsRef<Path>>(file: &ElfFile, dir: P) -> ElfResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(ElfError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", dir.display()),
        )));
    }

    let mut written = Vec::with_capacity(file.segments().len());
    for (i, segment) in file.segments().iter().enumerate() {
        let path = dir.join(format!("segment_{:03}.bin", i));
        fs::write(&path, segment.content())?;
        written.push(path);
    }

    info!("extracted {} segments into {}", written.len(), dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layouts::segment_flags;
    use crate::record::{Record, Value};

    fn segment(vaddr: u64, paddr: u64, memsize: u64, align: u64) -> Segment {
        let header = Record::from_pairs(vec![
            ("segment_type", Value::Int(0x6474_e551)),
            ("flags", Value::Flags(segment_flags().unwrap().decode(6))),
            ("offset", Value::Int(0x40)),
            ("vaddr", Value::Int(vaddr)),
            ("paddr", Value::Int(paddr)),
            ("filesize", Value::Int(4)),
            ("memsize", Value::Int(memsize)),
            ("align", Value::Int(align)),
        ]);
        Segment::new(header, vec![1, 2, 3, 4]).unwrap()
    }

    #[test]
    fn test_describe_minimal() {
        let line = segment(0x1000, 0x1000, 4, 1).describe(' ').unwrap();
        assert!(line.starts_with("GnuStack     "));
        assert!(line.contains("RW "));
        assert!(line.contains("length 0x4"));
        assert!(line.contains("file offset 0x40"));
        assert!(!line.contains("phys"));
        assert!(!line.contains("file size"));
        assert!(!line.contains("align"));
    }

    #[test]
    fn test_describe_optional_parts() {
        let line = segment(0x1000, 0x2000, 0x10, 0x1000).describe('-').unwrap();
        assert!(line.contains("RW-"));
        assert!(line.contains("phys 0x2000"));
        assert!(line.contains("file size 0x4"));
        assert!(line.contains("align 0x1000"));

        let mut out = Vec::new();
        segment(0, 0, 4, 0).dump(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with('\n'));
    }
}
