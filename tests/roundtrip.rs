// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

use std::env;
use std::fs;
use std::io::Cursor;
use std::process;

use elfsplice::dump::{extract_segments, Dumpable};
use elfsplice::format::{Machine, ObjectType, Resolved, SegmentType, ELFMAG, EV_CURRENT};
use elfsplice::record::Value;
use elfsplice::{ElfError, ElfFile};

/// Hand assembles small ELF images.
struct Image {
    wide:      bool,
    big:       bool,
    segments:  Vec<(u32, u32, u64, Vec<u8>)>,      // type, flags, vaddr, contents
    sections:  usize,
}

impl Image {
    fn new(wide: bool, big: bool) -> Image {
        Image { wide: wide, big: big, segments: Vec::new(), sections: 0 }
    }

    fn segment(mut self, typ: u32, flags: u32, vaddr: u64, content: &[u8]) -> Image {
        self.segments.push((typ, flags, vaddr, content.to_vec()));
        self
    }

    fn sections(mut self, n: usize) -> Image {
        self.sections = n;
        self
    }

    fn put(&self, out: &mut Vec<u8>, v: u64, width: usize) {
        let bytes = v.to_be_bytes();
        let mut field = bytes[8 - width..].to_vec();
        if !self.big {
            field.reverse();
        }
        out.extend(field);
    }

    fn word(&self, out: &mut Vec<u8>, v: u64) {
        self.put(out, v, if self.wide { 8 } else { 4 });
    }

    fn build(&self) -> Vec<u8> {
        let (ehsize, phentsize, shentsize) = if self.wide { (64, 56, 64) } else { (52, 32, 40) };
        let phoff = ehsize;
        let mut data_at = phoff + self.segments.len() as u64 * phentsize;
        // contents are placed out of table order, with gaps, to check
        // that reading follows the offsets
        let mut placed = Vec::new();
        for seg in self.segments.iter().rev() {
            placed.push(data_at + 3);
            data_at += 3 + seg.3.len() as u64;
        }
        placed.reverse();
        let shoff = data_at;

        let mut out = Vec::new();
        out.extend_from_slice(ELFMAG);
        out.push(if self.wide { 2 } else { 1 });
        out.push(if self.big { 2 } else { 1 });
        out.extend_from_slice(&[EV_CURRENT, 3, 0, 0, 0, 0, 0, 0, 0, 0]);

        self.put(&mut out, 2, 2);                           // ET_EXEC
        self.put(&mut out, if self.wide { 0x3e } else { 0x08 }, 2);
        self.put(&mut out, EV_CURRENT as u64, 4);
        self.word(&mut out, 0x40_1000);
        self.word(&mut out, phoff);
        self.word(&mut out, if self.sections > 0 { shoff } else { 0 });
        self.put(&mut out, 0, 4);
        self.put(&mut out, ehsize, 2);
        self.put(&mut out, phentsize, 2);
        self.put(&mut out, self.segments.len() as u64, 2);
        self.put(&mut out, shentsize, 2);
        self.put(&mut out, self.sections as u64, 2);
        self.put(&mut out, 0, 2);
        assert_eq!(out.len() as u64, ehsize);

        for (seg, &offset) in self.segments.iter().zip(&placed) {
            let (typ, flags, vaddr, ref content) = *seg;
            let len = content.len() as u64;
            self.put(&mut out, typ as u64, 4);
            if self.wide {
                self.put(&mut out, flags as u64, 4);
            }
            self.word(&mut out, offset);
            self.word(&mut out, vaddr);
            self.word(&mut out, vaddr + 0x1000);
            self.word(&mut out, len);
            self.word(&mut out, len + 0x20);
            if !self.wide {
                self.put(&mut out, flags as u64, 4);
            }
            self.word(&mut out, 0x1000);
        }

        let mut by_offset: Vec<_> = self.segments.iter().zip(&placed).collect();
        by_offset.sort_by_key(|&(_, &off)| off);
        for (seg, &offset) in by_offset {
            out.resize(offset as usize, 0xee);
            out.extend_from_slice(&seg.3);
        }
        assert_eq!(out.len() as u64, shoff);

        for i in 0..self.sections {
            self.put(&mut out, i as u64, 4);                // name offset
            self.put(&mut out, 1, 4);                       // SHT_PROGBITS
            self.word(&mut out, 0x6);                       // Alloc | ExecInstr
            self.word(&mut out, 0x40_1000);
            self.word(&mut out, 0x100);
            self.word(&mut out, 0x10);
            self.put(&mut out, 0, 4);
            self.put(&mut out, 0, 4);
            self.word(&mut out, 16);
            self.word(&mut out, 0);
        }

        out
    }
}

fn load(bytes: Vec<u8>) -> Result<ElfFile, ElfError> {
    ElfFile::load(&mut Cursor::new(bytes))
}

fn sample(wide: bool, big: bool) -> Vec<u8> {
    Image::new(wide, big)
        .segment(6, 0x4, 0x40_0040, &[0x11; 24])
        .segment(1, 0x5, 0x40_0000, b"\x7fcode goes here")
        .segment(1, 0x6, 0x60_0000, &[0x22; 40])
        .segment(0x6474_e551, 0x6, 0, &[])
        .sections(3)
        .build()
}

#[test]
fn test_read_all_variants() {
    for &(wide, big) in &[(false, false), (false, true), (true, false), (true, true)] {
        let f = load(sample(wide, big)).unwrap();

        assert_eq!(f.arch().width.bits(), if wide { 64 } else { 32 });
        assert_eq!(f.object_type().unwrap(), Resolved::Known(ObjectType::Executable));
        assert_eq!(f.entry().unwrap(), Some(0x40_1000));
        assert_eq!(f.segments().len(), 4);
        assert_eq!(f.sections().len(), 3);

        let code = f.segments().get(1).unwrap();
        assert_eq!(code.segment_type().unwrap(), Resolved::Known(SegmentType::Load));
        assert_eq!(code.content(), b"\x7fcode goes here");
        assert_eq!(code.vaddr().unwrap(), 0x40_0000);
        assert_eq!(code.paddr().unwrap(), 0x40_1000);
        assert_eq!(code.memsize().unwrap(), 15 + 0x20);
        assert_eq!(code.abbreviated_flags('-').unwrap(), "R-X");

        let stack = f.segments().get(3).unwrap();
        assert_eq!(stack.segment_type().unwrap(), Resolved::Known(SegmentType::GnuStack));
        assert!(stack.is_empty());

        let sect = &f.sections()[2];
        assert_eq!(sect.int("name_offset").unwrap(), 2);
        assert!(sect.flags("flags").unwrap().contains("ExecInstr"));
    }
}

#[test]
fn test_round_trip() {
    for &(wide, big) in &[(false, false), (false, true), (true, false), (true, true)] {
        let original = load(sample(wide, big)).unwrap();
        let bytes = original.to_bytes().unwrap();
        let again = load(bytes.clone()).unwrap();

        assert_eq!(again.ident(), original.ident());
        assert_eq!(again.machine().unwrap(), original.machine().unwrap());
        assert_eq!(again.segments().len(), original.segments().len());
        assert!(again.sections().is_empty());
        assert_eq!(again.header().int("shoff").unwrap(), 0);

        let phoff = again.header().int("phoff").unwrap();
        let offsets = again.segments().offsets(phoff);
        for ((a, b), offset) in again.segments().iter().zip(original.segments()).zip(offsets) {
            assert_eq!(a.header().with("offset", 0u64), b.header().with("offset", 0u64));
            assert_eq!(a.content(), b.content());
            assert_eq!(a.offset().unwrap(), offset);
        }

        // already laid out, so a second pass changes nothing
        assert_eq!(again.to_bytes().unwrap(), bytes);
    }
}

#[test]
fn test_minimal_file_layout() {
    let f = load(Image::new(true, false).segment(1, 0x5, 0x1000, &[9; 10]).build()).unwrap();
    let seg = f.segments().get(0).unwrap();
    assert_eq!(seg.aligned_size(), 16);
    assert_eq!(seg.padding_size(), 6);

    let out = f.to_bytes().unwrap();
    assert_eq!(out.len(), 64 + 56 + 16);
    assert_eq!(u64::from_le_bytes(out[32..40].try_into().unwrap()), 16 + 48);    // e_phoff
    assert_eq!(u16::from_le_bytes(out[56..58].try_into().unwrap()), 1);          // e_phnum
    assert_eq!(u64::from_le_bytes(out[64 + 8..64 + 16].try_into().unwrap()), 64 + 56);
    assert_eq!(&out[64 + 56..64 + 66], &[9; 10]);
    assert_eq!(&out[64 + 66..], &[0; 6]);
}

#[test]
fn test_truncated_payload() {
    let mut bytes = Image::new(true, false).segment(1, 0x4, 0, &[1; 100]).build();
    bytes.truncate(bytes.len() - 50);

    match load(bytes) {
        Err(ElfError::Truncated { what, expected, actual, .. }) => {
            assert_eq!(what, "segment contents");
            assert_eq!((expected, actual), (100, 50));
        },
        other => panic!("expected truncation, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_truncated_header() {
    let bytes = sample(true, true);
    match load(bytes[..40].to_vec()) {
        Err(ElfError::Truncated { what, .. }) => assert_eq!(what, "file header"),
        other => panic!("expected truncation, got {:?}", other.map(|_| ())),
    }
    match load(bytes[..64 + 20].to_vec()) {
        Err(ElfError::Truncated { what, offset, .. }) => {
            assert_eq!(what, "segment header");
            assert_eq!(offset, 64);
        },
        other => panic!("expected truncation, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_not_an_elf_file() {
    let mut bytes = sample(false, false);
    bytes[1] = b'X';
    match load(bytes) {
        Err(ElfError::BadMagic(_)) => {},
        other => panic!("expected bad magic, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unknown_values_survive() {
    let mut bytes = Image::new(true, false).segment(0x1234_5678, 0xf000_0007, 0, &[1, 2, 3]).build();
    bytes[18] = 0x34;                                   // e_machine = 0x1234
    bytes[19] = 0x12;

    let f = load(bytes).unwrap();
    assert_eq!(f.machine().unwrap(), Resolved::<Machine>::Raw(0x1234));

    let seg = f.segments().get(0).unwrap();
    assert_eq!(seg.segment_type().unwrap(), Resolved::Raw(0x1234_5678));
    assert_eq!(seg.header().get("segment_type"), Some(&Value::Unresolved(0x1234_5678)));
    assert_eq!(seg.flags().unwrap().additional(), 0xf000_0000);
    assert_eq!(seg.abbreviated_flags(' ').unwrap(), "RWX");

    let again = load(f.to_bytes().unwrap()).unwrap();
    assert_eq!(again.machine().unwrap(), Resolved::Raw(0x1234));
    assert_eq!(again.segments().get(0).unwrap().flags().unwrap(), seg.flags().unwrap());
}

#[test]
fn test_edit_then_save() {
    let mut f = load(sample(true, false)).unwrap();
    f.segments_mut().remove(0);
    {
        let seg = f.segments_mut().get_mut(0).unwrap();
        seg.set_content(vec![0xc3; 5]);
        seg.set_field("vaddr", 0x50_0000u64).unwrap();
    }
    f.header_mut().set("entry", 0x50_0000u64);

    let again = load(f.to_bytes().unwrap()).unwrap();
    assert_eq!(again.segments().len(), 3);
    assert_eq!(again.entry().unwrap(), Some(0x50_0000));
    let seg = again.segments().get(0).unwrap();
    assert_eq!(seg.content(), &[0xc3; 5]);
    assert_eq!(seg.vaddr().unwrap(), 0x50_0000);
}

#[test]
fn test_files_on_disk() {
    let dir = env::temp_dir().join(format!("elfsplice-test-{}", process::id()));
    fs::create_dir_all(&dir).unwrap();
    let input = dir.join("in.elf");
    let output = dir.join("out.elf");
    fs::write(&input, sample(false, true)).unwrap();

    let f = ElfFile::read(&input).unwrap();
    f.write(&output).unwrap();
    let again = ElfFile::read(&output).unwrap();
    assert_eq!(again.segments().len(), 4);

    let written = extract_segments(&again, &dir).unwrap();
    assert_eq!(written.len(), 4);
    assert_eq!(fs::read(&written[1]).unwrap(), b"\x7fcode goes here");
    assert!(written[3].ends_with("segment_003.bin"));

    let mut listing = Vec::new();
    again.dump(&mut listing).unwrap();
    let listing = String::from_utf8(listing).unwrap();
    assert!(listing.starts_with("ELF class Bit32, byteorder Big, version 1, OS ABI Linux v0."));
    assert!(listing.contains("Machine Mips, type Executable, 4 segments, 0 sections."));
    assert!(listing.contains(" 1: Load"));

    fs::remove_dir_all(&dir).unwrap();
}
