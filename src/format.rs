// Tools for manipulating ELF files
// Copyright (C) 2015-present Alex Iadicicco <http://ajitek.net>

//! Constants and enumerations copied out of the ELF format manual (and the
//! GNU and Solaris extensions to it). Every enumeration implements
//! `Enumeration`, which is how the record codec turns raw integers into
//! names. Values missing from these tables are not errors; they surface as
//! `Resolved::Raw`.

use std::fmt;

/// Magic number
pub const ELFMAG: &[u8; 4] = b"\x7fELF";

/// Size of `e_ident[]`
pub const EI_NIDENT: usize = 16;

/// Version of the format
pub const EV_CURRENT: u8 = 1;

/// Granularity segment payloads are padded to when a file is written.
pub const FILE_ALIGN: usize = 8;

/// A closed vocabulary of numeric values, as found in the ELF manual.
pub trait Enumeration: Copy + Sized + 'static {
    /// Short name of the vocabulary, used in log messages.
    const KIND: &'static str;

    fn from_raw(raw: u64) -> Option<Self>;
    fn raw(self) -> u64;
    fn name(self) -> &'static str;
}

/// Name of `raw` in vocabulary `E`, if it has one.
pub fn lookup<E: Enumeration>(raw: u64) -> Option<&'static str> {
    E::from_raw(raw).map(E::name)
}

/// An enumeration field read from a file: either a value the vocabulary
/// knows, or the raw number copied literally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolved<E> {
    Known(E),
    Raw(u64),
}

impl<E: Enumeration> Resolved<E> {
    pub fn from_raw(raw: u64) -> Resolved<E> {
        match E::from_raw(raw) {
            Some(e) => Resolved::Known(e),
            None => Resolved::Raw(raw),
        }
    }

    pub fn raw(self) -> u64 {
        match self {
            Resolved::Known(e) => e.raw(),
            Resolved::Raw(raw) => raw,
        }
    }

    pub fn known(self) -> Option<E> {
        match self {
            Resolved::Known(e) => Some(e),
            Resolved::Raw(_) => None,
        }
    }
}

impl<E: Enumeration> fmt::Display for Resolved<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Resolved::Known(e) => f.write_str(e.name()),
            Resolved::Raw(raw) => write!(f, "{:#x}", raw),
        }
    }
}

macro_rules! elf_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $kind:literal {
            $( #[doc=$doc:literal] $variant:ident = $value:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( #[doc=$doc] $variant, )*
        }

        impl Enumeration for $name {
            const KIND: &'static str = $kind;

            fn from_raw(raw: u64) -> Option<$name> {
                match raw {
                    $( $value => Some($name::$variant), )*
                    _ => None,
                }
            }

            fn raw(self) -> u64 {
                match self {
                    $( $name::$variant => $value, )*
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant), )*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    }
}

elf_enum! {
    /// File class, `e_ident[EI_CLASS]`
    pub enum Class : "class" {
        #[doc="32-bit objects"]           Bit32        = 1,
        #[doc="64-bit objects"]           Bit64        = 2,
    }
}

elf_enum! {
    /// Data encoding, `e_ident[EI_DATA]`
    pub enum DataEncoding : "byte order" {
        #[doc="Little-endian"]            Little       = 1,
        #[doc="Big-endian"]               Big          = 2,
    }
}

elf_enum! {
    /// Operating system ABI, `e_ident[EI_OSABI]`
    pub enum OsAbi : "OS ABI" {
        #[doc="UNIX System V"]            SystemV      = 0x00,
        #[doc="HP-UX"]                    HpUx         = 0x01,
        #[doc="NetBSD"]                   NetBsd       = 0x02,
        #[doc="Linux"]                    Linux        = 0x03,
        #[doc="GNU Hurd"]                 GnuHurd      = 0x04,
        #[doc="Solaris"]                  Solaris      = 0x06,
        #[doc="AIX"]                      Aix          = 0x07,
        #[doc="IRIX"]                     Irix         = 0x08,
        #[doc="FreeBSD"]                  FreeBsd      = 0x09,
        #[doc="Tru64"]                    Tru64        = 0x0a,
        #[doc="Novell Modesto"]           Modesto      = 0x0b,
        #[doc="OpenBSD"]                  OpenBsd      = 0x0c,
        #[doc="OpenVMS"]                  OpenVms      = 0x0d,
        #[doc="NonStop Kernel"]           NonStop      = 0x0e,
        #[doc="AROS"]                     Aros         = 0x0f,
        #[doc="FenixOS"]                  FenixOs      = 0x10,
        #[doc="CloudABI"]                 CloudAbi     = 0x11,
        #[doc="Stratus OpenVOS"]          OpenVos      = 0x12,
    }
}

elf_enum! {
    /// Object file type, `e_type`
    pub enum ObjectType : "object type" {
        #[doc="No file type"]             None         = 0,
        #[doc="Relocatable file"]         Relocatable  = 1,
        #[doc="Executable file"]          Executable   = 2,
        #[doc="Shared object file"]       Shared       = 3,
        #[doc="Core file"]                Core         = 4,
    }
}

elf_enum! {
    /// Target architecture, `e_machine`
    pub enum Machine : "machine" {
        #[doc="No machine"]               None         = 0x00,
        #[doc="AT&T WE 32100"]            We32100      = 0x01,
        #[doc="SPARC"]                    Sparc        = 0x02,
        #[doc="Intel 80386"]              X86          = 0x03,
        #[doc="Motorola 68000"]           M68k         = 0x04,
        #[doc="Motorola 88000"]           M88k         = 0x05,
        #[doc="Intel 80860"]              I860         = 0x07,
        #[doc="MIPS RS3000"]              Mips         = 0x08,
        #[doc="PowerPC"]                  PowerPc      = 0x14,
        #[doc="IBM S/390"]                S390         = 0x16,
        #[doc="ARM (up to ARMv7)"]        Arm          = 0x28,
        #[doc="Hitachi SuperH"]           SuperH       = 0x2a,
        #[doc="Intel IA-64"]              Ia64         = 0x32,
        #[doc="AMD x86-64"]               Amd64        = 0x3e,
        #[doc="ARM 64-bit"]               AArch64      = 0xb7,
        #[doc="RISC-V"]                   RiscV        = 0xf3,
    }
}

elf_enum! {
    /// Program header type, `p_type`
    pub enum SegmentType : "segment type" {
        #[doc="Unused entry"]             Null         = 0,
        #[doc="Loadable segment"]         Load         = 1,
        #[doc="Dynamic linking info"]     Dynamic      = 2,
        #[doc="Interpreter path"]         Interp       = 3,
        #[doc="Auxiliary information"]    Note         = 4,
        #[doc="Reserved"]                 ShLib        = 5,
        #[doc="Program header table"]     ProgramHeader = 6,
        #[doc="Thread-local storage"]     Tls          = 7,
        #[doc="GCC .eh_frame_hdr"]        GnuEhFrame   = 0x6474_e550,
        #[doc="Stack executability"]      GnuStack     = 0x6474_e551,
        #[doc="Read-only after reloc"]    GnuRelro     = 0x6474_e552,
        #[doc="GNU property notes"]       GnuProperty  = 0x6474_e553,
    }
}

elf_enum! {
    /// Section header type, `sh_type`
    pub enum SectionType : "section type" {
        #[doc="Inactive header"]          Null         = 0,
        #[doc="Program-defined data"]     ProgBits     = 1,
        #[doc="Symbol table"]             SymTab       = 2,
        #[doc="String table"]             StrTab       = 3,
        #[doc="Relocations with addends"] Rela         = 4,
        #[doc="Symbol hash table"]        Hash         = 5,
        #[doc="Dynamic linking info"]     Dynamic      = 6,
        #[doc="Notes"]                    Note         = 7,
        #[doc="Occupies no file space"]   NoBits       = 8,
        #[doc="Relocations"]              Rel          = 9,
        #[doc="Reserved"]                 ShLib        = 0x0a,
        #[doc="Dynamic symbol table"]     DynSym       = 0x0b,
        #[doc="Constructors"]             InitArray    = 0x0e,
        #[doc="Destructors"]              FiniArray    = 0x0f,
        #[doc="Pre-constructors"]         PreinitArray = 0x10,
        #[doc="Section group"]            Group        = 0x11,
        #[doc="Extended section indices"] SymTabShndx  = 0x12,
        #[doc="Number of defined types"]  Num          = 0x13,
        #[doc="Capability chain"]         CapChain     = 0x6fff_ffef,
        #[doc="Capability info"]          CapInfo      = 0x6fff_fff0,
        #[doc="Symbol sort"]              SymSort      = 0x6fff_fff1,
        #[doc="TLS symbol sort"]          TlsSort      = 0x6fff_fff2,
        #[doc="Local dynamic symbols"]    LdDynSym     = 0x6fff_fff3,
        #[doc="DTrace object format"]     Dof          = 0x6fff_fff4,
        #[doc="Capabilities"]             Cap          = 0x6fff_fff5,
        #[doc="Signature"]                Signature    = 0x6fff_fff6,
        #[doc="Annotations"]              Annotate     = 0x6fff_fff7,
        #[doc="Debug strings"]            DebugStr     = 0x6fff_fff8,
        #[doc="Debug info"]               Debug        = 0x6fff_fff9,
        #[doc="Move table"]               Move         = 0x6fff_fffa,
        #[doc="COMDAT"]                   ComDat       = 0x6fff_fffb,
        #[doc="Symbol info"]              SymInfo      = 0x6fff_fffc,
        #[doc="Version definitions"]      VerDef       = 0x6fff_fffd,
        #[doc="Version needs"]            VerNeed      = 0x6fff_fffe,
        #[doc="Version symbols"]          VerSym       = 0x6fff_ffff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_raw() {
        assert_eq!(Resolved::<SegmentType>::from_raw(1), Resolved::Known(SegmentType::Load));
        assert_eq!(Resolved::<SegmentType>::from_raw(0x1234_5678), Resolved::Raw(0x1234_5678));
        assert_eq!(Resolved::<SegmentType>::from_raw(0x6474_e551).raw(), 0x6474_e551);
        assert_eq!(lookup::<Machine>(0x3e), Some("Amd64"));
        assert_eq!(lookup::<Machine>(0x9999), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Resolved::Known(SectionType::NoBits).to_string(), "NoBits");
        assert_eq!(Resolved::<SectionType>::Raw(0x99).to_string(), "0x99");
        assert_eq!(ObjectType::Shared.to_string(), "Shared");
    }
}
