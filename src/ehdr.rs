//! ELF header decoding and class selection.
//!
//! The class (32-bit vs 64-bit) is decided once from the identification
//! bytes, before anything else is decoded, and governs the on-disk width of
//! every structure in the image from then on.

use crate::error::{parse_ehdr_error, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use elf::abi::{EI_CLASS, EI_DATA, ELFCLASS32, ELFCLASS64, ELFDATA2LSB, ELFMAGIC};
use std::io::{self, Read};

/// Size of the `e_ident` identification block.
pub const EI_NIDENT: usize = 16;

pub const EHDR_SIZE_32: u64 = 52;
pub const EHDR_SIZE_64: u64 = 64;

/// The file class of a parsed image.
///
/// Selected once from `e_ident` and fixed for the lifetime of the model.
/// All width-dependent decisions (record sizes, the `r_info` bit split)
/// hang off this type so 32- and 64-bit layouts can never be mixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElfClass {
    Elf32,
    Elf64,
}

impl ElfClass {
    /// Classifies an image from its identification bytes.
    ///
    /// Verifies the magic signature, requires little-endian data encoding,
    /// and maps the class byte to one of the two supported widths. Anything
    /// else is fatal.
    pub fn from_ident(ident: &[u8; EI_NIDENT]) -> Result<Self> {
        if ident[0..4] != ELFMAGIC {
            return Err(parse_ehdr_error("invalid ELF magic"));
        }
        let class = match ident[EI_CLASS] {
            ELFCLASS32 => ElfClass::Elf32,
            ELFCLASS64 => ElfClass::Elf64,
            other => {
                return Err(parse_ehdr_error(format!(
                    "unrecognized ELF class {other:#04x}"
                )));
            }
        };
        if ident[EI_DATA] != ELFDATA2LSB {
            return Err(parse_ehdr_error("unsupported data encoding, expected LSB"));
        }
        Ok(class)
    }

    #[inline]
    pub fn is_64(self) -> bool {
        matches!(self, ElfClass::Elf64)
    }

    /// Extracts the symbol-index component of a relocation `r_info` value.
    ///
    /// The split depends on the width of the entry the value was decoded
    /// from: the low 8 bits are the type for ELF32, the low 32 bits for
    /// ELF64, and the remaining high bits are the symbol index.
    #[inline]
    pub fn r_sym(self, r_info: u64) -> u64 {
        match self {
            ElfClass::Elf32 => r_info >> 8,
            ElfClass::Elf64 => r_info >> 32,
        }
    }

    /// Extracts the relocation-type component of a relocation `r_info` value.
    #[inline]
    pub fn r_type(self, r_info: u64) -> u64 {
        match self {
            ElfClass::Elf32 => r_info & 0xff,
            ElfClass::Elf64 => r_info & 0xffff_ffff,
        }
    }
}

/// The fixed-layout ELF file header, normalized to 64-bit field widths.
///
/// Read once at offset 0; the parser only consumes the section header table
/// geometry (`e_shoff`, `e_shentsize`, `e_shnum`, `e_shstrndx`) afterwards.
#[derive(Clone, Debug)]
pub struct Ehdr {
    pub e_ident: [u8; EI_NIDENT],
    pub e_type: u16,
    pub e_machine: u16,
    pub e_version: u32,
    pub e_entry: u64,
    pub e_phoff: u64,
    pub e_shoff: u64,
    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

impl Ehdr {
    /// Decodes the header field by field in little-endian order.
    ///
    /// The reader must be positioned at the start of the image. A short
    /// read surfaces as `ErrorKind::UnexpectedEof`.
    pub fn read_from<R: Read>(r: &mut R, class: ElfClass) -> io::Result<Self> {
        let mut e_ident = [0u8; EI_NIDENT];
        r.read_exact(&mut e_ident)?;
        let e_type = r.read_u16::<LittleEndian>()?;
        let e_machine = r.read_u16::<LittleEndian>()?;
        let e_version = r.read_u32::<LittleEndian>()?;
        let (e_entry, e_phoff, e_shoff) = if class.is_64() {
            (
                r.read_u64::<LittleEndian>()?,
                r.read_u64::<LittleEndian>()?,
                r.read_u64::<LittleEndian>()?,
            )
        } else {
            (
                r.read_u32::<LittleEndian>()? as u64,
                r.read_u32::<LittleEndian>()? as u64,
                r.read_u32::<LittleEndian>()? as u64,
            )
        };
        let e_flags = r.read_u32::<LittleEndian>()?;
        let e_ehsize = r.read_u16::<LittleEndian>()?;
        let e_phentsize = r.read_u16::<LittleEndian>()?;
        let e_phnum = r.read_u16::<LittleEndian>()?;
        let e_shentsize = r.read_u16::<LittleEndian>()?;
        let e_shnum = r.read_u16::<LittleEndian>()?;
        let e_shstrndx = r.read_u16::<LittleEndian>()?;
        Ok(Self {
            e_ident,
            e_type,
            e_machine,
            e_version,
            e_entry,
            e_phoff,
            e_shoff,
            e_flags,
            e_ehsize,
            e_phentsize,
            e_phnum,
            e_shentsize,
            e_shnum,
            e_shstrndx,
        })
    }
}
