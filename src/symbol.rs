//! Dynamic symbol table entries.
//!
//! Only `st_name` feeds the tool's symbol resolution, but the records are
//! decoded in full since the two classes lay the fields out in different
//! orders on disk.

use crate::ehdr::ElfClass;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

pub const SYM_SIZE_32: u64 = 16;
pub const SYM_SIZE_64: u64 = 24;

/// A symbol table record, normalized to 64-bit field widths.
#[derive(Clone, Copy, Debug)]
pub struct Sym {
    pub st_name: u32,
    pub st_value: u64,
    pub st_size: u64,
    pub st_info: u8,
    pub st_other: u8,
    pub st_shndx: u16,
}

impl Sym {
    /// Decodes one symbol record.
    ///
    /// ELF32 orders the fields name/value/size/info/other/shndx, ELF64
    /// orders them name/info/other/shndx/value/size.
    pub fn read_from<R: Read>(r: &mut R, class: ElfClass) -> io::Result<Self> {
        let st_name = r.read_u32::<LittleEndian>()?;
        if class.is_64() {
            let st_info = r.read_u8()?;
            let st_other = r.read_u8()?;
            let st_shndx = r.read_u16::<LittleEndian>()?;
            let st_value = r.read_u64::<LittleEndian>()?;
            let st_size = r.read_u64::<LittleEndian>()?;
            Ok(Self {
                st_name,
                st_value,
                st_size,
                st_info,
                st_other,
                st_shndx,
            })
        } else {
            let st_value = r.read_u32::<LittleEndian>()? as u64;
            let st_size = r.read_u32::<LittleEndian>()? as u64;
            let st_info = r.read_u8()?;
            let st_other = r.read_u8()?;
            let st_shndx = r.read_u16::<LittleEndian>()?;
            Ok(Self {
                st_name,
                st_value,
                st_size,
                st_info,
                st_other,
                st_shndx,
            })
        }
    }
}
