//! Section header decoding.

use crate::ehdr::ElfClass;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

pub const SHDR_SIZE_32: u64 = 40;
pub const SHDR_SIZE_64: u64 = 64;

/// A section header record, normalized to 64-bit field widths.
///
/// Transient: consumed during the single parsing pass to decide which
/// tables to load, not retained in the model afterwards.
#[derive(Clone, Debug)]
pub struct Shdr {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    pub sh_entsize: u64,
}

impl Shdr {
    /// Decodes one section header record in little-endian order.
    pub fn read_from<R: Read>(r: &mut R, class: ElfClass) -> io::Result<Self> {
        let sh_name = r.read_u32::<LittleEndian>()?;
        let sh_type = r.read_u32::<LittleEndian>()?;
        if class.is_64() {
            Ok(Self {
                sh_name,
                sh_type,
                sh_flags: r.read_u64::<LittleEndian>()?,
                sh_addr: r.read_u64::<LittleEndian>()?,
                sh_offset: r.read_u64::<LittleEndian>()?,
                sh_size: r.read_u64::<LittleEndian>()?,
                sh_link: r.read_u32::<LittleEndian>()?,
                sh_info: r.read_u32::<LittleEndian>()?,
                sh_addralign: r.read_u64::<LittleEndian>()?,
                sh_entsize: r.read_u64::<LittleEndian>()?,
            })
        } else {
            Ok(Self {
                sh_name,
                sh_type,
                sh_flags: r.read_u32::<LittleEndian>()? as u64,
                sh_addr: r.read_u32::<LittleEndian>()? as u64,
                sh_offset: r.read_u32::<LittleEndian>()? as u64,
                sh_size: r.read_u32::<LittleEndian>()? as u64,
                sh_link: r.read_u32::<LittleEndian>()?,
                sh_info: r.read_u32::<LittleEndian>()?,
                sh_addralign: r.read_u32::<LittleEndian>()? as u64,
                sh_entsize: r.read_u32::<LittleEndian>()? as u64,
            })
        }
    }
}
