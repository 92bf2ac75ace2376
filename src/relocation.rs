//! Relocation entry codecs.
//!
//! Both entry shapes are held with 64-bit field widths in memory; the
//! on-disk width used for decode and re-encode follows the image class.
//! Each stored entry is paired with the absolute file offset of its first
//! on-disk byte so the shuffler can rewrite it in place later.

use crate::ehdr::ElfClass;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use std::mem;

pub const REL_SIZE_32: u64 = 8;
pub const REL_SIZE_64: u64 = 16;
pub const RELA_SIZE_32: u64 = 12;
pub const RELA_SIZE_64: u64 = 24;

/// A relocation entry without an addend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rel {
    pub r_offset: u64,
    pub r_info: u64,
}

/// A relocation entry with an addend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rela {
    pub r_offset: u64,
    pub r_info: u64,
    pub r_addend: i64,
}

/// A decoded relocation entry together with the absolute file offset it
/// was read from.
///
/// `file_off` points at the first byte of the exact on-disk record and is
/// what the shuffler seeks to when writing the entry back.
#[derive(Clone, Copy, Debug)]
pub struct RelocSlot<T> {
    pub file_off: u64,
    pub entry: T,
}

/// Operations shared by the two relocation entry shapes.
///
/// The random pick-and-exchange logic is written once against this trait
/// instead of being duplicated per shape.
pub trait RelocEntry: Copy {
    /// Decodes one entry at the on-disk width selected by `class`.
    fn read_from<R: Read>(r: &mut R, class: ElfClass) -> io::Result<Self>;

    /// Encodes this entry at the on-disk width selected by `class`.
    fn write_to<W: Write>(&self, w: &mut W, class: ElfClass) -> io::Result<()>;

    /// Exchanges the position-dependent fields between two entries.
    ///
    /// `r_info` stays on its original entry: the mutation changes what gets
    /// patched, never which symbol and type govern the patch.
    fn swap_placement(a: &mut Self, b: &mut Self);
}

impl RelocEntry for Rel {
    fn read_from<R: Read>(r: &mut R, class: ElfClass) -> io::Result<Self> {
        if class.is_64() {
            Ok(Self {
                r_offset: r.read_u64::<LittleEndian>()?,
                r_info: r.read_u64::<LittleEndian>()?,
            })
        } else {
            Ok(Self {
                r_offset: r.read_u32::<LittleEndian>()? as u64,
                r_info: r.read_u32::<LittleEndian>()? as u64,
            })
        }
    }

    fn write_to<W: Write>(&self, w: &mut W, class: ElfClass) -> io::Result<()> {
        if class.is_64() {
            w.write_u64::<LittleEndian>(self.r_offset)?;
            w.write_u64::<LittleEndian>(self.r_info)?;
        } else {
            w.write_u32::<LittleEndian>(self.r_offset as u32)?;
            w.write_u32::<LittleEndian>(self.r_info as u32)?;
        }
        Ok(())
    }

    fn swap_placement(a: &mut Self, b: &mut Self) {
        mem::swap(&mut a.r_offset, &mut b.r_offset);
    }
}

impl RelocEntry for Rela {
    fn read_from<R: Read>(r: &mut R, class: ElfClass) -> io::Result<Self> {
        if class.is_64() {
            Ok(Self {
                r_offset: r.read_u64::<LittleEndian>()?,
                r_info: r.read_u64::<LittleEndian>()?,
                r_addend: r.read_i64::<LittleEndian>()?,
            })
        } else {
            Ok(Self {
                r_offset: r.read_u32::<LittleEndian>()? as u64,
                r_info: r.read_u32::<LittleEndian>()? as u64,
                r_addend: r.read_i32::<LittleEndian>()? as i64,
            })
        }
    }

    fn write_to<W: Write>(&self, w: &mut W, class: ElfClass) -> io::Result<()> {
        if class.is_64() {
            w.write_u64::<LittleEndian>(self.r_offset)?;
            w.write_u64::<LittleEndian>(self.r_info)?;
            w.write_i64::<LittleEndian>(self.r_addend)?;
        } else {
            w.write_u32::<LittleEndian>(self.r_offset as u32)?;
            w.write_u32::<LittleEndian>(self.r_info as u32)?;
            w.write_i32::<LittleEndian>(self.r_addend as i32)?;
        }
        Ok(())
    }

    fn swap_placement(a: &mut Self, b: &mut Self) {
        mem::swap(&mut a.r_offset, &mut b.r_offset);
        mem::swap(&mut a.r_addend, &mut b.r_addend);
    }
}
