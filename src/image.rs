//! The parsed image model.
//!
//! One pass over an open, seekable input builds the whole model: the header
//! and section header table are decoded, the section-name string table is
//! loaded, and every recognized section is dispatched to its table loader.
//! The model is immutable afterwards; mutation happens only on the separate
//! on-disk output copy, addressed by the file offsets recorded here.

use crate::ehdr::{Ehdr, ElfClass, EI_NIDENT};
use crate::error::{io_error, parse_shdr_error, Result};
use crate::relocation::{Rel, Rela, RelocEntry, RelocSlot};
use crate::shdr::Shdr;
use crate::strtab::StringTable;
use crate::symbol::Sym;
use elf::abi::{SHT_DYNSYM, SHT_REL, SHT_RELA, SHT_STRTAB};
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Relocation section names the loader recognizes.
const RELOC_SECTION_NAMES: [&str; 3] = [".rel.dyn", ".rela.dyn", ".rela.plt"];

/// A parsed view of one ELF image's dynamic relocation data.
pub struct ElfImage {
    class: ElfClass,
    /// Entries without addends, in on-disk order.
    rels: Vec<RelocSlot<Rel>>,
    /// Entries with addends, in on-disk order.
    relas: Vec<RelocSlot<Rela>>,
    symtab: Vec<Sym>,
    dynstr: StringTable,
    shstrtab: StringTable,
}

impl ElfImage {
    /// Parses the image from the start of `input`.
    ///
    /// The class is fixed from the identification bytes before anything
    /// else is decoded. Any short read is fatal; there is no partial-file
    /// recovery path.
    pub fn parse<R: Read + Seek>(input: &mut R) -> Result<Self> {
        seek_to(input, 0)?;
        let mut ident = [0u8; EI_NIDENT];
        input
            .read_exact(&mut ident)
            .map_err(|e| io_error(format!("failed to read ELF identification: {e}")))?;
        let class = ElfClass::from_ident(&ident)?;

        seek_to(input, 0)?;
        let ehdr = Ehdr::read_from(input, class)
            .map_err(|e| io_error(format!("failed to read ELF header: {e}")))?;

        let shstrtab = load_section_name_table(input, &ehdr, class)?;

        // Decode the whole section header table before dispatching; the
        // table loaders below seek freely.
        seek_to(input, ehdr.e_shoff)?;
        let mut shdrs = Vec::with_capacity(ehdr.e_shnum as usize);
        for _ in 0..ehdr.e_shnum {
            let shdr = Shdr::read_from(input, class)
                .map_err(|e| io_error(format!("failed to read section header: {e}")))?;
            shdrs.push(shdr);
        }

        let mut rels = Vec::new();
        let mut relas = Vec::new();
        let mut symtab = Vec::new();
        let mut dynstr = StringTable::empty();
        for shdr in &shdrs {
            let name = match shstrtab.lookup(shdr.sh_name as usize) {
                Some(name) => name,
                None => continue,
            };
            match shdr.sh_type {
                SHT_REL | SHT_RELA if RELOC_SECTION_NAMES.contains(&name) => {
                    if shdr.sh_type == SHT_REL {
                        load_reloc_table(input, shdr, class, &mut rels)?;
                    } else {
                        load_reloc_table(input, shdr, class, &mut relas)?;
                    }
                    log::trace!(
                        "loaded relocation section {name} ({} bytes at {:#x})",
                        shdr.sh_size,
                        shdr.sh_offset
                    );
                }
                SHT_STRTAB if name == ".dynstr" => {
                    dynstr = StringTable::new(read_section_bytes(input, shdr)?);
                }
                SHT_DYNSYM if name == ".dynsym" => {
                    symtab = load_symbol_table(input, shdr, class)?;
                }
                _ => {}
            }
        }

        Ok(Self {
            class,
            rels,
            relas,
            symtab,
            dynstr,
            shstrtab,
        })
    }

    #[inline]
    pub fn class(&self) -> ElfClass {
        self.class
    }

    /// Relocation entries without addends, in on-disk order.
    #[inline]
    pub fn rels(&self) -> &[RelocSlot<Rel>] {
        &self.rels
    }

    /// Relocation entries with addends, in on-disk order.
    #[inline]
    pub fn relas(&self) -> &[RelocSlot<Rela>] {
        &self.relas
    }

    #[inline]
    pub fn symbols(&self) -> &[Sym] {
        &self.symtab
    }

    /// The section-name string table the loader recognized sections with.
    #[inline]
    pub fn section_names(&self) -> &StringTable {
        &self.shstrtab
    }

    /// Resolves the symbol name a relocation's `r_info` refers to.
    ///
    /// Returns `"N/A"` when the symbol index is outside the loaded symbol
    /// table or the name index has no match in the dynamic string table.
    pub fn symbol_name(&self, r_info: u64) -> &str {
        let sym_idx = self.class.r_sym(r_info) as usize;
        self.symtab
            .get(sym_idx)
            .and_then(|sym| self.dynstr.lookup(sym.st_name as usize))
            .unwrap_or("N/A")
    }

    /// Renders the relocation store as a text table.
    ///
    /// One count header, one column legend, and one indexed line per entry
    /// for each non-empty sequence; nothing for an empty one. Read-only.
    pub fn dump<W: Write>(&self, w: &mut W) -> io::Result<()> {
        if !self.rels.is_empty() {
            writeln!(w, "Dynamic relocs ({})", self.rels.len())?;
            writeln!(w, "ELFOffset, RelocOffset, RelocInfo, SymName")?;
            for (i, slot) in self.rels.iter().enumerate() {
                writeln!(
                    w,
                    "  {i}) 0x{:x}, 0x{:x}, 0x{:x}, {}",
                    slot.file_off,
                    slot.entry.r_offset,
                    slot.entry.r_info,
                    self.symbol_name(slot.entry.r_info)
                )?;
            }
        }
        if !self.relas.is_empty() {
            writeln!(w, "Dynamic or PLT relocs with addends ({})", self.relas.len())?;
            writeln!(w, "ELFOffset, RelocOffset, RelocInfo, RelocAddend, SymName")?;
            for (i, slot) in self.relas.iter().enumerate() {
                writeln!(
                    w,
                    "  {i}) 0x{:x}, 0x{:x}, 0x{:x}, 0x{:x}, {}",
                    slot.file_off,
                    slot.entry.r_offset,
                    slot.entry.r_info,
                    slot.entry.r_addend,
                    self.symbol_name(slot.entry.r_info)
                )?;
            }
        }
        Ok(())
    }
}

fn seek_to<S: Seek>(stream: &mut S, pos: u64) -> Result<u64> {
    stream
        .seek(SeekFrom::Start(pos))
        .map_err(|e| io_error(format!("failed to seek to {pos:#x}: {e}")))
}

/// Loads the section-name string table located via `e_shstrndx`.
///
/// Must happen before any section-name comparison; section recognition
/// depends on this buffer.
fn load_section_name_table<R: Read + Seek>(
    input: &mut R,
    ehdr: &Ehdr,
    class: ElfClass,
) -> Result<StringTable> {
    let shdr_off = ehdr.e_shoff + ehdr.e_shstrndx as u64 * ehdr.e_shentsize as u64;
    seek_to(input, shdr_off)?;
    let shdr = Shdr::read_from(input, class)
        .map_err(|e| io_error(format!("failed to read the section name table header: {e}")))?;
    Ok(StringTable::new(read_section_bytes(input, &shdr)?))
}

fn read_section_bytes<R: Read + Seek>(input: &mut R, shdr: &Shdr) -> Result<Vec<u8>> {
    seek_to(input, shdr.sh_offset)?;
    let mut buf = vec![0u8; shdr.sh_size as usize];
    input
        .read_exact(&mut buf)
        .map_err(|e| io_error(format!("failed to read section contents: {e}")))?;
    Ok(buf)
}

fn entry_count(shdr: &Shdr) -> Result<u64> {
    if shdr.sh_entsize == 0 {
        return Err(parse_shdr_error(format!(
            "table section at {:#x} has zero entry size",
            shdr.sh_offset
        )));
    }
    Ok(shdr.sh_size / shdr.sh_entsize)
}

/// Reads a relocation section entry by entry, recording the stream position
/// immediately before each decode as the entry's rewrite address.
fn load_reloc_table<T: RelocEntry, R: Read + Seek>(
    input: &mut R,
    shdr: &Shdr,
    class: ElfClass,
    out: &mut Vec<RelocSlot<T>>,
) -> Result<()> {
    let count = entry_count(shdr)?;
    seek_to(input, shdr.sh_offset)?;
    out.reserve(count as usize);
    for _ in 0..count {
        let file_off = input
            .stream_position()
            .map_err(|e| io_error(format!("failed to query stream position: {e}")))?;
        let entry = T::read_from(input, class)
            .map_err(|e| io_error(format!("failed to read relocation entry: {e}")))?;
        out.push(RelocSlot { file_off, entry });
    }
    Ok(())
}

fn load_symbol_table<R: Read + Seek>(
    input: &mut R,
    shdr: &Shdr,
    class: ElfClass,
) -> Result<Vec<Sym>> {
    let count = entry_count(shdr)?;
    seek_to(input, shdr.sh_offset)?;
    let mut symtab = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let sym = Sym::read_from(input, class)
            .map_err(|e| io_error(format!("failed to read symbol table entry: {e}")))?;
        symtab.push(sym);
    }
    Ok(symtab)
}
