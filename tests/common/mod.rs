#![allow(dead_code)]

//! Builds minimal ELF images for exercising the parser and shuffler.
//!
//! Every image carries a null section, `.dynstr`, `.dynsym`, `.rel.dyn`,
//! `.rela.dyn`, and `.shstrtab`, written field by field in little-endian
//! order at the width the requested class demands.

use byteorder::{LittleEndian, WriteBytesExt};
use reloc_shuffle::ElfClass;

const ET_DYN: u16 = 3;
const EM_386: u16 = 3;
const EM_X86_64: u16 = 62;
const SHT_STRTAB: u32 = 3;
const SHT_DYNSYM: u32 = 11;
const SHT_REL: u32 = 9;
const SHT_RELA: u32 = 4;

pub struct ImageSpec<'a> {
    pub class: ElfClass,
    /// (r_offset, r_info) entries for `.rel.dyn`.
    pub rels: &'a [(u64, u64)],
    /// (r_offset, r_info, r_addend) entries for `.rela.dyn`.
    pub relas: &'a [(u64, u64, i64)],
    /// Symbol names, in `.dynsym` order.
    pub symbols: &'a [&'a str],
}

impl<'a> ImageSpec<'a> {
    pub fn elf64(
        rels: &'a [(u64, u64)],
        relas: &'a [(u64, u64, i64)],
        symbols: &'a [&'a str],
    ) -> Self {
        Self {
            class: ElfClass::Elf64,
            rels,
            relas,
            symbols,
        }
    }

    pub fn elf32(
        rels: &'a [(u64, u64)],
        relas: &'a [(u64, u64, i64)],
        symbols: &'a [&'a str],
    ) -> Self {
        Self {
            class: ElfClass::Elf32,
            rels,
            relas,
            symbols,
        }
    }
}

pub fn build_image(spec: &ImageSpec) -> Vec<u8> {
    let is_64 = spec.class.is_64();
    let ehdr_size: u64 = if is_64 { 64 } else { 52 };
    let shentsize: u64 = if is_64 { 64 } else { 40 };
    let sym_size: u64 = if is_64 { 24 } else { 16 };
    let rel_size: u64 = if is_64 { 16 } else { 8 };
    let rela_size: u64 = if is_64 { 24 } else { 12 };

    // .dynstr
    let mut dynstr = vec![0u8];
    let mut name_offs = Vec::new();
    for name in spec.symbols {
        name_offs.push(dynstr.len() as u32);
        dynstr.extend_from_slice(name.as_bytes());
        dynstr.push(0);
    }

    // .dynsym
    let mut dynsym = Vec::new();
    for &name_off in &name_offs {
        if is_64 {
            dynsym.write_u32::<LittleEndian>(name_off).unwrap();
            dynsym.write_u8(0).unwrap();
            dynsym.write_u8(0).unwrap();
            dynsym.write_u16::<LittleEndian>(0).unwrap();
            dynsym.write_u64::<LittleEndian>(0).unwrap();
            dynsym.write_u64::<LittleEndian>(0).unwrap();
        } else {
            dynsym.write_u32::<LittleEndian>(name_off).unwrap();
            dynsym.write_u32::<LittleEndian>(0).unwrap();
            dynsym.write_u32::<LittleEndian>(0).unwrap();
            dynsym.write_u8(0).unwrap();
            dynsym.write_u8(0).unwrap();
            dynsym.write_u16::<LittleEndian>(0).unwrap();
        }
    }

    // .rel.dyn
    let mut rel_dyn = Vec::new();
    for &(r_offset, r_info) in spec.rels {
        if is_64 {
            rel_dyn.write_u64::<LittleEndian>(r_offset).unwrap();
            rel_dyn.write_u64::<LittleEndian>(r_info).unwrap();
        } else {
            rel_dyn.write_u32::<LittleEndian>(r_offset as u32).unwrap();
            rel_dyn.write_u32::<LittleEndian>(r_info as u32).unwrap();
        }
    }

    // .rela.dyn
    let mut rela_dyn = Vec::new();
    for &(r_offset, r_info, r_addend) in spec.relas {
        if is_64 {
            rela_dyn.write_u64::<LittleEndian>(r_offset).unwrap();
            rela_dyn.write_u64::<LittleEndian>(r_info).unwrap();
            rela_dyn.write_i64::<LittleEndian>(r_addend).unwrap();
        } else {
            rela_dyn.write_u32::<LittleEndian>(r_offset as u32).unwrap();
            rela_dyn.write_u32::<LittleEndian>(r_info as u32).unwrap();
            rela_dyn.write_i32::<LittleEndian>(r_addend as i32).unwrap();
        }
    }

    // .shstrtab
    let mut shstrtab = vec![0u8];
    let shname = |table: &mut Vec<u8>, name: &str| -> u32 {
        let off = table.len() as u32;
        table.extend_from_slice(name.as_bytes());
        table.push(0);
        off
    };
    let dynstr_name = shname(&mut shstrtab, ".dynstr");
    let dynsym_name = shname(&mut shstrtab, ".dynsym");
    let rel_dyn_name = shname(&mut shstrtab, ".rel.dyn");
    let rela_dyn_name = shname(&mut shstrtab, ".rela.dyn");
    let shstrtab_name = shname(&mut shstrtab, ".shstrtab");

    // Section contents follow the header back to back, the section header
    // table comes last.
    let dynstr_off = ehdr_size;
    let dynsym_off = dynstr_off + dynstr.len() as u64;
    let rel_dyn_off = dynsym_off + dynsym.len() as u64;
    let rela_dyn_off = rel_dyn_off + rel_dyn.len() as u64;
    let shstrtab_off = rela_dyn_off + rela_dyn.len() as u64;
    let shoff = shstrtab_off + shstrtab.len() as u64;

    let mut image = Vec::new();
    write_ehdr(&mut image, spec.class, shoff, shentsize as u16, 6, 5);
    image.extend_from_slice(&dynstr);
    image.extend_from_slice(&dynsym);
    image.extend_from_slice(&rel_dyn);
    image.extend_from_slice(&rela_dyn);
    image.extend_from_slice(&shstrtab);

    // Null section header.
    image.resize(image.len() + shentsize as usize, 0);
    write_shdr(
        &mut image,
        spec.class,
        dynstr_name,
        SHT_STRTAB,
        dynstr_off,
        dynstr.len() as u64,
        0,
    );
    write_shdr(
        &mut image,
        spec.class,
        dynsym_name,
        SHT_DYNSYM,
        dynsym_off,
        dynsym.len() as u64,
        sym_size,
    );
    write_shdr(
        &mut image,
        spec.class,
        rel_dyn_name,
        SHT_REL,
        rel_dyn_off,
        rel_dyn.len() as u64,
        rel_size,
    );
    write_shdr(
        &mut image,
        spec.class,
        rela_dyn_name,
        SHT_RELA,
        rela_dyn_off,
        rela_dyn.len() as u64,
        rela_size,
    );
    write_shdr(
        &mut image,
        spec.class,
        shstrtab_name,
        SHT_STRTAB,
        shstrtab_off,
        shstrtab.len() as u64,
        0,
    );
    image
}

fn write_ehdr(
    buf: &mut Vec<u8>,
    class: ElfClass,
    shoff: u64,
    shentsize: u16,
    shnum: u16,
    shstrndx: u16,
) {
    let is_64 = class.is_64();
    let mut e_ident = [0u8; 16];
    e_ident[0..4].copy_from_slice(&[0x7f, b'E', b'L', b'F']);
    e_ident[4] = if is_64 { 2 } else { 1 };
    e_ident[5] = 1; // little-endian
    e_ident[6] = 1; // EV_CURRENT
    buf.extend_from_slice(&e_ident);
    buf.write_u16::<LittleEndian>(ET_DYN).unwrap();
    buf.write_u16::<LittleEndian>(if is_64 { EM_X86_64 } else { EM_386 })
        .unwrap();
    buf.write_u32::<LittleEndian>(1).unwrap();
    if is_64 {
        buf.write_u64::<LittleEndian>(0).unwrap();
        buf.write_u64::<LittleEndian>(0).unwrap();
        buf.write_u64::<LittleEndian>(shoff).unwrap();
    } else {
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(shoff as u32).unwrap();
    }
    buf.write_u32::<LittleEndian>(0).unwrap();
    buf.write_u16::<LittleEndian>(if is_64 { 64 } else { 52 })
        .unwrap();
    buf.write_u16::<LittleEndian>(0).unwrap();
    buf.write_u16::<LittleEndian>(0).unwrap();
    buf.write_u16::<LittleEndian>(shentsize).unwrap();
    buf.write_u16::<LittleEndian>(shnum).unwrap();
    buf.write_u16::<LittleEndian>(shstrndx).unwrap();
}

fn write_shdr(
    buf: &mut Vec<u8>,
    class: ElfClass,
    sh_name: u32,
    sh_type: u32,
    sh_offset: u64,
    sh_size: u64,
    sh_entsize: u64,
) {
    buf.write_u32::<LittleEndian>(sh_name).unwrap();
    buf.write_u32::<LittleEndian>(sh_type).unwrap();
    if class.is_64() {
        buf.write_u64::<LittleEndian>(0).unwrap(); // sh_flags
        buf.write_u64::<LittleEndian>(0).unwrap(); // sh_addr
        buf.write_u64::<LittleEndian>(sh_offset).unwrap();
        buf.write_u64::<LittleEndian>(sh_size).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap(); // sh_link
        buf.write_u32::<LittleEndian>(0).unwrap(); // sh_info
        buf.write_u64::<LittleEndian>(1).unwrap(); // sh_addralign
        buf.write_u64::<LittleEndian>(sh_entsize).unwrap();
    } else {
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(sh_offset as u32).unwrap();
        buf.write_u32::<LittleEndian>(sh_size as u32).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(1).unwrap();
        buf.write_u32::<LittleEndian>(sh_entsize as u32).unwrap();
    }
}
