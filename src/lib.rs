//! # reloc_shuffle
//! Inspect and mutate the dynamic relocation data of ELF binaries.
//!
//! The library parses the relocation tables of a 32- or 64-bit ELF image
//! (`.rel.dyn`, `.rela.dyn`, `.rela.plt`, together with `.dynsym` and
//! `.dynstr` for symbol names), dumps them in human-readable form, and can
//! exchange the position-dependent fields of randomly chosen entry pairs
//! directly on a copy of the file. Symbol binding and relocation type stay
//! attached to their original entries, so the mutated file still looks
//! structurally valid while its relocations point at displaced targets.
//! The intended use is robustness testing of loaders and linkers.
//!
//! ## Example
//! ```no_run
//! use rand::{rngs::StdRng, SeedableRng};
//! use reloc_shuffle::{shuffle, ElfImage};
//! use std::fs::{File, OpenOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut input = File::open("a.out")?;
//! let image = ElfImage::parse(&mut input)?;
//! image.dump(&mut std::io::stdout().lock())?;
//!
//! std::fs::copy("a.out", "a.out.shuffled")?;
//! let mut output = OpenOptions::new().write(true).open("a.out.shuffled")?;
//! let mut rng = StdRng::seed_from_u64(42);
//! shuffle(&image, &mut output, 4, &mut rng)?;
//! # Ok(())
//! # }
//! ```

pub mod ehdr;
mod error;
pub mod image;
pub mod relocation;
pub mod shdr;
mod shuffle;
pub mod strtab;
pub mod symbol;

pub use ehdr::ElfClass;
pub use error::{Error, Result};
pub use image::ElfImage;
pub use shuffle::shuffle;

pub use elf::abi;
