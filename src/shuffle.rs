//! Randomized in-place exchange of relocation placement fields.
//!
//! The shuffler never touches the parsed model. It rewrites entries on a
//! byte-exact copy of the input, at the file offsets recorded during
//! parsing, exchanging only the fields that say where a patch lands.

use crate::ehdr::ElfClass;
use crate::error::{io_error, Result};
use crate::image::ElfImage;
use crate::relocation::{RelocEntry, RelocSlot};
use rand::Rng;
use std::io::{Seek, SeekFrom, Write};

/// Performs `count` randomized pairwise exchanges on `out`.
///
/// `out` must cover a byte-exact copy of the image `image` was parsed from.
/// Each round picks one of the two relocation sequences (a fair coin when
/// both are non-empty), then two entry indices uniformly with replacement,
/// and exchanges the target-offset field between them, plus the addend for
/// addend-bearing entries. `r_info` is never moved. Picking the same index
/// twice makes that round a no-op; an image with no relocation entries at
/// all stops the operation early.
///
/// The generator is an explicit argument so runs can be reproduced by
/// seeding it; there is no ambient random state.
pub fn shuffle<W, R>(image: &ElfImage, out: &mut W, count: u64, rng: &mut R) -> Result<()>
where
    W: Write + Seek,
    R: Rng,
{
    for round in 0..count {
        let use_rels = if !image.rels().is_empty() && !image.relas().is_empty() {
            rng.gen_bool(0.5)
        } else if !image.rels().is_empty() {
            true
        } else if !image.relas().is_empty() {
            false
        } else {
            log::debug!("no relocation entries to swap, stopping after {round} rounds");
            return Ok(());
        };

        if use_rels {
            let (a, b) = swap_pair(image.rels(), image.class(), out, rng)?;
            log::debug!("swapped reloc {a} with {b}");
        } else {
            let (a, b) = swap_pair(image.relas(), image.class(), out, rng)?;
            log::debug!("swapped reloc with addend {a} with {b}");
        }
    }
    Ok(())
}

/// One pick-and-exchange round over a single sequence.
///
/// Local copies of the two entries are exchanged and written back at their
/// recorded offsets; the slots themselves stay untouched so the recorded
/// addresses remain valid for every later round.
fn swap_pair<T, W, R>(
    slots: &[RelocSlot<T>],
    class: ElfClass,
    out: &mut W,
    rng: &mut R,
) -> Result<(usize, usize)>
where
    T: RelocEntry,
    W: Write + Seek,
    R: Rng,
{
    let a_idx = rng.gen_range(0..slots.len());
    let b_idx = rng.gen_range(0..slots.len());
    let mut a = slots[a_idx].entry;
    let mut b = slots[b_idx].entry;
    T::swap_placement(&mut a, &mut b);

    write_entry(out, slots[a_idx].file_off, &a, class)?;
    write_entry(out, slots[b_idx].file_off, &b, class)?;
    Ok((a_idx, b_idx))
}

fn write_entry<T, W>(out: &mut W, file_off: u64, entry: &T, class: ElfClass) -> Result<()>
where
    T: RelocEntry,
    W: Write + Seek,
{
    out.seek(SeekFrom::Start(file_off))
        .map_err(|e| io_error(format!("failed to seek to {file_off:#x}: {e}")))?;
    entry
        .write_to(out, class)
        .map_err(|e| io_error(format!("failed to write relocation entry at {file_off:#x}: {e}")))
}
