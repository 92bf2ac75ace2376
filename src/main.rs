use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reloc_shuffle::{shuffle, ElfImage};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser)]
#[command(name = "reloc_shuffle")]
#[command(about = "Inspect and shuffle the dynamic relocations of an ELF file")]
struct Args {
    /// Dump the dynamic relocations of FILE
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    dump: bool,
    /// Number of relocation pairs to swap (negative values are treated as 0)
    #[arg(short = 'n', long = "num-swaps", default_value_t = 1)]
    num_swaps: i64,
    /// Output file; required to shuffle the relocs in FILE
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Seed for the random generator; defaults to the current time
    #[arg(long)]
    seed: Option<u64>,
    /// Input ELF file
    file: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let num_swaps = args.num_swaps.max(0) as u64;

    let mut input = File::open(&args.file)
        .with_context(|| format!("failed to open input file {}", args.file.display()))?;
    let image = ElfImage::parse(&mut input)?;

    if args.dump {
        image.dump(&mut io::stdout().lock())?;
    }

    if let Some(out_path) = args.output {
        if num_swaps > 0 {
            std::fs::copy(&args.file, &out_path).with_context(|| {
                format!(
                    "failed to replicate {} to {}",
                    args.file.display(),
                    out_path.display()
                )
            })?;
            let mut output = OpenOptions::new()
                .write(true)
                .open(&out_path)
                .with_context(|| format!("failed to open {}", out_path.display()))?;

            let seed = args.seed.unwrap_or_else(|| {
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs()
            });
            let mut rng = StdRng::seed_from_u64(seed);
            shuffle(&image, &mut output, num_swaps, &mut rng)?;
        }
    }

    Ok(())
}
