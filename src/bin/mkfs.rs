//! mkfs: build the virtual disk image.
//!
//! Usage:
//!   mkfs --kernel build/kernel.bin --bin-dir bin --output disk.img
//!
//! Every `*.bin` in the bin directory becomes a program the shell can run,
//! listed under its file name without the extension.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rvmk::fs::mkfs::{program_name, ImageBuilder};
use rvmk::memory::layout::KERNEL_SIZE;

#[derive(Parser, Debug)]
#[command(name = "mkfs")]
#[command(about = "Pack the kernel and user programs into a disk image")]
struct Args {
    /// Raw kernel binary
    #[arg(long, default_value = "build/kernel.bin")]
    kernel: PathBuf,

    /// Directory holding the user programs (*.bin)
    #[arg(long, default_value = "bin")]
    bin_dir: PathBuf,

    /// Output image path
    #[arg(long, default_value = "disk.img")]
    output: PathBuf,

    /// Bytes reserved for the kernel; must match the kernel's KERNEL_SIZE
    #[arg(long, default_value_t = KERNEL_SIZE)]
    kernel_size: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let kernel = fs::read(&args.kernel)
        .with_context(|| format!("{} not found, build the kernel first", args.kernel.display()))?;

    let mut image = ImageBuilder::new(args.kernel_size);
    image.kernel(&kernel);

    // a missing bin directory just means no programs
    let mut programs = Vec::new();
    if args.bin_dir.is_dir() {
        for dent in fs::read_dir(&args.bin_dir)
            .with_context(|| format!("reading {}", args.bin_dir.display()))?
        {
            let path = dent?.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if file_name.ends_with(".bin") {
                programs.push((file_name.to_owned(), path.clone()));
            }
        }
    }
    programs.sort();

    for (file_name, path) in &programs {
        let content = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let name = program_name(file_name);
        log::info!(
            "  {:<31} {:>8} bytes",
            String::from_utf8_lossy(&name),
            content.len()
        );
        image.file(&name, &content);
    }

    let disk = image.build()?;
    fs::write(&args.output, &disk)
        .with_context(|| format!("writing {}", args.output.display()))?;

    log::info!(
        "Success: Created {} with Kernel + {} apps.",
        args.output.display(),
        image.file_count()
    );
    Ok(())
}
