use std::io;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, Level};

use exifdiff::{build_options, run_exifdiff, Args, ExifTool};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // stdout carries the diff itself.
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let opts = build_options(&args)?;

    // Dropped (and shut down) on every early return below.
    let mut exiftool = ExifTool::start(&opts.exiftool)?;
    let stdout = io::stdout();
    let stats = run_exifdiff(&mut exiftool, &opts, &mut stdout.lock())?;
    exiftool.close()?;

    info!(
        pairs = stats.pairs,
        same = stats.same,
        changed = stats.changed,
        deleted = stats.deleted,
        inserted = stats.inserted,
        aborted = stats.aborted,
        "exifdiff finished"
    );

    if stats.aborted > 0 {
        bail!(
            "{} of {} diff blocks were skipped after an internal error",
            stats.aborted,
            stats.pairs
        );
    }
    Ok(())
}
