use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Display a side-by-side comparison of exif data",
    long_about = None
)]
pub struct Args {
    /// Files to compare; each file is diffed against the next one
    #[arg(required = true, num_args = 2..)]
    pub files: Vec<PathBuf>,

    /// Compare tags in sorted order (default)
    #[arg(short, long, overrides_with = "unsorted")]
    pub sorted: bool,

    /// Compare tags in the order exiftool reports them
    #[arg(short, long, overrides_with = "sorted")]
    pub unsorted: bool,

    /// Total display width (each column gets (width - 3) / 2 characters)
    #[arg(short = 'W', long, default_value_t = 80, value_parser = clap::value_parser!(u16).range(3..))]
    pub width: u16,

    /// exiftool executable to run
    #[arg(long, env = "EXIFTOOL", default_value = "exiftool")]
    pub exiftool: PathBuf,

    /// More diagnostics on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone)]
pub struct Options {
    pub files: Vec<PathBuf>,
    pub sorted: bool,
    pub width: usize,
    pub exiftool: PathBuf,
}

pub fn build_options(args: &Args) -> Result<Options> {
    ensure!(
        args.files.len() >= 2,
        "at least two files are needed, got {}",
        args.files.len()
    );
    for file in &args.files {
        ensure!(file.is_file(), "no such file: {}", file.display());
    }

    Ok(Options {
        files: args.files.clone(),
        sorted: !args.unsorted,
        width: usize::from(args.width),
        exiftool: args.exiftool.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("exifdiff").chain(argv.iter().copied()))
    }

    #[test]
    fn defaults() {
        let args = parse(&["a.jpg", "b.jpg"]).unwrap();
        assert!(!args.unsorted);
        assert_eq!(args.width, 80);
        assert_eq!(args.verbose, 0);
        assert_eq!(args.files.len(), 2);
    }

    #[test]
    fn last_order_flag_wins() {
        let args = parse(&["-s", "-u", "a", "b"]).unwrap();
        assert!(args.unsorted);
        let args = parse(&["-u", "-s", "a", "b"]).unwrap();
        assert!(!args.unsorted);
    }

    #[test]
    fn width_below_three_is_rejected() {
        assert!(parse(&["-W", "2", "a", "b"]).is_err());
        assert_eq!(parse(&["-W", "3", "a", "b"]).unwrap().width, 3);
    }

    #[test]
    fn single_file_is_rejected() {
        assert!(parse(&["a.jpg"]).is_err());
    }

    #[test]
    fn missing_files_fail_validation() {
        let args = parse(&["/nonexistent/a.jpg", "/nonexistent/b.jpg"]).unwrap();
        let err = build_options(&args).unwrap_err();
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn options_from_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        std::fs::write(&a, b"").unwrap();
        std::fs::write(&b, b"").unwrap();
        let args = parse(&["-u", "-W", "40", a.to_str().unwrap(), b.to_str().unwrap()]).unwrap();
        let opts = build_options(&args).unwrap();
        assert!(!opts.sorted);
        assert_eq!(opts.width, 40);
        assert_eq!(opts.files, [a, b]);
    }
}
