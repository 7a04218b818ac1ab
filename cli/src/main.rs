use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cpio_strip::compare_files;
use cpio_strip::strip_file;
use cpio_strip::Error;
use env_logger::Env;
use log::info;

fn do_main() -> Result<ExitCode, Error> {
    let args = Args::parse();
    if args.version {
        println!("{}", VERSION);
        return Ok(ExitCode::SUCCESS);
    }
    match args {
        Args {
            first: Some(first),
            second: Some(second),
            ..
        } => compare(&first, &second)?,
        Args {
            input: Some(input),
            output,
            ..
        } => {
            let stats = strip_file(&input, output.as_deref())?;
            info!("{} entries stripped", stats.entries);
        }
        _ => {
            eprintln!("no file provided, see `--help`");
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn compare(first: &Path, second: &Path) -> Result<(), Error> {
    let report = compare_files(first, second)?;
    for entry in report.entries.iter() {
        for change in entry.changes.iter() {
            println!("file: {}\t{}", entry.name, change);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();
    match do_main() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Reset modification time of newc CPIO archive entries to Thu Jan 1 00:00:00 UTC 1970,
/// or compare the entries of two archives and print the header fields that differ.
#[derive(Parser)]
struct Args {
    /// Print version.
    #[arg(long)]
    version: bool,
    /// Archive to strip.
    #[arg(short = 'i', long = "in", value_name = "FILE", conflicts_with_all = ["first", "second"])]
    input: Option<PathBuf>,
    /// Write the stripped archive to this file instead of modifying the input in place.
    #[arg(short = 'o', long = "out", value_name = "FILE", requires = "input")]
    output: Option<PathBuf>,
    /// The first archive to compare.
    #[arg(long = "f1", value_name = "FILE", requires = "second")]
    first: Option<PathBuf>,
    /// The second archive to compare.
    #[arg(long = "f2", value_name = "FILE", requires = "first")]
    second: Option<PathBuf>,
}

const VERSION: &str = env!("CARGO_PKG_VERSION");
