//! Command-line interface for the STDF renderer.
//!
//! Reads a decoded record stream (JSON Lines) and writes ATDF, XML or the
//! pivoted CSV report.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use std::io;
use std::path::PathBuf;
use std::time::Instant;
use stdf_render::{Encoding, Output, RecordStream, RendererBuilder};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// `TypeName:field|field|...` per record
    Atdf,
    /// `<Stdf>` document, one element per record
    Xml,
    /// Pivoted per-part test-result report
    Csv,
}

impl From<Format> for Encoding {
    fn from(format: Format) -> Self {
        match format {
            Format::Atdf => Encoding::Atdf,
            Format::Xml => Encoding::Xml,
            Format::Csv => Encoding::Csv,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render decoded STDF records as ATDF, XML or a pivoted CSV report",
    long_about = "Reads a decoded STDF record stream (one JSON record per line) and renders it.\n\n\
                  Output goes to standard output unless --output is given. Diagnostics go to standard error."
)]
struct Args {
    /// Decoded record stream; standard input when omitted
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output encoding
    #[arg(short, long, value_enum, default_value = "atdf")]
    format: Format,

    /// Output file; standard output when omitted
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Log debug diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .format_timestamp(None)
        .init();

    let start_time = Instant::now();

    let stream = match &args.input {
        Some(path) => RecordStream::from_file(path)
            .with_context(|| format!("failed to open {}", path.display()))?,
        None => RecordStream::from_reader(io::stdin().lock())?,
    };

    let output = match &args.output {
        Some(path) => Output::File(path.clone()),
        None => Output::Stdout,
    };

    let stats = RendererBuilder::new()
        .encoding(args.format.into())
        .output(output)
        .build()?
        .render(stream.records())?;

    info!("{} in {:.2?}", stats.summary(), start_time.elapsed());
    Ok(())
}
