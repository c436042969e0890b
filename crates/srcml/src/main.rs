/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Command-line entry point: convert one Python file to lossless XML
 */

use anyhow::{Context, Result};
use clap::Parser;
use srcml::{ConvertOptions, SerializeOptions, convert_file};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "srcml")]
#[command(version, about = "Convert Python source into a lossless XML tree", long_about = None)]
struct Args {
    /// Python source file to convert
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Annotate every element with its `beg` and `end` byte offsets
    #[arg(long)]
    spans: bool,

    /// Check that the XML reproduces the source before printing it
    #[arg(long)]
    verify: bool,

    /// Verbose logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides the verbosity flag
    let default_filter = match args.verbose {
        0 => "warn",
        1 => "srcml=info",
        2 => "srcml=debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = ConvertOptions {
        serialize: SerializeOptions { spans: args.spans },
        verify: args.verify,
    };

    let xml = match convert_file(&args.file, &options) {
        Ok(xml) => xml,
        Err(err) => {
            if err.is_internal() {
                tracing::error!(error = %err, "span consistency check failed; no output written");
            }
            return Err(err).with_context(|| format!("failed to convert {}", args.file.display()));
        }
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{xml}").context("Failed to write output")?;
    stdout.flush().context("Failed to write output")?;
    Ok(())
}
