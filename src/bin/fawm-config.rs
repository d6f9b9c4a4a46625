//! fawm-config - compile a fawm menu configuration
//!
//! Reads the configuration file named on the command line and writes the
//! length-prefixed relocatable blob to standard output, where `fawm` reads
//! it from a pipe. Any error aborts without output.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use fawm_core::{blob, parser};

/// Compile a fawm menu configuration to standard output
#[derive(Parser, Debug)]
#[command(name = "fawm-config", version, about, long_about = None)]
struct Args {
    /// Configuration file to compile
    config_file: PathBuf,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let argv0 = std::env::args().next().unwrap_or_else(|| "fawm-config".into());
            eprintln!("Usage: {argv0} <config_file>");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    match compile(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn compile(args: &Args) -> Result<()> {
    let path = &args.config_file;
    let source = std::fs::read_to_string(path).map_err(|e| {
        anyhow::anyhow!("Cannot open configuration file: {e}: {}", path.display())
    })?;
    let config = parser::parse(&source).with_context(|| path.display().to_string())?;
    let bytes = blob::serialize(&config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    blob::write_blob(&mut out, &bytes).context("Cannot write the compiled configuration")?;
    out.flush()?;
    Ok(())
}
