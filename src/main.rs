//! fawm - a small reparenting X11 window manager
//!
//! Decorates every top-level window with a frame that can be dragged, resized
//! from any edge or corner, minimized to the taskbar and closed. A popup menu,
//! opened from the root window or the taskbar, launches the commands listed in
//! the menu configuration.
//!
//! # Features
//! - Frames with title, control boxes and resize handles on every side
//! - Click-to-focus with raise, taskbar window list and clock
//! - Popup launcher compiled from `~/.fawm.conf` by `fawm-config`
//! - Menu reload without restarting
//! - Optional TOML appearance file for colors, font and sizes

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;

use fawm_backend_x11::{MenuLoader, X11Backend};

/// fawm - a small reparenting X11 window manager
#[derive(Parser, Debug)]
#[command(name = "fawm", version, about, long_about = None)]
struct Args {
    /// Menu configuration file [default: $HOME/.fawm.conf]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a debug log to this file
    #[arg(short, long)]
    log_file: Option<PathBuf>,

    /// Appearance file [default: $XDG_CONFIG_HOME/fawm/appearance.toml]
    #[arg(short, long)]
    appearance: Option<PathBuf>,

    /// Shell commands to run once the taskbar is up
    #[arg(trailing_var_arg = true)]
    commands: Vec<String>,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Some(path) = &args.log_file {
        init_logging(path);
    }
    info!("fawm v{} starting", env!("CARGO_PKG_VERSION"));

    match run(args) {
        Ok(()) => {
            info!("fawm exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("fawm: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Send `tracing` output to `path`. Logging stays off if it cannot be opened.
fn init_logging(path: &Path) {
    let file: File = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("fawm: Cannot open log file {}: {e}", path.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let result = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_env_filter(filter)
        .try_init();
    if let Err(e) = result {
        eprintln!("fawm: Cannot set up logging: {e}");
    }
}

fn run(args: Args) -> Result<()> {
    let argv0 = std::env::args().next().unwrap_or_default();
    let compiler = config::compiler_path(&argv0);
    let config_path = match args.config {
        Some(path) => path,
        None => config::default_config_path().context("Cannot determine the home directory")?,
    };

    let menu = config::load_menu(&compiler, &config_path)
        .with_context(|| format!("Cannot read config file: {}", config_path.display()))?;
    let appearance = config::load_appearance(args.appearance.as_deref());

    let reload: MenuLoader = Box::new(move || {
        config::load_menu(&compiler, &config_path)
            .with_context(|| format!("Cannot read config file: {}", config_path.display()))
    });

    let mut backend = X11Backend::connect(&appearance, menu, reload)?;
    backend.run(&args.commands)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_args_trailing_commands() {
        let args = Args::try_parse_from([
            "fawm",
            "--config",
            "/tmp/menu.conf",
            "xterm",
            "xclock -update 1",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/menu.conf")));
        assert_eq!(args.log_file, None);
        assert_eq!(args.commands, vec!["xterm", "xclock -update 1"]);
    }

    #[test]
    fn test_args_invalid_option_goes_to_stderr() {
        let err = Args::try_parse_from(["fawm", "--bogus"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_args_version_is_not_an_error() {
        let err = Args::try_parse_from(["fawm", "--version"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
