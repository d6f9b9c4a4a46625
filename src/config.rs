//! Configuration loading
//!
//! The menu is compiled by the separate `fawm-config` program and read back
//! from its standard output. Appearance settings come from an optional TOML
//! file.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use fawm_core::appearance::Appearance;
use fawm_core::blob::{self, BlobError, ConfigBlob};
use tracing::{debug, info, warn};

/// Name of the configuration compiler binary.
pub const COMPILER: &str = "fawm-config";

/// Menu configuration file name in the home directory.
const DEFAULT_CONFIG: &str = ".fawm.conf";

/// Appearance file under the XDG config directory.
const APPEARANCE_FILE: &str = "fawm/appearance.toml";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot run {compiler}: {source}")]
    Spawn {
        compiler: PathBuf,
        source: std::io::Error,
    },

    #[error("{compiler} failed ({status})")]
    Compiler { compiler: PathBuf, status: ExitStatus },

    #[error(transparent)]
    Blob(#[from] BlobError),
}

/// `$HOME/.fawm.conf`, when a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG))
}

/// Where to find the compiler: beside this program when it was started by
/// path, otherwise whatever `PATH` resolves.
pub fn compiler_path(argv0: &str) -> PathBuf {
    if argv0.contains('/') {
        Path::new(argv0).with_file_name(COMPILER)
    } else {
        PathBuf::from(COMPILER)
    }
}

/// Compile `config` with `compiler` and read the resulting blob from its
/// standard output. The compiler's own diagnostics go to our standard error.
pub fn load_menu(compiler: &Path, config: &Path) -> Result<ConfigBlob, LoadError> {
    debug!("running {} {}", compiler.display(), config.display());
    let output = Command::new(compiler)
        .arg(config)
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
        .map_err(|source| LoadError::Spawn {
            compiler: compiler.to_path_buf(),
            source,
        })?;
    if !output.status.success() {
        return Err(LoadError::Compiler {
            compiler: compiler.to_path_buf(),
            status: output.status,
        });
    }
    let menu = blob::read_blob(&mut output.stdout.as_slice())?;
    info!(
        "loaded {} ({} bytes, {} menu items)",
        config.display(),
        menu.len(),
        menu.item_count()
    );
    Ok(menu)
}

/// The appearance file to use: the one given, else the XDG one if present.
pub fn appearance_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(|| {
        dirs::config_dir()
            .map(|dir| dir.join(APPEARANCE_FILE))
            .filter(|path| path.exists())
    })
}

/// Load appearance settings, falling back to the defaults on any error.
pub fn load_appearance(explicit: Option<&Path>) -> Appearance {
    let Some(path) = appearance_path(explicit) else {
        debug!("no appearance file, using defaults");
        return Appearance::default();
    };
    match Appearance::load(&path) {
        Ok(appearance) => {
            info!("appearance loaded from {}", path.display());
            appearance
        }
        Err(e) => {
            warn!("{}, using default appearance", e);
            Appearance::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_compiler_beside_program_started_by_path() {
        assert_eq!(
            compiler_path("/usr/local/bin/fawm"),
            PathBuf::from("/usr/local/bin/fawm-config")
        );
        assert_eq!(compiler_path("./fawm"), PathBuf::from("./fawm-config"));
    }

    #[test]
    fn test_compiler_from_path_for_bare_name() {
        assert_eq!(compiler_path("fawm"), PathBuf::from(COMPILER));
    }

    #[test]
    fn test_missing_compiler_is_spawn_error() {
        let err = load_menu(Path::new("/nonexistent/fawm-config"), Path::new("x")).unwrap_err();
        assert!(matches!(err, LoadError::Spawn { .. }));
    }

    #[test]
    fn test_failing_compiler_is_reported() {
        let err = load_menu(Path::new("/bin/false"), Path::new("x")).unwrap_err();
        assert!(matches!(err, LoadError::Compiler { .. }));
    }

    #[test]
    fn test_empty_compiler_output_is_short_read() {
        let err = load_menu(Path::new("/bin/true"), Path::new("x")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Blob(BlobError::ShortRead {
                expected: 8,
                actual: 0
            })
        ));
    }

    #[test]
    fn test_appearance_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appearance.toml");
        fs::write(&path, "frame_size = 6\nfocused_color = \"#102030\"\n").unwrap();
        let appearance = load_appearance(Some(&path));
        assert_eq!(appearance.frame_size, 6);
        assert_eq!(appearance.focused_color, "#102030");
        assert_eq!(appearance.popup_margin, Appearance::default().popup_margin);
    }

    #[test]
    fn test_bad_appearance_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appearance.toml");
        fs::write(&path, "frame_size = \"wide\"\n").unwrap();
        assert_eq!(load_appearance(Some(&path)), Appearance::default());

        let missing = dir.path().join("missing.toml");
        assert_eq!(load_appearance(Some(&missing)), Appearance::default());
    }
}
