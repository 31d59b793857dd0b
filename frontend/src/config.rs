//! Optional TOML settings for `nichi-snap`.
//!
//! ```toml
//! rom_path = "/home/me/roms"
//! scale = 3
//! ```
//!
//! Command-line flags override file values.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SnapError;

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SnapConfig {
    /// ROM ZIP, rompath directory or loose-file directory used when none is
    /// given on the command line.
    pub rom_path: Option<PathBuf>,
    pub scale: Option<u32>,
}

impl SnapConfig {
    /// `<config dir>/nichi/snap.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nichi").join("snap.toml"))
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, SnapError> {
        toml::from_str(text).map_err(|source| SnapError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, SnapError> {
        let text = std::fs::read_to_string(path).map_err(|source| SnapError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// An explicit path must exist; the default path is used only if present.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, SnapError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "using default config");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}
