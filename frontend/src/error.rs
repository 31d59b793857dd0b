use std::path::PathBuf;

use nichi_machines::rom_loader::RomLoadError;

#[derive(Debug, thiserror::Error)]
pub enum SnapError {
    #[error("{0}")]
    Usage(String),

    #[error("unknown board '{name}' (available: {available})")]
    UnknownBoard { name: String, available: String },

    #[error(transparent)]
    Rom(#[from] RomLoadError),

    #[error("config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}
