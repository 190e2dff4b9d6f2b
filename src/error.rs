//! Error types shared by the configuration, key binding and position
//! persistence layers.
//!
//! Nothing in the window manager itself is fatal: geometry refusals are
//! silent no-ops and a missing node is skipped. These errors only surface
//! from the pieces that touch the filesystem or parse user input.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WmError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize window positions: {0}")]
    PositionsWrite(#[from] toml::ser::Error),
    #[error("invalid key combination `{0}`")]
    KeyParse(String),
    #[error("unknown action `{0}`")]
    UnknownAction(String),
}

pub type WmResult<T> = Result<T, WmError>;
