use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HoudiniError {
    #[error("out of memory growing output buffer by {requested} bytes")]
    OutOfMemory { requested: usize },

    #[error("{message}")]
    InvalidUsage { message: String },

    #[error("invalid command name \"{name}\"")]
    UnknownCommand { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error in {path}: {message}")]
    TomlParse { path: PathBuf, message: String },

    #[error("Config file not found: {path}")]
    ConfigNotFound { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, HoudiniError>;
