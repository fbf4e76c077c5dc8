// src/errors.rs

//! Crate-wide error type and `Result` alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptChainError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Chain not found: {0}")]
    ChainNotFound(String),

    #[error("Chain already exists: {0}")]
    ChainExists(String),

    #[error("Invalid chain name: {0}")]
    InvalidChainName(String),

    #[error("No step at index {0}")]
    StepNotFound(usize),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ScriptChainError>;
