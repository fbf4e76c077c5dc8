// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::ChainConfig;
use crate::errors::Result;

/// Environment variable overriding the chain directory.
pub const CONFIG_DIR_ENV: &str = "SCRIPTCHAIN_CONFIG_DIR";

/// Load a chain file from a given path.
///
/// Besides TOML deserialization this normalises the result:
///
/// - a missing `module_name` is filled from the file stem,
/// - every step's `idx` is rewritten from its position in the file.
///
/// Step validity is **not** checked here; it depends on the filesystem at
/// run time and is re-evaluated right before each launch.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ChainConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let mut chain: ChainConfig = toml::from_str(&contents)?;

    if chain.module_name.trim().is_empty() {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            chain.module_name = stem.to_string();
        }
    }
    chain.renumber();

    Ok(chain)
}

/// Serialize a chain and write it to `path`, creating parent directories.
pub fn write_to_path(path: impl AsRef<Path>, chain: &ChainConfig) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let contents = toml::to_string_pretty(chain)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Helper to resolve the default chain directory.
///
/// `SCRIPTCHAIN_CONFIG_DIR` wins when set; otherwise `config/script_chain`
/// relative to the current working directory.
pub fn default_config_dir() -> PathBuf {
    match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => PathBuf::from("config").join("script_chain"),
    }
}
