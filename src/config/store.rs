// src/config/store.rs

//! Directory-backed storage for chains, one TOML file per chain.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::loader::{load_from_path, write_to_path};
use crate::config::model::ChainConfig;
use crate::config::validate::validate_chain_name;
use crate::errors::{Result, ScriptChainError};

const CHAIN_FILE_EXT: &str = "toml";

#[derive(Debug, Clone)]
pub struct ChainStore {
    dir: PathBuf,
}

impl ChainStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing the chain called `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{CHAIN_FILE_EXT}"))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    /// Load a chain fresh from disk.
    pub fn load(&self, name: &str) -> Result<ChainConfig> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(ScriptChainError::ChainNotFound(name.to_string()));
        }
        debug!(chain = %name, path = %path.display(), "loading chain");
        load_from_path(&path)
    }

    /// Persist `chain` under its `module_name`.
    pub fn save(&self, chain: &ChainConfig) -> Result<()> {
        let name = chain.module_name.trim();
        if name.is_empty() {
            return Err(ScriptChainError::InvalidChainName(
                "cannot save a chain without a name".to_string(),
            ));
        }
        let mut chain = chain.clone();
        chain.renumber();
        write_to_path(self.path_for(name), &chain)
    }

    /// Names of all stored chains, sorted.
    ///
    /// A missing directory is an empty store, not an error.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(CHAIN_FILE_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Create and persist an empty chain.
    pub fn create(&self, name: &str) -> Result<ChainConfig> {
        let name = validate_chain_name(name, None)?;
        if self.exists(&name) {
            return Err(ScriptChainError::ChainExists(name));
        }
        let chain = ChainConfig::new(name.clone());
        self.save(&chain)?;
        info!(chain = %name, "created chain");
        Ok(chain)
    }

    /// Rename a stored chain; the file moves and `module_name` follows.
    pub fn rename(&self, old: &str, new: &str) -> Result<ChainConfig> {
        let new = validate_chain_name(new, Some(old))?;
        if self.exists(&new) {
            return Err(ScriptChainError::ChainExists(new));
        }

        let mut chain = self.load(old)?;
        chain.module_name = new.clone();
        self.save(&chain)?;
        fs::remove_file(self.path_for(old))?;

        info!(from = %old, to = %new, "renamed chain");
        Ok(chain)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(ScriptChainError::ChainNotFound(name.to_string()));
        }
        fs::remove_file(&path)?;
        info!(chain = %name, "deleted chain");
        Ok(())
    }
}
