// src/config/validate.rs

use std::path::Path;

use thiserror::Error;

use crate::config::model::StepConfig;
use crate::errors::{Result, ScriptChainError};

/// File extensions a step may launch (compared case-insensitively).
pub const ACCEPTED_EXTENSIONS: &[&str] = &["exe", "bat", "cmd", "ps1", "lnk", "sh", "py"];

/// Longest chain name accepted by [`validate_chain_name`].
pub const MAX_CHAIN_NAME_LEN: usize = 10;

/// Why a step can't be run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidStep {
    #[error("script path is empty")]
    EmptyPath,

    #[error("script file does not exist: {0}")]
    MissingFile(String),

    #[error("unsupported script type for {path} (accepted: {accepted})")]
    UnsupportedExtension { path: String, accepted: String },

    #[error("run timeout must be at least one second")]
    ZeroTimeout,
}

impl StepConfig {
    /// Check that this step points at something launchable.
    ///
    /// Looks at the filesystem on every call, so a script deleted after the
    /// chain was loaded is reported as missing.
    pub fn validate(&self) -> std::result::Result<(), InvalidStep> {
        let raw = self.script_path.trim();
        if raw.is_empty() {
            return Err(InvalidStep::EmptyPath);
        }

        let path = Path::new(raw);
        if !path.is_file() {
            return Err(InvalidStep::MissingFile(raw.to_string()));
        }

        let accepted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                ACCEPTED_EXTENSIONS
                    .iter()
                    .any(|ok| ext.eq_ignore_ascii_case(ok))
            })
            .unwrap_or(false);
        if !accepted {
            return Err(InvalidStep::UnsupportedExtension {
                path: raw.to_string(),
                accepted: ACCEPTED_EXTENSIONS.join(", "),
            });
        }

        if self.run_timeout_seconds == 0 {
            return Err(InvalidStep::ZeroTimeout);
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Validate a chain name for creation or renaming and return it trimmed.
///
/// `current` is the existing name when renaming; the new name must differ.
pub fn validate_chain_name(name: &str, current: Option<&str>) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ScriptChainError::InvalidChainName(
            "chain name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_CHAIN_NAME_LEN {
        return Err(ScriptChainError::InvalidChainName(format!(
            "chain name '{name}' is longer than {MAX_CHAIN_NAME_LEN} characters"
        )));
    }
    if name.contains(['/', '\\']) {
        return Err(ScriptChainError::InvalidChainName(format!(
            "chain name '{name}' must not contain path separators"
        )));
    }
    if current == Some(name) {
        return Err(ScriptChainError::InvalidChainName(format!(
            "new name '{name}' is the same as the current one"
        )));
    }
    Ok(name.to_string())
}
