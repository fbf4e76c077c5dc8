use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ScriptChainError};
use crate::types::{AfterChainDone, CompletionPolicy};

/// A chain as stored on disk.
///
/// ```toml
/// module_name = "01"
/// after_chain_done = "shutdown"
///
/// [[script]]
/// script_path = "C:/tools/runner.exe"
/// script_process_name = "runner.exe"
/// game_process_name = "game.exe"
/// run_timeout_seconds = 3600
/// check_done = "game_or_script_closed"
/// kill_script_after_done = true
/// script_arguments = "-a --fast"
/// notify_done = true
/// ```
///
/// The order of the `[[script]]` tables is the execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Display name of the chain; also the store key.
    #[serde(default)]
    pub module_name: String,

    #[serde(default)]
    pub after_chain_done: AfterChainDone,

    #[serde(default, rename = "script")]
    pub steps: Vec<StepConfig>,
}

impl ChainConfig {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            after_chain_done: AfterChainDone::default(),
            steps: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append a step at the end of the chain.
    pub fn add_step(&mut self, step: StepConfig) {
        self.steps.push(step);
        self.renumber();
    }

    /// Replace the step at `idx`.
    pub fn update_step(&mut self, idx: usize, step: StepConfig) -> Result<()> {
        let slot = self
            .steps
            .get_mut(idx)
            .ok_or(ScriptChainError::StepNotFound(idx))?;
        *slot = step;
        self.renumber();
        Ok(())
    }

    /// Swap the step at `idx` with the one before it. Moving the first step
    /// up is a no-op.
    pub fn move_up(&mut self, idx: usize) -> Result<()> {
        if idx >= self.steps.len() {
            return Err(ScriptChainError::StepNotFound(idx));
        }
        if idx > 0 {
            self.steps.swap(idx - 1, idx);
            self.renumber();
        }
        Ok(())
    }

    pub fn remove_step(&mut self, idx: usize) -> Result<StepConfig> {
        if idx >= self.steps.len() {
            return Err(ScriptChainError::StepNotFound(idx));
        }
        let removed = self.steps.remove(idx);
        self.renumber();
        Ok(removed)
    }

    /// Make every step's `idx` equal its position.
    pub fn renumber(&mut self) {
        for (i, step) in self.steps.iter_mut().enumerate() {
            step.idx = i;
        }
    }
}

/// One `[[script]]` entry: a program to launch plus how to tell when it is
/// done and what to clean up afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
    /// Position in the chain. Rewritten from the list order on load.
    #[serde(default)]
    pub idx: usize,

    /// Executable (or script) to launch. Its parent directory becomes the
    /// working directory.
    #[serde(default)]
    pub script_path: String,

    /// Process name of the running script, used for monitoring and killing.
    #[serde(default)]
    pub script_process_name: Option<String>,

    #[serde(default)]
    pub script_display_name: Option<String>,

    /// Process name of the companion (e.g. a game started by the script).
    #[serde(default)]
    pub game_process_name: Option<String>,

    #[serde(default)]
    pub game_display_name: Option<String>,

    /// Absolute limit, counted from the first launch attempt.
    #[serde(default = "default_run_timeout_seconds")]
    pub run_timeout_seconds: u64,

    #[serde(default)]
    pub check_done: CompletionPolicy,

    #[serde(default)]
    pub kill_script_after_done: bool,

    #[serde(default)]
    pub kill_game_after_done: bool,

    /// Raw argument string; split on whitespace, no quoting rules.
    #[serde(default)]
    pub script_arguments: String,

    #[serde(default)]
    pub notify_start: bool,

    #[serde(default)]
    pub notify_done: bool,
}

fn default_run_timeout_seconds() -> u64 {
    3600
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            idx: 0,
            script_path: String::new(),
            script_process_name: None,
            script_display_name: None,
            game_process_name: None,
            game_display_name: None,
            run_timeout_seconds: default_run_timeout_seconds(),
            check_done: CompletionPolicy::default(),
            kill_script_after_done: false,
            kill_game_after_done: false,
            script_arguments: String::new(),
            notify_start: false,
            notify_done: false,
        }
    }
}

impl StepConfig {
    /// Script process name, with empty strings treated as unset.
    pub fn script_process(&self) -> Option<&str> {
        non_empty(&self.script_process_name)
    }

    /// Companion process name, with empty strings treated as unset.
    pub fn game_process(&self) -> Option<&str> {
        non_empty(&self.game_process_name)
    }

    pub fn script_display(&self) -> String {
        if let Some(name) = non_empty(&self.script_display_name) {
            return name.to_string();
        }
        Path::new(&self.script_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.script_path.clone())
    }

    pub fn game_display(&self) -> Option<String> {
        non_empty(&self.game_display_name)
            .or_else(|| self.game_process())
            .map(str::to_string)
    }

    pub fn argument_tokens(&self) -> Vec<String> {
        self.script_arguments
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// `script_path` resolved against the current directory.
    ///
    /// The child runs from the script's own directory, so a relative path
    /// has to be pinned down before the working directory changes.
    pub fn script_location(&self) -> PathBuf {
        let raw = Path::new(self.script_path.trim());
        std::path::absolute(raw).unwrap_or_else(|_| raw.to_path_buf())
    }

    /// Parent directory of the script, if it has a non-empty one.
    pub fn working_dir(&self) -> Option<PathBuf> {
        let location = self.script_location();
        match location.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Some(parent.to_path_buf()),
            _ => None,
        }
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_seconds)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
