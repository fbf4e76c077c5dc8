use std::fmt;

use serde::{Deserialize, Serialize};

/// Which process disappearance ends the wait for a step.
///
/// - `ScriptClosed`: the script's own process (by name) went away.
/// - `GameClosed`: the companion process went away.
/// - `GameOrScriptClosed`: whichever of the two goes away first.
///
/// Values that don't match any of these are kept as `Unknown` instead of
/// failing the whole chain file; the detector treats them as "done".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CompletionPolicy {
    ScriptClosed,
    GameClosed,
    GameOrScriptClosed,
    Unknown(String),
}

impl CompletionPolicy {
    pub fn as_str(&self) -> &str {
        match self {
            CompletionPolicy::ScriptClosed => "script_closed",
            CompletionPolicy::GameClosed => "game_closed",
            CompletionPolicy::GameOrScriptClosed => "game_or_script_closed",
            CompletionPolicy::Unknown(raw) => raw,
        }
    }
}

impl Default for CompletionPolicy {
    fn default() -> Self {
        CompletionPolicy::GameOrScriptClosed
    }
}

impl From<String> for CompletionPolicy {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "script_closed" => CompletionPolicy::ScriptClosed,
            "game_closed" => CompletionPolicy::GameClosed,
            "game_or_script_closed" => CompletionPolicy::GameOrScriptClosed,
            _ => CompletionPolicy::Unknown(raw),
        }
    }
}

impl From<CompletionPolicy> for String {
    fn from(policy: CompletionPolicy) -> Self {
        policy.as_str().to_string()
    }
}

impl fmt::Display for CompletionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do once every step of a chain has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AfterChainDone {
    None,
    Shutdown,
    CloseWindow,
}

impl Default for AfterChainDone {
    fn default() -> Self {
        AfterChainDone::None
    }
}
