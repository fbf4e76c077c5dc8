#![allow(dead_code)]

use scriptchain::config::{ChainConfig, StepConfig};
use scriptchain::types::{AfterChainDone, CompletionPolicy};

/// Builder for `ChainConfig` to simplify test setup.
pub struct ChainConfigBuilder {
    chain: ChainConfig,
}

impl ChainConfigBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            chain: ChainConfig::new(name),
        }
    }

    pub fn with_step(mut self, step: StepConfig) -> Self {
        self.chain.add_step(step);
        self
    }

    pub fn after_chain_done(mut self, after: AfterChainDone) -> Self {
        self.chain.after_chain_done = after;
        self
    }

    pub fn build(self) -> ChainConfig {
        self.chain
    }
}

/// Builder for `StepConfig`.
pub struct StepConfigBuilder {
    step: StepConfig,
}

impl StepConfigBuilder {
    pub fn new(script_path: &str) -> Self {
        Self {
            step: StepConfig {
                script_path: script_path.to_string(),
                ..StepConfig::default()
            },
        }
    }

    pub fn script_process(mut self, name: &str) -> Self {
        self.step.script_process_name = Some(name.to_string());
        self
    }

    pub fn game_process(mut self, name: &str) -> Self {
        self.step.game_process_name = Some(name.to_string());
        self
    }

    pub fn display_name(mut self, name: &str) -> Self {
        self.step.script_display_name = Some(name.to_string());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.step.run_timeout_seconds = secs;
        self
    }

    pub fn check_done(mut self, policy: CompletionPolicy) -> Self {
        self.step.check_done = policy;
        self
    }

    pub fn kill_script_after_done(mut self, val: bool) -> Self {
        self.step.kill_script_after_done = val;
        self
    }

    pub fn kill_game_after_done(mut self, val: bool) -> Self {
        self.step.kill_game_after_done = val;
        self
    }

    pub fn arguments(mut self, args: &str) -> Self {
        self.step.script_arguments = args.to_string();
        self
    }

    pub fn notify_start(mut self, val: bool) -> Self {
        self.step.notify_start = val;
        self
    }

    pub fn notify_done(mut self, val: bool) -> Self {
        self.step.notify_done = val;
        self
    }

    pub fn build(self) -> StepConfig {
        self.step
    }
}
