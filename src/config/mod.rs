// src/config/mod.rs

//! Chain configuration for scriptchain.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Read and write chain files (`loader.rs`).
//! - Step validity and chain name rules (`validate.rs`).
//! - A directory of chains keyed by name (`store.rs`).

pub mod loader;
pub mod model;
pub mod store;
pub mod validate;

pub use loader::{default_config_dir, load_from_path, write_to_path};
pub use model::{ChainConfig, StepConfig};
pub use store::ChainStore;
pub use validate::{validate_chain_name, InvalidStep, ACCEPTED_EXTENSIONS};
