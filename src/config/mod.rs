// src/config/mod.rs

//! Configuration loading and validation for reusedag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate limits and build the task graph (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    ConfigFile, EdgeConfig, NodeConfig, PartitionSection, RawConfigFile, ScheduleSection,
};
