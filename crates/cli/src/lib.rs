//! Library interface for the ragscope CLI
//!
//! Command implementations live here so integration tests can drive them
//! without spawning the binary; main.rs only parses arguments.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod commands;
pub mod progress;
pub mod search;

pub use anyhow::Result;
pub use commands::{run_compare, run_evaluate, run_search, SearchOptions};
pub use ragscope_core::config::Config;
