//! vfx-rs library
//!
//! Command implementations behind the `vfx-rs` binary: loading particle
//! definitions from JSON or YAML, validating them and running headless
//! simulations.

pub mod cli;
pub mod commands;
pub mod loader;
pub mod utils;
