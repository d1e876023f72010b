//! Root CLI structure for vfx-rs

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::commands::simulate::SimulateArgs;

#[derive(Parser)]
#[command(name = "vfx-rs")]
#[command(about = "Command-line tools for particle effect definitions", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display a summary of a particle definition
    Info {
        /// Path to the definition (.json, .yaml or .yml)
        file: PathBuf,

        /// Also dump every field
        #[arg(short, long)]
        detailed: bool,
    },

    /// Check a particle definition for values the simulation cannot run with
    Validate {
        /// Path to the definition (.json, .yaml or .yml)
        file: PathBuf,
    },

    /// Run a headless simulation of one effect instance
    Simulate(SimulateArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
