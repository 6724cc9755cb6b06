//! Defines the command-line arguments and subcommands for the casebook CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use crate::generator::DEFAULT_CASES;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "casebook",
    version,
    about = "Table-driven and randomized testing for functions over dynamic values."
)]
pub struct CasebookArgs {
    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a suite file against its target.
    Run {
        /// YAML or JSON suite with `target` and `cases`.
        #[arg(required = true)]
        suite: PathBuf,
        /// Print each case's arguments before calling.
        #[arg(long)]
        print_args: bool,
        /// Print each case's result after calling.
        #[arg(long)]
        print_res: bool,
    },
    /// Generate random argument tuples from a spec file.
    Generate {
        /// YAML or JSON list of argument specs.
        #[arg(required = true)]
        spec: PathBuf,
        #[arg(long, default_value_t = DEFAULT_CASES)]
        cases: usize,
        /// Seed for reproducible output.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Call a target with generated arguments, failing on any fault.
    Fuzz {
        /// Name of a built-in target.
        #[arg(required = true)]
        target: String,
        /// YAML or JSON list of argument specs.
        #[arg(required = true)]
        spec: PathBuf,
        #[arg(long, default_value_t = DEFAULT_CASES)]
        cases: usize,
        /// Seed for reproducible output.
        #[arg(long)]
        seed: Option<u64>,
        /// Print each case's arguments before calling.
        #[arg(long)]
        print_args: bool,
    },
    /// List the built-in targets.
    Targets,
}
