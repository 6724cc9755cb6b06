//! The casebook Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use crate::builtins::{Builtin, TargetRegistry};
use crate::cli::args::{CasebookArgs, Command};
use crate::errors::HarnessError;
use crate::generator::{ArgSpec, Generator};
use crate::output::StdoutSink;
use crate::runner::{run_tests, run_unchecked, RunOptions, RunSummary};
use crate::wire::{encode_value, load_document, SuiteFile};
use clap::Parser;
use serde_json::Value as Json;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod args;

/// The main entry point for the CLI.
pub fn run() -> ExitCode {
    let args = CasebookArgs::parse();
    init_tracing(args.verbose);

    // Dispatch to the appropriate subcommand handler.
    let result = match args.command {
        Command::Run {
            suite,
            print_args,
            print_res,
        } => handle_run(
            &suite,
            RunOptions {
                print_args,
                print_res,
            },
        ),
        Command::Generate { spec, cases, seed } => handle_generate(&spec, cases, seed),
        Command::Fuzz {
            target,
            spec,
            cases,
            seed,
            print_args,
        } => handle_fuzz(
            &target,
            &spec,
            cases,
            seed,
            RunOptions {
                print_args,
                print_res: true,
            },
        ),
        Command::Targets => {
            handle_targets();
            Ok(true)
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info,casebook=debug",
        2 => "debug,casebook=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn find_target(name: &str) -> Result<Builtin, HarnessError> {
    TargetRegistry::standard()
        .get(name)
        .copied()
        .ok_or_else(|| HarnessError::UnknownTarget {
            name: name.to_string(),
        })
}

fn make_generator(seed: Option<u64>) -> Generator {
    match seed {
        Some(seed) => Generator::from_seed(seed),
        None => Generator::from_entropy(),
    }
}

/// Handles the `run` subcommand. Returns whether every case passed.
fn handle_run(path: &Path, options: RunOptions) -> Result<bool, HarnessError> {
    let suite: SuiteFile = load_document(path)?;
    let target = find_target(&suite.target)?;
    let cases = suite.decode_cases()?;
    tracing::info!(suite = %path.display(), cases = cases.len(), "loaded suite");

    let summary = run_tests(&target, &cases, options, &mut StdoutSink::default())?;
    Ok(summary.all_passed())
}

/// Handles the `generate` subcommand: one JSON array per case.
fn handle_generate(path: &Path, cases: usize, seed: Option<u64>) -> Result<bool, HarnessError> {
    let specs: Vec<ArgSpec> = load_document(path)?;
    let generated = make_generator(seed).gen_cases(&specs, cases)?;
    for case in &generated {
        let line = Json::Array(case.iter().map(encode_value).collect());
        println!("{}", line);
    }
    Ok(true)
}

/// Handles the `fuzz` subcommand.
fn handle_fuzz(
    name: &str,
    path: &Path,
    cases: usize,
    seed: Option<u64>,
    options: RunOptions,
) -> Result<bool, HarnessError> {
    let target = find_target(name)?;
    let specs: Vec<ArgSpec> = load_document(path)?;
    let generated = make_generator(seed).gen_cases(&specs, cases)?;

    let summary: RunSummary =
        run_unchecked(&target, &generated, options, &mut StdoutSink::default())?;
    Ok(summary.all_passed())
}

/// Handles the `targets` subcommand.
fn handle_targets() {
    for builtin in TargetRegistry::standard().list() {
        println!("{:<8} {}", builtin.name, builtin.usage);
    }
}
