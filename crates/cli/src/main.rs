// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod commands;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};
use visit_ledger_persistence::{CounterMode, ErrorKind, Ledger, LedgerOptions, PersistenceError};

use crate::commands::{Command, Outcome};

/// Visit Ledger - track which users visited which places, and for how long
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` ledger file. Created if it does not exist.
    #[arg(
        short,
        long,
        env = "VISIT_LEDGER_DB",
        default_value = "visited_places.db",
        global = true
    )]
    database: PathBuf,

    /// Use a throwaway in-memory ledger instead of a file
    #[arg(long, global = true)]
    in_memory: bool,

    /// Keep visit counters exact when visits are deleted
    #[arg(long, global = true)]
    exact_counters: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    const fn ledger_options(&self) -> LedgerOptions {
        if self.exact_counters {
            LedgerOptions::with_counter_mode(CounterMode::Exact)
        } else {
            LedgerOptions::with_counter_mode(CounterMode::Cached)
        }
    }
}

/// Process exit code for a failed command.
const fn exit_code_for(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Validation => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Storage => 4,
    }
}

fn open_ledger(args: &Args) -> Result<Ledger, PersistenceError> {
    let ledger: Ledger = if args.in_memory {
        info!("Using in-memory ledger");
        Ledger::new_in_memory()?
    } else {
        info!("Using ledger file at: {}", args.database.display());
        Ledger::new_with_file(&args.database)?
    };
    Ok(ledger.with_options(args.ledger_options()))
}

fn run(args: Args) -> Result<Outcome, PersistenceError> {
    let mut ledger: Ledger = open_ledger(&args)?;
    commands::execute(&mut ledger, args.command)
}

fn main() -> ExitCode {
    let args: Args = Args::parse();

    // Diagnostics go to stderr so stdout stays clean for results.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let json: bool = args.json;
    debug!(?args, "Parsed arguments");

    match run(args) {
        Ok(outcome) => {
            if json {
                match render::render_json(&outcome) {
                    Ok(rendered) => println!("{rendered}"),
                    Err(e) => {
                        eprintln!("Failed to serialize result: {e}");
                        return ExitCode::from(exit_code_for(ErrorKind::Storage));
                    }
                }
            } else {
                print!("{}", render::render_text(&outcome));
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", render::describe_error(&err));
            ExitCode::from(exit_code_for(err.kind()))
        }
    }
}
