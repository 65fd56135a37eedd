//! WARDEN Policy Condition Engine: demo CLI
//!
//! Runs one or all of the demo scenarios against in-memory collaborators.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- admit --file demo/policies/zero-trust.toml
//!   cargo run -p demo -- log-receivers
//!   cargo run -p demo -- port-drift
//!   cargo run -p demo -- condition-drift

mod scenarios;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use warden_contracts::error::WardenResult;

// ── CLI definition ────────────────────────────────────────────────────────────

/// WARDEN: policy condition validation and reconciliation demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "WARDEN policy condition engine demo",
    long_about = "Runs WARDEN demo scenarios showing condition validation, container\n\
                  resolution, rule admission, and drift-free reconciliation."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every scenario on the built-in rule set.
    RunAll,
    /// Admit the policy rules of a rule document.
    Admit {
        /// TOML or JSON rule document. Defaults to the built-in rule set.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Admit the log receivers of a rule document.
    LogReceivers {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Port ranges declared in a different order or encoding.
    PortDrift,
    /// Condition sets returned in a different order.
    ConditionDrift,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for per-operand output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::Admit { file } => scenarios::run_admit_rules(file.as_deref()),
        Command::LogReceivers { file } => scenarios::run_log_receivers(file.as_deref()),
        Command::PortDrift => scenarios::run_port_drift(),
        Command::ConditionDrift => scenarios::run_condition_drift(),
    };

    match result {
        Ok(()) => {
            info!("demo finished");
            println!("All selected scenarios completed.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_all() -> WardenResult<()> {
    scenarios::run_admit_rules(None)?;
    scenarios::run_log_receivers(None)?;
    scenarios::run_port_drift()?;
    scenarios::run_condition_drift()?;
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("WARDEN: Policy Condition Validation & Reconciliation");
    println!("=====================================================");
    println!();
    println!("Admission pipeline per rule:");
    println!("  [1] Resolve the one live container for (category, tenant scope)");
    println!("  [2] Validate every condition operand against the object-type table");
    println!("  [3] Resolve by-name references through the entity lookup");
    println!("  [4] Hand the resolved rule to the writer, only if nothing failed");
    println!();
}
