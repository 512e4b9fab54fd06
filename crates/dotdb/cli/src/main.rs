// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! DotDB CLI Tool
//!
//! Inspects how the statement compiler classifies serialized plans and
//! statements, using the same configuration the server would.

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotdb_compiler::ast::Statement;
use dotdb_compiler::plan::Plan;
use dotdb_compiler::{CompilerConfig, ExpensiveLevel, IGNORE_LABEL, global_config, query_expensive_level, statement_label, store_global_config};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info};

/// Exit code for a plan the compiler would refuse to run.
const EXIT_REJECTED: i32 = 2;

#[derive(Parser)]
#[command(name = "dotdb")]
#[command(about = "DotDB - statement compiler inspection CLI")]
#[command(version = "0.1.0")]
struct Cli {
    /// Compiler config file (defaults to $DOTDB_CONFIG, then built-in defaults)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the cost of a JSON-serialized plan
    Cost {
        /// Path to the plan JSON
        plan: PathBuf,
    },
    /// Print the counter label of a JSON-serialized statement
    Label {
        /// Path to the statement JSON
        statement: PathBuf,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match CompilerConfig::resolve(cli.config) {
        Ok(config) => store_global_config(config),
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    }
    let config = global_config();

    let result = match cli.command {
        Commands::Cost { plan } => handle_cost(&config, &plan),
        Commands::Label { statement } => handle_label(&statement),
        Commands::Config => handle_config(&config),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("Command failed: {:#}", e);
            process::exit(1);
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn handle_cost(config: &CompilerConfig, path: &Path) -> anyhow::Result<i32> {
    let plan: Plan = read_json(path)?;
    let thresholds = config.thresholds();
    let level = query_expensive_level(&plan, &thresholds);

    println!("Expensive level: {level}");
    let cutoff = if thresholds.hard_cutoff_enabled() {
        format!("> {} rows", thresholds.too_expensive_rows)
    } else {
        "disabled".to_string()
    };
    println!("Thresholds: expensive > {} rows, too expensive {}", thresholds.expensive_rows, cutoff);
    info!("Classified plan {} as {}", path.display(), level);

    if level >= ExpensiveLevel::TooExpensive {
        println!("Compilation would be rejected: expensive to execute");
        return Ok(EXIT_REJECTED);
    }
    Ok(0)
}

fn handle_label(path: &Path) -> anyhow::Result<i32> {
    let stmt: Statement = read_json(path)?;
    let label = statement_label(&stmt);

    if label == IGNORE_LABEL {
        println!("Not counted ({label})");
    } else {
        println!("{label}");
    }
    info!("Labelled statement {} as {}", path.display(), label);
    Ok(0)
}

fn handle_config(config: &CompilerConfig) -> anyhow::Result<i32> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(0)
}
