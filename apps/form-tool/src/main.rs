//! CLI tool for form schema management, record submission and category maintenance.
//!
//! Every invocation loads the snapshot from `--data-dir`, runs one operation
//! (mutations inside a single transaction) and saves the snapshot back when
//! something changed. Results go to stdout as JSON, logs go to stderr.

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let output = commands::run(cli)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
