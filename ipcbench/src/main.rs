//! `ipcbench` binary.
//!
//! Run with: `cargo run --release -p ipcbench`
//!
//! Logs go to stderr and are controlled with `RUST_LOG` (default `warn`).

use clap::Parser;
use ipcbench::{Cli, Outcome, Runner};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = Cli::parse().into_config();
    tracing::debug!("Starting run with {:?}", config);

    match Runner::new(config).run() {
        Ok(Outcome::Parent(summary)) => {
            tracing::info!(
                "Child {} done, verdict: {}",
                summary.child_pid,
                summary.comparison().verdict()
            );
            ExitCode::SUCCESS
        }
        Ok(Outcome::Child) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Run failed: {:?}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
