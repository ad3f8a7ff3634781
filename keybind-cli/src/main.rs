//! keybind: inspect and manage the device-bound license session.
//!
//! Usage:
//!   keybind fingerprint
//!   keybind --keystore passphrase --passphrase ... status
//!   keybind login --license-key KEY --session-token TOKEN --expires-in 3600

use anyhow::Result;
use clap::Parser;
use keybind_cli::{run, Cli};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut stdout = std::io::stdout().lock();
    run(&cli, &mut stdout)
}
