#![doc = include_str!("../README.md")]

mod cli;

use clap::Parser;
use cli::args::Cli;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    init_tracing();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli::run::run(&args, &mut out)
}

/// Console diagnostics on stderr, filtered by `RUST_LOG`.
///
/// Reports are written to stdout by the subcommand handlers; keeping the
/// subscriber on stderr leaves `--json` output parseable.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .init();
}
