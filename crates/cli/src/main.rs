//! # slotql: Ask Questions, Get SQL
//!
//! A thin entrypoint; all logic lives in the `slotql_cli` library crate.

use anyhow::Result;
use clap::Parser;
use slotql_cli::{run, Cli};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so SQL on stdout stays pipeable.
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive("slotql=warn".parse()?))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("[slotql error] {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
