//! Resolves a question against the built-in catalog and runs it on BigQuery.
//!
//! ```sh
//! BIGQUERY_PROJECT_ID=my-project cargo run -p slotql --features bigquery --example query -- "How many customers do we have?"
//! ```

use anyhow::{bail, Context};
use dotenvy::dotenv;
use slotql::{render::render_failure, BigQueryProvider, QueryEngine, QueryExecutor};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    dotenv().ok();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("Usage: {} '<question>'", args[0]);
    }
    let project_id =
        env::var("BIGQUERY_PROJECT_ID").context("BIGQUERY_PROJECT_ID environment variable not set")?;

    let engine = QueryEngine::with_defaults()?;
    let resolution = engine.resolve(&args[1]);
    if let Some(message) = render_failure(&resolution) {
        println!("{message}");
        return Ok(());
    }

    let storage = BigQueryProvider::new(project_id).await?;
    let executor = QueryExecutor::new(Arc::new(storage));
    let output = executor.run(&resolution).await?;

    println!("--- Generated SQL ---");
    println!("{}", output.sql);
    println!("\n--- Result ---");
    println!("{}", output.rendered);

    Ok(())
}
