//! # `slotql` Library Crate
//!
//! Command-line access to the resolution engine: resolve a question to SQL,
//! inspect how the catalog ranks it, or browse the catalog itself.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use slotql::{render::render_failure, Catalog, EngineConfig, QueryEngine, ResolutionResult};
use std::fmt::Write;
use std::path::PathBuf;
use tracing::info;

// --- CLI Argument Structs ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub engine: EngineArgs,
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that builds an engine.
#[derive(Args, Debug, Default)]
pub struct EngineArgs {
    /// A catalog YAML file to use instead of the built-in catalog.
    #[arg(long, global = true, env = "SLOTQL_CATALOG")]
    pub catalog: Option<PathBuf>,
    /// The table bound into every `{table_ref}` slot.
    #[arg(long, global = true, env = "SLOTQL_TABLE_REF")]
    pub table_ref: Option<String>,
    /// Minimum similarity for a template to be accepted.
    #[arg(long, global = true, env = "SLOTQL_THRESHOLD")]
    pub threshold: Option<f64>,
    /// How many runner-up templates to report.
    #[arg(long, global = true)]
    pub alternatives: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a question to SQL
    Ask(AskArgs),
    /// Show how every template scores against a question
    Rank(RankArgs),
    /// List one example question per template
    Examples,
    /// List the templates in the catalog
    Templates,
}

#[derive(Parser, Debug)]
pub struct AskArgs {
    /// The natural-language question.
    pub utterance: String,
    /// Print the full resolution as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct RankArgs {
    /// The natural-language question.
    pub utterance: String,
    /// Only show the best N templates.
    #[arg(long, default_value_t = 5)]
    pub limit: usize,
}

// --- Public Entrypoint ---

/// The main entry point for the `slotql` library.
pub async fn run(cli: Cli) -> Result<()> {
    let engine = build_engine(&cli.engine)?;
    let output = match cli.command {
        Commands::Ask(args) => handle_ask(&engine, &args)?,
        Commands::Rank(args) => format_ranking(&engine, &args.utterance, args.limit),
        Commands::Examples => engine.catalog().example_queries().join("\n"),
        Commands::Templates => format_templates(engine.catalog()),
    };
    println!("{output}");
    Ok(())
}

/// Builds an engine from the built-in defaults overlaid with `args`.
pub fn build_engine(args: &EngineArgs) -> Result<QueryEngine> {
    let catalog = match &args.catalog {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::load()?,
    };

    let mut config = EngineConfig::default();
    if let Some(table_ref) = &args.table_ref {
        config.table_ref = table_ref.clone();
    }
    if let Some(threshold) = args.threshold {
        config.acceptance_threshold = threshold;
    }
    if let Some(alternatives) = args.alternatives {
        config.alternatives = alternatives;
    }

    info!(templates = catalog.len(), "Building engine.");
    QueryEngine::new(catalog, config).context("Failed to build the resolution engine")
}

// --- Command Handlers ---

fn handle_ask(engine: &QueryEngine, args: &AskArgs) -> Result<String> {
    let result = engine.resolve(&args.utterance);
    if args.json {
        return Ok(serde_json::to_string_pretty(&result)?);
    }
    Ok(format_answer(&result))
}

/// The human-readable answer to `ask`: the SQL, or why there is none.
pub fn format_answer(result: &ResolutionResult) -> String {
    match (&result.resolved_sql, &result.matched_template_id) {
        (Some(sql), Some(id)) => {
            format!("-- {id} (confidence {:.2})\n{sql}", result.confidence)
        }
        _ => render_failure(result).unwrap_or_default(),
    }
}

pub fn format_ranking(engine: &QueryEngine, utterance: &str, limit: usize) -> String {
    let threshold = engine.config().acceptance_threshold;
    let mut out = String::new();
    for scored in engine.rank(utterance).into_iter().take(limit) {
        let marker = if scored.score >= threshold { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {:.4}  {:<28} {}",
            scored.score, scored.template_id, scored.description
        );
    }
    out.trim_end().to_string()
}

pub fn format_templates(catalog: &Catalog) -> String {
    let mut out = String::new();
    for template in catalog.templates() {
        let _ = write!(out, "{}: {}", template.id, template.description);
        if !template.required_params.is_empty() {
            let required: Vec<&str> = template.required_params.iter().map(|p| p.as_str()).collect();
            let _ = write!(out, " [requires {}]", required.join(", "));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}
