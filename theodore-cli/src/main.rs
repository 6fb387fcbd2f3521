use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use theodore_core::{Options, Orchestrator};

#[derive(Parser)]
#[command(name = "theodore", about = "Company-intelligence extraction pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the four-phase pipeline against a single seed (a name or a URL).
    Research {
        seed: String,

        #[arg(long, value_enum, default_value_t = Format::Console)]
        format: Format,

        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long)]
        concurrency: Option<usize>,
    },
}

#[derive(Copy, Clone, ValueEnum)]
enum Format {
    Console,
    Json,
    Csv,
    Fields,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("theodore=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Research {
            seed,
            format,
            output,
            concurrency,
        } => run_research(seed, format, output, concurrency).await,
    }
}

async fn run_research(
    seed: String,
    format: Format,
    output: Option<PathBuf>,
    concurrency: Option<usize>,
) -> Result<()> {
    let orchestrator = Orchestrator::from_env().context("building orchestrator")?;

    let mut options = Options::default();
    if let Some(concurrency) = concurrency {
        options = options.with_concurrency(concurrency);
    }

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for CTRL-C");
        tracing::info!("received Ctrl+C, cancelling run");
        ctrl_c_token.cancel();
    });

    info!(seed, "starting research run");

    let intelligence = orchestrator
        .research(seed, &options, cancel)
        .await
        .context("running research pipeline")?;

    let rendered = match format {
        Format::Console => render_console(&intelligence),
        Format::Json => serde_json::to_string_pretty(&intelligence)?,
        Format::Csv => render_csv(&intelligence),
        Format::Fields => render_fields(&intelligence),
    };

    match output {
        Some(path) => std::fs::write(&path, rendered).with_context(|| format!("writing output to {path:?}"))?,
        None => println!("{rendered}"),
    }

    Ok(())
}

fn render_console(intelligence: &theodore_core::CompanyIntelligence) -> String {
    let mut out = String::new();
    out.push_str(&format!("Company: {}\n", intelligence.seed.display_name));
    out.push_str(&format!("Website: {}\n", intelligence.seed.base_url));
    out.push_str(&format!(
        "Paths discovered: {} | selected: {}\n",
        intelligence.path_set.paths.len(),
        intelligence.selection.selected.len()
    ));
    out.push_str(&format!(
        "Pages extracted: {} ok ({} fallback), {} failed\n",
        intelligence.crawl.success_count, intelligence.crawl.fallback_count, intelligence.crawl.failure_count
    ));
    out.push_str(&format!(
        "Fields filled: {}/{}\n",
        intelligence.distillation.fields.len(),
        theodore_core::fields::FIELD_SCHEMA.len()
    ));
    out.push_str(&format!(
        "Elapsed: {:.1}s | cost: ${:.4} | tokens: {}\n",
        intelligence.totals.seconds, intelligence.totals.cost_usd, intelligence.totals.tokens
    ));
    for (name, value) in &intelligence.distillation.fields.values {
        out.push_str(&format!("  {name}: {value:?}\n"));
    }
    out
}

fn render_fields(intelligence: &theodore_core::CompanyIntelligence) -> String {
    intelligence
        .distillation
        .fields
        .values
        .iter()
        .map(|(name, value)| format!("{name}={value:?}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_csv(intelligence: &theodore_core::CompanyIntelligence) -> String {
    let mut out = String::from("field,value\n");
    for (name, value) in &intelligence.distillation.fields.values {
        let rendered = format!("{value:?}").replace('"', "\"\"");
        out.push_str(&format!("\"{name}\",\"{rendered}\"\n"));
    }
    out
}
