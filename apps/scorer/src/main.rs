use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scorer::config::Config;
use scorer::models::{Level, ResumeDocument, ScoringContext};
use scorer::AppState;

/// Score a parsed résumé (JSON) against a target role.
#[derive(Debug, Parser)]
#[command(name = "scorer", version, about)]
struct Args {
    /// Path to the résumé JSON produced by the parser
    #[arg(long)]
    resume: PathBuf,

    /// Target role id, e.g. software_engineer
    #[arg(long)]
    role: String,

    /// Experience level: beginner, intermediary or senior (synonyms accepted)
    #[arg(long, default_value = "intermediary")]
    level: String,

    /// Optional plain-text job description; its keyphrases join the required keywords
    #[arg(long)]
    job_description: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting scorer v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::from_config(config)?;

    // Warm the provider while inputs are read; scoring falls back to lexical if it is slow.
    let provider = state.provider.clone();
    let warm_up = tokio::spawn(async move { provider.warm_up().await });

    let resume = read_resume(&args.resume)?;
    let mut context = ScoringContext::new(args.role, Level::parse_lenient(&args.level));
    if let Some(path) = &args.job_description {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job description {}", path.display()))?;
        context = context.with_job_description(text);
    }

    match warm_up.await {
        Ok(true) => info!("Similarity backend ready"),
        Ok(false) => warn!("Similarity backend unavailable; using lexical fallback"),
        Err(e) => warn!("Warm-up task failed: {e}"),
    }

    let report = state.orchestrator.score(&resume, &context).await;
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    Ok(())
}

fn read_resume(path: &Path) -> Result<ResumeDocument> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read résumé {}", path.display()))?;
    ResumeDocument::from_json(&raw)
        .with_context(|| format!("{} is not a valid résumé document", path.display()))
}
