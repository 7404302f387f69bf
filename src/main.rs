use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use graph::{Direction, EngineConfig, GraphEngine, HighlightState, MergeOutcome, MergeRequest, NormalizedGraph};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "gitgraph")]
#[command(about = "Turn repository graph payloads into drawable branch graphs", long_about = None)]
struct Cli {
    /// Engine config (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render both views of a payload
    Render {
        /// Payload JSON file
        payload: PathBuf,
    },
    /// List the commits a pull or push would move
    Transfer {
        /// Payload JSON file
        payload: PathBuf,
        /// Branch name
        #[arg(short, long)]
        branch: String,
        /// pull or push
        #[arg(short, long, default_value = "push")]
        direction: Direction,
    },
    /// Render with the highlight a merge would leave behind
    MergePreview {
        /// Payload JSON file
        payload: PathBuf,
        /// Branch merged in
        #[arg(long)]
        source: String,
        /// Branch merged into
        #[arg(long, default_value = "main")]
        target: String,
        /// Hash of the merge commit
        #[arg(long)]
        commit: Option<String>,
        /// The merge was a fast-forward
        #[arg(long)]
        fast_forward: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let engine = GraphEngine::new(config);

    match cli.command {
        Commands::Render { payload } => {
            let graph = load_payload(&payload, engine.config())?;
            emit(&engine.render(&graph, None), cli.pretty)?;
        }
        Commands::Transfer { payload, branch, direction } => {
            let graph = load_payload(&payload, engine.config())?;
            let transfer = engine.transfer(&graph, &branch, direction);
            debug!(commits = transfer.commits.len(), files = transfer.files.len(), "transfer computed");
            emit(&transfer, cli.pretty)?;
        }
        Commands::MergePreview { payload, source, target, commit, fast_forward } => {
            let graph = load_payload(&payload, engine.config())?;
            let outcome = MergeOutcome {
                fast_forward,
                merge_commit_hash: commit,
                has_conflict: false,
            };
            let highlight = HighlightState::from_merge(&MergeRequest::new(source, target), &outcome, chrono::Utc::now());
            emit(&engine.render(&graph, highlight.as_ref()), cli.pretty)?;
        }
    }

    Ok(())
}

fn load_payload(path: &Path, config: &EngineConfig) -> Result<NormalizedGraph> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read payload {}", path.display()))?;
    graph::ingest::normalize_str(&raw, config)
        .with_context(|| format!("Failed to parse payload {}", path.display()))
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}
