//! Curator CLI - search, filter and curate academic articles from the terminal.

mod commands;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use curator_common::{CitationFormat, SynthesisKind, SynthesisSize};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "curator")]
#[command(about = "Curadoria de resultados de busca academica", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Filter flags shared by commands that print a result list
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Kind badge (revisao, ensaio, artigo)
    #[arg(long)]
    pub kind: Option<String>,

    /// Only open-access articles
    #[arg(long, conflicts_with = "closed")]
    pub open_access: bool,

    /// Only closed-access articles
    #[arg(long)]
    pub closed: bool,

    /// Journal substring
    #[arg(long)]
    pub journal: Option<String>,

    /// Author substring
    #[arg(long)]
    pub author: Option<String>,

    #[arg(long)]
    pub year_min: Option<i32>,

    #[arg(long)]
    pub year_max: Option<i32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a search and print the visible articles
    Search {
        query: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Search, then let the AI select articles for an instruction
    Recommend {
        query: String,

        #[arg(long)]
        instruction: String,
    },

    /// Search, save the given ids and synthesize them
    Synthesize {
        query: String,

        /// Comma-separated article ids (at least two)
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<u64>,

        #[arg(long, default_value = "comparative")]
        kind: SynthesisKind,

        #[arg(long, default_value = "medium")]
        size: SynthesisSize,
    },

    /// Search and export the references
    Export {
        query: String,

        #[arg(long, default_value = "apa")]
        format: CitationFormat,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Interactive session
    Repl,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = curator::Config::load(cli.config.as_deref());

    match cli.command {
        Commands::Search { query, filters } => commands::search(&config, &query, &filters).await,
        Commands::Recommend { query, instruction } => {
            commands::recommend(&config, &query, &instruction).await
        }
        Commands::Synthesize {
            query,
            ids,
            kind,
            size,
        } => commands::synthesize(&config, &query, &ids, kind, size).await,
        Commands::Export {
            query,
            format,
            filters,
        } => commands::export(&config, &query, format, &filters).await,
        Commands::Repl => commands::repl(&config).await,
    }
}
