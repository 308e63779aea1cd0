//! Binary entry point for triplerag.
//!
//! This binary provides the CLI interface for indexing text into a local
//! triple-store graph and asking questions about it.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use triplerag::config::TripleragConfig;
use triplerag::demo;
use triplerag::llm::build_provider;
use triplerag::models::{Document, ExtractionSchema};
use triplerag::observability::{self, LoggingConfig};
use triplerag::services::QueryEngine;
use triplerag::storage::{PropertyGraphStore, TripleBackend, TripleGraphStore};

/// Triplerag - question answering over an embedded triple-store knowledge graph.
#[derive(Parser)]
#[command(name = "triplerag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Graph name (overrides config).
    #[arg(short, long, global = true)]
    graph: Option<String>,

    /// Data directory (overrides config).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Index the Zephyr-7 lore and ask the demo question.
    Demo,

    /// Index a text file.
    Ingest {
        /// File to index.
        file: PathBuf,

        /// Allowed entity labels (comma-separated; default: demo vocabulary).
        #[arg(long, value_delimiter = ',')]
        entities: Vec<String>,

        /// Allowed relation labels (comma-separated; default: demo vocabulary).
        #[arg(long, value_delimiter = ',')]
        relations: Vec<String>,

        /// Keep triplets whose labels are outside the vocabulary.
        #[arg(long)]
        lenient: bool,
    },

    /// Ask a question about the indexed graph.
    Query {
        /// The question.
        question: String,
    },

    /// Print the outgoing edges of a subject.
    Triples {
        /// Subject to look up.
        subject: String,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Insert one raw triple.
    Put {
        /// Subject.
        subject: String,
        /// Predicate.
        predicate: String,
        /// Object.
        object: String,
    },
}

/// Output format for `triples`.
#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One `s -> p -> o` line per triple.
    Text,
    /// A JSON array of `[s, p, o]` arrays.
    Json,
}

fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(LoggingConfig::from_settings(&config.logging, cli.verbose))
    {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Loads configuration and applies CLI overrides.
fn load_config(cli: &Cli) -> triplerag::Result<TripleragConfig> {
    let mut config = TripleragConfig::load(cli.config.as_deref())?;
    if let Some(ref graph) = cli.graph {
        config.graph_name.clone_from(graph);
    }
    if let Some(ref data_dir) = cli.data_dir {
        config.data_dir.clone_from(data_dir);
    }
    Ok(config)
}

/// Runs the selected command.
fn run_command(command: Commands, config: &TripleragConfig) -> anyhow::Result<()> {
    match command {
        Commands::Demo => cmd_demo(config),
        Commands::Ingest {
            file,
            entities,
            relations,
            lenient,
        } => cmd_ingest(config, file, entities, relations, lenient),
        Commands::Query { question } => cmd_query(config, &question),
        Commands::Triples { subject, format } => cmd_triples(config, &subject, format),
        Commands::Put {
            subject,
            predicate,
            object,
        } => cmd_put(config, &subject, &predicate, &object),
    }
}

fn open_store(config: &TripleragConfig) -> anyhow::Result<TripleGraphStore> {
    TripleGraphStore::open(&config.data_dir, &config.graph_name).with_context(|| {
        format!(
            "opening graph '{}' in {}",
            config.graph_name,
            config.data_dir.display()
        )
    })
}

fn cmd_demo(config: &TripleragConfig) -> anyhow::Result<()> {
    let llm = build_provider(&config.llm)?;
    let response = demo::run(config, llm)?;
    println!("\n--- AI RESPONSE ---\n{response}");
    Ok(())
}

fn cmd_ingest(
    config: &TripleragConfig,
    file: PathBuf,
    entities: Vec<String>,
    relations: Vec<String>,
    lenient: bool,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&file)
        .with_context(|| format!("reading {}", file.display()))?;

    let defaults = demo::schema();
    let schema = ExtractionSchema::new(
        if entities.is_empty() {
            defaults.possible_entities
        } else {
            entities
        },
        if relations.is_empty() {
            defaults.possible_relations
        } else {
            relations
        },
    );
    let mut settings = config.extraction.clone();
    if lenient {
        settings.strict = false;
    }

    let llm = build_provider(&config.llm)?;
    let index = demo::build_index(open_store(config)?, llm, schema, &settings)?;
    let document = Document::new(text).with_metadata("source", file.display().to_string());
    let stats = index.insert(&document)?;

    println!(
        "Indexed {} into '{}': {} chunks, {} nodes, {} relations",
        file.display(),
        config.graph_name,
        stats.chunks,
        stats.nodes,
        stats.relations
    );
    Ok(())
}

fn cmd_query(config: &TripleragConfig, question: &str) -> anyhow::Result<()> {
    let llm = build_provider(&config.llm)?;
    let engine = QueryEngine::new(open_store(config)?, llm, config.retrieval.into());
    let response = engine.query(question)?;
    println!("{response}");
    Ok(())
}

fn cmd_triples(
    config: &TripleragConfig,
    subject: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let triples = open_store(config)?.get(subject)?;
    match format {
        OutputFormat::Text => {
            for triple in &triples {
                println!("{triple}");
            }
        },
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&triples)?),
    }
    Ok(())
}

fn cmd_put(
    config: &TripleragConfig,
    subject: &str,
    predicate: &str,
    object: &str,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    store.backend().put(subject, predicate, object)?;
    println!("{subject} -> {predicate} -> {object}");
    Ok(())
}
