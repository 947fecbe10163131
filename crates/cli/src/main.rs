use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::{AppConfig, StoreKind};
use netrag_protocol::{ChatMode, DEFAULT_SEARCH_LIMIT};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod config;
mod http_api;
mod services;

#[derive(Parser)]
#[command(name = "netrag")]
#[command(about = "Retrieval-augmented assistant for network configurations", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print machine-readable JSON to stdout
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file (overrides NETRAG_CONFIG and ./netrag.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Vector store backend
    #[arg(long, global = true, value_enum)]
    store: Option<StoreKind>,

    /// Snapshot directory for the memory store
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Collection name
    #[arg(long, global = true)]
    collection: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk and store a file or every supported file under a directory
    Ingest(IngestArgs),

    /// Similarity search over stored chunks
    Search(SearchArgs),

    /// General, error-pattern and best-practice pools in one query
    #[command(name = "enhanced-search")]
    EnhancedSearch(EnhancedSearchArgs),

    /// List stored documents reassembled from their chunks
    List,

    /// Delete every chunk stored under a filename
    Delete(DeleteArgs),

    /// Collection statistics
    Stats,

    /// Completion server, vector store and collection status
    Status,

    /// Available chunking strategies
    Strategies,

    /// Upload the built-in knowledge libraries into the collection
    #[command(name = "load-libraries")]
    LoadLibraries,

    /// Query the built-in knowledge libraries without the vector store
    #[command(subcommand)]
    Knowledge(KnowledgeCommand),

    /// Ask the assistant
    Ask(AskArgs),

    /// Serve the JSON API over HTTP
    Serve(ServeArgs),
}

#[derive(Args)]
struct IngestArgs {
    /// File or directory
    path: PathBuf,

    /// Document category (general, error_patterns, best_practices, ...)
    #[arg(long, default_value = "general")]
    category: String,

    /// `auto`, a strategy name, or a free-form tag
    #[arg(long, default_value = "auto")]
    strategy: String,
}

#[derive(Args)]
struct SearchArgs {
    query: String,

    #[arg(short, long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    limit: usize,

    /// Restrict to one category
    #[arg(long)]
    category: Option<String>,
}

#[derive(Args)]
struct EnhancedSearchArgs {
    query: String,

    #[arg(short, long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    limit: usize,
}

#[derive(Args)]
struct DeleteArgs {
    filename: String,
}

#[derive(Subcommand)]
enum KnowledgeCommand {
    /// Keyword search across all libraries
    Search {
        query: String,
        /// Restrict error patterns and best practices to one category
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one error pattern
    Error { id: String },
    /// Show one best practice
    Practice { id: String },
    /// Show one protocol
    Protocol { id: String },
    /// Error patterns of one severity (low, medium, high, critical)
    Severity { level: String },
    /// Severe error patterns, best practices and protocols matching a snippet
    Validate { config: String },
    /// Library totals and severity distribution
    Stats,
}

#[derive(Args)]
struct AskArgs {
    prompt: String,

    #[arg(long, value_enum, default_value = "direct")]
    mode: CliChatMode,

    /// Completion model override
    #[arg(long)]
    model: Option<String>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CliChatMode {
    Direct,
    Document,
    Agent,
}

impl From<CliChatMode> for ChatMode {
    fn from(mode: CliChatMode) -> Self {
        match mode {
            CliChatMode::Direct => ChatMode::Direct,
            CliChatMode::Document => ChatMode::Document,
            CliChatMode::Agent => ChatMode::Agent,
        }
    }
}

#[derive(Args)]
struct ServeArgs {
    /// Address to bind (overrides config)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet || cli.json {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(store) = cli.store {
        config.store = store;
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(collection) = &cli.collection {
        config.collection = collection.clone();
    }

    let output = commands::Output { json: cli.json };
    let ok = match cli.command {
        Commands::Knowledge(command) => commands::knowledge(command, output)?,
        Commands::Strategies => commands::strategies(output)?,
        Commands::Serve(args) => {
            if let Some(bind) = args.bind {
                config.bind = bind;
            }
            let services = services::AppServices::build(&config).await?;
            http_api::serve(std::sync::Arc::new(services), &config.bind).await?;
            true
        }
        Commands::Ask(args) => {
            if let Some(model) = args.model {
                config.ollama.model = model;
            }
            let services = services::AppServices::build(&config).await?;
            commands::ask(&services, &args.prompt, args.mode.into(), output).await?
        }
        command => {
            let services = services::AppServices::build(&config).await?;
            commands::run(&services, command, output).await?
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
