//! docbot-server entry point.
//!
//! Two subcommands:
//! - `docbot-server serve` (default) - run the websocket chatbot server
//! - `docbot-server ingest` - rebuild the vector index from the corpus

use std::sync::Arc;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docbot::{
    config::Config,
    db::DiskVectorStore,
    ingest::ingest_corpus,
    llm::GroqClient,
    rag::build_embedder,
    types::{AppError, Result},
    AppState,
};

#[derive(Parser)]
#[command(name = "docbot-server")]
#[command(
    author,
    version,
    about = "Retrieval-augmented documentation chatbot server"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the websocket chatbot server (default)
    Serve,
    /// Rebuild the vector index from the document corpus
    Ingest {
        /// Corpus directory to ingest (overrides DATA_PATH)
        #[arg(long)]
        data_path: Option<String>,

        /// Index directory to write (overrides INDEX_PATH)
        #[arg(long)]
        index_path: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docbot=info,docbot_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env()?;

    match Cli::parse().command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Ingest {
            data_path,
            index_path,
        } => {
            if let Some(data_path) = data_path {
                config.rag.data_path = data_path;
            }
            if let Some(index_path) = index_path {
                config.rag.index_path = index_path;
            }
            ingest(config).await
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    // Fail fast: the query path is useless without a key.
    let api_key = config.require_groq_api_key()?.to_string();

    let embedder = build_embedder(&config.embedding)?;
    let store = Arc::new(DiskVectorStore::new(&config.rag.index_path));
    let llm = Arc::new(GroqClient::new(
        api_key,
        config.llm.api_base.clone(),
        config.llm.model.clone(),
    ));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(
        model = %config.llm.model,
        embedder = embedder.provider_name(),
        index = %config.rag.index_path,
        "Starting server"
    );

    let state = AppState::new(config, embedder, store, llm);
    let app = docbot::app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("failed to bind {}: {}", addr, e)))?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(format!("server error: {}", e)))
}

async fn ingest(config: Config) -> Result<()> {
    let embedder = build_embedder(&config.embedding)?;
    let store = Arc::new(DiskVectorStore::new(&config.rag.index_path));

    info!(
        corpus = %config.rag.data_path,
        index = %config.rag.index_path,
        embedder = embedder.provider_name(),
        "Starting ingestion (replaces any existing index)"
    );

    let (documents, chunks) = ingest_corpus(&config.rag, embedder, store).await?;

    println!(
        "{} indexed {} chunks from {} documents into {}",
        "Done:".green().bold(),
        chunks,
        documents,
        config.rag.index_path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_accepts_path_overrides() {
        let cli = Cli::try_parse_from([
            "docbot-server",
            "ingest",
            "--data-path",
            "corpus/aptos",
            "--index-path",
            "/tmp/index",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Ingest {
                data_path,
                index_path,
            }) => {
                assert_eq!(data_path.as_deref(), Some("corpus/aptos"));
                assert_eq!(index_path.as_deref(), Some("/tmp/index"));
            }
            _ => panic!("expected ingest subcommand"),
        }
    }

    #[test]
    fn test_no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["docbot-server"]).unwrap();
        assert!(matches!(
            cli.command.unwrap_or(Commands::Serve),
            Commands::Serve
        ));
    }
}
