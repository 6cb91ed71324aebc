use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use quill::app::{self, AppState};
use quill::config::{AppConfig, StorageBackend};
use quill::db::repository::{ArticleRepository, MemoryArticleRepository, MongoArticleRepository};

#[derive(Debug, Parser)]
#[command(name = "quill", version, about = "Personal article manager")]
struct Args {
    /// Path to a configuration file (TOML, YAML or JSON).
    #[arg(short, long, env = "QUILL_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .init();

    tracing::info!("Starting Quill server...");

    let article_repo: Arc<dyn ArticleRepository> = match config.storage {
        StorageBackend::Mongodb => {
            let mongo_client = mongodb::Client::with_uri_str(&config.mongodb_uri)
                .await
                .context("Failed to connect to MongoDB")?;
            let mongo_db = mongo_client.database(&config.mongodb_database);
            let repo = MongoArticleRepository::new(&mongo_db);
            repo.ensure_indexes()
                .await
                .context("Failed to create MongoDB indexes")?;

            tracing::info!("Connected to MongoDB database '{}'", config.mongodb_database);
            Arc::new(repo)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, articles will be lost on shutdown");
            Arc::new(MemoryArticleRepository::new())
        }
    };

    let state = AppState::from_config(article_repo, &config)?;
    let router = app::router(state);

    tracing::info!("Listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    axum::serve(listener, router.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}
