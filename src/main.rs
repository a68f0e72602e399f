use std::sync::Arc;

use clap::Parser;
use tower_http::cors::CorsLayer;

use dict_import::api::{self, AppState};
use dict_import::domain::ports::{DictionaryStore, JobStore};
use dict_import::utils::{logger, validation::Validate};
use dict_import::{FileDictionaryStore, FileJobStore, ImportRunner, LocalStorage, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    logger::init_logger(config.verbose);

    tracing::info!("Starting dict-import server");
    if config.verbose {
        tracing::debug!("Server config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    let storage = LocalStorage::new(&config.data_dir);
    let job_store = Arc::new(FileJobStore::open(storage.clone(), "jobs.json").await?);
    let dictionary: Arc<dyn DictionaryStore> =
        Arc::new(FileDictionaryStore::open(storage, "dictionary.json").await?);

    // Jobs a previous process left in flight are failed, not resumed.
    let recovered = job_store.recover_interrupted().await?;
    if recovered > 0 {
        tracing::warn!("Marked {} interrupted job(s) as failed", recovered);
    }
    let jobs: Arc<dyn JobStore> = job_store;

    let runner = Arc::new(ImportRunner::new(
        Arc::clone(&jobs),
        Arc::clone(&dictionary),
        &config,
    )?);

    let state = Arc::new(AppState {
        runner,
        jobs: Arc::clone(&jobs),
    });

    let app = api::routes()
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
