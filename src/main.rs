use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studyplan::config::AppConfig;
use studyplan::document::DocumentReader;
use studyplan::extraction::{ChatCompletionClient, TopicExtractor};
use studyplan::{AppState, db, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::new_from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "studyplan=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = db::connect(&config.database_url).await?;

    if config.extraction.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; topic extraction requests will fail");
    }
    let provider = ChatCompletionClient::new(config.extraction.clone())?;

    let state = AppState {
        db: pool,
        documents: Arc::new(DocumentReader::new()),
        extractor: Arc::new(TopicExtractor::new(Arc::new(provider))),
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
