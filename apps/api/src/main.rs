mod config;
mod errors;
mod llm_client;
mod loans;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::loans::interpreter::interpreter_for;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing GEMINI_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AgriLoan API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the Gemini client
    let model = Arc::new(GeminiClient::new(config.gemini_api_key.clone()));
    info!("Gemini client initialized (model: {})", llm_client::MODEL);

    // Strategy selection happens once here; handlers never branch on it again
    let interpreter = interpreter_for(config.response_format);
    info!("Response interpreter: {:?}", config.response_format);

    let state = AppState {
        model,
        interpreter,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
