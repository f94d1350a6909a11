use axum::{Router, routing::get};
use clipper::{app_state::AppState, config, gateway, health};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Arc::new(config::Config::from_env().expect("Failed to load configuration"));
    let state = AppState::new(Arc::clone(&config)).expect("Failed to build scraper");

    let app = Router::new()
        .route(
            "/scrape",
            get(gateway::scrape_handler).options(gateway::preflight),
        )
        .route("/healthz", get(health::health_check))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .expect("Failed to bind to address");
    info!("listening on {}", config.bind_addr());
    axum::serve(listener, app).await.unwrap();
}
