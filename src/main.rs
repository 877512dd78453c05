use axum::http::HeaderValue;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hachimura_stats::config::ApiConfig;
use hachimura_stats::dataset::DatasetSource;
use hachimura_stats::routes;

#[tokio::main]
async fn main() {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting api server...");

    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()
        .expect("API configuration in environment is invalid");

    match &config.data_url {
        Some(url) => tracing::info!(
            "Serving games from {} (fallback {})",
            url,
            config.data_path.display()
        ),
        None => tracing::info!("Serving games from {}", config.data_path.display()),
    }

    let cors_origin: HeaderValue = config
        .cors_origin
        .parse()
        .expect("CORS_ORIGIN is not a valid header value");

    let addr = SocketAddr::from((config.host, config.port));
    let app = routes::app(DatasetSource::from_config(&config), cors_origin);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .expect("Failed to start server.");
}
