use axum::{routing::get, Router};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use axum::http::HeaderValue;

use crate::dataset::DatasetSource;

pub mod games;
pub mod health;

/// Build the full application router.
///
/// CORS admits a single origin with credentials, mirroring whatever methods
/// and headers the preflight asks for.
pub fn app(dataset: DatasetSource, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    Router::new()
        // Root and health
        .route("/", get(|| async { "Hachimura Stats API - v0.1" }))
        .route("/health", get(health::health_check))

        // Player endpoints
        .route("/hachimura/games", get(games::get_games))
        .route("/hachimura/season-avg", get(games::get_season_avg))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(dataset)
}
