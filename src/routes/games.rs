use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
};
use serde::Deserialize;
use crate::dataset::DatasetSource;
use crate::error::ApiError;
use crate::models::{GameRecord, SeasonSummary};
use crate::stats;

const MIN_LIMIT: i64 = 1;
const MAX_LIMIT: i64 = 100;

// Query parameters for the game list
#[derive(Deserialize)]
pub struct GamesQuery {
    /// Number of most recent games to return (default: 20, range 1-100)
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    20
}

// Query parameters for season averages
#[derive(Deserialize)]
pub struct SeasonQuery {
    /// Label echoed back in the response; the dataset is not filtered by it
    #[serde(default = "default_season")]
    season: String,
}

fn default_season() -> String {
    "2024-25".to_string()
}

fn validate_limit(limit: i64) -> Result<usize, ApiError> {
    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::Validation(format!(
            "limit must be between {} and {}, got {}",
            MIN_LIMIT, MAX_LIMIT, limit
        )));
    }
    Ok(limit as usize)
}

/// Newest first. Dates are zero-padded ISO strings, so string order is date order.
pub fn most_recent(mut games: Vec<GameRecord>, limit: usize) -> Vec<GameRecord> {
    games.sort_by(|a, b| b.line.date.cmp(&a.line.date));
    games.truncate(limit);
    games
}

// GET /hachimura/games?limit=20 - Most recent games with shooting efficiency
pub async fn get_games(
    State(dataset): State<DatasetSource>,
    query: Result<Query<GamesQuery>, QueryRejection>,
) -> Result<Json<Vec<GameRecord>>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    let limit = validate_limit(params.limit)?;

    let games = dataset.load_games().await?;

    Ok(Json(most_recent(games, limit)))
}

// GET /hachimura/season-avg?season=2024-25 - Season averages
pub async fn get_season_avg(
    State(dataset): State<DatasetSource>,
    Query(params): Query<SeasonQuery>,
) -> Result<Json<SeasonSummary>, ApiError> {
    let games = dataset.load_games().await?;

    Ok(Json(stats::season_summary(&params.season, &games)))
}
