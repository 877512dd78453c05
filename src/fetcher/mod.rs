//! Offline season fetcher.
//!
//! Resolves a player against an upstream stats provider, pages through that
//! player's per-game stat lines for one season, merges duplicate lines per
//! game and writes the dataset file the API serves.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::config::{FetchConfig, ProviderKind};
use crate::models::GameLine;

pub mod aggregate;
pub mod api_sports;
pub mod balldontlie;
pub mod client;
pub mod error;

pub use aggregate::{aggregate_games, StatLine};
pub use error::FetchError;

/// A player returned by a provider's search endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCandidate {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl PlayerCandidate {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// A provider that can supply one player's per-game lines for a season
#[async_trait]
pub trait SeasonDataSource: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Search players by a single term
    async fn search_players(&self, term: &str) -> Result<Vec<PlayerCandidate>, FetchError>;

    /// Every stat line the provider has for the player in `season`
    async fn season_stat_lines(&self, player_id: i64, season: u16) -> Result<Vec<StatLine>, FetchError>;

    /// Search by surname only and pick the best candidate for `full_name`
    async fn find_player(&self, full_name: &str) -> Result<PlayerCandidate, FetchError> {
        let surname = full_name.split_whitespace().last().unwrap_or(full_name);
        let candidates = self.search_players(surname).await?;
        info!("{} returned {} candidates for {:?}", self.name(), candidates.len(), surname);

        pick_player(full_name, candidates)
    }
}

/// Pick the exact (case-insensitive) full-name match, else the first candidate
pub fn pick_player(full_name: &str, candidates: Vec<PlayerCandidate>) -> Result<PlayerCandidate, FetchError> {
    let wanted = full_name.trim().to_lowercase();

    if let Some(exact) = candidates.iter().find(|p| p.full_name().to_lowercase() == wanted) {
        return Ok(exact.clone());
    }

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::PlayerNotFound {
            name: full_name.to_string(),
        })
}

/// Build the configured provider
pub fn source_for(config: &FetchConfig) -> Result<Box<dyn SeasonDataSource>, FetchError> {
    let source: Box<dyn SeasonDataSource> = match config.provider {
        ProviderKind::BallDontLie => Box::new(balldontlie::BallDontLie::new(
            &config.api_base,
            &config.api_key,
            config.retry,
        )?),
        ProviderKind::ApiSports => Box::new(api_sports::ApiSports::new(
            &config.api_base,
            &config.api_key,
            config.retry,
        )?),
    };
    Ok(source)
}

/// Write games as pretty JSON via a temp file and rename
pub async fn write_games(path: &Path, games: &[GameLine]) -> Result<(), FetchError> {
    let io_err = |source: std::io::Error| FetchError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
    }

    let json = serde_json::to_string_pretty(games)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;

    Ok(())
}

/// Fetch one season and write it to `config.out_path`, returning the game count
pub async fn run(config: &FetchConfig) -> Result<usize, FetchError> {
    let source = source_for(config)?;
    run_with(source.as_ref(), config).await
}

pub async fn run_with(source: &dyn SeasonDataSource, config: &FetchConfig) -> Result<usize, FetchError> {
    let player = source.find_player(&config.player_name).await?;
    info!("Using player {} (id {})", player.full_name(), player.id);

    let lines = source.season_stat_lines(player.id, config.season).await?;
    info!("Fetched {} stat lines for season {}", lines.len(), config.season);

    let games = aggregate_games(lines);
    write_games(&config.out_path, &games).await?;

    Ok(games.len())
}
