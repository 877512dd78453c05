use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;

use crate::config::ApiConfig;
use crate::error::DatasetError;
use crate::models::{GameLine, GameRecord};

const REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the API reads games from: an optional remote URL, then a local file
#[derive(Debug, Clone)]
pub struct DatasetSource {
    client: Client,
    data_url: Option<String>,
    data_path: PathBuf,
}

impl DatasetSource {
    pub fn new(data_url: Option<String>, data_path: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REMOTE_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            data_url,
            data_path: data_path.into(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.data_url.clone(), config.data_path.clone())
    }

    /// Load every game with derived metrics attached, in file order
    pub async fn load_games(&self) -> Result<Vec<GameRecord>, DatasetError> {
        let remote = self
            .data_url
            .as_deref()
            .map(|url| fetch_remote(&self.client, url));

        load_with_fallback(remote, &self.data_path).await
    }
}

async fn fetch_remote(client: &Client, url: &str) -> Result<String, reqwest::Error> {
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}

/// Parse the remote dataset if there is one, otherwise the local file.
///
/// Any remote failure, including content that does not parse, is logged and
/// swallowed; only a bad local file reaches the caller.
pub async fn load_with_fallback<Fut, E>(
    remote: Option<Fut>,
    local_path: &Path,
) -> Result<Vec<GameRecord>, DatasetError>
where
    Fut: Future<Output = Result<String, E>>,
    E: std::fmt::Display,
{
    if let Some(fetch) = remote {
        match fetch.await {
            Ok(raw) => match parse_games(&raw) {
                Ok(games) => return Ok(games),
                Err(e) => tracing::warn!("Remote dataset unusable, using local file: {}", e),
            },
            Err(e) => tracing::warn!("Remote dataset fetch failed, using local file: {}", e),
        }
    }

    let raw = tokio::fs::read_to_string(local_path)
        .await
        .map_err(|source| DatasetError::Read {
            path: local_path.display().to_string(),
            source,
        })?;

    parse_games(&raw)
}

/// Parse a JSON array of games and compute eFG%/TS% for each
pub fn parse_games(raw: &str) -> Result<Vec<GameRecord>, DatasetError> {
    let lines: Vec<GameLine> = serde_json::from_str(raw)?;
    Ok(lines.into_iter().map(GameLine::into_record).collect())
}
