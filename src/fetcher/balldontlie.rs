//! balldontlie.io provider: `data` envelope, `meta.total_pages` pagination.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::config::RetryPolicy;
use super::aggregate::parse_minutes;
use super::client::{collect_pages, Page, ProviderClient, PER_PAGE};
use super::{FetchError, PlayerCandidate, SeasonDataSource, StatLine};

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: Vec<T>,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    total_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Player {
    id: i64,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Team {
    #[serde(default)]
    abbreviation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Game {
    date: String,
    home_team: Team,
    visitor_team: Team,
}

#[derive(Debug, Deserialize)]
struct StatRow {
    game: Game,
    #[serde(default)]
    team: Option<Team>,
    #[serde(default)]
    min: Option<String>,
    #[serde(default)]
    pts: Option<u32>,
    #[serde(default)]
    reb: Option<u32>,
    #[serde(default)]
    ast: Option<u32>,
    #[serde(default)]
    fga: Option<u32>,
    #[serde(default)]
    fgm: Option<u32>,
    #[serde(default)]
    fg3a: Option<u32>,
    #[serde(default)]
    fg3m: Option<u32>,
    #[serde(default)]
    fta: Option<u32>,
    #[serde(default)]
    ftm: Option<u32>,
}

/// Game dates arrive as `YYYY-MM-DD` or a midnight timestamp; keep the date part
fn game_date(raw: &str) -> Option<String> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

impl StatRow {
    fn into_stat_line(self) -> Option<StatLine> {
        let date = game_date(&self.game.date)?;

        Some(StatLine {
            date,
            team: self.team.and_then(|t| t.abbreviation),
            home_team: self.game.home_team.abbreviation.unwrap_or_default(),
            away_team: self.game.visitor_team.abbreviation.unwrap_or_default(),
            minutes_played: parse_minutes(self.min.as_deref()),
            points: self.pts.unwrap_or(0),
            rebounds: self.reb.unwrap_or(0),
            assists: self.ast.unwrap_or(0),
            field_goals_attempted: self.fga.unwrap_or(0),
            field_goals_made: self.fgm.unwrap_or(0),
            threes_attempted: self.fg3a.unwrap_or(0),
            threes_made: self.fg3m.unwrap_or(0),
            free_throws_attempted: self.fta.unwrap_or(0),
            free_throws_made: self.ftm.unwrap_or(0),
        })
    }
}

pub struct BallDontLie {
    client: ProviderClient,
}

impl BallDontLie {
    pub fn new(base: &str, api_key: &str, retry: RetryPolicy) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))?,
        );

        Ok(Self {
            client: ProviderClient::new(base, headers, retry)?,
        })
    }

    async fn stats_page(&self, player_id: i64, season: u16, page: u32) -> Result<Page<StatRow>, FetchError> {
        let query = [
            ("player_ids[]", player_id.to_string()),
            ("seasons[]", season.to_string()),
            ("per_page", PER_PAGE.to_string()),
            ("page", page.to_string()),
        ];
        let envelope: DataEnvelope<StatRow> = self.client.get_json("/stats", &query).await?;

        Ok(Page {
            rows: envelope.data,
            total_pages: envelope.meta.and_then(|m| m.total_pages),
        })
    }
}

#[async_trait]
impl SeasonDataSource for BallDontLie {
    fn name(&self) -> &'static str {
        "balldontlie"
    }

    async fn search_players(&self, term: &str) -> Result<Vec<PlayerCandidate>, FetchError> {
        let query = [("search", term.to_string()), ("per_page", PER_PAGE.to_string())];
        let envelope: DataEnvelope<Player> = self.client.get_json("/players", &query).await?;

        Ok(envelope
            .data
            .into_iter()
            .map(|p| PlayerCandidate {
                id: p.id,
                first_name: p.first_name.unwrap_or_default(),
                last_name: p.last_name.unwrap_or_default(),
            })
            .collect())
    }

    async fn season_stat_lines(&self, player_id: i64, season: u16) -> Result<Vec<StatLine>, FetchError> {
        let page_delay = self.client.retry().page_delay;
        let rows = collect_pages(page_delay, move |page| self.stats_page(player_id, season, page)).await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let raw_date = row.game.date.clone();
                let line = row.into_stat_line();
                if line.is_none() {
                    tracing::warn!("Skipping stat row with unparseable date {:?}", raw_date);
                }
                line
            })
            .collect())
    }
}
