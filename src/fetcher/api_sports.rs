//! api-sports.io NBA provider: `response` envelope, no page count.
//!
//! Player statistics rows only carry a game id, so the schedule for every
//! team the player appeared for is fetched once and joined by id.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::America::New_York;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::RetryPolicy;
use super::aggregate::parse_minutes;
use super::client::{collect_pages, Page, ProviderClient};
use super::{FetchError, PlayerCandidate, SeasonDataSource, StatLine};

#[derive(Debug, Deserialize)]
struct ResponseEnvelope<T> {
    response: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Player {
    id: i64,
    #[serde(default)]
    firstname: Option<String>,
    #[serde(default)]
    lastname: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TeamRef {
    id: i64,
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GameRef {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct StatRow {
    team: TeamRef,
    game: GameRef,
    #[serde(default)]
    min: Option<String>,
    #[serde(default)]
    points: Option<u32>,
    #[serde(default, rename = "totReb")]
    total_rebounds: Option<u32>,
    #[serde(default)]
    assists: Option<u32>,
    #[serde(default)]
    fga: Option<u32>,
    #[serde(default)]
    fgm: Option<u32>,
    #[serde(default)]
    tpa: Option<u32>,
    #[serde(default)]
    tpm: Option<u32>,
    #[serde(default)]
    fta: Option<u32>,
    #[serde(default)]
    ftm: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GameDate {
    start: String,
}

#[derive(Debug, Deserialize)]
struct GameTeams {
    home: TeamRef,
    visitors: TeamRef,
}

#[derive(Debug, Deserialize)]
struct ScheduledGame {
    id: i64,
    date: GameDate,
    teams: GameTeams,
}

/// Date and matchup of one scheduled game
#[derive(Debug, Clone, PartialEq)]
struct Fixture {
    date: String,
    home_team: String,
    away_team: String,
}

/// Tip-off times are UTC; the game date is the calendar day in US Eastern time
fn eastern_game_date(start: &str) -> Option<String> {
    let utc: DateTime<Utc> = DateTime::parse_from_rfc3339(start).ok()?.with_timezone(&Utc);
    Some(utc.with_timezone(&New_York).format("%Y-%m-%d").to_string())
}

impl StatRow {
    fn into_stat_line(self, fixture: &Fixture) -> StatLine {
        StatLine {
            date: fixture.date.clone(),
            team: self.team.code,
            home_team: fixture.home_team.clone(),
            away_team: fixture.away_team.clone(),
            minutes_played: parse_minutes(self.min.as_deref()),
            points: self.points.unwrap_or(0),
            rebounds: self.total_rebounds.unwrap_or(0),
            assists: self.assists.unwrap_or(0),
            field_goals_attempted: self.fga.unwrap_or(0),
            field_goals_made: self.fgm.unwrap_or(0),
            threes_attempted: self.tpa.unwrap_or(0),
            threes_made: self.tpm.unwrap_or(0),
            free_throws_attempted: self.fta.unwrap_or(0),
            free_throws_made: self.ftm.unwrap_or(0),
        }
    }
}

pub struct ApiSports {
    client: ProviderClient,
}

impl ApiSports {
    pub fn new(base: &str, api_key: &str, retry: RetryPolicy) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert("x-apisports-key", HeaderValue::from_str(api_key)?);

        Ok(Self {
            client: ProviderClient::new(base, headers, retry)?,
        })
    }

    async fn stats_page(&self, player_id: i64, season: u16, page: u32) -> Result<Page<StatRow>, FetchError> {
        let query = [
            ("id", player_id.to_string()),
            ("season", season.to_string()),
            ("page", page.to_string()),
        ];
        let envelope: ResponseEnvelope<StatRow> =
            self.client.get_json("/players/statistics", &query).await?;

        Ok(Page {
            rows: envelope.response,
            total_pages: None,
        })
    }

    /// Fixtures for every game `team_id` played in `season`, keyed by game id
    async fn team_fixtures(&self, team_id: i64, season: u16) -> Result<HashMap<i64, Fixture>, FetchError> {
        let query = [("season", season.to_string()), ("team", team_id.to_string())];
        let envelope: ResponseEnvelope<ScheduledGame> = self.client.get_json("/games", &query).await?;

        Ok(envelope
            .response
            .into_iter()
            .filter_map(|game| {
                let date = eastern_game_date(&game.date.start)?;
                Some((
                    game.id,
                    Fixture {
                        date,
                        home_team: game.teams.home.code.unwrap_or_default(),
                        away_team: game.teams.visitors.code.unwrap_or_default(),
                    },
                ))
            })
            .collect())
    }
}

#[async_trait]
impl SeasonDataSource for ApiSports {
    fn name(&self) -> &'static str {
        "api-sports"
    }

    async fn search_players(&self, term: &str) -> Result<Vec<PlayerCandidate>, FetchError> {
        let query = [("search", term.to_string())];
        let envelope: ResponseEnvelope<Player> = self.client.get_json("/players", &query).await?;

        Ok(envelope
            .response
            .into_iter()
            .map(|p| PlayerCandidate {
                id: p.id,
                first_name: p.firstname.unwrap_or_default(),
                last_name: p.lastname.unwrap_or_default(),
            })
            .collect())
    }

    async fn season_stat_lines(&self, player_id: i64, season: u16) -> Result<Vec<StatLine>, FetchError> {
        let page_delay = self.client.retry().page_delay;
        let rows = collect_pages(page_delay, move |page| self.stats_page(player_id, season, page)).await?;

        let mut team_ids: Vec<i64> = rows.iter().map(|r| r.team.id).collect();
        team_ids.sort_unstable();
        team_ids.dedup();

        let mut fixtures = HashMap::new();
        for team_id in team_ids {
            let schedule = self.team_fixtures(team_id, season).await?;
            info!("Loaded {} fixtures for team {}", schedule.len(), team_id);
            fixtures.extend(schedule);
            tokio::time::sleep(page_delay).await;
        }

        Ok(rows
            .into_iter()
            .filter_map(|row| match fixtures.get(&row.game.id) {
                Some(fixture) => Some(row.into_stat_line(fixture)),
                None => {
                    warn!("Skipping stat row for unknown game {}", row.game.id);
                    None
                }
            })
            .collect())
    }
}
