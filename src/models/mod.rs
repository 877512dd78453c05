use serde::{Serialize, Deserialize};

/// Which side of the schedule the player's team was on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Home,
    Away,
}

/// One game as stored in the dataset file.
///
/// The fetcher writes this shape and the API reads it back. Short keys
/// (`pts`, `fga`, ...) from older dataset files are accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameLine {
    pub date: String,
    pub opponent: String,
    pub location: Location,
    #[serde(alias = "min")]
    pub minutes_played: u32,
    #[serde(alias = "pts")]
    pub points: u32,
    #[serde(alias = "reb")]
    pub rebounds: u32,
    #[serde(alias = "ast")]
    pub assists: u32,
    #[serde(alias = "fga")]
    pub field_goals_attempted: u32,
    #[serde(alias = "fgm")]
    pub field_goals_made: u32,
    #[serde(alias = "fg3a")]
    pub threes_attempted: u32,
    #[serde(alias = "fg3m")]
    pub threes_made: u32,
    #[serde(alias = "fta")]
    pub free_throws_attempted: u32,
    #[serde(alias = "ftm")]
    pub free_throws_made: u32,
}

/// Game returned by the API, with shooting efficiency computed at load time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    #[serde(flatten)]
    pub line: GameLine,
    pub effective_field_goal_pct: Option<f64>,
    pub true_shooting_pct: Option<f64>,
}

impl GameLine {
    /// Attach the derived shooting metrics
    pub fn into_record(self) -> GameRecord {
        let effective_field_goal_pct = crate::stats::effective_field_goal_pct(
            self.field_goals_made.into(),
            self.threes_made.into(),
            self.field_goals_attempted.into(),
        );
        let true_shooting_pct = crate::stats::true_shooting_pct(
            self.points.into(),
            self.field_goals_attempted.into(),
            self.free_throws_attempted.into(),
        );

        GameRecord {
            line: self,
            effective_field_goal_pct,
            true_shooting_pct,
        }
    }
}

/// Season averages over every game in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonSummary {
    pub season: String,
    pub games_played: usize,
    pub minutes_per_game: f64,
    pub points_per_game: f64,
    pub rebounds_per_game: f64,
    pub assists_per_game: f64,
    pub effective_field_goal_pct: Option<f64>,
    pub true_shooting_pct: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}
