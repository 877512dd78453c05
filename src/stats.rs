//! Shooting efficiency formulas and season aggregation.

use crate::models::{GameRecord, SeasonSummary};

/// eFG% = (FGM + 0.5 * 3PM) / FGA, undefined without attempts
pub fn effective_field_goal_pct(made: u64, threes_made: u64, attempted: u64) -> Option<f64> {
    if attempted == 0 {
        return None;
    }
    Some((made as f64 + 0.5 * threes_made as f64) / attempted as f64)
}

/// TS% = PTS / (2 * (FGA + 0.44 * FTA)), undefined when the denominator is zero
pub fn true_shooting_pct(points: u64, attempted: u64, free_throws_attempted: u64) -> Option<f64> {
    let denom = 2.0 * (attempted as f64 + 0.44 * free_throws_attempted as f64);
    if denom == 0.0 {
        return None;
    }
    Some(points as f64 / denom)
}

/// Round to one decimal from the exact binary value, ties to even
fn round1(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

fn total(games: &[GameRecord], stat: impl Fn(&GameRecord) -> u32) -> u64 {
    games.iter().map(|g| u64::from(stat(g))).sum()
}

fn mean_of(games: &[GameRecord], stat: impl Fn(&GameRecord) -> u32) -> f64 {
    total(games, stat) as f64 / games.len() as f64
}

/// Build the season summary for `games`.
///
/// Per-game averages are rounded to one decimal. Shooting percentages are
/// computed from the summed makes and attempts, not from the per-game values.
pub fn season_summary(season: &str, games: &[GameRecord]) -> SeasonSummary {
    if games.is_empty() {
        return SeasonSummary {
            season: season.to_string(),
            games_played: 0,
            minutes_per_game: 0.0,
            points_per_game: 0.0,
            rebounds_per_game: 0.0,
            assists_per_game: 0.0,
            effective_field_goal_pct: None,
            true_shooting_pct: None,
        };
    }

    let fga = total(games, |g| g.line.field_goals_attempted);
    let fgm = total(games, |g| g.line.field_goals_made);
    let fg3m = total(games, |g| g.line.threes_made);
    let fta = total(games, |g| g.line.free_throws_attempted);
    let pts = total(games, |g| g.line.points);

    SeasonSummary {
        season: season.to_string(),
        games_played: games.len(),
        minutes_per_game: round1(mean_of(games, |g| g.line.minutes_played)),
        points_per_game: round1(mean_of(games, |g| g.line.points)),
        rebounds_per_game: round1(mean_of(games, |g| g.line.rebounds)),
        assists_per_game: round1(mean_of(games, |g| g.line.assists)),
        effective_field_goal_pct: effective_field_goal_pct(fgm, fg3m, fga),
        true_shooting_pct: true_shooting_pct(pts, fga, fta),
    }
}
