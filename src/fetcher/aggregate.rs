use std::collections::HashMap;

use crate::models::{GameLine, Location};

/// One provider stat line, already mapped to team abbreviations and a game date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatLine {
    /// Game date, `YYYY-MM-DD`
    pub date: String,
    /// Team the player played for; falls back to the first row's team
    pub team: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub minutes_played: u32,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub field_goals_attempted: u32,
    pub field_goals_made: u32,
    pub threes_attempted: u32,
    pub threes_made: u32,
    pub free_throws_attempted: u32,
    pub free_throws_made: u32,
}

/// Whole minutes from a provider minutes string ("34:12", "34", or junk)
pub fn parse_minutes(raw: Option<&str>) -> u32 {
    let Some(raw) = raw.map(str::trim) else {
        return 0;
    };
    let whole = raw.split(':').next().unwrap_or_default();
    whole.parse().unwrap_or(0)
}

/// Decide home/away and the opponent from the player's team.
///
/// A team matching neither side is treated as home against the listed away
/// team. That is a guess for malformed rows, not a derived fact.
fn side_of(team: Option<&str>, home: &str, away: &str) -> (Location, String) {
    match team {
        Some(t) if t == home => (Location::Home, away.to_string()),
        Some(t) if t == away => (Location::Away, home.to_string()),
        _ => (Location::Home, away.to_string()),
    }
}

/// Merge stat lines into one record per (date, opponent, location), newest first
pub fn aggregate_games(lines: Vec<StatLine>) -> Vec<GameLine> {
    let fallback_team = lines.first().and_then(|l| l.team.clone());

    let mut games: Vec<GameLine> = Vec::new();
    let mut index: HashMap<(String, String, Location), usize> = HashMap::new();

    for line in lines {
        let team = line.team.as_deref().or(fallback_team.as_deref());
        let (location, opponent) = side_of(team, &line.home_team, &line.away_team);
        let key = (line.date.clone(), opponent.clone(), location);

        let slot = *index.entry(key).or_insert_with(|| {
            games.push(GameLine {
                date: line.date.clone(),
                opponent,
                location,
                minutes_played: 0,
                points: 0,
                rebounds: 0,
                assists: 0,
                field_goals_attempted: 0,
                field_goals_made: 0,
                threes_attempted: 0,
                threes_made: 0,
                free_throws_attempted: 0,
                free_throws_made: 0,
            });
            games.len() - 1
        });

        let game = &mut games[slot];
        game.minutes_played = game.minutes_played.saturating_add(line.minutes_played);
        game.points = game.points.saturating_add(line.points);
        game.rebounds = game.rebounds.saturating_add(line.rebounds);
        game.assists = game.assists.saturating_add(line.assists);
        game.field_goals_attempted = game.field_goals_attempted.saturating_add(line.field_goals_attempted);
        game.field_goals_made = game.field_goals_made.saturating_add(line.field_goals_made);
        game.threes_attempted = game.threes_attempted.saturating_add(line.threes_attempted);
        game.threes_made = game.threes_made.saturating_add(line.threes_made);
        game.free_throws_attempted = game.free_throws_attempted.saturating_add(line.free_throws_attempted);
        game.free_throws_made = game.free_throws_made.saturating_add(line.free_throws_made);
    }

    games.sort_by(|a, b| b.date.cmp(&a.date));
    games
}
