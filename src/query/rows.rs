//! Result rows returned by the query engine

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::entity::Player;

fn display_opt<T: std::fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

fn display_avg(value: &f64) -> String {
    format!("{:.2}", value)
}

/// One score event joined with its match, teams, league and scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct MatchReportRow {
    #[tabled(rename = "Score")]
    pub score_id: i64,
    #[tabled(rename = "Match")]
    pub match_id: i64,
    #[tabled(rename = "Date")]
    pub match_date: NaiveDateTime,
    #[tabled(rename = "Venue", display_with = "display_opt")]
    pub venue: Option<String>,
    #[tabled(rename = "League")]
    pub league: String,
    #[tabled(rename = "Home")]
    pub home_team: String,
    #[tabled(rename = "Away")]
    pub away_team: String,
    #[tabled(rename = "Scoring team")]
    pub scoring_team: String,
    /// Absent when the event has no recorded scorer
    #[tabled(rename = "Scorer", display_with = "display_opt")]
    pub scorer: Option<String>,
    #[tabled(rename = "Goals")]
    pub goals_scored: i32,
    #[tabled(rename = "Minute", display_with = "display_opt")]
    pub minute: Option<i32>,
}

/// A player with their team and that team's league
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct RosterRow {
    #[tabled(rename = "Id")]
    pub player_id: i64,
    #[tabled(rename = "Player")]
    pub player_name: String,
    #[tabled(rename = "Position", display_with = "display_opt")]
    pub position: Option<String>,
    #[tabled(rename = "Age", display_with = "display_opt")]
    pub age: Option<i32>,
    #[tabled(rename = "Nationality", display_with = "display_opt")]
    pub nationality: Option<String>,
    #[tabled(rename = "Team")]
    pub team_name: String,
    #[tabled(rename = "League")]
    pub league_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct TeamGoals {
    #[tabled(rename = "Team")]
    pub team: String,
    #[tabled(rename = "Goals")]
    pub total_goals: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct TeamAverageAge {
    #[tabled(rename = "Team")]
    pub team: String,
    #[tabled(rename = "Average age", display_with = "display_avg")]
    pub average_age: f64,
}

/// Row of the teams-by-league lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct LeagueTeamRow {
    #[tabled(rename = "Team")]
    pub team: String,
    #[tabled(rename = "Coach", display_with = "display_opt")]
    pub coach_name: Option<String>,
    #[tabled(rename = "Founded", display_with = "display_opt")]
    pub founded_year: Option<i32>,
}

/// The team with the highest average player age, and its players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRoster {
    pub team_id: i64,
    pub team_name: String,
    pub average_age: f64,
    pub players: Vec<Player>,
}
