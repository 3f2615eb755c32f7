//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - leagues(league_id, name, country)
//! - teams(team_id, name, coach_name, founded_year, league_id)
//! - players(player_id, name, position, age, nationality, team_id)
//! - matches(match_id, league_id, home_team_id, away_team_id, match_date, venue)
//! - score_events(score_id, match_id, team_id, goals_scored, player_id, minute)
//!
//! plus the `player_summary` view and indexes on player name and match date.

pub mod constraint;
pub mod filter;
pub mod schema;
pub mod sqlite;

pub use filter::{
    AgeChange, LeagueChanges, LeagueFilter, MatchChanges, MatchFilter, PlayerChanges, PlayerFilter,
    RowChanges, RowFilter, ScoreEventChanges, ScoreEventFilter, TeamChanges, TeamFilter,
};
pub use sqlite::{DbStats, LeagueStore};
