pub mod engine;
pub mod rows;

pub use engine::QueryEngine;
pub use rows::{LeagueTeamRow, MatchReportRow, RosterRow, TeamAverageAge, TeamGoals, TeamRoster};
