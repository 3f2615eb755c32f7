//! Entity types - the five record kinds kept by the store
//!
//! Every entity carries an integer surrogate id assigned by the store:
//! - `League`: top-level grouping of teams
//! - `Team`: roster of players, optionally tied to one league
//! - `Player`: individual athlete, optionally tied to one team
//! - `Match`: fixture between two teams within a league
//! - `ScoreEvent`: goals scored by a team (and optionally a player) in a match
//!
//! The `New*` types are the write inputs accepted by the store's create
//! operations; they carry no id.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A league, unique by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: i64,
    pub name: String,
    pub country: Option<String>,
}

/// Input for creating a league
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLeague {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
}

impl NewLeague {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

/// A team, unique by name. The league reference may be unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub coach_name: Option<String>,
    pub founded_year: Option<i32>,
    pub league_id: Option<i64>,
}

/// Input for creating a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
    #[serde(default)]
    pub coach_name: Option<String>,
    #[serde(default)]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub league_id: Option<i64>,
}

impl NewTeam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coach_name: None,
            founded_year: None,
            league_id: None,
        }
    }

    pub fn with_coach(mut self, coach: impl Into<String>) -> Self {
        self.coach_name = Some(coach.into());
        self
    }

    pub fn founded(mut self, year: i32) -> Self {
        self.founded_year = Some(year);
        self
    }

    pub fn in_league(mut self, league_id: i64) -> Self {
        self.league_id = Some(league_id);
        self
    }
}

/// A player. Names are not unique; the team reference may be unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub position: Option<String>,
    pub age: Option<i32>,
    pub nationality: Option<String>,
    pub team_id: Option<i64>,
}

/// Input for creating a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub team_id: Option<i64>,
}

impl NewPlayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: None,
            age: None,
            nationality: None,
            team_id: None,
        }
    }

    pub fn position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn aged(mut self, age: i32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn nationality(mut self, nationality: impl Into<String>) -> Self {
        self.nationality = Some(nationality.into());
        self
    }

    pub fn on_team(mut self, team_id: i64) -> Self {
        self.team_id = Some(team_id);
        self
    }
}

/// A fixture between a home and an away team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub league_id: i64,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub match_date: NaiveDateTime,
    pub venue: Option<String>,
}

/// Input for creating a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatch {
    pub league_id: i64,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub match_date: NaiveDateTime,
    #[serde(default)]
    pub venue: Option<String>,
}

impl NewMatch {
    pub fn new(league_id: i64, home_team_id: i64, away_team_id: i64, match_date: NaiveDateTime) -> Self {
        Self {
            league_id,
            home_team_id,
            away_team_id,
            match_date,
            venue: None,
        }
    }

    pub fn at(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }
}

/// Goals scored by one team during a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub id: i64,
    pub match_id: i64,
    pub team_id: i64,
    pub goals_scored: i32,
    pub player_id: Option<i64>,
    pub minute: Option<i32>,
}

/// Input for recording a score event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScoreEvent {
    pub match_id: i64,
    pub team_id: i64,
    pub goals_scored: i32,
    #[serde(default)]
    pub player_id: Option<i64>,
    #[serde(default)]
    pub minute: Option<i32>,
}

impl NewScoreEvent {
    pub fn new(match_id: i64, team_id: i64, goals_scored: i32) -> Self {
        Self {
            match_id,
            team_id,
            goals_scored,
            player_id: None,
            minute: None,
        }
    }

    pub fn by_player(mut self, player_id: i64) -> Self {
        self.player_id = Some(player_id);
        self
    }

    pub fn at_minute(mut self, minute: i32) -> Self {
        self.minute = Some(minute);
        self
    }
}
