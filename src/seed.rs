//! Dataset import - atomic bulk seeding from TOML
//!
//! A dataset lists leagues, teams, players, matches and score events with
//! ids local to the document. Rows are inserted through the store's normal
//! create operations, so they get the same validation, and local ids are
//! remapped to the ids the store assigns. The whole import runs in one
//! transaction: any rejected row rolls back every row.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entity::{
    League, Match, NewLeague, NewMatch, NewPlayer, NewScoreEvent, NewTeam, Player, ScoreEvent, Team,
};
use crate::storage::LeagueStore;
use crate::{Error, Result};

const SAMPLE: &str = include_str!("../data/sample.toml");

/// A seed document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub leagues: Vec<League>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub matches: Vec<Match>,
    #[serde(default)]
    pub score_events: Vec<ScoreEvent>,
}

/// Rows created by an import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub leagues: usize,
    pub teams: usize,
    pub players: usize,
    pub matches: usize,
    pub score_events: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.leagues + self.teams + self.players + self.matches + self.score_events
    }
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} leagues, {} teams, {} players, {} matches, {} score events",
            self.leagues, self.teams, self.players, self.matches, self.score_events
        )
    }
}

impl SeedData {
    /// The bundled sample records
    pub fn sample() -> Result<Self> {
        Self::from_toml_str(SAMPLE)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Seed(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
            .map_err(|e| Error::Seed(format!("{}: {}", path.display(), e)))
    }

    pub fn is_empty(&self) -> bool {
        self.leagues.is_empty()
            && self.teams.is_empty()
            && self.players.is_empty()
            && self.matches.is_empty()
            && self.score_events.is_empty()
    }

    /// Insert every row into `store` as one transaction.
    pub fn import(&self, store: &mut LeagueStore) -> Result<ImportSummary> {
        tracing::info!(
            leagues = self.leagues.len(),
            teams = self.teams.len(),
            players = self.players.len(),
            matches = self.matches.len(),
            score_events = self.score_events.len(),
            "Importing dataset"
        );
        let summary = store.in_transaction(|s| self.insert_all(s))?;
        tracing::info!("Imported {}", summary);
        Ok(summary)
    }

    fn insert_all(&self, store: &LeagueStore) -> Result<ImportSummary> {
        let mut leagues = IdMap::new("league");
        let mut teams = IdMap::new("team");
        let mut players = IdMap::new("player");
        let mut matches = IdMap::new("match");
        let mut summary = ImportSummary::default();

        for league in &self.leagues {
            let id = store.insert_league(&NewLeague {
                name: league.name.clone(),
                country: league.country.clone(),
            })?;
            leagues.insert(league.id, id)?;
            summary.leagues += 1;
        }

        for team in &self.teams {
            let id = store.insert_team(&NewTeam {
                name: team.name.clone(),
                coach_name: team.coach_name.clone(),
                founded_year: team.founded_year,
                league_id: leagues.resolve_opt(team.league_id)?,
            })?;
            teams.insert(team.id, id)?;
            summary.teams += 1;
        }

        for player in &self.players {
            let id = store.insert_player(&NewPlayer {
                name: player.name.clone(),
                position: player.position.clone(),
                age: player.age,
                nationality: player.nationality.clone(),
                team_id: teams.resolve_opt(player.team_id)?,
            })?;
            players.insert(player.id, id)?;
            summary.players += 1;
        }

        for fixture in &self.matches {
            let mut new_match = NewMatch::new(
                leagues.resolve(fixture.league_id)?,
                teams.resolve(fixture.home_team_id)?,
                teams.resolve(fixture.away_team_id)?,
                fixture.match_date,
            );
            new_match.venue = fixture.venue.clone();
            let id = store.insert_match(&new_match)?;
            matches.insert(fixture.id, id)?;
            summary.matches += 1;
        }

        for event in &self.score_events {
            store.insert_score_event(&NewScoreEvent {
                match_id: matches.resolve(event.match_id)?,
                team_id: teams.resolve(event.team_id)?,
                goals_scored: event.goals_scored,
                player_id: players.resolve_opt(event.player_id)?,
                minute: event.minute,
            })?;
            summary.score_events += 1;
        }

        Ok(summary)
    }
}

/// Document-local id to store id
struct IdMap {
    entity: &'static str,
    ids: HashMap<i64, i64>,
}

impl IdMap {
    fn new(entity: &'static str) -> Self {
        Self {
            entity,
            ids: HashMap::new(),
        }
    }

    fn insert(&mut self, local: i64, assigned: i64) -> Result<()> {
        if self.ids.insert(local, assigned).is_some() {
            return Err(Error::Seed(format!("{} id {} is defined twice", self.entity, local)));
        }
        Ok(())
    }

    fn resolve(&self, local: i64) -> Result<i64> {
        self.ids.get(&local).copied().ok_or_else(|| {
            Error::ReferentialViolation(format!("{} {} is not defined in the dataset", self.entity, local))
        })
    }

    fn resolve_opt(&self, local: Option<i64>) -> Result<Option<i64>> {
        local.map(|id| self.resolve(id)).transpose()
    }
}
