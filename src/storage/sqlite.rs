//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use rusqlite::types::Value;
use crate::{Error, Result};
use crate::entity::{
    League, Match, NewLeague, NewMatch, NewPlayer, NewScoreEvent, NewTeam, Player, ScoreEvent, Team,
};
use super::filter::{
    Assignment, LeagueFilter, MatchFilter, PlayerFilter, RowChanges, RowFilter, ScoreEventFilter,
    TeamFilter, negative_goals,
};
use super::schema;

const LEAGUE_COLUMNS: &str = "league_id, name, country";
const TEAM_COLUMNS: &str = "team_id, name, coach_name, founded_year, league_id";
const PLAYER_COLUMNS: &str = "player_id, name, position, age, nationality, team_id";
const MATCH_COLUMNS: &str = "match_id, league_id, home_team_id, away_team_id, match_date, venue";
const SCORE_EVENT_COLUMNS: &str = "score_id, match_id, team_id, goals_scored, player_id, minute";

/// SQLite-backed store for the league records.
///
/// The store is an explicit handle: open it, pass it to every operation,
/// close it when done. Each handle owns one connection with foreign keys
/// enforced.
pub struct LeagueStore {
    conn: Connection,
}

impl LeagueStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        tracing::debug!("Opening league store at {}", path.display());
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Close the connection, surfacing any error SQLite reports
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::from(e))
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch(schema::CONNECTION_PRAGMAS)?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Names of the indexes defined on user tables
    pub fn index_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Underlying connection, for the query engine
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========== Reference Checks ==========

    fn exists(&self, table: &str, id_column: &str, id: i64) -> Result<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE {} = ?1", table, id_column);
        let found = self
            .conn
            .query_row(&sql, [id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn ensure_exists(&self, entity: &str, table: &str, id_column: &str, id: i64) -> Result<()> {
        if self.exists(table, id_column, id)? {
            Ok(())
        } else {
            tracing::warn!("Rejected write: {} {} does not exist", entity, id);
            Err(Error::ReferentialViolation(format!("{} {} does not exist", entity, id)))
        }
    }

    fn ensure_league(&self, id: i64) -> Result<()> {
        self.ensure_exists("league", "leagues", "league_id", id)
    }

    fn ensure_team(&self, id: i64) -> Result<()> {
        self.ensure_exists("team", "teams", "team_id", id)
    }

    fn ensure_player(&self, id: i64) -> Result<()> {
        self.ensure_exists("player", "players", "player_id", id)
    }

    fn ensure_match(&self, id: i64) -> Result<()> {
        self.ensure_exists("match", "matches", "match_id", id)
    }

    /// Re-label a unique-name failure with the offending name
    fn name_taken(err: Error, entity: &str, name: &str) -> Error {
        match err {
            Error::UniquenessViolation(_) => {
                tracing::warn!("Rejected write: {} name '{}' already exists", entity, name);
                Error::UniquenessViolation(format!("{} named '{}' already exists", entity, name))
            }
            other => other,
        }
    }

    // ========== League Operations ==========

    /// Insert a league and return its id
    pub fn insert_league(&self, league: &NewLeague) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO leagues (name, country) VALUES (?1, ?2)",
                params![league.name, league.country],
            )
            .map_err(|e| Self::name_taken(e.into(), "league", &league.name))?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(league_id = id, "Inserted league {}", league.name);
        Ok(id)
    }

    /// Get a league by id
    pub fn get_league(&self, id: i64) -> Result<Option<League>> {
        let sql = format!("SELECT {} FROM leagues WHERE league_id = ?1", LEAGUE_COLUMNS);
        self.conn
            .query_row(&sql, [id], row_to_league)
            .optional()
            .map_err(Into::into)
    }

    /// Find a league by its unique name
    pub fn find_league_by_name(&self, name: &str) -> Result<Option<League>> {
        Ok(self.list_leagues(&LeagueFilter::by_name(name))?.into_iter().next())
    }

    /// List leagues matching a filter, by id
    pub fn list_leagues(&self, filter: &LeagueFilter) -> Result<Vec<League>> {
        self.select(LEAGUE_COLUMNS, filter, "league_id", row_to_league)
    }

    // ========== Team Operations ==========

    /// Insert a team and return its id
    pub fn insert_team(&self, team: &NewTeam) -> Result<i64> {
        if let Some(league_id) = team.league_id {
            self.ensure_league(league_id)?;
        }
        self.conn
            .execute(
                "INSERT INTO teams (name, coach_name, founded_year, league_id) VALUES (?1, ?2, ?3, ?4)",
                params![team.name, team.coach_name, team.founded_year, team.league_id],
            )
            .map_err(|e| Self::name_taken(e.into(), "team", &team.name))?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(team_id = id, "Inserted team {}", team.name);
        Ok(id)
    }

    /// Get a team by id
    pub fn get_team(&self, id: i64) -> Result<Option<Team>> {
        let sql = format!("SELECT {} FROM teams WHERE team_id = ?1", TEAM_COLUMNS);
        self.conn
            .query_row(&sql, [id], row_to_team)
            .optional()
            .map_err(Into::into)
    }

    /// Find a team by its unique name
    pub fn find_team_by_name(&self, name: &str) -> Result<Option<Team>> {
        Ok(self.list_teams(&TeamFilter::by_name(name))?.into_iter().next())
    }

    /// List teams matching a filter, by id
    pub fn list_teams(&self, filter: &TeamFilter) -> Result<Vec<Team>> {
        self.select(TEAM_COLUMNS, filter, "team_id", row_to_team)
    }

    // ========== Player Operations ==========

    /// Insert a player and return its id
    pub fn insert_player(&self, player: &NewPlayer) -> Result<i64> {
        if let Some(team_id) = player.team_id {
            self.ensure_team(team_id)?;
        }
        self.conn.execute(
            "INSERT INTO players (name, position, age, nationality, team_id) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![player.name, player.position, player.age, player.nationality, player.team_id],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(player_id = id, "Inserted player {}", player.name);
        Ok(id)
    }

    /// Get a player by id
    pub fn get_player(&self, id: i64) -> Result<Option<Player>> {
        let sql = format!("SELECT {} FROM players WHERE player_id = ?1", PLAYER_COLUMNS);
        self.conn
            .query_row(&sql, [id], row_to_player)
            .optional()
            .map_err(Into::into)
    }

    /// Find players by exact name (served by idx_players_name)
    pub fn find_players_by_name(&self, name: &str) -> Result<Vec<Player>> {
        self.list_players(&PlayerFilter::by_name(name))
    }

    /// List players matching a filter, by id
    pub fn list_players(&self, filter: &PlayerFilter) -> Result<Vec<Player>> {
        self.select(PLAYER_COLUMNS, filter, "player_id", row_to_player)
    }

    // ========== Match Operations ==========

    /// Insert a match and return its id
    pub fn insert_match(&self, fixture: &NewMatch) -> Result<i64> {
        if fixture.home_team_id == fixture.away_team_id {
            tracing::warn!("Rejected match: team {} against itself", fixture.home_team_id);
            return Err(Error::Validation(format!(
                "team {} cannot play itself",
                fixture.home_team_id
            )));
        }
        self.ensure_league(fixture.league_id)?;
        self.ensure_team(fixture.home_team_id)?;
        self.ensure_team(fixture.away_team_id)?;

        self.conn.execute(
            "INSERT INTO matches (league_id, home_team_id, away_team_id, match_date, venue) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                fixture.league_id,
                fixture.home_team_id,
                fixture.away_team_id,
                fixture.match_date,
                fixture.venue,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(match_id = id, "Inserted match on {}", fixture.match_date);
        Ok(id)
    }

    /// Get a match by id
    pub fn get_match(&self, id: i64) -> Result<Option<Match>> {
        let sql = format!("SELECT {} FROM matches WHERE match_id = ?1", MATCH_COLUMNS);
        self.conn
            .query_row(&sql, [id], row_to_match)
            .optional()
            .map_err(Into::into)
    }

    /// List matches matching a filter, by date (served by idx_matches_date)
    pub fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>> {
        self.select(MATCH_COLUMNS, filter, "match_date, match_id", row_to_match)
    }

    // ========== Score Event Operations ==========

    /// Record a score event and return its id.
    ///
    /// Negative goal counts are rejected before anything is written.
    pub fn insert_score_event(&self, event: &NewScoreEvent) -> Result<i64> {
        if event.goals_scored < 0 {
            tracing::warn!("Rejected score event with {} goals", event.goals_scored);
            return Err(negative_goals(event.goals_scored));
        }
        self.ensure_match(event.match_id)?;
        self.ensure_team(event.team_id)?;
        if let Some(player_id) = event.player_id {
            self.ensure_player(player_id)?;
        }

        self.conn.execute(
            "INSERT INTO score_events (match_id, team_id, goals_scored, player_id, minute) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.match_id,
                event.team_id,
                event.goals_scored,
                event.player_id,
                event.minute,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(score_id = id, match_id = event.match_id, "Recorded {} goal(s)", event.goals_scored);
        Ok(id)
    }

    /// Get a score event by id
    pub fn get_score_event(&self, id: i64) -> Result<Option<ScoreEvent>> {
        let sql = format!("SELECT {} FROM score_events WHERE score_id = ?1", SCORE_EVENT_COLUMNS);
        self.conn
            .query_row(&sql, [id], row_to_score_event)
            .optional()
            .map_err(Into::into)
    }

    /// List score events matching a filter, by id
    pub fn list_score_events(&self, filter: &ScoreEventFilter) -> Result<Vec<ScoreEvent>> {
        self.select(SCORE_EVENT_COLUMNS, filter, "score_id", row_to_score_event)
    }

    // ========== Filtered Writes ==========

    /// Apply `changes` to every row selected by `filter`.
    ///
    /// Returns the number of rows changed; a filter matching nothing is not
    /// an error. The statement is atomic: a constraint failure on any row
    /// leaves every row untouched.
    pub fn update<C: RowChanges>(&self, filter: &C::Filter, changes: &C) -> Result<usize> {
        changes.validate()?;
        let assignments = changes.assignments();
        if assignments.is_empty() {
            return Ok(0);
        }

        let mut sets = Vec::with_capacity(assignments.len());
        let mut values: Vec<Value> = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            match assignment {
                Assignment::Set(column, value) => {
                    sets.push(format!("{} = ?", column));
                    values.push(value);
                }
                Assignment::Add(column, delta) => {
                    sets.push(format!("{0} = {0} + ?", column));
                    values.push(Value::Integer(delta));
                }
            }
        }

        let table = <C::Filter as RowFilter>::TABLE;
        let conditions = filter.conditions();
        let sql = format!(
            "UPDATE {} SET {}{}",
            table,
            sets.join(", "),
            conditions.where_clause()
        );
        values.extend(conditions.into_params());

        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        tracing::debug!(table, changed, "Updated rows");
        Ok(changed)
    }

    /// Delete every row selected by `filter`.
    ///
    /// Fails with a referential violation, removing nothing, when any
    /// selected row is still referenced.
    pub fn delete<F: RowFilter>(&self, filter: &F) -> Result<usize> {
        let conditions = filter.conditions();
        let sql = format!("DELETE FROM {}{}", F::TABLE, conditions.where_clause());
        let removed = self
            .conn
            .execute(&sql, params_from_iter(conditions.into_params()))
            .map_err(|e| match Error::from(e) {
                Error::ReferentialViolation(_) => {
                    tracing::warn!(table = F::TABLE, "Rejected delete of referenced rows");
                    Error::ReferentialViolation(format!(
                        "cannot delete from {}: rows are still referenced",
                        F::TABLE
                    ))
                }
                other => other,
            })?;
        tracing::debug!(table = F::TABLE, removed, "Deleted rows");
        Ok(removed)
    }

    fn select<F, T>(
        &self,
        columns: &str,
        filter: &F,
        order_by: &str,
        map: fn(&Row) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>>
    where
        F: RowFilter,
    {
        let conditions = filter.conditions();
        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY {}",
            columns,
            F::TABLE,
            conditions.where_clause(),
            order_by
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(conditions.into_params()), map)?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(rows)
    }

    // ========== Bulk Operations ==========

    /// Begin a transaction for bulk operations
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit a transaction
    pub fn commit(&mut self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Rollback a transaction
    pub fn rollback(&mut self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }

    /// Run `f` as one unit: committed when it returns `Ok`, rolled back on `Err`.
    pub fn in_transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&LeagueStore) -> Result<T>,
    {
        self.begin_transaction()?;
        match f(self) {
            Ok(value) => match self.commit() {
                Ok(()) => Ok(value),
                Err(err) => {
                    tracing::warn!("Commit failed, rolling back: {}", err);
                    // The failed COMMIT may already have ended the transaction
                    let _ = self.rollback();
                    Err(err)
                }
            },
            Err(err) => {
                tracing::info!("Rolling back transaction: {}", err);
                self.rollback()?;
                Err(err)
            }
        }
    }

    /// Count rows in one of the schema tables
    pub fn count(&self, table: &str) -> Result<usize> {
        if !schema::TABLES.contains(&table) {
            return Err(Error::Validation(format!("unknown table '{}'", table)));
        }
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            leagues: self.count("leagues")?,
            teams: self.count("teams")?,
            players: self.count("players")?,
            matches: self.count("matches")?,
            score_events: self.count("score_events")?,
        })
    }
}

fn row_to_league(row: &Row) -> rusqlite::Result<League> {
    Ok(League {
        id: row.get(0)?,
        name: row.get(1)?,
        country: row.get(2)?,
    })
}

fn row_to_team(row: &Row) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        coach_name: row.get(2)?,
        founded_year: row.get(3)?,
        league_id: row.get(4)?,
    })
}

fn row_to_player(row: &Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        position: row.get(2)?,
        age: row.get(3)?,
        nationality: row.get(4)?,
        team_id: row.get(5)?,
    })
}

fn row_to_match(row: &Row) -> rusqlite::Result<Match> {
    Ok(Match {
        id: row.get(0)?,
        league_id: row.get(1)?,
        home_team_id: row.get(2)?,
        away_team_id: row.get(3)?,
        match_date: row.get(4)?,
        venue: row.get(5)?,
    })
}

fn row_to_score_event(row: &Row) -> rusqlite::Result<ScoreEvent> {
    Ok(ScoreEvent {
        id: row.get(0)?,
        match_id: row.get(1)?,
        team_id: row.get(2)?,
        goals_scored: row.get(3)?,
        player_id: row.get(4)?,
        minute: row.get(5)?,
    })
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DbStats {
    pub leagues: usize,
    pub teams: usize,
    pub players: usize,
    pub matches: usize,
    pub score_events: usize,
}
