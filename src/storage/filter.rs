//! Typed row predicates and change-sets for filtered updates and deletes
//!
//! Each entity has a `*Filter` (fields AND-ed together, an empty filter
//! matches every row) and a `*Changes` (only set fields are assigned).
//! A change-set names its filter type so the store can pair them without
//! runtime checks.

use chrono::NaiveDateTime;
use rusqlite::types::Value;

use crate::{Error, Result};

/// Render a timestamp the way rusqlite's chrono support stores it
pub(crate) fn datetime_value(dt: &NaiveDateTime) -> Value {
    Value::Text(dt.format("%F %T%.f").to_string())
}

/// WHERE clause fragments joined with AND, plus their positional parameters
#[derive(Debug, Default)]
pub struct Conditions {
    parts: Vec<String>,
    params: Vec<Value>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column <op> ?`
    pub fn compare(&mut self, column: &str, op: &str, value: impl Into<Value>) {
        self.parts.push(format!("{} {} ?", column, op));
        self.params.push(value.into());
    }

    /// `column = ?` when the value is present
    pub fn eq_opt<T: Into<Value>>(&mut self, column: &str, value: Option<T>) {
        if let Some(v) = value {
            self.compare(column, "=", v);
        }
    }

    pub fn is_null(&mut self, column: &str) {
        self.parts.push(format!("{} IS NULL", column));
    }

    /// Arbitrary fragment with `?` placeholders matching `params`
    pub fn raw(&mut self, fragment: impl Into<String>, params: Vec<Value>) {
        self.parts.push(fragment.into());
        self.params.extend(params);
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// ` WHERE a AND b`, or an empty string when unconstrained
    pub fn where_clause(&self) -> String {
        if self.parts.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.parts.join(" AND "))
        }
    }

    pub fn into_params(self) -> Vec<Value> {
        self.params
    }
}

/// One `SET` entry of an UPDATE
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Set(&'static str, Value),
    Add(&'static str, i64),
}

/// Row predicate over one table
pub trait RowFilter {
    const TABLE: &'static str;

    fn conditions(&self) -> Conditions;
}

/// Field assignments over one table
pub trait RowChanges {
    type Filter: RowFilter;

    fn assignments(&self) -> Vec<Assignment>;

    /// Rejections that can be decided before touching the database
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

// ========== Leagues ==========

#[derive(Debug, Clone, Default)]
pub struct LeagueFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub country: Option<String>,
}

impl LeagueFilter {
    pub fn by_id(id: i64) -> Self {
        Self { id: Some(id), ..Self::default() }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }
}

impl RowFilter for LeagueFilter {
    const TABLE: &'static str = "leagues";

    fn conditions(&self) -> Conditions {
        let mut c = Conditions::new();
        c.eq_opt("league_id", self.id);
        c.eq_opt("name", self.name.clone());
        c.eq_opt("country", self.country.clone());
        c
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeagueChanges {
    pub name: Option<String>,
    pub country: Option<Option<String>>,
}

impl LeagueChanges {
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn country(mut self, country: Option<String>) -> Self {
        self.country = Some(country);
        self
    }
}

impl RowChanges for LeagueChanges {
    type Filter = LeagueFilter;

    fn assignments(&self) -> Vec<Assignment> {
        let mut out = Vec::new();
        if let Some(name) = &self.name {
            out.push(Assignment::Set("name", name.clone().into()));
        }
        if let Some(country) = &self.country {
            out.push(Assignment::Set("country", country.clone().into()));
        }
        out
    }
}

// ========== Teams ==========

#[derive(Debug, Clone, Default)]
pub struct TeamFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub league_id: Option<i64>,
    /// Only teams with no league
    pub without_league: bool,
    pub founded_before: Option<i32>,
}

impl TeamFilter {
    pub fn by_id(id: i64) -> Self {
        Self { id: Some(id), ..Self::default() }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }

    pub fn in_league(league_id: i64) -> Self {
        Self { league_id: Some(league_id), ..Self::default() }
    }
}

impl RowFilter for TeamFilter {
    const TABLE: &'static str = "teams";

    fn conditions(&self) -> Conditions {
        let mut c = Conditions::new();
        c.eq_opt("team_id", self.id);
        c.eq_opt("name", self.name.clone());
        c.eq_opt("league_id", self.league_id);
        if self.without_league {
            c.is_null("league_id");
        }
        if let Some(year) = self.founded_before {
            c.compare("founded_year", "<", year);
        }
        c
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeamChanges {
    pub name: Option<String>,
    pub coach_name: Option<Option<String>>,
    pub founded_year: Option<Option<i32>>,
    pub league_id: Option<Option<i64>>,
}

impl TeamChanges {
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn coach(mut self, coach: impl Into<String>) -> Self {
        self.coach_name = Some(Some(coach.into()));
        self
    }

    pub fn founded(mut self, year: Option<i32>) -> Self {
        self.founded_year = Some(year);
        self
    }

    pub fn league(mut self, league_id: Option<i64>) -> Self {
        self.league_id = Some(league_id);
        self
    }
}

impl RowChanges for TeamChanges {
    type Filter = TeamFilter;

    fn assignments(&self) -> Vec<Assignment> {
        let mut out = Vec::new();
        if let Some(name) = &self.name {
            out.push(Assignment::Set("name", name.clone().into()));
        }
        if let Some(coach) = &self.coach_name {
            out.push(Assignment::Set("coach_name", coach.clone().into()));
        }
        if let Some(year) = self.founded_year {
            out.push(Assignment::Set("founded_year", year.into()));
        }
        if let Some(league) = self.league_id {
            out.push(Assignment::Set("league_id", league.into()));
        }
        out
    }
}

// ========== Players ==========

#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub team_id: Option<i64>,
    /// Only players with no team
    pub without_team: bool,
    pub position: Option<String>,
    pub nationality: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
}

impl PlayerFilter {
    pub fn by_id(id: i64) -> Self {
        Self { id: Some(id), ..Self::default() }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }

    pub fn on_team(team_id: i64) -> Self {
        Self { team_id: Some(team_id), ..Self::default() }
    }
}

impl RowFilter for PlayerFilter {
    const TABLE: &'static str = "players";

    fn conditions(&self) -> Conditions {
        let mut c = Conditions::new();
        c.eq_opt("player_id", self.id);
        c.eq_opt("name", self.name.clone());
        c.eq_opt("team_id", self.team_id);
        if self.without_team {
            c.is_null("team_id");
        }
        c.eq_opt("position", self.position.clone());
        c.eq_opt("nationality", self.nationality.clone());
        if let Some(min) = self.min_age {
            c.compare("age", ">=", min);
        }
        if let Some(max) = self.max_age {
            c.compare("age", "<=", max);
        }
        c
    }
}

/// How an update treats a player's age
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeChange {
    Set(Option<i32>),
    /// Players with no recorded age stay unrecorded
    Increment(i32),
}

#[derive(Debug, Clone, Default)]
pub struct PlayerChanges {
    pub name: Option<String>,
    pub position: Option<Option<String>>,
    pub age: Option<AgeChange>,
    pub nationality: Option<Option<String>>,
    pub team_id: Option<Option<i64>>,
}

impl PlayerChanges {
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn position(mut self, position: Option<String>) -> Self {
        self.position = Some(position);
        self
    }

    pub fn set_age(mut self, age: Option<i32>) -> Self {
        self.age = Some(AgeChange::Set(age));
        self
    }

    pub fn increment_age(mut self, years: i32) -> Self {
        self.age = Some(AgeChange::Increment(years));
        self
    }

    pub fn nationality(mut self, nationality: Option<String>) -> Self {
        self.nationality = Some(nationality);
        self
    }

    pub fn transfer(mut self, team_id: Option<i64>) -> Self {
        self.team_id = Some(team_id);
        self
    }
}

impl RowChanges for PlayerChanges {
    type Filter = PlayerFilter;

    fn assignments(&self) -> Vec<Assignment> {
        let mut out = Vec::new();
        if let Some(name) = &self.name {
            out.push(Assignment::Set("name", name.clone().into()));
        }
        if let Some(position) = &self.position {
            out.push(Assignment::Set("position", position.clone().into()));
        }
        match self.age {
            Some(AgeChange::Set(age)) => out.push(Assignment::Set("age", age.into())),
            Some(AgeChange::Increment(years)) => out.push(Assignment::Add("age", years.into())),
            None => {}
        }
        if let Some(nationality) = &self.nationality {
            out.push(Assignment::Set("nationality", nationality.clone().into()));
        }
        if let Some(team) = self.team_id {
            out.push(Assignment::Set("team_id", team.into()));
        }
        out
    }
}

// ========== Matches ==========

#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    pub id: Option<i64>,
    pub league_id: Option<i64>,
    /// Matches where this team plays home or away
    pub team_id: Option<i64>,
    pub venue: Option<String>,
    pub from: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
}

impl MatchFilter {
    pub fn by_id(id: i64) -> Self {
        Self { id: Some(id), ..Self::default() }
    }

    pub fn involving(team_id: i64) -> Self {
        Self { team_id: Some(team_id), ..Self::default() }
    }
}

impl RowFilter for MatchFilter {
    const TABLE: &'static str = "matches";

    fn conditions(&self) -> Conditions {
        let mut c = Conditions::new();
        c.eq_opt("match_id", self.id);
        c.eq_opt("league_id", self.league_id);
        if let Some(team) = self.team_id {
            c.raw(
                "(home_team_id = ? OR away_team_id = ?)",
                vec![Value::Integer(team), Value::Integer(team)],
            );
        }
        c.eq_opt("venue", self.venue.clone());
        if let Some(from) = &self.from {
            c.compare("match_date", ">=", datetime_value(from));
        }
        if let Some(until) = &self.until {
            c.compare("match_date", "<=", datetime_value(until));
        }
        c
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchChanges {
    pub league_id: Option<i64>,
    pub home_team_id: Option<i64>,
    pub away_team_id: Option<i64>,
    pub match_date: Option<NaiveDateTime>,
    pub venue: Option<Option<String>>,
}

impl MatchChanges {
    pub fn reschedule(mut self, date: NaiveDateTime) -> Self {
        self.match_date = Some(date);
        self
    }

    pub fn venue(mut self, venue: Option<String>) -> Self {
        self.venue = Some(venue);
        self
    }

    pub fn teams(mut self, home_team_id: i64, away_team_id: i64) -> Self {
        self.home_team_id = Some(home_team_id);
        self.away_team_id = Some(away_team_id);
        self
    }
}

impl RowChanges for MatchChanges {
    type Filter = MatchFilter;

    fn assignments(&self) -> Vec<Assignment> {
        let mut out = Vec::new();
        if let Some(league) = self.league_id {
            out.push(Assignment::Set("league_id", league.into()));
        }
        if let Some(home) = self.home_team_id {
            out.push(Assignment::Set("home_team_id", home.into()));
        }
        if let Some(away) = self.away_team_id {
            out.push(Assignment::Set("away_team_id", away.into()));
        }
        if let Some(date) = &self.match_date {
            out.push(Assignment::Set("match_date", datetime_value(date)));
        }
        if let Some(venue) = &self.venue {
            out.push(Assignment::Set("venue", venue.clone().into()));
        }
        out
    }

    fn validate(&self) -> Result<()> {
        match (self.home_team_id, self.away_team_id) {
            (Some(home), Some(away)) if home == away => Err(Error::Validation(format!(
                "team {} cannot play itself",
                home
            ))),
            _ => Ok(()),
        }
    }
}

// ========== Score events ==========

#[derive(Debug, Clone, Default)]
pub struct ScoreEventFilter {
    pub id: Option<i64>,
    pub match_id: Option<i64>,
    pub team_id: Option<i64>,
    pub player_id: Option<i64>,
    pub min_goals: Option<i32>,
}

impl ScoreEventFilter {
    pub fn by_id(id: i64) -> Self {
        Self { id: Some(id), ..Self::default() }
    }

    pub fn in_match(match_id: i64) -> Self {
        Self { match_id: Some(match_id), ..Self::default() }
    }

    pub fn for_team(team_id: i64) -> Self {
        Self { team_id: Some(team_id), ..Self::default() }
    }
}

impl RowFilter for ScoreEventFilter {
    const TABLE: &'static str = "score_events";

    fn conditions(&self) -> Conditions {
        let mut c = Conditions::new();
        c.eq_opt("score_id", self.id);
        c.eq_opt("match_id", self.match_id);
        c.eq_opt("team_id", self.team_id);
        c.eq_opt("player_id", self.player_id);
        if let Some(min) = self.min_goals {
            c.compare("goals_scored", ">=", min);
        }
        c
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoreEventChanges {
    pub team_id: Option<i64>,
    pub goals_scored: Option<i32>,
    pub player_id: Option<Option<i64>>,
    pub minute: Option<Option<i32>>,
}

impl ScoreEventChanges {
    pub fn goals(mut self, goals: i32) -> Self {
        self.goals_scored = Some(goals);
        self
    }

    pub fn scorer(mut self, player_id: Option<i64>) -> Self {
        self.player_id = Some(player_id);
        self
    }

    pub fn minute(mut self, minute: Option<i32>) -> Self {
        self.minute = Some(minute);
        self
    }
}

impl RowChanges for ScoreEventChanges {
    type Filter = ScoreEventFilter;

    fn assignments(&self) -> Vec<Assignment> {
        let mut out = Vec::new();
        if let Some(team) = self.team_id {
            out.push(Assignment::Set("team_id", team.into()));
        }
        if let Some(goals) = self.goals_scored {
            out.push(Assignment::Set("goals_scored", goals.into()));
        }
        if let Some(player) = self.player_id {
            out.push(Assignment::Set("player_id", player.into()));
        }
        if let Some(minute) = self.minute {
            out.push(Assignment::Set("minute", minute.into()));
        }
        out
    }

    fn validate(&self) -> Result<()> {
        match self.goals_scored {
            Some(goals) if goals < 0 => Err(negative_goals(goals)),
            _ => Ok(()),
        }
    }
}

pub(crate) fn negative_goals(goals: i32) -> Error {
    Error::Validation(format!("goals_scored must be non-negative, got {}", goals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_has_no_where_clause() {
        let c = PlayerFilter::default().conditions();
        assert!(c.is_empty());
        assert_eq!(c.where_clause(), "");
    }

    #[test]
    fn test_filter_fields_are_anded_in_order() {
        let filter = PlayerFilter {
            team_id: Some(3),
            min_age: Some(20),
            ..PlayerFilter::default()
        };
        let c = filter.conditions();
        assert_eq!(c.where_clause(), " WHERE team_id = ? AND age >= ?");
        assert_eq!(c.into_params(), vec![Value::Integer(3), Value::Integer(20)]);
    }

    #[test]
    fn test_match_team_filter_checks_both_sides() {
        let c = MatchFilter::involving(7).conditions();
        assert_eq!(c.where_clause(), " WHERE (home_team_id = ? OR away_team_id = ?)");
        assert_eq!(c.into_params().len(), 2);
    }

    #[test]
    fn test_unset_changes_produce_no_assignments() {
        assert!(TeamChanges::default().assignments().is_empty());
        assert!(PlayerChanges::default().assignments().is_empty());
    }

    #[test]
    fn test_clearing_a_field_assigns_null() {
        let changes = PlayerChanges::default().transfer(None);
        assert_eq!(changes.assignments(), vec![Assignment::Set("team_id", Value::Null)]);
    }

    #[test]
    fn test_age_increment_is_additive() {
        let changes = PlayerChanges::default().increment_age(1);
        let assignments = changes.assignments();
        assert_eq!(assignments, vec![Assignment::Add("age", 1)]);
    }

    #[test]
    fn test_negative_goal_change_is_rejected() {
        let err = ScoreEventChanges::default().goals(-1).validate().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(ScoreEventChanges::default().goals(0).validate().is_ok());
    }

    #[test]
    fn test_match_against_itself_is_rejected() {
        assert!(MatchChanges::default().teams(2, 2).validate().is_err());
        assert!(MatchChanges::default().teams(1, 2).validate().is_ok());
    }
}
