//! Query engine implementation
//!
//! Provides the read side over the store:
//! - Enriched match report (score events joined through match, teams, league, scorer)
//! - Player roster, directly and through the `player_summary` view
//! - Goals and average age per team
//! - Derived lookups: top-scoring teams, roster of the oldest team
//! - Teams by league

use rusqlite::{OptionalExtension, Row};

use crate::Result;
use crate::entity::Team;
use crate::storage::{LeagueStore, PlayerFilter};
use super::rows::{LeagueTeamRow, MatchReportRow, RosterRow, TeamAverageAge, TeamGoals, TeamRoster};

const MATCH_REPORT_SQL: &str = r#"
SELECT s.score_id, m.match_id, m.match_date, m.venue, l.name,
       home.name, away.name, scorer_team.name, p.name, s.goals_scored, s.minute
FROM score_events s
JOIN matches m ON s.match_id = m.match_id
JOIN teams home ON m.home_team_id = home.team_id
JOIN teams away ON m.away_team_id = away.team_id
JOIN teams scorer_team ON s.team_id = scorer_team.team_id
JOIN leagues l ON m.league_id = l.league_id
LEFT JOIN players p ON s.player_id = p.player_id
ORDER BY m.match_date ASC, s.score_id ASC
"#;

const ROSTER_SQL: &str = r#"
SELECT p.player_id, p.name, p.position, p.age, p.nationality, t.name, l.name
FROM players p
JOIN teams t ON p.team_id = t.team_id
JOIN leagues l ON t.league_id = l.league_id
ORDER BY p.player_id
"#;

const PLAYER_SUMMARY_SQL: &str = r#"
SELECT player_id, player_name, position, age, nationality, team_name, league_name
FROM player_summary
ORDER BY player_id
"#;

const GOALS_PER_TEAM_SQL: &str = r#"
SELECT t.name, COALESCE(SUM(s.goals_scored), 0)
FROM teams t
LEFT JOIN score_events s ON s.team_id = t.team_id
GROUP BY t.team_id, t.name
ORDER BY t.team_id
"#;

const AVERAGE_AGE_SQL: &str = r#"
SELECT t.name, AVG(p.age)
FROM teams t
JOIN players p ON p.team_id = t.team_id
WHERE p.age IS NOT NULL
GROUP BY t.team_id, t.name
ORDER BY t.team_id
"#;

const TOP_SCORING_TEAMS_SQL: &str = r#"
SELECT t.name
FROM score_events s
JOIN teams t ON s.team_id = t.team_id
WHERE s.goals_scored = (SELECT MAX(goals_scored) FROM score_events)
GROUP BY t.team_id, t.name
ORDER BY t.team_id
"#;

/// Highest average age first; equal averages resolve to the lowest team id
const OLDEST_TEAM_SQL: &str = r#"
SELECT team_id, AVG(age) AS average_age
FROM players
WHERE team_id IS NOT NULL AND age IS NOT NULL
GROUP BY team_id
ORDER BY average_age DESC, team_id ASC
LIMIT 1
"#;

const TEAMS_BY_LEAGUE_SQL: &str = r#"
SELECT t.name, t.coach_name, t.founded_year
FROM teams t
JOIN leagues l ON t.league_id = l.league_id
WHERE l.name = ?1
ORDER BY t.team_id
"#;

/// Query engine for reports over the league records
pub struct QueryEngine<'a> {
    store: &'a LeagueStore,
}

impl<'a> QueryEngine<'a> {
    /// Create a new query engine
    pub fn new(store: &'a LeagueStore) -> Self {
        Self { store }
    }

    /// Every score event with its match, teams, league and optional scorer,
    /// by match date.
    pub fn match_report(&self) -> Result<Vec<MatchReportRow>> {
        self.rows(MATCH_REPORT_SQL, |row| {
            Ok(MatchReportRow {
                score_id: row.get(0)?,
                match_id: row.get(1)?,
                match_date: row.get(2)?,
                venue: row.get(3)?,
                league: row.get(4)?,
                home_team: row.get(5)?,
                away_team: row.get(6)?,
                scoring_team: row.get(7)?,
                scorer: row.get(8)?,
                goals_scored: row.get(9)?,
                minute: row.get(10)?,
            })
        })
    }

    /// Players with a team in a league. Players without either are left out.
    pub fn player_roster(&self) -> Result<Vec<RosterRow>> {
        self.rows(ROSTER_SQL, row_to_roster)
    }

    /// Same projection as `player_roster`, read from the standing view
    pub fn player_summary(&self) -> Result<Vec<RosterRow>> {
        self.rows(PLAYER_SUMMARY_SQL, row_to_roster)
    }

    /// Total goals per team; teams without score events report 0
    pub fn goals_per_team(&self) -> Result<Vec<TeamGoals>> {
        self.rows(GOALS_PER_TEAM_SQL, |row| {
            Ok(TeamGoals {
                team: row.get(0)?,
                total_goals: row.get(1)?,
            })
        })
    }

    /// Mean player age per team, over players whose age is recorded
    pub fn average_age_per_team(&self) -> Result<Vec<TeamAverageAge>> {
        self.rows(AVERAGE_AGE_SQL, |row| {
            Ok(TeamAverageAge {
                team: row.get(0)?,
                average_age: row.get(1)?,
            })
        })
    }

    /// Names of every team with a score event equal to the highest
    /// `goals_scored` on record. Ties are all returned.
    pub fn top_scoring_teams(&self) -> Result<Vec<String>> {
        self.rows(TOP_SCORING_TEAMS_SQL, |row| row.get(0))
    }

    /// The team with the highest average player age and its players.
    ///
    /// `None` when no team has a player with a recorded age.
    pub fn oldest_team_roster(&self) -> Result<Option<TeamRoster>> {
        let oldest: Option<(i64, f64)> = self
            .store
            .connection()
            .query_row(OLDEST_TEAM_SQL, [], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let Some((team_id, average_age)) = oldest else {
            return Ok(None);
        };
        let team: Option<Team> = self.store.get_team(team_id)?;
        let Some(team) = team else {
            return Ok(None);
        };

        Ok(Some(TeamRoster {
            team_id,
            team_name: team.name,
            average_age,
            players: self.store.list_players(&PlayerFilter::on_team(team_id))?,
        }))
    }

    /// Teams in the named league. An unknown league yields no rows.
    pub fn teams_by_league(&self, league_name: &str) -> Result<Vec<LeagueTeamRow>> {
        let mut stmt = self.store.connection().prepare(TEAMS_BY_LEAGUE_SQL)?;
        let rows = stmt
            .query_map([league_name], |row| {
                Ok(LeagueTeamRow {
                    team: row.get(0)?,
                    coach_name: row.get(1)?,
                    founded_year: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn rows<T, F>(&self, sql: &str, map: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.store.connection().prepare(sql)?;
        let rows = stmt
            .query_map([], map)?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(rows)
    }
}

fn row_to_roster(row: &Row) -> rusqlite::Result<RosterRow> {
    Ok(RosterRow {
        player_id: row.get(0)?,
        player_name: row.get(1)?,
        position: row.get(2)?,
        age: row.get(3)?,
        nationality: row.get(4)?,
        team_name: row.get(5)?,
        league_name: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{NewPlayer, NewScoreEvent, NewTeam};
    use crate::seed::SeedData;
    use crate::storage::{PlayerChanges, ScoreEventFilter, TeamChanges, TeamFilter};

    fn sample_store() -> LeagueStore {
        let mut store = LeagueStore::open_in_memory().unwrap();
        SeedData::sample().unwrap().import(&mut store).unwrap();
        store
    }

    fn goals(engine: &QueryEngine) -> Vec<(String, i64)> {
        engine
            .goals_per_team()
            .unwrap()
            .into_iter()
            .map(|g| (g.team, g.total_goals))
            .collect()
    }

    #[test]
    fn test_goals_per_team_on_sample() {
        let store = sample_store();
        let engine = QueryEngine::new(&store);
        assert_eq!(
            goals(&engine),
            vec![
                ("Warrior".to_string(), 1),
                ("Rockers".to_string(), 2),
                ("Legends".to_string(), 1),
                ("Emperors".to_string(), 1),
                ("Fireball".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_deleting_event_drops_team_total_to_zero() {
        let store = sample_store();
        assert_eq!(store.delete(&ScoreEventFilter::by_id(5)).unwrap(), 1);

        let engine = QueryEngine::new(&store);
        let fireball = goals(&engine).into_iter().find(|(team, _)| team == "Fireball").unwrap();
        assert_eq!(fireball.1, 0);
    }

    #[test]
    fn test_top_scoring_teams_include_ties() {
        let store = sample_store();
        let engine = QueryEngine::new(&store);
        assert_eq!(engine.top_scoring_teams().unwrap(), vec!["Rockers", "Fireball"]);
    }

    #[test]
    fn test_top_scoring_teams_empty_without_events() {
        let store = LeagueStore::open_in_memory().unwrap();
        assert!(QueryEngine::new(&store).top_scoring_teams().unwrap().is_empty());
    }

    #[test]
    fn test_teams_by_league() {
        let store = sample_store();
        let engine = QueryEngine::new(&store);

        let teams = engine.teams_by_league("Premier League").unwrap();
        assert_eq!(
            teams,
            vec![
                LeagueTeamRow {
                    team: "Warrior".to_string(),
                    coach_name: Some("John Smith".to_string()),
                    founded_year: Some(1990),
                },
                LeagueTeamRow {
                    team: "Rockers".to_string(),
                    coach_name: Some("Mike Johnson".to_string()),
                    founded_year: Some(1985),
                },
            ]
        );

        assert!(engine.teams_by_league("No Such League").unwrap().is_empty());
    }

    #[test]
    fn test_every_team_listed_once_under_its_league() {
        let store = sample_store();
        let engine = QueryEngine::new(&store);
        for team in store.list_teams(&TeamFilter::default()).unwrap() {
            let league = store.get_league(team.league_id.unwrap()).unwrap().unwrap();
            let hits = engine
                .teams_by_league(&league.name)
                .unwrap()
                .into_iter()
                .filter(|row| row.team == team.name)
                .count();
            assert_eq!(hits, 1, "{} under {}", team.name, league.name);
        }
    }

    #[test]
    fn test_match_report_covers_every_event_by_date() {
        let store = sample_store();
        let engine = QueryEngine::new(&store);
        let report = engine.match_report().unwrap();

        assert_eq!(report.len(), store.stats().unwrap().score_events);
        assert!(report.windows(2).all(|w| w[0].match_date <= w[1].match_date));

        let first = &report[0];
        assert_eq!(first.league, "Premier League");
        assert_eq!(first.home_team, "Warrior");
        assert_eq!(first.away_team, "Rockers");
        assert_eq!(first.scorer.as_deref(), Some("David Clark"));
    }

    #[test]
    fn test_match_report_keeps_events_without_scorer() {
        let store = sample_store();
        let warrior = store.find_team_by_name("Warrior").unwrap().unwrap();
        let id = store
            .insert_score_event(&NewScoreEvent::new(1, warrior.id, 1).at_minute(90))
            .unwrap();

        let report = QueryEngine::new(&store).match_report().unwrap();
        assert_eq!(report.len(), 6);
        let row = report.iter().find(|r| r.score_id == id).unwrap();
        assert_eq!(row.scorer, None);
        assert_eq!(row.scoring_team, "Warrior");
    }

    #[test]
    fn test_roster_excludes_players_without_team() {
        let store = sample_store();
        let free_agent = store.insert_player(&NewPlayer::new("Free Agent").aged(27)).unwrap();

        let engine = QueryEngine::new(&store);
        let roster = engine.player_roster().unwrap();
        assert_eq!(roster.len(), 5);
        assert!(roster.iter().all(|r| r.player_id != free_agent));
        assert!(store.get_player(free_agent).unwrap().is_some());
    }

    #[test]
    fn test_roster_excludes_teams_without_league() {
        let store = sample_store();
        let team = store.insert_team(&NewTeam::new("Wanderers")).unwrap();
        store.insert_player(&NewPlayer::new("Nomad").on_team(team)).unwrap();

        assert_eq!(QueryEngine::new(&store).player_roster().unwrap().len(), 5);
    }

    #[test]
    fn test_player_summary_view_tracks_base_tables() {
        let store = sample_store();
        let engine = QueryEngine::new(&store);
        assert_eq!(engine.player_summary().unwrap(), engine.player_roster().unwrap());

        store
            .update(&TeamFilter::by_name("Warrior"), &TeamChanges::default().rename("Warriors"))
            .unwrap();
        let summary = engine.player_summary().unwrap();
        assert_eq!(summary[0].team_name, "Warriors");
        assert_eq!(summary, engine.player_roster().unwrap());
    }

    #[test]
    fn test_average_age_per_team() {
        let store = sample_store();
        let warrior = store.find_team_by_name("Warrior").unwrap().unwrap();
        store.insert_player(&NewPlayer::new("Sam").aged(30).on_team(warrior.id)).unwrap();
        store.insert_player(&NewPlayer::new("Unknown Age").on_team(warrior.id)).unwrap();

        let averages = QueryEngine::new(&store).average_age_per_team().unwrap();
        assert_eq!(averages.len(), 5);
        assert_eq!(averages[0].team, "Warrior");
        assert!((averages[0].average_age - 27.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_oldest_team_roster() {
        let store = sample_store();
        let roster = QueryEngine::new(&store).oldest_team_roster().unwrap().unwrap();
        assert_eq!(roster.team_name, "Emperors");
        assert!((roster.average_age - 32.0).abs() < f64::EPSILON);
        let names: Vec<_> = roster.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Thomas Becker"]);
    }

    #[test]
    fn test_oldest_team_tie_goes_to_lowest_id() {
        let store = sample_store();
        let emperors = store.find_team_by_name("Emperors").unwrap().unwrap();
        store
            .update(&PlayerFilter::default(), &PlayerChanges::default().set_age(Some(30)))
            .unwrap();

        let roster = QueryEngine::new(&store).oldest_team_roster().unwrap().unwrap();
        assert_eq!(roster.team_name, "Warrior");
        assert!(roster.team_id < emperors.id);
    }

    #[test]
    fn test_oldest_team_none_without_ages() {
        let store = LeagueStore::open_in_memory().unwrap();
        let team = store.insert_team(&NewTeam::new("Youth")).unwrap();
        store.insert_player(&NewPlayer::new("Kid").on_team(team)).unwrap();
        assert!(QueryEngine::new(&store).oldest_team_roster().unwrap().is_none());
    }
}
