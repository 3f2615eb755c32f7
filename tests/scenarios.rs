//! End-to-end scenarios against a file-backed store loaded with the sample records.

use leaguebook::entity::{NewScoreEvent, NewTeam};
use leaguebook::storage::{PlayerChanges, PlayerFilter, ScoreEventFilter, TeamChanges, TeamFilter};
use leaguebook::{Error, LeagueStore, QueryEngine, SeedData};
use std::path::PathBuf;
use tempfile::TempDir;

/// Test fixture that manages a temporary database directory.
struct TestFixture {
    _temp_dir: TempDir,
    db_path: PathBuf,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let db_path = temp_dir.path().join("leaguebook.db");
        Self { _temp_dir: temp_dir, db_path }
    }

    fn seeded(&self) -> LeagueStore {
        let mut store = LeagueStore::open(&self.db_path).expect("open store");
        SeedData::sample()
            .expect("sample parses")
            .import(&mut store)
            .expect("sample imports");
        store
    }
}

fn goals_for(store: &LeagueStore, team: &str) -> i64 {
    QueryEngine::new(store)
        .goals_per_team()
        .unwrap()
        .into_iter()
        .find(|row| row.team == team)
        .map(|row| row.total_goals)
        .unwrap()
}

#[test]
fn test_sample_goal_totals_and_deletion() {
    let fixture = TestFixture::new();
    let store = fixture.seeded();

    for (team, expected) in [("Warrior", 1), ("Rockers", 2), ("Legends", 1), ("Emperors", 1), ("Fireball", 2)] {
        assert_eq!(goals_for(&store, team), expected, "{}", team);
    }

    store.delete(&ScoreEventFilter::by_id(5)).unwrap();
    assert_eq!(goals_for(&store, "Fireball"), 0);
}

#[test]
fn test_sample_top_scorers_and_premier_league() {
    let fixture = TestFixture::new();
    let store = fixture.seeded();
    let engine = QueryEngine::new(&store);

    assert_eq!(engine.top_scoring_teams().unwrap(), vec!["Rockers", "Fireball"]);

    let teams: Vec<_> = engine
        .teams_by_league("Premier League")
        .unwrap()
        .into_iter()
        .map(|row| (row.team, row.coach_name, row.founded_year))
        .collect();
    assert_eq!(
        teams,
        vec![
            ("Warrior".to_string(), Some("John Smith".to_string()), Some(1990)),
            ("Rockers".to_string(), Some("Mike Johnson".to_string()), Some(1985)),
        ]
    );
}

#[test]
fn test_records_survive_reopen() {
    let fixture = TestFixture::new();
    {
        let store = fixture.seeded();
        store
            .update(&TeamFilter::by_name("Legends"), &TeamChanges::default().coach("Ana Lopez"))
            .unwrap();
        store.close().unwrap();
    }

    let store = LeagueStore::open(&fixture.db_path).unwrap();
    let legends = store.find_team_by_name("Legends").unwrap().unwrap();
    assert_eq!(legends.coach_name.as_deref(), Some("Ana Lopez"));
    assert_eq!(store.stats().unwrap().score_events, 5);
}

#[test]
fn test_foreign_keys_enforced_after_reopen() {
    let fixture = TestFixture::new();
    fixture.seeded().close().unwrap();

    let store = LeagueStore::open(&fixture.db_path).unwrap();
    let err = store.delete(&TeamFilter::by_name("Warrior")).unwrap_err();
    assert!(matches!(err, Error::ReferentialViolation(_)));

    let err = store
        .insert_team(&NewTeam::new("Ghosts").in_league(404))
        .unwrap_err();
    assert!(matches!(err, Error::ReferentialViolation(_)));
}

#[test]
fn test_negative_goal_insert_leaves_count_unchanged() {
    let fixture = TestFixture::new();
    let store = fixture.seeded();
    let before = store.stats().unwrap().score_events;

    let err = store.insert_score_event(&NewScoreEvent::new(1, 1, -3)).unwrap_err();
    assert!(err.is_constraint());
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(store.stats().unwrap().score_events, before);
}

#[test]
fn test_age_increment_commits_or_rolls_back_as_unit() {
    let fixture = TestFixture::new();
    let mut store = fixture.seeded();
    let ages = |store: &LeagueStore| -> Vec<Option<i32>> {
        store
            .list_players(&PlayerFilter::default())
            .unwrap()
            .into_iter()
            .map(|p| p.age)
            .collect()
    };
    let original = ages(&store);

    store.begin_transaction().unwrap();
    let changed = store
        .update(&PlayerFilter::default(), &PlayerChanges::default().increment_age(1))
        .unwrap();
    assert_eq!(changed, 5);
    store.rollback().unwrap();
    assert_eq!(ages(&store), original);

    store
        .in_transaction(|s| s.update(&PlayerFilter::default(), &PlayerChanges::default().increment_age(1)))
        .unwrap();
    let bumped: Vec<_> = original.iter().map(|a| a.map(|v| v + 1)).collect();
    assert_eq!(ages(&store), bumped);
}
