//! Database schema definitions

/// Applied to every connection; SQLite leaves foreign keys off by default
pub const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

/// SQL to create the leagues table
pub const CREATE_LEAGUES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS leagues (
    league_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    country TEXT
)
"#;

/// SQL to create the teams table
pub const CREATE_TEAMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS teams (
    team_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    coach_name TEXT,
    founded_year INTEGER,
    league_id INTEGER REFERENCES leagues (league_id)
)
"#;

/// SQL to create the players table
pub const CREATE_PLAYERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS players (
    player_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    position TEXT,
    age INTEGER CHECK (age BETWEEN -2147483648 AND 2147483647),
    nationality TEXT,
    team_id INTEGER REFERENCES teams (team_id)
)
"#;

/// SQL to create the matches table
pub const CREATE_MATCHES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS matches (
    match_id INTEGER PRIMARY KEY AUTOINCREMENT,
    league_id INTEGER NOT NULL REFERENCES leagues (league_id),
    home_team_id INTEGER NOT NULL REFERENCES teams (team_id),
    away_team_id INTEGER NOT NULL REFERENCES teams (team_id),
    match_date TEXT NOT NULL,
    venue TEXT,
    CHECK (home_team_id <> away_team_id)
)
"#;

/// SQL to create the score_events table
pub const CREATE_SCORE_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS score_events (
    score_id INTEGER PRIMARY KEY AUTOINCREMENT,
    match_id INTEGER NOT NULL REFERENCES matches (match_id),
    team_id INTEGER NOT NULL REFERENCES teams (team_id),
    goals_scored INTEGER NOT NULL CHECK (goals_scored >= 0),
    player_id INTEGER REFERENCES players (player_id),
    minute INTEGER
)
"#;

/// Standing projection of players with their team and league
pub const CREATE_PLAYER_SUMMARY_VIEW: &str = r#"
CREATE VIEW IF NOT EXISTS player_summary AS
SELECT p.player_id, p.name AS player_name, p.position, p.age, p.nationality,
       t.name AS team_name, l.name AS league_name
FROM players p
JOIN teams t ON p.team_id = t.team_id
JOIN leagues l ON t.league_id = l.league_id
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_players_name ON players(name)",
    "CREATE INDEX IF NOT EXISTS idx_matches_date ON matches(match_date)",
];

/// Tables in dependency order (referenced tables first)
pub const TABLES: &[&str] = &["leagues", "teams", "players", "matches", "score_events"];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_LEAGUES_TABLE,
        CREATE_TEAMS_TABLE,
        CREATE_PLAYERS_TABLE,
        CREATE_MATCHES_TABLE,
        CREATE_SCORE_EVENTS_TABLE,
        CREATE_PLAYER_SUMMARY_VIEW,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
