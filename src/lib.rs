//! # Leaguebook - club record keeping
//!
//! A small relational store for leagues, teams, players, matches and the
//! scoring events recorded during those matches.
//!
//! Leaguebook provides:
//! - Typed entities and write inputs for the five tables
//! - A SQLite-backed store handle with explicit open/close lifecycle
//! - Filtered updates and deletes with referential integrity enforced
//! - A query engine for joins, aggregates and derived lookups
//! - TOML datasets for atomic bulk seeding, including a bundled sample

pub mod entity;
pub mod storage;
pub mod query;
pub mod seed;
pub mod output;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use entity::{League, Match, Player, ScoreEvent, Team};
pub use query::QueryEngine;
pub use seed::SeedData;
pub use storage::LeagueStore;

/// Result type alias for Leaguebook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Leaguebook operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Uniqueness violation: {0}")]
    UniquenessViolation(String),

    #[error("Referential violation: {0}")]
    ReferentialViolation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Seed error: {0}")]
    Seed(String),
}

impl Error {
    /// True for the three rejections a caller can fix by correcting input
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            Error::UniquenessViolation(_) | Error::ReferentialViolation(_) | Error::Validation(_)
        )
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        storage::constraint::classify(err)
    }
}
