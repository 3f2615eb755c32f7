//! Classification of SQLite constraint failures into domain errors

use rusqlite::ErrorCode;
use rusqlite::ffi;

use crate::Error;

/// Map an engine error onto the Leaguebook error taxonomy.
///
/// Foreign key failures become `ReferentialViolation`, unique and primary
/// key failures become `UniquenessViolation`, check failures become
/// `Validation`. Anything else stays a storage error.
pub fn classify(err: rusqlite::Error) -> Error {
    let constraint = match &err {
        rusqlite::Error::SqliteFailure(code, message) if code.code == ErrorCode::ConstraintViolation => {
            let detail = message.clone().unwrap_or_else(|| code.to_string());
            Some((code.extended_code, detail))
        }
        _ => None,
    };

    match constraint {
        Some((ffi::SQLITE_CONSTRAINT_FOREIGNKEY, detail)) => Error::ReferentialViolation(detail),
        Some((ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY, detail)) => {
            Error::UniquenessViolation(detail)
        }
        Some((ffi::SQLITE_CONSTRAINT_CHECK, detail)) => Error::Validation(detail),
        _ => Error::Storage(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn scratch() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE parent (id INTEGER PRIMARY KEY, name TEXT UNIQUE);
             CREATE TABLE child (id INTEGER PRIMARY KEY,
                                 parent_id INTEGER REFERENCES parent (id),
                                 n INTEGER CHECK (n >= 0));
             INSERT INTO parent (id, name) VALUES (1, 'a');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_unique_failure_is_uniqueness_violation() {
        let conn = scratch();
        let err = conn
            .execute("INSERT INTO parent (id, name) VALUES (2, 'a')", [])
            .unwrap_err();
        assert!(matches!(classify(err), Error::UniquenessViolation(msg) if msg.contains("parent.name")));
    }

    #[test]
    fn test_foreign_key_failure_is_referential_violation() {
        let conn = scratch();
        let err = conn
            .execute("INSERT INTO child (parent_id, n) VALUES (99, 1)", [])
            .unwrap_err();
        assert!(matches!(classify(err), Error::ReferentialViolation(_)));
    }

    #[test]
    fn test_check_failure_is_validation() {
        let conn = scratch();
        let err = conn
            .execute("INSERT INTO child (parent_id, n) VALUES (1, -1)", [])
            .unwrap_err();
        assert!(matches!(classify(err), Error::Validation(_)));
    }

    #[test]
    fn test_other_failures_stay_storage_errors() {
        let conn = scratch();
        let err = conn.execute("SELECT * FROM missing_table", []).unwrap_err();
        assert!(matches!(classify(err), Error::Storage(_)));
    }
}
