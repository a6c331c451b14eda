use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodezapError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Password error: {0}")]
    Password(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodezapError {
    /// Maps a uniqueness/foreign-key violation to `Conflict`, keeping every
    /// other storage failure as-is.
    pub fn from_constraint(err: rusqlite::Error, message: impl Into<String>) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref code, _)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                CodezapError::Conflict(message.into())
            }
            other => CodezapError::Storage(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, CodezapError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_constraint_violation_becomes_conflict() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err = conn.execute("INSERT INTO t VALUES ('a')", []).unwrap_err();
        let mapped = CodezapError::from_constraint(err, "duplicate name");
        assert!(matches!(mapped, CodezapError::Conflict(ref m) if m == "duplicate name"));
    }

    #[test]
    fn test_other_errors_stay_storage() {
        let mapped = CodezapError::from_constraint(rusqlite::Error::QueryReturnedNoRows, "x");
        assert!(matches!(mapped, CodezapError::Storage(_)));
    }

    #[test]
    fn test_authentication_message() {
        assert_eq!(CodezapError::AuthenticationFailed.to_string(), "Authentication failed");
    }
}
