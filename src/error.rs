use crate::store::TableKind;
use rusqlite::ErrorCode;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("Filesystem I/O error: {0}")]
    Io(String),
    #[error("Parse error in '{path}': {message}")]
    Parse { path: String, message: String },
    #[error("Data transformation error: {0}")]
    Transform(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("JSON serialization error: {0}")]
    SerdeSerialize(String),
    #[error("Invalid argument provided: {0}")]
    Argument(String),
    #[error("Tokio task join error: {0}")]
    JoinError(String),
    #[error("Unexpected internal error: {0}")]
    Unexpected(String),
}

/// Failure reported by the target store for a single statement.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("duplicate key in '{table}': {detail}")]
    DuplicateKey { table: TableKind, detail: String },
    #[error("{0}")]
    Backend(String),
}

impl StoreError {
    /// Classifies a rusqlite failure raised while writing to `table`.
    ///
    /// Only uniqueness and primary-key violations become `DuplicateKey`;
    /// NOT NULL or CHECK violations share the primary result code but are
    /// ordinary backend failures.
    pub fn from_sqlite(table: TableKind, e: rusqlite::Error) -> StoreError {
        match &e {
            rusqlite::Error::SqliteFailure(err, detail)
                if err.code == ErrorCode::ConstraintViolation
                    && matches!(
                        err.extended_code,
                        rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                            | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    ) =>
            {
                StoreError::DuplicateKey {
                    table,
                    detail: detail.clone().unwrap_or_else(|| err.to_string()),
                }
            }
            _ => StoreError::Backend(format!("{} ({})", e, table)),
        }
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Store(StoreError::from(e))
    }
}
impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}
impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::SerdeSerialize(e.to_string())
    }
}
impl From<JoinError> for AppError {
    fn from(e: JoinError) -> Self {
        AppError::JoinError(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn parse<S: Into<String>>(path: &std::path::Path, message: S) -> AppError {
        AppError::Parse {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    pub fn transform<S: Into<String>>(message: S) -> AppError {
        AppError::Transform(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn unique_violation_is_classified_as_duplicate() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id TEXT PRIMARY KEY);")
            .unwrap();
        conn.execute("INSERT INTO t (id) VALUES (?1)", ["a"]).unwrap();
        let err = conn
            .execute("INSERT INTO t (id) VALUES (?1)", ["a"])
            .unwrap_err();

        let classified = StoreError::from_sqlite(TableKind::Songs, err);
        assert!(classified.is_duplicate_key());
    }

    #[test]
    fn not_null_violation_is_not_a_duplicate() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id TEXT PRIMARY KEY, name TEXT NOT NULL);")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t (id, name) VALUES (?1, NULL)", ["a"])
            .unwrap_err();

        let classified = StoreError::from_sqlite(TableKind::Songs, err);
        assert!(matches!(classified, StoreError::Backend(_)));
    }
}
