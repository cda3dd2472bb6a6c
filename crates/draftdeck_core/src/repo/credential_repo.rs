//! Token persistence contract and SQLite implementation.
//!
//! # Invariants
//! - `save_token` rejects blank tokens and replaces any previous token.
//! - `clear_token` succeeds whether or not a token exists.

use crate::db::{DbError, DbResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage error for credential persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidToken,
    /// Connection mutex was poisoned by a panicking writer.
    Poisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidToken => write!(f, "refusing to persist a blank access token"),
            Self::Poisoned => write!(f, "credential storage is unavailable after a panic"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidToken | Self::Poisoned => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable store for the session token.
pub trait CredentialRepository: Send + Sync {
    fn load_token(&self) -> RepoResult<Option<String>>;
    fn save_token(&self, token: &str) -> RepoResult<()>;
    fn clear_token(&self) -> RepoResult<()>;
}

/// SQLite-backed token store with a single credential slot.
pub struct SqliteCredentialRepository {
    conn: Mutex<Connection>,
}

impl SqliteCredentialRepository {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens (and migrates) the storage file at `path`.
    pub fn open(path: impl AsRef<std::path::Path>) -> DbResult<Self> {
        crate::db::open_db(path).map(Self::new)
    }

    /// Ephemeral store, nothing survives the process.
    pub fn in_memory() -> DbResult<Self> {
        crate::db::open_db_in_memory().map(Self::new)
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> RepoResult<T>) -> RepoResult<T> {
        let conn = self.conn.lock().map_err(|_| RepoError::Poisoned)?;
        f(&conn)
    }
}

impl CredentialRepository for SqliteCredentialRepository {
    fn load_token(&self) -> RepoResult<Option<String>> {
        self.with_conn(|conn| {
            let token = conn
                .query_row(
                    "SELECT access_token FROM credentials WHERE slot = 1;",
                    [],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(token.filter(|value| !value.trim().is_empty()))
        })
    }

    fn save_token(&self, token: &str) -> RepoResult<()> {
        if token.trim().is_empty() {
            return Err(RepoError::InvalidToken);
        }
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO credentials (slot, access_token, saved_at)
                 VALUES (1, ?1, ?2)
                 ON CONFLICT(slot) DO UPDATE SET
                    access_token = excluded.access_token,
                    saved_at = excluded.saved_at;",
                params![token, now_epoch_ms()],
            )?;
            Ok(())
        })
    }

    fn clear_token(&self) -> RepoResult<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM credentials WHERE slot = 1;", [])?;
            Ok(())
        })
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{CredentialRepository, RepoError, SqliteCredentialRepository};

    #[test]
    fn save_load_and_clear_token() {
        let repo = SqliteCredentialRepository::in_memory().unwrap();
        assert_eq!(repo.load_token().unwrap(), None);

        repo.save_token("first").unwrap();
        repo.save_token("second").unwrap();
        assert_eq!(repo.load_token().unwrap().as_deref(), Some("second"));

        repo.clear_token().unwrap();
        repo.clear_token().unwrap();
        assert_eq!(repo.load_token().unwrap(), None);
    }

    #[test]
    fn blank_token_is_rejected() {
        let repo = SqliteCredentialRepository::in_memory().unwrap();
        assert!(matches!(repo.save_token("  "), Err(RepoError::InvalidToken)));
    }
}
