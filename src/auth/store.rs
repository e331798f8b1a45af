//! SQLite credential store.

use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

use super::error::AuthError;
use super::models::User;

/// Persists credential records, keyed by unique email. Safe for concurrent
/// use; clones share one connection.
pub struct UserStore {
    conn: Arc<Mutex<Connection>>,
}

impl UserStore {
    /// Open (or create) the database at `path` and initialize the schema.
    pub fn open(path: &str) -> Result<Self, AuthError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store, for tests.
    pub fn in_memory() -> Result<Self, AuthError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), AuthError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                username TEXT NOT NULL,
                password_hash TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
            "#,
        )?;
        Ok(())
    }

    /// Insert a new credential record. An email collision surfaces as
    /// `DuplicateAccount`.
    pub fn create(&self, user: &User) -> Result<(), AuthError> {
        let conn = self.conn.lock().unwrap();
        let result = conn.execute(
            "INSERT INTO users (id, email, username, password_hash, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.email,
                user.username,
                user.password_hash,
                user.created_at,
                user.updated_at,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(AuthError::DuplicateAccount)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look a record up by email.
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, email, username, password_hash, created_at, updated_at
             FROM users WHERE email = ?1",
        )?;

        let mut rows = stmt.query(params![email])?;
        if let Some(row) = rows.next()? {
            Ok(Some(User {
                id: row.get(0)?,
                email: row.get(1)?,
                username: row.get(2)?,
                password_hash: row.get(3)?,
                created_at: row.get(4)?,
                updated_at: row.get(5)?,
            }))
        } else {
            Ok(None)
        }
    }

    #[cfg(test)]
    pub fn count(&self) -> Result<i64, AuthError> {
        let conn = self.conn.lock().unwrap();
        let n = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(n)
    }
}

impl Clone for UserStore {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_create_and_find_user() {
        let store = UserStore::in_memory().unwrap();

        let user = User::new("test@example.com", "testuser", Some("hash123".to_string()));
        store.create(&user).unwrap();

        let found = store.find_by_email("test@example.com").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.username, "testuser");
        assert_eq!(found.password_hash.as_deref(), Some("hash123"));
    }

    #[test]
    fn test_missing_user_is_none() {
        let store = UserStore::in_memory().unwrap();
        assert!(store.find_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_is_rejected() {
        let store = UserStore::in_memory().unwrap();

        let first = User::new("test@example.com", "first", Some("hash1".to_string()));
        store.create(&first).unwrap();

        let second = User::new("test@example.com", "second", Some("hash2".to_string()));
        assert_matches!(store.create(&second), Err(AuthError::DuplicateAccount));

        // The first record is unaffected.
        let found = store.find_by_email("test@example.com").unwrap().unwrap();
        assert_eq!(found.username, "first");
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greenroom.db");
        let store = UserStore::open(path.to_str().unwrap()).unwrap();

        let user = User::new("disk@example.com", "diskuser", None);
        store.create(&user).unwrap();
        assert!(store.find_by_email("disk@example.com").unwrap().is_some());
    }
}
