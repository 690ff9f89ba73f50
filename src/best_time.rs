use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::StoreError;

/// Key of the single best-time record
pub const BEST_TIME_KEY: &str = "dragGame_bestTime";

/// Persistence for the fastest fully correct completion, in whole seconds
pub trait BestTimeStore {
    fn load(&self) -> Result<Option<u64>, StoreError>;
    fn save(&self, secs: u64) -> Result<(), StoreError>;
}

/// Stored values are decimal strings; anything else counts as no record.
fn parse_best_time(raw: Option<String>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
}

/// Key/value records table in a small SQLite database
#[derive(Debug)]
pub struct SqliteBestTimeStore {
    conn: Connection,
}

impl SqliteBestTimeStore {
    /// Open (and create if needed) the database under the user state dir
    pub fn open_default() -> Result<Self, StoreError> {
        let path = AppDirs::records_db_path().unwrap_or_else(|| PathBuf::from("wordmatch.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM records WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO records (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value, Local::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Write a raw value under the best-time key, bypassing validation
    pub fn put_raw(&self, value: &str) -> Result<(), StoreError> {
        self.put(BEST_TIME_KEY, value)
    }
}

impl BestTimeStore for SqliteBestTimeStore {
    fn load(&self) -> Result<Option<u64>, StoreError> {
        Ok(parse_best_time(self.get(BEST_TIME_KEY)?))
    }

    fn save(&self, secs: u64) -> Result<(), StoreError> {
        self.put(BEST_TIME_KEY, &secs.to_string())
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryBestTimeStore {
    value: RefCell<Option<String>>,
}

impl MemoryBestTimeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(value: &str) -> Self {
        Self {
            value: RefCell::new(Some(value.to_string())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.value.borrow().clone()
    }
}

impl BestTimeStore for MemoryBestTimeStore {
    fn load(&self) -> Result<Option<u64>, StoreError> {
        Ok(parse_best_time(self.value.borrow().clone()))
    }

    fn save(&self, secs: u64) -> Result<(), StoreError> {
        *self.value.borrow_mut() = Some(secs.to_string());
        Ok(())
    }
}

impl<S: BestTimeStore + ?Sized> BestTimeStore for Box<S> {
    fn load(&self) -> Result<Option<u64>, StoreError> {
        (**self).load()
    }

    fn save(&self, secs: u64) -> Result<(), StoreError> {
        (**self).save(secs)
    }
}

impl<S: BestTimeStore + ?Sized> BestTimeStore for std::rc::Rc<S> {
    fn load(&self) -> Result<Option<u64>, StoreError> {
        (**self).load()
    }

    fn save(&self, secs: u64) -> Result<(), StoreError> {
        (**self).save(secs)
    }
}
