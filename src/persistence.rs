use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

/// Durable storage for a single serialized value
pub trait Persistence {
    /// `Ok(None)` when nothing has been stored yet
    fn load(&self) -> Result<Option<Vec<u8>>>;
    fn save(&mut self, bytes: &[u8]) -> Result<()>;
    fn delete(&mut self) -> Result<()>;
}

impl<T: Persistence + ?Sized> Persistence for Box<T> {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        (**self).load()
    }

    fn save(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).save(bytes)
    }

    fn delete(&mut self) -> Result<()> {
        (**self).delete()
    }
}

/// In-process storage, lost on drop
#[derive(Debug, Default, Clone)]
pub struct MemoryPersistence {
    value: Option<Vec<u8>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            value: Some(bytes.into()),
        }
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.value.clone())
    }

    fn save(&mut self, bytes: &[u8]) -> Result<()> {
        self.value = Some(bytes.to_vec());
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        self.value = None;
        Ok(())
    }
}

/// One file holds the value
#[derive(Debug, Clone)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for FilePersistence {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Key-value row in a SQLite database
#[derive(Debug)]
pub struct SqlitePersistence {
    conn: Connection,
    key: String,
}

impl SqlitePersistence {
    /// Open (or create) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P, key: &str) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn, key)
    }

    pub fn open_in_memory(key: &str) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, key)
    }

    fn from_connection(conn: Connection, key: &str) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;
        Ok(Self {
            conn,
            key: key.to_string(),
        })
    }
}

impl Persistence for SqlitePersistence {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![self.key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save(&mut self, bytes: &[u8]) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
            params![self.key, bytes],
        )?;
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![self.key])?;
        Ok(())
    }
}
