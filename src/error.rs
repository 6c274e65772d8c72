use std::fmt;

#[derive(Debug)]
pub enum SnagError {
    Io(std::io::Error),
    Sqlite(rusqlite::Error),
    Serialize(serde_json::Error),
    Csv(csv::Error),
    Config(String),
}

impl fmt::Display for SnagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Sqlite(e) => write!(f, "sqlite error: {e}"),
            Self::Serialize(e) => write!(f, "serialization error: {e}"),
            Self::Csv(e) => write!(f, "csv error: {e}"),
            Self::Config(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for SnagError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Sqlite(e) => Some(e),
            Self::Serialize(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for SnagError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<rusqlite::Error> for SnagError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sqlite(e)
    }
}

impl From<serde_json::Error> for SnagError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(e)
    }
}

impl From<csv::Error> for SnagError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

pub type Result<T> = std::result::Result<T, SnagError>;
