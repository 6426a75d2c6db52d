//! Error types for Pope Books

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PopebooksError {
    #[error("Search error: {0}")]
    Search(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl From<rusqlite::Error> for PopebooksError {
    fn from(e: rusqlite::Error) -> Self {
        PopebooksError::Database(e.to_string())
    }
}

impl serde::Serialize for PopebooksError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T, E = PopebooksError> = std::result::Result<T, E>;
