use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error
{
    #[error("Failed to load configuration from {}: {reason}", path.display())]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("Unknown level '{0}'")]
    UnknownLevel(String),

    #[error("Word catalog has no words for the current level")]
    EmptyCatalog,

    #[error("Failed to write {}: {source}", path.display())]
    PersistenceWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Usage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error
{
    pub fn is_not_found(&self) -> bool
    {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_error_is_not_found()
    {
        let err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.is_not_found());

        let err = Error::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"));
        assert!(!err.is_not_found());
        assert!(!Error::EmptyCatalog.is_not_found());
    }

    #[test]
    fn test_unknown_level_message()
    {
        let err = Error::UnknownLevel("space".to_string());
        assert_eq!(err.to_string(), "Unknown level 'space'");
    }
}
