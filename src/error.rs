//! Error type shared by the state store, the mutation entry point and the
//! business model editor.

use thiserror::Error;

/// Everything that can go wrong while loading, mutating or saving state.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("no installation named '{0}'")]
    UnknownInstallation(String),
    #[error("no task '{0}' in the catalog")]
    UnknownTask(String),
    #[error("no phase '{0}' in the catalog")]
    UnknownPhase(String),
    #[error("installation '{0}' already exists")]
    InstallationExists(String),
    #[error("installation limit reached: max={0}")]
    InstallationLimit(usize),
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
    #[error("no process named '{0}'")]
    UnknownProcess(String),
    #[error("no {kind} with id '{id}'")]
    UnknownRecord { kind: &'static str, id: String },
    #[error("{0} must be a finite number")]
    InvalidNumber(&'static str),
    #[error("could not parse date '{0}'")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
