//! CLI error types.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// No onboarding profile has been stored yet.
    #[error("no profile found. Run 'waypoint profile set <FILE>' first")]
    NoProfile,

    /// The profile document is not a JSON object.
    #[error("invalid profile in {path}: {reason}")]
    InvalidProfile { path: PathBuf, reason: String },

    /// No journal entry has this id for the current user.
    #[error("no reflection with id {0}")]
    ReflectionNotFound(String),

    /// The argument is not a valid reflection or session id.
    #[error("invalid id '{0}'")]
    InvalidId(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred in the generation layer.
    #[error(transparent)]
    Llm(#[from] llm::Error),

    #[error(transparent)]
    Guidance(#[from] guidance::Error),

    /// An error occurred in the storage layer.
    #[error(transparent)]
    Storage(#[from] storage::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The message shown to the user.
    ///
    /// Vendor failures are summarized; their details only go to the log.
    pub fn user_message(&self) -> String {
        match self {
            Self::Llm(llm::Error::Configuration(msg))
            | Self::Guidance(guidance::Error::Llm(llm::Error::Configuration(msg))) => {
                format!("provider not configured: {msg}")
            }
            Self::Llm(_) | Self::Guidance(guidance::Error::Llm(_)) => {
                "the guidance service is unavailable right now, please try again later".into()
            }
            Self::Guidance(guidance::Error::NoProfile(_)) => Self::NoProfile.to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
