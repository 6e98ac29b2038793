use thiserror::Error;

/// Errors from guidance operations that have no fallback.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Llm(#[from] llm::Error),

    #[error(transparent)]
    Storage(#[from] storage::Error),

    /// The user has not completed onboarding.
    #[error("no profile for user {0}")]
    NoProfile(String),
}

pub type Result<T> = std::result::Result<T, Error>;
