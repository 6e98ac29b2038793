use thiserror::Error;

/// Errors from a vendor call.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// The request never produced an HTTP response.
    #[error("network: {0}")]
    Network(String),

    /// The vendor rejected the credential.
    #[error("authentication rejected ({status})")]
    Auth { status: u16 },

    /// The vendor throttled the request or the quota is exhausted.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other non-success response.
    #[error("provider api: {status}: {body}")]
    Api { status: u16, body: String },

    /// The response envelope did not have the documented shape.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Errors surfaced by the generation layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// No usable credential was found for any vendor.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The model replied, but no JSON could be recovered from the text.
    #[error("unparseable model output: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
