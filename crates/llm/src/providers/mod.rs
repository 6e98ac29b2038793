//! Vendor adapters.
//!
//! Each adapter implements [`Provider`] for one vendor API on its own. They
//! share nothing but the HTTP error classification below.

mod anthropic;
mod gemini;
mod openai;

pub use anthropic::{AnthropicProvider, AnthropicProviderBuilder};
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

use crate::{GenerationRequest, Provider, ProviderError, ProviderKind, ProviderProfile, Result};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// The adapter picked by the selector.
#[derive(Debug)]
pub enum ActiveProvider {
    OpenAi(OpenAiProvider),
    Anthropic(AnthropicProvider),
    Gemini(GeminiProvider),
}

impl ActiveProvider {
    /// Build the adapter matching the profile's vendor.
    pub fn from_profile(profile: ProviderProfile) -> Self {
        match profile.kind {
            ProviderKind::OpenAi => Self::OpenAi(OpenAiProvider::new(profile)),
            ProviderKind::Anthropic => Self::Anthropic(AnthropicProvider::new(profile)),
            ProviderKind::Gemini => Self::Gemini(GeminiProvider::new(profile)),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.profile().kind
    }
}

impl std::fmt::Display for ActiveProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi(p) => write!(f, "{p}"),
            Self::Anthropic(p) => write!(f, "{p}"),
            Self::Gemini(p) => write!(f, "{p}"),
        }
    }
}

impl Provider for ActiveProvider {
    fn profile(&self) -> &ProviderProfile {
        match self {
            Self::OpenAi(p) => p.profile(),
            Self::Anthropic(p) => p.profile(),
            Self::Gemini(p) => p.profile(),
        }
    }

    async fn generate_content(&self, request: &GenerationRequest) -> Result<Value> {
        match self {
            Self::OpenAi(p) => p.generate_content(request).await,
            Self::Anthropic(p) => p.generate_content(request).await,
            Self::Gemini(p) => p.generate_content(request).await,
        }
    }

    async fn generate_image(&self, description: &str) -> Option<String> {
        match self {
            Self::OpenAi(p) => p.generate_image(description).await,
            Self::Anthropic(p) => p.generate_image(description).await,
            Self::Gemini(p) => p.generate_image(description).await,
        }
    }

    async fn chat(&self, context: &str, question: &str) -> Result<String> {
        match self {
            Self::OpenAi(p) => p.chat(context, question).await,
            Self::Anthropic(p) => p.chat(context, question).await,
            Self::Gemini(p) => p.chat(context, question).await,
        }
    }
}

/// Send a request and decode a successful JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> std::result::Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(classify(status.as_u16(), body));
    }

    response
        .json()
        .await
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

fn classify(status: u16, body: String) -> ProviderError {
    match status {
        401 | 403 => ProviderError::Auth { status },
        429 => ProviderError::RateLimited(body),
        _ if body.to_ascii_lowercase().contains("resource_exhausted") => {
            ProviderError::RateLimited(body)
        }
        _ => ProviderError::Api { status, body },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(classify(401, String::new()), ProviderError::Auth { status: 401 }));
        assert!(matches!(classify(403, String::new()), ProviderError::Auth { status: 403 }));
        assert!(matches!(classify(429, "slow down".into()), ProviderError::RateLimited(_)));
        assert!(matches!(
            classify(400, "{\"status\":\"RESOURCE_EXHAUSTED\"}".into()),
            ProviderError::RateLimited(_)
        ));
        assert!(matches!(classify(500, "boom".into()), ProviderError::Api { status: 500, .. }));
    }

    #[test]
    fn adapter_follows_profile_kind() {
        for kind in ProviderKind::PRIORITY {
            let active = ActiveProvider::from_profile(ProviderProfile::defaults(kind, "k"));
            assert_eq!(active.kind(), kind);
        }
    }
}
