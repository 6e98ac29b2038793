//! Provider identities, per-provider configuration and credentials.

use serde::Deserialize;
use std::collections::HashMap;

/// One of the supported vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
}

impl ProviderKind {
    /// Selection order. The first vendor with a credential is used.
    pub const PRIORITY: [ProviderKind; 3] = [Self::OpenAi, Self::Anthropic, Self::Gemini];

    /// Environment variable holding the vendor credential.
    pub fn env_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model identifiers for the three kinds of call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSet {
    /// Structured (JSON) generation.
    pub structured: String,
    /// Fast conversational replies.
    pub chat: String,
    /// Image synthesis, if the vendor offers it.
    pub image: Option<String>,
}

/// What a vendor can do beyond text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub image_generation: bool,
    pub vision_input: bool,
}

/// Immutable configuration of one provider adapter.
#[derive(Clone)]
pub struct ProviderProfile {
    pub kind: ProviderKind,
    api_key: String,
    pub base_url: String,
    pub models: ModelSet,
    pub capabilities: Capabilities,
}

impl std::fmt::Debug for ProviderProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderProfile")
            .field("kind", &self.kind)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

impl ProviderProfile {
    /// The stock configuration for a vendor.
    pub fn defaults(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        let (base_url, models, capabilities) = match kind {
            ProviderKind::OpenAi => (
                "https://api.openai.com",
                ModelSet {
                    structured: "gpt-4o".into(),
                    chat: "gpt-4o-mini".into(),
                    image: Some("dall-e-3".into()),
                },
                Capabilities {
                    image_generation: true,
                    vision_input: true,
                },
            ),
            ProviderKind::Anthropic => (
                "https://api.anthropic.com",
                ModelSet {
                    structured: "claude-3-opus-20240229".into(),
                    chat: "claude-3-sonnet-20240229".into(),
                    image: None,
                },
                Capabilities {
                    image_generation: false,
                    vision_input: true,
                },
            ),
            ProviderKind::Gemini => (
                "https://generativelanguage.googleapis.com",
                ModelSet {
                    structured: "gemini-3-pro-preview".into(),
                    chat: "gemini-3-flash-preview".into(),
                    image: Some("gemini-2.5-flash-image".into()),
                },
                Capabilities {
                    image_generation: true,
                    vision_input: true,
                },
            ),
        };
        Self {
            kind,
            api_key: api_key.into(),
            base_url: base_url.to_string(),
            models,
            capabilities,
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Apply configured overrides on top of this profile.
    pub fn with_overrides(mut self, overrides: &ProfileOverrides) -> Self {
        if let Some(base_url) = &overrides.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(model) = &overrides.model {
            self.models.structured = model.clone();
        }
        if let Some(chat_model) = &overrides.chat_model {
            self.models.chat = chat_model.clone();
        }
        if self.models.image.is_some() {
            if let Some(image_model) = &overrides.image_model {
                self.models.image = Some(image_model.clone());
            }
        }
        if overrides.image_generation == Some(false) {
            self.capabilities.image_generation = false;
        }
        self
    }

    /// Join a path onto the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Optional per-provider settings, typically read from the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileOverrides {
    pub base_url: Option<String>,
    /// Model for structured generation.
    pub model: Option<String>,
    pub chat_model: Option<String>,
    /// Ignored for vendors without image generation.
    pub image_model: Option<String>,
    /// Set to `false` to turn image generation off.
    pub image_generation: Option<bool>,
}

/// Vendor credentials available to the selector.
#[derive(Clone, Default)]
pub struct Credentials {
    keys: HashMap<ProviderKind, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let present: Vec<_> = ProviderKind::PRIORITY
            .iter()
            .filter(|kind| self.get(**kind).is_some())
            .collect();
        f.debug_struct("Credentials")
            .field("present", &present)
            .finish()
    }
}

impl Credentials {
    /// Read the vendor key variables from the process environment.
    pub fn from_env() -> Self {
        ProviderKind::PRIORITY
            .into_iter()
            .fold(Self::default(), |creds, kind| match std::env::var(kind.env_var()) {
                Ok(key) => creds.with(kind, key),
                Err(_) => creds,
            })
    }

    pub fn with(mut self, kind: ProviderKind, key: impl Into<String>) -> Self {
        self.keys.insert(kind, key.into());
        self
    }

    /// The credential for a vendor. Blank values count as absent.
    pub fn get(&self, kind: ProviderKind) -> Option<&str> {
        self.keys
            .get(&kind)
            .map(|key| key.trim())
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_credentials_are_absent() {
        let creds = Credentials::default()
            .with(ProviderKind::OpenAi, "   ")
            .with(ProviderKind::Gemini, "g-key");
        assert_eq!(creds.get(ProviderKind::OpenAi), None);
        assert_eq!(creds.get(ProviderKind::Gemini), Some("g-key"));
    }

    #[test]
    fn debug_output_hides_keys() {
        let creds = Credentials::default().with(ProviderKind::Anthropic, "sk-secret");
        assert!(!format!("{creds:?}").contains("sk-secret"));

        let profile = ProviderProfile::defaults(ProviderKind::OpenAi, "sk-secret");
        assert!(!format!("{profile:?}").contains("sk-secret"));
    }

    #[test]
    fn overrides_replace_models_but_not_capabilities() {
        let overrides = ProfileOverrides {
            base_url: Some("http://localhost:9999/".into()),
            image_model: Some("imagen".into()),
            ..Default::default()
        };
        let anthropic =
            ProviderProfile::defaults(ProviderKind::Anthropic, "k").with_overrides(&overrides);
        assert_eq!(anthropic.models.image, None);
        assert!(!anthropic.capabilities.image_generation);
        assert_eq!(anthropic.endpoint("/v1/messages"), "http://localhost:9999/v1/messages");

        let gemini =
            ProviderProfile::defaults(ProviderKind::Gemini, "k").with_overrides(&ProfileOverrides {
                image_generation: Some(false),
                ..Default::default()
            });
        assert!(!gemini.capabilities.image_generation);
    }

    #[test]
    fn kinds_deserialize_lowercase() {
        let kind: ProviderKind = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(kind, ProviderKind::OpenAi);
        assert_eq!(ProviderKind::Gemini.env_var(), "GEMINI_API_KEY");
    }
}
