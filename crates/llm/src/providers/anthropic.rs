//! Anthropic messages backend.
//!
//! The messages API has no structured-output mode, so the schema travels in
//! the system prompt and JSON is recovered from the reply text.

use super::send_json;
use crate::schema::{Dialect, translate};
use crate::{
    GenerationRequest, ImageAttachment, Provider, ProviderError, ProviderProfile, Result,
    extract_json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const JSON_SYSTEM_PROMPT: &str = "You are a JSON generator. Output only valid JSON.";
const EMPTY_CHAT_REPLY: &str = "I'm not sure.";

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: ApiContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiContent<'a> {
    Text(&'a str),
    Blocks(Vec<ApiContentBlock<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContentBlock<'a> {
    Text { text: &'a str },
    Image { source: ApiImageSource<'a> },
}

#[derive(Debug, Serialize)]
struct ApiImageSource<'a> {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'a str,
    data: &'a str,
}

impl<'a> From<&'a ImageAttachment> for ApiContentBlock<'a> {
    fn from(image: &'a ImageAttachment) -> Self {
        Self::Image {
            source: ApiImageSource {
                source_type: "base64",
                media_type: &image.mime_type,
                data: &image.data,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ApiResponseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Unknown,
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating an Anthropic provider.
#[derive(Debug, Clone)]
pub struct AnthropicProviderBuilder {
    profile: ProviderProfile,
    max_tokens: u32,
    chat_max_tokens: u32,
}

impl AnthropicProviderBuilder {
    pub fn new(profile: ProviderProfile) -> Self {
        Self {
            profile,
            max_tokens: 4000,
            chat_max_tokens: 1000,
        }
    }

    /// Output budget for structured generation.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Output budget for chat replies.
    pub fn chat_max_tokens(mut self, max_tokens: u32) -> Self {
        self.chat_max_tokens = max_tokens;
        self
    }

    pub fn build(self) -> AnthropicProvider {
        AnthropicProvider {
            client: reqwest::Client::new(),
            profile: self.profile,
            max_tokens: self.max_tokens,
            chat_max_tokens: self.chat_max_tokens,
        }
    }
}

/// Anthropic provider. Prompt-instructed JSON, no image generation.
#[derive(Debug)]
pub struct AnthropicProvider {
    client: reqwest::Client,
    profile: ProviderProfile,
    max_tokens: u32,
    chat_max_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(profile: ProviderProfile) -> Self {
        Self::builder(profile).build()
    }

    pub fn builder(profile: ProviderProfile) -> AnthropicProviderBuilder {
        AnthropicProviderBuilder::new(profile)
    }

    fn system_prompt(request: &GenerationRequest) -> String {
        match &request.schema {
            Some(schema) => format!(
                "{JSON_SYSTEM_PROMPT} Ensure it matches this structure: {}",
                translate(schema, Dialect::JsonSchema)
            ),
            None => JSON_SYSTEM_PROMPT.to_string(),
        }
    }

    fn user_content<'a>(&self, request: &'a GenerationRequest) -> ApiContent<'a> {
        if request.images.is_empty() {
            return ApiContent::Text(&request.prompt);
        }
        if !self.profile.capabilities.vision_input {
            tracing::warn!(model = %self.profile.models.structured, "vision input disabled; dropping images");
            return ApiContent::Text(&request.prompt);
        }

        let mut blocks: Vec<ApiContentBlock<'a>> =
            request.images.iter().map(ApiContentBlock::from).collect();
        blocks.push(ApiContentBlock::Text {
            text: &request.prompt,
        });
        ApiContent::Blocks(blocks)
    }

    /// Send a message and join the text blocks of the reply.
    async fn complete(&self, body: &ApiRequest<'_>) -> std::result::Result<String, ProviderError> {
        let request = self
            .client
            .post(self.profile.endpoint("/v1/messages"))
            .header("x-api-key", self.profile.api_key())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("accept", "application/json")
            .json(body);

        let response: ApiResponse = send_json(request).await?;
        let text = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ApiResponseBlock::Text { text } => Some(text),
                ApiResponseBlock::Unknown => None,
            })
            .collect::<Vec<_>>()
            .join("");
        Ok(text)
    }
}

impl std::fmt::Display for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "anthropic({})", self.profile.models.structured)
    }
}

impl Provider for AnthropicProvider {
    fn profile(&self) -> &ProviderProfile {
        &self.profile
    }

    async fn generate_content(&self, request: &GenerationRequest) -> Result<Value> {
        let body = ApiRequest {
            model: &self.profile.models.structured,
            max_tokens: self.max_tokens,
            messages: vec![ApiMessage {
                role: "user",
                content: self.user_content(request),
            }],
            system: Some(Self::system_prompt(request)),
        };

        let text = self.complete(&body).await?;
        extract_json(&text).inspect_err(|e| {
            tracing::warn!(error = %e, "anthropic reply held no JSON");
        })
    }

    async fn generate_image(&self, _description: &str) -> Option<String> {
        tracing::warn!("anthropic does not support image generation");
        None
    }

    async fn chat(&self, context: &str, question: &str) -> Result<String> {
        let body = ApiRequest {
            model: &self.profile.models.chat,
            max_tokens: self.chat_max_tokens,
            messages: vec![ApiMessage {
                role: "user",
                content: ApiContent::Text(question),
            }],
            system: Some(format!("Context: {context}")),
        };

        let text = self.complete(&body).await?;
        if text.trim().is_empty() {
            return Ok(EMPTY_CHAT_REPLY.to_string());
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProviderKind, Schema};
    use serde_json::json;

    fn profile() -> ProviderProfile {
        ProviderProfile::defaults(ProviderKind::Anthropic, "sk-ant")
    }

    #[test]
    fn builder_sets_budgets() {
        let provider = AnthropicProvider::builder(profile())
            .max_tokens(2048)
            .chat_max_tokens(256)
            .build();
        assert_eq!(provider.max_tokens, 2048);
        assert_eq!(provider.chat_max_tokens, 256);
        assert_eq!(provider.to_string(), "anthropic(claude-3-opus-20240229)");
    }

    #[test]
    fn schema_travels_in_system_prompt() {
        let request = GenerationRequest::new("List options")
            .with_schema(Schema::array(Schema::string()));
        let system = AnthropicProvider::system_prompt(&request);
        assert!(system.starts_with(JSON_SYSTEM_PROMPT));
        assert!(system.contains(r#""type":"array""#));
    }

    #[test]
    fn images_precede_prompt_text() {
        let request = GenerationRequest::new("Read this")
            .with_image(ImageAttachment::new("QUJD", "image/jpeg"));
        let content = serde_json::to_value(AnthropicProvider::new(profile()).user_content(&request))
            .unwrap();
        assert_eq!(
            content[0],
            json!({"type": "image", "source": {"type": "base64", "media_type": "image/jpeg", "data": "QUJD"}})
        );
        assert_eq!(content[1], json!({"type": "text", "text": "Read this"}));
    }
}
