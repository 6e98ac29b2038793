//! OpenAI chat-completions and images backend.

use super::send_json;
use crate::schema::{Dialect, translate, unwrap_result, wrap_result};
use crate::{
    Error, GenerationRequest, Provider, ProviderError, ProviderProfile, Result, Schema, data_url,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const JSON_INSTRUCTION: &str = "Respond with valid JSON only.";
const EMPTY_CHAT_REPLY: &str = "I'm not sure.";
const IMAGE_SIZE: &str = "1024x1024";

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
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
    Parts(Vec<ApiContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ApiImageUrl },
}

#[derive(Debug, Serialize)]
struct ApiImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiReply,
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'static str,
    response_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApiImageResponse {
    #[serde(default)]
    data: Vec<ApiImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ApiImageDatum {
    b64_json: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// OpenAI backend. Uses native strict structured output.
#[derive(Debug)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    profile: ProviderProfile,
}

impl OpenAiProvider {
    pub fn new(profile: ProviderProfile) -> Self {
        Self {
            client: reqwest::Client::new(),
            profile,
        }
    }

    /// The strict dialect only accepts an object root; other roots are nested
    /// under a synthetic property. Returns the format and whether it wrapped.
    fn response_format(schema: Option<&Schema>) -> (Value, bool) {
        let Some(schema) = schema else {
            return (json!({ "type": "json_object" }), false);
        };
        let translated = translate(schema, Dialect::OpenAiStrict);
        let wrapped = Dialect::OpenAiStrict.requires_object_root() && schema.as_object().is_none();
        let root = if wrapped {
            wrap_result(translated)
        } else {
            translated
        };
        let format = json!({
            "type": "json_schema",
            "json_schema": {
                "name": "response",
                "strict": true,
                "schema": root,
            },
        });
        (format, wrapped)
    }

    fn user_content<'a>(&self, request: &'a GenerationRequest) -> ApiContent<'a> {
        if request.images.is_empty() {
            return ApiContent::Text(&request.prompt);
        }
        if !self.profile.capabilities.vision_input {
            tracing::warn!(model = %self.profile.models.structured, "vision input disabled; dropping images");
            return ApiContent::Text(&request.prompt);
        }

        let mut parts = vec![ApiContentPart::Text {
            text: &request.prompt,
        }];
        parts.extend(request.images.iter().map(|image| ApiContentPart::ImageUrl {
            image_url: ApiImageUrl {
                url: image.to_data_url(),
            },
        }));
        ApiContent::Parts(parts)
    }

    async fn complete(&self, body: &ApiRequest<'_>) -> std::result::Result<String, ProviderError> {
        let request = self
            .client
            .post(self.profile.endpoint("/v1/chat/completions"))
            .bearer_auth(self.profile.api_key())
            .json(body);

        let response: ApiResponse = send_json(request).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("no choices in response".into()))?
            .message
            .content
            .unwrap_or_default();
        Ok(content)
    }
}

impl std::fmt::Display for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "openai({})", self.profile.models.structured)
    }
}

impl Provider for OpenAiProvider {
    fn profile(&self) -> &ProviderProfile {
        &self.profile
    }

    async fn generate_content(&self, request: &GenerationRequest) -> Result<Value> {
        let (response_format, wrapped) = Self::response_format(request.schema.as_ref());

        let body = ApiRequest {
            model: &self.profile.models.structured,
            messages: vec![
                ApiMessage {
                    role: "system",
                    content: ApiContent::Text(JSON_INSTRUCTION),
                },
                ApiMessage {
                    role: "user",
                    content: self.user_content(request),
                },
            ],
            response_format: Some(response_format),
        };

        let content = self.complete(&body).await?;
        let content = if content.trim().is_empty() {
            "{}"
        } else {
            content.as_str()
        };

        let parsed: Value = serde_json::from_str(content).map_err(|e| {
            tracing::warn!(error = %e, "openai returned malformed JSON");
            Error::Parse(e.to_string())
        })?;
        Ok(if wrapped { unwrap_result(parsed) } else { parsed })
    }

    async fn generate_image(&self, description: &str) -> Option<String> {
        let model = match &self.profile.models.image {
            Some(model) if self.profile.capabilities.image_generation => model,
            _ => return None,
        };

        let body = ApiImageRequest {
            model,
            prompt: description,
            n: 1,
            size: IMAGE_SIZE,
            response_format: "b64_json",
        };
        let request = self
            .client
            .post(self.profile.endpoint("/v1/images/generations"))
            .bearer_auth(self.profile.api_key())
            .json(&body);

        match send_json::<ApiImageResponse>(request).await {
            Ok(response) => response
                .data
                .into_iter()
                .find_map(|datum| datum.b64_json)
                .map(|b64| data_url("image/png", &b64)),
            Err(e) => {
                tracing::warn!(error = %e, "openai image generation failed");
                None
            }
        }
    }

    async fn chat(&self, context: &str, question: &str) -> Result<String> {
        let system = format!("Context: {context}");
        let body = ApiRequest {
            model: &self.profile.models.chat,
            messages: vec![
                ApiMessage {
                    role: "system",
                    content: ApiContent::Text(&system),
                },
                ApiMessage {
                    role: "user",
                    content: ApiContent::Text(question),
                },
            ],
            response_format: None,
        };

        let content = self.complete(&body).await?;
        if content.trim().is_empty() {
            return Ok(EMPTY_CHAT_REPLY.to_string());
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ImageAttachment, ProviderKind};

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new(ProviderProfile::defaults(ProviderKind::OpenAi, "sk-test"))
    }

    #[test]
    fn array_schema_is_wrapped_under_result() {
        let (format, wrapped) =
            OpenAiProvider::response_format(Some(&Schema::array(Schema::string())));
        assert!(wrapped);
        let schema = &format["json_schema"]["schema"];
        assert_eq!(schema["properties"]["result"]["type"], "array");
        assert_eq!(format["json_schema"]["strict"], true);
    }

    #[test]
    fn object_schema_is_sent_as_root() {
        let (format, wrapped) = OpenAiProvider::response_format(Some(&Schema::object([(
            "gpaInsight",
            Schema::string(),
        )])));
        assert!(!wrapped);
        assert_eq!(format["json_schema"]["schema"]["type"], "object");
    }

    #[test]
    fn no_schema_uses_json_object_mode() {
        let (format, wrapped) = OpenAiProvider::response_format(None);
        assert!(!wrapped);
        assert_eq!(format, json!({"type": "json_object"}));
    }

    #[test]
    fn images_become_data_url_parts() {
        let request = GenerationRequest::new("Analyze this transcript")
            .with_image(ImageAttachment::new("QUJD", "image/png"));
        let content = serde_json::to_value(provider().user_content(&request)).unwrap();
        assert_eq!(content[0], json!({"type": "text", "text": "Analyze this transcript"}));
        assert_eq!(
            content[1],
            json!({"type": "image_url", "image_url": {"url": "data:image/png;base64,QUJD"}})
        );
    }
}
