//! Gemini generateContent backend.

use super::send_json;
use crate::schema::{Dialect, translate};
use crate::{
    GenerationRequest, Provider, ProviderError, ProviderProfile, Result, data_url, extract_json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const EMPTY_CHAT_REPLY: &str = "I'm not sure how to answer that.";
const IMAGE_ASPECT_RATIO: &str = "16:9";

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: Vec<ApiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<ApiGenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
}

#[derive(Debug, Serialize)]
struct ApiContent<'a> {
    parts: Vec<ApiPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiPart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: ApiBlob<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiBlob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ApiImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiImageConfig {
    aspect_ratio: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiTool {
    google_search: ApiEmpty,
}

#[derive(Debug, Serialize)]
struct ApiEmpty {}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    content: Option<ApiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseContent {
    #[serde(default)]
    parts: Vec<ApiResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponsePart {
    text: Option<String>,
    inline_data: Option<ApiResponseBlob>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponseBlob {
    mime_type: String,
    data: String,
}

impl ApiResponse {
    fn into_parts(self) -> Vec<ApiResponsePart> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts)
            .unwrap_or_default()
    }

    fn text(self) -> String {
        self.into_parts()
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Gemini provider. Native schema-constrained output and image synthesis.
#[derive(Debug)]
pub struct GeminiProvider {
    client: reqwest::Client,
    profile: ProviderProfile,
}

impl GeminiProvider {
    pub fn new(profile: ProviderProfile) -> Self {
        Self {
            client: reqwest::Client::new(),
            profile,
        }
    }

    fn build_request<'a>(&self, request: &'a GenerationRequest) -> ApiRequest<'a> {
        let mut parts = vec![ApiPart::Text {
            text: &request.prompt,
        }];
        if !request.images.is_empty() && !self.profile.capabilities.vision_input {
            tracing::warn!(model = %self.profile.models.structured, "vision input disabled; dropping images");
        } else {
            parts.extend(request.images.iter().map(|image| ApiPart::InlineData {
                inline_data: ApiBlob {
                    mime_type: &image.mime_type,
                    data: &image.data,
                },
            }));
        }

        ApiRequest {
            contents: vec![ApiContent { parts }],
            generation_config: Some(ApiGenerationConfig {
                response_mime_type: Some("application/json"),
                response_schema: request
                    .schema
                    .as_ref()
                    .map(|schema| translate(schema, Dialect::Gemini)),
                ..Default::default()
            }),
            tools: Vec::new(),
        }
    }

    async fn call(
        &self,
        model: &str,
        body: &ApiRequest<'_>,
    ) -> std::result::Result<ApiResponse, ProviderError> {
        let request = self
            .client
            .post(
                self.profile
                    .endpoint(&format!("/v1beta/models/{model}:generateContent")),
            )
            .header("x-goog-api-key", self.profile.api_key())
            .json(body);
        send_json(request).await
    }
}

impl std::fmt::Display for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gemini({})", self.profile.models.structured)
    }
}

impl Provider for GeminiProvider {
    fn profile(&self) -> &ProviderProfile {
        &self.profile
    }

    async fn generate_content(&self, request: &GenerationRequest) -> Result<Value> {
        let body = self.build_request(request);
        let text = self
            .call(&self.profile.models.structured, &body)
            .await?
            .text();

        let text = text.trim();
        if text.is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        match serde_json::from_str(text) {
            Ok(value) => Ok(value),
            Err(_) => extract_json(text).inspect_err(|e| {
                tracing::warn!(error = %e, "gemini reply held no JSON");
            }),
        }
    }

    async fn generate_image(&self, description: &str) -> Option<String> {
        let model = match &self.profile.models.image {
            Some(model) if self.profile.capabilities.image_generation => model,
            _ => return None,
        };

        let body = ApiRequest {
            contents: vec![ApiContent {
                parts: vec![ApiPart::Text { text: description }],
            }],
            generation_config: Some(ApiGenerationConfig {
                image_config: Some(ApiImageConfig {
                    aspect_ratio: IMAGE_ASPECT_RATIO,
                }),
                ..Default::default()
            }),
            tools: Vec::new(),
        };

        match self.call(model, &body).await {
            Ok(response) => response
                .into_parts()
                .into_iter()
                .find_map(|part| part.inline_data)
                .map(|blob| data_url(&blob.mime_type, &blob.data)),
            Err(e) => {
                tracing::warn!(error = %e, "gemini image generation failed");
                None
            }
        }
    }

    async fn chat(&self, context: &str, question: &str) -> Result<String> {
        let prompt = format!(
            "Context: {context}\nQuestion: {question}\nAnswer as a helpful assistant."
        );
        let body = ApiRequest {
            contents: vec![ApiContent {
                parts: vec![ApiPart::Text { text: &prompt }],
            }],
            generation_config: None,
            tools: vec![ApiTool {
                google_search: ApiEmpty {},
            }],
        };

        let text = self.call(&self.profile.models.chat, &body).await?.text();
        if text.trim().is_empty() {
            return Ok(EMPTY_CHAT_REPLY.to_string());
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ImageAttachment, ProviderKind, Schema};
    use serde_json::json;

    fn provider() -> GeminiProvider {
        GeminiProvider::new(ProviderProfile::defaults(ProviderKind::Gemini, "g-key"))
    }

    #[test]
    fn request_carries_schema_and_inline_images() {
        let request = GenerationRequest::new("Analyze")
            .with_schema(Schema::object([("gpaInsight", Schema::string())]))
            .with_image(ImageAttachment::new("QUJD", "application/pdf"));
        let body = serde_json::to_value(provider().build_request(&request)).unwrap();

        assert_eq!(body["contents"][0]["parts"][0], json!({"text": "Analyze"}));
        assert_eq!(
            body["contents"][0]["parts"][1],
            json!({"inlineData": {"mimeType": "application/pdf", "data": "QUJD"}})
        );
        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"]["type"], "OBJECT");
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn search_tool_serializes_as_empty_object() {
        let tool = serde_json::to_value(ApiTool {
            google_search: ApiEmpty {},
        })
        .unwrap();
        assert_eq!(tool, json!({"googleSearch": {}}));
    }

    #[test]
    fn reply_text_joins_first_candidate() {
        let response: ApiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "[1,"}, {"text": "2]"}]}}]
        }))
        .unwrap();
        assert_eq!(response.text(), "[1,2]");

        let empty: ApiResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.text(), "");
    }
}
