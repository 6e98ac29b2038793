//! Generation request types.

use crate::Schema;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// An inline image sent alongside a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// Base64-encoded payload, without a data-URL prefix.
    pub data: String,
    pub mime_type: String,
}

impl ImageAttachment {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Encode raw bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(STANDARD.encode(bytes), mime_type)
    }

    /// Accept either a `data:<mime>;base64,<payload>` URL or a bare base64
    /// payload. The MIME type embedded in a data URL wins over `fallback_mime`.
    pub fn from_data_url(input: &str, fallback_mime: &str) -> Self {
        match input.split_once(',') {
            Some((header, payload)) => {
                let mime = header
                    .strip_prefix("data:")
                    .and_then(|rest| rest.split(';').next())
                    .filter(|mime| !mime.is_empty())
                    .unwrap_or(fallback_mime);
                Self::new(payload, mime)
            }
            None => Self::new(input, fallback_mime),
        }
    }

    /// Render as a data URL.
    pub fn to_data_url(&self) -> String {
        data_url(&self.mime_type, &self.data)
    }

    /// The raw payload bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.data)
    }
}

/// Build a `data:` URL from a MIME type and a base64 payload.
pub fn data_url(mime_type: &str, base64_data: &str) -> String {
    format!("data:{mime_type};base64,{base64_data}")
}

/// A prompt, an optional output schema and optional images.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub schema: Option<Schema>,
    pub images: Vec<ImageAttachment>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            schema: None,
            images: Vec::new(),
        }
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.images.push(image);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_prefix_is_stripped() {
        let image = ImageAttachment::from_data_url("data:application/pdf;base64,QUJD", "image/png");
        assert_eq!(image.data, "QUJD");
        assert_eq!(image.mime_type, "application/pdf");
    }

    #[test]
    fn bare_payload_uses_fallback_mime() {
        let image = ImageAttachment::from_data_url("QUJD", "image/jpeg");
        assert_eq!(image.data, "QUJD");
        assert_eq!(image.mime_type, "image/jpeg");
    }

    #[test]
    fn bytes_are_base64_encoded() {
        let image = ImageAttachment::from_bytes(b"ABC", "image/png");
        assert_eq!(image.to_data_url(), "data:image/png;base64,QUJD");
        assert_eq!(image.decode().unwrap(), b"ABC");
    }
}
