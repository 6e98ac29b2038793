//! The stable generation interface.

use crate::{GenerationRequest, Provider, ProviderSource, Result, Shape, normalize};
use serde_json::Value;

/// Entry point for callers.
///
/// Resolves the provider on every call (cheap after the first) and applies
/// shape normalization. Fallback values are the caller's choice; this layer
/// only reports errors.
#[derive(Debug, Clone)]
pub struct Generator<S> {
    source: S,
}

impl<S: ProviderSource> Generator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Generate JSON, de-enveloped but not shape-normalized.
    pub async fn generate_content(&self, request: &GenerationRequest) -> Result<Value> {
        let provider = self.source.provider()?;
        provider.generate_content(request).await
    }

    /// Generate a list. Object envelopes are unwrapped; no list yields `[]`.
    pub async fn generate_array(&self, request: &GenerationRequest) -> Result<Vec<Value>> {
        match normalize(self.generate_content(request).await?, Shape::Array) {
            Value::Array(items) => Ok(items),
            _ => Ok(Vec::new()),
        }
    }

    /// Generate a single object. Anything else yields `None`.
    pub async fn generate_object(
        &self,
        request: &GenerationRequest,
    ) -> Result<Option<serde_json::Map<String, Value>>> {
        match normalize(self.generate_content(request).await?, Shape::Object) {
            Value::Object(map) => Ok(Some(map)),
            _ => Ok(None),
        }
    }

    /// Render an image as a data URL. `None` also covers a missing credential.
    pub async fn generate_image(&self, description: &str) -> Option<String> {
        let provider = match self.source.provider() {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!(error = %e, "no provider for image generation");
                return None;
            }
        };
        provider.generate_image(description).await
    }

    pub async fn chat(&self, context: &str, question: &str) -> Result<String> {
        let provider = self.source.provider()?;
        provider.chat(context, question).await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedProvider;
    use super::*;
    use crate::{Credentials, Error, ProviderSelector};
    use serde_json::json;
    use std::sync::Arc;

    fn generator(replies: Vec<Result<Value>>) -> Generator<Arc<ScriptedProvider>> {
        Generator::new(Arc::new(ScriptedProvider::new(replies)))
    }

    #[tokio::test]
    async fn array_is_unwrapped_from_envelope() {
        let generator = generator(vec![Ok(json!({"careers": [{"title": "Nurse"}]}))]);
        let items = generator
            .generate_array(&GenerationRequest::new("careers"))
            .await
            .unwrap();
        assert_eq!(items, vec![json!({"title": "Nurse"})]);
    }

    #[tokio::test]
    async fn array_without_list_is_empty() {
        let generator = generator(vec![Ok(json!({"note": "nothing"}))]);
        let items = generator
            .generate_array(&GenerationRequest::new("careers"))
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn object_mismatch_is_none() {
        let generator = generator(vec![Ok(json!(["a"]))]);
        let object = generator
            .generate_object(&GenerationRequest::new("analysis"))
            .await
            .unwrap();
        assert!(object.is_none());
    }

    #[tokio::test]
    async fn errors_pass_through() {
        let generator = generator(vec![Err(Error::Parse("bad".into()))]);
        let err = generator
            .generate_content(&GenerationRequest::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[tokio::test]
    async fn image_without_credentials_is_none() {
        let generator = Generator::new(ProviderSelector::new(Credentials::default()));
        assert_eq!(generator.generate_image("a lighthouse").await, None);
    }

    #[tokio::test]
    async fn chat_without_credentials_is_a_configuration_error() {
        let generator = Generator::new(ProviderSelector::new(Credentials::default()));
        let err = generator.chat("ctx", "hello?").await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
