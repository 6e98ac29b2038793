//! The provider contract.

use crate::{GenerationRequest, ProviderProfile, Result};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// A vendor adapter.
///
/// Implementations translate the generic request into the vendor's wire
/// format and back. They hold no per-request mutable state, so one instance
/// can serve concurrent calls.
pub trait Provider: Send + Sync {
    fn profile(&self) -> &ProviderProfile;

    /// Generate JSON for a prompt.
    ///
    /// With a schema, the returned value is de-enveloped (any synthetic root
    /// added for the vendor is removed) but not yet shape-normalized.
    fn generate_content(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<Value>> + Send;

    /// Render an image as a `data:` URL.
    ///
    /// Returns `None` both when the vendor cannot generate images and when the
    /// call fails. Never errors.
    fn generate_image(&self, description: &str) -> impl Future<Output = Option<String>> + Send;

    /// Answer a question given a pre-assembled context.
    fn chat(&self, context: &str, question: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Something that hands out the provider to use for a call.
pub trait ProviderSource: Send + Sync {
    type Provider: Provider;

    fn provider(&self) -> Result<Arc<Self::Provider>>;
}

/// A fixed provider, mostly useful in tests.
impl<P: Provider> ProviderSource for Arc<P> {
    type Provider = P;

    fn provider(&self) -> Result<Arc<P>> {
        Ok(Arc::clone(self))
    }
}
