//! Provider selection.

use crate::{
    ActiveProvider, Credentials, Error, ProfileOverrides, ProviderKind, ProviderProfile,
    ProviderSource, Result,
};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Picks the first vendor with a credential and keeps using it.
///
/// Selection happens on the first call to [`get_provider`](Self::get_provider).
/// After that the same adapter is returned even if the credentials it was
/// built from would now select a different vendor.
#[derive(Default)]
pub struct ProviderSelector {
    credentials: Credentials,
    overrides: HashMap<ProviderKind, ProfileOverrides>,
    active: OnceLock<Arc<ActiveProvider>>,
}

impl std::fmt::Debug for ProviderSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSelector")
            .field("credentials", &self.credentials)
            .field("active", &self.active.get().map(|p| p.kind()))
            .finish_non_exhaustive()
    }
}

impl ProviderSelector {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            ..Default::default()
        }
    }

    /// Selector over the `*_API_KEY` environment variables.
    pub fn from_env() -> Self {
        Self::new(Credentials::from_env())
    }

    /// Apply configured overrides to a vendor's profile when it is selected.
    pub fn with_overrides(mut self, kind: ProviderKind, overrides: ProfileOverrides) -> Self {
        self.overrides.insert(kind, overrides);
        self
    }

    /// The active provider, selecting it on first use.
    pub fn get_provider(&self) -> Result<Arc<ActiveProvider>> {
        if let Some(active) = self.active.get() {
            return Ok(Arc::clone(active));
        }

        let selected = Arc::new(ActiveProvider::from_profile(self.select()?));
        // A concurrent first call may have won; theirs is kept.
        if self.active.set(Arc::clone(&selected)).is_ok() {
            tracing::info!(provider = %selected.kind(), "Using {} provider", selected.kind());
            return Ok(selected);
        }
        self.active
            .get()
            .map(Arc::clone)
            .ok_or_else(|| Error::Configuration("provider selection lost".into()))
    }

    /// Forget the selected provider. The next call selects again.
    pub fn reset(&mut self) {
        if let Some(previous) = self.active.take() {
            tracing::debug!(provider = %previous.kind(), "provider selection reset");
        }
    }

    fn select(&self) -> Result<ProviderProfile> {
        let (kind, key) = ProviderKind::PRIORITY
            .into_iter()
            .find_map(|kind| self.credentials.get(kind).map(|key| (kind, key)))
            .ok_or_else(|| {
                let vars: Vec<_> = ProviderKind::PRIORITY.iter().map(|k| k.env_var()).collect();
                Error::Configuration(format!("no provider credential set ({})", vars.join(", ")))
            })?;

        let profile = ProviderProfile::defaults(kind, key);
        Ok(match self.overrides.get(&kind) {
            Some(overrides) => profile.with_overrides(overrides),
            None => profile,
        })
    }
}

impl ProviderSource for ProviderSelector {
    type Provider = ActiveProvider;

    fn provider(&self) -> Result<Arc<ActiveProvider>> {
        self.get_provider()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Provider;

    #[test]
    fn falls_back_to_last_vendor_and_caches_it() {
        let selector =
            ProviderSelector::new(Credentials::default().with(ProviderKind::Gemini, "g-key"));

        let first = selector.get_provider().unwrap();
        let second = selector.get_provider().unwrap();
        assert_eq!(first.kind(), ProviderKind::Gemini);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn priority_order_is_fixed() {
        let all = Credentials::default()
            .with(ProviderKind::Gemini, "g")
            .with(ProviderKind::Anthropic, "a")
            .with(ProviderKind::OpenAi, "o");
        assert_eq!(
            ProviderSelector::new(all).get_provider().unwrap().kind(),
            ProviderKind::OpenAi
        );

        let two = Credentials::default()
            .with(ProviderKind::Gemini, "g")
            .with(ProviderKind::Anthropic, "a");
        assert_eq!(
            ProviderSelector::new(two).get_provider().unwrap().kind(),
            ProviderKind::Anthropic
        );
    }

    #[test]
    fn missing_credentials_is_a_configuration_error() {
        let selector =
            ProviderSelector::new(Credentials::default().with(ProviderKind::OpenAi, ""));
        let err = selector.get_provider().unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("GEMINI_API_KEY")));
    }

    #[test]
    fn reset_selects_a_fresh_instance() {
        let mut selector =
            ProviderSelector::new(Credentials::default().with(ProviderKind::Anthropic, "a"));
        let first = selector.get_provider().unwrap();
        selector.reset();
        let second = selector.get_provider().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.kind(), ProviderKind::Anthropic);
    }

    #[test]
    fn overrides_apply_to_selected_vendor() {
        let selector = ProviderSelector::new(Credentials::default().with(ProviderKind::OpenAi, "o"))
            .with_overrides(
                ProviderKind::OpenAi,
                ProfileOverrides {
                    model: Some("gpt-4.1".into()),
                    ..Default::default()
                },
            );
        let provider = selector.get_provider().unwrap();
        assert_eq!(provider.profile().models.structured, "gpt-4.1");
    }
}
