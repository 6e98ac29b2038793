//! Career generation tied to persistence: the dashboard flow and the
//! fire-and-forget background job.

use crate::{Advisor, CareerPath, Error, Result};
use llm::ProviderSource;
use serde_json::Value;
use std::sync::Arc;
use storage::{GenerationStatus, ProfileStore};
use tokio::task::JoinHandle;

/// Where generated careers and generation progress are recorded.
pub trait CareerStore: Send + Sync {
    /// The onboarding profile and any saved careers.
    fn load(&self, user_id: &str) -> Result<Option<(Value, Vec<CareerPath>)>>;

    fn save_careers(&self, user_id: &str, careers: &[CareerPath]) -> Result<()>;

    fn set_status(&self, user_id: &str, status: GenerationStatus) -> Result<()>;
}

impl CareerStore for ProfileStore {
    fn load(&self, user_id: &str) -> Result<Option<(Value, Vec<CareerPath>)>> {
        Ok(self.get_profile(user_id)?.map(|record| {
            let careers = record
                .careers()
                .map(|stored| CareerPath::from_values(stored))
                .unwrap_or_default();
            (record.data, careers)
        }))
    }

    fn save_careers(&self, user_id: &str, careers: &[CareerPath]) -> Result<()> {
        let value = serde_json::to_value(careers).map_err(storage::Error::from)?;
        Ok(self.update_careers(user_id, &value)?)
    }

    fn set_status(&self, user_id: &str, status: GenerationStatus) -> Result<()> {
        Ok(ProfileStore::set_status(self, user_id, status)?)
    }
}

impl<S: ProviderSource> Advisor<S> {
    /// Saved careers for the user, generating and saving them when there are
    /// none or when `regenerate` is set.
    ///
    /// Only a non-empty result is saved.
    pub async fn careers_for<K: CareerStore>(
        &self,
        store: &K,
        user_id: &str,
        regenerate: bool,
    ) -> Result<Vec<CareerPath>> {
        let (profile, saved) = store
            .load(user_id)?
            .ok_or_else(|| Error::NoProfile(user_id.to_string()))?;
        if !saved.is_empty() && !regenerate {
            return Ok(saved);
        }

        let careers = self.try_generate_careers(&profile).await?;
        if !careers.is_empty() {
            store.save_careers(user_id, &careers)?;
        }
        Ok(careers)
    }
}

/// Generate careers in the background.
///
/// The status moves to `generating` before the task starts, then to
/// `completed` once a non-empty result is saved, or to `failed`. The handle
/// resolves to the final status; callers may drop it and poll the store.
pub fn spawn_career_generation<S, K>(
    advisor: Arc<Advisor<S>>,
    store: Arc<K>,
    user_id: String,
    profile: Value,
) -> Result<JoinHandle<GenerationStatus>>
where
    S: ProviderSource + 'static,
    K: CareerStore + 'static,
{
    store.set_status(&user_id, GenerationStatus::Generating)?;
    tracing::info!(user_id, "background career generation started");

    Ok(tokio::spawn(async move {
        let status = match advisor.try_generate_careers(&profile).await {
            Ok(careers) if careers.is_empty() => {
                tracing::warn!(user_id, "career generation returned nothing");
                GenerationStatus::Failed
            }
            Ok(careers) => match store.save_careers(&user_id, &careers) {
                Ok(()) => GenerationStatus::Completed,
                Err(e) => {
                    tracing::error!(user_id, error = %e, "failed to save careers");
                    GenerationStatus::Failed
                }
            },
            Err(e) => {
                tracing::error!(user_id, error = %e, "career generation failed");
                GenerationStatus::Failed
            }
        };

        if let Err(e) = store.set_status(&user_id, status) {
            tracing::error!(user_id, error = %e, "failed to record generation status");
        }
        tracing::info!(user_id, %status, "background career generation finished");
        status
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::testing::FakeProvider;
    use serde_json::json;

    fn careers_reply() -> Value {
        json!([
            {"title": "Marine Biologist", "reason": "Loves the sea"},
            {"title": "Science Teacher", "reason": "Explains well"}
        ])
    }

    fn store_with_profile(user_id: &str) -> Arc<ProfileStore> {
        let store = ProfileStore::in_memory().unwrap();
        store
            .upsert_profile(user_id, &json!({"interests": "oceans"}))
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn background_generation_completes_and_saves() {
        let store = store_with_profile("u1");
        let advisor = Arc::new(Advisor::new(Arc::new(FakeProvider::replying(careers_reply()))));

        let handle = spawn_career_generation(
            advisor,
            Arc::clone(&store),
            "u1".into(),
            json!({"interests": "oceans"}),
        )
        .unwrap();
        assert_eq!(handle.await.unwrap(), GenerationStatus::Completed);

        let record = store.get_profile("u1").unwrap().unwrap();
        assert_eq!(record.status, GenerationStatus::Completed);
        assert_eq!(record.careers().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn background_failure_marks_failed() {
        let store = store_with_profile("u1");
        let advisor = Arc::new(Advisor::new(Arc::new(FakeProvider::failing())));

        let handle =
            spawn_career_generation(advisor, Arc::clone(&store), "u1".into(), json!({})).unwrap();
        assert_eq!(handle.await.unwrap(), GenerationStatus::Failed);
        assert_eq!(store.status("u1").unwrap(), Some(GenerationStatus::Failed));
        assert!(store.get_profile("u1").unwrap().unwrap().careers.is_none());
    }

    #[tokio::test]
    async fn empty_result_is_a_failure() {
        let store = store_with_profile("u1");
        let advisor = Arc::new(Advisor::new(Arc::new(FakeProvider::replying(json!({})))));

        let handle =
            spawn_career_generation(advisor, Arc::clone(&store), "u1".into(), json!({})).unwrap();
        assert_eq!(handle.await.unwrap(), GenerationStatus::Failed);
    }

    #[tokio::test]
    async fn unknown_user_cannot_start() {
        let store = Arc::new(ProfileStore::in_memory().unwrap());
        let advisor = Arc::new(Advisor::new(Arc::new(FakeProvider::failing())));
        let result = spawn_career_generation(advisor, store, "ghost".into(), json!({}));
        assert!(matches!(result, Err(Error::Storage(storage::Error::NotFound(_)))));
    }

    #[tokio::test]
    async fn concurrent_generations_mint_distinct_ids() {
        let advisor = Arc::new(Advisor::new(Arc::new(FakeProvider::replying(careers_reply()))));
        let store = Arc::new(ProfileStore::in_memory().unwrap());
        for user in ["a", "b"] {
            store.upsert_profile(user, &json!({})).unwrap();
        }

        let first =
            spawn_career_generation(Arc::clone(&advisor), Arc::clone(&store), "a".into(), json!({}))
                .unwrap();
        let second =
            spawn_career_generation(Arc::clone(&advisor), Arc::clone(&store), "b".into(), json!({}))
                .unwrap();
        assert_eq!(first.await.unwrap(), GenerationStatus::Completed);
        assert_eq!(second.await.unwrap(), GenerationStatus::Completed);

        let mut ids: Vec<String> = ["a", "b"]
            .iter()
            .flat_map(|user| store.load(user).unwrap().unwrap().1)
            .map(|career| career.id)
            .collect();
        assert_eq!(ids.len(), 4);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[tokio::test]
    async fn saved_careers_are_reused_until_regenerated() {
        let store = store_with_profile("u1");
        let advisor = Advisor::new(Arc::new(FakeProvider::replying(careers_reply())));

        let first = advisor.careers_for(store.as_ref(), "u1", false).await.unwrap();
        let again = advisor.careers_for(store.as_ref(), "u1", false).await.unwrap();
        assert_eq!(first, again);

        let fresh = advisor.careers_for(store.as_ref(), "u1", true).await.unwrap();
        assert_eq!(fresh.len(), 2);
        assert_ne!(fresh[0].id, first[0].id);
    }

    #[tokio::test]
    async fn missing_profile_needs_onboarding() {
        let store = ProfileStore::in_memory().unwrap();
        let advisor = Advisor::new(Arc::new(FakeProvider::failing()));
        let err = advisor.careers_for(&store, "nobody", false).await.unwrap_err();
        assert!(matches!(err, Error::NoProfile(_)));
    }
}
