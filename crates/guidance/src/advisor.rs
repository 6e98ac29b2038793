//! Career guidance operations on top of the generation facade.

use crate::{AcademicAnalysis, CareerPath, ChatContext, StoryScene, prompts, schemas};
use llm::{GenerationRequest, Generator, ImageAttachment, ProviderSource, backfill_ids};
use serde_json::Value;

/// Prefix of generated career identifiers.
pub const CAREER_ID_PREFIX: &str = "career";

/// Reply shown when a chat question could not be answered.
pub const CHAT_FALLBACK: &str = "I'm thinking... please try again.";

fn fallback_suggestions() -> Vec<String> {
    (1..=4).map(|n| format!("Option {n}")).collect()
}

/// The guidance service.
///
/// Every operation except [`try_generate_careers`](Self::try_generate_careers)
/// degrades to a fixed fallback instead of failing; the cause is logged.
#[derive(Debug)]
pub struct Advisor<S> {
    generator: Generator<S>,
}

impl<S: ProviderSource> Advisor<S> {
    pub fn new(source: S) -> Self {
        Self {
            generator: Generator::new(source),
        }
    }

    pub fn generator(&self) -> &Generator<S> {
        &self.generator
    }

    /// Four example answers to an onboarding question.
    pub async fn suggest_answers(&self, question: &str, context: &str) -> Vec<String> {
        let request = GenerationRequest::new(format!(
            "Context so far: {context}\nQuestion: {question}\n{}",
            prompts::ANSWER_SUGGESTIONS
        ))
        .with_schema(schemas::suggestions());

        match self.generator.generate_array(&request).await {
            Ok(items) => {
                let answers: Vec<String> = items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) if !s.trim().is_empty() => Some(s),
                        _ => None,
                    })
                    .collect();
                if answers.is_empty() {
                    tracing::warn!("suggestion reply held no answers");
                    return fallback_suggestions();
                }
                answers
            }
            Err(e) => {
                tracing::warn!(error = %e, "answer suggestion failed");
                fallback_suggestions()
            }
        }
    }

    /// Generate career paths, reporting failures.
    ///
    /// Every path, milestone and resource without an id gets one.
    pub async fn try_generate_careers(&self, profile: &Value) -> llm::Result<Vec<CareerPath>> {
        let request = GenerationRequest::new(format!(
            "User Profile: {profile}. {}",
            prompts::CAREER_GENERATOR
        ))
        .with_schema(schemas::careers());

        let mut items = self.generator.generate_array(&request).await?;
        backfill_ids(&mut items, CAREER_ID_PREFIX);
        for item in &mut items {
            backfill_nested(item, "timeline", "milestone");
            backfill_nested(item, "resources", "resource");
        }

        let careers = CareerPath::from_values(&items);
        tracing::info!(count = careers.len(), "career paths generated");
        Ok(careers)
    }

    /// Generate career paths, or none on failure.
    pub async fn generate_careers(&self, profile: &Value) -> Vec<CareerPath> {
        self.try_generate_careers(profile)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "career generation failed");
                Vec::new()
            })
    }

    /// A three-chapter preview of life in the given career.
    pub async fn life_story(&self, profile: &Value, career_title: &str) -> Vec<StoryScene> {
        let request = GenerationRequest::new(format!(
            "User Profile: {profile}. Career: {career_title}. {}",
            prompts::LIFE_STORY
        ))
        .with_schema(schemas::life_story());

        match self.generator.generate_array(&request).await {
            Ok(items) => StoryScene::from_values(items),
            Err(e) => {
                tracing::warn!(error = %e, "life story generation failed");
                Vec::new()
            }
        }
    }

    /// Analyze an academic record against a target career.
    ///
    /// `record` is a data URL or a bare base64 payload; `mime_type` is used
    /// when the input carries none.
    pub async fn analyze_record(
        &self,
        profile: &Value,
        career_title: &str,
        record: &str,
        mime_type: &str,
    ) -> Option<AcademicAnalysis> {
        let request = GenerationRequest::new(format!(
            "User Profile: {profile}\nTarget Career: {career_title}\n{}",
            prompts::ACADEMIC_ANALYZER
        ))
        .with_schema(schemas::academic_analysis())
        .with_image(ImageAttachment::from_data_url(record, mime_type));

        let object = match self.generator.generate_object(&request).await {
            Ok(Some(object)) => object,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "academic analysis failed");
                return None;
            }
        };
        serde_json::from_value(Value::Object(object))
            .inspect_err(|e| tracing::warn!(error = %e, "academic analysis had an unexpected shape"))
            .ok()
    }

    /// Sketch a scene in the storyboard style. Returns a data URL.
    pub async fn sketch_scene(&self, description: &str) -> Option<String> {
        self.generator
            .generate_image(&format!("{}{description}", prompts::IMAGE_STYLE))
            .await
    }

    /// Answer a question in context.
    pub async fn chat(&self, context: &ChatContext, question: &str) -> String {
        match self.generator.chat(&context.to_string(), question).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "chat failed");
                CHAT_FALLBACK.to_string()
            }
        }
    }
}

fn backfill_nested(career: &mut Value, key: &str, prefix: &str) {
    if let Some(Value::Array(items)) = career.get_mut(key) {
        backfill_ids(items, prefix);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use llm::{Error, GenerationRequest, Provider, ProviderKind, ProviderProfile, Result};
    use serde_json::Value;
    use std::sync::Mutex;

    /// Replies with canned values and records the prompts it was sent.
    pub(crate) struct FakeProvider {
        profile: ProviderProfile,
        reply: Option<Value>,
        pub(crate) image: Option<String>,
        pub(crate) prompts: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        pub(crate) fn replying(reply: Value) -> Self {
            Self {
                profile: ProviderProfile::defaults(ProviderKind::OpenAi, "test"),
                reply: Some(reply),
                image: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                reply: None,
                ..Self::replying(Value::Null)
            }
        }
    }

    impl Provider for FakeProvider {
        fn profile(&self) -> &ProviderProfile {
            &self.profile
        }

        async fn generate_content(&self, request: &GenerationRequest) -> Result<Value> {
            self.prompts.lock().unwrap().push(request.prompt.clone());
            self.reply
                .clone()
                .ok_or_else(|| Error::Parse("no JSON".into()))
        }

        async fn generate_image(&self, description: &str) -> Option<String> {
            self.prompts.lock().unwrap().push(description.to_string());
            self.image.clone()
        }

        async fn chat(&self, context: &str, question: &str) -> Result<String> {
            match self.reply {
                Some(_) => Ok(format!("{question} <- {context}")),
                None => Err(Error::Parse("no reply".into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeProvider;
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn advisor(provider: FakeProvider) -> (Advisor<Arc<FakeProvider>>, Arc<FakeProvider>) {
        let provider = Arc::new(provider);
        (Advisor::new(Arc::clone(&provider)), provider)
    }

    #[tokio::test]
    async fn suggestions_fall_back_on_failure() {
        let (advisor, _) = advisor(FakeProvider::failing());
        let answers = advisor.suggest_answers("What fascinates you?", "").await;
        assert_eq!(answers, ["Option 1", "Option 2", "Option 3", "Option 4"]);
    }

    #[tokio::test]
    async fn suggestions_unwrap_envelope() {
        let (advisor, provider) =
            advisor(FakeProvider::replying(json!({"answers": ["Maps", "Rivers"]})));
        let answers = advisor.suggest_answers("What fascinates you?", "stage: uni").await;
        assert_eq!(answers, ["Maps", "Rivers"]);

        let seen = provider.prompts.lock().unwrap();
        assert!(seen[0].starts_with("Context so far: stage: uni\nQuestion: What fascinates you?"));
    }

    #[tokio::test]
    async fn careers_get_ids_and_aliases() {
        let reply = json!({"careerPaths": [
            {"title": "Nurse", "confidenceScore": 0.8, "timeline": [{"label": "RN"}]},
            {"id": "keep-me", "title": "Pilot"}
        ]});
        let (advisor, _) = advisor(FakeProvider::replying(reply));
        let careers = advisor.try_generate_careers(&json!({"name": "Sam"})).await.unwrap();

        assert_eq!(careers.len(), 2);
        assert!(careers[0].id.starts_with("career-"));
        assert!(careers[0].id.ends_with("-0"));
        assert_eq!(careers[0].confidence, 0.8);
        assert!(careers[0].timeline[0].id.starts_with("milestone-"));
        assert_eq!(careers[1].id, "keep-me");
    }

    #[tokio::test]
    async fn career_failure_is_reported_or_empty() {
        let (advisor, _) = advisor(FakeProvider::failing());
        assert!(advisor.try_generate_careers(&json!({})).await.is_err());
        assert!(advisor.generate_careers(&json!({})).await.is_empty());
    }

    #[tokio::test]
    async fn analysis_of_wrong_shape_is_none() {
        let (advisor, _) = advisor(FakeProvider::replying(json!(["not", "an", "object"])));
        let analysis = advisor
            .analyze_record(&json!({}), "Architect", "data:image/png;base64,QUJD", "image/png")
            .await;
        assert!(analysis.is_none());
    }

    #[tokio::test]
    async fn analysis_decodes_object() {
        let reply = json!({
            "keyCourses": [{"name": "Statics", "why": "Load paths", "relevance": 95}],
            "masterPrograms": [],
            "gpaInsight": "Solid."
        });
        let (advisor, _) = advisor(FakeProvider::replying(reply));
        let analysis = advisor
            .analyze_record(&json!({}), "Architect", "QUJD", "application/pdf")
            .await
            .unwrap();
        assert_eq!(analysis.key_courses[0].name, "Statics");
        assert_eq!(analysis.gpa_insight, "Solid.");
    }

    #[tokio::test]
    async fn sketch_uses_storyboard_style() {
        let mut provider = FakeProvider::failing();
        provider.image = Some("data:image/png;base64,AAAA".into());
        let (advisor, provider) = advisor(provider);

        let url = advisor.sketch_scene("a lab at night").await;
        assert_eq!(url.as_deref(), Some("data:image/png;base64,AAAA"));
        let seen = provider.prompts.lock().unwrap();
        assert!(seen[0].starts_with(prompts::IMAGE_STYLE));
        assert!(seen[0].ends_with("a lab at night"));
    }

    #[tokio::test]
    async fn chat_falls_back() {
        let (advisor, _) = advisor(FakeProvider::failing());
        let context = ChatContext::new(json!({}), "General");
        assert_eq!(advisor.chat(&context, "Hello?").await, CHAT_FALLBACK);
    }

    #[tokio::test]
    async fn story_scenes_are_typed() {
        let reply = json!([{"title": "Dawn", "text": "You wake early.", "imagePrompt": "sunrise"}]);
        let (advisor, _) = advisor(FakeProvider::replying(reply));
        let scenes = advisor.life_story(&json!({}), "Baker").await;
        assert_eq!(scenes[0].title, "Dawn");
    }
}
