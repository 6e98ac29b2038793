//! Life-story previews.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One chapter of a life-story preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryScene {
    pub title: String,
    pub text: String,
    /// Scene description to hand to the sketch generator.
    pub image_prompt: String,
}

impl StoryScene {
    /// Decode the elements that have the expected fields and drop the rest.
    pub(crate) fn from_values(values: Vec<Value>) -> Vec<Self> {
        values
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(scene) => Some(scene),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed story scene");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_scenes_are_dropped() {
        let scenes = StoryScene::from_values(vec![
            json!({"title": "Morning", "text": "Coffee by the harbor.", "imagePrompt": "a harbor"}),
            json!({"title": "No text"}),
        ]);
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].image_prompt, "a harbor");
    }
}
