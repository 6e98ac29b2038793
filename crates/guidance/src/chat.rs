//! Context assembly for chat questions.

use serde_json::Value;
use storage::Reflection;

/// How many journal entries are shown to the model.
pub const MAX_REFLECTIONS: usize = 5;

/// Everything the model is told before a chat question.
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub profile: Value,
    /// What the user is currently looking at, e.g. a career title.
    pub focus: String,
    /// Journal entries, newest first.
    pub reflections: Vec<Reflection>,
}

impl ChatContext {
    pub fn new(profile: Value, focus: impl Into<String>) -> Self {
        Self {
            profile,
            focus: focus.into(),
            reflections: Vec::new(),
        }
    }

    pub fn with_reflections(mut self, reflections: Vec<Reflection>) -> Self {
        self.reflections = reflections;
        self
    }
}

impl std::fmt::Display for ChatContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "User Profile: {}\nActive Focus: {}",
            self.profile, self.focus
        )?;
        if self.reflections.is_empty() {
            return Ok(());
        }

        f.write_str(
            "\n\nUser's Journal Reflections (use these to personalize your guidance):",
        )?;
        for reflection in self.reflections.iter().take(MAX_REFLECTIONS) {
            write!(
                f,
                "\n- [{}]: \"{}\"",
                reflection.created_at.format("%Y-%m-%d"),
                reflection.content
            )?;
        }
        Ok(())
    }
}
