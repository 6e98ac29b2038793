//! Academic record analysis results.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicAnalysis {
    #[serde(default)]
    pub key_courses: Vec<KeyCourse>,
    #[serde(default)]
    pub master_programs: Vec<MasterProgram>,
    #[serde(default)]
    pub gpa_insight: String,
}

/// A course worth mastering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyCourse {
    pub name: String,
    #[serde(default)]
    pub why: String,
    /// 0-100.
    #[serde(default)]
    pub relevance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterProgram {
    pub program: String,
    #[serde(default)]
    pub universities: Vec<String>,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_sections_default_to_empty() {
        let analysis: AcademicAnalysis = serde_json::from_value(json!({
            "keyCourses": [{"name": "Linear Algebra", "relevance": 90}],
            "gpaInsight": "Strong upward trend."
        }))
        .unwrap();
        assert_eq!(analysis.key_courses[0].relevance, 90.0);
        assert!(analysis.master_programs.is_empty());
    }
}
