//! Typed career paths built from loosely shaped model output.
//!
//! Models do not always use the field names they were asked for, and strict
//! structured output fills fields it had nothing for with `0` or `""`. The
//! conversion here accepts the known alternative names and treats those
//! placeholders as absent, falling back to fixed defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DEFAULT_SALARY: &str = "N/A";
const DEFAULT_DEMAND: &str = "Growing";
const DEFAULT_STABILITY: f64 = 75.0;
const DEFAULT_GROWTH: f64 = 80.0;

/// One suggested career path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerPath {
    pub id: String,
    pub title: String,
    pub reason: String,
    /// Fit score between 0 and 1.
    pub confidence: f64,
    pub lifestyle: String,
    pub timeline: Vec<Milestone>,
    pub outlook: Outlook,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub age: f64,
    pub label: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Market outlook. Salaries are free text; stability and growth are 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outlook {
    pub entry_salary: String,
    pub mid_salary: String,
    pub senior_salary: String,
    pub demand: String,
    pub stability: f64,
    pub growth: f64,
}

impl Default for Outlook {
    fn default() -> Self {
        Self {
            entry_salary: DEFAULT_SALARY.into(),
            mid_salary: DEFAULT_SALARY.into(),
            senior_salary: DEFAULT_SALARY.into(),
            demand: DEFAULT_DEMAND.into(),
            stability: DEFAULT_STABILITY,
            growth: DEFAULT_GROWTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub difficulty: String,
    pub time_commitment: String,
    pub why_it_matters: String,
}

impl CareerPath {
    /// Build a career path from a model reply element or a stored record.
    ///
    /// Returns `None` for anything that is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;

        let outlook = first(map, &["outlook", "financialOutlook"])
            .and_then(Value::as_object)
            .map(Outlook::from_map)
            .unwrap_or_default();

        Some(Self {
            id: text(map, &["id"]).unwrap_or_default(),
            title: text(map, &["title"]).unwrap_or_default(),
            reason: text(map, &["reason"]).unwrap_or_default(),
            confidence: number(map, &["confidenceScore", "confidence"]).unwrap_or(0.0),
            lifestyle: text(map, &["lifestyle", "lifestyleDescription"]).unwrap_or_default(),
            timeline: objects(map, &["timeline"], Milestone::from_map),
            outlook,
            resources: objects(map, &["resources", "learningResources"], Resource::from_map),
        })
    }

    /// Convert a list of values, skipping elements that are not objects.
    pub fn from_values(values: &[Value]) -> Vec<Self> {
        values.iter().filter_map(Self::from_value).collect()
    }
}

impl Outlook {
    fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            entry_salary: text(map, &["entry", "entrySalary"])
                .unwrap_or_else(|| DEFAULT_SALARY.into()),
            mid_salary: text(map, &["mid", "midSalary"]).unwrap_or_else(|| DEFAULT_SALARY.into()),
            senior_salary: text(map, &["senior", "seniorSalary"])
                .unwrap_or_else(|| DEFAULT_SALARY.into()),
            demand: text(map, &["demand"]).unwrap_or_else(|| DEFAULT_DEMAND.into()),
            stability: number(map, &["stability"]).unwrap_or(DEFAULT_STABILITY),
            growth: number(map, &["growth"]).unwrap_or(DEFAULT_GROWTH),
        }
    }
}

impl Milestone {
    fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            id: text(map, &["id"]).unwrap_or_default(),
            age: number(map, &["age"]).unwrap_or(0.0),
            label: text(map, &["label"]).unwrap_or_default(),
            description: text(map, &["description"]).unwrap_or_default(),
            kind: text(map, &["type"]).unwrap_or_default(),
        }
    }
}

impl Resource {
    fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            id: text(map, &["id"]).unwrap_or_default(),
            title: text(map, &["title"]).unwrap_or_default(),
            kind: text(map, &["type"]).unwrap_or_default(),
            difficulty: text(map, &["difficulty"]).unwrap_or_default(),
            time_commitment: text(map, &["timeCommitment"]).unwrap_or_default(),
            why_it_matters: text(map, &["whyItMatters"]).unwrap_or_default(),
        }
    }
}

/// The first present, non-placeholder value among `keys`.
fn first<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !is_placeholder(value))
}

fn is_placeholder(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Bool(_) => false,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first(map, keys).map(|value| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn number(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .filter_map(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .find(|n| *n != 0.0)
}

fn objects<T>(
    map: &Map<String, Value>,
    keys: &[&str],
    build: fn(&Map<String, Value>) -> T,
) -> Vec<T> {
    first(map, keys)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).map(build).collect())
        .unwrap_or_default()
}
