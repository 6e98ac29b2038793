//! Record types persisted by the profile store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

/// Progress of the career generation for one profile.
///
/// This is a best-effort indicator that pollers read. It is not a lock:
/// overlapping generations may both write it, and the last write wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    #[default]
    Idle,
    Generating,
    Completed,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether a poller can stop waiting.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "idle" => Ok(Self::Idle),
            "generating" => Ok(Self::Generating),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(crate::Error::Corrupt(format!(
                "unknown generation status '{other}'"
            ))),
        }
    }
}

/// A user's profile together with its generated careers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub user_id: String,
    /// The onboarding answers, stored as an opaque JSON document.
    pub data: Value,
    /// Generated career paths, `None` until a generation has been saved.
    pub careers: Option<Value>,
    pub status: GenerationStatus,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRecord {
    /// Stored careers, if any were saved and the list is non-empty.
    pub fn careers(&self) -> Option<&Vec<Value>> {
        self.careers
            .as_ref()
            .and_then(Value::as_array)
            .filter(|list| !list.is_empty())
    }
}

/// A journal entry written by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reflection {
    pub id: Uuid,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

impl FromStr for ChatRole {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "user" => Ok(Self::User),
            "model" => Ok(Self::Model),
            other => Err(crate::Error::Corrupt(format!("unknown chat role '{other}'"))),
        }
    }
}

/// A conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// One message in a conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            GenerationStatus::Idle,
            GenerationStatus::Generating,
            GenerationStatus::Completed,
            GenerationStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<GenerationStatus>().unwrap(), status);
        }
        assert!("busy".parse::<GenerationStatus>().is_err());
    }

    #[test]
    fn empty_career_list_counts_as_missing() {
        let record = ProfileRecord {
            user_id: "u1".into(),
            data: Value::Null,
            careers: Some(Value::Array(vec![])),
            status: GenerationStatus::Idle,
            updated_at: Utc::now(),
        };
        assert!(record.careers().is_none());
    }
}
