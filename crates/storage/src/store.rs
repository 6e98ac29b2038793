//! SQLite profile store implementation.

use crate::{
    ChatMessage, ChatRole, ChatSession, Error, GenerationStatus, ProfileRecord, Reflection, Result,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// SQLite-backed store for profiles, reflections and chat history.
///
/// The connection sits behind a mutex so one store can be shared between the
/// foreground command and background generation tasks.
pub struct ProfileStore {
    conn: Mutex<Connection>,
}

impl ProfileStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS user_profiles (
                user_id TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                careers TEXT,
                status TEXT NOT NULL DEFAULT 'idle',
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS reflections (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_reflections_user
                ON reflections(user_id, created_at);
            CREATE TABLE IF NOT EXISTS chat_sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS chat_messages (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_chat_messages_session
                ON chat_messages(session_id, seq);
            "#,
        )?;
        Ok(())
    }

    // ── Profiles ────────────────────────────────────────────────────────────

    /// Load a user's profile record.
    pub fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>> {
        let row = self
            .conn()
            .query_row(
                "SELECT data, careers, status, updated_at FROM user_profiles WHERE user_id = ?1",
                [user_id],
                |row| {
                    let data: String = row.get(0)?;
                    let careers: Option<String> = row.get(1)?;
                    let status: String = row.get(2)?;
                    let updated_at: String = row.get(3)?;
                    Ok((data, careers, status, updated_at))
                },
            )
            .optional()?;

        let Some((data, careers, status, updated_at)) = row else {
            return Ok(None);
        };

        Ok(Some(ProfileRecord {
            user_id: user_id.to_string(),
            data: serde_json::from_str(&data)?,
            careers: careers.map(|c| serde_json::from_str(&c)).transpose()?,
            status: status.parse()?,
            updated_at: parse_timestamp(&updated_at)?,
        }))
    }

    /// Insert or replace a user's profile data.
    ///
    /// Changing the profile invalidates previously generated careers, so they
    /// are cleared and the status goes back to idle.
    pub fn upsert_profile(&self, user_id: &str, data: &Value) -> Result<ProfileRecord> {
        let now = Utc::now();
        self.conn().execute(
            "INSERT INTO user_profiles (user_id, data, careers, status, updated_at)
             VALUES (?1, ?2, NULL, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                data = excluded.data,
                careers = NULL,
                status = excluded.status,
                updated_at = excluded.updated_at",
            params![
                user_id,
                serde_json::to_string(data)?,
                GenerationStatus::Idle.as_str(),
                format_timestamp(now),
            ],
        )?;
        Ok(ProfileRecord {
            user_id: user_id.to_string(),
            data: data.clone(),
            careers: None,
            status: GenerationStatus::Idle,
            updated_at: now,
        })
    }

    /// Replace the stored careers for a user.
    pub fn update_careers(&self, user_id: &str, careers: &Value) -> Result<()> {
        let changed = self.conn().execute(
            "UPDATE user_profiles SET careers = ?2, updated_at = ?3 WHERE user_id = ?1",
            params![
                user_id,
                serde_json::to_string(careers)?,
                format_timestamp(Utc::now())
            ],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("profile for user {user_id}")));
        }
        Ok(())
    }

    /// Record generation progress for a user.
    pub fn set_status(&self, user_id: &str, status: GenerationStatus) -> Result<()> {
        let changed = self.conn().execute(
            "UPDATE user_profiles SET status = ?2, updated_at = ?3 WHERE user_id = ?1",
            params![user_id, status.as_str(), format_timestamp(Utc::now())],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("profile for user {user_id}")));
        }
        tracing::debug!(user_id, %status, "generation status updated");
        Ok(())
    }

    /// Current generation status, `None` when the user has no profile.
    pub fn status(&self, user_id: &str) -> Result<Option<GenerationStatus>> {
        let status: Option<String> = self
            .conn()
            .query_row(
                "SELECT status FROM user_profiles WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )
            .optional()?;
        status.map(|s| s.parse()).transpose()
    }

    // ── Reflections ─────────────────────────────────────────────────────────

    /// Append a journal entry.
    pub fn add_reflection(&self, user_id: &str, content: &str) -> Result<Reflection> {
        let reflection = Reflection {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.conn().execute(
            "INSERT INTO reflections (id, user_id, content, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                reflection.id.to_string(),
                reflection.user_id,
                reflection.content,
                format_timestamp(reflection.created_at),
            ],
        )?;
        Ok(reflection)
    }

    /// All journal entries of a user, newest first.
    pub fn list_reflections(&self, user_id: &str) -> Result<Vec<Reflection>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, content, created_at FROM reflections
             WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
        )?;

        let rows = stmt
            .query_map([user_id], |row| {
                let id: String = row.get(0)?;
                let content: String = row.get(1)?;
                let created_at: String = row.get(2)?;
                Ok((id, content, created_at))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, content, created_at)| {
                Ok(Reflection {
                    id: parse_uuid(&id)?,
                    user_id: user_id.to_string(),
                    content,
                    created_at: parse_timestamp(&created_at)?,
                })
            })
            .collect()
    }

    /// Delete a journal entry owned by `user_id`.
    ///
    /// Returns `false` when the entry does not exist or belongs to someone else.
    pub fn delete_reflection(&self, user_id: &str, id: Uuid) -> Result<bool> {
        let removed = self.conn().execute(
            "DELETE FROM reflections WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id],
        )?;
        Ok(removed > 0)
    }

    // ── Chat ────────────────────────────────────────────────────────────────

    /// Start a new conversation thread.
    pub fn create_chat_session(&self, user_id: &str, title: &str) -> Result<ChatSession> {
        let session = ChatSession {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            created_at: Utc::now(),
        };
        self.conn().execute(
            "INSERT INTO chat_sessions (id, user_id, title, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                session.id.to_string(),
                session.user_id,
                session.title,
                format_timestamp(session.created_at),
            ],
        )?;
        Ok(session)
    }

    /// Append a message to a conversation thread.
    pub fn add_chat_message(
        &self,
        session_id: Uuid,
        role: ChatRole,
        content: &str,
    ) -> Result<ChatMessage> {
        let message = ChatMessage {
            id: Uuid::new_v4(),
            session_id,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.conn().execute(
            "INSERT INTO chat_messages (id, session_id, seq, role, content, created_at)
             VALUES (?1, ?2,
                (SELECT COALESCE(MAX(seq), 0) + 1 FROM chat_messages WHERE session_id = ?2),
                ?3, ?4, ?5)",
            params![
                message.id.to_string(),
                session_id.to_string(),
                role.as_str(),
                message.content,
                format_timestamp(message.created_at),
            ],
        )?;
        Ok(message)
    }

    /// Messages of a conversation thread in the order they were added.
    pub fn load_chat_messages(&self, session_id: Uuid) -> Result<Vec<ChatMessage>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, role, content, created_at FROM chat_messages
             WHERE session_id = ?1 ORDER BY seq",
        )?;

        let rows = stmt
            .query_map([session_id.to_string()], |row| {
                let id: String = row.get(0)?;
                let role: String = row.get(1)?;
                let content: String = row.get(2)?;
                let created_at: String = row.get(3)?;
                Ok((id, role, content, created_at))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, role, content, created_at)| {
                Ok(ChatMessage {
                    id: parse_uuid(&id)?,
                    session_id,
                    role: role.parse()?,
                    content,
                    created_at: parse_timestamp(&created_at)?,
                })
            })
            .collect()
    }
}

// Fixed-width timestamps keep lexical order equal to time order.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Corrupt(format!("timestamp '{raw}': {e}")))
}

fn parse_uuid(raw: &str) -> Result<Uuid> {
    raw.parse()
        .map_err(|e| Error::Corrupt(format!("id '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_profile_is_none() {
        let store = ProfileStore::in_memory().unwrap();
        assert!(store.get_profile("nobody").unwrap().is_none());
        assert!(store.status("nobody").unwrap().is_none());
    }

    #[test]
    fn upsert_clears_careers_and_resets_status() {
        let store = ProfileStore::in_memory().unwrap();
        store.upsert_profile("u1", &json!({"interests": "maps"})).unwrap();
        store
            .update_careers("u1", &json!([{"id": "career-1", "title": "Cartographer"}]))
            .unwrap();
        store.set_status("u1", GenerationStatus::Completed).unwrap();

        let record = store.get_profile("u1").unwrap().unwrap();
        assert_eq!(record.careers().unwrap().len(), 1);
        assert_eq!(record.status, GenerationStatus::Completed);

        store.upsert_profile("u1", &json!({"interests": "ships"})).unwrap();
        let record = store.get_profile("u1").unwrap().unwrap();
        assert!(record.careers.is_none());
        assert_eq!(record.status, GenerationStatus::Idle);
        assert_eq!(record.data["interests"], "ships");
    }

    #[test]
    fn writes_to_unknown_profile_fail() {
        let store = ProfileStore::in_memory().unwrap();
        assert!(matches!(
            store.set_status("ghost", GenerationStatus::Failed),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.update_careers("ghost", &json!([])),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn reflections_are_newest_first_and_owner_scoped() {
        let store = ProfileStore::in_memory().unwrap();
        let first = store.add_reflection("u1", "first").unwrap();
        store.add_reflection("u1", "second").unwrap();
        store.add_reflection("u2", "other user").unwrap();

        let listed = store.list_reflections("u1").unwrap();
        let contents: Vec<_> = listed.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, ["second", "first"]);

        assert!(!store.delete_reflection("u2", first.id).unwrap());
        assert!(store.delete_reflection("u1", first.id).unwrap());
        assert_eq!(store.list_reflections("u1").unwrap().len(), 1);
    }

    #[test]
    fn chat_messages_keep_insertion_order() {
        let store = ProfileStore::in_memory().unwrap();
        let session = store.create_chat_session("u1", "New Chat").unwrap();
        store
            .add_chat_message(session.id, ChatRole::User, "What should I study?")
            .unwrap();
        store
            .add_chat_message(session.id, ChatRole::Model, "Start with statistics.")
            .unwrap();

        let messages = store.load_chat_messages(session.id).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[1].content, "Start with statistics.");
    }
}
