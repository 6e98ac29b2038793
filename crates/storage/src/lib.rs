//! SQLite-backed record storage for Waypoint.
//!
//! This crate persists everything the guidance service needs between runs:
//! the user's onboarding profile, the career paths generated for it, the
//! progress of a background generation, journal reflections and chat history.
//!
//! # Overview
//!
//! The [`ProfileStore`] wraps a SQLite database. It is deliberately a plain
//! record store: callers get, put and delete rows, and all LLM work happens
//! elsewhere.
//!
//! ## GenerationStatus
//!
//! Each profile carries a [`GenerationStatus`] (`idle`, `generating`,
//! `completed`, `failed`). Background generation writes it and pollers read
//! it. It is a progress indicator, not a lock.
//!
//! # Example
//!
//! ```no_run
//! use storage::{GenerationStatus, ProfileStore};
//! use serde_json::json;
//!
//! let store = ProfileStore::open("waypoint.db")?;
//! store.upsert_profile("local", &json!({"interests": "urban planning"}))?;
//! store.set_status("local", GenerationStatus::Generating)?;
//!
//! let record = store.get_profile("local")?.expect("profile was just written");
//! println!("{}: {}", record.user_id, record.status);
//! # Ok::<(), storage::Error>(())
//! ```

mod error;
mod record;
mod store;

pub use error::{Error, Result};
pub use record::{
    ChatMessage, ChatRole, ChatSession, GenerationStatus, ProfileRecord, Reflection,
};
pub use store::ProfileStore;
