//! Career guidance for Waypoint.
//!
//! Builds on [`llm`] for generation and [`storage`] for persistence. The
//! [`Advisor`] turns a user's onboarding profile into career paths, story
//! previews, academic advice, sketches and chat replies. Most operations
//! degrade to a fixed fallback rather than failing.
//!
//! # Background generation
//!
//! [`spawn_career_generation`] runs career generation on a tokio task and
//! reports progress only through the [`CareerStore`] status field.
//!
//! ```no_run
//! use guidance::{Advisor, spawn_career_generation};
//! use llm::ProviderSelector;
//! use serde_json::json;
//! use std::sync::Arc;
//! use storage::ProfileStore;
//!
//! # async fn example() -> guidance::Result<()> {
//! let store = Arc::new(ProfileStore::open("waypoint.db")?);
//! let advisor = Arc::new(Advisor::new(ProviderSelector::from_env()));
//! let profile = json!({"interests": "urban planning"});
//! store.upsert_profile("local", &profile)?;
//!
//! let job = spawn_career_generation(advisor, Arc::clone(&store), "local".into(), profile)?;
//! println!("finished: {}", job.await.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

mod academic;
mod advisor;
mod career;
mod chat;
mod error;
mod jobs;
pub mod prompts;
pub mod schemas;
mod story;

pub use academic::{AcademicAnalysis, KeyCourse, MasterProgram};
pub use advisor::{Advisor, CAREER_ID_PREFIX, CHAT_FALLBACK};
pub use career::{CareerPath, Milestone, Outlook, Resource};
pub use chat::{ChatContext, MAX_REFLECTIONS};
pub use error::{Error, Result};
pub use jobs::{CareerStore, spawn_career_generation};
pub use story::StoryScene;
