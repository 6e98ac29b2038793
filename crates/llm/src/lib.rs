//! Vendor-neutral structured generation for Waypoint.
//!
//! Callers ask for JSON matching a schema, an image, or a chat reply; this
//! crate picks one of three vendors (OpenAI, Anthropic, Gemini), speaks its
//! wire format, and hands back a de-enveloped value.
//!
//! # Overview
//!
//! - **[`ProviderSelector`]**: chooses the first vendor with a credential, in
//!   the fixed order OpenAI, Anthropic, Gemini, and keeps that choice.
//! - **[`Provider`]**: the adapter contract. [`OpenAiProvider`],
//!   [`AnthropicProvider`] and [`GeminiProvider`] implement it;
//!   [`ActiveProvider`] dispatches to whichever was selected.
//! - **[`Schema`]**: one canonical output schema, rendered per vendor with
//!   [`translate`].
//! - **[`normalize`]** and **[`backfill_ids`]**: coerce replies into the
//!   expected shape and give list items identifiers.
//! - **[`Generator`]**: the facade most callers use.
//!
//! # Example
//!
//! ```no_run
//! use llm::{Credentials, GenerationRequest, Generator, ProviderSelector, Schema};
//!
//! # async fn example() -> llm::Result<()> {
//! let generator = Generator::new(ProviderSelector::new(Credentials::from_env()));
//! let request = GenerationRequest::new("Suggest four hobbies for a quiet student.")
//!     .with_schema(Schema::array(Schema::string()));
//! let hobbies = generator.generate_array(&request).await?;
//! println!("{hobbies:?}");
//! # Ok(())
//! # }
//! ```

mod error;
mod extract;
mod facade;
mod normalize;
mod profile;
mod provider;
mod providers;
mod request;
mod schema;
mod selector;

pub use error::{Error, ProviderError, Result};
pub use extract::extract_json;
pub use facade::Generator;
pub use normalize::{Shape, backfill_ids, normalize};
pub use profile::{Capabilities, Credentials, ModelSet, ProfileOverrides, ProviderKind, ProviderProfile};
pub use provider::{Provider, ProviderSource};
pub use providers::{
    ActiveProvider, AnthropicProvider, AnthropicProviderBuilder, GeminiProvider, OpenAiProvider,
};
pub use request::{GenerationRequest, ImageAttachment, data_url};
pub use schema::{Dialect, ObjectSchema, RESULT_KEY, Schema, translate, unwrap_result, wrap_result};
pub use selector::ProviderSelector;
