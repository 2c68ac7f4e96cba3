//! Backend boundary for facetnav search pages.
//!
//! This crate provides:
//! - `SearchBackend` - Opaque backend trait, with HTTP and in-memory implementations
//! - `SearchClient` - Typed search and option-list lookups
//! - `Navigator` - Navigation sequencing where the latest initiated navigation wins
//! - `ClientConfig` - TOML/JSON configuration with an environment override
//! - `PreferenceStore` - Remembered values such as the last user id
//!
//! # Example
//!
//! ```ignore
//! use facetnav_client::{ClientConfig, Navigator, SearchClient};
//! use facetnav_query::{PageProfile, QueryParams};
//!
//! let config = ClientConfig::load("facetnav.toml")?;
//! let client = SearchClient::from_config(config)?;
//! let navigator = Navigator::new(client, PageProfile::problem());
//!
//! if let Some(nav) = navigator
//!     .navigate::<serde_json::Value>(&QueryParams::parse("q=dp&p=2"))
//!     .await
//! {
//!     println!("{}", nav.params);
//! }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod navigator;
pub mod preference;
pub mod timeout;

pub use backend::{BackendRequest, HttpBackend, InMemoryBackend, SearchBackend};
pub use client::{ListKind, SearchClient};
pub use config::{ClientConfig, TimeoutSettings, API_HOST_ENV};
pub use error::FetchError;
pub use navigator::{Navigation, Navigator, PageOutcome, Ticket};
pub use preference::{resolve_remembered, MemoryPreferenceStore, PreferenceStore, USER_ID_KEY};
pub use timeout::TimeoutConfig;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::backend::{HttpBackend, InMemoryBackend, SearchBackend};
    pub use crate::client::{ListKind, SearchClient};
    pub use crate::config::ClientConfig;
    pub use crate::error::FetchError;
    pub use crate::navigator::{Navigation, Navigator, PageOutcome};
    pub use crate::preference::{resolve_remembered, MemoryPreferenceStore, PreferenceStore};
}
