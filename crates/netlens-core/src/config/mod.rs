//! Configuration: the live store, mock file parsing and persisted preferences.

pub mod error;
pub mod parser;
pub mod preferences;
pub mod store;

pub use error::{ConfigError, PreferencesError};
pub use preferences::{FilePreferences, MemoryPreferences, PreferencesStore};
pub use store::{ConfigStore, KEY_CURRENT_ENV, KEY_CUSTOM_URL};
