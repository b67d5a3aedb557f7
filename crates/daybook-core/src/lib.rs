pub mod config;
pub mod diary;
pub mod error;
pub mod prefs;

pub use config::AppConfig;
pub use diary::{Diary, Entry, MonthKey, Section};
pub use error::{Error, Result};
pub use prefs::{JsonFileStore, MemoryStore, PreferenceStore, Preferences};
