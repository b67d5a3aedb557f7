pub mod manifest;
pub mod models;

pub use manifest::{load_manifest, parse_manifest};
pub use models::{Diary, Entry, MonthKey, Section};
