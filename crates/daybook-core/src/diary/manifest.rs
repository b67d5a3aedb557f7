//! Reads the diary manifest: a JSON array of `{date, image?, text?}` records

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use super::models::{Diary, Entry};
use crate::{Error, Result};

/// Conventional image extension used when a record names no image
const DEFAULT_IMAGE_EXTENSION: &str = "webp";

#[derive(Debug, Deserialize)]
struct ManifestRecord {
    date: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Load and validate the manifest at `path`
///
/// Records without an `image` pick up `<images_dir>/<date>.webp` when that
/// file exists.
pub fn load_manifest(path: &Path, images_dir: &Path) -> Result<Diary> {
    let content = std::fs::read_to_string(path)?;
    let diary = parse_manifest(&content, Some(images_dir))?;
    debug!(
        "Loaded {} entries in {} sections from {}",
        diary.len(),
        diary.sections().len(),
        path.display()
    );
    Ok(diary)
}

/// Parse manifest JSON; `images_dir` enables the conventional-image fallback
pub fn parse_manifest(content: &str, images_dir: Option<&Path>) -> Result<Diary> {
    let records: Vec<ManifestRecord> = serde_json::from_str(content)?;

    let entries = records
        .into_iter()
        .map(|record| {
            let date = NaiveDate::parse_from_str(record.date.trim(), "%Y-%m-%d")
                .map_err(|_| Error::InvalidDate(record.date.clone()))?;
            let image = record
                .image
                .filter(|s| !s.trim().is_empty())
                .or_else(|| conventional_image(date, images_dir));
            let text = record.text.filter(|s| !s.trim().is_empty());
            Ok(Entry { date, image, text })
        })
        .collect::<Result<Vec<_>>>()?;

    Diary::new(entries)
}

fn conventional_image(date: NaiveDate, images_dir: Option<&Path>) -> Option<String> {
    let name = format!("{}.{}", date.format("%Y-%m-%d"), DEFAULT_IMAGE_EXTENSION);
    let dir = images_dir?;
    dir.join(&name).is_file().then_some(name)
}
