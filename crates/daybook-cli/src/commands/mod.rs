pub mod config;
pub mod list;
pub mod run;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use daybook_core::{diary::load_manifest, AppConfig, Diary};

/// Load the diary and the directory its relative image references use
///
/// An explicit manifest resolves images next to itself, in `images/`.
pub fn load_diary(config: &AppConfig, manifest: Option<&Path>) -> Result<(Diary, PathBuf)> {
    let (manifest_path, images_dir) = match manifest {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            (path.to_path_buf(), dir.join("images"))
        }
        None => (config.manifest_path(), config.images_dir()),
    };

    if !manifest_path.exists() {
        return Err(anyhow!(
            "No diary manifest at {}.\nCreate it as a JSON array of entries:\n  [{{\"date\": \"2025-01-03\", \"text\": \"...\"}}]",
            manifest_path.display()
        ));
    }

    let diary = load_manifest(&manifest_path, &images_dir)?;
    Ok((diary, images_dir))
}
