use std::path::Path;

use anyhow::Result;

use daybook_core::AppConfig;

const PREVIEW_CHARS: usize = 60;

pub fn run(config: &AppConfig, manifest: Option<&Path>) -> Result<()> {
    let (diary, _) = super::load_diary(config, manifest)?;

    if diary.is_empty() {
        println!("No diary entries yet.");
        return Ok(());
    }

    println!("Entries ({}):\n", diary.len());

    for section in diary.sections() {
        println!("{} ({} entries)", section.month, section.len);
        for entry in &diary.entries()[section.range()] {
            let image = if entry.image.is_some() { "[image]" } else { "       " };
            let text = entry.text.as_deref().map(preview).unwrap_or_default();
            println!("  {} {} {}", entry.key(), image, text);
        }
        println!();
    }

    Ok(())
}

/// First line of `text`, cut to a fixed number of characters
fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > PREVIEW_CHARS {
        let cut: String = line.chars().take(PREVIEW_CHARS).collect();
        format!("{}…", cut)
    } else {
        line.to_string()
    }
}
