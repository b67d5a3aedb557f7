use anyhow::Result;

use daybook_core::AppConfig;

pub fn run(config: &AppConfig) -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() {
        println!("# Configuration: {}", path.display());
    } else {
        println!("# Configuration: {} (not found, using defaults)", path.display());
    }
    println!("# Manifest:      {}", config.manifest_path().display());
    println!("# Images:        {}", config.images_dir().display());
    println!("# Preferences:   {}", config.preferences_path().display());
    println!("# Log:           {}", config.log_path().display());
    println!();
    print!("{}", config.to_toml()?);

    Ok(())
}
