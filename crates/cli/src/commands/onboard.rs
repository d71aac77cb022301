//! `penwright onboard`: First-time setup.

use super::GlobalOpts;
use penwright_config::AppConfig;

pub async fn run(opts: &GlobalOpts) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = opts.config_path();

    println!("Penwright: First-Time Setup");
    println!("============================\n");

    if let Some(config_dir) = config_path.parent()
        && !config_dir.as_os_str().is_empty()
        && !config_dir.exists()
    {
        std::fs::create_dir_all(config_dir)?;
        println!("  Created config directory: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("  Config already exists at: {}", config_path.display());
        println!("  Edit it manually or delete it and re-run onboard.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("  Created config at: {}", config_path.display());
    println!("\n  Next steps:");
    println!("   1. Set OPENAI_API_KEY (and SERPAPI_API_KEY for research),");
    println!("      either in the environment, a .env file, or the config");
    println!("   2. Run: penwright session --user <name>\n");

    Ok(())
}
