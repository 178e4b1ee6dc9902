//! Show or initialize the configuration.

use swarmlink_config::AppConfig;

pub fn run(init: bool) -> anyhow::Result<()> {
    let config_path = AppConfig::config_dir().join("config.toml");

    if init {
        if config_path.exists() {
            println!("Config already exists at {}", config_path.display());
        } else {
            std::fs::create_dir_all(AppConfig::config_dir())?;
            std::fs::write(&config_path, AppConfig::default_toml())?;
            println!("Wrote default config to {}", config_path.display());
        }
        return Ok(());
    }

    let config = AppConfig::load()?;
    println!("Config path: {}", config_path.display());
    println!("{config:#?}");
    if !config.has_api_key() {
        println!("\nNo API key set — `serve` will refuse to start.");
        println!("Set SWARMLINK_API_KEY or OPENAI_API_KEY, or add api_key to the config file.");
    }

    Ok(())
}
