use anyhow::Result;

use morph_core::AppConfig;

pub fn run(config: &AppConfig) -> Result<()> {
    println!("# {}", AppConfig::config_path().display());
    if !AppConfig::config_path().exists() {
        println!("# (file not found, showing defaults)");
    }
    println!("# log file: {}", config.log_path().display());
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
