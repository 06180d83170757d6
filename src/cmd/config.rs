use std::path::Path;

use anyhow::Result;

use pitchreel::config::{config_path, API_KEY_ENV};
use pitchreel::AppConfig;

pub fn cmd_config(config: &AppConfig, explicit: Option<&Path>) -> Result<()> {
    let path = explicit.map_or_else(config_path, Path::to_path_buf);
    let status = if path.exists() { "" } else { " (not found, using defaults)" };

    println!("# {}{status}", path.display());
    println!("{}", config.to_toml_string()?);

    eprintln!("ffmpeg:  {}", tool_status(&config.tools.ffmpeg()));
    eprintln!("ffprobe: {}", tool_status(&config.tools.ffprobe()));
    eprintln!(
        "API key: {}",
        if config.api_key().is_some() { "configured" } else { "missing" }
    );
    if config.api_key().is_none() {
        eprintln!("   Set {API_KEY_ENV} or generation.api_key to generate scripts");
    }

    Ok(())
}

fn tool_status(path: &str) -> String {
    if which::which(path).is_ok() {
        format!("✅ {path}")
    } else {
        format!("❌ {path} (not found)")
    }
}
