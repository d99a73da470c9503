//! Config command: show or validate the effective thresholds

use std::path::Path;

use anyhow::{Context, Result};
use cedula_core::config::default_config_path;

use super::load_engine;

pub fn cmd_config(config: Option<&Path>, check: bool) -> Result<()> {
    let engine = load_engine(config)?;
    let source = config_source(config);

    if check {
        println!("✅ Configuration is valid ({})", source);
        return Ok(());
    }

    let toml = engine
        .config()
        .to_toml_string()
        .context("Failed to render configuration")?;

    println!("# Effective thresholds from {}", source);
    print!("{}", toml);
    Ok(())
}

/// Where the thresholds in effect were read from
pub fn config_source(config: Option<&Path>) -> String {
    match config {
        Some(path) => path.display().to_string(),
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => path.display().to_string(),
            None => "built-in defaults".to_string(),
        },
    }
}
