mod types;

pub use types::*;

use anyhow::{Context, Result};
use motionphoto_container::MIN_SIZING_ATTEMPTS;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./motionphoto.toml",
        "~/.config/motionphoto/config.toml",
        "/etc/motionphoto/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.encode.max_sizing_attempts < MIN_SIZING_ATTEMPTS {
        anyhow::bail!(
            "encode.max_sizing_attempts must be at least {}",
            MIN_SIZING_ATTEMPTS
        );
    }

    if config.tools.timeout_secs == 0 {
        anyhow::bail!("tools.timeout_secs cannot be 0");
    }

    let suffix = config.encode.output_suffix.to_ascii_lowercase();
    if !(suffix.ends_with(".jpg") || suffix.ends_with(".jpeg")) {
        anyhow::bail!(
            "encode.output_suffix '{}' must end in .jpg or .jpeg",
            config.encode.output_suffix
        );
    }

    if let Some(dir) = &config.encode.scratch_dir {
        if !dir.is_dir() {
            tracing::warn!("Scratch directory does not exist: {:?}", dir);
        }
    }

    Ok(())
}
