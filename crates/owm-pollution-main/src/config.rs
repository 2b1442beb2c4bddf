// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use anyhow::{Context, Result, bail};
use owm_pollution::OwmConfig;
use std::path::Path;
use tracing::{info, warn};

/// HA addon options written by the Supervisor
const ADDON_OPTIONS_PATH: &str = "/data/options.json";

/// Load configuration from HA addon options, a local config file or the environment
pub fn load_config() -> Result<OwmConfig> {
    for path in [ADDON_OPTIONS_PATH, "config.toml", "config.json"] {
        let path = Path::new(path);
        if path.exists() {
            let config = load_from_file(path)?;
            info!("✅ Loaded configuration from {}", path.display());
            return Ok(config);
        }
    }

    warn!("No configuration file found, reading OWM_* environment variables");
    from_vars(|name| std::env::var(name).ok())
}

/// Load and validate a TOML or JSON configuration file
pub fn load_from_file(path: &Path) -> Result<OwmConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config: OwmConfig = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => {
            toml::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))?
        }
        Some("json") => serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
        _ => bail!("Unsupported configuration format: {}", path.display()),
    };

    config.validate()?;
    Ok(config)
}

/// Build configuration from `OWM_API_KEY`, `OWM_LATITUDE`, `OWM_LONGITUDE` and optional `OWM_BASE_URL`
fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<OwmConfig> {
    let required = |name: &str| var(name).with_context(|| format!("{name} is not set"));

    let mut config = OwmConfig::new(
        required("OWM_API_KEY")?,
        required("OWM_LATITUDE")?,
        required("OWM_LONGITUDE")?,
    );
    if let Some(url) = var("OWM_BASE_URL") {
        config = config.with_base_url(url);
    }

    config.validate()?;
    Ok(config)
}
