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

use crate::errors::{OwmError, OwmResult};
use serde::{Deserialize, Serialize};

/// Default OpenWeatherMap API root (version 2.5 hosts both `air_pollution` and `onecall`)
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Platform configuration for the OWM pollution sensors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwmConfig {
    /// OpenWeatherMap API key (sent as `appid`)
    pub api_key: String,

    /// Latitude as entered by the user, e.g. "50.0755"
    pub latitude: String,

    /// Longitude as entered by the user, e.g. "14.4378"
    pub longitude: String,

    /// API root override for development and tests
    #[serde(default)]
    pub base_url: Option<String>,
}

impl OwmConfig {
    pub fn new(
        api_key: impl Into<String>,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            latitude: latitude.into(),
            longitude: longitude.into(),
            base_url: None,
        }
    }

    /// Set a custom API root
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// API root to send requests to
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Validate configuration, reporting every problem found
    pub fn validate(&self) -> OwmResult<()> {
        let mut errors = Vec::new();

        if self.api_key.trim().is_empty() {
            errors.push("api_key cannot be empty".to_owned());
        }

        if let Err(e) = parse_coordinate(&self.latitude, 90.0) {
            errors.push(format!("latitude {e}"));
        }
        if let Err(e) = parse_coordinate(&self.longitude, 180.0) {
            errors.push(format!("longitude {e}"));
        }

        let base_url = self.base_url();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            errors.push(format!(
                "base_url '{base_url}' must start with http:// or https://"
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(OwmError::ConfigError(errors.join("; ")))
        }
    }
}

fn parse_coordinate(raw: &str, limit: f64) -> Result<f64, String> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("'{raw}' is not a number"))?;

    if !value.is_finite() || value.abs() > limit {
        return Err(format!("{value} is outside [-{limit}, {limit}]"));
    }
    Ok(value)
}
