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
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// OpenWeatherMap endpoints the adapter knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Hourly air pollution forecast (`list[]` of components + AQI)
    AirPollutionForecast,
    /// One Call (current conditions, used for the UV index)
    OneCall,
}

impl Endpoint {
    /// Path below the API root, also used as the key in the parsed response
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AirPollutionForecast => "air_pollution/forecast",
            Self::OneCall => "onecall",
        }
    }

    /// Whether a failure of this endpoint fails the whole fetch cycle
    pub fn is_required(&self) -> bool {
        matches!(self, Self::AirPollutionForecast)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to build one upstream request cycle
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub endpoints: Vec<Endpoint>,
    pub latitude: String,
    pub longitude: String,
    pub api_key: String,
}

/// Source of raw pollution data
///
/// Returns a JSON object keyed by endpoint name. Optional endpoints that
/// failed are left out of the object.
#[async_trait]
pub trait PollutionSource: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> OwmResult<Value>;
}

/// OpenWeatherMap REST API client
#[derive(Debug, Clone)]
pub struct OwmClient {
    base_url: String,
    client: Client,
}

impl OwmClient {
    pub fn new(base_url: impl Into<String>) -> OwmResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| OwmError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client,
        })
    }

    /// Fetch a single endpoint and parse the body as JSON
    pub async fn get_endpoint(
        &self,
        endpoint: Endpoint,
        request: &FetchRequest,
    ) -> OwmResult<Value> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(
            "🔍 [OWM QUERY] GET {} (lat={}, lon={})",
            url, request.latitude, request.longitude
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", request.latitude.as_str()),
                ("lon", request.longitude.as_str()),
                ("appid", request.api_key.as_str()),
            ])
            .send()
            .await
            // the URL carries the API key
            .map_err(reqwest::Error::without_url)?;

        match response.status() {
            status if status.is_success() => {
                let body = response.text().await.map_err(reqwest::Error::without_url)?;
                let value = serde_json::from_str::<Value>(&body)?;
                debug!("✅ [OWM RESULT] {} returned {} bytes", endpoint, body.len());
                Ok(value)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!("❌ [OWM ERROR] Authentication failed for {}", endpoint);
                Err(OwmError::AuthenticationFailed)
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                error!("❌ [OWM ERROR] {} status {}: {}", endpoint, status, error_text);
                Err(OwmError::ApiError {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }
}

#[async_trait]
impl PollutionSource for OwmClient {
    async fn fetch(&self, request: &FetchRequest) -> OwmResult<Value> {
        info!(
            "🌫️ [OWM FETCH] Requesting {} endpoint(s) for {},{}",
            request.endpoints.len(),
            request.latitude,
            request.longitude
        );

        let mut merged = Map::new();
        let mut last_error = None;
        for endpoint in &request.endpoints {
            match self.get_endpoint(*endpoint, request).await {
                Ok(value) => {
                    merged.insert(endpoint.as_str().to_owned(), value);
                }
                Err(e) if endpoint.is_required() => return Err(e),
                Err(e) => {
                    warn!("⚠️ [OWM FETCH] Skipping optional endpoint {}: {}", endpoint, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if merged.is_empty() => Err(e),
            _ => Ok(Value::Object(merged)),
        }
    }
}
