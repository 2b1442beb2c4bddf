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

use crate::client::{Endpoint, FetchRequest, OwmClient, PollutionSource};
use crate::config::OwmConfig;
use crate::errors::OwmResult;
use crate::fetch_gate::FetchGate;
use crate::projection::SensorProjection;
use crate::sensor_type::SensorType;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Endpoints requested on every refresh
///
/// Only the pollution forecast is required; a failing `onecall` leaves the UV
/// sensor without a value.
pub const API_LIST: &[Endpoint] = &[Endpoint::AirPollutionForecast, Endpoint::OneCall];

/// Set up one sensor per supported measurement
pub async fn setup_platform(config: &OwmConfig) -> OwmResult<Vec<SensorProjection>> {
    let keys: Vec<&str> = SensorType::all().iter().map(|t| t.key()).collect();
    setup_platform_with(config, &keys).await
}

/// Set up sensors for the given identifiers
///
/// Unknown identifiers are skipped with a warning.
pub async fn setup_platform_with(
    config: &OwmConfig,
    sensor_keys: &[&str],
) -> OwmResult<Vec<SensorProjection>> {
    config.validate()?;
    let client = Arc::new(OwmClient::new(config.base_url())?);
    setup_with_source(config, client, sensor_keys).await
}

/// Set up sensors on top of an arbitrary data source
///
/// Performs the initial connectivity check through the gate; if it fails no
/// sensors are created. The fetched data is reused by the first update cycle.
pub async fn setup_with_source(
    config: &OwmConfig,
    source: Arc<dyn PollutionSource>,
    sensor_keys: &[&str],
) -> OwmResult<Vec<SensorProjection>> {
    let request = FetchRequest {
        endpoints: API_LIST.to_vec(),
        latitude: config.latitude.trim().to_owned(),
        longitude: config.longitude.trim().to_owned(),
        api_key: config.api_key.clone(),
    };
    let gate = Arc::new(FetchGate::new(source, request));

    if let Err(e) = gate.refresh().await {
        error!("❌ [OWM SETUP] Initial fetch failed, not creating sensors: {}", e);
        return Err(e);
    }

    let mut sensors: Vec<SensorProjection> = Vec::with_capacity(sensor_keys.len());
    for key in sensor_keys {
        let sensor_type = match key.parse::<SensorType>() {
            Ok(t) => t,
            Err(e) => {
                warn!("⚠️ [OWM SETUP] Skipping sensor: {}", e);
                continue;
            }
        };
        if sensors.iter().any(|s| s.sensor_type() == sensor_type) {
            warn!("⚠️ [OWM SETUP] Duplicate sensor '{}' ignored", sensor_type);
            continue;
        }
        sensors.push(SensorProjection::new(gate.clone(), sensor_type));
    }

    info!(
        "✅ [OWM SETUP] Created {} sensor(s) for {},{}",
        sensors.len(),
        config.latitude,
        config.longitude
    );
    Ok(sensors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::OwmError;
    use crate::testing::{StubSource, fixture};
    use mockito::{Matcher, Server};

    fn config() -> OwmConfig {
        OwmConfig::new("test_key", "50.08", "14.44")
    }

    #[tokio::test]
    async fn test_setup_creates_every_sensor() {
        let source = Arc::new(StubSource::new(fixture()));
        let keys: Vec<&str> = SensorType::all().iter().map(|t| t.key()).collect();

        let sensors = setup_with_source(&config(), source.clone(), &keys)
            .await
            .unwrap();

        assert_eq!(sensors.len(), SensorType::all().len());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_first_update_reuses_setup_fetch() {
        let source = Arc::new(StubSource::new(fixture()));
        let mut sensors = setup_with_source(&config(), source.clone(), &["co", "uvi"])
            .await
            .unwrap();

        for sensor in &mut sensors {
            sensor.update().await;
        }

        assert_eq!(source.calls(), 1);
        assert_eq!(sensors[0].state(), Some(12.3));
        assert_eq!(sensors[1].state(), Some(4.0));
    }

    #[tokio::test]
    async fn test_unknown_identifier_skipped() {
        let source = Arc::new(StubSource::new(fixture()));

        let mut sensors = setup_with_source(&config(), source, &["co", "radon", "co"])
            .await
            .unwrap();

        assert_eq!(sensors.len(), 1);
        sensors[0].update().await;
        assert_eq!(sensors[0].sensor_type(), SensorType::Co);
    }

    #[tokio::test]
    async fn test_setup_aborts_on_failed_check() {
        let source = Arc::new(StubSource::new(fixture()));
        source.set_failing(true);

        let result = setup_with_source(&config(), source, &["co"]).await;

        assert!(matches!(result, Err(OwmError::ApiError { .. })));
    }

    #[tokio::test]
    async fn test_setup_rejects_invalid_config() {
        let result = setup_platform(&OwmConfig::new("", "50.08", "14.44")).await;
        assert!(matches!(result, Err(OwmError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_setup_against_http_server() {
        let mut server = Server::new_async().await;
        let fixture = fixture();
        let pollution = server
            .mock("GET", "/air_pollution/forecast")
            .match_query(Matcher::UrlEncoded("appid".into(), "test_key".into()))
            .with_status(200)
            .with_body(fixture["air_pollution/forecast"].to_string())
            .expect(1)
            .create_async()
            .await;
        let onecall = server
            .mock("GET", "/onecall")
            .match_query(Matcher::UrlEncoded("appid".into(), "test_key".into()))
            .with_status(200)
            .with_body(fixture["onecall"].to_string())
            .expect(1)
            .create_async()
            .await;

        let config = config().with_base_url(server.url());
        let mut sensors = setup_platform(&config).await.unwrap();
        for sensor in &mut sensors {
            sensor.update().await;
        }

        let forecast = sensors
            .iter()
            .find(|s| s.sensor_type() == SensorType::Forecast)
            .unwrap();
        assert_eq!(forecast.state(), Some(2.0));
        assert_eq!(forecast.extra_state_attributes().unwrap().forecast.len(), 2);
        assert!(sensors.iter().all(|s| s.state().is_some()));

        pollution.assert_async().await;
        onecall.assert_async().await;
    }

    #[tokio::test]
    async fn test_setup_fails_on_unreachable_api() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/air_pollution/forecast")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let config = config().with_base_url(server.url());
        let result = setup_platform(&config).await;

        assert!(matches!(result, Err(OwmError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn test_setup_survives_onecall_rejection() {
        let mut server = Server::new_async().await;
        let fixture = fixture();
        let _pollution = server
            .mock("GET", "/air_pollution/forecast")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(fixture["air_pollution/forecast"].to_string())
            .create_async()
            .await;
        let _onecall = server
            .mock("GET", "/onecall")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"cod": 401, "message": "Invalid API key"}"#)
            .create_async()
            .await;

        let config = config().with_base_url(server.url());
        let mut sensors = setup_platform(&config).await.unwrap();
        assert_eq!(sensors.len(), SensorType::all().len());
        for sensor in &mut sensors {
            sensor.update().await;
        }

        let state = |sensor_type: SensorType| {
            sensors
                .iter()
                .find(|s| s.sensor_type() == sensor_type)
                .and_then(SensorProjection::state)
        };
        assert_eq!(state(SensorType::Co), Some(12.3));
        assert_eq!(state(SensorType::Aqi), Some(2.0));
        assert_eq!(state(SensorType::Uvi), None);
    }
}
