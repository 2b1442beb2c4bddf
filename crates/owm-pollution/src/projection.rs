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
use crate::fetch_gate::FetchGate;
use crate::sensor_type::{PathSegment, SensorType, lookup, render_path, to_float};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

const FORECAST_LIST: &[PathSegment] = &[
    PathSegment::Key("air_pollution/forecast"),
    PathSegment::Key("list"),
];

/// Extra attributes published by the forecast sensor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastAttributes {
    /// One flat record per forecast hour: `datetime` plus all components and `aqi`
    pub forecast: Vec<Map<String, Value>>,
}

/// Serializable view of a sensor, as handed to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    pub key: &'static str,
    pub name: String,
    pub state: Option<f64>,
    pub unit_of_measurement: &'static str,
    pub icon: &'static str,
    pub attributes: Option<ForecastAttributes>,
}

/// A single sensor reading projected out of the shared OWM response
#[derive(Debug)]
pub struct SensorProjection {
    sensor_type: SensorType,
    name: String,
    gate: Arc<FetchGate>,
    state: Option<f64>,
    extra_state_attributes: Option<ForecastAttributes>,
}

impl SensorProjection {
    pub fn new(gate: Arc<FetchGate>, sensor_type: SensorType) -> Self {
        Self {
            sensor_type,
            name: sensor_type.display_name(),
            gate,
            state: None,
            extra_state_attributes: None,
        }
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icon(&self) -> &'static str {
        self.sensor_type.spec().icon
    }

    pub fn unit_of_measurement(&self) -> &'static str {
        self.sensor_type.spec().unit
    }

    /// Current value, `None` when unavailable
    pub fn state(&self) -> Option<f64> {
        self.state
    }

    pub fn extra_state_attributes(&self) -> Option<&ForecastAttributes> {
        self.extra_state_attributes.as_ref()
    }

    pub fn to_state(&self) -> SensorState {
        SensorState {
            key: self.sensor_type.key(),
            name: self.name.clone(),
            state: self.state,
            unit_of_measurement: self.unit_of_measurement(),
            icon: self.icon(),
            attributes: self.extra_state_attributes.clone(),
        }
    }

    /// Refresh the shared data (subject to throttling) and re-extract this sensor's value.
    ///
    /// Never fails: any problem leaves the sensor without a value for this cycle.
    pub async fn update(&mut self) {
        if let Err(e) = self.gate.refresh().await {
            debug!("⚠️ [OWM SENSOR] {}: refresh failed: {}", self.sensor_type, e);
        }

        match self.extract() {
            Ok((state, attributes)) => {
                debug!("📊 [OWM SENSOR] {} = {}", self.sensor_type, state);
                self.state = Some(state);
                self.extra_state_attributes = attributes;
            }
            Err(OwmError::NoData) => {
                debug!("📭 [OWM SENSOR] {}: no data available", self.sensor_type);
                self.clear();
            }
            Err(e) => {
                warn!("⚠️ [OWM SENSOR] {}: {}", self.sensor_type, e);
                self.clear();
            }
        }
    }

    fn clear(&mut self) {
        self.state = None;
        self.extra_state_attributes = None;
    }

    /// The value always comes from the table path; a broken forecast entry
    /// only drops the attributes.
    fn extract(&self) -> OwmResult<(f64, Option<ForecastAttributes>)> {
        let data = self.gate.snapshot().ok_or(OwmError::NoData)?;
        let spec = self.sensor_type.spec();
        let state = to_float(lookup(&data, spec.path)?, spec.path)?;

        let attributes = match self.sensor_type {
            SensorType::Forecast => match expand_forecast(&data) {
                Ok(attributes) => Some(attributes),
                Err(e) => {
                    warn!(
                        "⚠️ [OWM SENSOR] {}: forecast attributes unavailable: {}",
                        self.sensor_type, e
                    );
                    None
                }
            },
            _ => None,
        };

        Ok((state, attributes))
    }
}

/// Flatten every forecast entry into a record keyed by field name
fn expand_forecast(data: &Value) -> OwmResult<ForecastAttributes> {
    let entries = lookup(data, FORECAST_LIST)?
        .as_array()
        .ok_or_else(|| OwmError::MissingField(render_path(FORECAST_LIST)))?;

    let forecast = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| forecast_record(idx, entry))
        .collect::<OwmResult<Vec<_>>>()?;

    Ok(ForecastAttributes { forecast })
}

fn forecast_record(idx: usize, entry: &Value) -> OwmResult<Map<String, Value>> {
    let field_path = |field: &str| format!("{}[{idx}].{field}", render_path(FORECAST_LIST));

    let dt = entry.get("dt").ok_or_else(|| OwmError::MissingField(field_path("dt")))?;
    let timestamp = epoch_seconds(dt)
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .ok_or_else(|| OwmError::NotNumeric {
            path: field_path("dt"),
            value: dt.to_string(),
        })?;

    let object = |field: &str| {
        entry
            .get(field)
            .and_then(Value::as_object)
            .ok_or_else(|| OwmError::MissingField(field_path(field)))
    };
    let components = object("components")?;
    let main = object("main")?;

    let mut record = Map::new();
    record.insert("datetime".to_owned(), Value::String(timestamp.to_rfc3339()));
    record.extend(components.iter().map(|(k, v)| (k.clone(), v.clone())));
    record.extend(main.iter().map(|(k, v)| (k.clone(), v.clone())));
    Ok(record)
}

/// Unix seconds from an integer or float epoch, fractions truncated
#[allow(clippy::cast_possible_truncation)]
fn epoch_seconds(dt: &Value) -> Option<i64> {
    dt.as_i64()
        .or_else(|| dt.as_f64().filter(|secs| secs.is_finite()).map(|secs| secs.trunc() as i64))
}
