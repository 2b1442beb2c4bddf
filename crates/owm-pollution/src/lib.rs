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

//! OpenWeatherMap air pollution and UV index sensors.
//!
//! A single [`FetchGate`] polls the OWM API at most once every
//! [`MIN_TIME_BETWEEN_UPDATES`]; every [`SensorProjection`] reads its own
//! field out of the shared response.

pub mod client;
pub mod config;
pub mod errors;
pub mod fetch_gate;
pub mod platform;
pub mod projection;
pub mod sensor_type;

#[cfg(test)]
mod testing;

pub use client::{Endpoint, FetchRequest, OwmClient, PollutionSource};
pub use config::{DEFAULT_BASE_URL, OwmConfig};
pub use errors::{OwmError, OwmResult};
pub use fetch_gate::{FetchGate, MIN_TIME_BETWEEN_UPDATES, Refresh};
pub use platform::{API_LIST, setup_platform, setup_platform_with, setup_with_source};
pub use projection::{ForecastAttributes, SensorProjection, SensorState};
pub use sensor_type::{FieldSpec, PathSegment, SensorType};
