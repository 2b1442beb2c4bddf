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

//! Shared fixtures for unit tests.

use crate::client::{Endpoint, FetchRequest, PollutionSource};
use crate::errors::{OwmError, OwmResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory pollution source counting its calls
pub struct StubSource {
    calls: AtomicUsize,
    failing: AtomicBool,
    payload: Mutex<Value>,
}

impl StubSource {
    pub fn new(payload: Value) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            payload: Mutex::new(payload),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_payload(&self, payload: Value) {
        *self.payload.lock() = payload;
    }
}

#[async_trait]
impl PollutionSource for StubSource {
    async fn fetch(&self, _request: &FetchRequest) -> OwmResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(OwmError::ApiError {
                status: 503,
                message: "unavailable".to_owned(),
            });
        }
        Ok(self.payload.lock().clone())
    }
}

pub fn stub_request() -> FetchRequest {
    FetchRequest {
        endpoints: vec![Endpoint::AirPollutionForecast, Endpoint::OneCall],
        latitude: "50.08".to_owned(),
        longitude: "14.44".to_owned(),
        api_key: "test_key".to_owned(),
    }
}

/// Two-hour forecast plus One Call current conditions
pub fn fixture() -> Value {
    json!({
        "air_pollution/forecast": {
            "coord": {"lon": 14.44, "lat": 50.08},
            "list": [
                {
                    "dt": 1_700_000_000,
                    "main": {"aqi": 2},
                    "components": {
                        "co": 12.3,
                        "no": 0.01,
                        "no2": 4.2,
                        "o3": 61.5,
                        "so2": 1.1,
                        "pm2_5": 7.25,
                        "pm10": 9.5,
                        "nh3": 0.8
                    }
                },
                {
                    "dt": 1_700_003_600,
                    "main": {"aqi": 3},
                    "components": {
                        "co": 13.0,
                        "no": 0.02,
                        "no2": 5.0,
                        "o3": 70.0,
                        "so2": 1.2,
                        "pm2_5": 8.0,
                        "pm10": 10.0,
                        "nh3": 0.9
                    }
                }
            ]
        },
        "onecall": {
            "lat": 50.08,
            "lon": 14.44,
            "current": {"dt": 1_700_000_000, "uvi": 4}
        }
    })
}
