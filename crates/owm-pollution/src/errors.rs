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

use thiserror::Error;

/// OpenWeatherMap adapter error types
#[derive(Error, Debug)]
pub enum OwmError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("OWM API returned error status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Authentication failed (check the API key)")]
    AuthenticationFailed,

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Field not present in response: {0}")]
    MissingField(String),

    #[error("Field {path} is not numeric: {value}")]
    NotNumeric { path: String, value: String },

    #[error("Unknown sensor type: {0}")]
    UnknownSensorType(String),

    #[error("No data available from last fetch")]
    NoData,
}

pub type OwmResult<T> = Result<T, OwmError>;
