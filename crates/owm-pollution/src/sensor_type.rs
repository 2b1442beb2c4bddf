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
use serde_json::Value;
use std::fmt::{self, Write as _};
use std::str::FromStr;

pub const SENSOR_PREFIX_ROOT: &str = "OWM ";
pub const SENSOR_PREFIX_POLLUTION: &str = "Pollution ";

const UNIT_CONCENTRATION: &str = "μg/m3";

/// One step into the parsed response tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment {
    Key(&'static str),
    Index(usize),
}

/// Static description of one tracked measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub sensor_type: SensorType,
    pub name: &'static str,
    pub unit: &'static str,
    pub icon: &'static str,
    pub path: &'static [PathSegment],
}

/// Path into the first (current hour) entry of the air pollution forecast
macro_rules! current_pollution {
    ($($key:literal),+) => {
        &[
            PathSegment::Key("air_pollution/forecast"),
            PathSegment::Key("list"),
            PathSegment::Index(0),
            $(PathSegment::Key($key)),+
        ]
    };
}

/// Ordered like [`SensorType::all`]
static FIELD_SPECS: [FieldSpec; 11] = [
    FieldSpec {
        sensor_type: SensorType::Co,
        name: "Carbon monoxide (CO)",
        unit: UNIT_CONCENTRATION,
        icon: "mdi:molecule-co",
        path: current_pollution!("components", "co"),
    },
    FieldSpec {
        sensor_type: SensorType::No,
        name: "Nitrogen monoxide (NO)",
        unit: UNIT_CONCENTRATION,
        icon: "mdi:smog",
        path: current_pollution!("components", "no"),
    },
    FieldSpec {
        sensor_type: SensorType::No2,
        name: "Nitrogen dioxide (NO2)",
        unit: UNIT_CONCENTRATION,
        icon: "mdi:smog",
        path: current_pollution!("components", "no2"),
    },
    FieldSpec {
        sensor_type: SensorType::O3,
        name: "Ozone (O3)",
        unit: UNIT_CONCENTRATION,
        icon: "mdi:skull-outline",
        path: current_pollution!("components", "o3"),
    },
    FieldSpec {
        sensor_type: SensorType::So2,
        name: "Sulphur dioxide (SO2)",
        unit: UNIT_CONCENTRATION,
        icon: "mdi:smog",
        path: current_pollution!("components", "so2"),
    },
    FieldSpec {
        sensor_type: SensorType::Nh3,
        name: "Ammonia (NH3)",
        unit: UNIT_CONCENTRATION,
        icon: "mdi:skull",
        path: current_pollution!("components", "nh3"),
    },
    FieldSpec {
        sensor_type: SensorType::Pm25,
        name: "Fine particles (PM2.5)",
        unit: UNIT_CONCENTRATION,
        icon: "mdi:grain",
        path: current_pollution!("components", "pm2_5"),
    },
    FieldSpec {
        sensor_type: SensorType::Pm10,
        name: "Coarse particles (PM10)",
        unit: UNIT_CONCENTRATION,
        icon: "mdi:grain",
        path: current_pollution!("components", "pm10"),
    },
    FieldSpec {
        sensor_type: SensorType::Aqi,
        name: "Overall Air Quality",
        unit: "",
        icon: "mdi:lungs",
        path: current_pollution!("main", "aqi"),
    },
    FieldSpec {
        sensor_type: SensorType::Uvi,
        name: "Ultraviolet index",
        unit: "idx",
        icon: "mdi:hazard-lights",
        path: &[
            PathSegment::Key("onecall"),
            PathSegment::Key("current"),
            PathSegment::Key("uvi"),
        ],
    },
    FieldSpec {
        sensor_type: SensorType::Forecast,
        name: "Forecast",
        unit: "",
        icon: "mdi:eye-arrow-right",
        path: current_pollution!("main", "aqi"),
    },
];

/// Measurements exposed as sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorType {
    Co,
    No,
    No2,
    O3,
    So2,
    Nh3,
    Pm25,
    Pm10,
    Aqi,
    Uvi,
    /// Current AQI plus the hourly forecast as an attribute
    Forecast,
}

impl SensorType {
    /// All supported sensor types, in table order
    pub fn all() -> &'static [SensorType] {
        &[
            Self::Co,
            Self::No,
            Self::No2,
            Self::O3,
            Self::So2,
            Self::Nh3,
            Self::Pm25,
            Self::Pm10,
            Self::Aqi,
            Self::Uvi,
            Self::Forecast,
        ]
    }

    /// Identifier used in configuration and in the upstream `components` object
    pub fn key(self) -> &'static str {
        match self {
            Self::Co => "co",
            Self::No => "no",
            Self::No2 => "no2",
            Self::O3 => "o3",
            Self::So2 => "so2",
            Self::Nh3 => "nh3",
            Self::Pm25 => "pm2_5",
            Self::Pm10 => "pm10",
            Self::Aqi => "aqi",
            Self::Uvi => "uvi",
            Self::Forecast => "forecast",
        }
    }

    pub fn spec(self) -> &'static FieldSpec {
        &FIELD_SPECS[self as usize]
    }

    /// Display name, e.g. "OWM Pollution Ozone (O3)"
    ///
    /// The UV index comes from the weather side of the API and only gets the root prefix.
    pub fn display_name(self) -> String {
        let spec = self.spec();
        match self {
            Self::Uvi => format!("{SENSOR_PREFIX_ROOT}{}", spec.name),
            _ => format!("{SENSOR_PREFIX_ROOT}{SENSOR_PREFIX_POLLUTION}{}", spec.name),
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SensorType {
    type Err = OwmError;

    fn from_str(s: &str) -> OwmResult<Self> {
        let wanted = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.key() == wanted)
            .ok_or_else(|| OwmError::UnknownSensorType(s.to_owned()))
    }
}

/// Render a path for log and error messages, e.g. `onecall.current.uvi`
pub fn render_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(idx) => {
                let _ = write!(out, "[{idx}]");
            }
        }
    }
    out
}

/// Walk `path` from `root`
pub fn lookup<'a>(root: &'a Value, path: &[PathSegment]) -> OwmResult<&'a Value> {
    path.iter()
        .try_fold(root, |node, segment| match segment {
            PathSegment::Key(key) => node.get(*key),
            PathSegment::Index(idx) => node.get(*idx),
        })
        .ok_or_else(|| OwmError::MissingField(render_path(path)))
}

/// Convert a JSON leaf to a float, accepting numbers and numeric strings
pub fn to_float(value: &Value, path: &[PathSegment]) -> OwmResult<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| OwmError::NotNumeric {
        path: render_path(path),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture;
    use serde_json::json;

    #[test]
    fn test_table_covers_every_type_once() {
        assert_eq!(SensorType::all().len(), FIELD_SPECS.len());
        for sensor_type in SensorType::all() {
            assert_eq!(sensor_type.spec().sensor_type, *sensor_type);
        }
    }

    #[test]
    fn test_units_and_icons() {
        assert_eq!(SensorType::Co.spec().unit, "μg/m3");
        assert_eq!(SensorType::Co.spec().icon, "mdi:molecule-co");
        assert_eq!(SensorType::O3.spec().icon, "mdi:skull-outline");
        assert_eq!(SensorType::Aqi.spec().unit, "");
        assert_eq!(SensorType::Aqi.spec().icon, "mdi:lungs");
        assert_eq!(SensorType::Uvi.spec().unit, "idx");
        assert_eq!(SensorType::Uvi.spec().icon, "mdi:hazard-lights");
        assert_eq!(SensorType::Forecast.spec().icon, "mdi:eye-arrow-right");
    }

    #[test]
    fn test_display_names() {
        assert_eq!(
            SensorType::Pm25.display_name(),
            "OWM Pollution Fine particles (PM2.5)"
        );
        assert_eq!(SensorType::Uvi.display_name(), "OWM Ultraviolet index");

        for sensor_type in SensorType::all() {
            let has_sub_label = sensor_type.display_name().contains("Pollution");
            assert_eq!(has_sub_label, *sensor_type != SensorType::Uvi);
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("pm2_5".parse::<SensorType>().unwrap(), SensorType::Pm25);
        assert_eq!(" UVI ".parse::<SensorType>().unwrap(), SensorType::Uvi);
        assert!(matches!(
            "pm1".parse::<SensorType>(),
            Err(OwmError::UnknownSensorType(_))
        ));

        for sensor_type in SensorType::all() {
            assert_eq!(sensor_type.to_string().parse::<SensorType>().unwrap(), *sensor_type);
        }
    }

    #[test]
    fn test_render_path() {
        assert_eq!(
            render_path(SensorType::No2.spec().path),
            "air_pollution/forecast.list[0].components.no2"
        );
        assert_eq!(render_path(SensorType::Uvi.spec().path), "onecall.current.uvi");
    }

    #[test]
    fn test_lookup_every_path_in_fixture() {
        let data = fixture();
        for sensor_type in SensorType::all() {
            let spec = sensor_type.spec();
            let value = lookup(&data, spec.path).unwrap();
            assert!(to_float(value, spec.path).is_ok(), "{sensor_type}");
        }
    }

    #[test]
    fn test_lookup_missing() {
        let data = json!({"air_pollution/forecast": {"list": []}});
        let err = lookup(&data, SensorType::Co.spec().path).unwrap_err();
        assert!(matches!(err, OwmError::MissingField(p) if p.ends_with("components.co")));
    }

    #[test]
    fn test_to_float() {
        let path = SensorType::Co.spec().path;
        assert_eq!(to_float(&json!(4), path).unwrap(), 4.0);
        assert_eq!(to_float(&json!("12.5"), path).unwrap(), 12.5);
        assert!(matches!(
            to_float(&json!(null), path),
            Err(OwmError::NotNumeric { .. })
        ));
        assert!(to_float(&json!("n/a"), path).is_err());
    }
}
