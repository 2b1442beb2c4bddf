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

mod config;

use anyhow::{Context, Result};
use owm_pollution::{MIN_TIME_BETWEEN_UPDATES, SensorProjection, SensorState, setup_platform};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How often the host polls every sensor (Home Assistant's default scan interval)
const SCAN_INTERVAL: Duration = Duration::from_secs(30);

fn main() -> Result<()> {
    let mut once = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                println!("OWM Pollution - OpenWeatherMap air quality sensors");
                println!("Version: {VERSION}");
                println!();
                println!("Usage: owm-pollution [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help    Print this help message");
                println!("  -v, --version Print version");
                println!("      --once    Run one update cycle and print sensor states as JSON");
                return Ok(());
            }
            "--version" | "-v" => {
                println!("{VERSION}");
                return Ok(());
            }
            "--once" => once = true,
            _ => {}
        }
    }

    // Respects RUST_LOG
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    // The sensors are polled from a single task, one after another
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(run(once))
}

async fn run(once: bool) -> Result<()> {
    let config = config::load_config()?;

    info!("🚀 Starting OWM Pollution {}", VERSION);
    info!("📋 Configuration Summary:");
    info!("   Location: {}, {}", config.latitude, config.longitude);
    info!("   API: {}", config.base_url());
    info!("   Fetch throttle: {:?}", MIN_TIME_BETWEEN_UPDATES);
    info!("   Scan interval: {:?}", SCAN_INTERVAL);

    let mut sensors = setup_platform(&config)
        .await
        .context("OWM platform setup failed")?;

    if once {
        update_all(&mut sensors).await;
        let states: Vec<SensorState> = sensors.iter().map(SensorProjection::to_state).collect();
        println!("{}", serde_json::to_string_pretty(&states)?);
        return Ok(());
    }

    let mut ticker = tokio::time::interval(SCAN_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                update_all(&mut sensors).await;
                log_states(&sensors);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("🛑 Shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn update_all(sensors: &mut [SensorProjection]) {
    for sensor in sensors.iter_mut() {
        sensor.update().await;
    }
}

fn log_states(sensors: &[SensorProjection]) {
    for sensor in sensors {
        match sensor.state() {
            Some(value) => info!(
                "   {} = {} {}",
                sensor.name(),
                value,
                sensor.unit_of_measurement()
            ),
            None => info!("   {} = unknown", sensor.name()),
        }
    }
}
