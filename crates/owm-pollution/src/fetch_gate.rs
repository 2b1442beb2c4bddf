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

use crate::client::{FetchRequest, PollutionSource};
use crate::errors::OwmResult;
use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// Minimum time between upstream fetch attempts
pub const MIN_TIME_BETWEEN_UPDATES: Duration = Duration::from_secs(10 * 60);

/// Outcome of a successful [`FetchGate::refresh`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Upstream was called and the snapshot replaced
    Fetched,
    /// Called within the throttle interval, snapshot left as is
    Throttled,
}

/// Throttled fetcher shared by all sensor projections
///
/// Holds the last parsed response. The response is swapped out as a whole on
/// every attempt, so readers never observe a partially updated tree.
pub struct FetchGate {
    source: Arc<dyn PollutionSource>,
    request: FetchRequest,
    last_attempt: Mutex<Option<Instant>>,
    data: RwLock<Option<Arc<Value>>>,
}

impl FetchGate {
    pub fn new(source: Arc<dyn PollutionSource>, request: FetchRequest) -> Self {
        Self {
            source,
            request,
            last_attempt: Mutex::new(None),
            data: RwLock::new(None),
        }
    }

    /// Fetch fresh data unless the last attempt was less than
    /// [`MIN_TIME_BETWEEN_UPDATES`] ago.
    ///
    /// On failure the error is logged, the snapshot cleared and the error
    /// returned. A failed attempt still counts for throttling.
    pub async fn refresh(&self) -> OwmResult<Refresh> {
        let mut last_attempt = self.last_attempt.lock().await;
        let now = Instant::now();

        if let Some(previous) = *last_attempt {
            let elapsed = now.duration_since(previous);
            if elapsed < MIN_TIME_BETWEEN_UPDATES {
                debug!(
                    "⏳ [OWM GATE] Throttled, next fetch in {:?}",
                    MIN_TIME_BETWEEN_UPDATES - elapsed
                );
                return Ok(Refresh::Throttled);
            }
        }
        *last_attempt = Some(now);

        debug!("🔄 [OWM GATE] Updating OWM pollution sensors");
        match self.source.fetch(&self.request).await {
            Ok(value) => {
                *self.data.write() = Some(Arc::new(value));
                info!("✅ [OWM GATE] Pollution data refreshed");
                Ok(Refresh::Fetched)
            }
            Err(e) => {
                error!("❌ [OWM GATE] Error occurred while fetching data: {}", e);
                *self.data.write() = None;
                Err(e)
            }
        }
    }

    /// Most recently parsed response, `None` before the first fetch or after a failed one
    pub fn snapshot(&self) -> Option<Arc<Value>> {
        self.data.read().clone()
    }
}

impl fmt::Debug for FetchGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchGate")
            .field("endpoints", &self.request.endpoints)
            .field("latitude", &self.request.latitude)
            .field("longitude", &self.request.longitude)
            .field("has_data", &self.data.read().is_some())
            .finish_non_exhaustive()
    }
}
