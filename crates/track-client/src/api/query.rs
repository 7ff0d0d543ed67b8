// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Query parameters for the tracking and weather endpoints.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Time range a request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    /// Trailing window ending now; `from` is recomputed on every request.
    Live { lookback: Duration },
    /// Fixed historical range.
    Range { from: DateTime<Utc>, to: DateTime<Utc> },
}

impl TimeWindow {
    /// Resolve to `(from, to)` unix seconds relative to `now`.
    ///
    /// Live windows have no upper bound.
    #[must_use]
    pub fn resolve(&self, now: DateTime<Utc>) -> (i64, Option<i64>) {
        match self {
            Self::Live { lookback } => {
                let lookback = i64::try_from(lookback.as_secs()).unwrap_or(i64::MAX);
                (now.timestamp().saturating_sub(lookback), None)
            }
            Self::Range { from, to } => (from.timestamp(), Some(to.timestamp())),
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }
}

/// Query string for the tracking endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackQuery {
    pub from: i64,
    /// Minimum speed over ground in knots.
    pub sog: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<i64>,
    /// Bin size in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mins: Option<u32>,
    /// Fleet filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
}

/// Weather field to chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherField {
    Wind,
    Pressure,
}

impl WeatherField {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wind => "wind",
            Self::Pressure => "pressure",
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Wind => "Wind",
            Self::Pressure => "Pressure",
        }
    }
}

impl fmt::Display for WeatherField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query string for the weather endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherQuery {
    pub field: WeatherField,
    pub limit: u32,
    pub from: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<i64>,
}
