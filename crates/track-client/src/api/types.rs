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

//! Response bodies of the tracking and weather endpoints.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Body of a tracking endpoint response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TracksResponse {
    #[serde(default)]
    pub tracks: Vec<VesselTrack>,
}

/// One vessel and its raw position history as delivered by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct VesselTrack {
    /// Maritime Mobile Service Identity.
    pub mmsi: u32,
    /// AIS-reported vessel name.
    #[serde(default)]
    pub name: Option<String>,
    /// Fleet registry details, absent for vessels outside any fleet.
    #[serde(default)]
    pub info: Option<VesselInfo>,
    #[serde(default)]
    pub track: Vec<TrackPoint>,
}

/// Fleet registry details for a vessel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VesselInfo {
    #[serde(default)]
    pub name: Option<String>,
    /// CSS-style hex color, e.g. `#1f77b4`.
    #[serde(default)]
    pub color: Option<String>,
}

/// A single timestamped position report.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TrackPoint {
    /// Unix timestamp in seconds.
    pub dt: i64,
    pub lat: f64,
    pub lon: f64,
    /// Course over ground in degrees.
    #[serde(default)]
    pub cog: Option<f64>,
    /// Speed over ground in knots.
    #[serde(default)]
    pub sog: Option<f64>,
}

impl TrackPoint {
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.dt, 0)
    }
}

/// Wind observation value.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Wind {
    pub knots: f64,
    /// Direction the wind blows from, in degrees.
    pub direction: f64,
}

/// A wind sample from the weather endpoint (`field=wind`).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WindSample {
    pub value: Wind,
    pub dt: i64,
}

/// A pressure sample from the weather endpoint (`field=pressure`).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PressureSample {
    /// Barometric pressure in hPa.
    pub value: f64,
    pub dt: i64,
}
