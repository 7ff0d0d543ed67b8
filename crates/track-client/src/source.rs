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

//! [`PollSource`] implementations backed by [`ApiClient`].

use chrono::{DateTime, Utc};
use log::debug;

use crate::api::{ApiClient, ClientError, TimeWindow, TrackQuery, WeatherField, WeatherQuery};
use crate::poller::PollSource;
use crate::segment::{build_vessels, Vessel, DEFAULT_BIN_MINUTES};
use crate::weather::WeatherSeries;

/// Filter for the tracking endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackParams {
    pub window: TimeWindow,
    /// Minimum speed over ground in knots.
    pub min_sog: f64,
    /// Bin size sent as `mins`; also sets the segment gap threshold.
    pub bin_minutes: Option<u32>,
    /// Fleet filter sent as `org`.
    pub org: Option<String>,
}

impl TrackParams {
    #[must_use]
    pub fn to_query(&self, now: DateTime<Utc>) -> TrackQuery {
        let (from, to) = self.window.resolve(now);
        TrackQuery {
            from,
            sog: self.min_sog,
            to,
            mins: self.bin_minutes,
            org: self.org.clone().filter(|org| !org.is_empty()),
        }
    }

    /// Bin size used for segmentation.
    #[must_use]
    pub fn effective_bin_minutes(&self) -> u32 {
        self.bin_minutes.unwrap_or(DEFAULT_BIN_MINUTES)
    }
}

/// Fetches vessel tracks and segments them.
#[derive(Debug, Clone)]
pub struct TrackSource {
    client: ApiClient,
}

impl TrackSource {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl PollSource for TrackSource {
    type Params = TrackParams;
    type Output = Vec<Vessel>;

    async fn fetch(&self, params: &TrackParams) -> Result<Vec<Vessel>, ClientError> {
        let query = params.to_query(Utc::now());
        let response = self.client.tracks(&query).await?;
        let vessels = build_vessels(response, params.effective_bin_minutes());
        debug!("Received {} vessel tracks", vessels.len());
        Ok(vessels)
    }
}

/// Parameters for a weather chart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherParams {
    pub window: TimeWindow,
    /// Maximum number of samples.
    pub limit: u32,
}

impl WeatherParams {
    #[must_use]
    pub fn to_query(&self, field: WeatherField, now: DateTime<Utc>) -> WeatherQuery {
        let (from, to) = self.window.resolve(now);
        WeatherQuery {
            field,
            limit: self.limit,
            from,
            // The weather endpoint always takes an upper bound
            to: Some(to.unwrap_or_else(|| now.timestamp())),
        }
    }
}

/// Fetches one weather field.
#[derive(Debug, Clone)]
pub struct WeatherSource {
    client: ApiClient,
    field: WeatherField,
}

impl WeatherSource {
    #[must_use]
    pub fn new(client: ApiClient, field: WeatherField) -> Self {
        Self { client, field }
    }

    #[must_use]
    pub fn field(&self) -> WeatherField {
        self.field
    }
}

impl PollSource for WeatherSource {
    type Params = WeatherParams;
    type Output = WeatherSeries;

    async fn fetch(&self, params: &WeatherParams) -> Result<WeatherSeries, ClientError> {
        let query = params.to_query(self.field, Utc::now());
        let series = match self.field {
            WeatherField::Wind => WeatherSeries::Wind(self.client.wind(&query).await?),
            WeatherField::Pressure => WeatherSeries::Pressure(self.client.pressure(&query).await?),
        };
        debug!("Received {} {} samples", series.len(), self.field);
        Ok(series)
    }
}
