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

//! Remote API layer.
//!
//! Wire types for the tracking and weather endpoints, their query strings,
//! and an async HTTP client. The API schema is consumed as given.

mod client;
mod query;
mod types;

pub use client::{ApiClient, ApiConfig};
pub use query::{TimeWindow, TrackQuery, WeatherField, WeatherQuery};
pub use types::{PressureSample, TrackPoint, TracksResponse, VesselInfo, VesselTrack, Wind, WindSample};

use thiserror::Error;

/// Errors that can occur while talking to the remote API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid endpoint url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: reqwest::StatusCode, url: String },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}
