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

//! HTTP client for the tracking and weather endpoints.

use std::time::Duration;

use log::debug;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{
    ClientError, PressureSample, TrackQuery, TracksResponse, WeatherField, WeatherQuery,
    WindSample,
};

/// Endpoint configuration for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the API, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Path of the tracking endpoint, resolved against `base_url`.
    pub tracks_path: String,
    /// Path of the weather endpoint, resolved against `base_url`.
    pub weather_path: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            tracks_path: "/api/tracks".to_string(),
            weather_path: "/api/weather".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

/// Typed client for the remote API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    tracks_url: Url,
    weather_url: Url,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let base = parse_url(&config.base_url)?;
        let tracks_url = join_url(&base, &config.tracks_path)?;
        let weather_url = join_url(&base, &config.weather_path)?;

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self { http, tracks_url, weather_url })
    }

    #[must_use]
    pub fn tracks_url(&self) -> &Url {
        &self.tracks_url
    }

    #[must_use]
    pub fn weather_url(&self) -> &Url {
        &self.weather_url
    }

    /// Fetch vessel tracks.
    pub async fn tracks(&self, query: &TrackQuery) -> Result<TracksResponse, ClientError> {
        self.get_json(&self.tracks_url, query).await
    }

    /// Fetch wind samples. `query.field` is forced to `wind`.
    pub async fn wind(&self, query: &WeatherQuery) -> Result<Vec<WindSample>, ClientError> {
        let query = WeatherQuery { field: WeatherField::Wind, ..query.clone() };
        self.get_json(&self.weather_url, &query).await
    }

    /// Fetch pressure samples. `query.field` is forced to `pressure`.
    pub async fn pressure(&self, query: &WeatherQuery) -> Result<Vec<PressureSample>, ClientError> {
        let query = WeatherQuery { field: WeatherField::Pressure, ..query.clone() };
        self.get_json(&self.weather_url, &query).await
    }

    async fn get_json<Q, T>(&self, url: &Url, query: &Q) -> Result<T, ClientError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.http.get(url.clone()).query(query).send().await?;
        let status = response.status();
        debug!("GET {} -> {}", response.url(), status);

        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                url: response.url().to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn parse_url(url: &str) -> Result<Url, ClientError> {
    Url::parse(url).map_err(|e| ClientError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn join_url(base: &Url, path: &str) -> Result<Url, ClientError> {
    base.join(path).map_err(|e| ClientError::InvalidUrl {
        url: format!("{base}{path}"),
        reason: e.to_string(),
    })
}
