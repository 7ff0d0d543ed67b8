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

//! Application configuration management.
//!
//! Configuration is persisted as TOML through `confy`. Every field carries a
//! serde default so older files keep loading as fields are added. Command
//! line flags are applied on top for a single session.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use track_client::{ApiConfig, FailurePolicy, PollerConfig, TimeWindow, TrackParams, WeatherParams};

const APP_NAME: &str = "vessel-dashboard";
const CONFIG_NAME: &str = "config";

/// Default tracking API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Base URL of the tracking API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Path of the tracking endpoint
    #[serde(default = "default_tracks_path")]
    pub tracks_path: String,

    /// Path of the weather endpoint
    #[serde(default = "default_weather_path")]
    pub weather_path: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Vessel track refresh interval in seconds
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Delay before the first request after start or a filter change, in milliseconds
    #[serde(default = "default_soft_start_ms")]
    pub soft_start_ms: u64,

    /// Consecutive failures before live tracks are cleared (0 keeps them)
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// How far back live tracks reach, in hours
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u32,

    /// Track bin size in minutes (also sets the segment gap)
    #[serde(default = "default_bin_minutes")]
    pub bin_minutes: u32,

    /// Minimum speed over ground in knots
    #[serde(default)]
    pub min_sog: f64,

    /// Fleet filter; empty shows all vessels
    #[serde(default)]
    pub org: String,

    /// Weather chart refresh interval in seconds
    #[serde(default = "default_weather_interval_secs")]
    pub weather_interval_secs: u64,

    /// How far back weather charts reach, in hours
    #[serde(default = "default_weather_lookback_hours")]
    pub weather_lookback_hours: u32,

    /// Maximum samples per weather request
    #[serde(default = "default_weather_limit")]
    pub weather_limit: u32,

    /// Initial map center latitude
    #[serde(default = "default_map_lat")]
    pub map_lat: f64,

    /// Initial map center longitude
    #[serde(default = "default_map_lon")]
    pub map_lon: f64,

    /// Initial map zoom level
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,

    /// Draw a marker for every position report
    #[serde(default)]
    pub show_positions: bool,

    /// Vessel list panel expanded state
    #[serde(default = "default_true")]
    pub vessel_list_expanded: bool,

    /// Vessel list panel width in pixels
    #[serde(default = "default_vessel_list_width")]
    pub vessel_list_width: f32,

    /// Show the wind chart
    #[serde(default = "default_true")]
    pub show_wind_chart: bool,

    /// Show the pressure chart
    #[serde(default = "default_true")]
    pub show_pressure_chart: bool,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1  // Current schema version
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_tracks_path() -> String {
    "/api/tracks".to_string()
}

fn default_weather_path() -> String {
    "/api/weather".to_string()
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_refresh_interval_secs() -> u64 {
    60
}

fn default_soft_start_ms() -> u64 {
    1000
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_lookback_hours() -> u32 {
    6
}

fn default_bin_minutes() -> u32 {
    5
}

fn default_weather_interval_secs() -> u64 {
    300
}

fn default_weather_lookback_hours() -> u32 {
    24
}

fn default_weather_limit() -> u32 {
    500
}

fn default_map_lat() -> f64 {
    59.9
}

fn default_map_lon() -> f64 {
    10.7
}

fn default_zoom() -> f64 {
    8.0
}

fn default_true() -> bool {
    true
}

fn default_vessel_list_width() -> f32 {
    320.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            api_url: default_api_url(),
            tracks_path: default_tracks_path(),
            weather_path: default_weather_path(),
            request_timeout_secs: default_request_timeout_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            soft_start_ms: default_soft_start_ms(),
            failure_threshold: default_failure_threshold(),
            lookback_hours: default_lookback_hours(),
            bin_minutes: default_bin_minutes(),
            min_sog: 0.0,
            org: String::new(),
            weather_interval_secs: default_weather_interval_secs(),
            weather_lookback_hours: default_weather_lookback_hours(),
            weather_limit: default_weather_limit(),
            map_lat: default_map_lat(),
            map_lon: default_map_lon(),
            default_zoom: default_zoom(),
            show_positions: false,
            vessel_list_expanded: true,
            vessel_list_width: default_vessel_list_width(),
            show_wind_chart: true,
            show_pressure_chart: true,
        }
    }
}

/// Per-session overrides from the command line
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionOverrides {
    pub api_url: Option<String>,
    pub org: Option<String>,
    pub min_sog: Option<f64>,
    pub bin_minutes: Option<u32>,
    /// History range; `None` means live tracking
    pub range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl AppConfig {
    /// Load configuration from disk
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Apply command line values. The history range is session-only and is
    /// returned as the track window rather than stored.
    pub fn apply_overrides(&mut self, overrides: &SessionOverrides) {
        if let Some(url) = &overrides.api_url {
            self.api_url.clone_from(url);
        }
        if let Some(org) = &overrides.org {
            self.org.clone_from(org);
        }
        if let Some(sog) = overrides.min_sog {
            self.min_sog = sog;
        }
        if let Some(bin) = overrides.bin_minutes {
            self.bin_minutes = bin;
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_url.clone(),
            tracks_path: self.tracks_path.clone(),
            weather_path: self.weather_path.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Window for track requests: the given history range or a live lookback.
    pub fn track_window(&self, range: Option<(DateTime<Utc>, DateTime<Utc>)>) -> TimeWindow {
        match range {
            Some((from, to)) => TimeWindow::Range { from, to },
            None => TimeWindow::Live { lookback: hours(self.lookback_hours) },
        }
    }

    pub fn track_params(&self, window: TimeWindow) -> TrackParams {
        TrackParams {
            window,
            min_sog: self.min_sog,
            bin_minutes: Some(self.bin_minutes),
            org: Some(self.org.clone()).filter(|org| !org.is_empty()),
        }
    }

    /// Live tracking clears stale vessels after repeated failures; history
    /// browsing keeps whatever was last loaded.
    pub fn track_poller_config(&self, window: &TimeWindow) -> PollerConfig {
        let failure_policy = if window.is_live() {
            FailurePolicy::from_threshold(self.failure_threshold)
        } else {
            FailurePolicy::Retain
        };

        PollerConfig {
            interval: Duration::from_secs(self.refresh_interval_secs.max(1)),
            soft_start: Duration::from_millis(self.soft_start_ms),
            failure_policy,
            visible: true,
        }
    }

    /// Weather charts follow the track window in history mode.
    pub fn weather_params(&self, track_window: &TimeWindow) -> WeatherParams {
        let window = match track_window {
            TimeWindow::Range { .. } => *track_window,
            TimeWindow::Live { .. } => TimeWindow::Live { lookback: hours(self.weather_lookback_hours) },
        };

        WeatherParams { window, limit: self.weather_limit }
    }

    pub fn weather_poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_secs(self.weather_interval_secs.max(1)),
            soft_start: Duration::from_millis(self.soft_start_ms),
            failure_policy: FailurePolicy::Retain,
            visible: true,
        }
    }
}

fn hours(hours: u32) -> Duration {
    Duration::from_secs(u64::from(hours) * 3600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = parse_config("");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.failure_threshold, 3);
        assert_eq!(config.tracks_path, "/api/tracks");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config: AppConfig = parse_config("api_url = \"https://ais.example.org\"\nbin_minutes = 10\n");
        assert_eq!(config.api_url, "https://ais.example.org");
        assert_eq!(config.bin_minutes, 10);
        assert_eq!(config.refresh_interval_secs, 60);
        assert!(config.show_wind_chart);
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = AppConfig::default();
        config.apply_overrides(&SessionOverrides {
            api_url: Some("http://10.0.0.2:9000".to_string()),
            org: Some("coastal".to_string()),
            min_sog: Some(1.5),
            bin_minutes: None,
            range: None,
        });

        assert_eq!(config.api_url, "http://10.0.0.2:9000");
        assert_eq!(config.org, "coastal");
        assert_eq!(config.min_sog, 1.5);
        assert_eq!(config.bin_minutes, default_bin_minutes());

        let params = config.track_params(config.track_window(None));
        assert_eq!(params.org.as_deref(), Some("coastal"));
        assert_eq!(params.bin_minutes, Some(5));
    }

    #[test]
    fn test_live_mode_clears_after_threshold() {
        let config = AppConfig::default();
        let window = config.track_window(None);
        assert!(window.is_live());
        assert_eq!(config.track_poller_config(&window).failure_policy, FailurePolicy::ClearAfter(3));

        let retain = AppConfig { failure_threshold: 0, ..AppConfig::default() };
        assert_eq!(retain.track_poller_config(&window).failure_policy, FailurePolicy::Retain);
    }

    #[test]
    fn test_history_mode_retains_and_shares_window() {
        let config = AppConfig::default();
        let from = Utc.timestamp_opt(1_000, 0).unwrap();
        let to = Utc.timestamp_opt(2_000, 0).unwrap();

        let window = config.track_window(Some((from, to)));
        assert_eq!(window, TimeWindow::Range { from, to });
        assert_eq!(config.track_poller_config(&window).failure_policy, FailurePolicy::Retain);
        assert_eq!(config.weather_params(&window).window, window);
    }

    #[test]
    fn test_empty_org_not_sent() {
        let config = AppConfig::default();
        assert_eq!(config.track_params(config.track_window(None)).org, None);
    }

    fn parse_config(source: &str) -> AppConfig {
        toml::from_str(source).unwrap()
    }
}
