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

//! Client library for vessel tracking and weather feeds.
//!
//! This library polls a remote HTTP API for vessel position snapshots and
//! weather samples and turns them into data a map dashboard can draw. It is
//! split into layers that can be used on their own:
//!
//! - **API layer**: wire types, query strings and an async HTTP client
//! - **Segment layer**: sorts position histories and splits them into
//!   polylines at time gaps
//! - **Poller layer**: fixed-interval polling with soft start, request
//!   cancellation, failure policy and a visibility switch
//! - **Render layer**: renderer-neutral map primitives (lines, markers,
//!   tooltips and popups)
//! - **Weather layer**: wind and pressure chart series
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use track_client::{
//!     ApiClient, ApiConfig, FailurePolicy, Poller, PollerConfig, TimeWindow, TrackParams,
//!     TrackSource,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), track_client::ClientError> {
//!     let client = ApiClient::new(&ApiConfig {
//!         base_url: "http://localhost:8080".to_string(),
//!         ..Default::default()
//!     })?;
//!
//!     let mut poller = Poller::new(
//!         "tracks",
//!         TrackSource::new(client),
//!         TrackParams {
//!             window: TimeWindow::Live { lookback: Duration::from_secs(6 * 3600) },
//!             min_sog: 0.5,
//!             bin_minutes: Some(5),
//!             org: None,
//!         },
//!         PollerConfig {
//!             failure_policy: FailurePolicy::ClearAfter(3),
//!             ..Default::default()
//!         },
//!     );
//!     poller.start();
//!
//!     loop {
//!         if let Some(vessels) = poller.data() {
//!             for vessel in vessels.iter() {
//!                 println!("{}: {} segments", vessel.name, vessel.segments.len());
//!             }
//!         }
//!         tokio::time::sleep(Duration::from_secs(5)).await;
//!     }
//! }
//! ```
//!
//! # Segmenting Without Polling
//!
//! ```
//! use track_client::segment::{gap_threshold, segment_track};
//! use track_client::TrackPoint;
//!
//! let points: Vec<TrackPoint> = [100, 190, 5000]
//!     .into_iter()
//!     .map(|dt| TrackPoint { dt, lat: 60.0, lon: 5.0, cog: None, sog: None })
//!     .collect();
//!
//! let segments = segment_track(&points, gap_threshold(1));
//! assert_eq!(segments.len(), 1);
//! assert_eq!(segments[0].len(), 2);
//! ```

pub mod api;
pub mod poller;
pub mod render;
pub mod segment;
pub mod source;
pub mod weather;

pub use api::{
    ApiClient, ApiConfig, ClientError, PressureSample, TimeWindow, TrackPoint, TrackQuery,
    TracksResponse, VesselInfo, VesselTrack, WeatherField, WeatherQuery, Wind, WindSample,
};
pub use poller::{FailurePolicy, PollSnapshot, PollSource, Poller, PollerConfig, PollerPhase};
pub use render::{CircleMarker, GeoBounds, HeadMarker, Polyline, PopupField, RenderOptions, Rgb, TrackLayer};
pub use segment::{Segment, Vessel};
pub use source::{TrackParams, TrackSource, WeatherParams, WeatherSource};
pub use weather::{ChartSeries, WeatherSeries};
