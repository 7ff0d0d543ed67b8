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

use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;
use track_client::{
    ApiClient, ApiConfig, ClientError, FailurePolicy, PollSource, Poller, PollerConfig,
    TimeWindow, TrackParams, TrackQuery, TrackSource, WeatherField, WeatherParams, WeatherQuery,
    WeatherSeries, WeatherSource,
};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&ApiConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        ..Default::default()
    })
    .unwrap()
}

fn tracks_body() -> serde_json::Value {
    json!({
        "tracks": [
            {
                "mmsi": 257123450,
                "name": "NORDKAPP",
                "info": { "name": "Nordkapp", "color": "#ff8800" },
                "track": [
                    { "dt": 1000, "lat": 69.10, "lon": 18.20, "cog": 90.0, "sog": 8.0 },
                    { "dt": 1120, "lat": 69.11, "lon": 18.22, "cog": 91.0, "sog": 8.2 },
                    { "dt": 9000, "lat": 69.50, "lon": 18.90, "cog": 95.0, "sog": 7.9 }
                ]
            },
            {
                "mmsi": 258000111,
                "name": "SENJA",
                "info": null,
                "track": []
            }
        ]
    })
}

#[tokio::test]
async fn test_tracks_sends_filter_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .and(query_param("from", "1000"))
        .and(query_param("sog", "0.5"))
        .and(query_param("mins", "5"))
        .and(query_param("org", "coastal"))
        .and(query_param_is_missing("to"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tracks_body()))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .tracks(&TrackQuery {
            from: 1000,
            sog: 0.5,
            to: None,
            mins: Some(5),
            org: Some("coastal".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(response.tracks.len(), 2);
    assert_eq!(response.tracks[0].track.len(), 3);
    assert!(response.tracks[1].info.is_none());
}

#[tokio::test]
async fn test_history_window_sends_upper_bound() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .and(query_param("from", "100"))
        .and(query_param("to", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tracks": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let params = TrackParams {
        window: TimeWindow::Range {
            from: Utc.timestamp_opt(100, 0).unwrap(),
            to: Utc.timestamp_opt(200, 0).unwrap(),
        },
        min_sog: 0.0,
        bin_minutes: None,
        org: None,
    };

    let vessels = TrackSource::new(client_for(&server)).fetch(&params).await.unwrap();
    assert!(vessels.is_empty());
}

#[tokio::test]
async fn test_track_source_segments_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tracks_body()))
        .mount(&server)
        .await;

    let params = TrackParams {
        window: TimeWindow::Live { lookback: Duration::from_secs(3600) },
        min_sog: 0.0,
        bin_minutes: Some(1),
        org: None,
    };

    let vessels = TrackSource::new(client_for(&server)).fetch(&params).await.unwrap();
    assert_eq!(vessels.len(), 2);

    let nordkapp = &vessels[0];
    assert_eq!(nordkapp.name, "Nordkapp");
    assert_eq!(nordkapp.head().map(|p| p.dt), Some(9000));
    // 9000 is isolated; 1120 and 1000 are 120s apart
    assert_eq!(nordkapp.segments.len(), 1);
    let dts: Vec<i64> = nordkapp.segments[0].points().iter().map(|p| p.dt).collect();
    assert_eq!(dts, vec![1120, 1000]);

    assert_eq!(vessels[1].name, "SENJA");
    assert!(vessels[1].segments.is_empty());
}

#[tokio::test]
async fn test_error_status_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .tracks(&TrackQuery { from: 0, sog: 0.0, to: None, mins: None, org: None })
        .await;

    match result {
        Err(ClientError::Status { status, url }) => {
            assert_eq!(status.as_u16(), 503);
            assert!(url.contains("/api/tracks"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .tracks(&TrackQuery { from: 0, sog: 0.0, to: None, mins: None, org: None })
        .await;

    assert!(matches!(result, Err(ClientError::Decode(_))));
}

#[tokio::test]
async fn test_weather_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/weather"))
        .and(query_param("field", "wind"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "value": { "knots": 11.0, "direction": 250.0 }, "dt": 100 },
            { "value": { "knots": 14.0, "direction": 260.0 }, "dt": 200 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/weather"))
        .and(query_param("field", "pressure"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "value": 1009.5, "dt": 100 }
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = WeatherQuery { field: WeatherField::Pressure, limit: 10, from: 0, to: Some(300) };

    // The field argument decides the endpoint field regardless of the query
    let wind = client.wind(&query).await.unwrap();
    assert_eq!(wind.len(), 2);
    assert_eq!(wind[1].value.direction, 260.0);

    let pressure = client.pressure(&query).await.unwrap();
    assert_eq!(pressure[0].value, 1009.5);

    let params = WeatherParams {
        window: TimeWindow::Live { lookback: Duration::from_secs(3600) },
        limit: 10,
    };
    let series = WeatherSource::new(client, WeatherField::Wind).fetch(&params).await.unwrap();
    assert!(matches!(series, WeatherSeries::Wind(ref s) if s.len() == 2));
}

#[tokio::test]
async fn test_poller_publishes_segmented_tracks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tracks_body()))
        .mount(&server)
        .await;

    let mut poller = Poller::new(
        "tracks",
        TrackSource::new(client_for(&server)),
        TrackParams {
            window: TimeWindow::Live { lookback: Duration::from_secs(3600) },
            min_sog: 0.0,
            bin_minutes: Some(1),
            org: None,
        },
        PollerConfig {
            interval: Duration::from_secs(60),
            soft_start: Duration::ZERO,
            failure_policy: FailurePolicy::ClearAfter(3),
            visible: true,
        },
    );
    poller.start();

    let mut vessels = None;
    for _ in 0..100 {
        vessels = poller.data();
        if vessels.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    poller.stop();

    let vessels = vessels.expect("poller never published data");
    assert_eq!(vessels.len(), 2);
    assert_eq!(vessels[0].segments.len(), 1);
}
