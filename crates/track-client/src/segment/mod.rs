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

//! Track segmentation.
//!
//! Splits a vessel's position history into contiguous polylines wherever the
//! time gap between consecutive reports exceeds a threshold derived from the
//! API bin size. Runs of a single point are not lines and are dropped here;
//! the render layer still draws them as individual position markers.

use crate::api::{TrackPoint, TracksResponse, VesselInfo, VesselTrack};

/// Bin size assumed when the request did not specify one.
pub const DEFAULT_BIN_MINUTES: u32 = 5;

/// Number of bins that may be missing before a track is split.
const GAP_BINS: u64 = 3;

/// Largest gap in seconds allowed between consecutive points of a segment.
#[must_use]
pub fn gap_threshold(bin_minutes: u32) -> u64 {
    GAP_BINS * u64::from(bin_minutes) * 60
}

/// A contiguous run of position reports with no gap above the threshold.
///
/// Always holds more than one point.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    points: Vec<TrackPoint>,
}

impl Segment {
    #[must_use]
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(lat, lon)` pairs in segment order.
    pub fn coordinates(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().map(|p| (p.lat, p.lon))
    }
}

/// Split `points` into segments, keeping their given order.
///
/// A new segment starts whenever `|dt - previous dt|` exceeds `max_gap_secs`.
/// Segments with a single point are discarded.
#[must_use]
pub fn segment_track(points: &[TrackPoint], max_gap_secs: u64) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut open: Vec<TrackPoint> = Vec::new();
    let mut last_dt: Option<i64> = None;

    for point in points {
        let starts_new = last_dt.map_or(true, |dt| point.dt.abs_diff(dt) > max_gap_secs);
        if starts_new {
            close_segment(&mut segments, std::mem::take(&mut open));
        }
        open.push(*point);
        last_dt = Some(point.dt);
    }
    close_segment(&mut segments, open);

    segments
}

fn close_segment(segments: &mut Vec<Segment>, points: Vec<TrackPoint>) {
    if points.len() > 1 {
        segments.push(Segment { points });
    }
}

fn display_name(name: Option<&str>) -> Option<String> {
    name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string)
}

/// A vessel with its positions sorted newest first and segmented for display.
#[derive(Debug, Clone)]
pub struct Vessel {
    pub mmsi: u32,
    /// Fleet name if known, else the AIS name, else the MMSI.
    pub name: String,
    pub info: VesselInfo,
    /// Position reports, most recent first.
    pub positions: Vec<TrackPoint>,
    pub segments: Vec<Segment>,
}

impl Vessel {
    #[must_use]
    pub fn from_track(track: VesselTrack, bin_minutes: u32) -> Self {
        let VesselTrack { mmsi, name, info, track: mut positions } = track;
        let info = info.unwrap_or_default();

        positions.sort_by(|a, b| b.dt.cmp(&a.dt));
        let segments = segment_track(&positions, gap_threshold(bin_minutes));

        let name = display_name(info.name.as_deref())
            .or_else(|| display_name(name.as_deref()))
            .unwrap_or_else(|| mmsi.to_string());

        Self { mmsi, name, info, positions, segments }
    }

    /// Most recent position report.
    #[must_use]
    pub fn head(&self) -> Option<&TrackPoint> {
        self.positions.first()
    }

    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.info.color.as_deref()
    }
}

/// Build the full vessel set from a tracking response.
#[must_use]
pub fn build_vessels(response: TracksResponse, bin_minutes: u32) -> Vec<Vessel> {
    response
        .tracks
        .into_iter()
        .map(|track| Vessel::from_track(track, bin_minutes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(dt: i64) -> TrackPoint {
        TrackPoint {
            dt,
            lat: 60.0 + dt as f64 * 1e-4,
            lon: 5.0 - dt as f64 * 1e-4,
            cog: None,
            sog: None,
        }
    }

    fn points(dts: &[i64]) -> Vec<TrackPoint> {
        dts.iter().copied().map(point).collect()
    }

    fn segment_dts(segments: &[Segment]) -> Vec<Vec<i64>> {
        segments.iter().map(|s| s.points().iter().map(|p| p.dt).collect()).collect()
    }

    /// Input minus single-point runs, computed independently of `segment_track`.
    fn expected_survivors(input: &[TrackPoint], threshold: u64) -> Vec<i64> {
        let mut runs: Vec<Vec<i64>> = Vec::new();
        for (i, p) in input.iter().enumerate() {
            if i == 0 || p.dt.abs_diff(input[i - 1].dt) > threshold {
                runs.push(Vec::new());
            }
            if let Some(run) = runs.last_mut() {
                run.push(p.dt);
            }
        }
        runs.into_iter().filter(|r| r.len() > 1).flatten().collect()
    }

    fn check_invariants(input: &[TrackPoint], threshold: u64) {
        let segments = segment_track(input, threshold);

        for segment in &segments {
            assert!(segment.len() > 1, "segment with {} points", segment.len());
            for pair in segment.points().windows(2) {
                assert!(pair[0].dt.abs_diff(pair[1].dt) <= threshold);
            }
        }

        let flattened: Vec<i64> = segments.iter().flat_map(|s| s.points().iter().map(|p| p.dt)).collect();
        assert_eq!(flattened, expected_survivors(input, threshold));

        // Each segment is a contiguous slice of the input bounded by oversized gaps
        let mut cursor = 0;
        for segment in &segments {
            let first = &segment.points()[0];
            let start = cursor + input[cursor..].iter().position(|p| p == first).unwrap();
            let end = start + segment.len() - 1;
            assert_eq!(&input[start..=end], segment.points());
            if start > 0 {
                assert!(input[start].dt.abs_diff(input[start - 1].dt) > threshold);
            }
            if end + 1 < input.len() {
                assert!(input[end + 1].dt.abs_diff(input[end].dt) > threshold);
            }
            cursor = end + 1;
        }
    }

    #[test]
    fn test_gap_threshold_is_three_bins() {
        assert_eq!(gap_threshold(1), 180);
        assert_eq!(gap_threshold(5), 900);
        assert_eq!(gap_threshold(0), 0);
    }

    #[test]
    fn test_trailing_single_point_dropped() {
        let segments = segment_track(&points(&[100, 190, 5000]), 180);
        assert_eq!(segment_dts(&segments), vec![vec![100, 190]]);
    }

    #[test]
    fn test_descending_track_splits_on_gap() {
        let input = points(&[10_000, 9_900, 9_800, 5_000, 4_950, 1_000]);
        let segments = segment_track(&input, 180);
        assert_eq!(segment_dts(&segments), vec![vec![10_000, 9_900, 9_800], vec![5_000, 4_950]]);
    }

    #[test]
    fn test_gap_equal_to_threshold_stays_joined() {
        let segments = segment_track(&points(&[0, 180, 360]), 180);
        assert_eq!(segment_dts(&segments), vec![vec![0, 180, 360]]);
    }

    #[test]
    fn test_first_point_near_epoch_still_segments() {
        // A leading timestamp close to zero must not be treated specially.
        let segments = segment_track(&points(&[5, 60, 5000, 5100]), 180);
        assert_eq!(segment_dts(&segments), vec![vec![5, 60], vec![5000, 5100]]);
    }

    #[test]
    fn test_empty_and_single_inputs() {
        assert!(segment_track(&[], 180).is_empty());
        assert!(segment_track(&points(&[42]), 180).is_empty());
    }

    #[test]
    fn test_all_isolated_points_dropped() {
        assert!(segment_track(&points(&[10_000, 8_000, 6_000, 4_000]), 180).is_empty());
    }

    #[test]
    fn test_segment_invariants_hold_for_varied_tracks() {
        let tracks: Vec<Vec<i64>> = vec![
            vec![100, 190, 5000],
            vec![9000, 8900, 8000, 7990, 7980, 100, 50],
            vec![1, 2, 3, 1000, 2000, 2001, 2002, 9000],
            vec![5000, 4000, 3990, 3000, 2000, 1990, 1980, 1970, 0],
            vec![0, 0, 0, 500, 500],
        ];
        for dts in tracks {
            check_invariants(&points(&dts), 180);
        }

        // Pseudo-random descending tracks with mixed gaps
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        for _ in 0..25 {
            let mut dt: i64 = 1_700_000_000;
            let mut dts = Vec::new();
            for _ in 0..40 {
                seed ^= seed << 13;
                seed ^= seed >> 7;
                seed ^= seed << 17;
                dt -= i64::try_from(seed % 400).unwrap();
                dts.push(dt);
            }
            check_invariants(&points(&dts), 180);
        }
    }

    #[test]
    fn test_coordinates_follow_point_order() {
        let segments = segment_track(&points(&[200, 100]), 180);
        let coords: Vec<(f64, f64)> = segments[0].coordinates().collect();
        assert_eq!(coords, vec![(point(200).lat, point(200).lon), (point(100).lat, point(100).lon)]);
    }

    #[test]
    fn test_vessel_sorts_newest_first() {
        let vessel = Vessel::from_track(
            VesselTrack {
                mmsi: 257_000_001,
                name: Some("SKARVEN ".to_string()),
                info: None,
                track: points(&[100, 300, 200, 9000]),
            },
            1,
        );

        let dts: Vec<i64> = vessel.positions.iter().map(|p| p.dt).collect();
        assert_eq!(dts, vec![9000, 300, 200, 100]);
        assert_eq!(vessel.head().map(|p| p.dt), Some(9000));
        assert_eq!(segment_dts(&vessel.segments), vec![vec![300, 200, 100]]);
        assert_eq!(vessel.name, "SKARVEN");
    }

    #[test]
    fn test_vessel_name_prefers_fleet_info() {
        let vessel = Vessel::from_track(
            VesselTrack {
                mmsi: 42,
                name: Some("AIS NAME".to_string()),
                info: Some(VesselInfo { name: Some("Fleet Name".to_string()), color: Some("#00ff00".to_string()) }),
                track: Vec::new(),
            },
            DEFAULT_BIN_MINUTES,
        );
        assert_eq!(vessel.name, "Fleet Name");
        assert_eq!(vessel.color(), Some("#00ff00"));
        assert!(vessel.head().is_none());
    }

    #[test]
    fn test_vessel_name_falls_back_to_mmsi() {
        let vessel = Vessel::from_track(
            VesselTrack { mmsi: 42, name: Some("  ".to_string()), info: None, track: Vec::new() },
            DEFAULT_BIN_MINUTES,
        );
        assert_eq!(vessel.name, "42");
    }

    #[test]
    fn test_blank_fleet_name_falls_back_to_ais_name() {
        let vessel = Vessel::from_track(
            VesselTrack {
                mmsi: 42,
                name: Some(" TRONDER ".to_string()),
                info: Some(VesselInfo { name: Some("   ".to_string()), color: None }),
                track: Vec::new(),
            },
            DEFAULT_BIN_MINUTES,
        );
        assert_eq!(vessel.name, "TRONDER");
    }

    #[test]
    fn test_build_vessels_keeps_response_order() {
        let response = TracksResponse {
            tracks: vec![
                VesselTrack { mmsi: 2, name: None, info: None, track: Vec::new() },
                VesselTrack { mmsi: 1, name: None, info: None, track: Vec::new() },
            ],
        };
        let mmsis: Vec<u32> = build_vessels(response, 5).iter().map(|v| v.mmsi).collect();
        assert_eq!(mmsis, vec![2, 1]);
    }
}
