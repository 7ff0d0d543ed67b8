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

//! Map primitives for segmented vessel tracks.
//!
//! Converts [`Vessel`]s into renderer-neutral shapes: one polyline per
//! segment, a circle marker per position report, and a head marker at each
//! vessel's latest position carrying its tooltip and popup text. The map
//! widget only has to project and paint these.

use crate::segment::Vessel;

/// Fallback colors for vessels without a fleet color (Tableau 10).
const PALETTE: [Rgb; 10] = [
    Rgb(31, 119, 180),
    Rgb(255, 127, 14),
    Rgb(44, 160, 44),
    Rgb(214, 39, 40),
    Rgb(148, 103, 189),
    Rgb(140, 86, 75),
    Rgb(227, 119, 194),
    Rgb(127, 127, 127),
    Rgb(188, 189, 34),
    Rgb(23, 190, 207),
];

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb` or `#rgb` (leading `#` optional).
    #[must_use]
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            6 => Some(Self(
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            )),
            3 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
                Some(Self(channel(0)?, channel(1)?, channel(2)?))
            }
            _ => None,
        }
    }

    /// Stable palette color for a vessel.
    #[must_use]
    pub fn for_mmsi(mmsi: u32) -> Self {
        PALETTE[mmsi as usize % PALETTE.len()]
    }

    /// Fleet color if it parses, otherwise the MMSI palette color.
    #[must_use]
    pub fn for_vessel(vessel: &Vessel) -> Self {
        vessel
            .color()
            .and_then(Self::parse_hex)
            .unwrap_or_else(|| Self::for_mmsi(vessel.mmsi))
    }
}

/// Styling knobs for [`TrackLayer::build`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Draw a small circle for every position report.
    pub show_positions: bool,
    pub line_width: f32,
    pub position_radius: f32,
    pub head_radius: f32,
    /// Vessel drawn emphasized.
    pub selected: Option<u32>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_positions: true,
            line_width: 2.0,
            position_radius: 2.5,
            head_radius: 6.0,
            selected: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub mmsi: u32,
    pub color: Rgb,
    pub width: f32,
    /// `(lat, lon)` pairs.
    pub coords: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleMarker {
    pub mmsi: u32,
    pub lat: f64,
    pub lon: f64,
    pub radius: f32,
    pub color: Rgb,
}

/// One labelled row of a head marker popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupField {
    pub label: &'static str,
    pub value: String,
}

/// Marker at a vessel's most recent position.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadMarker {
    pub mmsi: u32,
    pub lat: f64,
    pub lon: f64,
    /// Course over ground, used to draw a heading tick.
    pub cog: Option<f64>,
    pub radius: f32,
    pub color: Rgb,
    pub selected: bool,
    /// Short hover text.
    pub tooltip: String,
    /// Detail rows shown when the marker is clicked.
    pub popup: Vec<PopupField>,
}

/// Geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    fn from_point(lat: f64, lon: f64) -> Self {
        Self { min_lat: lat, max_lat: lat, min_lon: lon, max_lon: lon }
    }

    fn extend(&mut self, lat: f64, lon: f64) {
        self.min_lat = self.min_lat.min(lat);
        self.max_lat = self.max_lat.max(lat);
        self.min_lon = self.min_lon.min(lon);
        self.max_lon = self.max_lon.max(lon);
    }

    /// `(lat, lon)` of the box center.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        ((self.min_lat + self.max_lat) / 2.0, (self.min_lon + self.max_lon) / 2.0)
    }
}

/// Everything the map overlay draws for one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackLayer {
    pub lines: Vec<Polyline>,
    pub positions: Vec<CircleMarker>,
    pub heads: Vec<HeadMarker>,
}

impl TrackLayer {
    #[must_use]
    pub fn build(vessels: &[Vessel], options: &RenderOptions) -> Self {
        let mut layer = Self::default();

        for vessel in vessels {
            let color = Rgb::for_vessel(vessel);
            let selected = options.selected == Some(vessel.mmsi);
            let width = if selected { options.line_width * 2.0 } else { options.line_width };

            layer.lines.extend(vessel.segments.iter().map(|segment| Polyline {
                mmsi: vessel.mmsi,
                color,
                width,
                coords: segment.coordinates().collect(),
            }));

            if options.show_positions {
                layer.positions.extend(vessel.positions.iter().map(|p| CircleMarker {
                    mmsi: vessel.mmsi,
                    lat: p.lat,
                    lon: p.lon,
                    radius: options.position_radius,
                    color,
                }));
            }

            if let Some(head) = vessel.head() {
                layer.heads.push(HeadMarker {
                    mmsi: vessel.mmsi,
                    lat: head.lat,
                    lon: head.lon,
                    cog: head.cog,
                    radius: options.head_radius,
                    color,
                    selected,
                    tooltip: vessel.name.clone(),
                    popup: popup_fields(vessel),
                });
            }
        }

        layer
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.positions.is_empty() && self.heads.is_empty()
    }

    /// Bounding box of every head marker and line vertex.
    #[must_use]
    pub fn bounds(&self) -> Option<GeoBounds> {
        let points = self
            .heads
            .iter()
            .map(|h| (h.lat, h.lon))
            .chain(self.lines.iter().flat_map(|l| l.coords.iter().copied()));

        let mut bounds: Option<GeoBounds> = None;
        for (lat, lon) in points {
            match bounds.as_mut() {
                Some(b) => b.extend(lat, lon),
                None => bounds = Some(GeoBounds::from_point(lat, lon)),
            }
        }
        bounds
    }
}

fn popup_fields(vessel: &Vessel) -> Vec<PopupField> {
    let mut fields = vec![
        PopupField { label: "Name", value: vessel.name.clone() },
        PopupField { label: "MMSI", value: vessel.mmsi.to_string() },
    ];

    if let Some(head) = vessel.head() {
        if let Some(sog) = head.sog {
            fields.push(PopupField { label: "Speed", value: format!("{sog:.1} kn") });
        }
        if let Some(cog) = head.cog {
            fields.push(PopupField { label: "Course", value: format!("{:03.0}°", cog.rem_euclid(360.0)) });
        }
        if let Some(ts) = head.timestamp() {
            fields.push(PopupField {
                label: "Last seen",
                value: ts.format("%Y-%m-%d %H:%M UTC").to_string(),
            });
        }
    }

    fields.push(PopupField { label: "Positions", value: vessel.positions.len().to_string() });
    fields
}
