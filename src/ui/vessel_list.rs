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

//! Side panel listing the tracked vessels.

use chrono::{DateTime, Utc};
use track_client::{Rgb, Vessel};

use crate::map::color32;

/// Reports younger than this are shown as active
const ACTIVE_SECONDS: i64 = 10 * 60;

/// Reports younger than this are shown as recent
const RECENT_SECONDS: i64 = 60 * 60;

/// How fresh a vessel's latest report is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Active,
    Recent,
    Stale,
}

impl Freshness {
    pub fn from_age(seconds: i64) -> Self {
        if seconds < ACTIVE_SECONDS {
            Self::Active
        } else if seconds < RECENT_SECONDS {
            Self::Recent
        } else {
            Self::Stale
        }
    }

    fn indicator(self) -> (egui::Color32, &'static str) {
        match self {
            Self::Active => (egui::Color32::from_rgb(100, 255, 100), "●"),
            Self::Recent => (egui::Color32::from_rgb(255, 200, 50), "●"),
            Self::Stale => (egui::Color32::from_rgb(150, 150, 150), "○"),
        }
    }
}

/// Age of a report in seconds; saturates on out-of-range timestamps
fn seconds_since(now: DateTime<Utc>, dt: i64) -> i64 {
    now.timestamp().saturating_sub(dt)
}

/// Vessels matching `filter` (name or MMSI, case-insensitive), most recently
/// seen first
pub fn visible_vessels<'a>(vessels: &'a [Vessel], filter: &str) -> Vec<&'a Vessel> {
    let needle = filter.trim().to_lowercase();
    let mut list: Vec<&Vessel> = vessels
        .iter()
        .filter(|v| {
            needle.is_empty()
                || v.name.to_lowercase().contains(&needle)
                || v.mmsi.to_string().contains(&needle)
        })
        .collect();

    list.sort_by(|a, b| {
        let a_dt = a.head().map_or(i64::MIN, |p| p.dt);
        let b_dt = b.head().map_or(i64::MIN, |p| p.dt);
        b_dt.cmp(&a_dt).then_with(|| a.name.cmp(&b.name))
    });
    list
}

/// What the user did in the list this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    /// Select the vessel and center the map on it
    Focus(u32),
}

#[derive(Debug, Default)]
pub struct VesselList {
    pub filter: String,
}

impl VesselList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &mut self,
        ui: &mut egui::Ui,
        vessels: &[Vessel],
        selected: Option<u32>,
        now: DateTime<Utc>,
    ) -> Option<ListAction> {
        let mut action = None;
        let list = visible_vessels(vessels, &self.filter);

        // Header
        ui.vertical(|ui| {
            ui.label(egui::RichText::new("◈ VESSELS")
                .color(egui::Color32::from_rgb(100, 200, 100))
                .size(14.0)
                .strong());

            ui.label(egui::RichText::new(format!("SHOWN: {} / {}", list.len(), vessels.len()))
                .color(egui::Color32::from_rgb(150, 150, 150))
                .size(10.0)
                .monospace());
        });

        ui.add_space(4.0);
        ui.add(egui::TextEdit::singleline(&mut self.filter).hint_text("Filter by name or MMSI"));
        ui.add_space(4.0);

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.push_id("vessel_list", |ui| {
                for vessel in list {
                    if Self::render_row(ui, vessel, selected == Some(vessel.mmsi), now) {
                        action = Some(ListAction::Focus(vessel.mmsi));
                    }
                    ui.add_space(3.0);
                }
            });
        });

        action
    }

    /// Draw one vessel row; returns true when clicked
    fn render_row(ui: &mut egui::Ui, vessel: &Vessel, is_selected: bool, now: DateTime<Utc>) -> bool {
        let head = vessel.head();
        let seconds_ago = head.map_or(i64::MAX, |p| seconds_since(now, p.dt));
        let (status_color, status_symbol) = Freshness::from_age(seconds_ago).indicator();

        // Create a frame with background color if selected
        let frame = if is_selected {
            egui::Frame::group(ui.style())
                .fill(egui::Color32::from_rgba_unmultiplied(100, 140, 180, 220))
        } else {
            egui::Frame::group(ui.style())
        };

        let response = frame.show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(status_symbol)
                    .color(status_color)
                    .size(12.0));

                ui.label(egui::RichText::new("■")
                    .color(color32(Rgb::for_vessel(vessel)))
                    .size(11.0));

                ui.label(egui::RichText::new(&vessel.name)
                    .color(egui::Color32::from_rgb(200, 220, 255))
                    .size(11.0)
                    .strong());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(vessel.mmsi.to_string())
                        .color(egui::Color32::from_rgb(150, 150, 150))
                        .size(9.0)
                        .monospace());
                });
            });

            if let Some(point) = head {
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing.x = 8.0;

                    if let Some(sog) = point.sog {
                        ui.label(egui::RichText::new(format!("SOG {sog:4.1}"))
                            .color(egui::Color32::from_rgb(180, 180, 180))
                            .size(9.0)
                            .monospace());
                    }

                    if let Some(cog) = point.cog {
                        ui.label(egui::RichText::new(format!("COG {cog:03.0}°"))
                            .color(egui::Color32::from_rgb(180, 180, 180))
                            .size(9.0)
                            .monospace());
                    }

                    ui.label(egui::RichText::new(format!("{:>7.3}° {:>8.3}°", point.lat, point.lon))
                        .color(egui::Color32::from_rgb(120, 120, 120))
                        .size(8.5)
                        .monospace());
                });
            }

            ui.label(egui::RichText::new(format!(
                "{} pts · {} segs",
                vessel.positions.len(),
                vessel.segments.len()
            ))
            .color(egui::Color32::from_rgb(100, 100, 100))
            .size(8.0)
            .monospace());
        });

        response.response.interact(egui::Sense::click()).clicked()
    }
}
