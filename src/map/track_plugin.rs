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

//! Map overlay that paints a [`TrackLayer`] on top of the basemap.

use egui::{Color32, FontId, Pos2, Stroke, Vec2};
use track_client::{HeadMarker, Rgb, TrackLayer};
use walkers::{lat_lon, MapMemory, Plugin, Projector};

/// Extra pixels around a head marker that still count as a hit
const HIT_SLOP: f32 = 4.0;

/// Heading tick length relative to the head marker radius
const HEADING_TICK_SCALE: f32 = 2.5;

pub fn color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

/// Screen-space offset pointing along a course over ground (0 = north, clockwise)
pub fn heading_vector(cog_degrees: f64, length: f32) -> Vec2 {
    #[allow(clippy::cast_possible_truncation, reason = "screen offsets only need f32")]
    let angle = cog_degrees.to_radians() as f32;
    egui::vec2(angle.sin() * length, -angle.cos() * length)
}

/// Closest marker to `pointer` within its hit radius
pub fn hit_test(markers: &[(u32, Pos2, f32)], pointer: Pos2) -> Option<u32> {
    markers
        .iter()
        .map(|(mmsi, pos, radius)| (*mmsi, pos.distance(pointer), *radius))
        .filter(|(_, distance, radius)| *distance <= radius + HIT_SLOP)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(mmsi, _, _)| mmsi)
}

/// Walkers plugin drawing vessel tracks, position markers and head markers.
///
/// Hovering a head marker shows its tooltip; clicking one writes its MMSI to
/// `clicked` so the app can open the popup.
pub struct TrackOverlay<'a> {
    layer: &'a TrackLayer,
    clicked: &'a mut Option<u32>,
}

impl std::fmt::Debug for TrackOverlay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackOverlay")
            .field("lines", &self.layer.lines.len())
            .field("heads", &self.layer.heads.len())
            .finish_non_exhaustive()
    }
}

impl<'a> TrackOverlay<'a> {
    pub fn new(layer: &'a TrackLayer, clicked: &'a mut Option<u32>) -> Self {
        Self { layer, clicked }
    }
}

impl Plugin for TrackOverlay<'_> {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &MapMemory,
    ) {
        let painter = ui.painter().with_clip_rect(response.rect);
        let to_screen = |lat: f64, lon: f64| projector.project(lat_lon(lat, lon)).to_pos2();

        for line in &self.layer.lines {
            let points: Vec<Pos2> = line.coords.iter().map(|&(lat, lon)| to_screen(lat, lon)).collect();
            painter.add(egui::Shape::line(points, Stroke::new(line.width, color32(line.color))));
        }

        for marker in &self.layer.positions {
            painter.circle_filled(to_screen(marker.lat, marker.lon), marker.radius, color32(marker.color));
        }

        let mut visible: Vec<(&HeadMarker, Pos2)> = Vec::with_capacity(self.layer.heads.len());
        for head in &self.layer.heads {
            let pos = to_screen(head.lat, head.lon);
            if response.rect.expand(head.radius * HEADING_TICK_SCALE).contains(pos) {
                draw_head(&painter, head, pos);
                visible.push((head, pos));
            }
        }
        let hit_targets: Vec<(u32, Pos2, f32)> =
            visible.iter().map(|(head, pos)| (head.mmsi, *pos, head.radius)).collect();

        // Tooltip for the hovered vessel
        if let Some(hover_pos) = response.hover_pos() {
            let hovered = hit_test(&hit_targets, hover_pos)
                .and_then(|mmsi| visible.iter().find(|(head, _)| head.mmsi == mmsi));
            if let Some((head, pos)) = hovered {
                draw_label(&painter, *pos + egui::vec2(head.radius + 6.0, 0.0), &head.tooltip);
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
        }

        // Check if a head marker was clicked
        if response.clicked() {
            if let Some(click_pos) = response.interact_pointer_pos() {
                if let Some(mmsi) = hit_test(&hit_targets, click_pos) {
                    *self.clicked = Some(mmsi);
                }
            }
        }
    }
}

fn draw_head(painter: &egui::Painter, head: &HeadMarker, pos: Pos2) {
    let color = color32(head.color);

    if let Some(cog) = head.cog {
        let end_pos = pos + heading_vector(cog, head.radius * HEADING_TICK_SCALE);
        painter.line_segment([pos, end_pos], Stroke::new(2.0, color));
    }

    painter.circle_filled(pos, head.radius, color);

    let outline = if head.selected {
        Stroke::new(2.5, Color32::from_rgb(255, 50, 50)) // Bright red when selected
    } else {
        Stroke::new(1.0, Color32::from_rgba_unmultiplied(0, 0, 0, 200))
    };
    painter.circle_stroke(pos, head.radius, outline);
}

fn draw_label(painter: &egui::Painter, text_pos: Pos2, text: &str) {
    let font = FontId::proportional(11.0);

    // Create a text galley to measure the text size
    let galley = painter.layout_no_wrap(text.to_string(), font.clone(), Color32::WHITE);

    // Draw background box
    let padding = egui::vec2(3.0, 2.0);
    let box_rect = egui::Rect::from_min_size(
        text_pos - egui::vec2(padding.x, galley.size().y / 2.0 + padding.y),
        galley.size() + padding * 2.0,
    );
    painter.rect_filled(box_rect, 2.0, Color32::from_rgba_unmultiplied(0, 0, 0, 180));

    painter.text(text_pos, egui::Align2::LEFT_CENTER, text, font, Color32::WHITE);
}
