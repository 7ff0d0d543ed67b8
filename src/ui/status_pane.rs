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

use chrono::{DateTime, Utc};
use track_client::{PollSnapshot, PollerPhase};

/// Display state of one poller
#[derive(Debug, Clone, PartialEq)]
pub struct FeedStatus {
    pub name: String,
    pub phase: PollerPhase,
    pub visible: bool,
    pub has_data: bool,
    pub generation: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

impl FeedStatus {
    pub fn from_snapshot<T>(name: &str, snapshot: &PollSnapshot<T>, visible: bool) -> Self {
        Self {
            name: name.to_string(),
            phase: snapshot.phase,
            visible,
            has_data: snapshot.data.is_some(),
            generation: snapshot.generation,
            last_success: snapshot.last_success,
            consecutive_failures: snapshot.consecutive_failures,
            last_error: snapshot.last_error.clone(),
        }
    }

    /// Indicator color, text and icon for the feed state
    fn indicator(&self) -> (egui::Color32, &'static str, &'static str) {
        match self.phase {
            PollerPhase::Cancelled => (egui::Color32::from_rgb(150, 150, 150), "STOPPED", "○"),
            _ if !self.visible => (egui::Color32::from_rgb(150, 150, 150), "PAUSED", "◌"),
            _ if self.consecutive_failures > 0 => (egui::Color32::from_rgb(255, 100, 100), "FAILING", "✕"),
            PollerPhase::Polling => (egui::Color32::from_rgb(255, 200, 100), "POLLING", "◐"),
            PollerPhase::Scheduled => (egui::Color32::from_rgb(255, 200, 100), "STARTING", "◐"),
            PollerPhase::Idle if self.has_data => (egui::Color32::from_rgb(100, 255, 100), "OK", "●"),
            PollerPhase::Idle => (egui::Color32::from_rgb(150, 150, 150), "WAITING", "○"),
        }
    }
}

/// Floating pane listing the state of every poller
#[derive(Debug)]
pub struct StatusPane {
    pub visible: bool,
    pub collapsed: bool,
}

impl StatusPane {
    pub fn new() -> Self {
        Self {
            visible: true,
            collapsed: false,
        }
    }

    /// Render the status pane as a floating window
    pub fn render(&mut self, ctx: &egui::Context, feeds: &[FeedStatus]) {
        if !self.visible {
            // Show a small button to re-open the status pane when hidden
            egui::Window::new("show_status")
                .title_bar(false)
                .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(10.0, -10.0))
                .fixed_size(egui::vec2(140.0, 35.0))
                .resizable(false)
                .frame(pane_frame(ctx, 200))
                .show(ctx, |ui| {
                    if ui.button(egui::RichText::new("📊 Show Status")
                        .color(egui::Color32::from_rgb(150, 200, 220))
                        .size(11.0))
                        .clicked() {
                        self.visible = true;
                    }
                });
            return;
        }

        egui::Window::new("Feed Status")
            .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(10.0, -10.0))
            .fixed_size(egui::vec2(260.0, if self.collapsed { 40.0 } else { 220.0 }))
            .resizable(false)
            .collapsible(false)
            .title_bar(false)
            .frame(pane_frame(ctx, 230))
            .show(ctx, |ui| {
                // Header with collapse and close buttons
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("◈ FEEDS")
                        .color(egui::Color32::from_rgb(100, 180, 220))
                        .size(12.0)
                        .strong());

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button(egui::RichText::new("✕")
                            .size(12.0)
                            .color(egui::Color32::from_rgb(200, 100, 100)))
                            .on_hover_text("Hide status pane")
                            .clicked() {
                            self.visible = false;
                        }

                        ui.add_space(4.0);

                        let collapse_icon = if self.collapsed { "▼" } else { "▲" };
                        if ui.button(egui::RichText::new(collapse_icon).size(10.0))
                            .on_hover_text(if self.collapsed { "Expand" } else { "Collapse" })
                            .clicked() {
                            self.collapsed = !self.collapsed;
                        }
                    });
                });

                if self.collapsed {
                    return;
                }

                ui.separator();

                let now = Utc::now();
                for feed in feeds {
                    Self::render_feed(ui, feed, now);
                    ui.add_space(6.0);
                }
            });
    }

    fn render_feed(ui: &mut egui::Ui, feed: &FeedStatus, now: DateTime<Utc>) {
        let (status_color, status_text, status_icon) = feed.indicator();

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(feed.name.to_uppercase())
                .color(egui::Color32::from_rgb(150, 150, 150))
                .size(10.0)
                .strong());

            ui.label(egui::RichText::new(status_icon)
                .color(status_color)
                .size(10.0));

            ui.label(egui::RichText::new(status_text)
                .color(status_color)
                .size(10.0)
                .monospace()
                .strong());
        });

        let updated = feed
            .last_success
            .map_or_else(|| "never".to_string(), |t| format!("{} ago", format_age(now, t)));
        stat_row(ui, "Updated:", &updated);

        if feed.consecutive_failures > 0 {
            stat_row(ui, "Failures:", &feed.consecutive_failures.to_string());
        }

        if let Some(ref error) = feed.last_error {
            ui.label(egui::RichText::new(error)
                .color(egui::Color32::from_rgb(255, 150, 150))
                .size(8.0)
                .monospace());
        }
    }
}

impl Default for StatusPane {
    fn default() -> Self {
        Self::new()
    }
}

fn pane_frame(ctx: &egui::Context, alpha: u8) -> egui::Frame {
    egui::Frame::window(&ctx.style())
        .fill(egui::Color32::from_rgba_unmultiplied(25, 30, 35, alpha))
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(60, 80, 100)))
        .corner_radius(6.0)
}

fn stat_row(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(label)
            .color(egui::Color32::from_rgb(130, 130, 130))
            .size(9.0));
        ui.label(egui::RichText::new(value)
            .color(egui::Color32::from_rgb(200, 200, 200))
            .size(9.0)
            .monospace());
    });
}

/// Compact age of `then` relative to `now`, clamped at zero
pub fn format_age(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let seconds = u64::try_from((now - then).num_seconds()).unwrap_or(0);
    format_duration(seconds)
}

fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
