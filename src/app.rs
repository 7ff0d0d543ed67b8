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

//! Main dashboard window: owns the pollers and draws map, list and charts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use track_client::{
    ApiClient, ClientError, Poller, RenderOptions, TimeWindow, TrackLayer, TrackSource, Vessel,
    WeatherField, WeatherSource,
};
use walkers::{lat_lon, HttpTiles, MapMemory, Position};

use crate::config::AppConfig;
use crate::map::{basemap_tiles, CartoStyle, TrackOverlay};
use crate::ui::{charts, FeedStatus, ListAction, StatusPane, VesselList};

/// Zoom level used when focusing a single vessel
const FOCUS_ZOOM: f64 = 12.0;

/// Zoom in to at least `zoom`, never out
fn zoom_in_to(map_memory: &mut MapMemory, zoom: f64) {
    if map_memory.zoom() < zoom && map_memory.set_zoom(zoom).is_err() {
        warn!("Ignoring invalid zoom level {zoom}");
    }
}

/// Track filter values being edited in the toolbar
#[derive(Debug, Clone, PartialEq)]
struct FilterEdit {
    min_sog: f64,
    bin_minutes: u32,
    org: String,
}

impl FilterEdit {
    fn from_config(config: &AppConfig) -> Self {
        Self {
            min_sog: config.min_sog,
            bin_minutes: config.bin_minutes,
            org: config.org.clone(),
        }
    }
}

/// Cached render layer and the inputs it was built from
#[derive(Debug, Default)]
struct LayerCache {
    layer: TrackLayer,
    generation: Option<u64>,
    selected: Option<u32>,
    show_positions: bool,
}

pub struct DashboardApp {
    /// Configuration as stored on disk
    stored: AppConfig,
    /// Stored configuration plus command line overrides
    config: AppConfig,
    window: TimeWindow,

    tracks: Poller<TrackSource>,
    wind: Poller<WeatherSource>,
    pressure: Poller<WeatherSource>,

    tiles: HttpTiles,
    map_memory: MapMemory,
    home: Position,
    cache: LayerCache,

    selected: Option<u32>,
    filter: FilterEdit,
    vessel_list: VesselList,
    status_pane: StatusPane,
    minimized: bool,
}

impl std::fmt::Debug for DashboardApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardApp")
            .field("window", &self.window)
            .field("tracks", &self.tracks)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl DashboardApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        stored: AppConfig,
        config: AppConfig,
        window: TimeWindow,
    ) -> Result<Self, ClientError> {
        let client = ApiClient::new(&config.api_config())?;
        info!("Polling {} every {}s", client.tracks_url(), config.refresh_interval_secs);

        let mut tracks = Poller::new(
            "tracks",
            TrackSource::new(client.clone()),
            config.track_params(window),
            config.track_poller_config(&window),
        );
        let weather_params = config.weather_params(&window);
        let mut wind = Poller::new(
            "wind",
            WeatherSource::new(client.clone(), WeatherField::Wind),
            weather_params.clone(),
            config.weather_poller_config(),
        );
        let mut pressure = Poller::new(
            "pressure",
            WeatherSource::new(client, WeatherField::Pressure),
            weather_params,
            config.weather_poller_config(),
        );

        // Repaint whenever a poller publishes
        let ctx = cc.egui_ctx.clone();
        tracks.on_update(move || ctx.request_repaint());
        let ctx = cc.egui_ctx.clone();
        wind.on_update(move || ctx.request_repaint());
        let ctx = cc.egui_ctx.clone();
        pressure.on_update(move || ctx.request_repaint());

        tracks.start();
        wind.set_visible(config.show_wind_chart);
        wind.start();
        pressure.set_visible(config.show_pressure_chart);
        pressure.start();

        let home = lat_lon(config.map_lat, config.map_lon);
        let mut map_memory = MapMemory::default();
        if map_memory.set_zoom(config.default_zoom).is_err() {
            warn!("Ignoring invalid zoom level {}", config.default_zoom);
        }

        Ok(Self {
            filter: FilterEdit::from_config(&config),
            stored,
            config,
            window,
            tracks,
            wind,
            pressure,
            tiles: basemap_tiles(CartoStyle::default(), &cc.egui_ctx),
            map_memory,
            home,
            cache: LayerCache::default(),
            selected: None,
            vessel_list: VesselList::new(),
            status_pane: StatusPane::new(),
            minimized: false,
        })
    }

    /// Change a UI preference and persist it
    fn set_pref(&mut self, update: impl Fn(&mut AppConfig)) {
        update(&mut self.config);
        update(&mut self.stored);
        if let Err(e) = self.stored.save() {
            warn!("Failed to save configuration: {e}");
        }
    }

    /// Newest time shown on the charts
    fn chart_reference(&self) -> DateTime<Utc> {
        match self.window {
            TimeWindow::Range { to, .. } => to,
            TimeWindow::Live { .. } => Utc::now(),
        }
    }

    /// Suspend polling while minimized, and for charts that are hidden
    fn sync_visibility(&mut self, ctx: &egui::Context) {
        let minimized = ctx.input(|i| i.viewport().minimized.unwrap_or(false));
        if minimized != self.minimized {
            info!("Window {}", if minimized { "minimized, pausing updates" } else { "restored" });
            self.minimized = minimized;
        }

        self.tracks.set_visible(!minimized);
        self.wind.set_visible(!minimized && self.config.show_wind_chart);
        self.pressure.set_visible(!minimized && self.config.show_pressure_chart);
    }

    fn vessels(&self) -> (Option<Arc<Vec<Vessel>>>, u64) {
        let snapshot = self.tracks.snapshot();
        (snapshot.data, snapshot.generation)
    }

    /// Rebuild the render layer when the data or display options changed
    fn refresh_layer(&mut self, vessels: Option<&[Vessel]>, generation: u64) {
        let cache = &self.cache;
        if cache.generation == Some(generation)
            && cache.selected == self.selected
            && cache.show_positions == self.config.show_positions
        {
            return;
        }

        let options = RenderOptions {
            show_positions: self.config.show_positions,
            selected: self.selected,
            ..Default::default()
        };
        self.cache = LayerCache {
            layer: TrackLayer::build(vessels.unwrap_or_default(), &options),
            generation: Some(generation),
            selected: self.selected,
            show_positions: self.config.show_positions,
        };
    }

    fn focus_vessel(&mut self, vessels: Option<&[Vessel]>, mmsi: u32) {
        self.selected = Some(mmsi);
        let head = vessels
            .and_then(|v| v.iter().find(|v| v.mmsi == mmsi))
            .and_then(Vessel::head);
        if let Some(point) = head {
            self.map_memory.center_at(lat_lon(point.lat, point.lon));
            zoom_in_to(&mut self.map_memory, FOCUS_ZOOM);
        }
    }

    fn fit_tracks(&mut self) {
        if let Some(bounds) = self.cache.layer.bounds() {
            let (lat, lon) = bounds.center();
            self.map_memory.center_at(lat_lon(lat, lon));
        }
    }

    fn apply_filter(&mut self) {
        let filter = self.filter.clone();
        info!(
            "Applying track filter: min SOG {}, bin {} min, org '{}'",
            filter.min_sog, filter.bin_minutes, filter.org
        );
        self.tracks.update_params(|params| {
            params.min_sog = filter.min_sog;
            params.bin_minutes = Some(filter.bin_minutes);
            params.org = Some(filter.org.clone()).filter(|org| !org.is_empty());
        });
    }

    fn refresh_all(&self) {
        self.tracks.refresh();
        self.wind.refresh();
        self.pressure.refresh();
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let (mode_color, mode_text) = match self.window {
                TimeWindow::Live { .. } => (egui::Color32::from_rgb(100, 255, 100), "● LIVE".to_string()),
                TimeWindow::Range { from, to } => (
                    egui::Color32::from_rgb(255, 200, 50),
                    format!(
                        "◷ HISTORY {} → {}",
                        from.format("%Y-%m-%d %H:%M"),
                        to.format("%Y-%m-%d %H:%M")
                    ),
                ),
            };
            ui.label(egui::RichText::new(mode_text)
                .color(mode_color)
                .size(12.0)
                .monospace()
                .strong());

            ui.separator();

            ui.label("Min SOG");
            ui.add(egui::DragValue::new(&mut self.filter.min_sog)
                .range(0.0..=50.0)
                .speed(0.1)
                .suffix(" kn"));

            ui.label("Bin");
            ui.add(egui::DragValue::new(&mut self.filter.bin_minutes)
                .range(1..=240)
                .suffix(" min"));

            ui.label("Org");
            ui.add(egui::TextEdit::singleline(&mut self.filter.org).desired_width(100.0));

            let changed = self.filter != FilterEdit::from_config(&self.config);
            if ui.add_enabled(changed, egui::Button::new("Apply")).clicked() {
                self.apply_filter();
                self.config.min_sog = self.filter.min_sog;
                self.config.bin_minutes = self.filter.bin_minutes;
                self.config.org.clone_from(&self.filter.org);
            }

            ui.separator();

            if ui.button("⟳ Refresh").on_hover_text("Poll all feeds now").clicked() {
                self.refresh_all();
            }
            if ui.button("⌖ Fit").on_hover_text("Center map on tracks").clicked() {
                self.fit_tracks();
            }
            if ui.button("⌂ Home").clicked() {
                self.map_memory.center_at(self.home);
            }

            ui.separator();

            let mut show_positions = self.config.show_positions;
            if ui.checkbox(&mut show_positions, "Positions").changed() {
                self.set_pref(|c| c.show_positions = show_positions);
            }
            let mut show_wind = self.config.show_wind_chart;
            if ui.checkbox(&mut show_wind, "Wind").changed() {
                self.set_pref(|c| c.show_wind_chart = show_wind);
            }
            let mut show_pressure = self.config.show_pressure_chart;
            if ui.checkbox(&mut show_pressure, "Pressure").changed() {
                self.set_pref(|c| c.show_pressure_chart = show_pressure);
            }
        });
    }

    fn draw_charts(&self, ui: &mut egui::Ui) {
        let reference = self.chart_reference();
        let wind = self.wind.data();
        let pressure = self.pressure.data();

        let mut panels: Vec<Option<&track_client::WeatherSeries>> = Vec::new();
        if self.config.show_wind_chart {
            panels.push(wind.as_deref());
        }
        if self.config.show_pressure_chart {
            panels.push(pressure.as_deref());
        }

        ui.columns(panels.len(), |columns| {
            for (column, series) in columns.iter_mut().zip(panels) {
                charts::weather_chart(column, series, reference);
            }
        });
    }

    fn draw_popup(&mut self, ctx: &egui::Context) {
        let Some(mmsi) = self.selected else {
            return;
        };
        let Some(head) = self.cache.layer.heads.iter().find(|h| h.mmsi == mmsi) else {
            return;
        };

        let mut open = true;
        egui::Window::new(egui::RichText::new(format!("◈ {}", head.tooltip))
            .color(egui::Color32::from_rgb(200, 220, 255))
            .strong())
            .id(egui::Id::new("vessel_popup"))
            .open(&mut open)
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
            .resizable(false)
            .collapsible(false)
            .frame(egui::Frame::window(&ctx.style())
                .fill(egui::Color32::from_rgba_unmultiplied(25, 30, 35, 230))
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(60, 80, 100)))
                .corner_radius(6.0))
            .show(ctx, |ui| {
                egui::Grid::new("vessel_popup_grid")
                    .num_columns(2)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for field in &head.popup {
                            ui.label(egui::RichText::new(field.label)
                                .color(egui::Color32::from_rgb(130, 130, 130))
                                .size(10.0));
                            ui.label(egui::RichText::new(&field.value)
                                .color(egui::Color32::from_rgb(220, 220, 220))
                                .size(10.0)
                                .monospace());
                            ui.end_row();
                        }
                    });
            });

        if !open {
            self.selected = None;
        }
    }

    fn feed_statuses(&self) -> Vec<FeedStatus> {
        vec![
            FeedStatus::from_snapshot(self.tracks.name(), &self.tracks.snapshot(), self.tracks.is_visible()),
            FeedStatus::from_snapshot(self.wind.name(), &self.wind.snapshot(), self.wind.is_visible()),
            FeedStatus::from_snapshot(self.pressure.name(), &self.pressure.snapshot(), self.pressure.is_visible()),
        ]
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_visibility(ctx);

        let (vessels, generation) = self.vessels();
        let vessels = vessels.as_deref().map(Vec::as_slice);
        self.refresh_layer(vessels, generation);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        if self.config.show_wind_chart || self.config.show_pressure_chart {
            egui::TopBottomPanel::bottom("charts")
                .resizable(false)
                .show(ctx, |ui| {
                    self.draw_charts(ui);
                });
        }

        if self.config.vessel_list_expanded {
            let panel = egui::SidePanel::left("vessel_list")
                .default_width(self.config.vessel_list_width)
                .resizable(true)
                .show(ctx, |ui| {
                    self.vessel_list.render(ui, vessels.unwrap_or_default(), self.selected, Utc::now())
                });

            if let Some(ListAction::Focus(mmsi)) = panel.inner {
                self.focus_vessel(vessels, mmsi);
            }

            let width = panel.response.rect.width();
            if (width - self.config.vessel_list_width).abs() > 1.0 && !ctx.input(|i| i.pointer.any_down()) {
                self.set_pref(|c| c.vessel_list_width = width);
            }
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let mut clicked = None;
                let tiles: &mut dyn walkers::Tiles = &mut self.tiles;
                let map = walkers::Map::new(Some(tiles), &mut self.map_memory, self.home)
                    .with_plugin(TrackOverlay::new(&self.cache.layer, &mut clicked));
                ui.add(map);

                if let Some(mmsi) = clicked {
                    self.selected = Some(mmsi);
                }

                // List toggle in the map corner
                let toggle = if self.config.vessel_list_expanded { "◀" } else { "▶" };
                let toggle_rect = egui::Rect::from_min_size(
                    ui.max_rect().left_top() + egui::vec2(6.0, 6.0),
                    egui::vec2(24.0, 24.0),
                );
                if ui.put(toggle_rect, egui::Button::new(toggle))
                    .on_hover_text("Toggle vessel list")
                    .clicked() {
                    let expanded = !self.config.vessel_list_expanded;
                    self.set_pref(|c| c.vessel_list_expanded = expanded);
                }
            });

        self.draw_popup(ctx);

        let feeds = self.feed_statuses();
        self.status_pane.render(ctx, &feeds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_zooms_in_only() {
        let mut map_memory = MapMemory::default();
        map_memory.set_zoom(5.0).unwrap();
        zoom_in_to(&mut map_memory, FOCUS_ZOOM);
        assert_eq!(map_memory.zoom(), FOCUS_ZOOM);

        map_memory.set_zoom(15.0).unwrap();
        zoom_in_to(&mut map_memory, FOCUS_ZOOM);
        assert_eq!(map_memory.zoom(), 15.0);
    }

    #[test]
    fn test_filter_edit_from_config() {
        let config = AppConfig::default();
        let filter = FilterEdit::from_config(&config);
        assert_eq!(filter.bin_minutes, config.bin_minutes);
        assert_eq!(filter.org, config.org);
    }
}
