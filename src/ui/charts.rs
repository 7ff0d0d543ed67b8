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

//! Wind and pressure area charts.

use chrono::{DateTime, Utc};
use egui_plot::{Line, Plot, PlotPoints};
use track_client::weather::compass_point;
use track_client::{ChartSeries, WeatherSeries};

const CHART_HEIGHT: f32 = 120.0;

const WIND_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 180, 220);
const PRESSURE_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 160, 255);

/// Headline text shown above a chart, e.g. `Wind 14.0 kn SW`
pub fn chart_title(series: &WeatherSeries, chart: &ChartSeries) -> String {
    let mut title = match chart.latest {
        Some(latest) => format!("{} {latest:.1} {}", chart.name, chart.unit),
        None => format!("{} (no data)", chart.name),
    };

    if let Some(wind) = series.latest_wind() {
        title.push(' ');
        title.push_str(compass_point(wind.value.direction));
    }

    title
}

/// Draw one weather series as a filled area chart
pub fn weather_chart(ui: &mut egui::Ui, series: Option<&WeatherSeries>, now: DateTime<Utc>) {
    let Some(series) = series else {
        ui.label(egui::RichText::new("Waiting for data…")
            .color(egui::Color32::from_rgb(130, 130, 130))
            .size(10.0));
        return;
    };

    let chart = series.chart(now);
    let color = match series.field() {
        track_client::WeatherField::Wind => WIND_COLOR,
        track_client::WeatherField::Pressure => PRESSURE_COLOR,
    };

    ui.label(egui::RichText::new(chart_title(series, &chart))
        .color(color)
        .size(12.0)
        .strong());

    let baseline = chart.fill_baseline();
    #[allow(clippy::cast_possible_truncation, reason = "fill baseline is a plot coordinate")]
    let fill = baseline as f32;

    Plot::new(("weather_chart", chart.name))
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_y(baseline)
        .x_axis_label("hours")
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(chart.name, PlotPoints::new(chart.points.clone()))
                    .color(color)
                    .width(1.5)
                    .fill(fill),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use track_client::{PressureSample, Wind, WindSample};

    #[test]
    fn test_wind_title_includes_direction() {
        let series = WeatherSeries::Wind(vec![
            WindSample { value: Wind { knots: 8.0, direction: 90.0 }, dt: 0 },
            WindSample { value: Wind { knots: 14.0, direction: 225.0 }, dt: 3600 },
        ]);
        let chart = series.chart(Utc.timestamp_opt(3600, 0).unwrap());
        assert_eq!(chart_title(&series, &chart), "Wind 14.0 kn SW");
    }

    #[test]
    fn test_pressure_title() {
        let series = WeatherSeries::Pressure(vec![PressureSample { value: 1013.4, dt: 0 }]);
        let chart = series.chart(Utc.timestamp_opt(0, 0).unwrap());
        assert_eq!(chart_title(&series, &chart), "Pressure 1013.4 hPa");
    }

    #[test]
    fn test_empty_title() {
        let series = WeatherSeries::Pressure(Vec::new());
        let chart = series.chart(Utc::now());
        assert_eq!(chart_title(&series, &chart), "Pressure (no data)");
    }
}
