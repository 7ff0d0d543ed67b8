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

//! Weather time series for the wind and pressure charts.

use chrono::{DateTime, Utc};

use crate::api::{PressureSample, WeatherField, WindSample};

const SECONDS_PER_HOUR: f64 = 3600.0;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW", "NNW",
];

/// Samples returned by one weather request.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherSeries {
    Wind(Vec<WindSample>),
    Pressure(Vec<PressureSample>),
}

impl WeatherSeries {
    #[must_use]
    pub fn field(&self) -> WeatherField {
        match self {
            Self::Wind(_) => WeatherField::Wind,
            Self::Pressure(_) => WeatherField::Pressure,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Wind(samples) => samples.len(),
            Self::Pressure(samples) => samples.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(dt, value)` pairs in ascending time order. Wind uses speed in knots.
    fn values(&self) -> Vec<(i64, f64)> {
        let mut values: Vec<(i64, f64)> = match self {
            Self::Wind(samples) => samples.iter().map(|s| (s.dt, s.value.knots)).collect(),
            Self::Pressure(samples) => samples.iter().map(|s| (s.dt, s.value)).collect(),
        };
        values.sort_by_key(|(dt, _)| *dt);
        values
    }

    /// Newest wind sample, if this is a wind series.
    #[must_use]
    pub fn latest_wind(&self) -> Option<WindSample> {
        match self {
            Self::Wind(samples) => samples.iter().max_by_key(|s| s.dt).copied(),
            Self::Pressure(_) => None,
        }
    }

    /// Convert to chart points with x in hours relative to `reference`.
    #[must_use]
    pub fn chart(&self, reference: DateTime<Utc>) -> ChartSeries {
        let field = self.field();
        let reference = reference.timestamp();

        let mut series = ChartSeries {
            name: field.display_name(),
            unit: match field {
                WeatherField::Wind => "kn",
                WeatherField::Pressure => "hPa",
            },
            points: Vec::with_capacity(self.len()),
            latest: None,
            min: None,
            max: None,
        };

        for (dt, value) in self.values() {
            #[allow(clippy::cast_precision_loss, reason = "hour offsets are small")]
            let hours = dt.saturating_sub(reference) as f64 / SECONDS_PER_HOUR;
            series.points.push([hours, value]);
            series.min = Some(series.min.map_or(value, |m: f64| m.min(value)));
            series.max = Some(series.max.map_or(value, |m: f64| m.max(value)));
            series.latest = Some(value);
        }

        series
    }
}

/// Chart-ready series for an area chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: &'static str,
    pub unit: &'static str,
    /// `[hours relative to reference, value]`, ascending in time.
    pub points: Vec<[f64; 2]>,
    pub latest: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ChartSeries {
    /// Baseline for the filled area: slightly below the minimum so the
    /// shape stays visible for series far from zero, e.g. pressure.
    #[must_use]
    pub fn fill_baseline(&self) -> f64 {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > 0.0 && min > (max - min) * 4.0 => {
                (min - (max - min).max(1.0) * 0.25).floor()
            }
            _ => 0.0,
        }
    }
}

/// 16-point compass name for a bearing in degrees.
#[must_use]
pub fn compass_point(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "normalized bearing maps into 0..=16"
    )]
    let index = ((normalized / 22.5).round() as usize) % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}
