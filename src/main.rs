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

mod app;
mod config;
mod map;
mod ui;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use clap::{CommandFactory, Parser};
use eframe::egui;
use log::{info, warn};
use mimalloc::MiMalloc;

use app::DashboardApp;
use config::{AppConfig, SessionOverrides};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Debug)]
#[command(version, about = "Vessel track and weather dashboard", long_about = None)]
struct Args {
    /// Base URL of the tracking API
    #[arg(long)]
    api_url: Option<String>,

    /// Only show vessels of this fleet
    #[arg(long)]
    org: Option<String>,

    /// Minimum speed over ground in knots
    #[arg(long)]
    min_sog: Option<f64>,

    /// Track bin size in minutes
    #[arg(long)]
    bin_minutes: Option<u32>,

    /// Start of a history range (RFC 3339, "YYYY-MM-DD HH:MM", date or unix seconds, UTC)
    #[arg(long, value_parser = parse_time, requires = "to")]
    from: Option<DateTime<Utc>>,

    /// End of a history range
    #[arg(long, value_parser = parse_time, requires = "from")]
    to: Option<DateTime<Utc>>,

    /// Write the effective settings back to the config file
    #[arg(long)]
    save_config: bool,
}

impl Args {
    fn overrides(&self) -> SessionOverrides {
        SessionOverrides {
            api_url: self.api_url.clone(),
            org: self.org.clone(),
            min_sog: self.min_sog,
            bin_minutes: self.bin_minutes,
            range: self.from.zip(self.to),
        }
    }
}

/// Parse a UTC timestamp given on the command line
fn parse_time(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();

    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Ok(t.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(t.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
    }
    if let Ok(secs) = value.parse::<i64>() {
        if let Some(t) = Utc.timestamp_opt(secs, 0).single() {
            return Ok(t);
        }
    }

    Err(format!("'{value}' is not a recognised date or time"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let overrides = args.overrides();
    if let Some((from, to)) = overrides.range {
        if from >= to {
            Args::command()
                .error(clap::error::ErrorKind::ValueValidation, "--from must be before --to")
                .exit();
        }
    }

    let stored = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load configuration, using defaults: {e}");
        AppConfig::default()
    });
    if let Ok(path) = AppConfig::get_config_path() {
        info!("Configuration file: {}", path.display());
    }

    let mut config = stored.clone();
    config.apply_overrides(&overrides);
    let stored = if args.save_config {
        match config.save() {
            Ok(()) => info!("Saved configuration"),
            Err(e) => warn!("Failed to save configuration: {e}"),
        }
        config.clone()
    } else {
        stored
    };

    let window = config.track_window(overrides.range);
    info!("Starting Vessel Dashboard ({})", if window.is_live() { "live" } else { "history" });

    // Pollers are spawned onto this runtime from the UI thread
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_title("Vessel Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Vessel Dashboard",
        options,
        Box::new(move |cc| {
            let app = DashboardApp::new(cc, stored, config, window)?;
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 14, 6, 30, 0).unwrap();
        assert_eq!(parse_time("2025-03-14T06:30:00Z"), Ok(expected));
        assert_eq!(parse_time("2025-03-14T08:30:00+02:00"), Ok(expected));
        assert_eq!(parse_time("2025-03-14 06:30"), Ok(expected));
        assert_eq!(parse_time(" 2025-03-14T06:30 "), Ok(expected));
        assert_eq!(parse_time(&expected.timestamp().to_string()), Ok(expected));
        assert_eq!(
            parse_time("2025-03-14"),
            Ok(Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap())
        );
        assert!(parse_time("yesterday").is_err());
    }

    #[test]
    fn test_history_args() {
        let args = Args::try_parse_from([
            "vessel-dashboard",
            "--from",
            "2025-03-14",
            "--to",
            "2025-03-15",
            "--org",
            "coastal",
        ])
        .unwrap();

        let overrides = args.overrides();
        let (from, to) = overrides.range.unwrap();
        assert!(from < to);
        assert_eq!(overrides.org.as_deref(), Some("coastal"));
    }

    #[test]
    fn test_from_requires_to() {
        assert!(Args::try_parse_from(["vessel-dashboard", "--from", "2025-03-14"]).is_err());
    }

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }
}
