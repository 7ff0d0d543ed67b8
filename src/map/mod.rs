//! Map rendering: basemap tiles and the vessel track overlay.

pub mod carto_tiles;
pub mod track_plugin;

pub use carto_tiles::{basemap_tiles, CartoStyle};
pub use track_plugin::{color32, TrackOverlay};
