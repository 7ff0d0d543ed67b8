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

use std::path::PathBuf;

use walkers::sources::{Attribution, TileSource};
use walkers::{HttpOptions, HttpTiles, TileId};

/// Carto basemap variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartoStyle {
    /// Dark basemap, best contrast for colored tracks
    #[default]
    Dark,
    /// Light basemap with coastline detail
    Voyager,
}

impl CartoStyle {
    fn path(self) -> &'static str {
        match self {
            Self::Dark => "dark_all",
            Self::Voyager => "rastertiles/voyager",
        }
    }

    fn cache_name(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Voyager => "voyager",
        }
    }
}

/// Tile source for Carto CDN basemap tiles
/// Uses subdomain load balancing across a-d.basemaps.cartocdn.com
#[derive(Debug, Clone, Copy, Default)]
pub struct CartoTileSource {
    pub style: CartoStyle,
}

impl TileSource for CartoTileSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        // Subdomain load balancing (a, b, c, d) based on tile coordinates
        let subdomain = ['a', 'b', 'c', 'd'][((tile_id.x + tile_id.y) % 4) as usize];

        format!(
            "https://{}.basemaps.cartocdn.com/{}/{}/{}/{}.png",
            subdomain,
            self.style.path(),
            tile_id.zoom,
            tile_id.x,
            tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenStreetMap contributors, © CARTO",
            url: "https://carto.com/attributions",
            logo_light: None,
            logo_dark: None,
        }
    }
}

/// Create cached HTTP tiles for a basemap style
pub fn basemap_tiles(style: CartoStyle, ctx: &egui::Context) -> HttpTiles {
    let http_options = HttpOptions {
        cache: Some(cache_dir(style)),
        ..Default::default()
    };

    HttpTiles::with_options(CartoTileSource { style }, http_options, ctx.clone())
}

fn cache_dir(style: CartoStyle) -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("vessel-dashboard")
        .join("tiles")
        .join(style.cache_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_url_balances_subdomains() {
        let source = CartoTileSource::default();
        let url = source.tile_url(TileId { x: 1, y: 2, zoom: 3 });
        assert_eq!(url, "https://d.basemaps.cartocdn.com/dark_all/3/1/2.png");

        let url = source.tile_url(TileId { x: 2, y: 2, zoom: 3 });
        assert!(url.starts_with("https://a."));
    }

    #[test]
    fn test_voyager_style_path() {
        let source = CartoTileSource { style: CartoStyle::Voyager };
        let url = source.tile_url(TileId { x: 0, y: 0, zoom: 0 });
        assert_eq!(url, "https://a.basemaps.cartocdn.com/rastertiles/voyager/0/0/0.png");
        assert!(cache_dir(CartoStyle::Voyager).ends_with("vessel-dashboard/tiles/voyager"));
    }
}
