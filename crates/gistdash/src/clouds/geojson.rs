//! GeoJSON assembly for the cloud-cover map.
//!
//! Produces a FeatureCollection of semi-transparent cloud polygons plus
//! station/home markers, in the simplestyle properties the gist map
//! renderer understands.

use serde_json::{json, Value};

use crate::clouds::grid::{GridPoint, HomeConditions};
use crate::config::CloudsConfig;

/// Cells below this cover are left clear.
const MIN_COVER_PCT: f64 = 5.0;

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round5(v: f64) -> f64 {
    (v * 100_000.0).round() / 100_000.0
}

/// Opacity scales with cloud cover: 5% → ~0.05, 100% → 0.45.
fn cover_opacity(cover: f64) -> f64 {
    round2(0.03 + (cover / 100.0) * 0.42)
}

/// Thin clouds render white, thick clouds gray.
fn cover_fill(cover: f64) -> &'static str {
    if cover >= 80.0 {
        "#9E9E9E"
    } else if cover >= 50.0 {
        "#BDBDBD"
    } else {
        "#E0E0E0"
    }
}

fn opt(v: Option<i64>) -> String {
    v.map_or_else(|| "?".to_string(), |n| n.to_string())
}

/// Build the full FeatureCollection.
pub fn build_feature_collection(
    grid: &[GridPoint],
    home: &HomeConditions,
    cfg: &CloudsConfig,
) -> Value {
    let lat_step = (cfg.lat_max - cfg.lat_min) / cfg.rows as f64;
    let lon_step = (cfg.lon_max - cfg.lon_min) / cfg.cols as f64;
    let half_lat = lat_step / 2.0;
    let half_lon = lon_step / 2.0;

    let mut features = Vec::new();

    // Cloud cover cells
    for point in grid {
        let cc = point.cloud_cover;
        if cc < MIN_COVER_PCT {
            continue;
        }
        let fill = cover_fill(cc);
        features.push(json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [round5(point.lon - half_lon), round5(point.lat - half_lat)],
                    [round5(point.lon + half_lon), round5(point.lat - half_lat)],
                    [round5(point.lon + half_lon), round5(point.lat + half_lat)],
                    [round5(point.lon - half_lon), round5(point.lat + half_lat)],
                    [round5(point.lon - half_lon), round5(point.lat - half_lat)],
                ]]
            },
            "properties": {
                "stroke": fill,
                "stroke-width": 0,
                "stroke-opacity": 0,
                "fill": fill,
                "fill-opacity": cover_opacity(cc),
                "title": format!("{}% cloud cover", cc.round() as i64),
                "description": format!(
                    "ECMWF IFS 0.25 forecast / {:.2}N {:.2}W",
                    point.lat,
                    point.lon.abs()
                ),
            }
        }));
    }

    // Home marker with live conditions
    features.push(json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [cfg.home_lon, cfg.home_lat]},
        "properties": {
            "marker-color": "#ff4444",
            "marker-size": "large",
            "marker-symbol": "star",
            "title": format!("Home - {}F", opt(home.temp)),
            "description": format!(
                "Cloud {}% / Wind {} mph / ECMWF IFS",
                opt(home.cloud_cover),
                opt(home.wind)
            ),
        }
    }));

    // METAR station markers
    for station in &cfg.stations {
        features.push(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [station.lon, station.lat]},
            "properties": {
                "marker-color": station.color,
                "marker-size": "medium",
                "marker-symbol": station.symbol,
                "title": format!("{} - {}", station.name, station.label),
                "description": "METAR station / surface observations",
            }
        }));
    }

    // NDVI sample point
    features.push(json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [-122.1030, 37.3861]},
        "properties": {
            "marker-color": "#4CAF50",
            "marker-size": "small",
            "marker-symbol": "garden",
            "title": "NDVI Sample",
            "description": "Sentinel-2 vegetation index / 10m resolution",
        }
    }));

    // AQI monitor
    features.push(json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [-122.1097, 37.4148]},
        "properties": {
            "marker-color": "#607D8B",
            "marker-size": "small",
            "marker-symbol": "marker",
            "title": "AQI Monitor",
            "description": "Open-Meteo Air Quality / PM2.5 + PM10",
        }
    }));

    // Forecast grid outline
    features.push(json!({
        "type": "Feature",
        "geometry": {
            "type": "Polygon",
            "coordinates": [[
                [cfg.lon_min, cfg.lat_min],
                [cfg.lon_max, cfg.lat_min],
                [cfg.lon_max, cfg.lat_max],
                [cfg.lon_min, cfg.lat_max],
                [cfg.lon_min, cfg.lat_min],
            ]]
        },
        "properties": {
            "stroke": "#ff4444",
            "stroke-width": 1,
            "stroke-opacity": 0.3,
            "fill": "#ff4444",
            "fill-opacity": 0.02,
            "title": "ECMWF IFS Grid",
            "description": "25km resolution / forecast area",
        }
    }));

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clouds::grid::grid_points;

    fn sample() -> (Vec<GridPoint>, HomeConditions, CloudsConfig) {
        let cfg = CloudsConfig::default();
        let mut grid = grid_points(&cfg);
        grid[0].cloud_cover = 100.0;
        grid[1].cloud_cover = 60.0;
        grid[2].cloud_cover = 20.0;
        grid[3].cloud_cover = 4.0; // below threshold, skipped
        (
            grid,
            HomeConditions {
                temp: Some(58),
                cloud_cover: Some(35),
                wind: Some(9),
            },
            cfg,
        )
    }

    #[test]
    fn opacity_scales_with_cover() {
        assert_eq!(cover_opacity(5.0), 0.05);
        assert_eq!(cover_opacity(50.0), 0.24);
        assert_eq!(cover_opacity(100.0), 0.45);
    }

    #[test]
    fn fill_thresholds() {
        assert_eq!(cover_fill(95.0), "#9E9E9E");
        assert_eq!(cover_fill(60.0), "#BDBDBD");
        assert_eq!(cover_fill(20.0), "#E0E0E0");
    }

    #[test]
    fn clear_cells_are_skipped() {
        let (grid, home, cfg) = sample();
        let fc = build_feature_collection(&grid, &home, &cfg);
        let features = fc["features"].as_array().unwrap();
        // 3 cloud cells + home + 5 stations + NDVI + AQI + outline
        assert_eq!(features.len(), 3 + 1 + 5 + 1 + 1 + 1);
    }

    #[test]
    fn cloud_cell_properties() {
        let (grid, home, cfg) = sample();
        let fc = build_feature_collection(&grid, &home, &cfg);
        let cell = &fc["features"][0];
        assert_eq!(cell["geometry"]["type"], "Polygon");
        assert_eq!(cell["properties"]["fill"], "#9E9E9E");
        assert_eq!(cell["properties"]["fill-opacity"], 0.45);
        assert_eq!(cell["properties"]["title"], "100% cloud cover");
        // Ring is closed: first and last coordinates match.
        let ring = cell["geometry"]["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.first(), ring.last());
        assert_eq!(ring.len(), 5);
    }

    #[test]
    fn home_marker_carries_conditions() {
        let (grid, home, cfg) = sample();
        let fc = build_feature_collection(&grid, &home, &cfg);
        let features = fc["features"].as_array().unwrap();
        let marker = features
            .iter()
            .find(|f| f["properties"]["marker-symbol"] == "star")
            .unwrap();
        assert_eq!(marker["properties"]["title"], "Home - 58F");
        assert_eq!(
            marker["properties"]["description"],
            "Cloud 35% / Wind 9 mph / ECMWF IFS"
        );
    }

    #[test]
    fn outline_spans_the_bounding_box() {
        let (grid, home, cfg) = sample();
        let fc = build_feature_collection(&grid, &home, &cfg);
        let features = fc["features"].as_array().unwrap();
        let outline = features.last().unwrap();
        assert_eq!(outline["properties"]["title"], "ECMWF IFS Grid");
        let ring = outline["geometry"]["coordinates"][0].as_array().unwrap();
        assert_eq!(ring[0][0], cfg.lon_min);
        assert_eq!(ring[2][1], cfg.lat_max);
    }
}
