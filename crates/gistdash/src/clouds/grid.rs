//! Cloud-cover grid fetch from the Open-Meteo ECMWF endpoint.
//!
//! One batched request covers every grid cell (the API accepts
//! comma-separated coordinate lists and returns one result per point).

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::config::CloudsConfig;
use crate::http::{Fetcher, Result};

/// One grid cell center with its forecast cloud cover (percent).
#[derive(Debug, Clone, PartialEq)]
pub struct GridPoint {
    pub lat: f64,
    pub lon: f64,
    pub row: usize,
    pub col: usize,
    pub cloud_cover: f64,
}

/// Conditions at the home point for the map marker.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeConditions {
    pub temp: Option<i64>,
    pub cloud_cover: Option<i64>,
    pub wind: Option<i64>,
}

impl HomeConditions {
    /// Fallback when the fetch fails entirely.
    pub fn zeroed() -> Self {
        Self {
            temp: Some(0),
            cloud_cover: Some(0),
            wind: Some(0),
        }
    }
}

/// Cell centers for the configured bounding box, row-major.
pub fn grid_points(cfg: &CloudsConfig) -> Vec<GridPoint> {
    let lat_step = (cfg.lat_max - cfg.lat_min) / cfg.rows as f64;
    let lon_step = (cfg.lon_max - cfg.lon_min) / cfg.cols as f64;

    let mut points = Vec::with_capacity(cfg.rows * cfg.cols);
    for row in 0..cfg.rows {
        for col in 0..cfg.cols {
            points.push(GridPoint {
                lat: cfg.lat_min + (row as f64 + 0.5) * lat_step,
                lon: cfg.lon_min + (col as f64 + 0.5) * lon_step,
                row,
                col,
                cloud_cover: 0.0,
            });
        }
    }
    points
}

/// Index of the current hour in an hourly time series: the entry before the
/// first timestamp at or past `now`, clamped to the start.
pub fn current_hour_index(times: &[String], now: NaiveDateTime) -> usize {
    for (j, t) in times.iter().enumerate() {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M") {
            if parsed >= now {
                return j.saturating_sub(1);
            }
        }
    }
    0
}

#[derive(Debug, Deserialize)]
struct CloudHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    cloud_cover: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct CloudForecast {
    #[serde(default)]
    hourly: Option<CloudHourly>,
}

/// The API returns an array for multi-point requests, an object otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EcmwfResponse {
    Many(Vec<CloudForecast>),
    One(CloudForecast),
}

/// Fetch cloud cover for every grid point.
///
/// Points without a usable forecast keep cloud cover 0.
pub async fn fetch_cloud_grid(
    fetcher: &Fetcher,
    cfg: &CloudsConfig,
    now: NaiveDateTime,
) -> Result<Vec<GridPoint>> {
    let mut points = grid_points(cfg);

    let lats: Vec<String> = points.iter().map(|p| format!("{:.4}", p.lat)).collect();
    let lons: Vec<String> = points.iter().map(|p| format!("{:.4}", p.lon)).collect();
    let url = format!(
        "https://api.open-meteo.com/v1/ecmwf?\
         latitude={}&longitude={}\
         &hourly=cloud_cover\
         &models=ecmwf_ifs025\
         &timezone=America/Los_Angeles\
         &forecast_days=1",
        lats.join(","),
        lons.join(",")
    );

    let response: EcmwfResponse = fetcher.get_json(&url).await?;
    let results = match response {
        EcmwfResponse::Many(list) => list,
        EcmwfResponse::One(single) => vec![single],
    };

    for (i, point) in points.iter_mut().enumerate() {
        let Some(hourly) = results.get(i).and_then(|r| r.hourly.as_ref()) else {
            continue;
        };
        let idx = current_hour_index(&hourly.time, now);
        if let Some(Some(val)) = hourly.cloud_cover.get(idx) {
            point.cloud_cover = *val;
        }
    }

    Ok(points)
}

#[derive(Debug, Deserialize)]
struct HomeHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    cloud_cover: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct HomeForecast {
    hourly: HomeHourly,
}

/// Fetch current conditions at the home point for the map marker.
pub async fn fetch_home_conditions(
    fetcher: &Fetcher,
    cfg: &CloudsConfig,
    now: NaiveDateTime,
) -> Result<HomeConditions> {
    let url = format!(
        "https://api.open-meteo.com/v1/forecast?\
         latitude={}&longitude={}\
         &hourly=temperature_2m,cloud_cover,wind_speed_10m\
         &temperature_unit=fahrenheit&wind_speed_unit=mph\
         &timezone=America/Los_Angeles\
         &forecast_days=1",
        cfg.home_lat, cfg.home_lon
    );

    let data: HomeForecast = fetcher.get_json(&url).await?;
    let hourly = data.hourly;
    let idx = current_hour_index(&hourly.time, now);

    let at = |series: &[Option<f64>]| series.get(idx).copied().flatten();
    Ok(HomeConditions {
        temp: at(&hourly.temperature_2m).map(|v| v.round() as i64),
        cloud_cover: at(&hourly.cloud_cover).map(|v| v.round() as i64),
        wind: at(&hourly.wind_speed_10m).map(|v| v.round() as i64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CloudsConfig;

    #[test]
    fn grid_has_row_major_cell_centers() {
        let cfg = CloudsConfig::default();
        let points = grid_points(&cfg);
        assert_eq!(points.len(), 36);

        // First cell center sits half a step in from the corner.
        let lat_step = (cfg.lat_max - cfg.lat_min) / 6.0;
        let lon_step = (cfg.lon_max - cfg.lon_min) / 6.0;
        assert!((points[0].lat - (cfg.lat_min + 0.5 * lat_step)).abs() < 1e-9);
        assert!((points[0].lon - (cfg.lon_min + 0.5 * lon_step)).abs() < 1e-9);

        // Second point advances a column, not a row.
        assert_eq!(points[1].row, 0);
        assert_eq!(points[1].col, 1);
        assert_eq!(points[6].row, 1);
    }

    fn naive(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
    }

    #[test]
    fn hour_index_picks_entry_before_now() {
        let times: Vec<String> = (0..6).map(|h| format!("2026-03-01T{h:02}:00")).collect();
        assert_eq!(current_hour_index(&times, naive("2026-03-01T03:30")), 3);
        assert_eq!(current_hour_index(&times, naive("2026-03-01T03:00")), 2);
    }

    #[test]
    fn hour_index_clamps_to_start() {
        let times = vec!["2026-03-01T12:00".to_string()];
        assert_eq!(current_hour_index(&times, naive("2026-03-01T00:00")), 0);
        assert_eq!(current_hour_index(&[], naive("2026-03-01T00:00")), 0);
    }

    #[test]
    fn hour_index_past_series_end_defaults_to_zero() {
        let times = vec!["2026-03-01T00:00".to_string(), "2026-03-01T01:00".to_string()];
        assert_eq!(current_hour_index(&times, naive("2026-03-02T00:00")), 0);
    }

    #[test]
    fn parses_single_and_array_responses() {
        let single = r#"{"hourly": {"time": ["2026-03-01T00:00"], "cloud_cover": [55.0]}}"#;
        let parsed: EcmwfResponse = serde_json::from_str(single).unwrap();
        assert!(matches!(parsed, EcmwfResponse::One(_)));

        let many = format!("[{single}, {single}]");
        let parsed: EcmwfResponse = serde_json::from_str(&many).unwrap();
        match parsed {
            EcmwfResponse::Many(list) => assert_eq!(list.len(), 2),
            EcmwfResponse::One(_) => panic!("expected array response"),
        }
    }

    #[test]
    fn cloud_cover_nulls_deserialize() {
        let raw = r#"{"time": ["a", "b"], "cloud_cover": [null, 80.0]}"#;
        let hourly: CloudHourly = serde_json::from_str(raw).unwrap();
        assert_eq!(hourly.cloud_cover[0], None);
        assert_eq!(hourly.cloud_cover[1], Some(80.0));
    }
}
