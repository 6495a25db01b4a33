//! Current conditions from the Open-Meteo forecast API.
//!
//! Used by the agent job to ground the persona in the weather outside.
//! Fetch failure degrades to `"?"` placeholders; the persona still runs.

use serde::Deserialize;

use crate::http::{Fetcher, Result};

/// Current conditions at a point. `None` fields render as `"?"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditions {
    pub temp_f: Option<i64>,
    pub condition: String,
    pub humidity: Option<i64>,
    pub wind_mph: Option<i64>,
}

impl Conditions {
    /// Placeholder used when the fetch fails.
    pub fn unavailable() -> Self {
        Self {
            temp_f: None,
            condition: "unknown".to_string(),
            humidity: None,
            wind_mph: None,
        }
    }

    /// One-line summary for prompts, e.g. `58°F, partly cloudy, humidity 72%, wind 9mph`.
    pub fn summary(&self) -> String {
        format!(
            "{}°F, {}, humidity {}%, wind {}mph",
            opt(self.temp_f),
            self.condition,
            opt(self.humidity),
            opt(self.wind_mph)
        )
    }

    /// Compact form stored in memory, e.g. `58F partly cloudy`.
    pub fn compact(&self) -> String {
        format!("{}F {}", opt(self.temp_f), self.condition)
    }
}

fn opt(v: Option<i64>) -> String {
    v.map_or_else(|| "?".to_string(), |n| n.to_string())
}

/// WMO weather code → short description.
pub fn wmo_description(code: u32) -> String {
    let desc = match code {
        0 => "clear",
        1 => "mostly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 => "foggy",
        48 => "rime fog",
        51 => "light drizzle",
        53 => "drizzle",
        55 => "heavy drizzle",
        61 => "light rain",
        63 => "rain",
        65 => "heavy rain",
        71 => "light snow",
        73 => "snow",
        75 => "heavy snow",
        80 => "rain showers",
        81 => "heavy showers",
        82 => "violent showers",
        95 => "thunderstorm",
        other => return format!("wmo:{other}"),
    };
    desc.to_string()
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Current {
    temperature_2m: f64,
    weather_code: u32,
    wind_speed_10m: f64,
    relative_humidity_2m: f64,
}

/// Fetch current conditions at a point (Fahrenheit, mph).
pub async fn current_conditions(fetcher: &Fetcher, lat: f64, lon: f64) -> Result<Conditions> {
    let url = format!(
        "https://api.open-meteo.com/v1/forecast?\
         latitude={lat}&longitude={lon}\
         &current=temperature_2m,weather_code,wind_speed_10m,relative_humidity_2m\
         &temperature_unit=fahrenheit&wind_speed_unit=mph\
         &timezone=America/Los_Angeles"
    );
    let data: ForecastResponse = fetcher.get_json(&url).await?;
    let c = data.current;
    Ok(Conditions {
        temp_f: Some(c.temperature_2m.round() as i64),
        condition: wmo_description(c.weather_code),
        humidity: Some(c.relative_humidity_2m.round() as i64),
        wind_mph: Some(c.wind_speed_10m.round() as i64),
    })
}
