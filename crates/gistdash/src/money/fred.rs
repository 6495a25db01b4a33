//! FRED series observations (HY OAS spread, M2 money supply).

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::http::Fetcher;

/// High-yield option-adjusted spread series.
const HY_OAS_SERIES: &str = "BAMLH0A0HYM2";

/// M2 money supply series (monthly).
const M2_SERIES: &str = "M2SL";

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    value: String,
}

/// Most recent numeric values of a series, newest first.
///
/// FRED reports missing data points as `"."`, which fail the parse and
/// surface as an error the caller degrades around.
async fn latest_values(
    fetcher: &Fetcher,
    api_key: &str,
    series_id: &str,
    limit: usize,
) -> Result<Vec<f64>> {
    let url = format!(
        "https://api.stlouisfed.org/fred/series/observations\
         ?series_id={series_id}&api_key={api_key}\
         &file_type=json&sort_order=desc&limit={limit}"
    );
    let data: ObservationsResponse = fetcher
        .get_json(&url)
        .await
        .with_context(|| format!("fetch FRED series {series_id}"))?;

    data.observations
        .iter()
        .map(|obs| {
            obs.value
                .parse::<f64>()
                .with_context(|| format!("non-numeric observation {:?} in {series_id}", obs.value))
        })
        .collect()
}

/// Latest HY OAS spread in percent.
pub async fn hy_oas(fetcher: &Fetcher, api_key: &str) -> Result<f64> {
    let values = latest_values(fetcher, api_key, HY_OAS_SERIES, 1).await?;
    values
        .first()
        .copied()
        .ok_or_else(|| anyhow!("no observations for {HY_OAS_SERIES}"))
}

/// Month-over-month M2 growth in percent.
pub async fn m2_growth(fetcher: &Fetcher, api_key: &str) -> Result<f64> {
    let values = latest_values(fetcher, api_key, M2_SERIES, 2).await?;
    match values.as_slice() {
        [current, previous, ..] if *previous != 0.0 => {
            Ok((current - previous) / previous * 100.0)
        }
        _ => Err(anyhow!("need two observations for {M2_SERIES}")),
    }
}
