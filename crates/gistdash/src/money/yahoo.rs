//! Yahoo Finance chart API fetch.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::http::Fetcher;

/// Latest price plus recent daily closes for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub price: f64,
    pub closes: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Vec<ChartResult>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: f64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Fetch daily chart data (12-day range) for a symbol.
///
/// Null closes (holidays, partial sessions) are dropped.
pub async fn chart(fetcher: &Fetcher, symbol: &str) -> Result<Quote> {
    let url = format!(
        "https://query1.finance.yahoo.com/v8/finance/chart/{symbol}?range=12d&interval=1d"
    );
    let data: ChartResponse = fetcher
        .get_json(&url)
        .await
        .with_context(|| format!("fetch chart for {symbol}"))?;

    let result = data
        .chart
        .result
        .into_iter()
        .next()
        .with_context(|| format!("empty chart result for {symbol}"))?;

    let closes = result
        .indicators
        .quote
        .first()
        .map(|q| q.close.iter().copied().flatten().collect())
        .unwrap_or_default();

    Ok(Quote {
        price: result.meta.regular_market_price,
        closes,
    })
}
