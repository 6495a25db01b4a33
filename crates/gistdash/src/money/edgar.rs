//! SEC EDGAR fetches: Form 4 insider filings and Form D counts.
//!
//! EDGAR requires a contact User-Agent; requests without one are refused.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::http::Fetcher;

const EDGAR_USER_AGENT: &str = "gistdash contact@example.com";

/// Full-text query for tech/AI Form D raises.
const TECH_QUERY: &str =
    "\"technology\" OR \"software\" OR \"artificial intelligence\" OR \"machine learning\"";

/// How many of the most recent filings to scan per CIK.
const RECENT_SCAN: usize = 30;

#[derive(Debug, Deserialize)]
struct Submissions {
    filings: Filings,
}

#[derive(Debug, Deserialize)]
struct Filings {
    recent: RecentFilings,
}

#[derive(Debug, Deserialize)]
struct RecentFilings {
    #[serde(default)]
    form: Vec<String>,
    #[serde(rename = "filingDate", default)]
    filing_date: Vec<String>,
}

/// Count Form 4 filings for a CIK on or after `cutoff` (`YYYY-MM-DD`).
///
/// Only the 30 most recent filings are scanned.
pub async fn form4_count(fetcher: &Fetcher, cik: &str, cutoff: &str) -> Result<u32> {
    let url = format!("https://data.sec.gov/submissions/CIK{cik}.json");
    let data: Submissions = fetcher
        .get_json_with(&url, &[("User-Agent", EDGAR_USER_AGENT)], &[])
        .await
        .with_context(|| format!("fetch submissions for CIK {cik}"))?;

    let recent = data.filings.recent;
    let count = recent
        .form
        .iter()
        .zip(recent.filing_date.iter())
        .take(RECENT_SCAN)
        .filter(|(form, date)| form.as_str() == "4" && date.as_str() >= cutoff)
        .count();
    Ok(count as u32)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    total: Total,
}

#[derive(Debug, Deserialize)]
struct Total {
    value: u64,
}

async fn form_d_search(
    fetcher: &Fetcher,
    query: Option<&str>,
    start: &str,
    end: &str,
) -> Result<u64> {
    let url = "https://efts.sec.gov/LATEST/search-index";
    let mut params: Vec<(&str, &str)> = Vec::new();
    if let Some(q) = query {
        params.push(("q", q));
    }
    params.extend([
        ("forms", "D"),
        ("dateRange", "custom"),
        ("startdt", start),
        ("enddt", end),
        ("from", "0"),
        ("size", "1"),
    ]);

    let data: SearchResponse = fetcher
        .get_json_with(url, &[("User-Agent", EDGAR_USER_AGENT)], &params)
        .await
        .context("fetch Form D search")?;
    Ok(data.hits.total.value)
}

/// Count Form D filings over a date window: `(tech_ai, total)`.
pub async fn form_d_counts(fetcher: &Fetcher, start: &str, end: &str) -> Result<(u64, u64)> {
    let tech = form_d_search(fetcher, Some(TECH_QUERY), start, end).await?;
    let total = form_d_search(fetcher, None, start, end).await?;
    Ok((tech, total))
}
