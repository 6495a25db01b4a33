//! The money-flow dashboard job.
//!
//! Fetch → signal → format → validate → refine → publish, once per run.
//! Every source degrades independently: a failing API blanks its own
//! column, never the whole dashboard. The only retried operations are the
//! refinement loop and the gist PATCH.

pub mod edgar;
pub mod format;
pub mod fred;
pub mod polymarket;
pub mod refine;
pub mod signals;
pub mod yahoo;

use anyhow::{Context, Result};
use chrono::Duration;

use crate::clock::{pacific_now, stamp};
use crate::config::MoneyConfig;
use crate::gist::{GistClient, DASHBOARD_FILENAME};
use crate::http::Fetcher;
use crate::llm::ClaudeClient;
use signals::{classify_term, credit_trend, safe_5d, MarketInfo, SectorFlow};

/// Form 4 lookback window in days.
const FILING_WINDOW_DAYS: i64 = 7;

/// Watched tickers scanned for insider filings (the rest are config only).
const INSIDER_TICKERS: usize = 4;

/// Run the money-flow job. `update` pushes to the gist named by
/// `MONEY_GIST_ID`; otherwise the content is only printed.
pub async fn run(cfg: &MoneyConfig, update: bool) -> Result<()> {
    let fetcher = Fetcher::new().context("build HTTP client")?;
    let now = pacific_now();
    let fred_key = std::env::var("FRED_API_KEY").ok();

    let mut info = MarketInfo::default();
    let mut lines = Vec::new();
    let mut explains = Vec::new();

    // Line 1: volatility regime
    build_regime(&fetcher, fred_key.as_deref(), &mut info).await;
    let (line, explain) = format::regime_line(&info);
    lines.push(line);
    explains.push(explain);

    // Line 2: sector flows
    let (line, explain) = build_flows(&fetcher, cfg, &mut info).await;
    lines.push(line);
    explains.push(explain);

    // Line 3: SEC filings
    let (line, explain) = build_filings(&fetcher, cfg, now).await;
    lines.push(line);
    explains.push(explain);

    // Line 4: prediction markets
    info.markets = match polymarket::fetch_events(&fetcher).await {
        Ok(events) => polymarket::select_markets(&events, &now.format("%Y-%m-%d").to_string()),
        Err(e) => {
            log::warn!("polymarket fetch failed: {e}");
            Vec::new()
        }
    };
    let (line, explain) = format::markets_line(&info.markets);
    lines.push(line);
    explains.push(explain);

    // Line 5: synthesis
    let synth = signals::synthesize(&info);
    let (line, explain) = format::synthesis_line(&synth);
    lines.push(line);
    explains.push(explain);

    let deterministic = format!("{}\n\n{}", lines.join("\n"), explains.join("\n"));

    // Optional refinement pass; missing credentials mean deterministic.
    let refined = match ClaudeClient::from_env(&cfg.model) {
        Ok(client) => refine::refine(&client, &info, &deterministic).await,
        Err(_) => {
            log::info!("ANTHROPIC_API_KEY not set, using deterministic output");
            None
        }
    };

    let (mut content, source) = match refined {
        Some(text) => (text, "agent"),
        None => (deterministic, "deterministic"),
    };
    content.push_str(&format!("\n\n⏱ {} [{source}]", stamp(now)));

    println!("{content}");
    println!("---");

    if update {
        let ok = publish(&content).await;
        println!("{}", if ok { "✓ gist updated" } else { "✗ gist update failed" });
    } else {
        println!("(dry run — pass --update to push to gist)");
    }

    Ok(())
}

/// Gather VIX, term structure, credit, liquidity, and the 10-year yield.
/// Each piece degrades independently.
async fn build_regime(fetcher: &Fetcher, fred_key: Option<&str>, info: &mut MarketInfo) {
    match yahoo::chart(fetcher, "^VIX").await {
        Ok(quote) => {
            info.vix = Some(quote.price);
            match yahoo::chart(fetcher, "^VIX3M").await {
                Ok(vix3m) => info.term = classify_term(quote.price, vix3m.price),
                Err(e) => log::warn!("VIX3M fetch failed: {e}"),
            }
        }
        Err(e) => log::warn!("VIX fetch failed: {e}"),
    }

    match yahoo::chart(fetcher, "HYG").await {
        Ok(quote) => {
            if let Some(ret) = safe_5d(&quote.closes) {
                info.credit = Some(credit_trend(ret).to_string());
            }
        }
        Err(e) => log::warn!("HYG fetch failed: {e}"),
    }

    if let Some(key) = fred_key {
        // FRED spread is more precise than the HYG proxy when available.
        match fred::hy_oas(fetcher, key).await {
            Ok(spread) => {
                info.credit = Some(format!("HY{}", (spread * 100.0) as i64));
                info.hy_spread = Some(spread);
            }
            Err(e) => log::warn!("FRED HY OAS fetch failed: {e}"),
        }

        match fred::m2_growth(fetcher, key).await {
            Ok(growth) => {
                let arrow = if growth > 0.0 { '▲' } else { '▼' };
                info.m2 = Some(format!("M2{arrow}{:.1}%", growth.abs()));
            }
            Err(e) => log::warn!("FRED M2 fetch failed: {e}"),
        }
    }

    match yahoo::chart(fetcher, "^TNX").await {
        Ok(quote) => info.ten_year = Some(quote.price),
        Err(e) => log::warn!("TNX fetch failed: {e}"),
    }
}

/// Compute per-sector 5-day returns relative to SPY.
async fn build_flows(
    fetcher: &Fetcher,
    cfg: &MoneyConfig,
    info: &mut MarketInfo,
) -> (String, String) {
    let spy_5d = match yahoo::chart(fetcher, "SPY").await {
        Ok(quote) => safe_5d(&quote.closes),
        Err(e) => {
            log::warn!("SPY fetch failed: {e}");
            None
        }
    };
    let Some(spy_5d) = spy_5d else {
        return format::flows_unavailable();
    };

    let mut flows = Vec::new();
    for sector in &cfg.sectors {
        match yahoo::chart(fetcher, &sector.symbol).await {
            Ok(quote) => {
                if let Some(ret) = safe_5d(&quote.closes) {
                    flows.push(SectorFlow {
                        label: sector.label.clone(),
                        rel: ret - spy_5d,
                        abs_ret: ret,
                    });
                }
            }
            Err(e) => log::warn!("{} fetch failed: {e}", sector.symbol),
        }
    }
    flows.sort_by(|a, b| b.rel.partial_cmp(&a.rel).unwrap_or(std::cmp::Ordering::Equal));
    info.flows = flows;

    format::flows_line(&info.flows)
}

/// Count recent insider filings and Form D raises.
async fn build_filings(
    fetcher: &Fetcher,
    cfg: &MoneyConfig,
    now: chrono::DateTime<chrono::FixedOffset>,
) -> (String, String) {
    let cutoff = (now - Duration::days(FILING_WINDOW_DAYS))
        .format("%Y-%m-%d")
        .to_string();

    let mut insiders = Vec::new();
    for watched in cfg.watched.iter().take(INSIDER_TICKERS) {
        match edgar::form4_count(fetcher, &watched.cik, &cutoff).await {
            Ok(count) if count > 0 => insiders.push((watched.ticker.clone(), count)),
            Ok(_) => {}
            Err(e) => log::warn!("EDGAR fetch failed for {}: {e}", watched.ticker),
        }
    }

    let today = now.format("%Y-%m-%d").to_string();
    let (form_d_ai, form_d_total) = match edgar::form_d_counts(fetcher, &cutoff, &today).await {
        Ok(counts) => counts,
        Err(e) => {
            log::warn!("Form D search failed: {e}");
            (0, 0)
        }
    };

    format::filings_line(&insiders, form_d_ai, form_d_total)
}

async fn publish(content: &str) -> bool {
    let Ok(gist_id) = std::env::var("MONEY_GIST_ID") else {
        log::warn!("MONEY_GIST_ID not set");
        return false;
    };
    let client = match GistClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            log::error!("gist client unavailable: {e}");
            return false;
        }
    };
    match client
        .write_file(&gist_id, DASHBOARD_FILENAME, content)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            log::error!("gist update failed: {e}");
            false
        }
    }
}
