//! Polymarket event discovery via the Gamma API.
//!
//! Pulls the top-volume active events, keeps the macro/tech ones the
//! dashboard cares about, and compresses each into an 8-character label
//! with its YES probability.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::http::Fetcher;

const GAMMA_EVENTS_URL: &str = "https://gamma-api.polymarket.com/events\
     ?limit=200&active=true&closed=false&order=volume&ascending=false";

/// Events must mention one of these (title or description) to qualify.
const KEYWORDS: &[&str] = &[
    "fed", "tariff", "rate", "recession", "economy", "inflation", "interest rate", "ipo",
    "gdp", "debt", "treasury", "tax", "shutdown", "ai model", "ai ", "largest company",
    "stock", "s&p", "earnings", "nvidia", "openai", "anthropic", "google", "apple",
    "microsoft", "semiconductor", "chip", "climate", "temperature",
];

/// Events whose title mentions one of these are dropped outright
/// (sports, entertainment, geopolitics, crypto).
const SKIP: &[&str] = &[
    "nba", "nfl", "premier league", "champions league", "fifa", "world cup", "la liga",
    "mvp", "deport", "dutch", "bitcoin", "crypto", "nhl", "mlb", "serie a",
    "stranger things", "gta", "oscars", "youtube", "views", "pikachu", "olympics",
    "ice hockey", "nobel", "f1 ", "bad bunny", "opensea", "fdv", "measles",
    "australian open", "super bowl", "logan paul", "war", "strike", "iran", "ukraine",
    "ceasefire", "greenland", "khamenei", "invade", "taiwan", "venezuela", "regime",
    "leader", "putin", "xi jinping", "aliens", "moon land", "ligue", "bundesliga",
    "europa", "nuggets", "mavericks", "bucks", "sentinels", "lol:", "paris mayor",
    "senate", "prime minister", "presidential", "silver", "gold", "polymarket",
    "puffpaw", "backpack", "metamask", "edgex", "hottest year", "weather",
];

/// Near-resolved markets are not interesting.
const MIN_PROB: f64 = 10.0;
const MAX_PROB: f64 = 85.0;

/// Markets shown on the dashboard line.
const PICK_COUNT: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct GammaEvent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub markets: Option<Vec<GammaMarket>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GammaMarket {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(rename = "endDate", default)]
    pub end_date: Option<String>,
    /// Either a JSON array or a JSON-encoded string of prices.
    #[serde(rename = "outcomePrices", default)]
    pub outcome_prices: Option<Value>,
}

/// A market chosen for the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketPick {
    /// Compressed label with probability, e.g. `FedCut 72%`.
    pub short: String,
    /// Full question text for the explanation line.
    pub full: String,
    pub prob: f64,
}

/// Fetch the top-volume active events.
pub async fn fetch_events(fetcher: &Fetcher) -> Result<Vec<GammaEvent>> {
    fetcher
        .get_json(GAMMA_EVENTS_URL)
        .await
        .context("fetch Polymarket events")
}

/// Pick up to three dashboard-worthy markets from the event list.
///
/// `today` is `YYYY-MM-DD`; markets that ended before it are skipped, as
/// are near-resolved ones (probability outside 10–85%).
pub fn select_markets(events: &[GammaEvent], today: &str) -> Vec<MarketPick> {
    let mut picks = Vec::new();

    for event in events {
        let title = event.title.as_deref().unwrap_or("");
        let title_lower = title.to_lowercase();
        let desc_lower = event
            .description
            .as_deref()
            .unwrap_or("")
            .to_lowercase();
        let search_text = format!("{title_lower} {desc_lower}");

        if SKIP.iter().any(|s| title_lower.contains(s)) {
            continue;
        }
        if !KEYWORDS.iter().any(|k| search_text.contains(k)) {
            continue;
        }

        // The first market is the event's primary question.
        let Some(market) = event.markets.as_ref().and_then(|m| m.first()) else {
            continue;
        };

        if let Some(end) = market.end_date.as_deref() {
            if end.len() >= 10 && &end[..10] < today {
                continue;
            }
        }

        let Some(prob) = market
            .outcome_prices
            .as_ref()
            .and_then(first_price)
            .map(|p| p * 100.0)
        else {
            continue;
        };
        if !(MIN_PROB..=MAX_PROB).contains(&prob) {
            continue;
        }

        let short = short_label(title);
        let full = market
            .question
            .clone()
            .unwrap_or_else(|| title.to_string());
        picks.push(MarketPick {
            short: format!("{short} {prob:.0}%"),
            full,
            prob,
        });

        if picks.len() >= PICK_COUNT {
            break;
        }
    }

    picks
}

/// First outcome price from either wire shape: `["0.72", ...]` as an array
/// or the same array JSON-encoded into a string.
fn first_price(v: &Value) -> Option<f64> {
    let arr: Vec<Value> = match v {
        Value::String(s) => serde_json::from_str(s).ok()?,
        Value::Array(a) => a.clone(),
        _ => return None,
    };
    match arr.first()? {
        Value::String(s) if !s.is_empty() => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Compress an event title into an 8-character dashboard label.
///
/// Known recurring events get fixed labels; everything else is trimmed of
/// filler words and cut at a word boundary.
fn short_label(title: &str) -> String {
    let raw = title
        .split('?')
        .next()
        .unwrap_or("")
        .split("...")
        .next()
        .unwrap_or("")
        .trim();
    let rl = raw.to_lowercase();

    let has_any = |needles: &[&str]| needles.iter().any(|n| rl.contains(n));

    if has_any(&["fed", "fomc"]) && has_any(&["rate", "cut", "decrease", "interest"]) {
        return "FedCut".to_string();
    }
    if rl.contains("fed chair") || (rl.contains("nominate") && rl.contains("fed")) {
        return "FedChr".to_string();
    }
    if rl.contains("recession") {
        return "Recsn".to_string();
    }
    if rl.contains("tariff") && rl.contains("supreme") {
        return "SCTarf".to_string();
    }
    if rl.contains("tariff") && rl.contains("revenue") {
        return "TarRev".to_string();
    }
    if rl.contains("tariff") {
        return "Tarif".to_string();
    }
    if rl.contains("inflation") {
        return "Infln".to_string();
    }
    if rl.contains("ai model") || rl.contains("best ai") {
        return "BestAI".to_string();
    }
    if rl.contains("largest company") {
        return "BigCo".to_string();
    }
    if rl.contains("ipo") {
        return "IPOs".to_string();
    }
    if rl.contains("shutdown") {
        return "Shtdwn".to_string();
    }
    if rl.contains("tax") {
        return "Tax".to_string();
    }
    if rl.contains("midterm") {
        return "Midtrm".to_string();
    }
    if rl.contains("gdp") {
        return "GDP".to_string();
    }
    if rl.contains("s&p") || rl.contains("sp500") {
        return "SP500".to_string();
    }

    let mut stripped = raw.to_string();
    for filler in [
        "Will ",
        "the ",
        "Trump ",
        "United States ",
        "How many ",
        "What will ",
        "Who will ",
    ] {
        stripped = stripped.replace(filler, "");
    }
    let short = stripped.replace("  ", " ").trim().to_string();
    if short.chars().count() <= 8 {
        return short;
    }

    // Cut at a word boundary inside the first 9 characters.
    let head: String = short.chars().take(9).collect();
    match head.rsplit_once(' ') {
        Some((word, _)) => word.to_string(),
        None => short.chars().take(7).collect(),
    }
}
