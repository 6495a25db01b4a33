//! Fixed-width rendering of the dashboard lines.
//!
//! Every line shares a 3-column layout (14 + 13 + remainder, `│ `
//! separators) so the gist preview stays aligned in monospace. Column
//! padding counts characters; the leading emoji supplies the extra visual
//! width the budget accounts for.

use crate::money::polymarket::MarketPick;
use crate::money::signals::{regime_dot, select_flows, MarketInfo, SectorFlow, Synthesis, TermStructure};

/// Column widths for the 3-column layout.
pub const COL1: usize = 14;
pub const COL2: usize = 13;

/// Three columns: `emoji c1│ c2│ c3`.
pub fn fmt3(emoji: &str, c1: &str, c2: &str, c3: &str) -> String {
    format!("{emoji} {c1:<14}│ {c2:<13}│ {c3}")
}

/// Two columns: the first spans what col1 + col2 would occupy.
pub fn fmt2(emoji: &str, c1: &str, c2: &str) -> String {
    format!("{emoji} {c1:<29}│ {c2}")
}

/// 5-step gauge cell for one sector flow, e.g. `▶Semi▓▓▓░░`.
fn flow_cell(flow: &SectorFlow) -> String {
    let bars = ((flow.rel.abs() * 1.5) as usize).min(5);
    let gauge = format!("{}{}", "▓".repeat(bars), "░".repeat(5 - bars));
    let arrow = if flow.rel > 0.5 {
        "▶"
    } else if flow.rel < -0.5 {
        "◁"
    } else {
        "→"
    };
    format!("{arrow}{}{gauge}", flow.label)
}

/// Line 1: volatility regime. Returns `(line, explanation)`.
pub fn regime_line(info: &MarketInfo) -> (String, String) {
    let dot = regime_dot(info.vix, info.term);

    let c1 = match info.vix {
        Some(vix) => format!("VIX {vix:.0} {}", info.term.label()),
        None => "VIX ?".to_string(),
    };
    let c2_parts: Vec<&str> = [info.credit.as_deref(), info.m2.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    let c2 = c2_parts.join(" ");
    let c3 = info
        .ten_year
        .map(|t| format!("10Y {t:.1}"))
        .unwrap_or_default();
    let line = fmt3(dot, &c1, &c2, &c3);

    let mut ex = Vec::new();
    match info.term {
        TermStructure::Contango => ex.push("VIX<VIX3M = no crash expected".to_string()),
        TermStructure::Backwardation => ex.push("VIX>VIX3M = market bracing".to_string()),
        _ => {}
    }
    if let Some(hy) = info.hy_spread {
        let note = if hy < 4.0 {
            "<4=ok"
        } else if hy > 5.0 {
            ">5=danger"
        } else {
            "watch>5"
        };
        ex.push(format!("OAS {hy:.1}% ({note})"));
    } else if let Some(credit) = &info.credit {
        let note = if credit.contains('↑') {
            "rising=ok"
        } else if credit.contains('↓') {
            "falling=stress"
        } else {
            "flat"
        };
        ex.push(format!("HYG 5d {note}"));
    }
    if let Some(m2) = &info.m2 {
        let tide = if m2.contains('▲') { "rising" } else { "falling" };
        ex.push(format!("M2 tide {tide}"));
    } else {
        ex.push("M2 needs FRED key".to_string());
    }

    (line, format!("🔮 {}", ex.join(", ")))
}

/// Line 2: sector flows. Returns `(line, explanation)`.
pub fn flows_line(flows: &[SectorFlow]) -> (String, String) {
    let mut parts: Vec<String> = select_flows(flows).iter().map(|f| flow_cell(f)).collect();
    while parts.len() < 3 {
        parts.push("—".to_string());
    }
    let line = fmt3("💸", &parts[0], &parts[1], &parts[2]);

    let all: Vec<String> = flows
        .iter()
        .map(|f| {
            let arrow = if f.rel > 0.5 {
                "▲"
            } else if f.rel < -0.5 {
                "▼"
            } else {
                "→"
            };
            format!("{}{arrow}{:+.1}%", f.label, f.rel)
        })
        .collect();
    let explain = format!("💸 {} (5d vs SPY)", all.join(" "));

    (line, explain)
}

/// Line 2 placeholder when SPY itself is unavailable.
pub fn flows_unavailable() -> (String, String) {
    (
        "$▶ flow unavail".to_string(),
        "💸 market data unavailable".to_string(),
    )
}

/// Line 3: SEC filings. Returns `(line, explanation)`.
pub fn filings_line(insiders: &[(String, u32)], form_d_ai: u64, form_d_total: u64) -> (String, String) {
    let insider_str = if insiders.is_empty() {
        "quiet".to_string()
    } else {
        insiders
            .iter()
            .map(|(ticker, count)| format!("{ticker}:{count}"))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let c1 = format!("insdr {insider_str}");
    let c2 = format!("formD {form_d_ai} AI");
    let c3 = format!("{form_d_total} total wk");
    let line = fmt3("📋", &c1, &c2, &c3);

    let mut ex = Vec::new();
    if insiders.is_empty() {
        ex.push("no insider activity in watched tickers".to_string());
    } else {
        let list = insiders
            .iter()
            .map(|(ticker, count)| format!("{ticker}:{count}"))
            .collect::<Vec<_>>()
            .join(", ");
        ex.push(format!("{list} insider filings (7d)"));
    }
    ex.push(format!(
        "{form_d_ai} tech/AI of {form_d_total} total Form D raises this wk"
    ));

    (line, format!("📋 {}", ex.join(" │ ")))
}

/// Line 4: prediction markets. Returns `(line, explanation)`.
pub fn markets_line(markets: &[MarketPick]) -> (String, String) {
    if markets.is_empty() {
        return (
            fmt2("⚖", "polymarket unavail", "—"),
            "⚖ prediction markets unavailable".to_string(),
        );
    }

    let mut shorts: Vec<&str> = markets.iter().take(3).map(|m| m.short.as_str()).collect();
    while shorts.len() < 3 {
        shorts.push("—");
    }
    let line = fmt3("⚖", shorts[0], shorts[1], shorts[2]);

    let ex: Vec<String> = markets
        .iter()
        .take(3)
        .map(|m| format!("{}: {:.0}%", trim_question(&m.full), m.prob))
        .collect();

    (line, format!("⚖ {}", ex.join(" │ ")))
}

/// Shorten a market question for the explanation line.
fn trim_question(q: &str) -> String {
    let mut q = q.split('?').next().unwrap_or("").trim().to_string();
    for filler in ["Will ", "the ", "Trump ", "United States "] {
        q = q.replace(filler, "");
    }
    q.chars().take(40).collect()
}

/// Line 5: signal synthesis. Returns `(line, explanation)`.
pub fn synthesis_line(synth: &Synthesis) -> (String, String) {
    let reason_str = if synth.reasons.is_empty() {
        "mixed".to_string()
    } else {
        synth
            .reasons
            .iter()
            .take(4)
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    };
    let line = fmt2("💡", &reason_str, synth.signal);

    let explain = if synth.breakdown.is_empty() {
        format!("💡 score {:+}", synth.score)
    } else {
        format!("💡 score {:+}: {}", synth.score, synth.breakdown.join(" "))
    };

    (line, explain)
}
