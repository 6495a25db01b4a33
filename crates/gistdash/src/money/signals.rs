//! Pure signal computation for the money dashboard.
//!
//! Everything here is deterministic math over already-fetched numbers:
//! volatility regime, sector flow selection, and the additive synthesis
//! score behind line 5.

use crate::money::polymarket::MarketPick;

/// VIX term structure relative to VIX3M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TermStructure {
    Contango,
    Backwardation,
    Flat,
    #[default]
    Unknown,
}

impl TermStructure {
    pub fn label(self) -> &'static str {
        match self {
            TermStructure::Contango => "cntgo",
            TermStructure::Backwardation => "bkwrd",
            TermStructure::Flat => "flat",
            TermStructure::Unknown => "?",
        }
    }
}

/// Classify the VIX / VIX3M ratio.
pub fn classify_term(vix: f64, vix3m: f64) -> TermStructure {
    let ratio = vix / vix3m;
    if ratio < 0.97 {
        TermStructure::Contango
    } else if ratio > 1.03 {
        TermStructure::Backwardation
    } else {
        TermStructure::Flat
    }
}

/// 5-day return in percent, tolerating short series.
///
/// With fewer than 6 closes the whole series is used; `None` if there is
/// not enough data or the base close is zero.
pub fn safe_5d(closes: &[f64]) -> Option<f64> {
    if closes.len() < 2 {
        return None;
    }
    let (base, last) = if closes.len() < 6 {
        (closes[0], *closes.last()?)
    } else {
        (closes[closes.len() - 6], *closes.last()?)
    };
    if base == 0.0 {
        return None;
    }
    Some((last - base) / base * 100.0)
}

/// Credit trend label from the HYG 5-day return.
pub fn credit_trend(hyg_5d: f64) -> &'static str {
    if hyg_5d > 0.3 {
        "HY↑"
    } else if hyg_5d < -0.5 {
        "HY↓"
    } else {
        "HY→"
    }
}

/// One sector's 5-day performance relative to SPY.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorFlow {
    pub label: String,
    /// Return relative to SPY, percent.
    pub rel: f64,
    /// Absolute 5-day return, percent.
    pub abs_ret: f64,
}

/// Everything the dashboard knows about the market, assembled from
/// whichever sources answered.
#[derive(Debug, Clone, Default)]
pub struct MarketInfo {
    pub vix: Option<f64>,
    pub term: TermStructure,
    /// `HY↑`-style trend from HYG, or `HY412`-style spread from FRED.
    pub credit: Option<String>,
    /// HY OAS spread in percent (FRED only).
    pub hy_spread: Option<f64>,
    /// `M2▲0.1%`-style liquidity tide.
    pub m2: Option<String>,
    pub ten_year: Option<f64>,
    /// Sorted by `rel`, best inflow first.
    pub flows: Vec<SectorFlow>,
    pub markets: Vec<MarketPick>,
}

/// Regime dot for line 1.
pub fn regime_dot(vix: Option<f64>, term: TermStructure) -> &'static str {
    match vix {
        Some(v) if v < 15.0 && term == TermStructure::Contango => "🟢",
        Some(v) if v > 25.0 || term == TermStructure::Backwardation => "🔴",
        Some(_) => "🟡",
        None => "⚪",
    }
}

/// Flows shown on line 2: top-2 inflows plus the worst outflow (or a
/// neutral sector) for contrast.
pub fn select_flows(flows: &[SectorFlow]) -> Vec<&SectorFlow> {
    let inflows: Vec<&SectorFlow> = flows.iter().filter(|f| f.rel > 0.5).collect();
    let outflows: Vec<&SectorFlow> = flows.iter().filter(|f| f.rel < -0.5).collect();
    let neutral: Vec<&SectorFlow> = flows
        .iter()
        .filter(|f| (-0.5..=0.5).contains(&f.rel))
        .collect();

    let mut show: Vec<&SectorFlow> = inflows.iter().take(2).copied().collect();
    if let Some(worst) = outflows.last().copied() {
        show.push(worst);
    } else if let Some(first_neutral) = neutral.first().copied() {
        show.push(first_neutral);
    }
    if show.len() < 3 {
        if let Some(third) = inflows.get(2).copied() {
            show.push(third);
        }
    }
    show
}

/// Line 5: the additive score, its human signal, and reason tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub score: i32,
    pub signal: &'static str,
    pub reasons: Vec<String>,
    pub breakdown: Vec<String>,
}

/// Fold every signal into one positioning call.
pub fn synthesize(info: &MarketInfo) -> Synthesis {
    let mut score = 0;
    let mut reasons = Vec::new();

    let vix = info.vix.unwrap_or(20.0);
    if vix < 15.0 {
        score += 2;
    } else if vix < 20.0 {
        score += 1;
    } else if vix > 30.0 {
        score -= 2;
    } else if vix > 25.0 {
        score -= 1;
    }

    match info.term {
        TermStructure::Contango => score += 1,
        TermStructure::Backwardation => score -= 2,
        _ => {}
    }

    let m2 = info.m2.as_deref().unwrap_or("");
    if m2.contains('▲') {
        score += 1;
        reasons.push("liq▲".to_string());
    } else if m2.contains('▼') {
        score -= 1;
        reasons.push("liq▼".to_string());
    }

    let credit = info.credit.as_deref().unwrap_or("");
    if credit.contains('↑') {
        score += 1;
    } else if credit.contains('↓') {
        score -= 1;
        reasons.push("credit↓".to_string());
    }

    if let Some(hy) = info.hy_spread {
        if hy < 3.5 {
            score += 1;
        } else if hy > 5.5 {
            score -= 2;
            reasons.push("HYstress".to_string());
        }
    }

    if let Some(top) = info.flows.first() {
        if top.rel > 2.0 {
            reasons.push(top.label.to_lowercase());
        }
        for flow in &info.flows {
            if flow.label == "Semi" && flow.rel > 1.0 {
                reasons.push("semi▲".to_string());
                score += 1;
                break;
            }
        }
    }

    let signal = if score >= 4 {
        "full risk on"
    } else if score >= 2 {
        "lean long"
    } else if score >= 0 {
        "selective"
    } else if score >= -2 {
        "hedge + reduce"
    } else {
        "raise cash"
    };

    if info.term == TermStructure::Contango && !reasons.iter().any(|r| r == "liq▲") {
        reasons.push("cntgo".to_string());
    }
    if credit.contains('↑') {
        reasons.push("HY ok".to_string());
    }

    let mut breakdown = Vec::new();
    if let Some(v) = info.vix {
        let vs = if v < 15.0 {
            2
        } else if v < 20.0 {
            1
        } else if v > 25.0 {
            -1
        } else {
            0
        };
        if vs != 0 {
            breakdown.push(format!("vix{vs:+}"));
        }
    }
    match info.term {
        TermStructure::Contango => breakdown.push("cntgo+1".to_string()),
        TermStructure::Backwardation => breakdown.push("bkwrd-2".to_string()),
        _ => {}
    }
    if m2.contains('▲') {
        breakdown.push("M2+1".to_string());
    }
    for flow in &info.flows {
        if flow.label == "Semi" && flow.rel > 1.0 {
            breakdown.push("semi+1".to_string());
            break;
        }
    }

    Synthesis {
        score,
        signal,
        reasons,
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(label: &str, rel: f64) -> SectorFlow {
        SectorFlow {
            label: label.to_string(),
            rel,
            abs_ret: rel,
        }
    }

    #[test]
    fn term_structure_thresholds() {
        assert_eq!(classify_term(14.0, 16.0), TermStructure::Contango);
        assert_eq!(classify_term(20.0, 18.0), TermStructure::Backwardation);
        assert_eq!(classify_term(16.0, 16.0), TermStructure::Flat);
    }

    #[test]
    fn safe_5d_uses_sixth_from_last() {
        let closes = vec![100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 110.0];
        // base = closes[len-6] = 101.0
        let ret = safe_5d(&closes).unwrap();
        assert!((ret - (110.0 - 101.0) / 101.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn safe_5d_short_series_spans_whole() {
        let closes = vec![100.0, 103.0];
        assert!((safe_5d(&closes).unwrap() - 3.0).abs() < 1e-9);
        assert_eq!(safe_5d(&[100.0]), None);
        assert_eq!(safe_5d(&[]), None);
    }

    #[test]
    fn credit_trend_thresholds() {
        assert_eq!(credit_trend(0.4), "HY↑");
        assert_eq!(credit_trend(-0.6), "HY↓");
        assert_eq!(credit_trend(0.0), "HY→");
    }

    #[test]
    fn regime_dot_rules() {
        assert_eq!(regime_dot(Some(14.0), TermStructure::Contango), "🟢");
        assert_eq!(regime_dot(Some(14.0), TermStructure::Flat), "🟡");
        assert_eq!(regime_dot(Some(26.0), TermStructure::Contango), "🔴");
        assert_eq!(regime_dot(Some(18.0), TermStructure::Backwardation), "🔴");
        assert_eq!(regime_dot(None, TermStructure::Contango), "⚪");
    }

    #[test]
    fn select_flows_prefers_inflows_with_contrast() {
        let flows = vec![
            flow("Semi", 2.4),
            flow("Tech", 1.1),
            flow("Fin", 0.7),
            flow("Hlth", 0.1),
            flow("Enrg", -1.8),
        ];
        let show = select_flows(&flows);
        let labels: Vec<&str> = show.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Semi", "Tech", "Enrg"]);
    }

    #[test]
    fn select_flows_uses_neutral_when_no_outflow() {
        let flows = vec![flow("Semi", 1.5), flow("Tech", 0.9), flow("Hlth", 0.2)];
        let show = select_flows(&flows);
        let labels: Vec<&str> = show.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Semi", "Tech", "Hlth"]);
    }

    #[test]
    fn select_flows_backfills_third_inflow() {
        let flows = vec![flow("Semi", 2.0), flow("Tech", 1.5), flow("Fin", 0.8)];
        let show = select_flows(&flows);
        let labels: Vec<&str> = show.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Semi", "Tech", "Fin"]);
    }

    #[test]
    fn synthesize_bullish_board() {
        let info = MarketInfo {
            vix: Some(13.5),
            term: TermStructure::Contango,
            credit: Some("HY↑".to_string()),
            hy_spread: Some(3.1),
            m2: Some("M2▲0.2%".to_string()),
            flows: vec![flow("Semi", 2.2), flow("Tech", 0.8)],
            ..MarketInfo::default()
        };
        let synth = synthesize(&info);
        // vix +2, cntgo +1, m2 +1, credit +1, spread +1, semi +1
        assert_eq!(synth.score, 7);
        assert_eq!(synth.signal, "full risk on");
        assert!(synth.reasons.contains(&"liq▲".to_string()));
        assert!(synth.reasons.contains(&"semi".to_string()));
        assert!(synth.reasons.contains(&"semi▲".to_string()));
        assert!(synth.reasons.contains(&"HY ok".to_string()));
        assert_eq!(
            synth.breakdown,
            vec!["vix+2", "cntgo+1", "M2+1", "semi+1"]
        );
    }

    #[test]
    fn synthesize_stressed_board() {
        let info = MarketInfo {
            vix: Some(32.0),
            term: TermStructure::Backwardation,
            credit: Some("HY↓".to_string()),
            hy_spread: Some(6.0),
            m2: Some("M2▼0.3%".to_string()),
            ..MarketInfo::default()
        };
        let synth = synthesize(&info);
        // vix -2, bkwrd -2, m2 -1, credit -1, spread -2
        assert_eq!(synth.score, -8);
        assert_eq!(synth.signal, "raise cash");
        assert_eq!(
            synth.reasons,
            vec!["liq▼".to_string(), "credit↓".to_string(), "HYstress".to_string()]
        );
        assert_eq!(synth.breakdown, vec!["vix-1", "bkwrd-2"]);
    }

    #[test]
    fn synthesize_defaults_without_data() {
        let synth = synthesize(&MarketInfo::default());
        // Missing VIX is taken as 20, which scores nothing either way.
        assert_eq!(synth.score, 0);
        assert_eq!(synth.signal, "selective");
        assert!(synth.breakdown.is_empty());
    }

    #[test]
    fn contango_reason_skipped_when_liquidity_rising() {
        let info = MarketInfo {
            vix: Some(18.0),
            term: TermStructure::Contango,
            m2: Some("M2▲0.1%".to_string()),
            ..MarketInfo::default()
        };
        let synth = synthesize(&info);
        assert!(!synth.reasons.iter().any(|r| r == "cntgo"));
    }
}
