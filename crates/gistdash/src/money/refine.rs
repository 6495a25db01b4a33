//! Model-driven refinement of the deterministic dashboard rendering.
//!
//! The deterministic renderer always produces something publishable; the
//! refinement pass asks a language model to rewrite it more sharply under
//! the same width/structure contract. Every candidate is checked by the
//! validator, and violations are fed back verbatim for another attempt.
//! The loop is bounded: after [`MAX_ATTEMPTS`] failures (or any transport
//! error) the caller falls back to the deterministic rendering.

use async_trait::async_trait;
use serde_json::json;

use crate::dashboard;
use crate::llm::{ClaudeClient, Message, Result as LlmResult};
use crate::money::signals::MarketInfo;

/// Refinement attempt budget.
pub const MAX_ATTEMPTS: usize = 5;

/// Tokens for a full dashboard + explanations rewrite.
const MAX_TOKENS: u32 = 600;

const TEMPERATURE: f32 = 0.7;

const SYSTEM_PROMPT: &str = "\
You format financial market data into a pinned GitHub gist dashboard.

HARD CONSTRAINTS (any violation = rejected):
- Exactly 5 lines for the dashboard (before the blank line)
- Each line MUST be ≤43 characters VISUAL width
- Emoji = 2 chars visual width. │ = 1 char. All other chars = 1.
- ZWJ emoji sequences (e.g. 😮‍💨) = 2 chars total visual width.
- Each line starts with a specific emoji:
  Line 1: 🟢 or 🟡 or 🔴 (regime dot — based on VIX level)
  Line 2: 💸 (sector flows — show relative performance)
  Line 3: 📋 (SEC filings — insider trades + Form D counts)
  Line 4: ⚖ (Polymarket predictions — show probabilities)
  Line 5: 💡 (signal synthesis — your sharp take)
- Use │ as column separator (keeps monospace alignment)
- After the 5 dashboard lines: one blank line, then 4-5 explanation lines
- Explanation lines unpack the dashboard data for someone who clicks in
- Do NOT add a timestamp — it gets appended automatically

DATA ACCURACY (critical):
- Use EXACT numbers from the provided data. Never invent or round aggressively.
- Line 3 must include actual insider filing counts and Form D numbers from the data.
- Line 4 must use the actual Polymarket short labels and probabilities.
- If data says \"AMD:2\" for insider filings, show \"AMD:2\" — don't drop it.

STYLE:
- Be sharp and specific in Line 5 (synthesis). Not \"markets mixed\" but \"semi leading, credit calm = lean into tech\"
- Explanation lines should tell the story: connect the dots between VIX, flows, filings, and predictions
- Use abbreviations that fit: cntgo, bkwrd, liq, HY, 10Y, insdr, formD
- The explanation section is where you add real insight — what does this combination of signals mean?

OUTPUT: Only the gist content (5 dashboard lines + blank + explanations). Nothing else.";

/// The model seam: anything that can attempt a rewrite.
#[async_trait]
pub trait Reformatter {
    async fn reformat(&self, system: &str, messages: &[Message]) -> LlmResult<String>;
}

#[async_trait]
impl Reformatter for ClaudeClient {
    async fn reformat(&self, system: &str, messages: &[Message]) -> LlmResult<String> {
        self.send(Some(system), messages, MAX_TOKENS, Some(TEMPERATURE))
            .await
    }
}

/// Raw numbers handed to the model so it never has to invent data.
fn data_context(info: &MarketInfo) -> serde_json::Value {
    json!({
        "vix": info.vix,
        "term_structure": info.term.label(),
        "credit": info.credit,
        "hy_spread": info.hy_spread,
        "m2": info.m2,
        "10y": info.ten_year,
        "flows": info.flows.iter()
            .map(|f| json!([f.label, format!("{:+.1}%", f.rel)]))
            .collect::<Vec<_>>(),
        "markets": info.markets.iter()
            .map(|m| json!({"q": m.full, "prob": m.prob}))
            .collect::<Vec<_>>(),
    })
}

fn initial_prompt(info: &MarketInfo, deterministic: &str) -> String {
    let context = serde_json::to_string_pretty(&data_context(info))
        .unwrap_or_else(|_| "{}".to_string());
    format!(
        "Raw market data:\n{context}\n\n\
         Current deterministic output (use as reference for data accuracy):\n{deterministic}\n\n\
         Rewrite this dashboard. Rules:\n\
         1. ALL numbers must come from the raw data or deterministic output — never invent.\n\
         2. Lines 1-4: reformat for clarity/density but keep all key data points.\n\
         3. Line 5: write a sharp, specific synthesis — connect the dots between signals.\n\
         4. Explanations: tell the story. Why do these signals matter together?\n\
         5. Every line must be ≤43 visual chars (emoji=2, │=1, all else=1)."
    )
}

fn feedback_prompt(errors: &[String]) -> String {
    format!(
        "Formatting errors found:\n{}\n\n\
         Fix these errors. Each dashboard line must be ≤43 visual chars \
         (emoji=2, │=1, others=1). Output ONLY the corrected gist content.",
        errors.join("\n")
    )
}

/// Strip a wrapping Markdown code fence, if the model added one.
fn strip_code_fences(output: &str) -> String {
    let mut lines: Vec<&str> = output.lines().collect();
    if lines.first().is_some_and(|l| l.starts_with("```")) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.trim_end().ends_with("```")) {
        lines.pop();
    }
    lines.join("\n")
}

/// Ask the model to rewrite the dashboard, re-prompting with validator
/// errors until it passes or the attempt budget runs out.
///
/// Returns `None` when no attempt validates — the caller publishes the
/// deterministic rendering instead.
pub async fn refine<R: Reformatter>(
    model: &R,
    info: &MarketInfo,
    deterministic: &str,
) -> Option<String> {
    let mut messages = vec![Message::user(initial_prompt(info, deterministic))];

    for attempt in 1..=MAX_ATTEMPTS {
        let raw = match model.reformat(SYSTEM_PROMPT, &messages).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("refinement attempt {attempt} error: {e}");
                break;
            }
        };

        let output = strip_code_fences(raw.trim()).trim().to_string();
        let errors = dashboard::validate(&output);
        if errors.is_empty() {
            log::info!("refinement produced valid output on attempt {attempt}");
            return Some(output);
        }

        log::info!("refinement attempt {attempt}: {} error(s)", errors.len());
        messages.push(Message::assistant(output));
        messages.push(Message::user(feedback_prompt(&errors)));
    }

    log::warn!("refinement failed after {MAX_ATTEMPTS} attempts, using deterministic output");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::llm::LlmError;

    /// Scripted stand-in for the model: pops canned responses and records
    /// every conversation it was shown.
    struct Scripted {
        responses: Mutex<VecDeque<Result<String, ()>>>,
        conversations: Mutex<Vec<Vec<Message>>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<String, ()>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                conversations: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.conversations.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Reformatter for Scripted {
        async fn reformat(&self, _system: &str, messages: &[Message]) -> LlmResult<String> {
            self.conversations.lock().unwrap().push(messages.to_vec());
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(())) => Err(LlmError::Api {
                    status: 500,
                    message: "scripted failure".to_string(),
                }),
                None => panic!("scripted reformatter ran out of responses"),
            }
        }
    }

    fn valid_dashboard() -> String {
        [
            "🟢 VIX 14 cntgo  │ HY412 M2▲0.1%│ 10Y 4.2",
            "💸 ▶Semi▓▓▓░░    │ ▶Tech▓░░░░   │ ◁Enrg▓▓░",
            "📋 insdr NVDA:2  │ formD 41 AI  │ 188 wk",
            "⚖ FedCut 72%    │ Recsn 21%    │ Tarif 48%",
            "💡 liq▲ semi▲ cntgo             │ lean long",
            "",
            "🔮 calm vol, rising tide",
        ]
        .join("\n")
    }

    fn invalid_dashboard() -> String {
        // Only four dashboard lines.
        valid_dashboard().replacen("📋 insdr NVDA:2  │ formD 41 AI  │ 188 wk\n", "", 1)
    }

    #[tokio::test]
    async fn accepts_valid_first_attempt() {
        let model = Scripted::new(vec![Ok(valid_dashboard())]);
        let result = refine(&model, &MarketInfo::default(), "det").await;
        assert_eq!(result, Some(valid_dashboard()));
        assert_eq!(model.calls(), 1);

        // The opening prompt carries the raw data and deterministic text.
        let first = &model.conversations.lock().unwrap()[0];
        assert_eq!(first.len(), 1);
        assert!(first[0].content.contains("Raw market data:"));
        assert!(first[0].content.contains("det"));
    }

    #[tokio::test]
    async fn strips_code_fences_before_validating() {
        let fenced = format!("```\n{}\n```", valid_dashboard());
        let model = Scripted::new(vec![Ok(fenced)]);
        let result = refine(&model, &MarketInfo::default(), "det").await;
        assert_eq!(result, Some(valid_dashboard()));
    }

    #[tokio::test]
    async fn feeds_validator_errors_back() {
        let model = Scripted::new(vec![Ok(invalid_dashboard()), Ok(valid_dashboard())]);
        let result = refine(&model, &MarketInfo::default(), "det").await;
        assert_eq!(result, Some(valid_dashboard()));
        assert_eq!(model.calls(), 2);

        // Second attempt sees its own output plus the error feedback.
        let second = &model.conversations.lock().unwrap()[1];
        assert_eq!(second.len(), 3);
        assert_eq!(second[1].role, "assistant");
        assert!(second[2].content.contains("Formatting errors found:"));
        assert!(second[2].content.contains("Expected 5 dashboard lines, got 4"));
    }

    #[tokio::test]
    async fn gives_up_after_attempt_budget() {
        let responses = (0..MAX_ATTEMPTS).map(|_| Ok(invalid_dashboard())).collect();
        let model = Scripted::new(responses);
        let result = refine(&model, &MarketInfo::default(), "det").await;
        assert_eq!(result, None);
        assert_eq!(model.calls(), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn transport_error_aborts_loop() {
        let model = Scripted::new(vec![Err(())]);
        let result = refine(&model, &MarketInfo::default(), "det").await;
        assert_eq!(result, None);
        assert_eq!(model.calls(), 1);
    }

    #[test]
    fn strip_code_fences_variants() {
        assert_eq!(strip_code_fences("```\nbody\n```"), "body");
        assert_eq!(strip_code_fences("```text\nbody\n```"), "body");
        assert_eq!(strip_code_fences("body"), "body");
        assert_eq!(strip_code_fences("```\nbody"), "body");
    }

    #[test]
    fn data_context_shape() {
        use crate::money::polymarket::MarketPick;
        use crate::money::signals::{SectorFlow, TermStructure};

        let info = MarketInfo {
            vix: Some(14.2),
            term: TermStructure::Contango,
            flows: vec![SectorFlow {
                label: "Semi".to_string(),
                rel: 2.15,
                abs_ret: 3.0,
            }],
            markets: vec![MarketPick {
                short: "FedCut 72%".to_string(),
                full: "Will the Fed cut rates?".to_string(),
                prob: 72.0,
            }],
            ..MarketInfo::default()
        };
        let ctx = data_context(&info);
        assert_eq!(ctx["vix"], 14.2);
        assert_eq!(ctx["term_structure"], "cntgo");
        assert_eq!(ctx["flows"][0][0], "Semi");
        assert_eq!(ctx["flows"][0][1], "+2.1%");
        assert_eq!(ctx["markets"][0]["prob"], 72.0);
    }
}
