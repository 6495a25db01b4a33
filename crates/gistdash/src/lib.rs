//! Scheduled jobs that refresh pinned GitHub gist dashboards.
//!
//! Three independent batch jobs, each a single fetch → format → validate →
//! publish pass driven by an external scheduler:
//!
//! - [`agent`]: an LLM-voiced persona living in a 5-line pinned gist, with
//!   a JSON memory blob in a second gist.
//! - [`clouds`]: a Bay Area cloud-cover GeoJSON map from ECMWF IFS
//!   forecasts.
//! - [`money`]: a multi-source financial dashboard rendered under a strict
//!   visual-width contract, optionally rewritten by a language model with
//!   bounded validator-feedback retries.
//!
//! Per-source fetch failures degrade to placeholders; a failing API never
//! aborts a run. The one fatal condition is OAuth token-refresh failure in
//! the agent job.

pub mod agent;
pub mod clock;
pub mod clouds;
pub mod config;
pub mod dashboard;
pub mod gist;
pub mod http;
pub mod llm;
pub mod money;
pub mod weather;
pub mod width;
