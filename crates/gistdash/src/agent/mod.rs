//! The pinned-gist persona job.
//!
//! Refreshes the OAuth access token (the one fatal step), gathers weather
//! and remembered state, asks the model for the next five lines, clips
//! them to the display, publishes, and writes the updated memory back.

pub mod memory;
pub mod persona;

use anyhow::{Context, Result};

use crate::clock::pacific_now;
use crate::config::AgentConfig;
use crate::gist::{GistClient, DASHBOARD_FILENAME};
use crate::http::Fetcher;
use crate::llm::{refresh_access_token, Auth, ClaudeClient, Message};
use crate::weather::{current_conditions, Conditions};
use memory::{AgentMemory, Thought, MEMORY_FILENAME};

/// Maximum tokens for a 5-line reply.
const MAX_TOKENS: u32 = 300;

/// Run the persona job. `update` pushes to the gists; otherwise the output
/// is only printed.
pub async fn run(cfg: &AgentConfig, update: bool) -> Result<()> {
    let now = pacific_now();

    let content_gist_id =
        std::env::var("AGENT_GIST_ID").context("AGENT_GIST_ID not set")?;
    let data_gist_id =
        std::env::var("AGENT_DATA_GIST_ID").context("AGENT_DATA_GIST_ID not set")?;
    let refresh_token =
        std::env::var("ANTHROPIC_REFRESH_TOKEN").context("ANTHROPIC_REFRESH_TOKEN not set")?;

    // Token refresh is the one fatal condition: without an access token
    // there is nothing to say.
    log::info!("refreshing access token");
    let access_token = refresh_access_token(&refresh_token)
        .await
        .context("token refresh failed")?;
    log::info!("token refreshed");

    let fetcher = Fetcher::new().context("build HTTP client")?;
    let weather = match current_conditions(&fetcher, cfg.latitude, cfg.longitude).await {
        Ok(c) => c,
        Err(e) => {
            log::warn!("weather fetch failed: {e}");
            Conditions::unavailable()
        }
    };

    let gist = match GistClient::from_env() {
        Ok(client) => Some(client),
        Err(e) => {
            log::warn!("gist client unavailable ({e}); memory and publish disabled");
            None
        }
    };

    let mut mem = load_memory(gist.as_ref(), &data_gist_id, now).await;
    let age = mem.age_string(now);

    let system = persona::system_prompt(&mem, &age);
    let user = persona::user_prompt(now, &weather, &mem);

    let claude = ClaudeClient::new(Auth::Bearer(access_token), &cfg.model);
    let raw = match claude
        .send(Some(&system), &[Message::user(user)], MAX_TOKENS, None)
        .await
    {
        Ok(text) => text,
        Err(e) => {
            log::error!("API error: {e}");
            persona::fallback_lines(&e.to_string(), now)
        }
    };

    let output = persona::shape_output(&raw);
    println!("{output}");

    if update {
        if let Some(client) = &gist {
            match client
                .write_file(&content_gist_id, DASHBOARD_FILENAME, &output)
                .await
            {
                Ok(()) => log::info!("content gist updated"),
                Err(e) => log::error!("content gist update failed: {e}"),
            }
        }
    }

    let mood = persona::detect_mood(&output, &mem.mood);
    let thought = Thought {
        time: now.format("%Y-%m-%d %H:%M").to_string(),
        weather: weather.compact(),
        mood: mood.clone(),
        lines: output.replace('\n', " | "),
    };
    mem.record(thought, &mood, now);

    if update {
        if let Some(client) = &gist {
            save_memory(client, &data_gist_id, &mem).await;
        }
    }

    log::info!("update #{} | mood: {}", mem.update_count, mood);
    Ok(())
}

async fn load_memory(
    gist: Option<&GistClient>,
    data_gist_id: &str,
    now: chrono::DateTime<chrono::FixedOffset>,
) -> AgentMemory {
    let Some(client) = gist else {
        return AgentMemory::newborn(now);
    };
    match client.read_file(data_gist_id, MEMORY_FILENAME).await {
        Ok(raw) => AgentMemory::parse(&raw).unwrap_or_else(|| {
            log::warn!("memory blob unparseable; starting fresh");
            AgentMemory::newborn(now)
        }),
        Err(e) => {
            log::warn!("memory read failed ({e}); starting fresh");
            AgentMemory::newborn(now)
        }
    }
}

async fn save_memory(client: &GistClient, data_gist_id: &str, mem: &AgentMemory) {
    let payload = match serde_json::to_string_pretty(mem) {
        Ok(p) => p,
        Err(e) => {
            log::error!("memory serialize failed: {e}");
            return;
        }
    };
    match client
        .write_file(data_gist_id, MEMORY_FILENAME, &payload)
        .await
    {
        Ok(()) => log::info!("memory gist updated"),
        Err(e) => log::error!("memory gist update failed: {e}"),
    }
}
