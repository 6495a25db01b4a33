//! The cloud-cover map job.
//!
//! Fetches the forecast grid and home conditions, assembles the GeoJSON,
//! prints it to stdout, and optionally patches it into a gist file. Fetch
//! failures degrade to a clear map rather than aborting.

pub mod geojson;
pub mod grid;

use anyhow::{Context, Result};

use crate::clock::pacific_now;
use crate::config::CloudsConfig;
use crate::gist::GistClient;
use crate::http::Fetcher;
use grid::HomeConditions;

/// Filename for the published map.
const GEOJSON_FILENAME: &str = "clouds.geojson";

/// Run the cloud-cover job. `update` also patches the gist named by
/// `CLOUD_GIST_ID`.
pub async fn run(cfg: &CloudsConfig, update: bool) -> Result<()> {
    let fetcher = Fetcher::new().context("build HTTP client")?;
    let now = pacific_now().naive_local();

    let grid = match grid::fetch_cloud_grid(&fetcher, cfg, now).await {
        Ok(points) => points,
        Err(e) => {
            log::warn!("cloud cover fetch failed: {e}");
            grid::grid_points(cfg)
        }
    };

    let home = match grid::fetch_home_conditions(&fetcher, cfg, now).await {
        Ok(conditions) => conditions,
        Err(e) => {
            log::warn!("home conditions fetch failed: {e}");
            HomeConditions::zeroed()
        }
    };

    let fc = geojson::build_feature_collection(&grid, &home, cfg);
    let rendered = serde_json::to_string_pretty(&fc).context("serialize GeoJSON")?;
    println!("{rendered}");

    if update {
        let Ok(gist_id) = std::env::var("CLOUD_GIST_ID") else {
            log::warn!("CLOUD_GIST_ID not set; skipping gist update");
            return Ok(());
        };
        let client = GistClient::from_env().context("gist client")?;
        client
            .write_file(&gist_id, GEOJSON_FILENAME, &rendered)
            .await
            .context("gist update failed")?;
        log::info!("cloud map gist updated");
    }

    Ok(())
}
