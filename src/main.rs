//! clanstats terminal UI
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- [CLAN_TAG...]
//! ```
//!
//! Clans already in the database are always listed; tags given on the
//! command line are added so a first fetch can be triggered for them.
//!
//! See `Config::from_env` for environment variables.

use clanstats::{
    ui::{run_ui, Services},
    ClanTag, ClashApiClient, Config, DocumentStore, QueryProjector, RefreshService,
    SqliteDocumentStore,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    // Errors only unless RUST_LOG is set; stderr shares the terminal with the UI
    config.logger_builder().init();

    log::info!("🚀 Starting clanstats...");
    log::info!("📊 Configuration:");
    log::info!("   DB path: {}", config.db_path);
    log::info!("   API base: {}", config.api_base_url);
    if config.api_key.is_empty() {
        log::warn!("   API key: not set (updates will fail)");
    }

    let extra_clans = std::env::args()
        .skip(1)
        .map(|arg| arg.parse::<ClanTag>().map(|tag| tag.hashed()))
        .collect::<Result<Vec<_>, _>>()?;

    let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::open(&config.db_path)?);
    let source = Arc::new(ClashApiClient::from_config(&config)?);

    let services = Services {
        projector: QueryProjector::new(store.clone()),
        refresher: RefreshService::new(source, store),
        extra_clans,
    };

    if let Err(e) = run_ui(services).await {
        log::error!("UI error: {}", e);
        return Err(e);
    }

    log::info!("UI exited");
    Ok(())
}
