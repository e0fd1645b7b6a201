//! Headless refresh - fetch and merge river race logs without the UI
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin refresh -- '#2PP' '#9ABC'
//! ```
//!
//! With no arguments every clan already in the database is refreshed.
//! Exits non-zero if any clan failed with a structural or storage error;
//! a clan whose fetch failed is logged and skipped.

use clanstats::{
    ClanTag, ClashApiClient, Config, DocumentStore, RefreshOutcome, RefreshService,
    SqliteDocumentStore,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = Config::from_env()?;
    let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::open(&config.db_path)?);

    let tags: Vec<String> = {
        let args: Vec<String> = std::env::args().skip(1).collect();
        if args.is_empty() {
            store.list_collection_names()?
        } else {
            args
        }
    };

    if tags.is_empty() {
        log::warn!("No clans given and none stored yet. Usage: refresh <CLAN_TAG>...");
        return Ok(());
    }

    let clans = tags
        .iter()
        .map(|t| t.parse::<ClanTag>())
        .collect::<Result<Vec<_>, _>>()?;

    let source = Arc::new(ClashApiClient::from_config(&config)?);
    let service = RefreshService::new(source, store);

    let mut failures = 0usize;
    for clan in &clans {
        match service.refresh(clan).await {
            Ok(RefreshOutcome::Updated { seasons, players }) => {
                log::info!("   └─ {}: {} seasons, {} players", clan, seasons.len(), players);
            }
            Ok(RefreshOutcome::NoData { reason }) => {
                log::warn!("   └─ {}: no data ({})", clan, reason);
            }
            Err(e) => {
                log::error!("   └─ {}: {}", clan, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!("{} of {} clans failed", failures, clans.len()).into());
    }

    Ok(())
}
