//! Connection tuning shared by every SQLite handle
//!
//! - `journal_mode=WAL` - readers don't block the single writer
//! - `synchronous=NORMAL` - safe with WAL, fewer fsyncs
//! - `temp_store=MEMORY`
//! - busy timeout so a concurrent reader's lock doesn't fail a write outright

use rusqlite::Connection;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn apply_optimized_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    // journal_mode answers with the resulting mode ("memory" for :memory: databases)
    let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    log::debug!("SQLite journal_mode={}", mode);

    conn.execute_batch(
        "PRAGMA synchronous = NORMAL;
         PRAGMA temp_store = MEMORY;",
    )?;
    conn.busy_timeout(BUSY_TIMEOUT)?;

    Ok(())
}
