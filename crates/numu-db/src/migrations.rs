use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
            name        TEXT NOT NULL,
            phone       TEXT,
            role        TEXT NOT NULL,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per persisted marketplace version
        CREATE TABLE IF NOT EXISTS snapshots (
            version     INTEGER PRIMARY KEY,
            taken_at    TEXT NOT NULL DEFAULT (datetime('now')),
            payload     TEXT NOT NULL
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
