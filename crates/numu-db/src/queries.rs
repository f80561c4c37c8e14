use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::Database;
use crate::models::{SnapshotRow, UserRow};

/// Input for [`Database::create_user`].
pub struct NewUser<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub role: &'a str,
    pub password_hash: &'a str,
}

impl Database {
    // -- Users --

    pub fn create_user(&self, user: &NewUser<'_>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, name, phone, role, password)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    user.id,
                    user.email,
                    user.name,
                    user.phone,
                    user.role,
                    user.password_hash
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn email_exists(&self, email: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT 1 FROM users WHERE email = ?1", [email], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(found.is_some())
        })
    }

    // -- Snapshots --

    /// Writing the same version twice replaces the earlier payload.
    pub fn save_snapshot(&self, version: u64, payload: &str) -> Result<()> {
        let version = i64::try_from(version).context("snapshot version out of range")?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO snapshots (version, payload) VALUES (?1, ?2)",
                rusqlite::params![version, payload],
            )?;
            Ok(())
        })
    }

    pub fn latest_snapshot(&self) -> Result<Option<SnapshotRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT version, taken_at, payload FROM snapshots
                     ORDER BY version DESC LIMIT 1",
                    [],
                    snapshot_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Keeps the newest `keep` snapshots. Returns how many rows were deleted.
    pub fn prune_snapshots(&self, keep: u32) -> Result<usize> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM snapshots WHERE version NOT IN
                 (SELECT version FROM snapshots ORDER BY version DESC LIMIT ?1)",
                [keep],
            )?;
            Ok(deleted)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // `column` is always one of our own literals.
    let sql = format!(
        "SELECT id, email, name, phone, role, password, created_at FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                name: row.get(2)?,
                phone: row.get(3)?,
                role: row.get(4)?,
                password: row.get(5)?,
                created_at: row.get(6)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn snapshot_from_row(row: &Row<'_>) -> rusqlite::Result<SnapshotRow> {
    let version: i64 = row.get(0)?;
    Ok(SnapshotRow {
        version: version as u64,
        taken_at: row.get(1)?,
        payload: row.get(2)?,
    })
}
