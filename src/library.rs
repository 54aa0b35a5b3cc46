//! Local library snapshot loading.
//!
//! The snapshot is produced elsewhere (a media scanner, a player database
//! export) and read here once per run. Two formats are accepted:
//! - `.json`: an array of [`LibraryRecord`] objects
//! - anything else: a SQLite database with a `tracks` table

use anyhow::{Context, Result};
use log::info;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

use crate::models::LibraryRecord;

const SELECT_TRACKS: &str = "SELECT id, title, artist, album, duration_ms, path, size
     FROM tracks
     ORDER BY id";

/// Load every record of a library snapshot, in snapshot order.
pub fn load_library(path: &Path) -> Result<Vec<LibraryRecord>> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let records = if is_json {
        load_json(path)?
    } else {
        load_sqlite(path)?
    };

    info!("Loaded {} library records from {}", records.len(), path.display());
    Ok(records)
}

fn load_json(path: &Path) -> Result<Vec<LibraryRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read library snapshot {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse library snapshot {}", path.display()))
}

fn load_sqlite(path: &Path) -> Result<Vec<LibraryRecord>> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("Failed to open library database {}", path.display()))?;
    read_tracks(&conn)
}

/// Read the `tracks` table. NULL text columns become empty strings.
pub fn read_tracks(conn: &Connection) -> Result<Vec<LibraryRecord>> {
    let mut stmt = conn
        .prepare(SELECT_TRACKS)
        .context("Library database has no usable tracks table")?;

    let mut records = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let title: Option<String> = row.get(1)?;
        let artist: Option<String> = row.get(2)?;
        let album: Option<String> = row.get(3)?;
        let duration_ms: Option<i64> = row.get(4)?;
        let size: Option<i64> = row.get(6)?;
        records.push(LibraryRecord {
            id: row.get(0)?,
            title: title.unwrap_or_default(),
            artist: artist.unwrap_or_default(),
            album: album.unwrap_or_default(),
            duration_ms: duration_ms.unwrap_or(0),
            path: row.get(5)?,
            size: size.unwrap_or(0).max(0) as u64,
        });
    }
    Ok(records)
}
