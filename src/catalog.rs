//! # Song Catalog
//!
//! SQLite store of every song the bot can recommend. The catalog is filled
//! from a CSV export (columns `track_name`, `artist_name` or `artist`,
//! `genre`, `year`; anything else is ignored) and read back whole when the bot starts.
//!
//! ## Schema
//!
//! ```sql
//! CREATE TABLE songs (
//!     id          INTEGER PRIMARY KEY,
//!     track_name  TEXT NOT NULL,
//!     artist_name TEXT,
//!     genre       TEXT,
//!     year        INTEGER
//! )
//! ```

use crate::song::Song;
use anyhow::{Context, Result};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::{params, Connection};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// One CSV row. Only the columns the bot cares about are read.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    track_name: String,
    #[serde(default)]
    artist_name: Option<String>,
    /// Used when `artist_name` is missing or blank.
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    year: Option<i64>,
}

/// Handle on the catalog database.
#[derive(Debug)]
pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    /// Open (or create) the catalog at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open catalog database at {}", path.display()))?;
        let catalog = Self { conn };
        catalog.init_schema()?;
        debug!("Opened catalog at {}", path.display());
        Ok(catalog)
    }

    /// Catalog that lives only as long as the handle.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory catalog")?;
        let catalog = Self { conn };
        catalog.init_schema()?;
        Ok(catalog)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS songs (
                    id          INTEGER PRIMARY KEY,
                    track_name  TEXT NOT NULL,
                    artist_name TEXT,
                    genre       TEXT,
                    year        INTEGER
                );
                CREATE INDEX IF NOT EXISTS idx_songs_genre ON songs(genre);",
            )
            .context("Failed to create catalog schema")
    }

    /// Import songs from a CSV file. With `replace`, existing songs are
    /// dropped first. Returns how many songs were inserted.
    pub fn import_csv(&mut self, path: &Path, replace: bool) -> Result<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open catalog CSV {}", path.display()))?;

        let tx = self.conn.transaction()?;
        if replace {
            tx.execute("DELETE FROM songs", [])
                .context("Failed to clear existing catalog")?;
        }

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO songs (track_name, artist_name, genre, year) VALUES (?1, ?2, ?3, ?4)",
            )?;

            for (line, record) in reader.deserialize::<CatalogRecord>().enumerate() {
                // header is line 1
                let record = record
                    .with_context(|| format!("Malformed catalog row at line {}", line + 2))?;
                if record.track_name.is_empty() {
                    continue;
                }
                stmt.execute(params![
                    record.track_name,
                    non_empty(record.artist_name).or_else(|| non_empty(record.artist)),
                    non_empty(record.genre),
                    record.year,
                ])
                .with_context(|| format!("Failed to insert catalog row at line {}", line + 2))?;
                inserted += 1;
            }
        }

        tx.commit().context("Committing catalog import failed")?;
        info!("Imported {inserted} songs from {}", path.display());
        Ok(inserted)
    }

    /// Add songs directly, in one transaction.
    pub fn insert_songs(&mut self, songs: &[Song]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO songs (track_name, artist_name, genre) VALUES (?1, ?2, ?3)",
            )?;
            for song in songs {
                stmt.execute(params![song.track_name, song.artist_name, song.genre])
                    .with_context(|| format!("Failed to insert song {song}"))?;
            }
        }
        tx.commit().context("Committing song insert failed")?;
        Ok(())
    }

    /// Every song, in insertion order.
    pub fn songs(&self) -> Result<Vec<Song>> {
        let mut stmt = self
            .conn
            .prepare("SELECT track_name, artist_name, genre FROM songs ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Song {
                    track_name: row.get(0)?,
                    artist_name: row.get(1)?,
                    genre: row.get(2)?,
                })
            })
            .context("Cannot query catalog songs")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read catalog song")
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Distinct genres with their song counts, sorted by genre.
    pub fn genres(&self) -> Result<Vec<(String, usize)>> {
        let mut stmt = self.conn.prepare(
            "SELECT genre, COUNT(*) FROM songs WHERE genre IS NOT NULL GROUP BY genre ORDER BY genre",
        )?;
        let rows = stmt.query_map([], |row| {
            let count: i64 = row.get(1)?;
            Ok((row.get::<_, String>(0)?, usize::try_from(count).unwrap_or(0)))
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read genre counts")
    }
}

/// Poll candidates: the first song of each genre, then a random sample of at
/// most `n` of them without replacement, so no genre appears twice.
/// Songs without a genre are never offered.
#[must_use]
pub fn sample_by_genre<R: Rng + ?Sized>(songs: &[Song], n: usize, rng: &mut R) -> Vec<Song> {
    let mut seen: HashSet<&str> = HashSet::new();
    let representatives: Vec<&Song> = songs
        .iter()
        .filter(|song| song.genre.as_deref().is_some_and(|g| seen.insert(g)))
        .collect();

    representatives
        .choose_multiple(rng, n)
        .map(|&song| song.clone())
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
