//! Bundled catalog schema and required-shape descriptors.
//!
//! # Invariants
//! - Schema statements are idempotent (`IF NOT EXISTS`).
//! - Table and column names here are the only identifiers repositories
//!   interpolate into statement text.

use super::{GatewayError, GatewayResult};
use rusqlite::Connection;

/// Schema applied by [`super::create_store`].
pub const CATALOG_SCHEMA_SQL: &str = include_str!("catalog_schema.sql");

pub const ALBUMS_TABLE: &str = "albums";
pub const ALBUM_ID_COLUMN: &str = "AlbumId";
pub const ALBUM_TITLE_COLUMN: &str = "Title";
pub const ALBUM_ARTIST_COLUMN: &str = "ArtistId";

pub const ARTISTS_TABLE: &str = "artists";
pub const ARTIST_ID_COLUMN: &str = "ArtistId";
pub const ARTIST_NAME_COLUMN: &str = "Name";

/// Foreign key from `albums.ArtistId` to `artists.ArtistId`.
pub const ALBUM_ARTIST_RELATIONSHIP: &str = "albums.ArtistId -> artists.ArtistId";

/// Columns each repository depends on, keyed by table.
pub const REQUIRED_ALBUM_COLUMNS: &[&str] =
    &[ALBUM_ID_COLUMN, ALBUM_TITLE_COLUMN, ALBUM_ARTIST_COLUMN];
pub const REQUIRED_ARTIST_COLUMNS: &[&str] = &[ARTIST_ID_COLUMN, ARTIST_NAME_COLUMN];

pub(crate) fn apply_catalog_schema(conn: &Connection) -> GatewayResult<()> {
    conn.execute_batch(CATALOG_SCHEMA_SQL)
        .map_err(GatewayError::Store)
}
