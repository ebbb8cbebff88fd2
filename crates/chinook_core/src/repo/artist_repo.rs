//! Artist repository contract and gateway-backed implementation.

use crate::db::schema::{ARTISTS_TABLE, ARTIST_ID_COLUMN, REQUIRED_ARTIST_COLUMNS};
use crate::db::ValidatedQueryGateway;
use crate::model::album::ARTIST_ID_FIELD;
use crate::model::artist::{Artist, ArtistId, ArtistSort};
use crate::repo::{
    ensure_table_shape, integer_at, limit_value, optional_text_at, Page, RepoResult,
};
use crate::validate::validate_positive_integer;
use rusqlite::types::Value;

/// Query options for artist listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtistListQuery {
    pub sort: ArtistSort,
    /// `None` lists up to the gateway row cap.
    pub limit: Option<u32>,
}

/// Repository interface for artist reads.
pub trait ArtistRepository {
    fn get_artist(&mut self, id: ArtistId) -> RepoResult<Option<Artist>>;
    fn artist_exists(&mut self, id: ArtistId) -> RepoResult<bool>;
    fn list_artists(&mut self, query: &ArtistListQuery) -> RepoResult<Page<Artist>>;
    fn count_artists(&mut self) -> RepoResult<i64>;
}

pub struct SqliteArtistRepository<'g> {
    gateway: &'g mut ValidatedQueryGateway,
}

impl<'g> SqliteArtistRepository<'g> {
    pub fn try_new(gateway: &'g mut ValidatedQueryGateway) -> RepoResult<Self> {
        ensure_table_shape(gateway, ARTISTS_TABLE, REQUIRED_ARTIST_COLUMNS)?;
        Ok(Self { gateway })
    }
}

impl ArtistRepository for SqliteArtistRepository<'_> {
    fn get_artist(&mut self, id: ArtistId) -> RepoResult<Option<Artist>> {
        let id = validate_positive_integer(&id, ARTIST_ID_FIELD)?;
        let rows = self.gateway.query(
            "SELECT ArtistId, Name FROM artists WHERE ArtistId = ?1;",
            &[Value::Integer(id)],
        )?;
        rows.rows.first().map(|row| parse_artist_row(row)).transpose()
    }

    fn artist_exists(&mut self, id: ArtistId) -> RepoResult<bool> {
        Ok(self.gateway.exists(ARTISTS_TABLE, ARTIST_ID_COLUMN, id)?)
    }

    fn list_artists(&mut self, query: &ArtistListQuery) -> RepoResult<Page<Artist>> {
        let statement = format!(
            "SELECT ArtistId, Name FROM artists ORDER BY {} LIMIT ?1;",
            artist_order_clause(query.sort)
        );
        let rows = self.gateway.query(&statement, &[limit_value(query.limit)])?;
        let items = rows
            .rows
            .iter()
            .map(|row| parse_artist_row(row))
            .collect::<RepoResult<Vec<_>>>()?;
        Ok(Page {
            items,
            truncated: rows.truncated,
        })
    }

    fn count_artists(&mut self) -> RepoResult<i64> {
        Ok(self.gateway.count_rows(ARTISTS_TABLE)?)
    }
}

fn artist_order_clause(sort: ArtistSort) -> &'static str {
    match sort {
        ArtistSort::NameAsc => "Name ASC, ArtistId ASC",
        ArtistSort::IdAsc => "ArtistId ASC",
        ArtistSort::IdDesc => "ArtistId DESC",
    }
}

fn parse_artist_row(row: &[Value]) -> RepoResult<Artist> {
    Ok(Artist {
        id: integer_at(row, 0, "artists.ArtistId")?,
        name: optional_text_at(row, 1, "artists.Name")?,
    })
}
