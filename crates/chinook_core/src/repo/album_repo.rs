//! Album repository contract and gateway-backed implementation.
//!
//! # Responsibility
//! - Provide CRUD, listing and search over `albums`.
//! - Enforce the `albums.ArtistId -> artists.ArtistId` reference before
//!   writes.
//!
//! # Invariants
//! - ORDER BY clauses come from `AlbumSort`, never from caller text.
//! - Create/update reject a missing artist with an integrity error and leave
//!   the table untouched.

use crate::db::schema::{
    ALBUMS_TABLE, ALBUM_ARTIST_RELATIONSHIP, ALBUM_ID_COLUMN, ARTISTS_TABLE, ARTIST_ID_COLUMN,
    REQUIRED_ALBUM_COLUMNS, REQUIRED_ARTIST_COLUMNS,
};
use crate::db::{GatewayError, ValidatedQueryGateway};
use crate::model::album::{Album, AlbumId, AlbumListing, AlbumSort, NewAlbum, ALBUM_ID_FIELD};
use crate::repo::{
    ensure_table_shape, integer_at, limit_value, optional_text_at, text_at, Page, RepoError,
    RepoResult,
};
use crate::validate::validate_positive_integer;
use rusqlite::types::Value;

const ALBUM_ENTITY: &str = "album";

const ALBUM_LISTING_SQL: &str = "SELECT
    albums.AlbumId,
    albums.Title,
    artists.Name
FROM albums
JOIN artists ON albums.ArtistId = artists.ArtistId";

const SEARCH_FILTER_SQL: &str = "WHERE albums.Title LIKE ?1 OR artists.Name LIKE ?1";

/// Query options for album listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlbumListQuery {
    pub sort: AlbumSort,
    /// `None` lists up to the gateway row cap.
    pub limit: Option<u32>,
}

/// Repository interface for album operations.
pub trait AlbumRepository {
    fn create_album(&mut self, album: &NewAlbum) -> RepoResult<AlbumId>;
    fn get_album(&mut self, id: AlbumId) -> RepoResult<Option<Album>>;
    fn update_album(&mut self, album: &Album) -> RepoResult<()>;
    fn delete_album(&mut self, id: AlbumId) -> RepoResult<()>;
    fn list_albums(&mut self, query: &AlbumListQuery) -> RepoResult<Page<AlbumListing>>;
    /// Case-insensitive substring match on album title or artist name.
    fn search_albums(&mut self, term: &str, limit: Option<u32>) -> RepoResult<Page<AlbumListing>>;
    /// Number of albums [`Self::search_albums`] would match without a cap.
    fn count_search_matches(&mut self, term: &str) -> RepoResult<i64>;
    fn count_albums(&mut self) -> RepoResult<i64>;
}

/// Album repository issuing every statement through the gateway.
pub struct SqliteAlbumRepository<'g> {
    gateway: &'g mut ValidatedQueryGateway,
}

impl<'g> SqliteAlbumRepository<'g> {
    /// Builds a repository after checking `albums` and `artists` have the
    /// columns it relies on.
    pub fn try_new(gateway: &'g mut ValidatedQueryGateway) -> RepoResult<Self> {
        ensure_table_shape(gateway, ALBUMS_TABLE, REQUIRED_ALBUM_COLUMNS)?;
        ensure_table_shape(gateway, ARTISTS_TABLE, REQUIRED_ARTIST_COLUMNS)?;
        Ok(Self { gateway })
    }

    fn ensure_artist_exists(&mut self, artist_id: i64) -> RepoResult<()> {
        if self
            .gateway
            .exists(ARTISTS_TABLE, ARTIST_ID_COLUMN, artist_id)?
        {
            Ok(())
        } else {
            Err(GatewayError::missing_reference(ALBUM_ARTIST_RELATIONSHIP, artist_id).into())
        }
    }

    fn ensure_album_exists(&mut self, id: AlbumId) -> RepoResult<()> {
        if self.gateway.exists(ALBUMS_TABLE, ALBUM_ID_COLUMN, id)? {
            Ok(())
        } else {
            Err(RepoError::NotFound {
                entity: ALBUM_ENTITY,
                id,
            })
        }
    }

    fn fetch_listings(
        &mut self,
        statement: &str,
        parameters: &[Value],
    ) -> RepoResult<Page<AlbumListing>> {
        let rows = self.gateway.query(statement, parameters)?;
        let items = rows
            .rows
            .iter()
            .map(|row| parse_listing_row(row))
            .collect::<RepoResult<Vec<_>>>()?;
        Ok(Page {
            items,
            truncated: rows.truncated,
        })
    }
}

impl AlbumRepository for SqliteAlbumRepository<'_> {
    fn create_album(&mut self, album: &NewAlbum) -> RepoResult<AlbumId> {
        let album = album.validated()?;
        self.ensure_artist_exists(album.artist_id)?;

        let (_, id) = self
            .gateway
            .execute(
                "INSERT INTO albums (Title, ArtistId) VALUES (?1, ?2);",
                &[Value::Text(album.title), Value::Integer(album.artist_id)],
            )?
            .into_written()?;
        Ok(id)
    }

    fn get_album(&mut self, id: AlbumId) -> RepoResult<Option<Album>> {
        let id = validate_positive_integer(&id, ALBUM_ID_FIELD)?;
        let rows = self.gateway.query(
            "SELECT AlbumId, Title, ArtistId FROM albums WHERE AlbumId = ?1;",
            &[Value::Integer(id)],
        )?;

        rows.rows.first().map(|row| parse_album_row(row)).transpose()
    }

    fn update_album(&mut self, album: &Album) -> RepoResult<()> {
        let mut album = album.clone();
        album.validate()?;
        self.ensure_album_exists(album.id)?;
        self.ensure_artist_exists(album.artist_id)?;

        let (changed, _) = self
            .gateway
            .execute(
                "UPDATE albums SET Title = ?1, ArtistId = ?2 WHERE AlbumId = ?3;",
                &[
                    Value::Text(album.title),
                    Value::Integer(album.artist_id),
                    Value::Integer(album.id),
                ],
            )?
            .into_written()?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: ALBUM_ENTITY,
                id: album.id,
            });
        }
        Ok(())
    }

    fn delete_album(&mut self, id: AlbumId) -> RepoResult<()> {
        let id = validate_positive_integer(&id, ALBUM_ID_FIELD)?;
        self.ensure_album_exists(id)?;

        let (changed, _) = self
            .gateway
            .execute("DELETE FROM albums WHERE AlbumId = ?1;", &[Value::Integer(id)])?
            .into_written()?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: ALBUM_ENTITY,
                id,
            });
        }
        Ok(())
    }

    fn list_albums(&mut self, query: &AlbumListQuery) -> RepoResult<Page<AlbumListing>> {
        let statement = format!(
            "{ALBUM_LISTING_SQL} ORDER BY {} LIMIT ?1;",
            album_order_clause(query.sort)
        );
        self.fetch_listings(&statement, &[limit_value(query.limit)])
    }

    fn search_albums(&mut self, term: &str, limit: Option<u32>) -> RepoResult<Page<AlbumListing>> {
        let statement = format!(
            "{ALBUM_LISTING_SQL}
             {SEARCH_FILTER_SQL}
             ORDER BY albums.Title ASC, albums.AlbumId ASC
             LIMIT ?2;"
        );
        self.fetch_listings(&statement, &[search_pattern(term), limit_value(limit)])
    }

    fn count_search_matches(&mut self, term: &str) -> RepoResult<i64> {
        let statement = format!(
            "SELECT COUNT(*)
             FROM albums
             JOIN artists ON albums.ArtistId = artists.ArtistId
             {SEARCH_FILTER_SQL};"
        );
        let rows = self.gateway.query(&statement, &[search_pattern(term)])?;
        rows.scalar_i64()
            .ok_or_else(|| RepoError::InvalidData("search count returned no integer".to_string()))
    }

    fn count_albums(&mut self) -> RepoResult<i64> {
        Ok(self.gateway.count_rows(ALBUMS_TABLE)?)
    }
}

fn search_pattern(term: &str) -> Value {
    Value::Text(format!("%{term}%"))
}

fn album_order_clause(sort: AlbumSort) -> &'static str {
    match sort {
        AlbumSort::IdAsc => "albums.AlbumId ASC",
        AlbumSort::TitleAsc => "albums.Title ASC, albums.AlbumId ASC",
        AlbumSort::ArtistNameAsc => "artists.Name ASC, albums.AlbumId ASC",
        AlbumSort::IdDesc => "albums.AlbumId DESC",
    }
}

fn parse_album_row(row: &[Value]) -> RepoResult<Album> {
    Ok(Album {
        id: integer_at(row, 0, "albums.AlbumId")?,
        title: text_at(row, 1, "albums.Title")?,
        artist_id: integer_at(row, 2, "albums.ArtistId")?,
    })
}

fn parse_listing_row(row: &[Value]) -> RepoResult<AlbumListing> {
    Ok(AlbumListing {
        id: integer_at(row, 0, "albums.AlbumId")?,
        title: text_at(row, 1, "albums.Title")?,
        artist_name: optional_text_at(row, 2, "artists.Name")?,
    })
}
