//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide list/search/add/edit/delete/statistics entry points.
//! - Re-read rows after writes so callers see what the store holds.
//!
//! # Invariants
//! - Service APIs never bypass repository validation and existence checks.
//! - Statistics only count tables that exist in the connected store.

use crate::db::schema::{ALBUMS_TABLE, ARTISTS_TABLE};
use crate::db::ValidatedQueryGateway;
use crate::model::album::{Album, AlbumId, AlbumListing, NewAlbum};
use crate::model::artist::{Artist, ArtistId};
use crate::repo::album_repo::{AlbumListQuery, AlbumRepository, SqliteAlbumRepository};
use crate::repo::artist_repo::{ArtistListQuery, ArtistRepository, SqliteArtistRepository};
use crate::repo::{RepoError, RepoResult};
use crate::validate::{validate_string, SEARCH_TERM_MAX_CHARS};
use log::info;
use serde::{Deserialize, Serialize};

const SEARCH_TERM_FIELD: &str = "Search term";
const TRACKS_TABLE: &str = "tracks";
const CUSTOMERS_TABLE: &str = "customers";

/// One listing page plus the uncapped total it was drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage<T> {
    pub items: Vec<T>,
    pub total: i64,
    /// `true` when the gateway row cap cut the listing short.
    pub truncated: bool,
}

/// Partial album update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumEdit {
    pub album_id: AlbumId,
    pub title: Option<String>,
    pub artist_id: Option<ArtistId>,
}

/// Row counts for the catalog overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub albums: i64,
    pub artists: i64,
    /// `None` when the store has no `tracks` table.
    pub tracks: Option<i64>,
    /// `None` when the store has no `customers` table.
    pub customers: Option<i64>,
}

/// Use-case service over a connected gateway.
pub struct CatalogService<'g> {
    gateway: &'g mut ValidatedQueryGateway,
}

impl<'g> CatalogService<'g> {
    pub fn new(gateway: &'g mut ValidatedQueryGateway) -> Self {
        Self { gateway }
    }

    fn albums(&mut self) -> RepoResult<SqliteAlbumRepository<'_>> {
        SqliteAlbumRepository::try_new(&mut *self.gateway)
    }

    fn artists(&mut self) -> RepoResult<SqliteArtistRepository<'_>> {
        SqliteArtistRepository::try_new(&mut *self.gateway)
    }

    /// Lists albums joined with artist names.
    pub fn list_albums(&mut self, query: &AlbumListQuery) -> RepoResult<CatalogPage<AlbumListing>> {
        let mut repo = self.albums()?;
        let total = repo.count_albums()?;
        let page = repo.list_albums(query)?;
        Ok(CatalogPage {
            items: page.items,
            total,
            truncated: page.truncated,
        })
    }

    pub fn list_artists(&mut self, query: &ArtistListQuery) -> RepoResult<CatalogPage<Artist>> {
        let mut repo = self.artists()?;
        let total = repo.count_artists()?;
        let page = repo.list_artists(query)?;
        Ok(CatalogPage {
            items: page.items,
            total,
            truncated: page.truncated,
        })
    }

    pub fn get_album(&mut self, id: AlbumId) -> RepoResult<Option<Album>> {
        self.albums()?.get_album(id)
    }

    pub fn get_artist(&mut self, id: ArtistId) -> RepoResult<Option<Artist>> {
        self.artists()?.get_artist(id)
    }

    /// Inserts an album and returns the stored row.
    ///
    /// # Errors
    /// - `RepoError::Validation` for a bad title or artist id.
    /// - Integrity error when the artist does not exist; nothing is inserted.
    pub fn add_album(&mut self, title: &str, artist_id: ArtistId) -> RepoResult<Album> {
        let mut repo = self.albums()?;
        let id = repo.create_album(&NewAlbum::new(title, artist_id))?;
        info!("event=album_create module=service status=ok album_id={id}");
        reread_album(&mut repo, id)
    }

    /// Applies a partial update and returns the stored row.
    pub fn edit_album(&mut self, edit: &AlbumEdit) -> RepoResult<Album> {
        let mut repo = self.albums()?;
        let current = repo.get_album(edit.album_id)?.ok_or(RepoError::NotFound {
            entity: "album",
            id: edit.album_id,
        })?;

        let updated = Album {
            id: current.id,
            title: edit.title.clone().unwrap_or(current.title),
            artist_id: edit.artist_id.unwrap_or(current.artist_id),
        };
        repo.update_album(&updated)?;
        info!(
            "event=album_update module=service status=ok album_id={}",
            updated.id
        );
        reread_album(&mut repo, updated.id)
    }

    /// Deletes an album and returns the row as it was before deletion.
    pub fn delete_album(&mut self, id: AlbumId) -> RepoResult<Album> {
        let mut repo = self.albums()?;
        let current = repo
            .get_album(id)?
            .ok_or(RepoError::NotFound { entity: "album", id })?;
        repo.delete_album(id)?;
        info!("event=album_delete module=service status=ok album_id={id}");
        Ok(current)
    }

    /// Searches album titles and artist names for `term`.
    pub fn search_albums(&mut self, term: &str) -> RepoResult<CatalogPage<AlbumListing>> {
        let term = validate_string(term, SEARCH_TERM_FIELD, SEARCH_TERM_MAX_CHARS)?;
        let mut repo = self.albums()?;
        let total = repo.count_search_matches(&term)?;
        let page = repo.search_albums(&term, None)?;
        Ok(CatalogPage {
            items: page.items,
            total,
            truncated: page.truncated,
        })
    }

    pub fn stats(&mut self) -> RepoResult<CatalogStats> {
        Ok(CatalogStats {
            albums: self.gateway.count_rows(ALBUMS_TABLE)?,
            artists: self.gateway.count_rows(ARTISTS_TABLE)?,
            tracks: self.optional_count(TRACKS_TABLE)?,
            customers: self.optional_count(CUSTOMERS_TABLE)?,
        })
    }

    fn optional_count(&mut self, table: &str) -> RepoResult<Option<i64>> {
        if !self.gateway.table_exists(table)? {
            return Ok(None);
        }
        Ok(Some(self.gateway.count_rows(table)?))
    }
}

fn reread_album(repo: &mut SqliteAlbumRepository<'_>, id: AlbumId) -> RepoResult<Album> {
    repo.get_album(id)?
        .ok_or(RepoError::NotFound { entity: "album", id })
}
