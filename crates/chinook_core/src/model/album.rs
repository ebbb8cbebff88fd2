//! Album records (`albums` table) and their write-side validation.
//!
//! # Invariants
//! - `NewAlbum::validate` and `Album::validate` run before every write.
//! - `artist_id` must reference an existing artist; that check needs the
//!   store and lives in the album repository.

use crate::model::artist::ArtistId;
use crate::validate::{
    validate_positive_integer, ValidationPolicy, ValidationResult, TITLE_MAX_CHARS,
};
use serde::{Deserialize, Serialize};

/// Store-assigned `albums.AlbumId`.
pub type AlbumId = i64;

pub const TITLE_FIELD: &str = "Album title";
pub const ARTIST_ID_FIELD: &str = "Artist ID";
pub const ALBUM_ID_FIELD: &str = "Album ID";

/// Persisted album row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    pub artist_id: ArtistId,
}

impl Album {
    /// Checks identifiers and title; normalizes the title in place.
    pub fn validate(&mut self) -> ValidationResult<()> {
        validate_positive_integer(&self.id, ALBUM_ID_FIELD)?;
        validate_positive_integer(&self.artist_id, ARTIST_ID_FIELD)?;
        self.title = title_policy().validate_string(&self.title, TITLE_FIELD)?;
        Ok(())
    }
}

/// Album insert request; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAlbum {
    pub title: String,
    pub artist_id: ArtistId,
}

impl NewAlbum {
    pub fn new(title: impl Into<String>, artist_id: ArtistId) -> Self {
        Self {
            title: title.into(),
            artist_id,
        }
    }

    /// Returns a normalized copy ready for persistence.
    pub fn validated(&self) -> ValidationResult<NewAlbum> {
        Ok(NewAlbum {
            title: title_policy().validate_string(&self.title, TITLE_FIELD)?,
            artist_id: validate_positive_integer(&self.artist_id, ARTIST_ID_FIELD)?,
        })
    }
}

/// Joined read model used by listings and search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumListing {
    pub id: AlbumId,
    pub title: String,
    pub artist_name: Option<String>,
}

/// Ordering choices offered for album listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlbumSort {
    #[default]
    IdAsc,
    TitleAsc,
    ArtistNameAsc,
    IdDesc,
}

impl AlbumSort {
    /// Menu order used by the CLI (1-based).
    pub const ALL: [AlbumSort; 4] = [
        Self::IdAsc,
        Self::TitleAsc,
        Self::ArtistNameAsc,
        Self::IdDesc,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::IdAsc => "Album ID",
            Self::TitleAsc => "Album Title (A-Z)",
            Self::ArtistNameAsc => "Artist Name (A-Z)",
            Self::IdDesc => "Album ID (descending)",
        }
    }
}

fn title_policy() -> ValidationPolicy {
    ValidationPolicy::default().with_max_length(TITLE_MAX_CHARS)
}
