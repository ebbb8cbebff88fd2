//! Artist records (`artists` table).

use serde::{Deserialize, Serialize};

/// Store-assigned `artists.ArtistId`.
pub type ArtistId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    /// `artists.Name` is nullable in the catalog schema.
    pub name: Option<String>,
}

/// Ordering choices offered for artist listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtistSort {
    #[default]
    NameAsc,
    IdAsc,
    IdDesc,
}

impl ArtistSort {
    /// Menu order used by the CLI (1-based).
    pub const ALL: [ArtistSort; 3] = [Self::NameAsc, Self::IdAsc, Self::IdDesc];

    pub fn label(self) -> &'static str {
        match self {
            Self::NameAsc => "Artist Name (A-Z)",
            Self::IdAsc => "Artist ID (ascending)",
            Self::IdDesc => "Artist ID (descending)",
        }
    }
}
