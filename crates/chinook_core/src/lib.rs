//! Core logic for the Chinook catalog manager.
//! Every read and write of the catalog store goes through this crate's
//! validated query gateway.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validate;

pub use config::GatewayConfig;
pub use db::{
    create_store, GatewayError, GatewayResult, QueryOutcome, ResultSet, ValidatedQueryGateway,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::album::{Album, AlbumId, AlbumListing, AlbumSort, NewAlbum};
pub use model::artist::{Artist, ArtistId, ArtistSort};
pub use repo::album_repo::{AlbumListQuery, AlbumRepository, SqliteAlbumRepository};
pub use repo::artist_repo::{ArtistListQuery, ArtistRepository, SqliteArtistRepository};
pub use repo::{Page, RepoError, RepoResult};
pub use service::catalog_service::{AlbumEdit, CatalogPage, CatalogService, CatalogStats};
pub use validate::{
    validate_menu_choice, validate_option, validate_positive_integer, validate_string,
    Rejection, ValidationError, ValidationPolicy, ValidationResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
