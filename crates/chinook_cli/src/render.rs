//! Text rendering for listings and failures.

use chinook_core::{
    Album, AlbumListing, Artist, CatalogPage, CatalogStats, GatewayError, RepoError,
};

const ID_WIDTH: usize = 8;
const TITLE_WIDTH: usize = 48;
const NAME_WIDTH: usize = 40;
const UNNAMED: &str = "(no name)";

pub fn album_table(page: &CatalogPage<AlbumListing>, noun: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<ID_WIDTH$} {:<TITLE_WIDTH$} {}\n",
        "ID", "Title", "Artist"
    ));
    out.push_str(&rule(ID_WIDTH + TITLE_WIDTH + NAME_WIDTH + 2));
    for album in &page.items {
        out.push_str(&format!(
            "{:<ID_WIDTH$} {:<TITLE_WIDTH$} {}\n",
            album.id,
            clip(&album.title, TITLE_WIDTH),
            clip(album.artist_name.as_deref().unwrap_or(UNNAMED), NAME_WIDTH)
        ));
    }
    out.push_str(&footer(page.items.len(), page.total, page.truncated, noun));
    out
}

pub fn artist_table(page: &CatalogPage<Artist>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<ID_WIDTH$} {}\n", "ID", "Name"));
    out.push_str(&rule(ID_WIDTH + NAME_WIDTH + 1));
    for artist in &page.items {
        out.push_str(&format!(
            "{:<ID_WIDTH$} {}\n",
            artist.id,
            clip(artist.name.as_deref().unwrap_or(UNNAMED), NAME_WIDTH)
        ));
    }
    out.push_str(&footer(page.items.len(), page.total, page.truncated, "artists"));
    out
}

pub fn album_details(album: &Album, artist_name: Option<&str>) -> String {
    format!(
        "  ID:     {}\n  Title:  {}\n  Artist: {} (ID {})",
        album.id,
        album.title,
        artist_name.unwrap_or("unknown"),
        album.artist_id
    )
}

pub fn stats(stats: &CatalogStats) -> String {
    let optional = |count: Option<i64>| count.map_or_else(|| "n/a".to_string(), |n| n.to_string());
    format!(
        "Albums:    {}\nArtists:   {}\nTracks:    {}\nCustomers: {}",
        stats.albums,
        stats.artists,
        optional(stats.tracks),
        optional(stats.customers)
    )
}

/// User-facing message for a failed operation.
pub fn failure(err: &RepoError) -> String {
    match err {
        RepoError::Validation(err) => format!("Invalid input: {err}."),
        RepoError::NotFound { entity, id } => format!("No {entity} with ID {id} exists."),
        RepoError::Gateway(GatewayError::Integrity { relationship, .. }) => format!(
            "Operation rejected: it would break the {relationship} reference. \
             Check that the artist exists and no other rows depend on the album."
        ),
        RepoError::Gateway(GatewayError::RetriesExhausted { attempts, .. }) => format!(
            "The database stayed busy after {attempts} attempts. Please try again later."
        ),
        RepoError::Gateway(GatewayError::NotConnected)
        | RepoError::Gateway(GatewayError::Connection { .. }) => {
            format!("Database connection unavailable: {err}.")
        }
        RepoError::MissingRequiredTable(_) | RepoError::MissingRequiredColumn { .. } => {
            format!("The database does not look like a Chinook catalog: {err}.")
        }
        _ => format!("Operation failed: {err}."),
    }
}

fn footer(shown: usize, total: i64, truncated: bool, noun: &str) -> String {
    let mut line = format!("Showing {shown} of {total} {noun}.\n");
    if truncated {
        line.push_str("(Row limit reached; narrow the listing to see more.)\n");
    }
    line
}

fn rule(width: usize) -> String {
    let mut line = "-".repeat(width);
    line.push('\n');
    line
}

fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut clipped = value.chars().take(width.saturating_sub(3)).collect::<String>();
    clipped.push_str("...");
    clipped
}
