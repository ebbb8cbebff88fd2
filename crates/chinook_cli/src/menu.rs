//! Interactive main menu.
//!
//! # Responsibility
//! - Map menu choices to catalog service calls.
//! - Collect and validate every value before the service sees it.
//!
//! # Invariants
//! - Typed failures are rendered and the menu continues, except when the
//!   store connection is gone.

use crate::prompt::{Answer, Prompter};
use crate::render;
use anyhow::{bail, Result};
use chinook_core::model::album::{ALBUM_ID_FIELD, ARTIST_ID_FIELD, TITLE_FIELD};
use chinook_core::validate::{SEARCH_TERM_MAX_CHARS, TITLE_MAX_CHARS};
use chinook_core::{
    validate_menu_choice, validate_option, validate_positive_integer, validate_string,
    AlbumEdit, AlbumListQuery, AlbumSort, ArtistListQuery, ArtistSort, CatalogService,
    Rejection, RepoError, ValidatedQueryGateway, ValidationError, ValidationResult,
};
use log::info;
use std::io::{BufRead, Write};

const MENU: &str = "
=== Chinook Catalog ===
1. List albums
2. List artists
3. Add album
4. Edit album
5. Delete album
6. Search albums
7. Statistics
8. Exit";

const DISPLAY_OPTIONS: &[&str] = &["all", "limit"];
const ROW_LIMIT_FIELD: &str = "Row limit";
const SEARCH_TERM_FIELD: &str = "Search term";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    ListAlbums,
    ListArtists,
    AddAlbum,
    EditAlbum,
    DeleteAlbum,
    SearchAlbums,
    Statistics,
    Exit,
}

impl MenuChoice {
    const ALL: [MenuChoice; 8] = [
        Self::ListAlbums,
        Self::ListArtists,
        Self::AddAlbum,
        Self::EditAlbum,
        Self::DeleteAlbum,
        Self::SearchAlbums,
        Self::Statistics,
        Self::Exit,
    ];

    fn parse(raw: &str) -> ValidationResult<Self> {
        let index = validate_menu_choice(raw, 1, Self::ALL.len() as i64)?;
        Ok(Self::ALL[(index - 1) as usize])
    }
}

/// Runs the menu until the user exits or input ends.
///
/// # Errors
/// - Terminal I/O failures.
/// - The store connection was lost during an operation.
pub fn run<R: BufRead, W: Write>(
    gateway: &mut ValidatedQueryGateway,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    loop {
        prompter.say(MENU)?;
        let Some(choice) = prompter.ask("Enter choice (1-8): ", MenuChoice::parse)? else {
            break;
        };
        if choice == MenuChoice::Exit {
            break;
        }

        let mut service = CatalogService::new(gateway);
        let outcome = match choice {
            MenuChoice::ListAlbums => list_albums(&mut service, prompter)?,
            MenuChoice::ListArtists => list_artists(&mut service, prompter)?,
            MenuChoice::AddAlbum => add_album(&mut service, prompter)?,
            MenuChoice::EditAlbum => edit_album(&mut service, prompter)?,
            MenuChoice::DeleteAlbum => delete_album(&mut service, prompter)?,
            MenuChoice::SearchAlbums => search_albums(&mut service, prompter)?,
            MenuChoice::Statistics => show_stats(&mut service, prompter)?,
            MenuChoice::Exit => Ok(()),
        };

        if let Err(err) = outcome {
            prompter.say(render::failure(&err))?;
            if !gateway.is_connected() {
                bail!("lost connection to the catalog store: {err}");
            }
        }
    }

    prompter.say("Goodbye!")?;
    info!("event=session_end module=cli status=ok");
    Ok(())
}

/// Result of one menu action: outer error is terminal I/O, inner is the
/// catalog failure to render.
type Action = Result<Result<(), RepoError>>;

fn list_albums<R: BufRead, W: Write>(
    service: &mut CatalogService<'_>,
    prompter: &mut Prompter<R, W>,
) -> Action {
    for (index, sort) in AlbumSort::ALL.iter().enumerate() {
        prompter.say(format!("{}. {}", index + 1, sort.label()))?;
    }
    let sort = match prompter.ask_or_keep("Sort option (1-4, Enter for default): ", |raw| {
        let index = validate_menu_choice(raw, 1, AlbumSort::ALL.len() as i64)?;
        Ok(AlbumSort::ALL[(index - 1) as usize])
    })? {
        Answer::Value(sort) => sort,
        Answer::Keep => AlbumSort::default(),
        Answer::Cancelled => return Ok(Ok(())),
    };
    let Some(limit) = ask_display_limit(prompter)? else {
        return Ok(Ok(()));
    };

    let page = match service.list_albums(&AlbumListQuery { sort, limit }) {
        Ok(page) => page,
        Err(err) => return Ok(Err(err)),
    };
    write!(prompter.output(), "{}", render::album_table(&page, "albums"))?;
    Ok(Ok(()))
}

fn list_artists<R: BufRead, W: Write>(
    service: &mut CatalogService<'_>,
    prompter: &mut Prompter<R, W>,
) -> Action {
    for (index, sort) in ArtistSort::ALL.iter().enumerate() {
        prompter.say(format!("{}. {}", index + 1, sort.label()))?;
    }
    let sort = match prompter.ask_or_keep("Sort option (1-3, Enter for default): ", |raw| {
        let index = validate_menu_choice(raw, 1, ArtistSort::ALL.len() as i64)?;
        Ok(ArtistSort::ALL[(index - 1) as usize])
    })? {
        Answer::Value(sort) => sort,
        Answer::Keep => ArtistSort::default(),
        Answer::Cancelled => return Ok(Ok(())),
    };
    let Some(limit) = ask_display_limit(prompter)? else {
        return Ok(Ok(()));
    };

    let page = match service.list_artists(&ArtistListQuery { sort, limit }) {
        Ok(page) => page,
        Err(err) => return Ok(Err(err)),
    };
    write!(prompter.output(), "{}", render::artist_table(&page))?;
    Ok(Ok(()))
}

fn add_album<R: BufRead, W: Write>(
    service: &mut CatalogService<'_>,
    prompter: &mut Prompter<R, W>,
) -> Action {
    let Some(title) = prompter.ask("Album title: ", |raw| {
        validate_string(raw, TITLE_FIELD, TITLE_MAX_CHARS)
    })?
    else {
        return Ok(Ok(()));
    };
    let Some(artist_id) = prompter.ask("Artist ID: ", |raw| {
        validate_positive_integer(raw, ARTIST_ID_FIELD)
    })?
    else {
        return Ok(Ok(()));
    };

    let album = match service.add_album(&title, artist_id) {
        Ok(album) => album,
        Err(err) => return Ok(Err(err)),
    };
    prompter.say(format!(
        "Album added with ID {}: {}",
        album.id, album.title
    ))?;
    Ok(Ok(()))
}

fn edit_album<R: BufRead, W: Write>(
    service: &mut CatalogService<'_>,
    prompter: &mut Prompter<R, W>,
) -> Action {
    let Some(album_id) = ask_album_id(prompter)? else {
        return Ok(Ok(()));
    };
    let current = match service.get_album(album_id) {
        Ok(Some(album)) => album,
        Ok(None) => {
            return Ok(Err(RepoError::NotFound {
                entity: "album",
                id: album_id,
            }))
        }
        Err(err) => return Ok(Err(err)),
    };
    let artist_name = match service.get_artist(current.artist_id) {
        Ok(artist) => artist.and_then(|artist| artist.name),
        Err(err) => return Ok(Err(err)),
    };
    prompter.say("Current album:")?;
    prompter.say(render::album_details(&current, artist_name.as_deref()))?;
    prompter.say("Press Enter to keep the current value.")?;

    let title = match prompter.ask_or_keep("New title: ", |raw| {
        validate_string(raw, TITLE_FIELD, TITLE_MAX_CHARS)
    })? {
        Answer::Value(title) => Some(title),
        Answer::Keep => None,
        Answer::Cancelled => return Ok(Ok(())),
    };
    let artist_id = match prompter.ask_or_keep("New artist ID: ", |raw| {
        validate_positive_integer(raw, ARTIST_ID_FIELD)
    })? {
        Answer::Value(id) => Some(id),
        Answer::Keep => None,
        Answer::Cancelled => return Ok(Ok(())),
    };

    if title.is_none() && artist_id.is_none() {
        prompter.say("No changes made.")?;
        return Ok(Ok(()));
    }

    let edit = AlbumEdit {
        album_id,
        title,
        artist_id,
    };
    let album = match service.edit_album(&edit) {
        Ok(album) => album,
        Err(err) => return Ok(Err(err)),
    };
    prompter.say(format!("Album {} updated: {}", album.id, album.title))?;
    Ok(Ok(()))
}

fn delete_album<R: BufRead, W: Write>(
    service: &mut CatalogService<'_>,
    prompter: &mut Prompter<R, W>,
) -> Action {
    let Some(album_id) = ask_album_id(prompter)? else {
        return Ok(Ok(()));
    };
    let current = match service.get_album(album_id) {
        Ok(Some(album)) => album,
        Ok(None) => {
            return Ok(Err(RepoError::NotFound {
                entity: "album",
                id: album_id,
            }))
        }
        Err(err) => return Ok(Err(err)),
    };

    prompter.say(format!("About to delete album {}: {}", current.id, current.title))?;
    if !prompter.confirm("Are you sure? (yes/no): ")? {
        prompter.say("Deletion cancelled.")?;
        return Ok(Ok(()));
    }

    let deleted = match service.delete_album(album_id) {
        Ok(album) => album,
        Err(err) => return Ok(Err(err)),
    };
    prompter.say(format!("Album {} deleted: {}", deleted.id, deleted.title))?;
    Ok(Ok(()))
}

fn search_albums<R: BufRead, W: Write>(
    service: &mut CatalogService<'_>,
    prompter: &mut Prompter<R, W>,
) -> Action {
    let Some(term) = prompter.ask("Search term (title or artist): ", |raw| {
        validate_string(raw, SEARCH_TERM_FIELD, SEARCH_TERM_MAX_CHARS)
    })?
    else {
        return Ok(Ok(()));
    };

    let page = match service.search_albums(&term) {
        Ok(page) => page,
        Err(err) => return Ok(Err(err)),
    };
    if page.items.is_empty() {
        prompter.say(format!("No albums match '{term}'."))?;
    } else {
        write!(prompter.output(), "{}", render::album_table(&page, "matches"))?;
    }
    Ok(Ok(()))
}

fn show_stats<R: BufRead, W: Write>(
    service: &mut CatalogService<'_>,
    prompter: &mut Prompter<R, W>,
) -> Action {
    let stats = match service.stats() {
        Ok(stats) => stats,
        Err(err) => return Ok(Err(err)),
    };
    prompter.say(render::stats(&stats))?;
    Ok(Ok(()))
}

fn ask_album_id<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>) -> Result<Option<i64>> {
    Ok(prompter.ask("Album ID: ", |raw| {
        validate_positive_integer(raw, ALBUM_ID_FIELD)
    })?)
}

/// `Some(None)` for "all", `Some(Some(n))` for a limit, `None` when
/// cancelled.
fn ask_display_limit<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
) -> Result<Option<Option<u32>>> {
    let Some(mode) = prompter.ask("Show all or limit? (all/limit): ", |raw| {
        validate_option(raw, "Display option", DISPLAY_OPTIONS)
    })?
    else {
        return Ok(None);
    };
    if mode == "all" {
        return Ok(Some(None));
    }

    let limit = prompter.ask("Number of rows: ", parse_row_limit)?;
    Ok(limit.map(Some))
}

fn parse_row_limit(raw: &str) -> ValidationResult<u32> {
    let value = validate_positive_integer(raw, ROW_LIMIT_FIELD)?;
    u32::try_from(value).map_err(|_| {
        ValidationError::new(
            ROW_LIMIT_FIELD,
            Rejection::OutOfRange {
                min: 1,
                max: i64::from(u32::MAX),
            },
        )
    })
}
