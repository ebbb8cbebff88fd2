use chinook_core::{
    create_store, AlbumEdit, AlbumListQuery, AlbumRepository, AlbumSort, ArtistListQuery,
    ArtistSort, CatalogService, GatewayConfig, GatewayError, NewAlbum, Rejection, RepoError,
    SqliteAlbumRepository, ValidatedQueryGateway,
};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

fn seeded_store() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chinook.db");
    create_store(&path).unwrap();

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "INSERT INTO artists (ArtistId, Name) VALUES
            (1, 'AC/DC'), (2, 'Accept'), (3, 'Aerosmith');
         INSERT INTO albums (AlbumId, Title, ArtistId) VALUES
            (1, 'For Those About To Rock We Salute You', 1),
            (2, 'Balls to the Wall', 2),
            (3, 'Restless and Wild', 2),
            (4, 'Let There Be Rock', 1);",
    )
    .unwrap();
    (dir, path)
}

fn connected(path: &Path) -> ValidatedQueryGateway {
    let mut gateway = ValidatedQueryGateway::new(GatewayConfig::default());
    gateway.connect(path).unwrap();
    gateway
}

fn album_ids(service: &mut CatalogService<'_>, sort: AlbumSort) -> Vec<i64> {
    service
        .list_albums(&AlbumListQuery { sort, limit: None })
        .unwrap()
        .items
        .into_iter()
        .map(|album| album.id)
        .collect()
}

#[test]
fn add_and_get_roundtrip() {
    let (_dir, path) = seeded_store();
    let mut gateway = connected(&path);
    let mut service = CatalogService::new(&mut gateway);

    let added = service.add_album("  Big Ones ", 3).unwrap();
    assert_eq!(added.title, "Big Ones");
    assert_eq!(added.artist_id, 3);
    assert_eq!(added.id, 5);

    let loaded = service.get_album(added.id).unwrap().unwrap();
    assert_eq!(loaded, added);
    assert_eq!(service.get_album(999).unwrap(), None);
}

#[test]
fn titles_with_apostrophes_are_accepted() {
    let (_dir, path) = seeded_store();
    let mut gateway = connected(&path);
    let mut service = CatalogService::new(&mut gateway);

    let added = service.add_album("Rock 'n' Roll Train", 1).unwrap();
    assert_eq!(added.title, "Rock 'n' Roll Train");
}

#[test]
fn injection_title_is_stored_verbatim_through_bound_parameters() {
    let (_dir, path) = seeded_store();
    let mut gateway = connected(&path);
    let title = "'; DROP TABLE albums; --";

    let (_, id) = gateway
        .execute(
            "INSERT INTO albums (Title, ArtistId) VALUES (?1, ?2);",
            &[Value::Text(title.to_string()), Value::Integer(1)],
        )
        .unwrap()
        .into_written()
        .unwrap();

    let mut service = CatalogService::new(&mut gateway);
    let stored = service.get_album(id).unwrap().unwrap();
    assert_eq!(stored.title, title);
    assert_eq!(service.stats().unwrap().albums, 5);
}

#[test]
fn service_rejects_disallowed_title_before_touching_the_store() {
    let (_dir, path) = seeded_store();
    let mut gateway = connected(&path);
    let mut service = CatalogService::new(&mut gateway);

    let err = service
        .add_album("'; DROP TABLE albums; --", 1)
        .unwrap_err();
    match err {
        RepoError::Validation(err) => {
            assert_eq!(err.field, "Album title");
            assert_eq!(err.reason, Rejection::DisallowedCharacters(vec![';']));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    for bad in ["", "   ", "quote\"d", "back\\slash", "tab\there"] {
        assert!(
            matches!(service.add_album(bad, 1), Err(RepoError::Validation(_))),
            "{bad:?}"
        );
    }
    assert!(matches!(
        service.add_album(&"x".repeat(101), 1),
        Err(RepoError::Validation(_))
    ));
    assert!(matches!(
        service.add_album("Valid", 0),
        Err(RepoError::Validation(_))
    ));
    assert_eq!(service.stats().unwrap().albums, 4);
}

#[test]
fn missing_artist_is_an_integrity_error_and_creates_nothing() {
    let (_dir, path) = seeded_store();
    let mut gateway = connected(&path);
    let mut service = CatalogService::new(&mut gateway);

    let err = service.add_album("Orphan", 999).unwrap_err();
    assert!(err.is_integrity());
    match err {
        RepoError::Gateway(GatewayError::Integrity { relationship, .. }) => {
            assert_eq!(relationship, "albums.ArtistId -> artists.ArtistId");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(service.stats().unwrap().albums, 4);
}

#[test]
fn store_foreign_key_also_rejects_missing_artist() {
    let (_dir, path) = seeded_store();
    let mut gateway = connected(&path);

    let err = gateway
        .execute(
            "INSERT INTO albums (Title, ArtistId) VALUES (?1, ?2);",
            &[Value::Text("Orphan".to_string()), Value::Integer(999)],
        )
        .unwrap_err();
    assert!(matches!(err, GatewayError::Integrity { .. }));
    assert_eq!(gateway.count_rows("albums").unwrap(), 4);
}

#[test]
fn edit_keeps_fields_that_are_not_given() {
    let (_dir, path) = seeded_store();
    let mut gateway = connected(&path);
    let mut service = CatalogService::new(&mut gateway);

    let retitled = service
        .edit_album(&AlbumEdit {
            album_id: 2,
            title: Some("Balls to the Wall (Remastered)".to_string()),
            artist_id: None,
        })
        .unwrap();
    assert_eq!(retitled.title, "Balls to the Wall (Remastered)");
    assert_eq!(retitled.artist_id, 2);

    let moved = service
        .edit_album(&AlbumEdit {
            album_id: 2,
            title: None,
            artist_id: Some(3),
        })
        .unwrap();
    assert_eq!(moved.title, "Balls to the Wall (Remastered)");
    assert_eq!(moved.artist_id, 3);
}

#[test]
fn edit_rejects_missing_album_and_missing_artist() {
    let (_dir, path) = seeded_store();
    let mut gateway = connected(&path);
    let mut service = CatalogService::new(&mut gateway);

    let err = service
        .edit_album(&AlbumEdit {
            album_id: 999,
            title: Some("Ghost".to_string()),
            artist_id: None,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "album",
            id: 999
        }
    ));

    let err = service
        .edit_album(&AlbumEdit {
            album_id: 1,
            title: None,
            artist_id: Some(999),
        })
        .unwrap_err();
    assert!(err.is_integrity());
    assert_eq!(service.get_album(1).unwrap().unwrap().artist_id, 1);
}

#[test]
fn delete_returns_removed_row() {
    let (_dir, path) = seeded_store();
    let mut gateway = connected(&path);
    let mut service = CatalogService::new(&mut gateway);

    let removed = service.delete_album(3).unwrap();
    assert_eq!(removed.title, "Restless and Wild");
    assert_eq!(service.get_album(3).unwrap(), None);
    assert_eq!(service.stats().unwrap().albums, 3);

    let err = service.delete_album(3).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { id: 3, .. }));
}

#[test]
fn delete_blocked_by_referencing_tracks_is_integrity_error() {
    let (_dir, path) = seeded_store();
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE tracks (
            TrackId INTEGER PRIMARY KEY AUTOINCREMENT,
            Name NVARCHAR(200) NOT NULL,
            AlbumId INTEGER,
            FOREIGN KEY (AlbumId) REFERENCES albums (AlbumId)
         );
         INSERT INTO tracks (Name, AlbumId) VALUES ('Fast As a Shark', 3);",
    )
    .unwrap();
    drop(conn);

    let mut gateway = connected(&path);
    let mut service = CatalogService::new(&mut gateway);

    let err = service.delete_album(3).unwrap_err();
    assert!(err.is_integrity(), "{err:?}");
    assert!(service.get_album(3).unwrap().is_some());
}

#[test]
fn albums_list_in_each_sort_order() {
    let (_dir, path) = seeded_store();
    let mut gateway = connected(&path);
    let mut service = CatalogService::new(&mut gateway);

    assert_eq!(album_ids(&mut service, AlbumSort::IdAsc), vec![1, 2, 3, 4]);
    assert_eq!(album_ids(&mut service, AlbumSort::IdDesc), vec![4, 3, 2, 1]);
    assert_eq!(album_ids(&mut service, AlbumSort::TitleAsc), vec![2, 1, 4, 3]);
    assert_eq!(
        album_ids(&mut service, AlbumSort::ArtistNameAsc),
        vec![1, 4, 2, 3]
    );

    let page = service
        .list_albums(&AlbumListQuery {
            sort: AlbumSort::IdAsc,
            limit: Some(2),
        })
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 4);
    assert!(!page.truncated);
    assert_eq!(page.items[0].artist_name.as_deref(), Some("AC/DC"));
}

#[test]
fn album_listing_respects_gateway_row_cap() {
    let (_dir, path) = seeded_store();
    let mut gateway = ValidatedQueryGateway::new(GatewayConfig::default().with_max_rows(3));
    gateway.connect(&path).unwrap();
    let mut service = CatalogService::new(&mut gateway);

    let page = service.list_albums(&AlbumListQuery::default()).unwrap();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total, 4);
    assert!(page.truncated);
}

#[test]
fn tiny_row_cap_only_limits_listings() {
    let (_dir, path) = seeded_store();
    let mut gateway = ValidatedQueryGateway::new(GatewayConfig::default().with_max_rows(2));
    gateway.connect(&path).unwrap();
    let mut service = CatalogService::new(&mut gateway);

    let added = service.add_album("Highway to Hell", 1).unwrap();
    assert_eq!(added.id, 5);

    let page = service.list_albums(&AlbumListQuery::default()).unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 5);
    assert!(page.truncated);

    let edited = service
        .edit_album(&AlbumEdit {
            album_id: 5,
            title: None,
            artist_id: Some(3),
        })
        .unwrap();
    assert_eq!(edited.artist_id, 3);
    assert_eq!(service.stats().unwrap().albums, 5);
}

#[test]
fn search_total_counts_matches_beyond_the_row_cap() {
    let (_dir, path) = seeded_store();
    let mut gateway = ValidatedQueryGateway::new(GatewayConfig::default().with_max_rows(1));
    gateway.connect(&path).unwrap();
    let mut service = CatalogService::new(&mut gateway);

    let page = service.search_albums("rock").unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, 2);
    assert!(page.truncated);
}

#[test]
fn artists_list_by_name_and_id() {
    let (_dir, path) = seeded_store();
    let mut gateway = connected(&path);
    let mut service = CatalogService::new(&mut gateway);

    let names = service
        .list_artists(&ArtistListQuery::default())
        .unwrap()
        .items
        .into_iter()
        .map(|artist| artist.name.unwrap())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["AC/DC", "Accept", "Aerosmith"]);

    let page = service
        .list_artists(&ArtistListQuery {
            sort: ArtistSort::IdDesc,
            limit: Some(1),
        })
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, 3);
    assert_eq!(page.total, 3);

    assert_eq!(
        service.get_artist(2).unwrap().unwrap().name.as_deref(),
        Some("Accept")
    );
    assert_eq!(service.get_artist(42).unwrap(), None);
}

#[test]
fn get_artist_rejects_non_positive_ids() {
    let (_dir, path) = seeded_store();
    let mut gateway = connected(&path);
    let mut service = CatalogService::new(&mut gateway);

    for id in [0, -3] {
        match service.get_artist(id).unwrap_err() {
            RepoError::Validation(err) => {
                assert_eq!(err.field, "Artist ID");
                assert_eq!(err.reason, Rejection::NotPositive);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[test]
fn unnamed_artists_do_not_break_listings() {
    let (_dir, path) = seeded_store();
    Connection::open(&path)
        .unwrap()
        .execute_batch(
            "INSERT INTO artists (ArtistId, Name) VALUES (4, NULL);
             INSERT INTO albums (AlbumId, Title, ArtistId) VALUES (5, 'Untitled Rock Demos', 4);",
        )
        .unwrap();
    let mut gateway = connected(&path);
    let mut service = CatalogService::new(&mut gateway);

    let artists = service.list_artists(&ArtistListQuery::default()).unwrap();
    assert_eq!(artists.items.len(), 4);
    assert!(artists
        .items
        .iter()
        .any(|artist| artist.id == 4 && artist.name.is_none()));
    assert_eq!(service.get_artist(4).unwrap().unwrap().name, None);

    let albums = service.list_albums(&AlbumListQuery::default()).unwrap();
    assert_eq!(albums.items.len(), 5);
    assert_eq!(albums.items[4].artist_name, None);

    let found = service.search_albums("demos").unwrap();
    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].id, 5);
    assert_eq!(found.total, 1);
}

#[test]
fn search_matches_title_or_artist_case_insensitively() {
    let (_dir, path) = seeded_store();
    let mut gateway = connected(&path);
    let mut service = CatalogService::new(&mut gateway);

    let titles = |page: chinook_core::CatalogPage<chinook_core::AlbumListing>| {
        page.items
            .into_iter()
            .map(|album| album.title)
            .collect::<Vec<_>>()
    };

    assert_eq!(
        titles(service.search_albums("ROCK").unwrap()),
        vec!["For Those About To Rock We Salute You", "Let There Be Rock"]
    );
    assert_eq!(
        titles(service.search_albums("accept").unwrap()),
        vec!["Balls to the Wall", "Restless and Wild"]
    );
    assert!(service.search_albums("Zeppelin").unwrap().items.is_empty());
}

#[test]
fn search_terms_are_validated() {
    let (_dir, path) = seeded_store();
    let mut gateway = connected(&path);
    let mut service = CatalogService::new(&mut gateway);

    for bad in ["", "rock\"", "a;b"] {
        assert!(
            matches!(service.search_albums(bad), Err(RepoError::Validation(_))),
            "{bad:?}"
        );
    }
    assert!(matches!(
        service.search_albums(&"r".repeat(51)),
        Err(RepoError::Validation(_))
    ));
}

#[test]
fn stats_count_optional_tables_only_when_present() {
    let (_dir, path) = seeded_store();
    {
        let mut gateway = connected(&path);
        let stats = CatalogService::new(&mut gateway).stats().unwrap();
        assert_eq!(stats.albums, 4);
        assert_eq!(stats.artists, 3);
        assert_eq!(stats.tracks, None);
        assert_eq!(stats.customers, None);
    }

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE tracks (TrackId INTEGER PRIMARY KEY, Name TEXT, AlbumId INTEGER);
         INSERT INTO tracks (Name, AlbumId) VALUES ('Balls to the Wall', 2), ('Fast As a Shark', 3);",
    )
    .unwrap();
    drop(conn);

    let mut gateway = connected(&path);
    let stats = CatalogService::new(&mut gateway).stats().unwrap();
    assert_eq!(stats.tracks, Some(2));
    assert_eq!(stats.customers, None);

    let json = serde_json::to_value(stats).unwrap();
    assert_eq!(json["albums"], 4);
    assert_eq!(json["tracks"], 2);
    assert!(json["customers"].is_null());
}

#[test]
fn repository_validates_before_writing() {
    let (_dir, path) = seeded_store();
    let mut gateway = connected(&path);
    let mut repo = SqliteAlbumRepository::try_new(&mut gateway).unwrap();

    let err = repo.create_album(&NewAlbum::new("", 1)).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let err = repo.get_album(0).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let id = repo.create_album(&NewAlbum::new("Flick of the Switch", 1)).unwrap();
    assert_eq!(repo.count_albums().unwrap(), 5);
    assert_eq!(
        repo.get_album(id).unwrap().unwrap().title,
        "Flick of the Switch"
    );
}
