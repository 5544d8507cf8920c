use placemark_core::db::open_db_in_memory;
use placemark_core::{
    AppState, Coordinates, NewPlace, PlaceMeta, PlacesService, PlacesServiceError, SqliteKvStore,
    TransferError,
};

fn seeded(service: &mut PlacesService<SqliteKvStore<'_>>) {
    for (lat, lng, title, city) in [
        (48.8566, 2.3522, "Louvre", Some("Paris")),
        (35.6762, 139.6503, "", Some("Tokyo")),
        (-33.8688, 151.2093, "Harbour", None),
    ] {
        service
            .add(NewPlace {
                coordinates: Coordinates::new(lat, lng).unwrap(),
                title: title.to_string(),
                notes: format!("notes for {title}"),
                meta: city.map(|city| PlaceMeta {
                    display_name: Some(format!("{city}, somewhere")),
                    city: Some(city.to_string()),
                    country: None,
                }),
            })
            .unwrap();
    }
}

#[test]
fn export_then_import_restores_locations() {
    let conn = open_db_in_memory().unwrap();
    let mut service = PlacesService::load(SqliteKvStore::try_new(&conn).unwrap()).unwrap();
    seeded(&mut service);
    let original = service.locations().to_vec();
    let exported = service.export_json().unwrap();

    service.clear().unwrap();
    assert!(service.locations().is_empty());

    let count = service.import_json(&exported).unwrap();
    assert_eq!(count, 3);
    assert_eq!(service.locations(), &original[..]);
}

#[test]
fn import_switches_to_browse_mode_and_persists() {
    let conn = open_db_in_memory().unwrap();
    let mut service = PlacesService::load(SqliteKvStore::try_new(&conn).unwrap()).unwrap();

    service
        .import_json(r#"[{"id": "a", "lat": 1.0, "lng": 2.0, "title": "A", "createdAt": 1}]"#)
        .unwrap();

    assert!(!service.state().is_collecting);
    assert!(!service.state().show_list);
    let stored: AppState =
        serde_json::from_str(&service.persisted_document().unwrap().unwrap()).unwrap();
    assert_eq!(&stored, service.state());
}

#[test]
fn importing_an_object_leaves_state_untouched() {
    let conn = open_db_in_memory().unwrap();
    let mut service = PlacesService::load(SqliteKvStore::try_new(&conn).unwrap()).unwrap();
    seeded(&mut service);
    let before = service.state().clone();
    let document_before = service.persisted_document().unwrap();

    let err = service
        .import_json(r#"{"locations": []}"#)
        .unwrap_err();
    assert!(matches!(
        err,
        PlacesServiceError::Transfer(TransferError::NotASequence { .. })
    ));
    assert!(err.to_string().contains("expected a JSON array"));

    assert_eq!(service.state(), &before);
    assert_eq!(service.persisted_document().unwrap(), document_before);
}

#[test]
fn importing_invalid_json_leaves_state_untouched() {
    let conn = open_db_in_memory().unwrap();
    let mut service = PlacesService::load(SqliteKvStore::try_new(&conn).unwrap()).unwrap();
    seeded(&mut service);
    let before = service.state().clone();

    let err = service.import_json("[{\"lat\": 1,").unwrap_err();
    assert!(matches!(
        err,
        PlacesServiceError::Transfer(TransferError::Json(_))
    ));
    assert_eq!(service.state(), &before);
}

#[test]
fn import_with_duplicate_ids_keeps_first() {
    let conn = open_db_in_memory().unwrap();
    let mut service = PlacesService::load(SqliteKvStore::try_new(&conn).unwrap()).unwrap();

    let count = service
        .import_json(
            r#"[
                {"id": "dup", "lat": 1.0, "lng": 1.0, "title": "first"},
                {"id": "dup", "lat": 2.0, "lng": 2.0, "title": "second"}
            ]"#,
        )
        .unwrap();

    assert_eq!(count, 1);
    assert_eq!(service.locations()[0].title, "first");
}

#[test]
fn exported_document_is_a_pretty_array_of_places() {
    let conn = open_db_in_memory().unwrap();
    let mut service = PlacesService::load(SqliteKvStore::try_new(&conn).unwrap()).unwrap();
    seeded(&mut service);

    let exported = service.export_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[1]["title"], "Tokyo");
    assert_eq!(items[1]["meta"]["city"], "Tokyo");
    assert!(items[1]["meta"].get("country").is_none());
    assert!(exported.contains("\n  "));
}
