use rusqlite::Connection;
use sdgs_core::db::migrations::latest_version;
use sdgs_core::db::open_db_in_memory;
use sdgs_core::{
    MeasurePatch, Measures, Record, RecordId, SnapshotStore, SqliteSnapshotStore, StoreError,
};

fn record(region: &str, year: i32, measures: Measures) -> Record {
    Record {
        id: RecordId::derive(region, year),
        region_name: region.to_string(),
        year,
        measures,
    }
}

#[test]
fn insert_and_find_by_id_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteSnapshotStore::try_new(&conn).unwrap();

    let created = record("Bandung", 2020, Measures::complete(0.4, 2.1, 8.0));
    store.insert(&created).unwrap();

    let loaded = store.find_by_id(&created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert!(store
        .find_by_id(&RecordId::derive("Bandung", 2021))
        .unwrap()
        .is_none());
}

#[test]
fn insert_with_existing_id_reports_duplicate_and_keeps_original() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteSnapshotStore::try_new(&conn).unwrap();

    let original = record("A", 2020, Measures::complete(1.0, 2.0, 3.0));
    store.insert(&original).unwrap();

    let clash = record("A", 2020, Measures::complete(9.0, 9.0, 9.0));
    let err = store.insert(&clash).unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(ref id) if id.as_str() == "A_2020"));

    let all = store.find_all().unwrap();
    assert_eq!(all, vec![original]);
}

#[test]
fn null_measures_survive_as_missing() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO indicator_records (id, region_name, year, poverty_severity_index)
         VALUES ('A_2020', 'A', 2020, 1.5);",
        [],
    )
    .unwrap();
    let store = SqliteSnapshotStore::try_new(&conn).unwrap();

    let loaded = store.find_all().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].measures.poverty_severity_index, Some(1.5));
    assert_eq!(loaded[0].measures.poverty_population_pct, None);
    assert_eq!(loaded[0].measures.unemployment_rate, None);
}

#[test]
fn find_all_orders_by_region_then_year() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteSnapshotStore::try_new(&conn).unwrap();

    for (region, year) in [("B", 2019), ("A", 2021), ("B", 2018), ("A", 2020)] {
        store
            .insert(&record(region, year, Measures::default()))
            .unwrap();
    }

    let ids: Vec<String> = store
        .find_all()
        .unwrap()
        .into_iter()
        .map(|record| record.id.to_string())
        .collect();
    assert_eq!(ids, vec!["A_2020", "A_2021", "B_2018", "B_2019"]);
}

#[test]
fn update_fields_touches_only_present_measures() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteSnapshotStore::try_new(&conn).unwrap();
    let existing = record("A", 2020, Measures::complete(1.0, 2.0, 3.0));
    store.insert(&existing).unwrap();

    let patch = MeasurePatch {
        unemployment_rate: Some(6.5),
        ..MeasurePatch::default()
    };
    assert_eq!(store.update_fields(&existing.id, &patch).unwrap(), 1);

    let loaded = store.find_by_id(&existing.id).unwrap().unwrap();
    assert_eq!(loaded.measures, Measures::complete(1.0, 2.0, 6.5));
    assert_eq!(loaded.region_name, "A");
    assert_eq!(loaded.year, 2020);
}

#[test]
fn update_and_delete_of_missing_id_match_nothing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteSnapshotStore::try_new(&conn).unwrap();
    let missing = RecordId::derive("Nowhere", 2020);

    let patch = MeasurePatch {
        poverty_severity_index: Some(1.0),
        ..MeasurePatch::default()
    };
    assert_eq!(store.update_fields(&missing, &patch).unwrap(), 0);
    assert_eq!(store.delete_by_id(&missing).unwrap(), 0);
}

#[test]
fn delete_removes_exactly_one_record() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteSnapshotStore::try_new(&conn).unwrap();
    let keep = record("A", 2020, Measures::default());
    let gone = record("A", 2021, Measures::default());
    store.insert(&keep).unwrap();
    store.insert(&gone).unwrap();

    assert_eq!(store.delete_by_id(&gone.id).unwrap(), 1);
    assert_eq!(store.find_all().unwrap(), vec![keep]);
}

#[test]
fn read_rejects_row_whose_id_does_not_match_region_and_year() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO indicator_records (id, region_name, year) VALUES ('A_2020', 'B', 2020);",
        [],
    )
    .unwrap();
    let store = SqliteSnapshotStore::try_new(&conn).unwrap();

    let err = store.find_all().unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn store_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteSnapshotStore::try_new(&conn) {
        Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn store_rejects_connection_missing_measure_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE indicator_records (
            id TEXT PRIMARY KEY NOT NULL,
            region_name TEXT NOT NULL,
            year INTEGER NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteSnapshotStore::try_new(&conn);
    assert!(matches!(
        result,
        Err(StoreError::MissingRequiredColumn {
            table: "indicator_records",
            column: "poverty_severity_index"
        })
    ));
}
