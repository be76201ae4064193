use rusqlite::Connection;
use sdgs_core::db::open_db_in_memory;
use sdgs_core::{
    ControllerConfig, MeasurePatch, Measures, Record, RecordDraft, RecordId, RecordService,
    RecordValidationError, ServiceError, SnapshotStore, SqliteSnapshotStore, StoreError,
    StoreResult,
};
use std::cell::Cell;

fn seeded_store(conn: &Connection) -> SqliteSnapshotStore<'_> {
    let store = SqliteSnapshotStore::try_new(conn).unwrap();
    store
        .insert(&Record {
            id: RecordId::derive("A", 2020),
            region_name: "A".to_string(),
            year: 2020,
            measures: Measures::complete(1.0, 2.0, 3.0),
        })
        .unwrap();
    store
}

fn record_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM indicator_records;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn create_with_existing_id_fails_duplicate_key_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = RecordService::new(seeded_store(&conn));

    let err = service
        .create(&RecordDraft::new("A", 2020, Measures::complete(7.0, 8.0, 9.0)))
        .unwrap_err();

    match err {
        ServiceError::DuplicateKey {
            id,
            region_name,
            year,
        } => {
            assert_eq!(id.as_str(), "A_2020");
            assert_eq!(region_name, "A");
            assert_eq!(year, 2020);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(record_count(&conn), 1);
    let kept = service
        .store()
        .find_by_id(&RecordId::derive("A", 2020))
        .unwrap()
        .unwrap();
    assert_eq!(kept.measures, Measures::complete(1.0, 2.0, 3.0));
}

#[test]
fn repeated_creates_never_duplicate_ids() {
    let conn = open_db_in_memory().unwrap();
    let service = RecordService::new(SqliteSnapshotStore::try_new(&conn).unwrap());

    let mut created = 0;
    for (region, year) in [("A", 2020), ("B", 2020), ("A", 2020), ("A", 2021), ("B", 2020)] {
        if service
            .create(&RecordDraft::new(region, year, Measures::default()))
            .is_ok()
        {
            created += 1;
        }
    }

    assert_eq!(created, 3);
    assert_eq!(record_count(&conn), 3);
    let distinct: i64 = conn
        .query_row(
            "SELECT COUNT(DISTINCT id) FROM indicator_records;",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(distinct, 3);
}

#[test]
fn create_trims_region_and_derives_id() {
    let conn = open_db_in_memory().unwrap();
    let service = RecordService::new(SqliteSnapshotStore::try_new(&conn).unwrap());

    let id = service
        .create(&RecordDraft::new(" Bogor ", 2030, Measures::default()))
        .unwrap();

    assert_eq!(id.as_str(), "Bogor_2030");
    let stored = service.store().find_by_id(&id).unwrap().unwrap();
    assert_eq!(stored.region_name, "Bogor");
}

#[test]
fn validation_errors_are_raised_before_store_calls() {
    let conn = open_db_in_memory().unwrap();
    let config = ControllerConfig {
        min_year: 2010,
        max_year: 2020,
        ..ControllerConfig::default()
    };
    let service = RecordService::with_config(SqliteSnapshotStore::try_new(&conn).unwrap(), &config);

    let err = service
        .create(&RecordDraft::new("A", 2021, Measures::default()))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(RecordValidationError::YearOutOfRange { year: 2021, .. })
    ));

    let err = service
        .create(&RecordDraft::new("", 2015, Measures::default()))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(RecordValidationError::EmptyRegion)
    ));

    let err = service
        .update(&RecordId::derive("A", 2015), &MeasurePatch::default())
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(RecordValidationError::EmptyPatch)
    ));
    assert_eq!(record_count(&conn), 0);
}

#[test]
fn update_applies_partial_measures() {
    let conn = open_db_in_memory().unwrap();
    let service = RecordService::new(seeded_store(&conn));
    let id = RecordId::derive("A", 2020);

    let patch = MeasurePatch {
        poverty_severity_index: Some(5.0),
        ..MeasurePatch::default()
    };
    service.update(&id, &patch).unwrap();

    let stored = service.store().find_by_id(&id).unwrap().unwrap();
    assert_eq!(stored.measures, Measures::complete(5.0, 2.0, 3.0));
}

#[test]
fn resubmitting_identical_values_is_not_reported_as_missing() {
    let conn = open_db_in_memory().unwrap();
    let service = RecordService::new(seeded_store(&conn));

    let patch = MeasurePatch {
        poverty_severity_index: Some(1.0),
        ..MeasurePatch::default()
    };
    service.update(&RecordId::derive("A", 2020), &patch).unwrap();
}

#[test]
fn update_and_delete_of_missing_record_fail_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = RecordService::new(seeded_store(&conn));
    let missing = RecordId::derive("A", 2019);

    let patch = MeasurePatch {
        unemployment_rate: Some(1.0),
        ..MeasurePatch::default()
    };
    let err = service.update(&missing, &patch).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(ref id) if *id == missing));

    let err = service.delete(&missing).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(ref id) if *id == missing));
    assert_eq!(record_count(&conn), 1);
}

#[test]
fn delete_removes_record() {
    let conn = open_db_in_memory().unwrap();
    let service = RecordService::new(seeded_store(&conn));

    service.delete(&RecordId::derive("A", 2020)).unwrap();
    assert_eq!(record_count(&conn), 0);
}

/// Store whose transport drops after `fail` is set.
struct FlakyStore<'conn> {
    inner: SqliteSnapshotStore<'conn>,
    fail: Cell<bool>,
}

impl FlakyStore<'_> {
    fn check(&self) -> StoreResult<()> {
        if self.fail.get() {
            Err(StoreError::InvalidData("connection reset".to_string()))
        } else {
            Ok(())
        }
    }
}

impl SnapshotStore for FlakyStore<'_> {
    fn find_all(&self) -> StoreResult<Vec<Record>> {
        self.check()?;
        self.inner.find_all()
    }

    fn find_by_id(&self, id: &RecordId) -> StoreResult<Option<Record>> {
        self.check()?;
        self.inner.find_by_id(id)
    }

    fn insert(&self, record: &Record) -> StoreResult<()> {
        self.check()?;
        self.inner.insert(record)
    }

    fn update_fields(&self, id: &RecordId, patch: &MeasurePatch) -> StoreResult<usize> {
        self.check()?;
        self.inner.update_fields(id, patch)
    }

    fn delete_by_id(&self, id: &RecordId) -> StoreResult<usize> {
        self.check()?;
        self.inner.delete_by_id(id)
    }
}

#[test]
fn transport_failure_surfaces_as_store_unavailable() {
    let conn = open_db_in_memory().unwrap();
    let store = FlakyStore {
        inner: seeded_store(&conn),
        fail: Cell::new(true),
    };
    let service = RecordService::new(store);

    let err = service
        .create(&RecordDraft::new("B", 2020, Measures::default()))
        .unwrap_err();
    assert!(matches!(err, ServiceError::StoreUnavailable(_)));
    assert_eq!(err.code(), "store_unavailable");

    let err = service.delete(&RecordId::derive("A", 2020)).unwrap_err();
    assert!(matches!(err, ServiceError::StoreUnavailable(_)));
    assert_eq!(record_count(&conn), 1);
}
