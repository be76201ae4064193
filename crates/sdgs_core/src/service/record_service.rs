//! CRUD mutator over the snapshot store.
//!
//! # Responsibility
//! - Validate input before any store call.
//! - Apply create/update/delete and classify their outcome.
//!
//! # Invariants
//! - A create whose derived id already exists writes nothing.
//! - Update touches measures only; identity fields are immutable.
//! - No retries: a transport failure surfaces once as `StoreUnavailable`.
//! - The service never touches the collection cache; the caller reloads.

use crate::config::ControllerConfig;
use crate::model::record::{MeasurePatch, RecordDraft, RecordId, RecordValidationError};
use crate::store::snapshot_store::{SnapshotStore, StoreError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Operator-facing failure of a CRUD operation.
#[derive(Debug)]
pub enum ServiceError {
    /// Create collided with an existing record; nothing was written.
    DuplicateKey {
        id: RecordId,
        region_name: String,
        year: i32,
    },
    /// Update/delete/edit target does not exist (anymore).
    NotFound(RecordId),
    /// Input rejected before any store call.
    Validation(RecordValidationError),
    /// Transport or persisted-data failure.
    StoreUnavailable(StoreError),
}

impl ServiceError {
    /// Stable short code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateKey { .. } => "duplicate_key",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation_error",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateKey {
                region_name, year, ..
            } => write!(f, "record for {region_name} in {year} already exists"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::StoreUnavailable(err) => write!(f, "store unavailable: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::StoreUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for ServiceError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Duplicate(id) => {
                let (region_name, year) = id
                    .parts()
                    .map(|(region, year)| (region.to_string(), year))
                    .unwrap_or_else(|| (id.to_string(), 0));
                Self::DuplicateKey {
                    id,
                    region_name,
                    year,
                }
            }
            other => Self::StoreUnavailable(other),
        }
    }
}

/// Use-case service for record mutations.
pub struct RecordService<S: SnapshotStore> {
    store: S,
    min_year: i32,
    max_year: i32,
}

impl<S: SnapshotStore> RecordService<S> {
    /// Creates a service with default year bounds.
    pub fn new(store: S) -> Self {
        Self::with_config(store, &ControllerConfig::default())
    }

    pub fn with_config(store: S, config: &ControllerConfig) -> Self {
        Self {
            store,
            min_year: config.min_year,
            max_year: config.max_year,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Inserts a new record under its derived id.
    ///
    /// # Contract
    /// - Fails with `DuplicateKey` when the id exists; no write happens.
    /// - Returns the created id.
    pub fn create(&self, draft: &RecordDraft) -> ServiceResult<RecordId> {
        draft.validate(self.min_year, self.max_year)?;
        let record = draft.clone().into_record();
        let started_at = Instant::now();

        if self.store.find_by_id(&record.id)?.is_some() {
            warn!(
                "event=record_create module=service status=rejected id={} error_code=duplicate_key",
                record.id
            );
            return Err(ServiceError::DuplicateKey {
                id: record.id,
                region_name: record.region_name,
                year: record.year,
            });
        }

        match self.store.insert(&record) {
            Ok(()) => {
                info!(
                    "event=record_create module=service status=ok id={} duration_ms={}",
                    record.id,
                    started_at.elapsed().as_millis()
                );
                Ok(record.id)
            }
            Err(err) => {
                let err = ServiceError::from(err);
                log_failure("record_create", &record.id, &err);
                Err(err)
            }
        }
    }

    /// Applies a partial measure update.
    ///
    /// Fails with `NotFound` when no record matched `id`.
    pub fn update(&self, id: &RecordId, patch: &MeasurePatch) -> ServiceResult<()> {
        patch.validate()?;
        let started_at = Instant::now();

        let matched = self.store.update_fields(id, patch).map_err(|err| {
            let err = ServiceError::from(err);
            log_failure("record_update", id, &err);
            err
        })?;
        if matched == 0 {
            warn!("event=record_update module=service status=rejected id={id} error_code=not_found");
            return Err(ServiceError::NotFound(id.clone()));
        }

        info!(
            "event=record_update module=service status=ok id={id} fields={} duration_ms={}",
            patch.fields().len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Removes a record by id.
    ///
    /// Fails with `NotFound` when nothing was removed.
    pub fn delete(&self, id: &RecordId) -> ServiceResult<()> {
        let started_at = Instant::now();

        let removed = self.store.delete_by_id(id).map_err(|err| {
            let err = ServiceError::from(err);
            log_failure("record_delete", id, &err);
            err
        })?;
        if removed == 0 {
            warn!("event=record_delete module=service status=rejected id={id} error_code=not_found");
            return Err(ServiceError::NotFound(id.clone()));
        }

        info!(
            "event=record_delete module=service status=ok id={id} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

fn log_failure(event: &str, id: &RecordId, err: &ServiceError) {
    match err {
        ServiceError::StoreUnavailable(cause) => error!(
            "event={event} module=service status=error id={id} error_code={} error={cause}",
            err.code()
        ),
        _ => warn!(
            "event={event} module=service status=rejected id={id} error_code={}",
            err.code()
        ),
    }
}
