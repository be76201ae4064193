//! Core of the regional poverty/unemployment indicator dashboard.
//! This crate owns view-state reconciliation and CRUD invariants.

pub mod cache;
pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod session;
pub mod store;
pub mod view;

pub use cache::CollectionCache;
pub use config::{ConfigError, ControllerConfig};
pub use controller::{Dashboard, Dispatched, Event, StartError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::record::{
    Measure, MeasurePatch, Measures, Record, RecordDraft, RecordId, RecordValidationError,
};
pub use service::record_service::{RecordService, ServiceError, ServiceResult};
pub use session::edit::EditSession;
pub use session::{FilterSelection, Notice, NoticeLevel, SessionState, ViewMode};
pub use store::snapshot_store::{SnapshotStore, SqliteSnapshotStore, StoreError, StoreResult};
pub use view::filter::{RegionSelector, YearRange};
pub use view::{build_view, RenderModel, RowView, TableView, ViewBody};

/// Minimal health-check API for console wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
