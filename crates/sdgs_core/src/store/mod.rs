//! Snapshot store contracts and the SQLite document collection.
//!
//! # Responsibility
//! - Define the find/insert/update/delete-by-key contract the core consumes.
//! - Keep SQL details behind the `SnapshotStore` boundary.
//!
//! # Invariants
//! - The store is the single source of truth; callers never patch copies.
//! - Insert never overwrites: a key collision reports `Duplicate`.
//! - Read paths reject persisted rows whose id does not match
//!   `region_name + "_" + year`.

pub mod snapshot_store;
