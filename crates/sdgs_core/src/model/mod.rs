//! Domain model for regional poverty/unemployment indicators.
//!
//! # Responsibility
//! - Define the canonical region/year record shared by cache, views and
//!   mutations.
//! - Keep identity derivation and pre-store validation in one place.
//!
//! # Invariants
//! - Every record is identified by the composite `RecordId`
//!   (`"{region_name}_{year}"`).
//! - Absent measures are kept as `None`; zero is a render-time default only.

pub mod record;
