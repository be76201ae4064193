//! Core use-case services.
//!
//! # Responsibility
//! - Turn store operations into the create/update/delete use-cases with the
//!   operator-facing error taxonomy.
//! - Keep the reconciliation driver decoupled from storage details.

pub mod record_service;
