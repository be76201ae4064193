//! Process-wide interaction state of one operator session.
//!
//! # Responsibility
//! - Carry page index, edit target, filter selections and view mode across
//!   rebuilds as one typed container.
//! - Hold the one-shot operator notice produced by the last event.
//!
//! # Invariants
//! - Session state is orthogonal to the collection cache: a reload never
//!   resets it, only reconciliation clamps it.
//! - At most one edit target exists per session.

pub mod edit;

use crate::cache::CollectionCache;
use crate::view::filter::{RegionSelector, YearRange};
use edit::EditSession;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which screen the operator is looking at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Records,
    Dashboard,
}

/// Operator filter selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    /// `None` follows the full year span of the cache.
    pub years: Option<YearRange>,
    pub region: RegionSelector,
}

impl FilterSelection {
    /// Year range actually applied against `cache`.
    ///
    /// Returns `None` only when no explicit range is set and the cache is
    /// empty.
    pub fn effective_years(&self, cache: &CollectionCache) -> Option<YearRange> {
        self.years.or_else(|| {
            cache
                .year_span()
                .map(|(min, max)| YearRange { min, max })
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One-shot message rendered with the next view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub session_id: Uuid,
    pub view: ViewMode,
    pub page_index: usize,
    pub filter: FilterSelection,
    pub edit: EditSession,
    pub notice: Option<Notice>,
}

impl SessionState {
    /// Fresh state for a new session: first page, no edit, all years and
    /// regions.
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            view: ViewMode::default(),
            page_index: 0,
            filter: FilterSelection::default(),
            edit: EditSession::default(),
            notice: None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
