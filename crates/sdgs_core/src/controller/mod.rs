//! Reconciliation driver: one discrete event in, one full rebuild out.
//!
//! # Responsibility
//! - Apply an interaction event to the session state and, for mutations, to
//!   the snapshot store followed by a full cache reload.
//! - Reconcile session state against the reloaded cache (stale edit target,
//!   page overflow) before rebuilding the view.
//!
//! # Invariants
//! - State is updated before the rebuild observes it.
//! - A failed operation leaves the edit session and the cache as they were;
//!   only `NotFound` triggers a catch-up reload.
//! - Events run to completion one at a time; `dispatch` takes `&mut self`.
//! - No cross-session concurrency control: concurrent `update`s race with
//!   last-write-wins, concurrent `create`s are settled by the duplicate
//!   check.

mod event;

pub use event::Event;

use crate::cache::CollectionCache;
use crate::config::{ConfigError, ControllerConfig};
use crate::model::record::{MeasurePatch, RecordDraft, RecordId, RecordValidationError};
use crate::service::record_service::{RecordService, ServiceError, ServiceResult};
use crate::session::{Notice, SessionState};
use crate::store::snapshot_store::SnapshotStore;
use crate::view::filter::{RegionSelector, YearRange};
use crate::view::{build_view, list_scope, pagination, RenderModel};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Result of one dispatched event.
#[derive(Debug)]
pub struct Dispatched {
    pub outcome: ServiceResult<()>,
    pub view: RenderModel,
}

/// Failure to start a session.
#[derive(Debug)]
pub enum StartError {
    Config(ConfigError),
    Store(ServiceError),
}

impl Display for StartError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StartError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

/// Session-scoped driver owning the mutator, the cache and the state.
pub struct Dashboard<S: SnapshotStore> {
    service: RecordService<S>,
    cache: CollectionCache,
    state: SessionState,
    config: ControllerConfig,
}

impl<S: SnapshotStore> Dashboard<S> {
    /// Starts a session: validates config and loads the initial cache.
    ///
    /// # Errors
    /// - `StartError::Config` when `config` fails validation.
    /// - `StartError::Store` when the initial `find_all` fails.
    pub fn start(store: S, config: ControllerConfig) -> Result<Self, StartError> {
        config.validate().map_err(StartError::Config)?;
        let cache = CollectionCache::load(&store)
            .map_err(|err| StartError::Store(ServiceError::from(err)))?;
        let state = SessionState::new();
        info!(
            "event=session_start module=controller status=ok session_id={} records={} regions={}",
            state.session_id,
            cache.len(),
            cache.regions().len()
        );
        Ok(Self {
            service: RecordService::with_config(store, &config),
            cache,
            state,
            config,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn cache(&self) -> &CollectionCache {
        &self.cache
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        self.service.store()
    }

    /// Rebuilds the view from current cache and state without mutating
    /// anything.
    pub fn render(&self) -> RenderModel {
        build_view(&self.cache, &self.state, &self.config)
    }

    /// Handles one interaction event and returns the rebuilt view.
    pub fn dispatch(&mut self, event: Event) -> Dispatched {
        let started_at = Instant::now();
        let kind = event.kind();
        let mutation = event.is_mutation();
        self.state.notice = None;

        let outcome = self.apply(event);
        if let Err(err) = &outcome {
            if matches!(err, ServiceError::NotFound(_)) {
                self.catch_up();
            }
            self.state.notice = Some(Notice::error(err.to_string()));
            warn!(
                "event=dispatch module=controller status=error session_id={} kind={kind} error_code={}",
                self.state.session_id,
                err.code()
            );
        }
        self.reconcile();

        debug!(
            "event=dispatch module=controller status=done session_id={} kind={kind} mutation={mutation} page_index={} editing={} generation={} duration_ms={}",
            self.state.session_id,
            self.state.page_index,
            self.state.edit.target().is_some(),
            self.cache.generation(),
            started_at.elapsed().as_millis()
        );

        Dispatched {
            outcome,
            view: self.render(),
        }
    }

    fn apply(&mut self, event: Event) -> ServiceResult<()> {
        match event {
            Event::ShowView(mode) => {
                self.state.view = mode;
                Ok(())
            }
            Event::SetYearRange { min, max } => {
                self.state.filter.years = Some(YearRange::new(min, max)?);
                Ok(())
            }
            Event::ResetYearRange => {
                self.state.filter.years = None;
                Ok(())
            }
            Event::SelectRegion(selector) => self.select_region(selector),
            Event::NextPage => {
                let len = list_scope(&self.cache, &self.state.filter).len();
                if pagination::has_next(self.state.page_index, self.config.page_size, len) {
                    self.state.page_index += 1;
                }
                Ok(())
            }
            Event::PreviousPage => {
                if pagination::has_previous(self.state.page_index) {
                    self.state.page_index -= 1;
                }
                Ok(())
            }
            Event::StartEdit(id) => {
                if !self.cache.contains(&id) {
                    return Err(ServiceError::NotFound(id));
                }
                self.state.edit.start(id);
                Ok(())
            }
            Event::CancelEdit => {
                self.state.edit.cancel();
                Ok(())
            }
            Event::SubmitEdit { id, patch } => self.submit_edit(id, &patch),
            Event::Create(draft) => self.create(&draft),
            Event::Delete(id) => self.delete(id),
            Event::Refresh => {
                self.cache.reload(self.service.store())?;
                Ok(())
            }
        }
    }

    fn select_region(&mut self, selector: RegionSelector) -> ServiceResult<()> {
        if let Some(name) = selector.region() {
            if !self.cache.has_region(name) {
                return Err(RecordValidationError::UnknownRegion(name.to_string()).into());
            }
        }
        self.state.filter.region = selector;
        Ok(())
    }

    fn create(&mut self, draft: &RecordDraft) -> ServiceResult<()> {
        let region_name = draft.region_name.trim();
        if self.config.restrict_regions
            && !self.cache.is_empty()
            && !region_name.is_empty()
            && !self.cache.has_region(region_name)
        {
            return Err(RecordValidationError::UnknownRegion(region_name.to_string()).into());
        }

        let id = self.service.create(draft)?;
        self.reload_after_mutation()?;
        self.state.edit.cancel();
        self.state.notice = Some(Notice::success(format!("record {id} created")));
        Ok(())
    }

    fn submit_edit(&mut self, id: RecordId, patch: &MeasurePatch) -> ServiceResult<()> {
        self.service.update(&id, patch)?;
        self.reload_after_mutation()?;
        self.state.edit.finish(&id);
        self.state.notice = Some(Notice::success(format!("record {id} updated")));
        Ok(())
    }

    fn delete(&mut self, id: RecordId) -> ServiceResult<()> {
        self.service.delete(&id)?;
        self.reload_after_mutation()?;
        self.state.edit.cancel();
        self.state.notice = Some(Notice::success(format!("record {id} deleted")));
        Ok(())
    }

    /// Waits out the store acknowledgement window, then reloads wholesale.
    fn reload_after_mutation(&mut self) -> ServiceResult<()> {
        let delay = self.config.ack_delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.cache.reload(self.service.store())?;
        Ok(())
    }

    /// Best-effort reload after `NotFound` so the view matches the store.
    fn catch_up(&mut self) {
        if let Err(err) = self.cache.reload(self.service.store()) {
            warn!(
                "event=cache_catch_up module=controller status=error session_id={} error={err}",
                self.state.session_id
            );
        }
    }

    /// Clears an edit target that vanished from the cache, falls back to all
    /// regions when the selected one is gone, and clamps the page index onto
    /// the current list scope.
    fn reconcile(&mut self) {
        if let Some(id) = self.state.edit.target().cloned() {
            if !self.cache.contains(&id) {
                self.state.edit.invalidate(&id);
                debug!(
                    "event=edit_invalidated module=controller session_id={} id={id}",
                    self.state.session_id
                );
            }
        }

        let region_gone = self
            .state
            .filter
            .region
            .region()
            .is_some_and(|name| !self.cache.has_region(name));
        if region_gone {
            self.state.filter.region = RegionSelector::All;
        }

        let len = list_scope(&self.cache, &self.state.filter).len();
        self.state.page_index =
            pagination::clamp_page_index(self.state.page_index, self.config.page_size, len);
    }
}
