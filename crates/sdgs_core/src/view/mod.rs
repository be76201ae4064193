//! Pure view derivation: `(cache, session state, config) -> RenderModel`.
//!
//! # Responsibility
//! - Run filter -> paginate -> project for the records table.
//! - Run filter -> aggregate for the dashboard charts.
//!
//! # Invariants
//! - `build_view` has no side effects; identical inputs yield equal models.
//! - Missing measures become 0 here and nowhere earlier.

pub mod charts;
pub mod filter;
pub mod pagination;

use crate::cache::CollectionCache;
use crate::config::ControllerConfig;
use crate::model::record::{Measure, Record, RecordId};
use crate::session::{FilterSelection, Notice, SessionState, ViewMode};
use charts::{build_charts, MeasureCharts};
use filter::{filter_by_years, narrow_to_region, RegionSelector, YearRange};
use serde::Serialize;

/// Everything the rendering collaborator needs for one rebuild.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderModel {
    pub mode: ViewMode,
    /// Region options, excluding the "all regions" sentinel.
    pub regions: Vec<String>,
    /// Year span present in the cache, for the range control.
    pub year_bounds: Option<YearRange>,
    pub years: Option<YearRange>,
    pub region: RegionSelector,
    pub notice: Option<Notice>,
    pub body: ViewBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ViewBody {
    Records(TableView),
    Dashboard(DashboardView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub rows: Vec<RowView>,
    pub page_index: usize,
    pub page_count: usize,
    pub total_rows: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub edit: Option<EditForm>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub id: RecordId,
    pub region_name: String,
    pub year: i32,
    pub poverty_severity_index: f64,
    pub poverty_population_pct: f64,
    pub unemployment_rate: f64,
    pub editing: bool,
}

impl RowView {
    fn from_record(record: &Record, editing: bool) -> Self {
        Self {
            id: record.id.clone(),
            region_name: record.region_name.clone(),
            year: record.year,
            poverty_severity_index: record.measures.value_or_zero(Measure::PovertySeverityIndex),
            poverty_population_pct: record.measures.value_or_zero(Measure::PovertyPopulationPct),
            unemployment_rate: record.measures.value_or_zero(Measure::UnemploymentRate),
            editing,
        }
    }
}

/// Pre-filled update form for the active edit target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditForm {
    pub id: RecordId,
    pub region_name: String,
    pub year: i32,
    pub poverty_severity_index: f64,
    pub poverty_population_pct: f64,
    pub unemployment_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub charts: Vec<MeasureCharts>,
}

/// Year-filtered records, before any region narrowing.
pub fn year_scope<'a>(cache: &'a CollectionCache, filter: &FilterSelection) -> Vec<&'a Record> {
    match filter.effective_years(cache) {
        Some(range) => filter_by_years(cache.records(), range),
        None => Vec::new(),
    }
}

/// Rows the records table paginates over.
pub fn list_scope<'a>(cache: &'a CollectionCache, filter: &FilterSelection) -> Vec<&'a Record> {
    narrow_to_region(&year_scope(cache, filter), &filter.region)
}

/// Builds the render model for the current state. Pure.
pub fn build_view(
    cache: &CollectionCache,
    state: &SessionState,
    config: &ControllerConfig,
) -> RenderModel {
    let body = match state.view {
        ViewMode::Records => ViewBody::Records(build_table(cache, state, config.page_size)),
        ViewMode::Dashboard => ViewBody::Dashboard(DashboardView {
            charts: build_charts(&year_scope(cache, &state.filter), &state.filter.region),
        }),
    };

    RenderModel {
        mode: state.view,
        regions: cache.regions().to_vec(),
        year_bounds: cache
            .year_span()
            .map(|(min, max)| YearRange { min, max }),
        years: state.filter.effective_years(cache),
        region: state.filter.region.clone(),
        notice: state.notice.clone(),
        body,
    }
}

fn build_table(cache: &CollectionCache, state: &SessionState, page_size: usize) -> TableView {
    let scoped = list_scope(cache, &state.filter);
    let total_rows = scoped.len();
    let page_index = pagination::clamp_page_index(state.page_index, page_size, total_rows);

    let rows = pagination::page(&scoped, page_index, page_size)
        .iter()
        .map(|record| RowView::from_record(record, state.edit.is_editing(&record.id)))
        .collect();

    let edit = state
        .edit
        .target()
        .and_then(|id| cache.get(id))
        .map(|record| EditForm {
            id: record.id.clone(),
            region_name: record.region_name.clone(),
            year: record.year,
            poverty_severity_index: record.measures.value_or_zero(Measure::PovertySeverityIndex),
            poverty_population_pct: record.measures.value_or_zero(Measure::PovertyPopulationPct),
            unemployment_rate: record.measures.value_or_zero(Measure::UnemploymentRate),
        });

    TableView {
        rows,
        page_index,
        page_count: pagination::page_count(total_rows, page_size),
        total_rows,
        has_previous: pagination::has_previous(page_index),
        has_next: pagination::has_next(page_index, page_size, total_rows),
        edit,
    }
}
