//! Interaction events accepted by the reconciliation driver.

use crate::model::record::{MeasurePatch, RecordDraft, RecordId};
use crate::session::ViewMode;
use crate::view::filter::RegionSelector;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ShowView(ViewMode),
    SetYearRange { min: i32, max: i32 },
    /// Back to the full year span of the cache.
    ResetYearRange,
    SelectRegion(RegionSelector),
    NextPage,
    PreviousPage,
    StartEdit(RecordId),
    CancelEdit,
    SubmitEdit { id: RecordId, patch: MeasurePatch },
    Create(RecordDraft),
    Delete(RecordId),
    /// Reload the cache without mutating anything.
    Refresh,
}

impl Event {
    /// Short name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ShowView(_) => "show_view",
            Self::SetYearRange { .. } => "set_year_range",
            Self::ResetYearRange => "reset_year_range",
            Self::SelectRegion(_) => "select_region",
            Self::NextPage => "next_page",
            Self::PreviousPage => "previous_page",
            Self::StartEdit(_) => "start_edit",
            Self::CancelEdit => "cancel_edit",
            Self::SubmitEdit { .. } => "submit_edit",
            Self::Create(_) => "create",
            Self::Delete(_) => "delete",
            Self::Refresh => "refresh",
        }
    }

    /// Whether the event writes to the snapshot store.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::SubmitEdit { .. } | Self::Create(_) | Self::Delete(_)
        )
    }
}
