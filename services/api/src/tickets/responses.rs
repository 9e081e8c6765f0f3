use serde::Serialize;
use serde_json::Value;
use sprintlens_analytics::{FilterSummary, SprintSnapshot};

/// Search response: the (filtered) raw issues plus the derived analytics.
/// The resolved story-points field identifier is part of the response so
/// downstream consumers receive it explicitly instead of re-detecting it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSearchResponse {
    pub issues: Vec<Value>,
    pub total: usize,
    pub story_points_field_id: Option<String>,
    pub story_points_field_name: Option<String>,
    pub snapshot: SprintSnapshot,
    pub filter_summary: FilterSummary,
}
