use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::resolve::FieldCandidates;

/// Assignee label for tickets without one. Excluded from resource counts.
pub const UNASSIGNED: &str = "Unassigned";
/// Epic label when no epic reference resolves.
pub const NO_EPIC: &str = "No Epic";
/// Status label for tickets without a status name.
pub const UNKNOWN_STATUS: &str = "Unknown";

/// Engine configuration, provided by the embedding application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Candidate field identifiers for the story-point estimate,
    /// priority-ordered.
    pub story_points_fields: FieldCandidates,
    /// Candidate field identifiers for the epic reference; each is expected
    /// to hold an object with a `name`. The parent issue's summary is always
    /// tried as a final fallback.
    pub epic_fields: Vec<String>,
    pub points_per_resource_per_day: f64,
    pub sprint_duration_days: i64,
    /// End date of the current sprint. When unset, a full sprint is assumed
    /// to remain.
    pub sprint_end: Option<NaiveDate>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            story_points_fields: FieldCandidates::new([
                "customfield_10058",
                "customfield_10202",
                "customfield_10005",
                "customfield_10308",
                "customfield_10016",
                "customfield_10026",
                "customfield_10036",
                "customfield_10106",
                "customfield_10002",
                "customfield_10004",
                "storyPoints",
            ]),
            epic_fields: vec![
                "customfield_10014".to_string(),
                "customfield_10008".to_string(),
                "epic".to_string(),
            ],
            points_per_resource_per_day: 3.0,
            sprint_duration_days: 14,
            sprint_end: None,
        }
    }
}
