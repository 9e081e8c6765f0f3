use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{AnalyticsConfig, NO_EPIC, UNASSIGNED, UNKNOWN_STATUS};
use crate::resolve;
use crate::ticket::{Ticket, TicketFields};

/// Urgency bucket of a ticket's due date relative to an injected `today`.
/// Buckets are mutually exclusive and exhaustive; tickets without a
/// parseable date land in `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DueBucket {
    Overdue,
    Today,
    Tomorrow,
    ThisWeek,
    Future,
    None,
}

/// Categorical facts derived from one ticket. Built fresh per analytics
/// pass and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedTicket {
    pub key: String,
    pub story_points: f64,
    pub due_bucket: DueBucket,
    pub is_completed: bool,
    pub is_bug: bool,
    pub assignee: String,
    pub epic: String,
    pub status: String,
}

/// Derive the categorical facts for one ticket. `today` is injected so
/// classification is deterministic; the system clock is never read here.
pub fn classify(ticket: &Ticket, today: NaiveDate, config: &AnalyticsConfig) -> ClassifiedTicket {
    let fields = &ticket.fields;
    let status = status_label(fields);

    ClassifiedTicket {
        key: ticket.key.clone(),
        story_points: resolve::resolve(fields, &config.story_points_fields),
        due_bucket: due_bucket(fields.duedate.as_deref(), today),
        is_completed: is_completed(&status),
        is_bug: is_bug(fields.issue_type_name()),
        assignee: assignee_label(fields),
        epic: epic_label(fields, &config.epic_fields),
        status,
    }
}

/// Bucket a due date against `today`, both truncated to the day.
pub fn due_bucket(duedate: Option<&str>, today: NaiveDate) -> DueBucket {
    let Some(date) = duedate.and_then(parse_day) else {
        return DueBucket::None;
    };

    if date < today {
        DueBucket::Overdue
    } else if date == today {
        DueBucket::Today
    } else if date == today + Days::new(1) {
        DueBucket::Tomorrow
    } else if date <= today + Days::new(7) {
        DueBucket::ThisWeek
    } else {
        DueBucket::Future
    }
}

// Accepts bare dates and datetime strings; only the day part matters.
fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

/// Substring match, not exact: tolerates statuses like "Done (QA)" or
/// "Code Review Done".
pub fn is_completed(status: &str) -> bool {
    let lower = status.to_lowercase();
    lower.contains("done") || lower.contains("complete")
}

pub fn is_in_progress(status: &str) -> bool {
    status.to_lowercase().contains("progress")
}

fn is_bug(issue_type: Option<&str>) -> bool {
    issue_type.is_some_and(|t| t.to_lowercase().contains("bug"))
}

// The label helpers below are shared with the filter engine so list
// filtering and aggregate counts can never disagree on a ticket's labels.

pub(crate) fn status_label(fields: &TicketFields) -> String {
    fields
        .status_name()
        .unwrap_or(UNKNOWN_STATUS)
        .to_string()
}

pub(crate) fn assignee_label(fields: &TicketFields) -> String {
    fields.assignee_name().unwrap_or(UNASSIGNED).to_string()
}

pub(crate) fn epic_label(fields: &TicketFields, candidates: &[String]) -> String {
    for id in candidates {
        let name = fields
            .field(id)
            .and_then(|v| v.get("name"))
            .and_then(Value::as_str);
        if let Some(name) = name {
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }

    if let Some(summary) = fields.parent_summary() {
        if !summary.is_empty() {
            return summary.to_string();
        }
    }

    NO_EPIC.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn ticket_from(fields: serde_json::Value) -> Ticket {
        serde_json::from_value(json!({ "key": "T-1", "fields": fields }))
            .expect("fixture should deserialize")
    }

    // ── Due-date buckets ────────────────────────────────────────

    #[test]
    fn due_buckets_partition_the_calendar() {
        let today = day(2026, 8, 5);
        assert_eq!(due_bucket(Some("2026-08-04"), today), DueBucket::Overdue);
        assert_eq!(due_bucket(Some("2026-08-05"), today), DueBucket::Today);
        assert_eq!(due_bucket(Some("2026-08-06"), today), DueBucket::Tomorrow);
        assert_eq!(due_bucket(Some("2026-08-07"), today), DueBucket::ThisWeek);
        assert_eq!(due_bucket(Some("2026-08-12"), today), DueBucket::ThisWeek);
        assert_eq!(due_bucket(Some("2026-08-13"), today), DueBucket::Future);
    }

    #[test]
    fn missing_due_date_is_none_for_any_today() {
        assert_eq!(due_bucket(None, day(2024, 1, 1)), DueBucket::None);
        assert_eq!(due_bucket(None, day(2030, 12, 31)), DueBucket::None);
    }

    #[test]
    fn unparseable_due_date_is_none() {
        let today = day(2026, 8, 5);
        assert_eq!(due_bucket(Some("soonish"), today), DueBucket::None);
        assert_eq!(due_bucket(Some(""), today), DueBucket::None);
    }

    #[test]
    fn datetime_strings_truncate_to_day() {
        let today = day(2026, 8, 5);
        assert_eq!(
            due_bucket(Some("2026-08-05T16:30:00.000Z"), today),
            DueBucket::Today
        );
    }

    // ── Completion / bug flags ──────────────────────────────────

    #[test]
    fn completion_is_case_folded_substring_match() {
        assert!(is_completed("Done"));
        assert!(is_completed("DONE"));
        assert!(is_completed("Code Review Done"));
        assert!(is_completed("Completed"));
        assert!(is_completed("Done (QA)"));
        assert!(!is_completed("In Progress"));
        assert!(!is_completed("To Do"));
        assert!(!is_completed("Unknown"));
    }

    #[test]
    fn bug_flag_matches_issue_type_substring() {
        let bug = ticket_from(json!({ "issuetype": { "name": "Bug" } }));
        let sub_bug = ticket_from(json!({ "issuetype": { "name": "Sub-Bug" } }));
        let story = ticket_from(json!({ "issuetype": { "name": "Story" } }));
        let cfg = AnalyticsConfig::default();
        let today = day(2026, 8, 5);

        assert!(classify(&bug, today, &cfg).is_bug);
        assert!(classify(&sub_bug, today, &cfg).is_bug);
        assert!(!classify(&story, today, &cfg).is_bug);
    }

    // ── Labels ──────────────────────────────────────────────────

    #[test]
    fn missing_assignee_uses_sentinel() {
        let cfg = AnalyticsConfig::default();
        let ticket = ticket_from(json!({}));
        let classified = classify(&ticket, day(2026, 8, 5), &cfg);
        assert_eq!(classified.assignee, "Unassigned");
        assert_eq!(classified.status, "Unknown");
    }

    #[test]
    fn epic_from_first_candidate_with_name() {
        let cfg = AnalyticsConfig::default();
        let ticket = ticket_from(json!({
            "customfield_10014": { "name": "Checkout" },
            "customfield_10008": { "name": "Legacy" }
        }));
        assert_eq!(classify(&ticket, day(2026, 8, 5), &cfg).epic, "Checkout");
    }

    #[test]
    fn epic_skips_candidates_without_name() {
        let cfg = AnalyticsConfig::default();
        let ticket = ticket_from(json!({
            "customfield_10014": { "id": "10014" },
            "epic": { "name": "Payments" }
        }));
        assert_eq!(classify(&ticket, day(2026, 8, 5), &cfg).epic, "Payments");
    }

    #[test]
    fn epic_falls_back_to_parent_summary() {
        let cfg = AnalyticsConfig::default();
        let ticket = ticket_from(json!({
            "parent": { "fields": { "summary": "Platform umbrella" } }
        }));
        assert_eq!(
            classify(&ticket, day(2026, 8, 5), &cfg).epic,
            "Platform umbrella"
        );
    }

    #[test]
    fn no_epic_sentinel_when_nothing_resolves() {
        let cfg = AnalyticsConfig::default();
        let ticket = ticket_from(json!({ "summary": "orphan" }));
        assert_eq!(classify(&ticket, day(2026, 8, 5), &cfg).epic, "No Epic");
    }

    // ── Full classification ─────────────────────────────────────

    #[test]
    fn classifies_reference_scenario_ticket_a() {
        let cfg = AnalyticsConfig::default();
        let ticket = ticket_from(json!({
            "customfield_10058": 5,
            "status": { "name": "Done" },
            "duedate": "2024-01-01"
        }));
        let classified = classify(&ticket, day(2024, 1, 2), &cfg);
        assert_eq!(classified.story_points, 5.0);
        assert!(classified.is_completed);
        assert_eq!(classified.due_bucket, DueBucket::Overdue);
    }

    #[test]
    fn classifies_reference_scenario_ticket_b() {
        let cfg = AnalyticsConfig::default();
        let ticket = ticket_from(json!({ "status": { "name": "In Progress" } }));
        let classified = classify(&ticket, day(2024, 1, 2), &cfg);
        assert_eq!(classified.story_points, 0.0);
        assert!(!classified.is_completed);
        assert_eq!(classified.due_bucket, DueBucket::None);
    }

    #[test]
    fn classification_does_not_mutate_input() {
        let cfg = AnalyticsConfig::default();
        let ticket = ticket_from(json!({
            "customfield_10058": 5,
            "status": { "name": "Done" }
        }));
        let before = serde_json::to_value(&ticket).unwrap();
        let _ = classify(&ticket, day(2024, 1, 2), &cfg);
        assert_eq!(serde_json::to_value(&ticket).unwrap(), before);
    }
}
