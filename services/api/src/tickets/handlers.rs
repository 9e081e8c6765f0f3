use std::collections::HashSet;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::Value;

use sprintlens_analytics::{aggregate, apply_filter, parse_tickets, summarize, FilterState, Ticket};

use crate::error::ApiError;
use crate::jira::client::TrackerCredentials;
use crate::jira::models::{detect_from_issues, detect_story_points_field};
use crate::tickets::requests::TicketSearchRequest;
use crate::tickets::responses::TicketSearchResponse;
use crate::AppState;

const DEFAULT_JQL: &str = "ORDER BY created DESC";
const DETECTED_FIELD_NAME: &str = "Story Points (detected)";

/// Query the tracker, resolve the deployment's story-points field, apply
/// the requested filter and aggregate the result into a sprint snapshot.
pub async fn search_tickets(
    State(state): State<AppState>,
    Json(req): Json<TicketSearchRequest>,
) -> Result<Json<TicketSearchResponse>, ApiError> {
    req.validate()?;

    let creds = TrackerCredentials {
        domain: req.domain.trim_end_matches('/').to_string(),
        email: req.email.clone(),
        api_token: req.api_token.clone(),
    };
    let jql = req.jql.as_deref().unwrap_or(DEFAULT_JQL);

    let fields = state.jira.fetch_fields(&creds).await?;
    let detected = detect_story_points_field(&fields).cloned();

    tracing::info!(jql = %jql, "searching tracker issues");
    let payload = state.jira.search(&creds, jql).await?;
    let tickets = parse_tickets(&payload)?;
    tracing::info!(count = tickets.len(), "fetched tracker issues");

    let issues: Vec<Value> = payload
        .get("issues")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let (field_id, field_name) = match detected {
        Some(f) => (Some(f.id), f.name),
        None => match detect_from_issues(&issues) {
            Some(id) => (Some(id), Some(DETECTED_FIELD_NAME.to_string())),
            None => (None, None),
        },
    };

    // Thread the resolved identifier through the candidate list explicitly;
    // downstream consumers read it from the response, never from shared state.
    let mut config = state.analytics.clone();
    if let Some(id) = &field_id {
        config.story_points_fields = config.story_points_fields.with_priority(id);
    }

    let filter = req.filter.unwrap_or_else(FilterState::cleared);
    let kept = apply_filter(&tickets, &filter, &config);
    let filter_summary = summarize(&tickets, &kept, &config);

    let kept_keys: HashSet<&str> = kept.iter().map(|t| t.key.as_str()).collect();
    let kept_owned: Vec<Ticket> = kept.into_iter().cloned().collect();

    let today = Utc::now().date_naive();
    let snapshot = aggregate(&kept_owned, today, &config);

    let filtered_issues: Vec<Value> = issues
        .into_iter()
        .filter(|issue| {
            issue
                .get("key")
                .and_then(Value::as_str)
                .is_some_and(|k| kept_keys.contains(k))
        })
        .collect();

    let total = filtered_issues.len();
    Ok(Json(TicketSearchResponse {
        issues: filtered_issues,
        total,
        story_points_field_id: field_id,
        story_points_field_name: field_name,
        snapshot,
        filter_summary,
    }))
}
