use serde::Deserialize;
use sprintlens_analytics::FilterState;
use sprintlens_common::error::SprintlensError;

/// Search request from the embedding application. Tracker credentials
/// travel with every request; the proxy stores nothing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSearchRequest {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub api_token: String,
    pub jql: Option<String>,
    /// Optional filter applied server-side before aggregation.
    pub filter: Option<FilterState>,
}

impl TicketSearchRequest {
    pub fn validate(&self) -> Result<(), SprintlensError> {
        let mut missing = Vec::new();
        if self.domain.trim().is_empty() {
            missing.push("domain");
        }
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        if self.api_token.trim().is_empty() {
            missing.push("apiToken");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SprintlensError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_request_validates() {
        let req: TicketSearchRequest = serde_json::from_value(json!({
            "domain": "https://corp.atlassian.net",
            "email": "pm@corp.com",
            "apiToken": "tok",
            "jql": "sprint = 44"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.jql.as_deref(), Some("sprint = 44"));
        assert!(req.filter.is_none());
    }

    #[test]
    fn missing_credentials_are_listed() {
        let req: TicketSearchRequest =
            serde_json::from_value(json!({ "domain": "https://corp.atlassian.net" })).unwrap();
        let err = req.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("email"));
        assert!(msg.contains("apiToken"));
        assert!(!msg.contains("domain,"));
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let req: TicketSearchRequest = serde_json::from_value(json!({
            "domain": "  ",
            "email": "pm@corp.com",
            "apiToken": "tok"
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn filter_deserializes_when_present() {
        let req: TicketSearchRequest = serde_json::from_value(json!({
            "domain": "d",
            "email": "e",
            "apiToken": "t",
            "filter": { "storyPoints": "without", "statuses": ["Done"] }
        }))
        .unwrap();
        let filter = req.filter.unwrap();
        assert_eq!(filter.statuses, vec!["Done"]);
    }
}
