use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the tracker's field metadata (`/rest/api/3/field`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraField {
    pub id: String,
    pub name: Option<String>,
}

/// Pick the story-points field from tracker field metadata: the first field
/// whose name case-insensitively contains "story point".
pub fn detect_story_points_field(fields: &[JiraField]) -> Option<&JiraField> {
    fields.iter().find(|f| {
        f.name
            .as_deref()
            .is_some_and(|n| n.to_lowercase().contains("story point"))
    })
}

/// Fallback detection when the metadata lookup found nothing: scan the first
/// issue for a `customfield_*` member holding a plausible estimate (numeric,
/// strictly between 0 and 100).
pub fn detect_from_issues(issues: &[Value]) -> Option<String> {
    let fields = issues.first()?.get("fields")?.as_object()?;
    fields.iter().find_map(|(key, value)| {
        if !key.starts_with("customfield") {
            return None;
        }
        let n = value.as_f64()?;
        (n > 0.0 && n < 100.0).then(|| key.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(id: &str, name: &str) -> JiraField {
        JiraField {
            id: id.to_string(),
            name: Some(name.to_string()),
        }
    }

    #[test]
    fn detects_story_points_by_name() {
        let fields = vec![
            field("summary", "Summary"),
            field("customfield_10058", "Story Points"),
            field("customfield_10202", "Story point estimate"),
        ];
        let detected = detect_story_points_field(&fields).unwrap();
        assert_eq!(detected.id, "customfield_10058");
    }

    #[test]
    fn detection_is_case_insensitive() {
        let fields = vec![field("customfield_7", "STORY POINT ESTIMATE")];
        assert!(detect_story_points_field(&fields).is_some());
    }

    #[test]
    fn no_match_returns_none() {
        let fields = vec![field("summary", "Summary"), field("duedate", "Due date")];
        assert!(detect_story_points_field(&fields).is_none());

        let nameless = vec![JiraField {
            id: "customfield_1".to_string(),
            name: None,
        }];
        assert!(detect_story_points_field(&nameless).is_none());
    }

    #[test]
    fn fallback_detects_plausible_estimate_field() {
        let issues = vec![json!({
            "key": "MPS-1",
            "fields": {
                "summary": "not a number",
                "customfield_10099": 250,
                "customfield_10058": 5
            }
        })];
        assert_eq!(
            detect_from_issues(&issues),
            Some("customfield_10058".to_string())
        );
    }

    #[test]
    fn fallback_ignores_out_of_range_and_non_custom_fields() {
        let issues = vec![json!({
            "key": "MPS-1",
            "fields": {
                "rank": 3,
                "customfield_10099": 0,
                "customfield_10100": 100
            }
        })];
        assert!(detect_from_issues(&issues).is_none());
    }

    #[test]
    fn fallback_with_no_issues_returns_none() {
        assert!(detect_from_issues(&[]).is_none());
    }
}
