use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sprintlens_common::error::{SprintlensError, SprintlensResult};

/// One work record from the tracker search API. Immutable input: the
/// engine classifies and aggregates tickets but never writes them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub key: String,
    #[serde(default)]
    pub fields: TicketFields,
}

/// The `fields` mapping of a raw ticket. Known members are typed; every
/// vendor custom field (`customfield_*`, epic references, alternate
/// estimate fields) lands in `extra` so candidate lists can address them
/// by identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketFields {
    pub summary: Option<String>,
    pub issuetype: Option<NamedField>,
    pub status: Option<NamedField>,
    pub assignee: Option<Assignee>,
    pub duedate: Option<String>,
    pub description: Option<Value>,
    pub parent: Option<ParentRef>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedField {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentRef {
    pub fields: Option<ParentFields>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentFields {
    pub summary: Option<String>,
}

impl TicketFields {
    /// Look up a vendor field by identifier.
    pub fn field(&self, id: &str) -> Option<&Value> {
        self.extra.get(id).filter(|v| !v.is_null())
    }

    pub fn status_name(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.name.as_deref())
    }

    pub fn issue_type_name(&self) -> Option<&str> {
        self.issuetype.as_ref().and_then(|t| t.name.as_deref())
    }

    pub fn assignee_name(&self) -> Option<&str> {
        self.assignee.as_ref().and_then(|a| a.display_name.as_deref())
    }

    pub fn parent_summary(&self) -> Option<&str> {
        self.parent
            .as_ref()
            .and_then(|p| p.fields.as_ref())
            .and_then(|f| f.summary.as_deref())
    }

    /// Ticket description as plain text. Descriptions arrive either as a
    /// string or as a rich-text document; for documents the first text run
    /// of the first paragraph is extracted.
    pub fn description_text(&self) -> Option<&str> {
        match self.description.as_ref()? {
            Value::String(s) => Some(s.as_str()),
            doc => doc
                .pointer("/content/0/content/0/text")
                .and_then(Value::as_str),
        }
    }
}

/// Parse the upstream search payload into a ticket collection.
///
/// A payload without a well-formed `issues` array is the one fatal
/// precondition failure of an analytics pass; individual tickets with
/// missing optional fields always parse.
pub fn parse_tickets(payload: &Value) -> SprintlensResult<Vec<Ticket>> {
    let issues = payload
        .get("issues")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            SprintlensError::InvalidPayload("issues array not found in response".to_string())
        })?;

    issues
        .iter()
        .map(|raw| {
            serde_json::from_value(raw.clone())
                .map_err(|e| SprintlensError::InvalidPayload(format!("malformed issue: {e}")))
        })
        .collect()
}
