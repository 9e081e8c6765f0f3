use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ticket::TicketFields;

/// Priority-ordered list of attribute identifiers for one derived metric.
///
/// Trackers attach the same logical value (a story-point estimate, an epic
/// reference) under deployment-specific field ids; consumers configure the
/// candidate order once instead of repeating OR-chains at every call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldCandidates(Vec<String>);

impl FieldCandidates {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(ids.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a copy with `id` promoted to the front of the list. Used to
    /// prefer a field identifier resolved at runtime (e.g. from tracker
    /// field metadata) over the static deployment defaults.
    pub fn with_priority(&self, id: &str) -> Self {
        let mut ids = Vec::with_capacity(self.0.len() + 1);
        ids.push(id.to_string());
        ids.extend(self.0.iter().filter(|c| c.as_str() != id).cloned());
        Self(ids)
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Resolve a numeric metric from the first candidate that is present and
/// coerces to a finite number. Non-numeric values are treated as absent and
/// resolution continues down the list. Exhaustion yields `0.0`: "no
/// estimate" is a valid business state, not an error.
pub fn resolve(fields: &TicketFields, candidates: &FieldCandidates) -> f64 {
    candidates
        .iter()
        .find_map(|id| fields.field(id).and_then(numeric))
        .unwrap_or(0.0)
}

/// True iff ANY candidate resolves to a positive number. This is the
/// presence rule used by the story-points filter dimension: an explicit
/// zero estimate counts as "without points".
pub fn has_positive(fields: &TicketFields, candidates: &FieldCandidates) -> bool {
    candidates
        .iter()
        .any(|id| fields.field(id).and_then(numeric).is_some_and(|v| v > 0.0))
}
