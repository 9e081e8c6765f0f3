use serde::{Deserialize, Serialize};

use crate::classify;
use crate::config::AnalyticsConfig;
use crate::resolve;
use crate::ticket::Ticket;

/// Single-valued presence filter for the story-points / due-date dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    With,
    Without,
}

/// Composable filter over five independent dimensions. Owned by the
/// consumer, passed by value; transitions are pure and return a new state,
/// so states compare with `==` in tests and support undo if ever needed.
///
/// `Default` is the cleared state: no dimension restricts anything.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub story_points: Option<Presence>,
    pub due_date: Option<Presence>,
    pub assignees: Vec<String>,
    pub epics: Vec<String>,
    pub statuses: Vec<String>,
}

/// One toggle event against a filter dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterToggle {
    StoryPoints(Presence),
    DueDate(Presence),
    Assignee(String),
    Epic(String),
    Status(String),
}

impl FilterState {
    /// Apply one toggle, returning the successor state.
    ///
    /// Single-valued dimensions always overwrite; they are cleared only by
    /// the full reset. Multi-valued dimensions flip membership (applying
    /// the same value twice restores the prior state), and insertion order
    /// is preserved for deterministic output.
    pub fn toggled(&self, toggle: FilterToggle) -> FilterState {
        let mut next = self.clone();
        match toggle {
            FilterToggle::StoryPoints(p) => next.story_points = Some(p),
            FilterToggle::DueDate(p) => next.due_date = Some(p),
            FilterToggle::Assignee(v) => flip(&mut next.assignees, v),
            FilterToggle::Epic(v) => flip(&mut next.epics, v),
            FilterToggle::Status(v) => flip(&mut next.statuses, v),
        }
        next
    }

    /// The cleared state: every dimension zeroed at once. Partial reset is
    /// not supported.
    pub fn cleared() -> FilterState {
        FilterState::default()
    }

    pub fn is_empty(&self) -> bool {
        self == &FilterState::default()
    }
}

fn flip(values: &mut Vec<String>, value: String) {
    match values.iter().position(|v| *v == value) {
        Some(idx) => {
            values.remove(idx);
        }
        None => values.push(value),
    }
}

fn has_due_date(ticket: &Ticket) -> bool {
    ticket
        .fields
        .duedate
        .as_deref()
        .is_some_and(|d| !d.is_empty())
}

/// Narrow a ticket collection by the filter state. Presence dimensions
/// apply first, then assignees, epics, statuses: AND across dimensions, OR
/// within a selected set. An empty multi-valued selection imposes no
/// restriction. Labels come from the same classification rules the
/// aggregator uses, so filtered lists and aggregate counts can never skew.
pub fn apply_filter<'a>(
    tickets: &'a [Ticket],
    state: &FilterState,
    config: &AnalyticsConfig,
) -> Vec<&'a Ticket> {
    let mut kept: Vec<&Ticket> = tickets.iter().collect();

    if let Some(points) = state.story_points {
        kept.retain(|t| {
            let has = resolve::has_positive(&t.fields, &config.story_points_fields);
            match points {
                Presence::With => has,
                Presence::Without => !has,
            }
        });
    }

    if let Some(due) = state.due_date {
        kept.retain(|t| match due {
            Presence::With => has_due_date(t),
            Presence::Without => !has_due_date(t),
        });
    }

    if !state.assignees.is_empty() {
        kept.retain(|t| {
            let label = classify::assignee_label(&t.fields);
            state.assignees.contains(&label)
        });
    }

    if !state.epics.is_empty() {
        kept.retain(|t| {
            let label = classify::epic_label(&t.fields, &config.epic_fields);
            state.epics.contains(&label)
        });
    }

    if !state.statuses.is_empty() {
        kept.retain(|t| {
            let label = classify::status_label(&t.fields);
            state.statuses.contains(&label)
        });
    }

    kept
}

/// Counts shown next to the presence toggles. Always computed against the
/// full collection so the with/without split stays visible regardless of
/// other active filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceCounts {
    pub with: usize,
    pub without: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionCount {
    pub label: String,
    pub count: usize,
}

/// Per-dimension counts for display. The presence splits cover the full
/// collection; status/assignee/epic counts cover the current filtered set,
/// so they reflect the effect of the other active filters. Group labels
/// appear in first-seen collection order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSummary {
    pub story_points: PresenceCounts,
    pub due_date: PresenceCounts,
    pub assignees: Vec<DimensionCount>,
    pub epics: Vec<DimensionCount>,
    pub statuses: Vec<DimensionCount>,
}

pub fn summarize(
    tickets: &[Ticket],
    filtered: &[&Ticket],
    config: &AnalyticsConfig,
) -> FilterSummary {
    let with_points = tickets
        .iter()
        .filter(|t| resolve::has_positive(&t.fields, &config.story_points_fields))
        .count();
    let with_due = tickets.iter().filter(|t| has_due_date(t)).count();

    let mut assignees: Vec<DimensionCount> = Vec::new();
    let mut epics: Vec<DimensionCount> = Vec::new();
    let mut statuses: Vec<DimensionCount> = Vec::new();

    for t in filtered {
        bump(&mut assignees, classify::assignee_label(&t.fields));
        bump(&mut epics, classify::epic_label(&t.fields, &config.epic_fields));
        bump(&mut statuses, classify::status_label(&t.fields));
    }

    FilterSummary {
        story_points: PresenceCounts {
            with: with_points,
            without: tickets.len() - with_points,
        },
        due_date: PresenceCounts {
            with: with_due,
            without: tickets.len() - with_due,
        },
        assignees,
        epics,
        statuses,
    }
}

fn bump(counts: &mut Vec<DimensionCount>, label: String) {
    match counts.iter().position(|c| c.label == label) {
        Some(i) => counts[i].count += 1,
        None => counts.push(DimensionCount { label, count: 1 }),
    }
}
