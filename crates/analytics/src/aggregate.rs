use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::classify::{classify, is_in_progress, ClassifiedTicket, DueBucket};
use crate::config::{AnalyticsConfig, UNASSIGNED};
use crate::ticket::Ticket;

/// Sprint-level aggregate, recomputed in full from the ticket collection on
/// every pass. Serializable so the embedding application can persist it as
/// a historical record keyed by sprint/timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintSnapshot {
    pub total_story_points: f64,
    pub completed_story_points: f64,
    pub in_progress_story_points: f64,
    /// Story points completed within the current window.
    pub velocity: f64,
    /// Completed share of total points, percent, one decimal. Zero for an
    /// empty or unestimated sprint.
    pub productivity: f64,
    pub bug_count: usize,
    pub completed_bug_count: usize,
    /// Tickets past due AND still incomplete. A completed ticket is never
    /// counted as overdue.
    pub overdue_tickets: usize,
    pub total_tickets: usize,
    pub completed_tickets: usize,
    /// Unique assignees, excluding the "Unassigned" sentinel.
    pub resource_count: usize,
    pub due_points: DuePointTotals,
    pub capacity: CapacityProjection,
    pub per_assignee: Vec<AssigneeBreakdown>,
    pub per_epic: Vec<EpicBreakdown>,
    pub points_distribution: Vec<PointsRange>,
}

/// Story-point totals per due-date bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuePointTotals {
    pub overdue: f64,
    pub today: f64,
    pub tomorrow: f64,
    pub this_week: f64,
    pub future: f64,
    pub none: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityStatus {
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "At Risk")]
    AtRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionStatus {
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "Behind Schedule")]
    BehindSchedule,
}

/// Capacity model: a fixed per-resource daily point rate projected over the
/// remaining sprint days. The two status labels are independent advisory
/// signals, not errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityProjection {
    pub sprint_duration_days: i64,
    pub elapsed_days: i64,
    pub remaining_days: i64,
    pub remaining_capacity: f64,
    pub expected_completed_by_now: f64,
    pub remaining_work: f64,
    pub capacity_status: CapacityStatus,
    pub completion_status: CompletionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssigneeBreakdown {
    pub assignee: String,
    pub total_points: f64,
    pub completed_points: f64,
    pub ticket_count: usize,
    /// Full-sprint point target for one resource.
    pub target: f64,
    /// Completed share of this assignee's own points, whole percent.
    pub productivity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpicBreakdown {
    pub epic: String,
    pub ticket_count: usize,
    pub total_points: f64,
}

/// One bar of the estimate-size histogram.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsRange {
    pub range: String,
    pub ticket_count: usize,
    pub story_points: f64,
}

/// Fold a ticket collection into a sprint snapshot. Classifies every ticket
/// exactly once; O(n) over the full collection.
pub fn aggregate(tickets: &[Ticket], today: NaiveDate, config: &AnalyticsConfig) -> SprintSnapshot {
    let classified: Vec<ClassifiedTicket> = tickets
        .iter()
        .map(|t| classify(t, today, config))
        .collect();

    let mut total_points = 0.0;
    let mut completed_points = 0.0;
    let mut in_progress_points = 0.0;
    let mut bug_count = 0;
    let mut completed_bug_count = 0;
    let mut overdue_tickets = 0;
    let mut completed_tickets = 0;
    let mut due_points = DuePointTotals::default();
    let mut assignees: HashSet<&str> = HashSet::new();

    for t in &classified {
        total_points += t.story_points;
        if t.is_completed {
            completed_tickets += 1;
            completed_points += t.story_points;
        } else if is_in_progress(&t.status) {
            in_progress_points += t.story_points;
        }
        if t.is_bug {
            bug_count += 1;
            if t.is_completed {
                completed_bug_count += 1;
            }
        }
        if t.due_bucket == DueBucket::Overdue && !t.is_completed {
            overdue_tickets += 1;
        }
        if t.assignee != UNASSIGNED {
            assignees.insert(t.assignee.as_str());
        }

        let slot = match t.due_bucket {
            DueBucket::Overdue => &mut due_points.overdue,
            DueBucket::Today => &mut due_points.today,
            DueBucket::Tomorrow => &mut due_points.tomorrow,
            DueBucket::ThisWeek => &mut due_points.this_week,
            DueBucket::Future => &mut due_points.future,
            DueBucket::None => &mut due_points.none,
        };
        *slot += t.story_points;
    }

    let resource_count = assignees.len();
    let productivity = if total_points > 0.0 {
        round1(completed_points / total_points * 100.0)
    } else {
        0.0
    };

    SprintSnapshot {
        total_story_points: total_points,
        completed_story_points: completed_points,
        in_progress_story_points: in_progress_points,
        velocity: completed_points,
        productivity,
        bug_count,
        completed_bug_count,
        overdue_tickets,
        total_tickets: classified.len(),
        completed_tickets,
        resource_count,
        due_points,
        capacity: project_capacity(total_points, completed_points, resource_count, today, config),
        per_assignee: per_assignee(&classified, config),
        per_epic: per_epic(&classified),
        points_distribution: points_distribution(&classified),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn project_capacity(
    total_points: f64,
    completed_points: f64,
    resource_count: usize,
    today: NaiveDate,
    config: &AnalyticsConfig,
) -> CapacityProjection {
    let duration = config.sprint_duration_days.max(0);
    let remaining = match config.sprint_end {
        Some(end) => (end - today).num_days().clamp(0, duration),
        None => duration,
    };
    let elapsed = duration - remaining;
    let rate = config.points_per_resource_per_day;
    let resources = resource_count as f64;

    let remaining_capacity = resources * remaining as f64 * rate;
    let expected_completed_by_now = resources * elapsed as f64 * rate;
    let remaining_work = total_points - completed_points;

    let capacity_status = if remaining_work <= remaining_capacity {
        CapacityStatus::OnTrack
    } else {
        CapacityStatus::AtRisk
    };
    let completion_status = if completed_points >= expected_completed_by_now {
        CompletionStatus::OnTrack
    } else {
        CompletionStatus::BehindSchedule
    };

    CapacityProjection {
        sprint_duration_days: duration,
        elapsed_days: elapsed,
        remaining_days: remaining,
        remaining_capacity,
        expected_completed_by_now,
        remaining_work,
        capacity_status,
        completion_status,
    }
}

// Grouping keeps first-seen order so equal-score groups stay in collection
// order after the stable sort.
fn per_assignee(classified: &[ClassifiedTicket], config: &AnalyticsConfig) -> Vec<AssigneeBreakdown> {
    let target = config.sprint_duration_days.max(0) as f64 * config.points_per_resource_per_day;
    let mut groups: Vec<AssigneeBreakdown> = Vec::new();

    for t in classified {
        let idx = match groups.iter().position(|g| g.assignee == t.assignee) {
            Some(i) => i,
            None => {
                groups.push(AssigneeBreakdown {
                    assignee: t.assignee.clone(),
                    total_points: 0.0,
                    completed_points: 0.0,
                    ticket_count: 0,
                    target,
                    productivity: 0.0,
                });
                groups.len() - 1
            }
        };
        let entry = &mut groups[idx];
        entry.total_points += t.story_points;
        entry.ticket_count += 1;
        if t.is_completed {
            entry.completed_points += t.story_points;
        }
    }

    for g in &mut groups {
        g.productivity = if g.total_points > 0.0 {
            (g.completed_points / g.total_points * 100.0).round()
        } else {
            0.0
        };
    }

    groups.sort_by(|a, b| {
        b.total_points
            .partial_cmp(&a.total_points)
            .unwrap_or(Ordering::Equal)
    });
    groups
}

fn per_epic(classified: &[ClassifiedTicket]) -> Vec<EpicBreakdown> {
    let mut groups: Vec<EpicBreakdown> = Vec::new();

    for t in classified {
        let idx = match groups.iter().position(|g| g.epic == t.epic) {
            Some(i) => i,
            None => {
                groups.push(EpicBreakdown {
                    epic: t.epic.clone(),
                    ticket_count: 0,
                    total_points: 0.0,
                });
                groups.len() - 1
            }
        };
        groups[idx].ticket_count += 1;
        groups[idx].total_points += t.story_points;
    }

    groups.sort_by(|a, b| b.ticket_count.cmp(&a.ticket_count));
    groups
}

const RANGE_LABELS: [&str; 5] = ["0", "1-3", "4-8", "9-13", "14+"];

fn points_distribution(classified: &[ClassifiedTicket]) -> Vec<PointsRange> {
    let mut ranges: Vec<PointsRange> = RANGE_LABELS
        .iter()
        .map(|label| PointsRange {
            range: (*label).to_string(),
            ticket_count: 0,
            story_points: 0.0,
        })
        .collect();

    for t in classified {
        let p = t.story_points;
        let idx = if p == 0.0 {
            0
        } else if p <= 3.0 {
            1
        } else if p <= 8.0 {
            2
        } else if p <= 13.0 {
            3
        } else {
            4
        };
        ranges[idx].ticket_count += 1;
        if idx > 0 {
            ranges[idx].story_points += p;
        }
    }

    ranges
}
