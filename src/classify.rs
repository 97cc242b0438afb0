//! Pure classification of tasks into Eisenhower matrix quadrants.
//!
//! Everything here is a total function over task attributes and an
//! explicit `now`; there is no hidden clock read and no failure path.
//! Quadrant membership is always derived, never stored, so it can be
//! recomputed from scratch on every pass.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Due, Task};

/// Keywords that mark low-priority tasks as important.
///
/// Deliberately coarse; treat this as configuration rather than an
/// exhaustive classifier.
pub const IMPORTANT_KEYWORDS: [&str; 5] =
    ["project", "deadline", "meeting", "presentation", "review"];

/// Tasks due within this many days count as urgent.
pub const URGENT_WITHIN_DAYS: i64 = 2;

/// Time-pressure axis of the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    Urgent,
    NotUrgent,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Urgent => write!(f, "urgent"),
            Self::NotUrgent => write!(f, "not-urgent"),
        }
    }
}

/// Significance axis of the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Importance {
    Important,
    NotImportant,
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Important => write!(f, "important"),
            Self::NotImportant => write!(f, "not-important"),
        }
    }
}

/// One of the four prioritization buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quadrant {
    Do,
    Schedule,
    Delegate,
    Delete,
}

impl Quadrant {
    /// Canonical matrix order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::Do,
        Quadrant::Schedule,
        Quadrant::Delegate,
        Quadrant::Delete,
    ];

    /// The priority a task receives when dropped on this quadrant.
    pub fn priority(self) -> u8 {
        match self {
            Self::Do => 4,
            Self::Schedule => 3,
            Self::Delegate => 2,
            Self::Delete => 1,
        }
    }

    /// Display title for the quadrant.
    pub fn title(self) -> &'static str {
        match self {
            Self::Do => "Do",
            Self::Schedule => "Schedule",
            Self::Delegate => "Delegate",
            Self::Delete => "Delete",
        }
    }

    /// One-line description of the quadrant.
    pub fn blurb(self) -> &'static str {
        match self {
            Self::Do => "Urgent & Important",
            Self::Schedule => "Important, Not Urgent",
            Self::Delegate => "Urgent, Not Important",
            Self::Delete => "Not Urgent, Not Important",
        }
    }

    /// Map the two axes onto a quadrant. Exhaustive and exclusive:
    /// every combination lands in exactly one bucket.
    pub fn from_axes(urgency: Urgency, importance: Importance) -> Self {
        match (urgency, importance) {
            (Urgency::Urgent, Importance::Important) => Self::Do,
            (Urgency::NotUrgent, Importance::Important) => Self::Schedule,
            (Urgency::Urgent, Importance::NotImportant) => Self::Delegate,
            (Urgency::NotUrgent, Importance::NotImportant) => Self::Delete,
        }
    }
}

impl std::fmt::Display for Quadrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Do => write!(f, "do"),
            Self::Schedule => write!(f, "schedule"),
            Self::Delegate => write!(f, "delegate"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Derived classification of a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub urgency: Urgency,
    pub importance: Importance,
    pub quadrant: Quadrant,
}

/// Whole days until the due date, rounded up.
///
/// The due *date* is taken at midnight UTC regardless of any
/// time-of-day the remote attaches, so a task due today yields 0 or
/// less and an overdue one goes negative.
pub fn days_until_due(due: &Due, now: DateTime<Utc>) -> i64 {
    let due_start = due.date.and_time(NaiveTime::MIN).and_utc();
    let secs = (due_start - now).num_seconds();
    secs.div_euclid(86_400) + i64::from(secs.rem_euclid(86_400) > 0)
}

/// Urgency of a task at the given instant.
///
/// The due-date rule takes precedence whenever a due date exists; the
/// priority rule applies only to undated tasks. The two signals are
/// never merged.
pub fn urgency(task: &Task, now: DateTime<Utc>) -> Urgency {
    if let Some(due) = &task.due {
        return if days_until_due(due, now) <= URGENT_WITHIN_DAYS {
            Urgency::Urgent
        } else {
            Urgency::NotUrgent
        };
    }
    if task.priority >= 3 {
        Urgency::Urgent
    } else {
        Urgency::NotUrgent
    }
}

/// Importance of a task: high priority, or a keyword hit in the
/// content for low-priority tasks.
pub fn importance(task: &Task) -> Importance {
    if task.priority >= 3 {
        return Importance::Important;
    }
    let content = task.content.to_lowercase();
    if IMPORTANT_KEYWORDS.iter().any(|k| content.contains(k)) {
        Importance::Important
    } else {
        Importance::NotImportant
    }
}

/// Classify a task at the given instant.
pub fn classify(task: &Task, now: DateTime<Utc>) -> Classification {
    let urgency = urgency(task, now);
    let importance = importance(task);
    Classification {
        urgency,
        importance,
        quadrant: Quadrant::from_axes(urgency, importance),
    }
}
