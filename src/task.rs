//! Task data structures.
//!
//! A `Task` is the immutable catalog entry describing a unit of installation work;
//! a `TaskState` is the mutable per-installation record of how that work is going.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::*;

/// A catalog work item. Static for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub team: String,
    pub priority: Priority,
    pub notes: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl Task {
    pub fn new(id: &str, name: &str, team: &str, priority: Priority) -> Self {
        Task {
            id: id.to_string(),
            name: name.to_string(),
            team: team.to_string(),
            priority,
            notes: String::new(),
            depends_on: Vec::new(),
        }
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_string();
        self
    }

    pub fn after(mut self, prerequisites: &[&str]) -> Self {
        self.depends_on = prerequisites.iter().map(|p| p.to_string()).collect();
        self
    }
}

/// Mutable state of one task inside one installation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskState {
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskState {
    /// Move to `status`, stamping `completed_at` on the way into Done and clearing
    /// it on the way out.
    pub fn transition(&mut self, status: Status, now: DateTime<Utc>) {
        match status {
            Status::Done => {
                if self.status != Status::Done || self.completed_at.is_none() {
                    self.completed_at = Some(now);
                }
            }
            _ => self.completed_at = None,
        }
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_transition_stamps_and_clears_completion() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let mut state = TaskState::default();

        state.transition(Status::Done, t0);
        assert_eq!(state.completed_at, Some(t0));

        // Re-marking Done keeps the original completion time.
        state.transition(Status::Done, t1);
        assert_eq!(state.completed_at, Some(t0));

        state.transition(Status::Blocked, t1);
        assert_eq!(state.status, Status::Blocked);
        assert_eq!(state.completed_at, None);
    }
}
