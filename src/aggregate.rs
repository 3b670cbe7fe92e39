//! Status aggregation: phase status, progress and team rollups derived from task states.
//!
//! Everything here is a pure function of the current state and is recomputed on every
//! read. Disabled phases are excluded from installation-level totals.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::fields::Status;
use crate::installation::{Installation, PhaseState};

/// Completed-out-of-total counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Percentage complete; zero when there is nothing to complete.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 * 100.0 / self.total as f64
        }
    }
}

impl std::ops::Add for Progress {
    type Output = Progress;

    fn add(self, rhs: Progress) -> Progress {
        Progress {
            completed: self.completed + rhs.completed,
            total: self.total + rhs.total,
        }
    }
}

/// Per-team task counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamLoad {
    pub total: usize,
    pub done: usize,
    pub blocked: usize,
}

/// Done tasks out of all tasks in the phase.
pub fn phase_progress(phase: &PhaseState) -> Progress {
    Progress {
        completed: phase.tasks.values().filter(|s| s.status == Status::Done).count(),
        total: phase.tasks.len(),
    }
}

/// Collapse a set of task statuses into one, in precedence order:
/// all Done/Skipped, then any Blocked, then any InProgress/Done, else Pending.
pub fn fold_status<I>(statuses: I) -> Status
where
    I: IntoIterator<Item = Status>,
{
    let mut any = false;
    let mut all_finished = true;
    let mut any_blocked = false;
    let mut any_started = false;
    for s in statuses {
        any = true;
        match s {
            Status::Done => any_started = true,
            Status::Skipped => {}
            Status::Blocked => {
                all_finished = false;
                any_blocked = true;
            }
            Status::InProgress => {
                all_finished = false;
                any_started = true;
            }
            Status::Pending => all_finished = false,
        }
    }
    if !any {
        Status::Pending
    } else if all_finished {
        Status::Done
    } else if any_blocked {
        Status::Blocked
    } else if any_started {
        Status::InProgress
    } else {
        Status::Pending
    }
}

pub fn derive_phase_status(phase: &PhaseState) -> Status {
    fold_status(phase.tasks.values().map(|s| s.status))
}

fn enabled_phases(installation: &Installation) -> impl Iterator<Item = &PhaseState> {
    installation.phases.values().filter(|p| p.enabled)
}

/// Sum of phase progress over enabled phases only.
pub fn installation_progress(installation: &Installation) -> Progress {
    enabled_phases(installation)
        .map(phase_progress)
        .fold(Progress::default(), |acc, p| acc + p)
}

/// Overall status across every task of every enabled phase.
pub fn installation_status(installation: &Installation) -> Status {
    fold_status(
        enabled_phases(installation).flat_map(|p| p.tasks.values().map(|s| s.status)),
    )
}

/// Task counts per team over enabled phases.
pub fn team_workload(catalog: &Catalog, installation: &Installation) -> BTreeMap<String, TeamLoad> {
    let mut loads: BTreeMap<String, TeamLoad> = BTreeMap::new();
    for def in &catalog.phases {
        let Some(phase) = installation.phases.get(&def.id) else { continue };
        if !phase.enabled {
            continue;
        }
        for task in &def.tasks {
            let Some(state) = phase.tasks.get(&task.id) else { continue };
            let load = loads.entry(task.team.clone()).or_default();
            load.total += 1;
            match state.status {
                Status::Done => load.done += 1,
                Status::Blocked => load.blocked += 1,
                _ => {}
            }
        }
    }
    loads
}
