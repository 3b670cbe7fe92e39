//! Installations: one independent copy of the pipeline state per deployment environment.
//!
//! Each installation is keyed by a sanitized id derived from its display name and owns
//! a `PhaseState` per catalog phase, each holding a `TaskState` per catalog task.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::aggregate::derive_phase_status;
use crate::catalog::Catalog;
use crate::fields::*;
use crate::task::TaskState;

fn enabled_default() -> bool {
    true
}

/// Per-installation state of one phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhaseState {
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// Derived from `tasks`; refreshed before every save and never read back.
    #[serde(default, skip_deserializing)]
    pub status: Status,
    #[serde(default)]
    pub tasks: BTreeMap<String, TaskState>,
}

impl Default for PhaseState {
    fn default() -> Self {
        PhaseState { enabled: true, status: Status::Pending, tasks: BTreeMap::new() }
    }
}

/// Installation metadata shown alongside its progress.
#[derive(Debug, Clone, Default)]
pub struct InstallationSpec {
    pub name: String,
    pub environment: Environment,
    pub description: String,
    pub target_date: Option<NaiveDate>,
    pub sgbd: DbEngine,
    pub os_server: OsServer,
}

/// A named deployment environment owning a full copy of the pipeline state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Installation {
    pub name: String,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub sgbd: DbEngine,
    #[serde(default)]
    pub os_server: OsServer,
    #[serde(default = "enabled_default")]
    pub active: bool,
    #[serde(default)]
    pub phases: BTreeMap<String, PhaseState>,
}

impl Installation {
    /// Create an installation with every catalog task Pending.
    pub fn new(spec: InstallationSpec, catalog: &Catalog, now: DateTime<Utc>) -> Self {
        let mut installation = Installation {
            name: spec.name,
            environment: spec.environment,
            description: spec.description,
            created_at: now,
            target_date: spec.target_date,
            sgbd: spec.sgbd,
            os_server: spec.os_server,
            active: true,
            phases: BTreeMap::new(),
        };
        installation.reconcile(catalog);
        installation
    }

    /// Bring the phase/task keys in line with the catalog: unknown keys are dropped,
    /// missing keys are added as Pending.
    pub fn reconcile(&mut self, catalog: &Catalog) {
        self.phases.retain(|phase_id, _| {
            let known = catalog.phase(phase_id).is_some();
            if !known {
                warn!(installation = %self.name, phase = %phase_id, "dropping phase not in catalog");
            }
            known
        });
        for def in &catalog.phases {
            let phase = self.phases.entry(def.id.clone()).or_default();
            phase.tasks.retain(|task_id, _| {
                let known = def.tasks.iter().any(|t| &t.id == task_id);
                if !known {
                    warn!(phase = %def.id, task = %task_id, "dropping task state not in catalog");
                }
                known
            });
            for t in &def.tasks {
                phase.tasks.entry(t.id.clone()).or_default();
            }
        }
        self.refresh_status();
    }

    /// Recompute the stored copy of each phase's derived status.
    pub fn refresh_status(&mut self) {
        for phase in self.phases.values_mut() {
            phase.status = derive_phase_status(phase);
        }
    }

    /// Every task back to its default state and every phase re-enabled.
    pub fn reset(&mut self) {
        for phase in self.phases.values_mut() {
            phase.enabled = true;
            for state in phase.tasks.values_mut() {
                *state = TaskState::default();
            }
        }
        self.refresh_status();
    }

    pub fn task_state(&self, catalog: &Catalog, task_id: &str) -> Option<&TaskState> {
        let phase = catalog.phase_of(task_id)?;
        self.phases.get(&phase.id)?.tasks.get(task_id)
    }

    pub fn task_state_mut(&mut self, catalog: &Catalog, task_id: &str) -> Option<&mut TaskState> {
        let phase = catalog.phase_of(task_id)?;
        self.phases.get_mut(&phase.id)?.tasks.get_mut(task_id)
    }
}

/// Convert a display name to a safe installation id.
/// Lowercases and collapses any run of non-alphanumerics into a single underscore.
pub fn sanitize_installation_id(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
