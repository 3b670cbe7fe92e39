//! Typed state changes and the single entry point that applies them.
//!
//! Every edit to installation state goes through `Database::apply`. Lookups are
//! validated before anything is written, so a failed mutation leaves the state untouched.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::catalog::Catalog;
use crate::db::Database;
use crate::error::{Result, TrackerError};
use crate::fields::Status;

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    SetTaskStatus { installation: String, task: String, status: Status },
    SetAssignee { installation: String, task: String, assignee: Option<String> },
    SetTaskNote { installation: String, task: String, note: Option<String> },
    SetDueDate { installation: String, task: String, due: Option<NaiveDate> },
    TogglePhaseEnabled { installation: String, phase: String },
    /// Assign one status to every task of a phase.
    SetPhaseStatus { installation: String, phase: String, status: Status },
    ResetInstallation { installation: String },
}

/// Trim free text; blank input clears the field.
fn clean(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

impl Database {
    pub fn apply(&mut self, catalog: &Catalog, mutation: Mutation, now: DateTime<Utc>) -> Result<()> {
        debug!(?mutation, "applying mutation");
        match mutation {
            Mutation::SetTaskStatus { installation, task, status } => {
                let inst = self.get_mut(&installation)?;
                let state = inst
                    .task_state_mut(catalog, &task)
                    .ok_or(TrackerError::UnknownTask(task))?;
                state.transition(status, now);
                inst.refresh_status();
            }
            Mutation::SetAssignee { installation, task, assignee } => {
                let inst = self.get_mut(&installation)?;
                let state = inst
                    .task_state_mut(catalog, &task)
                    .ok_or(TrackerError::UnknownTask(task))?;
                state.assignee = clean(assignee);
            }
            Mutation::SetTaskNote { installation, task, note } => {
                let inst = self.get_mut(&installation)?;
                let state = inst
                    .task_state_mut(catalog, &task)
                    .ok_or(TrackerError::UnknownTask(task))?;
                state.notes = clean(note);
            }
            Mutation::SetDueDate { installation, task, due } => {
                let inst = self.get_mut(&installation)?;
                let state = inst
                    .task_state_mut(catalog, &task)
                    .ok_or(TrackerError::UnknownTask(task))?;
                state.due_date = due;
            }
            Mutation::TogglePhaseEnabled { installation, phase } => {
                let inst = self.get_mut(&installation)?;
                let state = inst
                    .phases
                    .get_mut(&phase)
                    .ok_or(TrackerError::UnknownPhase(phase))?;
                state.enabled = !state.enabled;
            }
            Mutation::SetPhaseStatus { installation, phase, status } => {
                let inst = self.get_mut(&installation)?;
                let state = inst
                    .phases
                    .get_mut(&phase)
                    .ok_or(TrackerError::UnknownPhase(phase))?;
                for task in state.tasks.values_mut() {
                    task.transition(status, now);
                }
                inst.refresh_status();
            }
            Mutation::ResetInstallation { installation } => {
                self.get_mut(&installation)?.reset();
            }
        }
        self.last_updated = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{installation_progress, Progress};
    use crate::installation::InstallationSpec;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 10, 15, 0, 0).unwrap()
    }

    fn setup() -> (Catalog, Database) {
        let catalog = Catalog::builtin();
        let mut db = Database::default();
        db.add_installation(
            InstallationSpec { name: "Production".into(), ..Default::default() },
            &catalog,
            2,
            now(),
        )
        .unwrap();
        (catalog, db)
    }

    fn set(inst: &str, task: &str, status: Status) -> Mutation {
        Mutation::SetTaskStatus { installation: inst.into(), task: task.into(), status }
    }

    #[test]
    fn test_set_status_updates_phase_and_timestamp() {
        let (catalog, mut db) = setup();
        db.apply(&catalog, set("production", "infra.provision", Status::Done), now()).unwrap();

        let inst = db.get("production").unwrap();
        let state = inst.task_state(&catalog, "infra.provision").unwrap();
        assert_eq!(state.status, Status::Done);
        assert_eq!(state.completed_at, Some(now()));
        assert_eq!(inst.phases["infra"].status, Status::InProgress);
        assert_eq!(db.last_updated, Some(now()));
    }

    #[test]
    fn test_prerequisites_do_not_gate_status() {
        let (catalog, mut db) = setup();
        // golive.hypercare has open prerequisites; it can still be marked Done.
        db.apply(&catalog, set("production", "golive.hypercare", Status::Done), now()).unwrap();
        let state = db.get("production").unwrap().task_state(&catalog, "golive.hypercare").unwrap();
        assert_eq!(state.status, Status::Done);
    }

    #[test]
    fn test_unknown_targets_leave_state_untouched() {
        let (catalog, mut db) = setup();
        let before = db.clone();
        assert!(matches!(
            db.apply(&catalog, set("production", "infra.nope", Status::Done), now()),
            Err(TrackerError::UnknownTask(_))
        ));
        assert!(matches!(
            db.apply(&catalog, set("qa", "infra.provision", Status::Done), now()),
            Err(TrackerError::UnknownInstallation(_))
        ));
        assert!(matches!(
            db.apply(
                &catalog,
                Mutation::SetPhaseStatus { installation: "production".into(), phase: "nope".into(), status: Status::Done },
                now()
            ),
            Err(TrackerError::UnknownPhase(_))
        ));
        assert_eq!(db, before);
    }

    #[test]
    fn test_bulk_phase_status() {
        let (catalog, mut db) = setup();
        db.apply(
            &catalog,
            Mutation::SetPhaseStatus { installation: "production".into(), phase: "database".into(), status: Status::Done },
            now(),
        )
        .unwrap();
        let inst = db.get("production").unwrap();
        let phase = &inst.phases["database"];
        assert!(phase.tasks.values().all(|s| s.status == Status::Done && s.completed_at.is_some()));
        assert_eq!(phase.status, Status::Done);
    }

    #[test]
    fn test_toggle_phase_changes_totals() {
        let (catalog, mut db) = setup();
        db.apply(
            &catalog,
            Mutation::SetPhaseStatus { installation: "production".into(), phase: "infra".into(), status: Status::Done },
            now(),
        )
        .unwrap();
        let total_before = installation_progress(db.get("production").unwrap());
        let infra_len = catalog.phase("infra").unwrap().tasks.len();

        db.apply(
            &catalog,
            Mutation::TogglePhaseEnabled { installation: "production".into(), phase: "infra".into() },
            now(),
        )
        .unwrap();
        let total_after = installation_progress(db.get("production").unwrap());
        assert_eq!(
            total_after,
            Progress { completed: total_before.completed - infra_len, total: total_before.total - infra_len }
        );
    }

    #[test]
    fn test_reset_installation() {
        let (catalog, mut db) = setup();
        db.apply(&catalog, set("production", "infra.provision", Status::Done), now()).unwrap();
        db.apply(&catalog, set("production", "database.schema", Status::Blocked), now()).unwrap();
        db.apply(
            &catalog,
            Mutation::SetAssignee {
                installation: "production".into(),
                task: "infra.network".into(),
                assignee: Some("  rui ".into()),
            },
            now(),
        )
        .unwrap();
        assert_eq!(
            db.get("production").unwrap().task_state(&catalog, "infra.network").unwrap().assignee.as_deref(),
            Some("rui")
        );

        db.apply(&catalog, Mutation::ResetInstallation { installation: "Production".into() }, now()).unwrap();

        let inst = db.get("production").unwrap();
        for phase in inst.phases.values() {
            for state in phase.tasks.values() {
                assert_eq!(state.status, Status::Pending);
                assert_eq!(state.completed_at, None);
            }
        }
    }

    #[test]
    fn test_blank_note_clears() {
        let (catalog, mut db) = setup();
        let note = |text: &str| Mutation::SetTaskNote {
            installation: "production".into(),
            task: "infra.storage".into(),
            note: Some(text.into()),
        };
        db.apply(&catalog, note("waiting on SAN team"), now()).unwrap();
        db.apply(&catalog, note("   "), now()).unwrap();
        assert_eq!(db.get("production").unwrap().task_state(&catalog, "infra.storage").unwrap().notes, None);
    }
}
