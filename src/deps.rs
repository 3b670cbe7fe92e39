//! Dependency annotations for display.
//!
//! Prerequisites never gate a status change: a task may be marked Done while its
//! prerequisites are still open. These helpers only report what is outstanding.

use crate::catalog::Catalog;
use crate::fields::Status;
use crate::installation::Installation;
use crate::task::Task;

/// A prerequisite that is not Done yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPrereq {
    pub task_id: String,
    pub name: Option<String>,
    /// `None` when the prerequisite is missing from the catalog or the installation.
    pub status: Option<Status>,
}

/// Prerequisites of `task_id` whose status is not Done, in declaration order.
pub fn pending_prerequisites(
    catalog: &Catalog,
    installation: &Installation,
    task_id: &str,
) -> Vec<PendingPrereq> {
    let Some(task) = catalog.task(task_id) else {
        return Vec::new();
    };
    task.depends_on
        .iter()
        .filter_map(|dep| {
            let status = installation.task_state(catalog, dep).map(|s| s.status);
            if status == Some(Status::Done) {
                return None;
            }
            Some(PendingPrereq {
                task_id: dep.clone(),
                name: catalog.task(dep).map(|t| t.name.clone()),
                status,
            })
        })
        .collect()
}

/// Tasks that list `task_id` as a prerequisite.
pub fn dependents<'a>(catalog: &'a Catalog, task_id: &str) -> Vec<&'a Task> {
    catalog
        .tasks()
        .filter(|t| t.depends_on.iter().any(|d| d == task_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PhaseDef;
    use crate::fields::Priority;
    use crate::installation::InstallationSpec;
    use chrono::{TimeZone, Utc};

    fn setup() -> (Catalog, Installation) {
        let catalog = Catalog::builtin();
        let now = Utc.with_ymd_and_hms(2026, 2, 2, 8, 0, 0).unwrap();
        let inst = Installation::new(
            InstallationSpec { name: "prod".into(), ..Default::default() },
            &catalog,
            now,
        );
        (catalog, inst)
    }

    #[test]
    fn test_pending_prerequisites_filters_done() {
        let (catalog, mut inst) = setup();
        // application.deploy needs application.runtime and database.schema.
        inst.task_state_mut(&catalog, "application.runtime").unwrap().status = Status::Done;
        inst.task_state_mut(&catalog, "database.schema").unwrap().status = Status::Blocked;

        let pending = pending_prerequisites(&catalog, &inst, "application.deploy");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].task_id, "database.schema");
        assert_eq!(pending[0].status, Some(Status::Blocked));
    }

    #[test]
    fn test_no_prerequisites_or_unknown_task() {
        let (catalog, inst) = setup();
        assert!(pending_prerequisites(&catalog, &inst, "infra.provision").is_empty());
        assert!(pending_prerequisites(&catalog, &inst, "no.such.task").is_empty());
    }

    #[test]
    fn test_unknown_prerequisite_reports_none() {
        let catalog = Catalog::new(vec![PhaseDef {
            id: "p".into(),
            name: "P".into(),
            tasks: vec![Task::new("p.a", "A", "T", Priority::Low).after(&["p.ghost"])],
        }]);
        let now = Utc.with_ymd_and_hms(2026, 2, 2, 8, 0, 0).unwrap();
        let inst = Installation::new(
            InstallationSpec { name: "x".into(), ..Default::default() },
            &catalog,
            now,
        );
        let pending = pending_prerequisites(&catalog, &inst, "p.a");
        assert_eq!(
            pending,
            vec![PendingPrereq { task_id: "p.ghost".into(), name: None, status: None }]
        );
    }

    #[test]
    fn test_dependents() {
        let catalog = Catalog::builtin();
        let ids: Vec<&str> = dependents(&catalog, "infra.provision").iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["infra.os-patch", "infra.network", "infra.storage"]);
    }
}
