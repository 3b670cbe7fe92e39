//! The static installation pipeline: phases, their tasks, and prerequisite edges.
//!
//! The catalog is fixed at process start. Installations hold one `TaskState` per
//! catalog task, keyed by the task id. Prerequisite edges are informational: they
//! drive the dependency annotations shown next to a task, never a status gate.

use std::collections::{HashMap, HashSet};

use crate::fields::Priority::{self, *};
use crate::task::Task;

/// A named, ordered group of tasks.
#[derive(Debug, Clone)]
pub struct PhaseDef {
    pub id: String,
    pub name: String,
    pub tasks: Vec<Task>,
}

/// Problems found by `Catalog::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    DuplicateTask(String),
    UnknownPrerequisite { task: String, prerequisite: String },
    Cycle(Vec<String>),
}

impl std::fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogIssue::DuplicateTask(id) => write!(f, "duplicate task id '{id}'"),
            CatalogIssue::UnknownPrerequisite { task, prerequisite } => {
                write!(f, "task '{task}' depends on unknown task '{prerequisite}'")
            }
            CatalogIssue::Cycle(path) => write!(f, "dependency cycle: {}", path.join(" -> ")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    pub phases: Vec<PhaseDef>,
}

impl Catalog {
    pub fn new(phases: Vec<PhaseDef>) -> Self {
        Catalog { phases }
    }

    pub fn phase(&self, id: &str) -> Option<&PhaseDef> {
        self.phases.iter().find(|p| p.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks().find(|t| t.id == id)
    }

    /// The phase a task belongs to.
    pub fn phase_of(&self, task_id: &str) -> Option<&PhaseDef> {
        self.phases
            .iter()
            .find(|p| p.tasks.iter().any(|t| t.id == task_id))
    }

    /// Every task in pipeline order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.phases.iter().flat_map(|p| p.tasks.iter())
    }

    /// Distinct team names in first-seen order.
    pub fn teams(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.tasks()
            .map(|t| t.team.as_str())
            .filter(|team| seen.insert(*team))
            .collect()
    }

    /// Check ids are unique, prerequisites exist, and the dependency graph is acyclic.
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        for t in self.tasks() {
            if !seen.insert(t.id.as_str()) {
                issues.push(CatalogIssue::DuplicateTask(t.id.clone()));
            }
        }
        for t in self.tasks() {
            for p in &t.depends_on {
                if !seen.contains(p.as_str()) {
                    issues.push(CatalogIssue::UnknownPrerequisite {
                        task: t.id.clone(),
                        prerequisite: p.clone(),
                    });
                }
            }
        }
        if let Some(cycle) = self.find_cycle() {
            issues.push(CatalogIssue::Cycle(cycle));
        }
        issues
    }

    fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'a>(
            id: &'a str,
            edges: &HashMap<&'a str, &'a [String]>,
            marks: &mut HashMap<&'a str, Mark>,
            path: &mut Vec<&'a str>,
        ) -> Option<Vec<String>> {
            match marks.get(id) {
                Some(Mark::Done) => return None,
                Some(Mark::Visiting) => {
                    let start = path.iter().position(|p| *p == id).unwrap_or(0);
                    let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
                    cycle.push(id.to_string());
                    return Some(cycle);
                }
                None => {}
            }
            marks.insert(id, Mark::Visiting);
            path.push(id);
            if let Some(&prereqs) = edges.get(id) {
                for p in prereqs {
                    // Unknown prerequisites are reported separately.
                    if edges.contains_key(p.as_str()) {
                        if let Some(cycle) = visit(p.as_str(), edges, marks, path) {
                            return Some(cycle);
                        }
                    }
                }
            }
            path.pop();
            marks.insert(id, Mark::Done);
            None
        }

        let edges: HashMap<&str, &[String]> = self
            .tasks()
            .map(|t| (t.id.as_str(), t.depends_on.as_slice()))
            .collect();
        let mut marks = HashMap::new();
        let mut path = Vec::new();
        for t in self.tasks() {
            if let Some(cycle) = visit(t.id.as_str(), &edges, &mut marks, &mut path) {
                return Some(cycle);
            }
        }
        None
    }

    /// The hand-authored pipeline for standing up a database-backed application.
    pub fn builtin() -> Self {
        fn phase(id: &str, name: &str, tasks: Vec<Task>) -> PhaseDef {
            PhaseDef { id: id.to_string(), name: name.to_string(), tasks }
        }
        fn task(id: &str, name: &str, team: &str, priority: Priority) -> Task {
            Task::new(id, name, team, priority)
        }

        Catalog::new(vec![
            phase("infra", "Infrastructure", vec![
                task("infra.provision", "Provision application and database servers", "Infra", High)
                    .notes("Sizing per the capacity worksheet"),
                task("infra.os-patch", "Apply OS patches and baseline packages", "Infra", Medium)
                    .after(&["infra.provision"]),
                task("infra.network", "Open firewall rules and DNS entries", "Network", High)
                    .after(&["infra.provision"]),
                task("infra.storage", "Mount data and backup volumes", "Infra", Medium)
                    .after(&["infra.provision"]),
            ]),
            phase("database", "Database", vec![
                task("database.install", "Install database engine", "DBA", High)
                    .after(&["infra.os-patch", "infra.storage"]),
                task("database.schema", "Create schemas, roles and service users", "DBA", High)
                    .after(&["database.install"]),
                task("database.tuning", "Apply memory and connection parameters", "DBA", Low)
                    .notes("Revisit after the load test")
                    .after(&["database.install"]),
                task("database.backup", "Schedule backups and verify a restore", "DBA", Medium)
                    .after(&["database.schema"]),
            ]),
            phase("application", "Application", vec![
                task("application.runtime", "Install application server runtime", "Middleware", High)
                    .after(&["infra.os-patch"]),
                task("application.deploy", "Deploy application package", "Middleware", High)
                    .after(&["application.runtime", "database.schema"]),
                task("application.config", "Configure connection strings and parameters", "Middleware", Medium)
                    .after(&["application.deploy"]),
                task("application.integrations", "Connect external integrations", "Development", Medium)
                    .notes("Mail relay, SSO provider, payment gateway")
                    .after(&["application.config", "infra.network"]),
            ]),
            phase("security", "Security", vec![
                task("security.certificates", "Install TLS certificates", "Security", High)
                    .after(&["infra.network"]),
                task("security.hardening", "Harden OS and database accounts", "Security", Medium)
                    .after(&["infra.os-patch", "database.schema"]),
                task("security.scan", "Run vulnerability scan", "Security", Medium)
                    .after(&["security.hardening", "application.deploy"]),
            ]),
            phase("validation", "Validation", vec![
                task("validation.smoke", "Run smoke tests", "QA", High)
                    .after(&["application.config"]),
                task("validation.load", "Run load test", "QA", Medium)
                    .after(&["validation.smoke", "database.tuning"]),
                task("validation.uat", "User acceptance sign-off", "Business", High)
                    .after(&["validation.smoke", "application.integrations"]),
            ]),
            phase("golive", "Go-Live", vec![
                task("golive.migration", "Migrate production data", "DBA", High)
                    .after(&["database.backup", "validation.uat"]),
                task("golive.cutover", "Execute cutover plan", "Middleware", High)
                    .after(&["golive.migration", "security.certificates", "security.scan"]),
                task("golive.hypercare", "Hypercare and handover to support", "Support", Medium)
                    .notes("Two weeks of extended monitoring")
                    .after(&["golive.cutover"]),
            ]),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.validate(), Vec::new());
        assert!(catalog.tasks().count() > 10);
    }

    #[test]
    fn test_task_ids_are_prefixed_by_phase() {
        let catalog = Catalog::builtin();
        for phase in &catalog.phases {
            for t in &phase.tasks {
                assert!(t.id.starts_with(&format!("{}.", phase.id)), "{}", t.id);
            }
        }
    }

    #[test]
    fn test_lookup_helpers() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.phase_of("database.schema").map(|p| p.id.as_str()), Some("database"));
        assert!(catalog.task("nope").is_none());
        assert!(catalog.phase("golive").is_some());
        assert!(catalog.teams().contains(&"DBA"));
    }

    #[test]
    fn test_validate_reports_unknown_and_cycle() {
        let catalog = Catalog::new(vec![PhaseDef {
            id: "p".into(),
            name: "P".into(),
            tasks: vec![
                Task::new("p.a", "A", "T", High).after(&["p.c"]),
                Task::new("p.b", "B", "T", High).after(&["p.a", "p.ghost"]),
                Task::new("p.c", "C", "T", High).after(&["p.b"]),
            ],
        }]);
        let issues = catalog.validate();
        assert!(issues.contains(&CatalogIssue::UnknownPrerequisite {
            task: "p.b".into(),
            prerequisite: "p.ghost".into(),
        }));
        let cycle = issues.iter().find_map(|i| match i {
            CatalogIssue::Cycle(c) => Some(c.clone()),
            _ => None,
        });
        let cycle = cycle.expect("cycle should be reported");
        assert_eq!(cycle.first(), cycle.last());
        assert!(cycle.contains(&"p.b".to_string()));
    }

    #[test]
    fn test_validate_reports_duplicate_ids() {
        let catalog = Catalog::new(vec![PhaseDef {
            id: "p".into(),
            name: "P".into(),
            tasks: vec![
                Task::new("p.a", "A", "T", High),
                Task::new("p.a", "A again", "T", Low),
            ],
        }]);
        assert_eq!(catalog.validate(), vec![CatalogIssue::DuplicateTask("p.a".into())]);
    }
}
