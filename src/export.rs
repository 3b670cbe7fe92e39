//! Write-only exports: a JSON snapshot and a Markdown summary of the business model,
//! and a Markdown progress report covering every installation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::aggregate::{derive_phase_status, installation_progress, phase_progress, team_workload};
use crate::catalog::Catalog;
use crate::db::{format_db_engine, format_environment, format_os, format_status, Database};
use crate::error::Result;
use crate::model::*;
use crate::score::{completeness_score, indicators, value_mix, CompletenessScore};

const STANDARDS: &str = "OMG BMM 1.3 + BPMN 2.0.2 + SBVR 1.5 + DMN 1.5";

#[derive(Serialize)]
struct Motivation<'a> {
    vision: &'a str,
    mission: &'a str,
    goals: &'a [Goal],
    objectives: &'a [Objective],
    strategies: &'a [Strategy],
    influencers: &'a [Influencer],
}

#[derive(Serialize)]
struct Organization<'a> {
    actors: &'a [Actor],
    raci: &'a [RaciEntry],
}

#[derive(Serialize)]
struct Rules<'a> {
    rules: &'a [BusinessRule],
    glossary: &'a [GlossaryTerm],
    decision_tables: &'a [DecisionTable],
}

#[derive(Serialize)]
struct Snapshot<'a> {
    company: &'a str,
    timestamp: DateTime<Utc>,
    standard: &'static str,
    motivation: Motivation<'a>,
    processes: &'a [Process],
    activities: &'a [Activity],
    organization: Organization<'a>,
    rules: Rules<'a>,
    scores: CompletenessScore,
}

/// The whole model as a JSON value, stamped with `now`.
pub fn model_snapshot(model: &BusinessModel, now: DateTime<Utc>) -> Result<Value> {
    let snapshot = Snapshot {
        company: &model.company_name,
        timestamp: now,
        standard: STANDARDS,
        motivation: Motivation {
            vision: &model.vision,
            mission: &model.mission,
            goals: &model.goals,
            objectives: &model.objectives,
            strategies: &model.strategies,
            influencers: &model.influencers,
        },
        processes: &model.processes,
        activities: &model.activities,
        organization: Organization { actors: &model.actors, raci: &model.raci },
        rules: Rules {
            rules: &model.rules,
            glossary: &model.glossary,
            decision_tables: &model.decision_tables,
        },
        scores: completeness_score(model),
    };
    Ok(serde_json::to_value(snapshot)?)
}

fn or_undefined(s: &str) -> &str {
    if s.trim().is_empty() {
        "(not defined)"
    } else {
        s
    }
}

/// Markdown summary of the business model.
pub fn model_report(model: &BusinessModel, now: DateTime<Utc>) -> String {
    let score = completeness_score(model);
    let mix = value_mix(model);
    let mut out = String::new();
    out.push_str(&format!("# Business Model Report: {}\n", model.company_name));
    out.push_str(&format!("Generated: {}\n", now.format("%d/%m/%Y %H:%M")));
    out.push_str("Standards: BMM 1.3 | BPMN 2.0.2 | SBVR 1.5 | DMN 1.5\n\n");
    out.push_str(&format!("## Score: {}/100\n\n", score.total()));

    out.push_str("## Motivation\n");
    out.push_str(&format!("- **Vision:** {}\n", or_undefined(&model.vision)));
    out.push_str(&format!("- **Mission:** {}\n", or_undefined(&model.mission)));
    out.push_str(&format!("- **Goals:** {}\n", model.goals.len()));
    out.push_str(&format!("- **Strategies:** {}\n\n", model.strategies.len()));

    out.push_str("## Processes\n");
    out.push_str(&format!("- **Processes:** {}\n", model.processes.len()));
    out.push_str(&format!("- **Activities:** {}\n", mix.total()));
    out.push_str(&format!("- **VA/NVA/BVA:** {}/{}/{}\n\n", mix.va, mix.nva, mix.bva));

    out.push_str("## Organization\n");
    out.push_str(&format!("- **Actors:** {}\n", model.actors.len()));
    out.push_str(&format!("- **RACI entries:** {}\n\n", model.raci.len()));

    out.push_str("## Rules\n");
    out.push_str(&format!("- **Rules:** {}\n", model.rules.len()));
    out.push_str(&format!("- **Glossary terms:** {}\n", model.glossary.len()));
    out.push_str(&format!("- **Decision tables:** {}\n\n", model.decision_tables.len()));

    out.push_str("## Indicators\n");
    for ind in indicators(model) {
        out.push_str(&format!("- {}: {:.0}%\n", ind.name, ind.value));
    }
    out
}

/// Markdown progress report of every installation.
pub fn installation_report(catalog: &Catalog, db: &Database, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str("# Installation Report\n");
    out.push_str(&format!("Generated: {}\n", now.format("%Y-%m-%d %H:%M UTC")));
    if db.installations.is_empty() {
        out.push_str("\nNo installations.\n");
        return out;
    }
    for (id, inst) in &db.installations {
        let total = installation_progress(inst);
        out.push_str(&format!("\n## {} (`{}`)\n\n", inst.name, id));
        out.push_str(&format!(
            "- Environment: {} | Database: {} | OS: {}\n",
            format_environment(inst.environment),
            format_db_engine(inst.sgbd),
            format_os(inst.os_server)
        ));
        if let Some(target) = inst.target_date {
            out.push_str(&format!("- Target go-live: {target}\n"));
        }
        out.push_str(&format!(
            "- Progress: {}/{} ({:.0}%)\n\n",
            total.completed,
            total.total,
            total.percent()
        ));
        out.push_str("| Phase | Enabled | Status | Done |\n|---|---|---|---|\n");
        for def in &catalog.phases {
            let Some(phase) = inst.phases.get(&def.id) else { continue };
            let p = phase_progress(phase);
            out.push_str(&format!(
                "| {} | {} | {} | {}/{} |\n",
                def.name,
                if phase.enabled { "yes" } else { "no" },
                format_status(derive_phase_status(phase)),
                p.completed,
                p.total
            ));
        }
        out.push_str("\n| Team | Tasks | Done | Blocked |\n|---|---|---|---|\n");
        for (team, load) in team_workload(catalog, inst) {
            out.push_str(&format!("| {} | {} | {} | {} |\n", team, load.total, load.done, load.blocked));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::*;
    use crate::installation::InstallationSpec;
    use crate::mutation::Mutation;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 14, 18, 5, 0).unwrap()
    }

    #[test]
    fn test_snapshot_shape() {
        let mut model = BusinessModel::default();
        model.set_company("Harbor Bistro").unwrap();
        model.set_vision("Reference coastal bistro").unwrap();
        model.add_goal("Growth", Perspective::Financial, "").unwrap();

        let v = model_snapshot(&model, now()).unwrap();
        assert_eq!(v["company"], "Harbor Bistro");
        assert_eq!(v["standard"], STANDARDS);
        assert_eq!(v["motivation"]["vision"], "Reference coastal bistro");
        assert_eq!(v["motivation"]["goals"][0]["name"], "Growth");
        assert_eq!(v["scores"]["Motivation"], 13);
        assert_eq!(v["scores"]["Rules"], 0);
        assert!(v["organization"]["actors"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_model_report() {
        let model = BusinessModel::default();
        let report = model_report(&model, now());
        assert!(report.contains("Generated: 14/09/2026 18:05"));
        assert!(report.contains("## Score: 0/100"));
        assert!(report.contains("- **Vision:** (not defined)"));
        assert!(report.contains("- Strategy-Process Alignment: 0%"));
    }

    #[test]
    fn test_installation_report() {
        let catalog = Catalog::builtin();
        let mut db = Database::default();
        db.add_installation(
            InstallationSpec { name: "Production".into(), ..Default::default() },
            &catalog,
            2,
            now(),
        )
        .unwrap();
        db.apply(
            &catalog,
            Mutation::SetTaskStatus {
                installation: "production".into(),
                task: "infra.provision".into(),
                status: Status::Done,
            },
            now(),
        )
        .unwrap();

        let report = installation_report(&catalog, &db, now());
        assert!(report.contains("## Production (`production`)"));
        assert!(report.contains("| Infrastructure | yes | InProgress | 1/4 |"));
        assert!(report.contains("| DBA | 5 | 0 | 0 |"));
        assert!(installation_report(&catalog, &Database::default(), now()).contains("No installations."));
    }
}
