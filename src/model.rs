//! Business model records and the editor operations that populate them.
//!
//! The model covers four disciplines: motivation (vision, mission, goals, objectives,
//! strategies, influencers), processes (processes and their activities), organization
//! (actors and RACI entries) and rules (business rules, decision tables, glossary).
//! Required fields are checked before anything is written; a rejected edit leaves
//! the model unchanged.

use std::path::Path;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::db::{load_json_or_default, write_atomic};
use crate::error::{Result, TrackerError};
use crate::fields::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub perspective: Perspective,
    #[serde(default)]
    pub description: String,
}

/// SMART objective attached to a goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Objective {
    pub id: String,
    pub goal_id: String,
    pub specific: String,
    #[serde(default)]
    pub measurable: String,
    #[serde(default)]
    pub target: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Strategy {
    pub id: String,
    pub name: String,
    pub kind: StrategyKind,
    /// Name of the goal this strategy serves.
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub tactic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Influencer {
    pub id: String,
    pub kind: InfluencerKind,
    pub description: String,
    #[serde(default)]
    pub impact: Option<Impact>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Process {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub trigger: String,
    /// Name of the goal this process serves.
    #[serde(default)]
    pub goal: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub process_id: String,
    pub process_name: String,
    pub value_type: ValueType,
    /// Name of the responsible actor.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub time_min: u32,
    /// Name of the business rule applied.
    #[serde(default)]
    pub rule: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub kind: ActorKind,
    #[serde(default)]
    pub roles: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RaciEntry {
    pub id: String,
    pub activity: String,
    pub actor: String,
    pub role: RaciRole,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessRule {
    pub id: String,
    pub name: String,
    pub statement: String,
    pub kind: RuleKind,
    #[serde(default)]
    pub modality: Option<Modality>,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionRow {
    pub conditions: Vec<String>,
    pub result: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionTable {
    pub id: String,
    pub name: String,
    pub hit_policy: HitPolicy,
    pub inputs: Vec<String>,
    pub output: String,
    #[serde(default)]
    pub rows: Vec<DecisionRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlossaryTerm {
    pub id: String,
    pub term: String,
    pub definition: String,
    #[serde(default)]
    pub synonyms: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub source: String,
}

/// Record collections addressable by `BusinessModel::remove`.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RecordKind {
    Goal,
    Objective,
    Strategy,
    Influencer,
    Process,
    Activity,
    Actor,
    Raci,
    Rule,
    DecisionTable,
    Term,
}

impl RecordKind {
    fn label(self) -> &'static str {
        match self {
            RecordKind::Goal => "goal",
            RecordKind::Objective => "objective",
            RecordKind::Strategy => "strategy",
            RecordKind::Influencer => "influencer",
            RecordKind::Process => "process",
            RecordKind::Activity => "activity",
            RecordKind::Actor => "actor",
            RecordKind::Raci => "RACI entry",
            RecordKind::Rule => "rule",
            RecordKind::DecisionTable => "decision table",
            RecordKind::Term => "glossary term",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BusinessModel {
    pub company_name: String,
    pub vision: String,
    pub mission: String,
    pub goals: Vec<Goal>,
    pub objectives: Vec<Objective>,
    pub strategies: Vec<Strategy>,
    pub influencers: Vec<Influencer>,
    pub processes: Vec<Process>,
    pub activities: Vec<Activity>,
    pub actors: Vec<Actor>,
    pub raci: Vec<RaciEntry>,
    pub rules: Vec<BusinessRule>,
    pub decision_tables: Vec<DecisionTable>,
    pub glossary: Vec<GlossaryTerm>,
}

/// Short record id: the first 8 hex digits of a random UUID.
pub fn new_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Trimmed copy of `value`, or `EmptyField(field)` when nothing is left.
fn required(field: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(TrackerError::EmptyField(field))
    } else {
        Ok(value.to_string())
    }
}

/// Trim optional text, mapping blank input to `None`.
fn optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

impl BusinessModel {
    pub fn load(path: &Path) -> Self {
        load_json_or_default(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        write_atomic(path, &data)?;
        info!(path = %path.display(), "business model saved");
        Ok(())
    }

    pub fn set_company(&mut self, name: &str) -> Result<()> {
        self.company_name = required("company name", name)?;
        Ok(())
    }

    pub fn set_vision(&mut self, vision: &str) -> Result<()> {
        self.vision = required("vision", vision)?;
        Ok(())
    }

    pub fn set_mission(&mut self, mission: &str) -> Result<()> {
        self.mission = required("mission", mission)?;
        Ok(())
    }

    fn goal_exists(&self, name: &str) -> Result<()> {
        if self.goals.iter().any(|g| g.name == name) {
            Ok(())
        } else {
            Err(TrackerError::UnknownRecord { kind: "goal", id: name.to_string() })
        }
    }

    pub fn add_goal(&mut self, name: &str, perspective: Perspective, description: &str) -> Result<String> {
        let goal = Goal {
            id: new_id(),
            name: required("goal name", name)?,
            perspective,
            description: description.trim().to_string(),
        };
        let id = goal.id.clone();
        self.goals.push(goal);
        Ok(id)
    }

    pub fn add_objective(
        &mut self,
        goal_id: &str,
        specific: &str,
        measurable: &str,
        target: f64,
        unit: &str,
        deadline: Option<NaiveDate>,
    ) -> Result<String> {
        let specific = required("objective", specific)?;
        if !target.is_finite() {
            return Err(TrackerError::InvalidNumber("objective target"));
        }
        if !self.goals.iter().any(|g| g.id == goal_id) {
            return Err(TrackerError::UnknownRecord { kind: "goal", id: goal_id.to_string() });
        }
        let id = new_id();
        self.objectives.push(Objective {
            id: id.clone(),
            goal_id: goal_id.to_string(),
            specific,
            measurable: measurable.trim().to_string(),
            target,
            unit: unit.trim().to_string(),
            deadline,
        });
        Ok(id)
    }

    pub fn add_strategy(
        &mut self,
        name: &str,
        kind: StrategyKind,
        goal: Option<&str>,
        tactic: &str,
    ) -> Result<String> {
        let name = required("strategy name", name)?;
        let goal = optional(goal);
        if let Some(g) = &goal {
            self.goal_exists(g)?;
        }
        let id = new_id();
        self.strategies.push(Strategy { id: id.clone(), name, kind, goal, tactic: tactic.trim().to_string() });
        Ok(id)
    }

    pub fn add_influencer(&mut self, kind: InfluencerKind, description: &str, impact: Option<Impact>) -> Result<String> {
        let description = required("influencer description", description)?;
        // SWOT entries carry no impact rating.
        let impact = if kind.is_swot() { None } else { impact };
        let id = new_id();
        self.influencers.push(Influencer { id: id.clone(), kind, description, impact });
        Ok(id)
    }

    pub fn add_process(&mut self, name: &str, trigger: &str, goal: Option<&str>) -> Result<String> {
        let name = required("process name", name)?;
        let goal = optional(goal);
        if let Some(g) = &goal {
            self.goal_exists(g)?;
        }
        let id = new_id();
        self.processes.push(Process { id: id.clone(), name, trigger: trigger.trim().to_string(), goal });
        Ok(id)
    }

    pub fn add_activity(
        &mut self,
        process: &str,
        name: &str,
        value_type: ValueType,
        role: Option<&str>,
        time_min: u32,
        rule: Option<&str>,
    ) -> Result<String> {
        let name = required("activity name", name)?;
        let process = self
            .processes
            .iter()
            .find(|p| p.name == process || p.id == process)
            .ok_or_else(|| TrackerError::UnknownProcess(process.to_string()))?;
        let role = optional(role);
        if let Some(r) = &role {
            if !self.actors.iter().any(|a| &a.name == r) {
                return Err(TrackerError::UnknownRecord { kind: "actor", id: r.clone() });
            }
        }
        let rule = optional(rule);
        if let Some(r) = &rule {
            if !self.rules.iter().any(|x| &x.name == r) {
                return Err(TrackerError::UnknownRecord { kind: "rule", id: r.clone() });
            }
        }
        let activity = Activity {
            id: new_id(),
            name,
            process_id: process.id.clone(),
            process_name: process.name.clone(),
            value_type,
            role,
            time_min: time_min.max(1),
            rule,
        };
        let id = activity.id.clone();
        self.activities.push(activity);
        Ok(id)
    }

    pub fn add_actor(&mut self, name: &str, kind: ActorKind, roles: &str, department: &str) -> Result<String> {
        let name = required("actor name", name)?;
        let id = new_id();
        self.actors.push(Actor {
            id: id.clone(),
            name,
            kind,
            roles: roles.trim().to_string(),
            department: department.trim().to_string(),
        });
        Ok(id)
    }

    pub fn add_raci(&mut self, activity: &str, actor: &str, role: RaciRole) -> Result<String> {
        if !self.activities.iter().any(|a| a.name == activity) {
            return Err(TrackerError::UnknownRecord { kind: "activity", id: activity.to_string() });
        }
        if !self.actors.iter().any(|a| a.name == actor) {
            return Err(TrackerError::UnknownRecord { kind: "actor", id: actor.to_string() });
        }
        let id = new_id();
        self.raci.push(RaciEntry { id: id.clone(), activity: activity.to_string(), actor: actor.to_string(), role });
        Ok(id)
    }

    pub fn add_rule(
        &mut self,
        name: &str,
        statement: &str,
        kind: RuleKind,
        modality: Option<Modality>,
        source: &str,
    ) -> Result<String> {
        let name = required("rule name", name)?;
        let statement = required("rule statement", statement)?;
        let id = new_id();
        self.rules.push(BusinessRule {
            id: id.clone(),
            name,
            statement,
            kind,
            modality,
            source: source.trim().to_string(),
        });
        Ok(id)
    }

    pub fn add_decision_table(
        &mut self,
        name: &str,
        hit_policy: HitPolicy,
        inputs: Vec<String>,
        output: &str,
        rows: Vec<DecisionRow>,
    ) -> Result<String> {
        let name = required("decision name", name)?;
        let inputs: Vec<String> = inputs
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();
        if inputs.is_empty() {
            return Err(TrackerError::EmptyField("decision inputs"));
        }
        let output = required("decision output", output)?;
        let id = new_id();
        self.decision_tables.push(DecisionTable { id: id.clone(), name, hit_policy, inputs, output, rows });
        Ok(id)
    }

    pub fn add_term(&mut self, term: &str, definition: &str, synonyms: &str, context: &str, source: &str) -> Result<String> {
        let term = required("term", term)?;
        let definition = required("definition", definition)?;
        let id = new_id();
        self.glossary.push(GlossaryTerm {
            id: id.clone(),
            term,
            definition,
            synonyms: synonyms.trim().to_string(),
            context: context.trim().to_string(),
            source: source.trim().to_string(),
        });
        Ok(id)
    }

    /// Remove one record by id. Removing a goal also removes its objectives.
    pub fn remove(&mut self, kind: RecordKind, id: &str) -> Result<()> {
        fn take<T>(items: &mut Vec<T>, id: &str, key: impl Fn(&T) -> &str) -> bool {
            let before = items.len();
            items.retain(|item| key(item) != id);
            items.len() != before
        }

        let removed = match kind {
            RecordKind::Goal => {
                let removed = take(&mut self.goals, id, |g| g.id.as_str());
                if removed {
                    self.objectives.retain(|o| o.goal_id != id);
                }
                removed
            }
            RecordKind::Objective => take(&mut self.objectives, id, |o| o.id.as_str()),
            RecordKind::Strategy => take(&mut self.strategies, id, |s| s.id.as_str()),
            RecordKind::Influencer => take(&mut self.influencers, id, |i| i.id.as_str()),
            RecordKind::Process => take(&mut self.processes, id, |p| p.id.as_str()),
            RecordKind::Activity => take(&mut self.activities, id, |a| a.id.as_str()),
            RecordKind::Actor => take(&mut self.actors, id, |a| a.id.as_str()),
            RecordKind::Raci => take(&mut self.raci, id, |r| r.id.as_str()),
            RecordKind::Rule => take(&mut self.rules, id, |r| r.id.as_str()),
            RecordKind::DecisionTable => take(&mut self.decision_tables, id, |d| d.id.as_str()),
            RecordKind::Term => take(&mut self.glossary, id, |t| t.id.as_str()),
        };
        if removed {
            Ok(())
        } else {
            Err(TrackerError::UnknownRecord { kind: kind.label(), id: id.to_string() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_id_shape() {
        let id = new_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(new_id(), new_id());
    }

    #[test]
    fn test_required_fields_leave_model_unchanged() {
        let mut model = BusinessModel::default();
        assert!(matches!(model.set_vision("   "), Err(TrackerError::EmptyField("vision"))));
        assert!(matches!(
            model.add_goal("", Perspective::Financial, "desc"),
            Err(TrackerError::EmptyField(_))
        ));
        assert!(matches!(
            model.add_rule("Prepayment", " ", RuleKind::Operative, None, ""),
            Err(TrackerError::EmptyField("rule statement"))
        ));
        assert_eq!(model, BusinessModel::default());
    }

    #[test]
    fn test_activity_links_are_checked() {
        let mut model = BusinessModel::default();
        assert!(matches!(
            model.add_activity("Booking", "Check availability", ValueType::Va, None, 5, None),
            Err(TrackerError::UnknownProcess(_))
        ));
        model.add_process("Booking", "Customer request", None).unwrap();
        assert!(matches!(
            model.add_activity("Booking", "Check availability", ValueType::Va, Some("Host"), 5, None),
            Err(TrackerError::UnknownRecord { kind: "actor", .. })
        ));
        model.add_actor("Host", ActorKind::Internal, "Executor", "Front desk").unwrap();
        model
            .add_activity("Booking", "Check availability", ValueType::Va, Some("Host"), 0, Some(""))
            .unwrap();
        let activity = &model.activities[0];
        assert_eq!(activity.process_name, "Booking");
        assert_eq!(activity.time_min, 1);
        assert_eq!(activity.rule, None);
    }

    #[test]
    fn test_strategy_goal_must_exist() {
        let mut model = BusinessModel::default();
        assert!(model.add_strategy("Premium expansion", StrategyKind::Focus, Some("Growth"), "").is_err());
        model.add_goal("Growth", Perspective::Financial, "").unwrap();
        assert!(model.add_strategy("Premium expansion", StrategyKind::Focus, Some("Growth"), "").is_ok());
    }

    #[test]
    fn test_remove_goal_cascades_objectives() {
        let mut model = BusinessModel::default();
        let goal = model.add_goal("Growth", Perspective::Financial, "").unwrap();
        model.add_objective(&goal, "Grow flagship revenue", "25%", 25.0, "%", None).unwrap();
        model.remove(RecordKind::Goal, &goal).unwrap();
        assert!(model.goals.is_empty());
        assert!(model.objectives.is_empty());
        assert!(matches!(
            model.remove(RecordKind::Goal, &goal),
            Err(TrackerError::UnknownRecord { kind: "goal", .. })
        ));
    }

    #[test]
    fn test_swot_influencer_has_no_impact() {
        let mut model = BusinessModel::default();
        model.add_influencer(InfluencerKind::Strength, "Strong brand", Some(Impact::High)).unwrap();
        model.add_influencer(InfluencerKind::Legal, "New consumer law", Some(Impact::High)).unwrap();
        assert_eq!(model.influencers[0].impact, None);
        assert_eq!(model.influencers[1].impact, Some(Impact::High));
    }

    #[test]
    fn test_non_finite_target_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        let mut model = BusinessModel::default();
        model.set_vision("Keep me").unwrap();
        let goal = model.add_goal("Growth", Perspective::Financial, "").unwrap();
        for target in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                model.add_objective(&goal, "Grow revenue", "", target, "%", None),
                Err(TrackerError::InvalidNumber(_))
            ));
        }
        assert!(model.objectives.is_empty());

        model.save(&path).unwrap();
        let loaded = BusinessModel::load(&path);
        assert_eq!(loaded.vision, "Keep me");
        assert_eq!(loaded.goals.len(), 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        let mut model = BusinessModel::default();
        model.set_company("Harbor Bistro").unwrap();
        model.add_term("Premium table", "Table with a view", "VIP table", "Bookings", "").unwrap();
        model.save(&path).unwrap();
        assert_eq!(BusinessModel::load(&path), model);
    }
}
