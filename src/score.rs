//! Completeness scoring and value analysis of a business model.
//!
//! The completeness score awards fixed points for each populated field, grouped in
//! four categories of at most 25 points each, so the total never exceeds 100. Adding
//! data can only raise a category's score.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::fields::ValueType;
use crate::model::BusinessModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Motivation,
    Processes,
    Organization,
    Rules,
}

impl Category {
    pub const ALL: [Category; 4] =
        [Category::Motivation, Category::Processes, Category::Organization, Category::Rules];

    pub fn label(self) -> &'static str {
        match self {
            Category::Motivation => "Motivation",
            Category::Processes => "Processes",
            Category::Organization => "Organization",
            Category::Rules => "Rules",
        }
    }
}

/// Maximum points per category.
pub const CATEGORY_MAX: u32 = 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CompletenessScore {
    pub by_category: BTreeMap<Category, u32>,
}

impl CompletenessScore {
    pub fn get(&self, category: Category) -> u32 {
        self.by_category.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.by_category.values().sum()
    }
}

fn has_text(s: &str) -> bool {
    !s.trim().is_empty()
}

/// Tracked fields with their category, weight, and whether they are populated.
pub fn tracked_fields(model: &BusinessModel) -> [(Category, &'static str, u32, bool); 11] {
    use Category::*;
    [
        (Motivation, "vision", 5, has_text(&model.vision)),
        (Motivation, "mission", 5, has_text(&model.mission)),
        (Motivation, "goals", 8, !model.goals.is_empty()),
        (Motivation, "strategies", 7, !model.strategies.is_empty()),
        (Processes, "processes", 10, !model.processes.is_empty()),
        (Processes, "activities", 15, !model.activities.is_empty()),
        (Organization, "actors", 12, !model.actors.is_empty()),
        (Organization, "raci", 13, !model.raci.is_empty()),
        (Rules, "rules", 12, !model.rules.is_empty()),
        (Rules, "glossary", 8, !model.glossary.is_empty()),
        (Rules, "decision_tables", 5, !model.decision_tables.is_empty()),
    ]
}

pub fn completeness_score(model: &BusinessModel) -> CompletenessScore {
    let mut by_category: BTreeMap<Category, u32> = Category::ALL.iter().map(|c| (*c, 0)).collect();
    for (category, _, points, present) in tracked_fields(model) {
        if present {
            *by_category.entry(category).or_default() += points;
        }
    }
    CompletenessScore { by_category }
}

/// Activity counts by value classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValueMix {
    pub va: usize,
    pub nva: usize,
    pub bva: usize,
}

impl ValueMix {
    pub fn total(&self) -> usize {
        self.va + self.nva + self.bva
    }
}

pub fn value_mix(model: &BusinessModel) -> ValueMix {
    let mut mix = ValueMix::default();
    for a in &model.activities {
        match a.value_type {
            ValueType::Va => mix.va += 1,
            ValueType::Nva => mix.nva += 1,
            ValueType::Bva => mix.bva += 1,
        }
    }
    mix
}

/// Share of activity minutes spent in value-added activities, if any time is recorded.
pub fn time_efficiency(model: &BusinessModel) -> Option<f64> {
    let total: u32 = model.activities.iter().map(|a| a.time_min).sum();
    if total == 0 {
        return None;
    }
    let va: u32 = model
        .activities
        .iter()
        .filter(|a| a.value_type == ValueType::Va)
        .map(|a| a.time_min)
        .sum();
    Some(va as f64 * 100.0 / total as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    Good,
    Fair,
    Poor,
}

impl Grade {
    pub fn of(value: f64) -> Grade {
        if value >= 70.0 {
            Grade::Good
        } else if value >= 40.0 {
            Grade::Fair
        } else {
            Grade::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    pub name: &'static str,
    pub description: &'static str,
    pub value: f64,
    pub grade: Grade,
}

fn percent_of(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Percentage of processes linked to a goal.
pub fn strategy_alignment(model: &BusinessModel) -> f64 {
    let linked = model.processes.iter().filter(|p| p.goal.is_some()).count();
    percent_of(linked, model.processes.len())
}

pub fn indicators(model: &BusinessModel) -> Vec<Indicator> {
    let mix = value_mix(model);
    let with_rule = model.activities.iter().filter(|a| a.rule.is_some()).count();
    let values = [
        ("Strategy-Process Alignment", "% of processes linked to goals", strategy_alignment(model)),
        ("Rules Coverage", "% of activities with a rule", percent_of(with_rule, mix.total())),
        ("Value-Added Activity Ratio", "% of activities adding value", percent_of(mix.va, mix.total())),
        ("Stakeholder Coverage", "breadth of stakeholders", (model.actors.len() * 10).min(100) as f64),
    ];
    values
        .into_iter()
        .map(|(name, description, value)| Indicator { name, description, value, grade: Grade::of(value) })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Level {
    Critical,
    Improvement,
    Attention,
    Suggestion,
    Excellent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub level: Level,
    pub message: String,
}

pub fn recommendations(model: &BusinessModel) -> Vec<Recommendation> {
    let mut out = Vec::new();
    let mut push = |level, message: String| out.push(Recommendation { level, message });
    let mix = value_mix(model);
    let alignment = strategy_alignment(model);

    if !has_text(&model.vision) {
        push(Level::Critical, "Define the company vision; it anchors every goal".into());
    }
    if model.goals.is_empty() {
        push(Level::Critical, "Add at least 3 goals covering the four scorecard perspectives".into());
    }
    if mix.nva > 0 {
        push(
            Level::Improvement,
            format!(
                "{} non-value-added activities found; removing them could cut lead time by {:.0}%",
                mix.nva,
                percent_of(mix.nva, mix.total())
            ),
        );
    }
    if model.rules.is_empty() {
        push(Level::Improvement, "Document business rules; processes without rules drift".into());
    }
    if !model.processes.is_empty() && alignment < 60.0 {
        push(
            Level::Attention,
            format!("Only {alignment:.0}% of processes are linked to strategic goals"),
        );
    }
    if model.actors.is_empty() {
        push(Level::Improvement, "Define actors and roles so a RACI matrix can be built".into());
    }
    if model.decision_tables.is_empty() && !model.rules.is_empty() {
        push(Level::Suggestion, "Turn complex rules into decision tables".into());
    }
    if completeness_score(model).total() >= 80 {
        push(Level::Excellent, "Model is well structured; consider process simulation next".into());
    }
    if out.is_empty() {
        out.push(Recommendation {
            level: Level::Suggestion,
            message: "Keep adding detail to sharpen the analysis".into(),
        });
    }
    out
}

/// Links between motivation, process, organization and rule elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceGraph {
    pub nodes: BTreeSet<String>,
    pub edges: BTreeSet<(String, String)>,
}

impl TraceGraph {
    fn edge(&mut self, from: String, to: String) {
        self.nodes.insert(from.clone());
        self.nodes.insert(to.clone());
        self.edges.insert((from, to));
    }

    /// Nodes with no incoming or outgoing edge.
    pub fn isolated(&self) -> Vec<&String> {
        self.nodes
            .iter()
            .filter(|n| !self.edges.iter().any(|(a, b)| a == *n || b == *n))
            .collect()
    }
}

pub fn traceability(model: &BusinessModel) -> TraceGraph {
    let mut g = TraceGraph::default();
    let has_vision = has_text(&model.vision);
    if has_vision {
        g.nodes.insert("Vision".into());
    }
    for goal in &model.goals {
        let node = format!("Goal:{}", goal.name);
        g.nodes.insert(node.clone());
        if has_vision {
            g.edge("Vision".into(), node);
        }
    }
    for s in &model.strategies {
        let node = format!("Strategy:{}", s.name);
        g.nodes.insert(node.clone());
        if let Some(goal) = &s.goal {
            g.edge(format!("Goal:{goal}"), node);
        }
    }
    for p in &model.processes {
        let node = format!("Process:{}", p.name);
        g.nodes.insert(node.clone());
        if let Some(goal) = &p.goal {
            g.edge(format!("Goal:{goal}"), node);
        }
    }
    for a in &model.activities {
        let node = format!("Activity:{}", a.name);
        g.edge(format!("Process:{}", a.process_name), node.clone());
        if let Some(role) = &a.role {
            g.edge(node.clone(), format!("Actor:{role}"));
        }
        if let Some(rule) = &a.rule {
            g.edge(node.clone(), format!("Rule:{rule}"));
        }
    }
    g
}

/// Mermaid flowchart of one process's activities in insertion order.
pub fn process_flowchart(model: &BusinessModel, process: &str) -> Option<String> {
    let activities: Vec<_> = model
        .activities
        .iter()
        .filter(|a| a.process_name == process || a.process_id == process)
        .collect();
    if activities.is_empty() {
        return None;
    }
    let mut lines = vec!["flowchart LR".to_string(), "    START([Start])".to_string()];
    let mut prev = "START".to_string();
    for (i, a) in activities.iter().enumerate() {
        let node = format!("A{i}");
        let fill = match a.value_type {
            ValueType::Va => "#d4edda",
            ValueType::Nva => "#f8d7da",
            ValueType::Bva => "#fff3cd",
        };
        lines.push(format!("    {node}[\"{}\"]", a.name.replace('"', "'")));
        lines.push(format!("    style {node} fill:{fill}"));
        lines.push(format!("    {prev} --> {node}"));
        prev = node;
    }
    lines.push("    END([End])".to_string());
    lines.push(format!("    {prev} --> END"));
    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::*;

    fn full_model() -> BusinessModel {
        let mut m = BusinessModel::default();
        m.set_vision("Be the reference coastal bistro").unwrap();
        m.set_mission("Serve memorable seafood").unwrap();
        m.add_goal("Growth", Perspective::Financial, "").unwrap();
        m.add_strategy("Premium", StrategyKind::Differentiation, Some("Growth"), "").unwrap();
        m.add_process("Booking", "Customer request", Some("Growth")).unwrap();
        m.add_actor("Host", ActorKind::Internal, "", "").unwrap();
        m.add_rule("Prepay", "A booking must be prepaid", RuleKind::Operative, None, "").unwrap();
        m.add_activity("Booking", "Check availability", ValueType::Va, Some("Host"), 5, Some("Prepay")).unwrap();
        m.add_raci("Check availability", "Host", RaciRole::Responsible).unwrap();
        m.add_term("Premium table", "Table with a view", "", "", "").unwrap();
        m.add_decision_table("Discount", HitPolicy::Unique, vec!["Customer".into()], "Percent", vec![]).unwrap();
        m
    }

    #[test]
    fn test_empty_and_full_scores() {
        let empty = completeness_score(&BusinessModel::default());
        assert_eq!(empty.total(), 0);
        assert_eq!(empty.by_category.len(), 4);

        let full = completeness_score(&full_model());
        for c in Category::ALL {
            assert_eq!(full.get(c), CATEGORY_MAX);
        }
        assert_eq!(full.total(), 100);
    }

    #[test]
    fn test_weights_cap_each_category() {
        let weights = tracked_fields(&BusinessModel::default());
        for c in Category::ALL {
            let sum: u32 = weights.iter().filter(|w| w.0 == c).map(|w| w.2).sum();
            assert_eq!(sum, CATEGORY_MAX, "{c:?}");
        }
    }

    #[test]
    fn test_score_is_monotonic() {
        let mut m = BusinessModel::default();
        m.mission = "   ".into();
        let before = completeness_score(&m);
        assert_eq!(before.get(Category::Motivation), 0);

        m.set_vision("A vision").unwrap();
        let after = completeness_score(&m);
        assert_eq!(after.get(Category::Motivation), 5);
        for c in Category::ALL {
            assert!(after.get(c) >= before.get(c));
        }

        m.add_actor("Chef", ActorKind::Internal, "", "").unwrap();
        let later = completeness_score(&m);
        assert_eq!(later.get(Category::Organization), 12);
        assert!(later.total() >= after.total());
    }

    #[test]
    fn test_indicators_and_value_mix() {
        let mut m = full_model();
        m.add_process("Billing", "", None).unwrap();
        m.add_activity("Booking", "Re-key booking", ValueType::Nva, None, 15, None).unwrap();

        let mix = value_mix(&m);
        assert_eq!(mix, ValueMix { va: 1, nva: 1, bva: 0 });
        assert_eq!(time_efficiency(&m), Some(25.0));

        let ind = indicators(&m);
        assert_eq!(ind[0].value, 50.0);
        assert_eq!(ind[0].grade, Grade::Fair);
        assert_eq!(ind[1].value, 50.0);
        assert_eq!(ind[3].value, 10.0);
        assert_eq!(ind[3].grade, Grade::Poor);
        assert_eq!(time_efficiency(&BusinessModel::default()), None);
    }

    #[test]
    fn test_recommendations() {
        let empty = recommendations(&BusinessModel::default());
        let levels: Vec<Level> = empty.iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            vec![Level::Critical, Level::Critical, Level::Improvement, Level::Improvement]
        );

        let full = recommendations(&full_model());
        assert_eq!(full.len(), 1);
        assert_eq!(full[0].level, Level::Excellent);
    }

    #[test]
    fn test_traceability_graph() {
        let mut m = full_model();
        m.add_goal("Loyalty", Perspective::Customer, "").unwrap();
        m.vision.clear();
        let g = traceability(&m);
        assert!(g.edges.contains(&("Goal:Growth".into(), "Process:Booking".into())));
        assert!(g.edges.contains(&("Activity:Check availability".into(), "Rule:Prepay".into())));
        let isolated: Vec<&str> = g.isolated().iter().map(|s| s.as_str()).collect();
        assert_eq!(isolated, vec!["Goal:Loyalty"]);
    }

    #[test]
    fn test_process_flowchart() {
        let m = full_model();
        let chart = process_flowchart(&m, "Booking").unwrap();
        assert!(chart.starts_with("flowchart LR"));
        assert!(chart.contains("START --> A0"));
        assert!(chart.contains("style A0 fill:#d4edda"));
        assert!(chart.ends_with("A0 --> END"));
        assert!(process_flowchart(&m, "Billing").is_none());
    }
}
