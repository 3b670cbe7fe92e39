//! Enumerations and field types for pipeline tracking and business modeling.
//!
//! This module defines the structured values that task states, installations and
//! business model records are built from: statuses, priorities, deployment targets,
//! and the classification vocabularies used by the completeness scorer.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a single task, and the derived status of a phase.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "InProgress")]
    InProgress,
    #[serde(alias = "Done")]
    Done,
    #[serde(alias = "Blocked")]
    Blocked,
    #[serde(alias = "Skipped")]
    Skipped,
}

/// Priority tier of a catalog task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Deployment environment an installation represents.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    #[default]
    Production,
    Staging,
    Homologation,
    Development,
}

/// Database engine the installation targets.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DbEngine {
    #[default]
    Postgres,
    Oracle,
    SqlServer,
    Mysql,
}

/// Operating system of the application server.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OsServer {
    #[default]
    Linux,
    Windows,
}

/// Balanced Scorecard perspective a goal belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Perspective {
    Financial,
    Customer,
    InternalProcess,
    LearningGrowth,
}

/// Generic strategy type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    Differentiation,
    CostLeadership,
    Focus,
}

/// PESTEL and SWOT categories for influencers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum InfluencerKind {
    Political,
    Economic,
    Social,
    Technological,
    Environmental,
    Legal,
    Strength,
    Weakness,
    Opportunity,
    Threat,
}

impl InfluencerKind {
    /// Whether the category belongs to the SWOT matrix rather than PESTEL.
    pub fn is_swot(self) -> bool {
        matches!(
            self,
            InfluencerKind::Strength
                | InfluencerKind::Weakness
                | InfluencerKind::Opportunity
                | InfluencerKind::Threat
        )
    }
}

/// Impact level of an influencer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Impact {
    Low,
    Medium,
    High,
}

/// Lean value classification of an activity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValueType {
    /// Value-added for the customer.
    Va,
    /// Non-value-added; waste.
    Nva,
    /// Business value-added; required but invisible to the customer.
    Bva,
}

/// Kind of actor taking part in processes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ActorKind {
    Internal,
    External,
    System,
    Partner,
}

/// RACI responsibility letter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
pub enum RaciRole {
    #[serde(rename = "R")]
    Responsible,
    #[serde(rename = "A")]
    Accountable,
    #[serde(rename = "C")]
    Consulted,
    #[serde(rename = "I")]
    Informed,
}

/// SBVR rule type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    Structural,
    Operative,
}

/// SBVR modality of an operative rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Modality {
    Obligation,
    Prohibition,
    Permission,
}

/// DMN hit policy of a decision table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum HitPolicy {
    Unique,
    Any,
    First,
    RuleOrder,
    Collect,
}

/// Shape of exported documents.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// Business model snapshot as JSON.
    Json,
    /// Business model summary as Markdown.
    Markdown,
    /// Installation progress report as Markdown.
    Report,
}
