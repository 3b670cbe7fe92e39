//! Command implementations for the CLI interface.
//!
//! This module contains the subcommand definitions and their handlers: creating and
//! listing installations, editing task state through typed mutations, rollup views,
//! business model editing and scoring, exports and backups.

use std::fs;
use std::path::Path;

use chrono::{Local, Utc};
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::aggregate::{installation_progress, team_workload};
use crate::catalog::Catalog;
use crate::db::*;
use crate::deps::{dependents, pending_prerequisites};
use crate::error::TrackerError;
use crate::export::{installation_report, model_report, model_snapshot};
use crate::fields::*;
use crate::installation::{sanitize_installation_id, InstallationSpec};
use crate::model::{BusinessModel, DecisionRow, RecordKind};
use crate::mutation::Mutation;
use crate::score::*;

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new installation with every task Pending.
    Init {
        /// Display name, e.g. "Production".
        name: String,
        #[arg(long, value_enum, default_value_t = Environment::Production)]
        env: Environment,
        /// Target database engine.
        #[arg(long, value_enum, default_value_t = DbEngine::Postgres)]
        sgbd: DbEngine,
        /// Application server OS.
        #[arg(long, value_enum, default_value_t = OsServer::Linux)]
        os: OsServer,
        /// Target go-live date: YYYY-MM-DD, "in 6w", "end of month", ...
        #[arg(long)]
        target: Option<String>,
        #[arg(long)]
        desc: Option<String>,
    },

    /// List installations with progress and overall status.
    List,

    /// Show phase rollups for an installation, or the tasks of one phase.
    Status {
        /// Installation id or name ("-" for the configured default).
        installation: String,
        /// Show the tasks of this phase instead.
        #[arg(long)]
        phase: Option<String>,
    },

    /// View one task with its outstanding prerequisites.
    View { installation: String, task: String },

    /// Set the status of a task.
    Set {
        installation: String,
        task: String,
        #[arg(value_enum)]
        status: Status,
    },

    /// Assign a task to someone.
    Assign {
        installation: String,
        task: String,
        name: Option<String>,
        /// Remove the current assignee.
        #[arg(long, conflicts_with = "name")]
        clear: bool,
    },

    /// Attach a note or warning to a task.
    Note {
        installation: String,
        task: String,
        text: Option<String>,
        #[arg(long, conflicts_with = "text")]
        clear: bool,
    },

    /// Set a task due date: YYYY-MM-DD, "today", "tomorrow", "in Nd", "next friday".
    Due {
        installation: String,
        task: String,
        date: Option<String>,
        #[arg(long, conflicts_with = "date")]
        clear: bool,
    },

    /// Enable or disable a phase. Disabled phases drop out of installation totals.
    Toggle { installation: String, phase: String },

    /// Apply one status to every task of a phase.
    Bulk {
        installation: String,
        phase: String,
        #[arg(value_enum)]
        status: Status,
    },

    /// Reset an installation: every task back to Pending, every phase enabled.
    Reset {
        installation: String,
        /// Confirm the reset.
        #[arg(long)]
        yes: bool,
    },

    /// Task counts per team.
    Teams { installation: String },

    /// Action plan: tasks with due dates, soonest first.
    Timeline {
        installation: String,
        /// Include Done and Skipped tasks.
        #[arg(long)]
        all: bool,
    },

    /// Show the task catalog.
    Catalog {
        /// Validate ids and dependency edges instead of listing.
        #[arg(long)]
        check: bool,
    },

    /// Edit and analyse the business model.
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Write a JSON or Markdown export.
    Export {
        #[arg(value_enum)]
        format: ExportFormat,
        /// Output file path ("-" for stdout).
        #[arg(long, short)]
        output: Option<String>,
    },

    /// Create a timestamped backup of the state file.
    Backup,

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// Print the model contents.
    Show,
    Company { name: String },
    Vision { text: String },
    Mission { text: String },
    /// Add a goal, optionally with a SMART objective.
    Goal {
        name: String,
        #[arg(long, value_enum)]
        perspective: Perspective,
        #[arg(long, default_value = "")]
        desc: String,
        /// Specific statement of the objective.
        #[arg(long)]
        objective: Option<String>,
        #[arg(long, default_value = "")]
        measurable: String,
        #[arg(long, default_value_t = 0.0)]
        target: f64,
        #[arg(long, default_value = "")]
        unit: String,
        #[arg(long)]
        deadline: Option<String>,
    },
    Strategy {
        name: String,
        #[arg(long, value_enum)]
        kind: StrategyKind,
        /// Goal name this strategy serves.
        #[arg(long)]
        goal: Option<String>,
        #[arg(long, default_value = "")]
        tactic: String,
    },
    /// Add a PESTEL or SWOT influencer.
    Influencer {
        #[arg(value_enum)]
        kind: InfluencerKind,
        description: String,
        #[arg(long, value_enum)]
        impact: Option<Impact>,
    },
    Process {
        name: String,
        #[arg(long, default_value = "")]
        trigger: String,
        #[arg(long)]
        goal: Option<String>,
    },
    Activity {
        /// Process name or id.
        process: String,
        name: String,
        #[arg(long, value_enum)]
        value: ValueType,
        /// Responsible actor name.
        #[arg(long)]
        role: Option<String>,
        /// Average duration in minutes.
        #[arg(long, default_value_t = 5)]
        minutes: u32,
        #[arg(long)]
        rule: Option<String>,
    },
    Actor {
        name: String,
        #[arg(long, value_enum)]
        kind: ActorKind,
        #[arg(long, default_value = "")]
        roles: String,
        #[arg(long, default_value = "")]
        department: String,
    },
    Raci {
        activity: String,
        actor: String,
        #[arg(value_enum)]
        role: RaciRole,
    },
    Rule {
        name: String,
        statement: String,
        #[arg(long, value_enum)]
        kind: RuleKind,
        #[arg(long, value_enum)]
        modality: Option<Modality>,
        #[arg(long, default_value = "")]
        source: String,
    },
    /// Add a decision table. Rows are written "cond1;cond2=>result".
    Decision {
        name: String,
        #[arg(long, value_enum, default_value_t = HitPolicy::Unique)]
        policy: HitPolicy,
        /// Input column. May be repeated.
        #[arg(long = "input", required = true)]
        inputs: Vec<String>,
        #[arg(long)]
        output: String,
        #[arg(long = "row")]
        rows: Vec<String>,
    },
    Term {
        term: String,
        definition: String,
        #[arg(long, default_value = "")]
        synonyms: String,
        #[arg(long, default_value = "")]
        context: String,
        #[arg(long, default_value = "")]
        source: String,
    },
    /// Remove a record by id.
    Remove {
        #[arg(value_enum)]
        kind: RecordKind,
        id: String,
    },
    /// Completeness score per category.
    Score,
    /// Value indicators.
    Indicators,
    /// Recommendations derived from the current model.
    Recommend,
    /// Traceability graph statistics.
    Trace,
    /// Mermaid flowchart of a process.
    Flow { process: String },
}

fn fail(context: &str, e: TrackerError) -> ! {
    eprintln!("{context}: {e}");
    std::process::exit(1);
}

fn save_db(db: &Database, db_path: &Path) {
    if let Err(e) = db.save(db_path) {
        fail("Failed to save state", e);
    }
}

/// Create an installation.
#[allow(clippy::too_many_arguments)]
pub fn cmd_init(
    db: &mut Database,
    db_path: &Path,
    catalog: &Catalog,
    max_installations: usize,
    name: String,
    environment: Environment,
    sgbd: DbEngine,
    os_server: OsServer,
    target: Option<String>,
    desc: Option<String>,
) {
    let target_date = match target.as_deref().map(parse_due_input).transpose() {
        Ok(d) => d,
        Err(e) => fail("Invalid target date", e),
    };
    let spec = InstallationSpec {
        name,
        environment,
        description: desc.unwrap_or_default(),
        target_date,
        sgbd,
        os_server,
    };
    match db.add_installation(spec, catalog, max_installations, Utc::now()) {
        Ok(id) => {
            save_db(db, db_path);
            println!("Created installation '{id}'.");
        }
        Err(e) => fail("Cannot create installation", e),
    }
}

pub fn cmd_list(db: &Database) {
    if db.installations.is_empty() {
        println!("No installations. Create one with `pt init <name>`.");
        return;
    }
    print_installations(db);
}

pub fn cmd_status(db: &Database, catalog: &Catalog, installation: &str, phase: Option<String>) {
    let inst = match db.get(installation) {
        Ok(i) => i,
        Err(e) => fail("Error", e),
    };
    println!(
        "{} [{} | {} | {}]",
        inst.name,
        format_environment(inst.environment),
        format_db_engine(inst.sgbd),
        format_os(inst.os_server)
    );
    if !inst.description.is_empty() {
        println!("{}", inst.description);
    }
    println!();
    match phase {
        Some(p) => {
            if let Err(e) = print_task_table(catalog, inst, &p) {
                fail("Error", e);
            }
        }
        None => print_phase_table(catalog, inst),
    }
}

pub fn cmd_view(db: &Database, catalog: &Catalog, installation: &str, task_id: &str) {
    let inst = match db.get(installation) {
        Ok(i) => i,
        Err(e) => fail("Error", e),
    };
    let (Some(task), Some(state)) = (catalog.task(task_id), inst.task_state(catalog, task_id)) else {
        fail("Error", TrackerError::UnknownTask(task_id.to_string()));
    };
    let phase = catalog.phase_of(task_id).map(|p| p.name.as_str()).unwrap_or("-");
    let today = Local::now().date_naive();

    println!("{}  {}", task.id, task.name);
    println!("Phase:      {phase}");
    println!("Team:       {}", task.team);
    println!("Priority:   {}", format_priority(task.priority));
    println!("Status:     {}", format_status(state.status));
    println!("Assignee:   {}", state.assignee.as_deref().unwrap_or("-"));
    println!("Due:        {}", format_due_relative(state.due_date, today));
    if let Some(done) = state.completed_at {
        println!("Completed:  {}", done.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    }
    if !task.notes.is_empty() {
        println!("Catalog:    {}", task.notes);
    }
    if let Some(note) = &state.notes {
        println!("Note:       {note}");
    }

    let pending = pending_prerequisites(catalog, inst, task_id);
    if !pending.is_empty() {
        println!("\nWaiting on:");
        for p in pending {
            println!(
                "  {:<26} {:<11} {}",
                p.task_id,
                p.status.map(format_status).unwrap_or("unknown"),
                p.name.unwrap_or_default()
            );
        }
    }
    let after = dependents(catalog, task_id);
    if !after.is_empty() {
        println!("\nUnblocks:");
        for t in after {
            println!("  {:<26} {}", t.id, t.name);
        }
    }
}

/// Apply one mutation and persist.
pub fn cmd_apply(db: &mut Database, db_path: &Path, catalog: &Catalog, mutation: Mutation, done_msg: &str) {
    if let Err(e) = db.apply(catalog, mutation, Utc::now()) {
        fail("Error", e);
    }
    save_db(db, db_path);
    println!("{done_msg}");
}

pub fn cmd_due(
    db: &mut Database,
    db_path: &Path,
    catalog: &Catalog,
    installation: String,
    task: String,
    date: Option<String>,
    clear: bool,
) {
    let due = match (date, clear) {
        (_, true) => None,
        (Some(d), false) => match parse_due_input(&d) {
            Ok(d) => Some(d),
            Err(e) => fail("Error", e),
        },
        (None, false) => {
            eprintln!("Error: give a date or --clear");
            std::process::exit(1);
        }
    };
    let msg = match due {
        Some(d) => format!("Due date of {task} set to {d}."),
        None => format!("Due date of {task} cleared."),
    };
    cmd_apply(db, db_path, catalog, Mutation::SetDueDate { installation, task, due }, &msg);
}

pub fn cmd_reset(db: &mut Database, db_path: &Path, catalog: &Catalog, installation: String, yes: bool) {
    if !yes {
        eprintln!("Reset discards every status, assignee, note and due date of '{installation}'. Re-run with --yes.");
        std::process::exit(1);
    }
    let msg = format!("Installation '{installation}' reset.");
    cmd_apply(db, db_path, catalog, Mutation::ResetInstallation { installation }, &msg);
}

pub fn cmd_teams(db: &Database, catalog: &Catalog, installation: &str) {
    let inst = match db.get(installation) {
        Ok(i) => i,
        Err(e) => fail("Error", e),
    };
    println!("{:<14} {:<6} {:<6} {:<8} {}", "Team", "Tasks", "Done", "Blocked", "Progress");
    for (team, load) in team_workload(catalog, inst) {
        let pct = if load.total == 0 { 0.0 } else { load.done as f64 * 100.0 / load.total as f64 };
        println!(
            "{:<14} {:<6} {:<6} {:<8} {} {:.0}%",
            truncate(&team, 14),
            load.total,
            load.done,
            load.blocked,
            progress_bar(pct, 20),
            pct
        );
    }
}

pub fn cmd_timeline(db: &Database, catalog: &Catalog, installation: &str, all: bool) {
    let inst = match db.get(installation) {
        Ok(i) => i,
        Err(e) => fail("Error", e),
    };
    let today = Local::now().date_naive();
    let mut rows = Vec::new();
    for def in &catalog.phases {
        let Some(phase) = inst.phases.get(&def.id) else { continue };
        if !phase.enabled {
            continue;
        }
        for t in &def.tasks {
            let Some(state) = phase.tasks.get(&t.id) else { continue };
            let Some(due) = state.due_date else { continue };
            if !all && matches!(state.status, Status::Done | Status::Skipped) {
                continue;
            }
            rows.push((due, def.name.as_str(), t, state));
        }
    }
    if rows.is_empty() {
        println!("No scheduled tasks. Set due dates with `pt due`.");
        return;
    }
    rows.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.2.priority.cmp(&b.2.priority)));

    println!("{:<12} {:<10} {:<15} {:<11} {:<14} {}", "Date", "Due", "Phase", "Status", "Assignee", "Task");
    for (due, phase, t, state) in rows {
        println!(
            "{:<12} {:<10} {:<15} {:<11} {:<14} {}",
            due,
            format_due_relative(Some(due), today),
            truncate(phase, 15),
            format_status(state.status),
            truncate(state.assignee.as_deref().unwrap_or("-"), 14),
            t.name
        );
    }
    if let Some(target) = inst.target_date {
        let progress = installation_progress(inst);
        println!(
            "\nGo-live {} ({}), {:.0}% complete.",
            target,
            format_due_relative(Some(target), today),
            progress.percent()
        );
    }
}

pub fn cmd_catalog(catalog: &Catalog, check: bool) {
    if check {
        let issues = catalog.validate();
        if issues.is_empty() {
            println!("Catalog OK: {} phases, {} tasks.", catalog.phases.len(), catalog.tasks().count());
            return;
        }
        for issue in &issues {
            eprintln!("{issue}");
        }
        std::process::exit(1);
    }
    println!("Teams: {}\n", catalog.teams().join(", "));
    for def in &catalog.phases {
        println!("{} ({})", def.name, def.id);
        for t in &def.tasks {
            let after = if t.depends_on.is_empty() {
                String::new()
            } else {
                format!("  after: {}", t.depends_on.join(", "))
            };
            println!(
                "  {:<26} {:<7} {:<11} {}{}",
                t.id,
                format_priority(t.priority),
                t.team,
                t.name,
                after
            );
        }
    }
}

fn parse_row(raw: &str) -> Option<DecisionRow> {
    let (conditions, result) = raw.split_once("=>")?;
    Some(DecisionRow {
        conditions: conditions.split(';').map(|c| c.trim().to_string()).collect(),
        result: result.trim().to_string(),
    })
}

/// Print the model contents grouped by discipline.
fn print_model(model: &BusinessModel) {
    println!("Company: {}", if model.company_name.is_empty() { "-" } else { model.company_name.as_str() });
    println!("Vision:  {}", if model.vision.is_empty() { "-" } else { model.vision.as_str() });
    println!("Mission: {}", if model.mission.is_empty() { "-" } else { model.mission.as_str() });
    println!("\nGoals");
    for g in &model.goals {
        println!("  {} {} ({:?})", g.id, g.name, g.perspective);
        for o in model.objectives.iter().filter(|o| o.goal_id == g.id) {
            let deadline = o.deadline.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
            println!("    {} {} -> {} {} by {}", o.id, o.specific, o.target, o.unit, deadline);
        }
    }
    println!("\nStrategies");
    for s in &model.strategies {
        println!("  {} {} ({:?}) goal: {}", s.id, s.name, s.kind, s.goal.as_deref().unwrap_or("-"));
    }
    println!("\nInfluencers");
    for i in &model.influencers {
        println!("  {} {:?}: {}", i.id, i.kind, i.description);
    }
    println!("\nProcesses");
    for p in &model.processes {
        let count = model.activities.iter().filter(|a| a.process_id == p.id).count();
        println!("  {} {} ({} activities) goal: {}", p.id, p.name, count, p.goal.as_deref().unwrap_or("-"));
        for a in model.activities.iter().filter(|a| a.process_id == p.id) {
            println!(
                "    {} {} [{:?}] {}min role: {}",
                a.id,
                a.name,
                a.value_type,
                a.time_min,
                a.role.as_deref().unwrap_or("-")
            );
        }
    }
    println!("\nActors");
    for a in &model.actors {
        println!("  {} {} ({:?}) {}", a.id, a.name, a.kind, a.department);
    }
    println!("\nRACI");
    for r in &model.raci {
        println!("  {} {} / {}: {:?}", r.id, r.activity, r.actor, r.role);
    }
    println!("\nRules");
    for r in &model.rules {
        println!("  {} {}: {}", r.id, r.name, r.statement);
    }
    println!("\nDecision tables");
    for d in &model.decision_tables {
        println!("  {} {} ({:?}) {} -> {} [{} rows]", d.id, d.name, d.hit_policy, d.inputs.join(", "), d.output, d.rows.len());
    }
    println!("\nGlossary");
    for t in &model.glossary {
        println!("  {} {}: {}", t.id, t.term, t.definition);
    }
}

/// Handle business model edits and analyses.
pub fn cmd_model(model_path: &Path, action: ModelAction) {
    let mut model = BusinessModel::load(model_path);
    let result = match action {
        ModelAction::Show => {
            print_model(&model);
            return;
        }
        ModelAction::Score => {
            let score = completeness_score(&model);
            for c in Category::ALL {
                let pts = score.get(c);
                println!(
                    "{:<13} {:>2}/{} {}",
                    c.label(),
                    pts,
                    CATEGORY_MAX,
                    progress_bar(pts as f64 * 100.0 / CATEGORY_MAX as f64, 20)
                );
            }
            let total = score.total();
            println!("\nBusiness model score: {total}/100{}", if total >= 80 { "" } else { " (target: 80+)" });
            return;
        }
        ModelAction::Indicators => {
            for ind in indicators(&model) {
                println!("{:<28} {:>4.0}%  {:?}  ({})", ind.name, ind.value, ind.grade, ind.description);
            }
            let mix = value_mix(&model);
            println!("\nActivities VA/NVA/BVA: {}/{}/{}", mix.va, mix.nva, mix.bva);
            if let Some(eff) = time_efficiency(&model) {
                println!("Time efficiency (VA): {eff:.0}%");
            }
            return;
        }
        ModelAction::Recommend => {
            for r in recommendations(&model) {
                println!("[{:?}] {}", r.level, r.message);
            }
            return;
        }
        ModelAction::Trace => {
            let graph = traceability(&model);
            if graph.nodes.len() < 2 {
                println!("Not enough linked elements yet. Add goals, processes and activities first.");
                return;
            }
            println!("Nodes: {}  Edges: {}", graph.nodes.len(), graph.edges.len());
            for (from, to) in &graph.edges {
                println!("  {from} -> {to}");
            }
            let isolated = graph.isolated();
            if !isolated.is_empty() {
                println!("\nIsolated ({}):", isolated.len());
                for n in isolated {
                    println!("  {n}");
                }
            }
            return;
        }
        ModelAction::Flow { process } => {
            match process_flowchart(&model, &process) {
                Some(chart) => println!("{chart}"),
                None => println!("No activities recorded for process '{process}'."),
            }
            return;
        }
        ModelAction::Company { name } => model.set_company(&name).map(|_| "Company set.".to_string()),
        ModelAction::Vision { text } => model.set_vision(&text).map(|_| "Vision set.".to_string()),
        ModelAction::Mission { text } => model.set_mission(&text).map(|_| "Mission set.".to_string()),
        ModelAction::Goal { name, perspective, desc, objective, measurable, target, unit, deadline } => {
            let deadline = match deadline.as_deref().map(parse_due_input).transpose() {
                Ok(d) => d,
                Err(e) => fail("Invalid deadline", e),
            };
            // Validate the objective before adding the goal so a bad objective adds nothing.
            if objective.as_deref().is_some_and(|o| o.trim().is_empty()) {
                fail("Error", TrackerError::EmptyField("objective"));
            }
            model.add_goal(&name, perspective, &desc).and_then(|goal_id| {
                if let Some(specific) = objective {
                    model.add_objective(&goal_id, &specific, &measurable, target, &unit, deadline)?;
                }
                Ok(format!("Goal added: {goal_id}"))
            })
        }
        ModelAction::Strategy { name, kind, goal, tactic } => model
            .add_strategy(&name, kind, goal.as_deref(), &tactic)
            .map(|id| format!("Strategy added: {id}")),
        ModelAction::Influencer { kind, description, impact } => model
            .add_influencer(kind, &description, impact)
            .map(|id| format!("Influencer added: {id}")),
        ModelAction::Process { name, trigger, goal } => model
            .add_process(&name, &trigger, goal.as_deref())
            .map(|id| format!("Process added: {id}")),
        ModelAction::Activity { process, name, value, role, minutes, rule } => model
            .add_activity(&process, &name, value, role.as_deref(), minutes, rule.as_deref())
            .map(|id| format!("Activity added: {id}")),
        ModelAction::Actor { name, kind, roles, department } => model
            .add_actor(&name, kind, &roles, &department)
            .map(|id| format!("Actor added: {id}")),
        ModelAction::Raci { activity, actor, role } => model
            .add_raci(&activity, &actor, role)
            .map(|id| format!("RACI entry added: {id}")),
        ModelAction::Rule { name, statement, kind, modality, source } => model
            .add_rule(&name, &statement, kind, modality, &source)
            .map(|id| format!("Rule added: {id}")),
        ModelAction::Decision { name, policy, inputs, output, rows } => {
            let mut parsed = Vec::new();
            for raw in &rows {
                match parse_row(raw) {
                    Some(row) => parsed.push(row),
                    None => {
                        eprintln!("Error: row '{raw}' is not in the form \"cond1;cond2=>result\"");
                        std::process::exit(1);
                    }
                }
            }
            model
                .add_decision_table(&name, policy, inputs, &output, parsed)
                .map(|id| format!("Decision table added: {id}"))
        }
        ModelAction::Term { term, definition, synonyms, context, source } => model
            .add_term(&term, &definition, &synonyms, &context, &source)
            .map(|id| format!("Term added: {id}")),
        ModelAction::Remove { kind, id } => model.remove(kind, &id).map(|_| format!("Removed {id}.")),
    };

    match result {
        Ok(msg) => {
            if let Err(e) = model.save(model_path) {
                fail("Failed to save model", e);
            }
            println!("{msg}");
        }
        Err(e) => fail("Error", e),
    }
}

/// File-name-safe form of the company name used in default export paths.
fn export_stem(company_name: &str) -> String {
    let stem = sanitize_installation_id(company_name);
    if stem.is_empty() {
        "export".to_string()
    } else {
        stem
    }
}

/// Write an export to a file, or stdout for "-".
pub fn cmd_export(db: &Database, catalog: &Catalog, model_path: &Path, format: ExportFormat, output: Option<String>) {
    let now = Utc::now();
    let model = BusinessModel::load(model_path);
    let stem = export_stem(&model.company_name);
    let (content, default_name) = match format {
        ExportFormat::Json => {
            let value = match model_snapshot(&model, now) {
                Ok(v) => v,
                Err(e) => fail("Export failed", e),
            };
            let text = match serde_json::to_string_pretty(&value) {
                Ok(t) => t,
                Err(e) => fail("Export failed", e.into()),
            };
            (text, format!("business_model_{stem}.json"))
        }
        ExportFormat::Markdown => (model_report(&model, now), format!("report_{stem}.md")),
        ExportFormat::Report => (installation_report(catalog, db, now), "installations_report.md".to_string()),
    };
    let output = output.unwrap_or(default_name);
    if output == "-" {
        print!("{content}");
        return;
    }
    match fs::write(&output, content) {
        Ok(()) => println!("Exported to {output}"),
        Err(e) => fail("Export failed", e.into()),
    }
}

/// Create a timestamped backup of the state file.
pub fn create_backup(db_path: &Path) -> Result<String, std::io::Error> {
    if !db_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "State file does not exist",
        ));
    }
    let parent_dir = db_path.parent().unwrap_or_else(|| Path::new("."));
    let backup_dir = parent_dir.join("backup");
    fs::create_dir_all(&backup_dir)?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let file_name = db_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("state.json");
    let backup_path = backup_dir.join(format!("{timestamp}_{file_name}"));
    fs::copy(db_path, &backup_path)?;
    Ok(backup_path.to_string_lossy().to_string())
}

pub fn cmd_backup(db_path: &Path) {
    match create_backup(db_path) {
        Ok(path) => println!("Backup created: {path}"),
        Err(e) => fail("Failed to create backup", e.into()),
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
