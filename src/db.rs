//! State file operations and display helpers.
//!
//! This module provides the `Database` struct holding every installation, the JSON
//! load/save routines shared with the business model file, and the formatting and
//! date utilities used by the command handlers.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::{derive_phase_status, installation_progress, installation_status, phase_progress};
use crate::catalog::Catalog;
use crate::error::{Result, TrackerError};
use crate::fields::*;
use crate::installation::{sanitize_installation_id, Installation, InstallationSpec};

/// Every installation and when any of them last changed.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub installations: BTreeMap<String, Installation>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Database {
    /// Load the state file, falling back to an empty state if it is missing or
    /// malformed. Loaded installations are reconciled against the catalog.
    pub fn load(path: &Path, catalog: &Catalog) -> Self {
        let mut db: Database = load_json_or_default(path);
        for installation in db.installations.values_mut() {
            installation.reconcile(catalog);
        }
        db
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        write_atomic(path, &data)?;
        info!(path = %path.display(), installations = self.installations.len(), "state saved");
        Ok(())
    }

    /// Create a new installation, enforcing unique ids and the installation limit.
    pub fn add_installation(
        &mut self,
        spec: InstallationSpec,
        catalog: &Catalog,
        max_installations: usize,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let id = sanitize_installation_id(&spec.name);
        if id.is_empty() {
            return Err(TrackerError::EmptyField("installation name"));
        }
        if self.installations.contains_key(&id) {
            return Err(TrackerError::InstallationExists(id));
        }
        if self.installations.len() >= max_installations {
            return Err(TrackerError::InstallationLimit(max_installations));
        }
        debug!(installation = %id, "creating installation");
        self.installations.insert(id.clone(), Installation::new(spec, catalog, now));
        self.last_updated = Some(now);
        Ok(id)
    }

    /// Resolve an id or display name to the installation id.
    pub fn resolve(&self, identifier: &str) -> Result<String> {
        if self.installations.contains_key(identifier) {
            return Ok(identifier.to_string());
        }
        let id = sanitize_installation_id(identifier);
        if self.installations.contains_key(&id) {
            Ok(id)
        } else {
            Err(TrackerError::UnknownInstallation(identifier.to_string()))
        }
    }

    pub fn get(&self, identifier: &str) -> Result<&Installation> {
        let id = self.resolve(identifier)?;
        Ok(&self.installations[&id])
    }

    pub fn get_mut(&mut self, identifier: &str) -> Result<&mut Installation> {
        let id = self.resolve(identifier)?;
        self.installations
            .get_mut(&id)
            .ok_or(TrackerError::UnknownInstallation(id))
    }
}

/// Read a JSON document, returning `T::default()` when the file is absent, unreadable
/// or malformed.
pub fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        return T::default();
    }
    let mut buf = String::new();
    match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
        Ok(_) => match serde_json::from_str(&buf) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "error parsing file, starting fresh");
                T::default()
            }
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "error reading file, starting fresh");
            T::default()
        }
    }
}

/// Write `data` to `path` via a temp file and rename.
pub fn write_atomic(path: &Path, data: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    let mut f = File::create(&tmp)?;
    f.write_all(data.as_bytes())?;
    f.flush()?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// Parse human-readable due date input.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "next monday", "this friday", bare weekday names
/// - "end of week", "end of month"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD" and "DD/MM/YYYY"
pub fn parse_due_input(s: &str) -> Result<NaiveDate> {
    parse_due_input_from(s, Local::now().date_naive())
        .ok_or_else(|| TrackerError::InvalidDate(s.to_string()))
}

pub fn parse_due_input_from(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "end of week" | "eow" => {
            let (_, end) = start_end_of_week(today);
            return Some(end);
        }
        "end of month" | "eom" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            let first_of_next = NaiveDate::from_ymd_opt(year, month, 1)?;
            return Some(first_of_next - Duration::days(1));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        // Months are approximated as 30 days.
        for (unit, days) in [("d", 1), ("w", 7), ("m", 30)] {
            if let Some(n) = rest.trim().strip_suffix(unit).and_then(|n| n.trim().parse::<i64>().ok()) {
                return n
                    .checked_mul(days)
                    .and_then(Duration::try_days)
                    .and_then(|offset| today.checked_add_signed(offset));
            }
        }
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];
    let current = today.weekday().num_days_from_monday() as i64;
    for (day_name, target) in weekdays {
        let days_ahead = (target + 7 - current) % 7;
        if s == day_name || s == format!("this {day_name}") {
            return Some(today + Duration::days(days_ahead));
        }
        if s == format!("next {day_name}") {
            let days = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return Some(today + Duration::days(days));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&s, "%d/%m/%Y"))
        .ok()
}

/// Start and end of the ISO week (Monday to Sunday) containing `today`.
pub fn start_end_of_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let weekday = today.weekday().num_days_from_monday() as i64;
    let start = today - Duration::days(weekday);
    (start, start + Duration::days(6))
}

/// Format a date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let days = (d - today).num_days();
            match days {
                0 => "today".into(),
                1 => "tomorrow".into(),
                n if n > 1 => format!("in {n}d"),
                n => format!("{}d late", -n),
            }
        }
    }
}

pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Pending => "Pending",
        Status::InProgress => "InProgress",
        Status::Done => "Done",
        Status::Blocked => "Blocked",
        Status::Skipped => "Skipped",
    }
}

pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::High => "High",
        Priority::Medium => "Medium",
        Priority::Low => "Low",
    }
}

pub fn format_environment(e: Environment) -> &'static str {
    match e {
        Environment::Production => "Production",
        Environment::Staging => "Staging",
        Environment::Homologation => "Homologation",
        Environment::Development => "Development",
    }
}

pub fn format_db_engine(e: DbEngine) -> &'static str {
    match e {
        DbEngine::Postgres => "PostgreSQL",
        DbEngine::Oracle => "Oracle",
        DbEngine::SqlServer => "SQL Server",
        DbEngine::Mysql => "MySQL",
    }
}

pub fn format_os(o: OsServer) -> &'static str {
    match o {
        OsServer::Linux => "Linux",
        OsServer::Windows => "Windows",
    }
}

/// Text progress bar, `width` cells wide.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round().clamp(0.0, width as f64) as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Print the installation list with progress and derived status.
pub fn print_installations(db: &Database) {
    println!(
        "{:<16} {:<22} {:<13} {:<11} {:<11} {:<10} {}",
        "ID", "Name", "Environment", "DB", "Status", "Progress", "Target"
    );
    let today = Local::now().date_naive();
    for (id, inst) in &db.installations {
        let progress = installation_progress(inst);
        println!(
            "{:<16} {:<22} {:<13} {:<11} {:<11} {:<10} {}",
            truncate(id, 16),
            truncate(&inst.name, 22),
            format_environment(inst.environment),
            format_db_engine(inst.sgbd),
            format_status(installation_status(inst)),
            format!("{}/{}", progress.completed, progress.total),
            format_due_relative(inst.target_date, today),
        );
    }
}

/// Print one row per phase of an installation.
pub fn print_phase_table(catalog: &Catalog, inst: &Installation) {
    println!(
        "{:<13} {:<18} {:<8} {:<11} {:<7} {}",
        "Phase", "Name", "Enabled", "Status", "Done", "Progress"
    );
    for def in &catalog.phases {
        let Some(phase) = inst.phases.get(&def.id) else { continue };
        let progress = phase_progress(phase);
        println!(
            "{:<13} {:<18} {:<8} {:<11} {:<7} {} {:.0}%",
            def.id,
            truncate(&def.name, 18),
            if phase.enabled { "yes" } else { "no" },
            format_status(derive_phase_status(phase)),
            format!("{}/{}", progress.completed, progress.total),
            progress_bar(progress.percent(), 20),
            progress.percent(),
        );
    }
    let total = installation_progress(inst);
    println!(
        "\nOverall (enabled phases): {}/{} {:.0}%",
        total.completed,
        total.total,
        total.percent()
    );
}

/// Print the tasks of one phase with their state.
pub fn print_task_table(catalog: &Catalog, inst: &Installation, phase_id: &str) -> Result<()> {
    let def = catalog
        .phase(phase_id)
        .ok_or_else(|| TrackerError::UnknownPhase(phase_id.to_string()))?;
    let phase = inst
        .phases
        .get(phase_id)
        .ok_or_else(|| TrackerError::UnknownPhase(phase_id.to_string()))?;
    println!(
        "{:<26} {:<11} {:<7} {:<11} {:<14} {:<10} {}",
        "Task", "Status", "Pri", "Team", "Assignee", "Due", "Name"
    );
    let today = Local::now().date_naive();
    for t in &def.tasks {
        let Some(state) = phase.tasks.get(&t.id) else { continue };
        println!(
            "{:<26} {:<11} {:<7} {:<11} {:<14} {:<10} {}",
            truncate(&t.id, 26),
            format_status(state.status),
            format_priority(t.priority),
            truncate(&t.team, 11),
            truncate(state.assignee.as_deref().unwrap_or("-"), 14),
            format_due_relative(state.due_date, today),
            t.name,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 10, 30, 0).unwrap()
    }

    fn spec(name: &str) -> InstallationSpec {
        InstallationSpec { name: name.into(), ..Default::default() }
    }

    #[test]
    fn test_add_installation_limits() {
        let catalog = Catalog::builtin();
        let mut db = Database::default();
        assert_eq!(db.add_installation(spec("Production"), &catalog, 2, now()).unwrap(), "production");
        assert!(matches!(
            db.add_installation(spec("production"), &catalog, 2, now()),
            Err(TrackerError::InstallationExists(_))
        ));
        db.add_installation(spec("Staging"), &catalog, 2, now()).unwrap();
        assert!(matches!(
            db.add_installation(spec("Dev"), &catalog, 2, now()),
            Err(TrackerError::InstallationLimit(2))
        ));
        assert!(matches!(
            db.add_installation(spec("  !! "), &catalog, 5, now()),
            Err(TrackerError::EmptyField(_))
        ));
    }

    #[test]
    fn test_resolve_by_name_or_id() {
        let catalog = Catalog::builtin();
        let mut db = Database::default();
        db.add_installation(spec("Staging EU"), &catalog, 2, now()).unwrap();
        assert_eq!(db.resolve("staging_eu").unwrap(), "staging_eu");
        assert_eq!(db.resolve("Staging EU").unwrap(), "staging_eu");
        assert!(db.get("prod").is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let catalog = Catalog::builtin();
        let mut db = Database::default();
        db.add_installation(spec("Production"), &catalog, 2, now()).unwrap();
        db.save(&path).unwrap();

        let loaded = Database::load(&path, &catalog);
        assert_eq!(loaded, db);
        assert!(!dir.path().join("state.json.tmp").exists());
    }

    #[test]
    fn test_persisted_layout_keys() {
        let catalog = Catalog::builtin();
        let mut db = Database::default();
        db.add_installation(spec("Production"), &catalog, 2, now()).unwrap();
        let value = serde_json::to_value(&db).unwrap();
        let inst = &value["installations"]["production"];
        for key in ["name", "environment", "description", "created_at", "target_date", "sgbd", "os_server", "active", "phases"] {
            assert!(inst.get(key).is_some(), "missing {key}");
        }
        let phase = &inst["phases"]["infra"];
        assert_eq!(phase["enabled"], true);
        assert_eq!(phase["status"], "pending");
        let task = &phase["tasks"]["infra.provision"];
        for key in ["status", "assignee", "due_date", "notes", "completed_at"] {
            assert!(task.get(key).is_some(), "missing {key}");
        }
        assert!(value.get("last_updated").is_some());
    }

    #[test]
    fn test_malformed_file_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Database::load(&path, &Catalog::builtin()), Database::default());
        assert_eq!(Database::load(&dir.path().join("missing.json"), &Catalog::builtin()), Database::default());
    }

    #[test]
    fn test_parse_due_input() {
        // 2026-06-03 is a Wednesday.
        let today = NaiveDate::from_ymd_opt(2026, 6, 3).unwrap();
        let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
        assert_eq!(parse_due_input_from("today", today), d(2026, 6, 3));
        assert_eq!(parse_due_input_from("Tomorrow", today), d(2026, 6, 4));
        assert_eq!(parse_due_input_from("in 3d", today), d(2026, 6, 6));
        assert_eq!(parse_due_input_from("in 2w", today), d(2026, 6, 17));
        assert_eq!(parse_due_input_from("friday", today), d(2026, 6, 5));
        assert_eq!(parse_due_input_from("wednesday", today), d(2026, 6, 3));
        assert_eq!(parse_due_input_from("next wednesday", today), d(2026, 6, 10));
        assert_eq!(parse_due_input_from("next monday", today), d(2026, 6, 15));
        assert_eq!(parse_due_input_from("eow", today), d(2026, 6, 7));
        assert_eq!(parse_due_input_from("eom", today), d(2026, 6, 30));
        assert_eq!(parse_due_input_from("2026-12-31", today), d(2026, 12, 31));
        assert_eq!(parse_due_input_from("31/12/2026", today), d(2026, 12, 31));
        assert_eq!(parse_due_input_from("someday", today), None);
        // Offsets beyond the calendar range are rejected rather than overflowing.
        assert_eq!(parse_due_input_from("in 1000000000d", today), None);
        assert_eq!(parse_due_input_from("in 99999999999999999d", today), None);
        assert_eq!(parse_due_input_from("in 9223372036854775807w", today), None);
        assert!(matches!(parse_due_input("in 1000000000m"), Err(TrackerError::InvalidDate(_))));
    }

    #[test]
    fn test_format_helpers() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 3).unwrap();
        assert_eq!(format_due_relative(None, today), "-");
        assert_eq!(format_due_relative(Some(today), today), "today");
        assert_eq!(format_due_relative(NaiveDate::from_ymd_opt(2026, 6, 8), today), "in 5d");
        assert_eq!(format_due_relative(NaiveDate::from_ymd_opt(2026, 6, 1), today), "2d late");
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
        assert_eq!(progress_bar(50.0, 10), "[#####.....]");
        assert_eq!(progress_bar(0.0, 4), "[....]");
    }
}
