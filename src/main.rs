//! # pt - Installation Pipeline Tracker
//!
//! A command-line tracker for deploying an enterprise application to a client
//! environment. Every installation follows the same catalog of phases and tasks;
//! the tracker records who owns each task, where it stands, and rolls that up
//! into phase and installation status, team workload, and a go-live timeline.
//!
//! A second dataset holds a business model (motivation, processes, organization,
//! rules) which the tracker scores for completeness and exports as JSON or Markdown.
//!
//! ## Quick Start
//!
//! ```bash
//! pt init Production --env production --sgbd oracle --target "in 6w"
//! pt status production
//! pt set production infra.provision done
//! pt assign production database.install "Ana"
//! pt timeline production
//! pt model score
//! ```
//!
//! Data lives in `~/.pt/`: `state.json` for installations, `model.json` for the
//! business model and an optional `config.toml`. Set `PT_LOG=debug` for diagnostics.

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod aggregate;
pub mod catalog;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod deps;
pub mod error;
pub mod export;
pub mod fields;
pub mod installation;
pub mod model;
pub mod mutation;
pub mod score;
pub mod task;

use catalog::Catalog;
use cli::Cli;
use cmd::*;
use config::Config;
use db::{format_status, Database};
use mutation::Mutation;

fn init_tracing(verbose: bool, config: &Config) {
    let filter = EnvFilter::try_from_env("PT_LOG").unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { config.log_level.as_str() };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();

    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let pt_dir = PathBuf::from(home).join(".pt");
    if let Err(e) = std::fs::create_dir_all(&pt_dir) {
        eprintln!("Failed to create data directory {}: {}", pt_dir.display(), e);
        std::process::exit(1);
    }

    let config_path = cli.config.clone().unwrap_or_else(|| pt_dir.join("config.toml"));
    let config = Config::load(&config_path);
    init_tracing(cli.verbose, &config);
    debug!(?config, "configuration loaded");

    let db_path = cli.db.clone().unwrap_or_else(|| pt_dir.join("state.json"));
    let model_path = cli.model.clone().unwrap_or_else(|| pt_dir.join("model.json"));
    let catalog = Catalog::builtin();

    // Commands that never touch installation state.
    let command = match cli.command {
        Commands::Model { action } => return cmd_model(&model_path, action),
        Commands::Completions { shell } => return cmd_completions(shell),
        Commands::Catalog { check } => return cmd_catalog(&catalog, check),
        Commands::Backup => return cmd_backup(&db_path),
        other => other,
    };

    let mut db = Database::load(&db_path, &catalog);
    let inst = |arg: String| config.installation(&arg).to_string();

    match command {
        Commands::Init { name, env, sgbd, os, target, desc } => cmd_init(
            &mut db,
            &db_path,
            &catalog,
            config.max_installations,
            name,
            env,
            sgbd,
            os,
            target,
            desc,
        ),

        Commands::List => cmd_list(&db),

        Commands::Status { installation, phase } => cmd_status(&db, &catalog, &inst(installation), phase),

        Commands::View { installation, task } => cmd_view(&db, &catalog, &inst(installation), &task),

        Commands::Set { installation, task, status } => {
            let msg = format!("{task} -> {}", format_status(status));
            let m = Mutation::SetTaskStatus { installation: inst(installation), task, status };
            cmd_apply(&mut db, &db_path, &catalog, m, &msg)
        }

        Commands::Assign { installation, task, name, clear } => {
            let assignee = if clear { None } else { name };
            let msg = match &assignee {
                Some(a) => format!("{task} assigned to {a}."),
                None => format!("{task} unassigned."),
            };
            let m = Mutation::SetAssignee { installation: inst(installation), task, assignee };
            cmd_apply(&mut db, &db_path, &catalog, m, &msg)
        }

        Commands::Note { installation, task, text, clear } => {
            let note = if clear { None } else { text };
            let msg = if note.as_deref().map_or(true, |n| n.trim().is_empty()) {
                format!("Note on {task} cleared.")
            } else {
                format!("Note on {task} saved.")
            };
            let m = Mutation::SetTaskNote { installation: inst(installation), task, note };
            cmd_apply(&mut db, &db_path, &catalog, m, &msg)
        }

        Commands::Due { installation, task, date, clear } =>
            cmd_due(&mut db, &db_path, &catalog, inst(installation), task, date, clear),

        Commands::Toggle { installation, phase } => {
            let msg = format!("Phase {phase} toggled.");
            let m = Mutation::TogglePhaseEnabled { installation: inst(installation), phase };
            cmd_apply(&mut db, &db_path, &catalog, m, &msg)
        }

        Commands::Bulk { installation, phase, status } => {
            let msg = format!("Every task of {phase} -> {}", format_status(status));
            let m = Mutation::SetPhaseStatus { installation: inst(installation), phase, status };
            cmd_apply(&mut db, &db_path, &catalog, m, &msg)
        }

        Commands::Reset { installation, yes } => cmd_reset(&mut db, &db_path, &catalog, inst(installation), yes),

        Commands::Teams { installation } => cmd_teams(&db, &catalog, &inst(installation)),

        Commands::Timeline { installation, all } => cmd_timeline(&db, &catalog, &inst(installation), all),

        Commands::Export { format, output } => cmd_export(&db, &catalog, &model_path, format, output),

        Commands::Model { .. } | Commands::Completions { .. } | Commands::Catalog { .. } | Commands::Backup => {
            unreachable!("handled above")
        }
    }
}
