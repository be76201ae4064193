//! Operator console for the indicator dashboard core.
//!
//! # Responsibility
//! - Stand in for the browser UI: feed one event per input line into the
//!   reconciliation driver and print the rebuilt view as JSON.
//! - Keep `ping` as a linkage check independent from store setup.

mod cli;
mod command;

use clap::Parser;
use cli::{Cli, Command};
use command::{parse_line, Line, HELP};
use log::info;
use sdgs_core::{ControllerConfig, Dashboard, SqliteSnapshotStore};
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if matches!(cli.command, Some(Command::Ping)) {
        println!("sdgs_core ping={}", sdgs_core::ping());
        println!("sdgs_core version={}", sdgs_core::core_version());
        return ExitCode::SUCCESS;
    }

    match run_console(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run_console(cli: &Cli) -> Result<(), String> {
    if let Some(log_dir) = &cli.log_dir {
        sdgs_core::init_logging(cli.effective_log_level(), log_dir)?;
    }

    let config = load_config(cli)?;
    let conn = match &cli.db {
        Some(path) => sdgs_core::db::open_db(path),
        None => sdgs_core::db::open_db_in_memory(),
    }
    .map_err(|err| format!("failed to open store: {err}"))?;
    let store = SqliteSnapshotStore::try_new(&conn).map_err(|err| err.to_string())?;

    let mut session = Dashboard::start(store, config).map_err(|err| err.to_string())?;
    info!(
        "event=console_start module=cli status=ok session_id={}",
        session.state().session_id
    );
    print_json(&json!({ "view": session.render() }))?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|err| format!("failed to read stdin: {err}"))?;
        match parse_line(&line) {
            Ok(Line::Event(event)) => {
                let dispatched = session.dispatch(event);
                let outcome = match &dispatched.outcome {
                    Ok(()) => json!({ "ok": true }),
                    Err(err) => json!({ "ok": false, "code": err.code(), "message": err.to_string() }),
                };
                print_json(&json!({ "outcome": outcome, "view": dispatched.view }))?;
            }
            Ok(Line::Help) => println!("{HELP}"),
            Ok(Line::Quit) => break,
            Ok(Line::Empty) => {}
            Err(message) => print_json(&json!({ "outcome": { "ok": false, "message": message } }))?,
        }
    }

    info!(
        "event=console_stop module=cli status=ok session_id={} records={}",
        session.state().session_id,
        session.cache().len()
    );
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ControllerConfig, String> {
    match &cli.config {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .map_err(|err| format!("failed to read config `{}`: {err}", path.display()))?;
            ControllerConfig::from_json_str(&source).map_err(|err| err.to_string())
        }
        None => Ok(ControllerConfig::default()),
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), String> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value).map_err(|err| err.to_string())?;
    writeln!(stdout).map_err(|err| err.to_string())
}
