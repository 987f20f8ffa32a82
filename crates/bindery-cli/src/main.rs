mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::Path;
use std::process;

use bindery_core::ImportEngine;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info};

const DB_PATH: &str = "bindery.db";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match bindery_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Import { json }) => {
            if let Err(err) = run_import(&config, json) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Runs { limit, json }) => {
            if let Err(err) = run_list_runs(limit, json) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::LoadCatalog { path }) => {
            if let Err(err) = run_load_catalog(&path) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        Some(Commands::TruncateDb) => {
            match prompt_confirm(
                "Are you SURE you want to COMPLETELY DELETE the Database?",
                Some(false),
            ) {
                Ok(true) => match bindery_core::storage::Database::open(DB_PATH) {
                    Ok(db) => {
                        if let Err(e) = db.truncate_all() {
                            error!("Error truncating database: {}", e);
                        } else {
                            println!("All tables truncated");
                        }
                    }
                    Err(e) => error!("Error opening database: {}", e),
                },
                _ => {
                    process::exit(0);
                }
            }
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_import(
    config: &bindery_core::AppConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = ImportEngine::new(config.clone()).with_db_path(DB_PATH);
    let reporter = CliReporter::new();
    let summary = engine.run(&reporter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!();
    info!(
        "Scan: {}, Match: {}, Attach: {}",
        format!("{:.2}s", summary.scan_duration.as_secs_f64()).green(),
        format!("{:.2}s", summary.match_duration.as_secs_f64()).green(),
        format!("{:.2}s", summary.attach_duration.as_secs_f64()).green(),
    );
    info!(
        "{} files discovered, {} matched ({} already attached), {} attachments created",
        format!("{}", summary.files_discovered).cyan(),
        format!("{}", summary.files_matched).green(),
        format!("{}", summary.already_attached).cyan(),
        format!("{}", summary.attachments_created).green(),
    );
    if summary.files_unmatched > 0 {
        info!("{} files unmatched:", format!("{}", summary.files_unmatched).red());
        for entry in &summary.unmatched {
            match &entry.detail {
                Some(detail) => println!(
                    "  {} [{}] {}",
                    entry.file_name,
                    entry.reason.as_str().yellow(),
                    detail
                ),
                None => println!("  {} [{}]", entry.file_name, entry.reason.as_str().yellow()),
            }
        }
        if summary.unmatched.len() < summary.files_unmatched {
            println!(
                "  ... and {} more (run `bindery runs` for the full list)",
                summary.files_unmatched - summary.unmatched.len()
            );
        }
    }

    Ok(())
}

fn run_list_runs(limit: i64, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let db = bindery_core::storage::Database::open(DB_PATH)?;
    let runs = db.list_import_runs(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("No import runs recorded");
        return Ok(());
    }
    for run in &runs {
        println!(
            "#{} {} [{}] {} — {} discovered, {} matched, {} unmatched",
            run.id,
            run.started_at,
            match run.status.as_str() {
                "completed" => run.status.as_str().green(),
                "cancelled" => run.status.as_str().yellow(),
                _ => run.status.as_str().red(),
            },
            run.root_path,
            run.files_discovered,
            run.files_matched,
            run.files_unmatched,
        );
    }

    Ok(())
}

fn run_load_catalog(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = bindery_core::storage::Database::open(DB_PATH)?;
    let stats = bindery_core::catalog::load_catalog_csv(&db, Path::new(path))?;
    println!(
        "{} records created, {} duplicates skipped",
        format!("{}", stats.records_created).green(),
        format!("{}", stats.duplicates_skipped).yellow(),
    );
    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
