mod cli;
mod logging;
mod reporter;

use std::path::Path;
use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, RankArg};
use colored::*;
use dotenv::dotenv;
use reporter::CliReporter;
use tab_triage::analysis::estimate::rank_estimates;
use tab_triage::analysis::idle::idle_tab_ids;
use tab_triage::export::write_estimates_csv_file;
use tab_triage::snapshot::Snapshot;
use tab_triage::{AppConfig, Group, ScanCache, ScanResult};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match tab_triage::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Scan {
            snapshot,
            json,
            csv,
        }) => {
            if let Err(err) = run_scan(&config, &snapshot, json, csv.as_deref()).await {
                error!("Error: {:#}", err);
            }
        }
        Some(Commands::Rank {
            snapshot,
            by,
            limit,
        }) => {
            if let Err(err) = run_rank(&config, &snapshot, by, limit).await {
                error!("Error: {:#}", err);
            }
        }
        Some(Commands::Idle { snapshot, ratio }) => {
            if let Err(err) = run_idle(&config, &snapshot, ratio) {
                error!("Error: {:#}", err);
            }
        }
        Some(Commands::PrintConfig) => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

async fn scan_snapshot(
    config: &AppConfig,
    path: &Path,
    reporter: &CliReporter,
) -> anyhow::Result<(Snapshot, ScanResult)> {
    let snapshot = Snapshot::load(path)
        .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
    let engine = snapshot.engine(config.clone());
    let mut cache = ScanCache::new(&config.cache);
    let result = engine.scan(&snapshot.tabs, &mut cache, reporter).await;
    Ok((snapshot, result))
}

async fn run_scan(
    config: &AppConfig,
    path: &Path,
    json: bool,
    csv: Option<&Path>,
) -> anyhow::Result<()> {
    let reporter = CliReporter::new();
    let (snapshot, result) = scan_snapshot(config, path, &reporter).await?;

    if let Some(csv_path) = csv {
        write_estimates_csv_file(csv_path, &result)
            .with_context(|| format!("Failed to write {}", csv_path.display()))?;
        info!("Estimates written to {}", csv_path.display());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    info!(
        "Inspect: {}, Analyze: {}, Sample: {}",
        format!("{:.2}s", result.timings.summary_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.timings.analysis_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.timings.resource_duration.as_secs_f64()).green(),
    );
    info!(
        "{} tabs, {} duplicate groups, {} similar groups",
        format!("{}", result.tabs.len()).cyan(),
        format!("{}", result.groups.duplicates.len()).red(),
        format!("{}", result.groups.similar.len()).red(),
    );

    for group in result.groups.duplicates.iter().chain(&result.groups.similar) {
        print_group(&snapshot, group);
    }

    if !result.resources.ok {
        info!(
            "Process sampling unavailable ({}), ranking uses estimates",
            result.resources.detail.as_deref().unwrap_or("unknown").yellow()
        );
    }

    Ok(())
}

fn print_group(snapshot: &Snapshot, group: &Group) {
    println!(
        "{} {}",
        group.id.bold(),
        format!("({:?}, {:?})", group.kind, group.reason).dimmed()
    );
    for id in &group.item_ids {
        if let Some(tab) = snapshot.tabs.iter().find(|t| t.id == *id) {
            println!("  {:>6}  {}  {}", id, tab.title, tab.url.dimmed());
        }
    }
}

async fn run_rank(
    config: &AppConfig,
    path: &Path,
    by: RankArg,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let reporter = CliReporter::new();
    let (snapshot, result) = scan_snapshot(config, path, &reporter).await?;

    let ranked = rank_estimates(&result.estimates, by.into());
    let shown = limit.unwrap_or(ranked.len());

    println!();
    println!(
        "{:>6}  {:>7}  {:>9}  {:>6}  {}",
        "tab", "score", "memoryMB", "cpu%", "title"
    );
    for estimate in ranked.into_iter().take(shown) {
        let title = snapshot
            .tabs
            .iter()
            .find(|t| t.id == estimate.item_id)
            .map(|t| t.title.as_str())
            .unwrap_or("");
        println!(
            "{:>6}  {:>7.1}  {:>9.1}  {:>6.1}  {}",
            estimate.item_id,
            estimate.score,
            estimate.memory_mb,
            estimate.cpu_percent,
            title
        );
    }

    Ok(())
}

fn run_idle(config: &AppConfig, path: &Path, ratio: Option<f64>) -> anyhow::Result<()> {
    let snapshot = Snapshot::load(path)
        .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
    let ratio = ratio.unwrap_or(config.idle_ratio);
    let idle = idle_tab_ids(&snapshot.tabs, ratio);

    info!(
        "{} of {} tabs suggested for closing",
        format!("{}", idle.len()).yellow(),
        snapshot.tabs.len()
    );
    for id in idle {
        if let Some(tab) = snapshot.tabs.iter().find(|t| t.id == id) {
            let seen = tab
                .last_accessed_at()
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "never".to_string());
            println!("  {:>6}  {}  {}  {}", id, seen.dimmed(), tab.title, tab.url.dimmed());
        }
    }

    Ok(())
}
