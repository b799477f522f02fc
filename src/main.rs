//! allocview - Filterable allocation dashboard for Nomad-style schedulers

mod display;
mod filter;
mod formatting;
mod logging;
mod models;
mod node_names;
mod snapshot;
mod tui;

use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::logging::Verbosity;
use crate::models::{ColumnVisibility, Location, TuiConfig};
use crate::node_names::NodeNameResolver;
use crate::snapshot::SnapshotSource;

#[derive(Parser)]
#[command(name = "allocview")]
#[command(about = "Filterable allocation dashboard for Nomad-style schedulers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON file holding the allocation list
    #[arg(long, global = true, value_name = "FILE", default_value = "allocations.json")]
    allocations: PathBuf,

    /// JSON file holding the node list (client names)
    #[arg(long, global = true, value_name = "FILE")]
    nodes: Option<PathBuf>,

    /// Starting location, e.g. "/allocations?status=running&job=web"
    #[arg(long, global = true, value_name = "PATH")]
    location: Option<String>,

    /// Allocation-id substring; takes precedence over the location's value
    #[arg(long, global = true, value_name = "ID")]
    allocation_id: Option<String>,

    /// Hide the Job column and its filter menu
    #[arg(long, global = true)]
    hide_job_column: bool,

    /// Hide the Client column and its filter menu
    #[arg(long, global = true)]
    hide_client_column: bool,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive dashboard (default)
    #[command(alias = "ui")]
    Tui,

    /// Print the filtered allocation table
    #[command(alias = "ls")]
    List {
        /// Watch mode: refresh every N seconds
        #[arg(short, long, value_name = "SECONDS", default_value = "0")]
        watch: f64,
    },

    /// Print the dashboard links of one allocation
    Links {
        /// Allocation id or unique id prefix
        alloc_id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let tui_mode = matches!(cli.command, None | Some(Commands::Tui));
    logging::init_subscriber(Verbosity::from_flags(cli.verbose, cli.quiet), tui_mode);

    let (mut config, config_warnings) = TuiConfig::load();
    if cli.hide_job_column {
        config.display.show_job_column = false;
    }
    if cli.hide_client_column {
        config.display.show_client_column = false;
    }

    let location = resolve_location(cli.location.as_deref(), &config.display.default_location)?;
    let source = SnapshotSource::new(cli.allocations.clone(), cli.nodes.clone());
    let id_override = cli.allocation_id.clone();

    match cli.command {
        Some(Commands::List { watch }) => {
            let columns = config.display.columns();
            if watch > 0.0 {
                watch_loop(watch, || {
                    handle_list_command(&source, &location, id_override.as_deref(), columns)
                })?;
            } else {
                let output =
                    handle_list_command(&source, &location, id_override.as_deref(), columns)?;
                println!("{}", output);
            }
        }
        Some(Commands::Links { alloc_id }) => {
            let output = handle_links_command(&source, &alloc_id)?;
            print!("{}", output);
        }
        Some(Commands::Tui) | None => {
            tui::run(tui::TuiParams {
                config,
                config_warnings,
                location,
                id_override,
                source,
            })?;
        }
    }

    Ok(())
}

/// `--location` wins over the configured default; both empty means `/allocations`.
fn resolve_location(cli_location: Option<&str>, default_location: &str) -> Result<Location> {
    match cli_location {
        Some(raw) => Location::parse(raw).with_context(|| format!("Invalid --location '{}'", raw)),
        None => Location::parse(default_location)
            .with_context(|| format!("Invalid display.default_location '{}'", default_location)),
    }
}

/// Watch loop that repeatedly executes a command with flicker-free updates
fn watch_loop<F>(interval: f64, command: F) -> Result<()>
where
    F: Fn() -> Result<String>,
{
    // Set up Ctrl+C handler
    let running = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, std::sync::atomic::Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    // Enter alternate screen buffer and hide cursor for clean display
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let cleanup = || -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Show, LeaveAlternateScreen)?;
        Ok(())
    };

    let result = (|| -> Result<()> {
        while running.load(std::sync::atomic::Ordering::SeqCst) {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

            let output = match command() {
                Ok(s) => s,
                Err(e) => format!("Error: {:#}", e),
            };

            let screen_content = format!(
                "{}\n\nLast updated: {} | Refreshing every {}s | Press Ctrl+C to exit",
                output, timestamp, interval
            );

            // Synchronized update (DEC private mode 2026) so the frame lands at once
            write!(stdout, "\x1B[?2026h")?;
            write!(stdout, "\x1B[H{}\x1B[J", screen_content)?;
            write!(stdout, "\x1B[?2026l")?;
            stdout.flush()?;

            thread::sleep(Duration::from_secs_f64(interval));
        }
        Ok(())
    })();

    // Always clean up terminal state
    cleanup()?;

    println!("Watch mode stopped.");

    result
}

fn handle_list_command(
    source: &SnapshotSource,
    location: &Location,
    id_override: Option<&str>,
    columns: ColumnVisibility,
) -> Result<String> {
    let snapshot = source.load()?;
    let query = location.filter_query();
    let filtered = filter::filter_allocations(&snapshot.allocations, &query, id_override);
    let resolver = NodeNameResolver::new();

    Ok(display::format_allocations(
        &filtered,
        snapshot.allocations.len(),
        &snapshot.nodes,
        &resolver,
        columns,
        chrono::Utc::now(),
    ))
}

fn handle_links_command(source: &SnapshotSource, alloc_id: &str) -> Result<String> {
    let snapshot = source.load()?;

    let alloc = match snapshot.allocations.iter().find(|a| a.id == alloc_id) {
        Some(alloc) => alloc,
        None => {
            let mut matches = snapshot
                .allocations
                .iter()
                .filter(|a| a.id.starts_with(alloc_id));
            match (matches.next(), matches.next()) {
                (Some(alloc), None) => alloc,
                (Some(_), Some(_)) => bail!("Allocation id prefix '{}' is ambiguous", alloc_id),
                (None, _) => bail!("No allocation with id '{}'", alloc_id),
            }
        }
    };

    let resolver = NodeNameResolver::new();
    Ok(display::format_links(alloc, &snapshot.nodes, &resolver))
}
