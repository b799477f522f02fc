//! Terminal User Interface for allocview
//!
//! This module provides an interactive, filterable allocation table.
//! It features:
//! - Filters driven by the current location's query, plus a local allocation-id input
//! - A virtualized table sized from the terminal viewport
//! - Dual-channel event architecture (priority input, backpressure-aware data)
//! - Periodic snapshot reloads with graceful degradation on errors

pub mod app;
pub mod event;
pub mod runtime;
pub mod theme;
pub mod ui;
pub mod viewport;

use std::io::{self, IsTerminal, stdout};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use crate::models::{Location, TuiConfig};
use crate::snapshot::SnapshotSource;
use crate::tui::app::App;
use crate::tui::runtime::{
    TuiRuntime, create_channels, run_event_loop, spawn_input_task, spawn_snapshot_loader,
    spawn_tick,
};

/// Terminal capability requirements for TUI mode
#[derive(Debug)]
pub struct TerminalCapabilities {
    pub is_tty: bool,
    pub term_type: String,
    pub supports_alternate_screen: bool,
}

impl TerminalCapabilities {
    /// Detect terminal capabilities
    pub fn detect() -> Self {
        Self::from_parts(stdout().is_terminal(), std::env::var("TERM").unwrap_or_default())
    }

    fn from_parts(is_tty: bool, term_type: String) -> Self {
        // Check for known problematic terminals
        let supports_alternate_screen = !matches!(term_type.as_str(), "dumb" | "" | "unknown");

        Self {
            is_tty,
            term_type,
            supports_alternate_screen,
        }
    }

    /// Check if terminal is suitable for TUI mode
    pub fn is_suitable(&self) -> bool {
        self.is_tty && self.supports_alternate_screen
    }

    /// Get error message for unsuitable terminal
    pub fn error_message(&self) -> String {
        if !self.is_tty {
            "TUI mode requires an interactive terminal (stdout is not a TTY).\n\
             Hint: Use 'allocview list' instead."
                .to_string()
        } else if !self.supports_alternate_screen {
            format!(
                "Terminal type '{}' may not support TUI mode.\n\
                 Hint: Set TERM to a supported value (e.g., xterm-256color) or use 'allocview list'.",
                if self.term_type.is_empty() {
                    "(unset)"
                } else {
                    &self.term_type
                }
            )
        } else {
            "Unknown terminal capability issue.".to_string()
        }
    }
}

/// Everything the dashboard needs to start
pub struct TuiParams {
    pub config: TuiConfig,
    pub config_warnings: Vec<String>,
    pub location: Location,
    /// Initial allocation-id override from the command line
    pub id_override: Option<String>,
    pub source: SnapshotSource,
}

/// Run the TUI application
pub async fn run_tui(params: TuiParams) -> Result<()> {
    // Check terminal capabilities before attempting TUI mode
    let capabilities = TerminalCapabilities::detect();
    if !capabilities.is_suitable() {
        bail!("{}", capabilities.error_message());
    }

    let TuiParams {
        config,
        config_warnings,
        location,
        id_override,
        source,
    } = params;
    let interval = Duration::from_secs(config.refresh.snapshot_interval);

    // Setup terminal
    let mut terminal = setup_terminal().context("Failed to initialize terminal")?;

    let mut app = App::new(config, location, config_warnings);
    app.id_override = id_override;
    app.mount();

    // Create dual channels
    let (input_tx, input_rx, data_tx, data_rx) = create_channels();

    let mut runtime = TuiRuntime::new();
    runtime.track(spawn_input_task(input_tx, runtime.cancel_token()));
    runtime.track(spawn_snapshot_loader(
        data_tx.clone(),
        runtime.cancel_token(),
        source,
        interval,
    ));
    runtime.track(spawn_tick(data_tx, runtime.cancel_token()));

    tracing::info!(location = %app.location, "dashboard started");

    // Run the main event loop
    let result = run_event_loop(app, input_rx, data_rx, |app| {
        terminal.draw(|frame| ui::render(app, frame))?;
        Ok(())
    })
    .await;

    // Shutdown background tasks
    runtime.shutdown().await;

    // Restore terminal
    restore_terminal(&mut terminal)?;

    let mut app = result?;
    app.unmount();
    tracing::info!("dashboard stopped");
    Ok(())
}

/// Setup the terminal for TUI mode
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI with the tokio runtime (entry point from main)
pub fn run(params: TuiParams) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_tui(params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        assert!(TerminalCapabilities::from_parts(true, "xterm-256color".to_string()).is_suitable());

        let piped = TerminalCapabilities::from_parts(false, "xterm".to_string());
        assert!(!piped.is_suitable());
        assert!(piped.error_message().contains("not a TTY"));

        let dumb = TerminalCapabilities::from_parts(true, "dumb".to_string());
        assert!(!dumb.is_suitable());
        assert!(dumb.error_message().contains("'dumb'"));
    }
}
