//! Async runtime and task management for the TUI
//!
//! This module implements the dual-channel event-driven architecture:
//! - Input channel (priority): User input events that are never dropped
//! - Data channel: Snapshot reloads and ticks that may be dropped under backpressure
//!
//! The main loop uses `tokio::select!` with bias toward the input channel
//! to prevent input starvation under heavy data update loads.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::snapshot::{Snapshot, SnapshotSource};
use crate::tui::app::App;
use crate::tui::event::{DataEvent, EventResult, InputEvent};

/// Channel capacities
const INPUT_CHANNEL_CAPACITY: usize = 16;
const DATA_CHANNEL_CAPACITY: usize = 32;

/// Ages in the table have one-second resolution
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Forward the outcome of one blocking snapshot load to the data channel.
fn handle_load_result(
    result: Result<Result<Snapshot>, tokio::task::JoinError>,
    tx: &mpsc::Sender<DataEvent>,
) {
    let event = match result {
        Ok(Ok(snapshot)) => DataEvent::SnapshotLoaded(snapshot),
        Ok(Err(e)) => {
            tracing::warn!("snapshot reload failed: {:#}", e);
            DataEvent::FetchError {
                error: format!("{:#}", e),
            }
        }
        Err(e) => DataEvent::FetchError {
            error: format!("Task join error: {}", e),
        },
    };

    if tx.try_send(event).is_err() {
        tracing::debug!("Dropped snapshot event (channel full)");
    }
}

/// TUI runtime managing all background tasks
pub struct TuiRuntime {
    cancel_token: CancellationToken,
    task_handles: Vec<JoinHandle<()>>,
}

impl Default for TuiRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiRuntime {
    /// Create a new TUI runtime
    pub fn new() -> Self {
        Self {
            cancel_token: CancellationToken::new(),
            task_handles: Vec::new(),
        }
    }

    /// Get a clone of the cancellation token for spawning tasks
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Add a task handle to track
    pub fn track(&mut self, handle: JoinHandle<()>) {
        self.task_handles.push(handle);
    }

    /// Signal shutdown and wait for tasks to complete
    pub async fn shutdown(self) {
        // Signal all tasks to stop
        self.cancel_token.cancel();

        // Wait for graceful shutdown with timeout
        let shutdown = async {
            for handle in self.task_handles {
                let _ = handle.await;
            }
        };

        tokio::select! {
            _ = shutdown => {}
            _ = tokio::time::sleep(Duration::from_secs(2)) => {
                tracing::warn!("background tasks did not stop in time");
            }
        }
    }
}

/// Spawn the input event reader task
pub fn spawn_input_task(tx: mpsc::Sender<InputEvent>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = EventStream::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                maybe_event = reader.next() => {
                    match maybe_event {
                        Some(Ok(event)) => {
                            let input_event = match event {
                                Event::Key(key) => Some(InputEvent::Key(key)),
                                Event::Mouse(mouse) => Some(InputEvent::Mouse(mouse)),
                                Event::Resize(w, h) => Some(InputEvent::Resize(w, h)),
                                _ => None,
                            };

                            if let Some(evt) = input_event {
                                // Input channel should never be full, but handle it gracefully
                                if tx.send(evt).await.is_err() {
                                    break; // Receiver dropped
                                }
                            }
                        }
                        Some(Err(e)) => {
                            // Check for fatal terminal errors that should trigger shutdown
                            let is_fatal = matches!(
                                e.kind(),
                                std::io::ErrorKind::BrokenPipe
                                    | std::io::ErrorKind::ConnectionReset
                                    | std::io::ErrorKind::UnexpectedEof
                            );

                            if is_fatal {
                                tracing::info!("Terminal disconnected: {:?}", e);
                                break;
                            } else {
                                tracing::warn!("Terminal event read error: {:?}", e);
                            }
                        }
                        None => break, // Stream ended
                    }
                }
            }
        }
    })
}

/// Spawn the snapshot loader: load immediately, then every `interval`.
pub fn spawn_snapshot_loader(
    tx: mpsc::Sender<DataEvent>,
    cancel: CancellationToken,
    source: SnapshotSource,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let source_clone = source.clone();
            let result = tokio::task::spawn_blocking(move || source_clone.load()).await;
            handle_load_result(result, &tx);

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
    })
}

/// Spawn the once-per-second tick task
pub fn spawn_tick(tx: mpsc::Sender<DataEvent>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let _ = tx.try_send(DataEvent::Tick);
                }
            }
        }
    })
}

/// Run the main TUI event loop. Returns the app so the caller can unmount it.
pub async fn run_event_loop(
    mut app: App,
    mut input_rx: mpsc::Receiver<InputEvent>,
    mut data_rx: mpsc::Receiver<DataEvent>,
    mut render_fn: impl FnMut(&App) -> Result<()>,
) -> Result<App> {
    let mut needs_render = true;

    loop {
        if needs_render {
            render_fn(&app)?;
            needs_render = false;
        }

        if !app.running {
            break;
        }

        tokio::select! {
            // Bias toward input channel to prevent input starvation
            biased;

            Some(input) = input_rx.recv() => {
                match app.handle_input(input) {
                    EventResult::Continue => needs_render = true,
                    EventResult::Unchanged => {}
                    EventResult::Quit => break,
                }
            }

            Some(data) = data_rx.recv() => {
                match app.handle_data(data) {
                    EventResult::Continue => needs_render = true,
                    EventResult::Unchanged => {}
                    EventResult::Quit => break,
                }
            }

            else => break,
        }
    }

    Ok(app)
}

/// Create the dual channels for the TUI
pub fn create_channels() -> (
    mpsc::Sender<InputEvent>,
    mpsc::Receiver<InputEvent>,
    mpsc::Sender<DataEvent>,
    mpsc::Receiver<DataEvent>,
) {
    let (input_tx, input_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
    let (data_tx, data_rx) = mpsc::channel(DATA_CHANNEL_CAPACITY);
    (input_tx, input_rx, data_tx, data_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, TuiConfig};
    use crate::tui::viewport::{TerminalWindow, ViewportDimensions};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn test_app() -> App {
        let mut app = App::new(TuiConfig::default(), Location::default(), Vec::new())
            .with_window(TerminalWindow::with_size(ViewportDimensions::new(80, 24)));
        app.mount();
        app
    }

    #[tokio::test]
    async fn test_event_loop_input_wins_and_quits() {
        let (input_tx, input_rx, data_tx, data_rx) = create_channels();

        data_tx
            .send(DataEvent::SnapshotLoaded(Snapshot::default()))
            .await
            .unwrap();
        input_tx
            .send(InputEvent::Key(KeyEvent::new(
                KeyCode::Char('q'),
                KeyModifiers::NONE,
            )))
            .await
            .unwrap();

        let mut renders = 0;
        let app = run_event_loop(test_app(), input_rx, data_rx, |_| {
            renders += 1;
            Ok(())
        })
        .await
        .unwrap();

        assert!(!app.running);
        assert!(renders >= 1);
    }

    #[tokio::test]
    async fn test_event_loop_forwards_resize() {
        let (input_tx, input_rx, _data_tx, data_rx) = create_channels();
        input_tx.send(InputEvent::Resize(200, 50)).await.unwrap();
        input_tx
            .send(InputEvent::Key(KeyEvent::new(
                KeyCode::Char('q'),
                KeyModifiers::NONE,
            )))
            .await
            .unwrap();

        let app = run_event_loop(test_app(), input_rx, data_rx, |_| Ok(()))
            .await
            .unwrap();
        assert_eq!(app.viewport.dimensions(), ViewportDimensions::new(200, 50));
    }

    #[tokio::test]
    async fn test_loader_reports_missing_file() {
        let (_input_tx, _input_rx, data_tx, mut data_rx) = create_channels();
        let cancel = CancellationToken::new();
        let dir = tempfile::tempdir().unwrap();
        let source = SnapshotSource::new(dir.path().join("allocations.json"), None);
        let handle =
            spawn_snapshot_loader(data_tx, cancel.clone(), source, Duration::from_secs(60));

        match data_rx.recv().await {
            Some(DataEvent::FetchError { error }) => {
                assert!(error.contains("Failed to load allocations"))
            }
            other => panic!("unexpected event: {:?}", other),
        }

        cancel.cancel();
        handle.await.unwrap();
    }
}
