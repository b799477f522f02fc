//! Application state and core logic for the TUI
//!
//! This module contains the main App struct and all associated state management.
//! The architecture follows a TEA-inspired pattern with mutable state and method-based updates.

mod panel;
mod state;

pub use panel::{FilterControlPanel, MenuField};
pub use state::{ClipboardFeedback, FeedbackState, ListState, ModalState};

use std::time::Instant;

use crate::filter::filter_allocations;
use crate::models::{
    Allocation, ColumnVisibility, LinkTarget, Location, NavigationRequest, Node, QueryKey,
    TuiConfig,
};
use crate::node_names::NodeNameResolver;
use crate::snapshot::Snapshot;
use crate::tui::event::{DataEvent, EventResult, InputEvent, KeyAction};
use crate::tui::viewport::{TableSize, TerminalWindow, ViewportTracker};

/// How many previous locations `Backspace` can return to
const HISTORY_LIMIT: usize = 50;

/// Rows of the table block not used by data rows (two borders and the header)
const TABLE_CHROME_ROWS: u16 = 3;

/// Main application state
pub struct App {
    // Lifecycle
    pub running: bool,

    // Navigation
    pub location: Location,
    history: Vec<Location>,

    // Data
    pub allocations: Vec<Allocation>,
    pub nodes: Vec<Node>,
    pub last_loaded: Option<Instant>,

    /// Allocation-id text typed into the panel; wins over the query value when set
    pub id_override: Option<String>,

    pub node_names: NodeNameResolver,

    // Viewport
    window: TerminalWindow,
    pub viewport: ViewportTracker,

    pub list_state: ListState,
    pub modal: ModalState,
    pub feedback: FeedbackState,

    // Configuration
    pub config: TuiConfig,
    pub columns: ColumnVisibility,
}

impl App {
    pub fn new(config: TuiConfig, location: Location, config_warnings: Vec<String>) -> Self {
        let columns = config.display.columns();
        Self {
            running: true,
            location,
            history: Vec::new(),
            allocations: Vec::new(),
            nodes: Vec::new(),
            last_loaded: None,
            id_override: None,
            node_names: NodeNameResolver::new(),
            window: TerminalWindow::new(),
            viewport: ViewportTracker::new(),
            list_state: ListState::default(),
            modal: ModalState::None,
            feedback: FeedbackState::new(config_warnings),
            config,
            columns,
        }
    }

    /// Use a specific window host instead of the live terminal
    #[cfg(test)]
    pub fn with_window(mut self, window: TerminalWindow) -> Self {
        self.window = window;
        self
    }

    /// Start tracking the window size.
    pub fn mount(&mut self) {
        self.viewport.mount(&mut self.window);
    }

    /// Stop tracking the window size, releasing the resize listener.
    pub fn unmount(&mut self) {
        self.viewport.unmount(&mut self.window);
    }

    #[cfg(test)]
    pub fn resize_listener_count(&self) -> usize {
        self.window.listener_count()
    }

    // ------------------------------------------------------------------------
    // Derived data
    // ------------------------------------------------------------------------

    /// Allocations passing the active filters, recomputed on every call.
    pub fn filtered(&self) -> Vec<&Allocation> {
        let query = self.location.filter_query();
        filter_allocations(&self.allocations, &query, self.id_override.as_deref())
    }

    pub fn panel(&self) -> FilterControlPanel<'_> {
        FilterControlPanel {
            location: &self.location,
            allocations: &self.allocations,
            nodes: &self.nodes,
            resolver: &self.node_names,
            columns: self.columns,
        }
    }

    /// Text shown in the allocation-id input.
    pub fn id_input_text(&self) -> &str {
        self.id_override
            .as_deref()
            .or_else(|| self.location.param(QueryKey::AllocationId))
            .unwrap_or("")
    }

    pub fn selected_allocation(&self) -> Option<&Allocation> {
        self.filtered().get(self.list_state.selected).copied()
    }

    pub fn table_size(&self) -> TableSize {
        self.viewport.table_size(&self.config.layout)
    }

    /// Data rows that fit in the table block.
    pub fn visible_rows(&self) -> usize {
        self.table_size().height.saturating_sub(TABLE_CHROME_ROWS) as usize
    }

    pub fn is_loading(&self) -> bool {
        self.last_loaded.is_none()
    }

    pub fn current_error(&self) -> Option<&str> {
        self.feedback.current_error()
    }

    pub fn current_clipboard_feedback(&self) -> Option<&ClipboardFeedback> {
        self.feedback.current_clipboard_feedback()
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Replace the current location, remembering the previous one.
    pub fn navigate(&mut self, request: NavigationRequest) {
        let next = request.into_location();
        if next == self.location {
            return;
        }
        tracing::debug!(from = %self.location, to = %next, "navigate");
        let previous = std::mem::replace(&mut self.location, next);
        self.history.push(previous);
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
        self.list_state.move_to_top();
    }

    /// Return to the previous location. Returns false if there is none.
    pub fn navigate_back(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                tracing::debug!(from = %self.location, to = %previous, "navigate back");
                self.location = previous;
                self.list_state.move_to_top();
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Handle an input event
    pub fn handle_input(&mut self, event: InputEvent) -> EventResult {
        match event {
            InputEvent::Key(key_event) => {
                let action = KeyAction::from_key_event(key_event, self.modal.is_text_input());
                self.handle_action(action)
            }
            InputEvent::Resize(width, height) => {
                self.window.dispatch_resize(width, height);
                self.list_state.visible_count = self.visible_rows();
                EventResult::Continue
            }
            InputEvent::Mouse(mouse_event) => {
                let action = KeyAction::from_mouse_event(mouse_event);
                self.handle_action(action)
            }
        }
    }

    /// Handle a key action
    fn handle_action(&mut self, action: KeyAction) -> EventResult {
        // Help overlay takes priority
        if matches!(self.modal, ModalState::Help) {
            match action {
                KeyAction::Escape | KeyAction::ShowHelp | KeyAction::Quit => {
                    self.modal = ModalState::None;
                    return EventResult::Continue;
                }
                _ => return EventResult::Unchanged,
            }
        }

        match self.modal {
            ModalState::EditAllocationId => return self.handle_id_input_action(action),
            ModalState::Menu { .. } => return self.handle_menu_action(action),
            _ => {}
        }

        if let Some(result) = self.handle_navigation(&action) {
            return result;
        }

        match action {
            KeyAction::Quit => {
                self.running = false;
                EventResult::Quit
            }

            // Filters
            KeyAction::EditAllocationId => {
                self.modal = ModalState::EditAllocationId;
                EventResult::Continue
            }
            KeyAction::OpenStatusMenu => self.open_menu(MenuField::Status),
            KeyAction::OpenClientMenu => self.open_menu(MenuField::Client),
            KeyAction::OpenJobMenu => self.open_menu(MenuField::Job),
            KeyAction::ClearFilters => {
                self.id_override = None;
                let request = self.location.without_filters();
                self.navigate(request);
                EventResult::Continue
            }
            KeyAction::NavigateBack => {
                if self.navigate_back() {
                    EventResult::Continue
                } else {
                    EventResult::Unchanged
                }
            }

            // Links
            KeyAction::YankAllocationLink | KeyAction::Select => {
                self.yank_link(|a| {
                    Some(LinkTarget::Allocation {
                        alloc_id: a.id.clone(),
                    })
                });
                EventResult::Continue
            }
            KeyAction::YankLogsLink => {
                self.yank_link(|a| {
                    Some(LinkTarget::AllocationLogs {
                        alloc_id: a.id.clone(),
                    })
                });
                EventResult::Continue
            }
            KeyAction::YankNodeLink => {
                self.yank_link(|a| {
                    a.node_id.as_ref().map(|node_id| LinkTarget::Node {
                        node_id: node_id.clone(),
                    })
                });
                EventResult::Continue
            }

            KeyAction::ClearNodeCache => {
                let entries = self.node_names.len();
                self.node_names.clear();
                self.feedback.set_clipboard_feedback(ClipboardFeedback::success(format!(
                    "Cleared {} cached node name(s)",
                    entries
                )));
                EventResult::Continue
            }

            KeyAction::ShowHelp => {
                self.modal = ModalState::Help;
                EventResult::Continue
            }

            _ => EventResult::Unchanged,
        }
    }

    /// Handle navigation actions (returns Some if action was handled)
    fn handle_navigation(&mut self, action: &KeyAction) -> Option<EventResult> {
        let len = self.filtered().len();
        self.list_state.visible_count = self.visible_rows();
        match action {
            KeyAction::MoveUp | KeyAction::MouseScrollUp => self.list_state.move_up(len),
            KeyAction::MoveDown | KeyAction::MouseScrollDown => self.list_state.move_down(len),
            KeyAction::MoveToTop => self.list_state.move_to_top(),
            KeyAction::MoveToBottom => self.list_state.move_to_bottom(len),
            KeyAction::PageUp => self.list_state.page_up(len),
            KeyAction::PageDown => self.list_state.page_down(len),
            _ => return None,
        }
        Some(EventResult::Continue)
    }

    fn open_menu(&mut self, field: MenuField) -> EventResult {
        let panel = self.panel();
        if !panel.is_visible(field) {
            return EventResult::Unchanged;
        }
        let selected = panel.active_index(field);
        self.modal = ModalState::Menu { field, selected };
        EventResult::Continue
    }

    fn handle_menu_action(&mut self, action: KeyAction) -> EventResult {
        let Some((field, selected)) = self.modal.open_menu() else {
            return EventResult::Unchanged;
        };
        let options = self.panel().options(field);

        match action {
            KeyAction::Escape => {
                self.modal = ModalState::None;
                EventResult::Continue
            }
            KeyAction::Quit => {
                self.running = false;
                EventResult::Quit
            }
            KeyAction::MoveUp | KeyAction::MouseScrollUp => {
                self.modal = ModalState::Menu {
                    field,
                    selected: selected.saturating_sub(1),
                };
                EventResult::Continue
            }
            KeyAction::MoveDown | KeyAction::MouseScrollDown => {
                let last = options.len().saturating_sub(1);
                self.modal = ModalState::Menu {
                    field,
                    selected: (selected + 1).min(last),
                };
                EventResult::Continue
            }
            KeyAction::MoveToTop => {
                self.modal = ModalState::Menu { field, selected: 0 };
                EventResult::Continue
            }
            KeyAction::MoveToBottom => {
                self.modal = ModalState::Menu {
                    field,
                    selected: options.len().saturating_sub(1),
                };
                EventResult::Continue
            }
            KeyAction::Select => {
                self.modal = ModalState::None;
                if let Some(option) = options.into_iter().nth(selected) {
                    self.navigate(option.request);
                }
                EventResult::Continue
            }
            _ => EventResult::Unchanged,
        }
    }

    fn handle_id_input_action(&mut self, action: KeyAction) -> EventResult {
        match action {
            KeyAction::Escape | KeyAction::Select => {
                // Leave the input; the typed text keeps filtering
                self.modal = ModalState::None;
                EventResult::Continue
            }
            KeyAction::Quit => {
                self.running = false;
                EventResult::Quit
            }
            KeyAction::InputClear => {
                self.set_id_override(String::new());
                EventResult::Continue
            }
            KeyAction::InputBackspace => {
                let mut text = self.id_input_text().to_string();
                text.pop();
                self.set_id_override(text);
                EventResult::Continue
            }
            KeyAction::InputChar(c) => {
                let mut text = self.id_input_text().to_string();
                text.push(c);
                self.set_id_override(text);
                EventResult::Continue
            }
            _ => EventResult::Unchanged,
        }
    }

    /// Every keystroke updates the override; the location is left alone.
    fn set_id_override(&mut self, text: String) {
        self.id_override = Some(text);
        let len = self.filtered().len();
        self.list_state.clamp(len);
    }

    /// Handle a data event
    pub fn handle_data(&mut self, event: DataEvent) -> EventResult {
        match event {
            DataEvent::SnapshotLoaded(snapshot) => {
                self.apply_snapshot(snapshot);
                EventResult::Continue
            }
            DataEvent::FetchError { error } => {
                self.feedback.set_error(error);
                EventResult::Continue
            }
            // Ages and toasts are time-based
            DataEvent::Tick => EventResult::Continue,
        }
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        let Snapshot { allocations, nodes } = snapshot;
        // Value under the menu cursor, so it survives reordered options
        let highlighted = self.modal.open_menu().map(|(field, selected)| {
            let value = self
                .panel()
                .options(field)
                .into_iter()
                .nth(selected)
                .and_then(|opt| opt.value);
            (field, value)
        });

        if nodes != self.nodes {
            // Names cached from the previous node list may be stale
            self.node_names.clear();
            self.nodes = nodes;
        }
        self.allocations = allocations;
        self.last_loaded = Some(Instant::now());

        if let Some((field, value)) = highlighted {
            self.reanchor_menu(field, value);
        }

        let len = self.filtered().len();
        self.list_state.clamp(len);
        tracing::info!(
            allocations = self.allocations.len(),
            nodes = self.nodes.len(),
            shown = len,
            "snapshot applied"
        );
    }

    /// Point the open menu back at `value`, or at the active option if it vanished.
    fn reanchor_menu(&mut self, field: MenuField, value: Option<String>) {
        let panel = self.panel();
        let options = panel.options(field);
        let selected = options
            .iter()
            .position(|opt| opt.value == value)
            .unwrap_or_else(|| panel.active_index(field))
            .min(options.len().saturating_sub(1));
        self.modal = ModalState::Menu { field, selected };
    }

    // ------------------------------------------------------------------------
    // Clipboard
    // ------------------------------------------------------------------------

    fn yank_link<F>(&mut self, target: F)
    where
        F: FnOnce(&Allocation) -> Option<LinkTarget>,
    {
        let Some(alloc) = self.selected_allocation() else {
            return;
        };
        let short_id = alloc.short_id().to_string();
        let Some(target) = target(alloc) else {
            self.feedback.set_clipboard_feedback(ClipboardFeedback::failure(format!(
                "Allocation {} is not placed on a client",
                short_id
            )));
            return;
        };

        let link = target.route().to_string();
        let feedback = if self.copy_to_clipboard(&link) {
            ClipboardFeedback::success(format!("Copied {} link: {}", target.kind(), link))
        } else {
            ClipboardFeedback::failure("Failed to copy (no clipboard)".to_string())
        };
        self.feedback.set_clipboard_feedback(feedback);
    }

    /// Attempt to copy text to the system clipboard
    fn copy_to_clipboard(&self, text: &str) -> bool {
        if !self.config.behavior.copy_to_clipboard {
            return false;
        }
        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("clipboard unavailable: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClientStatus;
    use crate::tui::viewport::ViewportDimensions;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn alloc(id: &str, job: &str, status: &str, node: Option<&str>) -> Allocation {
        Allocation {
            id: id.to_string(),
            job_id: job.to_string(),
            task_group: "g".to_string(),
            name: format!("{}.g[0]", job),
            node_id: node.map(str::to_string),
            client_status: ClientStatus::from(status.to_string()),
            create_time: 0,
        }
    }

    fn node(id: &str, name: &str) -> Node {
        Node {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn test_app(location: &str) -> App {
        let mut config = TuiConfig::default();
        config.behavior.copy_to_clipboard = false;
        let mut app = App::new(config, Location::parse(location).unwrap(), Vec::new())
            .with_window(TerminalWindow::with_size(ViewportDimensions::new(100, 30)));
        app.mount();
        app.handle_data(DataEvent::SnapshotLoaded(Snapshot {
            allocations: vec![
                alloc("a1", "j1", "running", Some("n1")),
                alloc("a2", "j1", "failed", Some("n2")),
                alloc("b3", "j2", "running", None),
            ],
            nodes: vec![node("n1", "worker-1"), node("n2", "worker-2")],
        }));
        app
    }

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ids(app: &App) -> Vec<String> {
        app.filtered().iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn test_filters_follow_location() {
        let app = test_app("/allocations?status=running");
        assert_eq!(ids(&app), vec!["a1", "b3"]);
        assert!(!app.is_loading());
    }

    #[test]
    fn test_status_menu_navigates() {
        let mut app = test_app("/allocations?job=j1");
        app.handle_input(key(KeyCode::Char('s')));
        assert_eq!(
            app.modal,
            ModalState::Menu {
                field: MenuField::Status,
                selected: 0
            }
        );

        // "- Any -", Running, Complete, Pending, Lost, Failed
        for _ in 0..5 {
            app.handle_input(key(KeyCode::Down));
        }
        app.handle_input(key(KeyCode::Enter));

        assert_eq!(app.modal, ModalState::None);
        assert_eq!(app.location.to_string(), "/allocations?job=j1&status=failed");
        assert_eq!(ids(&app), vec!["a2"]);

        assert!(app.navigate_back());
        assert_eq!(app.location.to_string(), "/allocations?job=j1");
    }

    #[test]
    fn test_open_menu_keeps_highlighted_job_across_reload() {
        let mut app = test_app("/allocations");
        app.handle_input(key(KeyCode::Char('J')));
        // "- Any -", j1, j2
        app.handle_input(key(KeyCode::Down));
        app.handle_input(key(KeyCode::Down));

        app.handle_data(DataEvent::SnapshotLoaded(Snapshot {
            allocations: vec![
                alloc("b3", "j2", "running", None),
                alloc("c4", "j3", "running", Some("n1")),
                alloc("a1", "j1", "running", Some("n1")),
            ],
            nodes: app.nodes.clone(),
        }));
        // Options are now "- Any -", j2, j3, j1
        assert_eq!(
            app.modal,
            ModalState::Menu {
                field: MenuField::Job,
                selected: 1
            }
        );

        app.handle_input(key(KeyCode::Enter));
        assert_eq!(app.location.to_string(), "/allocations?job=j2");
        assert_eq!(ids(&app), vec!["b3"]);
    }

    #[test]
    fn test_open_menu_falls_back_when_highlighted_job_vanishes() {
        let mut app = test_app("/allocations?job=j1");
        app.handle_input(key(KeyCode::Char('J')));
        app.handle_input(key(KeyCode::Down));

        app.handle_data(DataEvent::SnapshotLoaded(Snapshot {
            allocations: vec![alloc("a1", "j1", "running", Some("n1"))],
            nodes: app.nodes.clone(),
        }));
        // j2 is gone; the cursor returns to the active job
        assert_eq!(
            app.modal,
            ModalState::Menu {
                field: MenuField::Job,
                selected: 1
            }
        );
    }

    #[test]
    fn test_hidden_column_menu_does_not_open() {
        let mut app = test_app("/allocations");
        app.columns.show_job = false;
        assert_eq!(app.handle_input(key(KeyCode::Char('J'))), EventResult::Unchanged);
        assert_eq!(app.modal, ModalState::None);
    }

    #[test]
    fn test_id_input_overrides_query() {
        let mut app = test_app("/allocations?allocation_id=a");
        assert_eq!(ids(&app), vec!["a1", "a2"]);

        app.handle_input(key(KeyCode::Char('/')));
        assert!(app.modal.is_text_input());
        // Input starts from the query value, so typing extends it
        app.handle_input(key(KeyCode::Char('2')));
        assert_eq!(app.id_override.as_deref(), Some("a2"));
        assert_eq!(ids(&app), vec!["a2"]);

        app.handle_input(InputEvent::Key(KeyEvent::new(
            KeyCode::Char('u'),
            KeyModifiers::CONTROL,
        )));
        app.handle_input(key(KeyCode::Char('b')));
        assert_eq!(ids(&app), vec!["b3"]);

        // Location is never touched by the text input
        assert_eq!(app.location.to_string(), "/allocations?allocation_id=a");

        app.handle_input(key(KeyCode::Esc));
        assert_eq!(app.modal, ModalState::None);
        assert_eq!(ids(&app), vec!["b3"]);
    }

    #[test]
    fn test_clear_filters() {
        let mut app = test_app("/allocations?status=running&client=n1");
        app.id_override = Some("zzz".to_string());
        app.handle_input(key(KeyCode::Char('x')));
        assert_eq!(app.location, Location::default());
        assert_eq!(app.id_override, None);
        assert_eq!(app.filtered().len(), 3);
    }

    #[test]
    fn test_resize_event_updates_table_size() {
        let mut app = test_app("/allocations");
        let before = app.table_size();
        app.handle_input(InputEvent::Resize(120, 40));
        let after = app.table_size();
        assert_ne!(before, after);
        assert_eq!(after.width, 120 - app.config.layout.width_margin);
        assert_eq!(after.height, 40 - app.config.layout.height_allowance);
    }

    #[test]
    fn test_unmount_releases_listener() {
        let mut app = test_app("/allocations");
        assert_eq!(app.resize_listener_count(), 1);
        app.unmount();
        assert_eq!(app.resize_listener_count(), 0);
    }

    #[test]
    fn test_changed_nodes_clear_cache() {
        let mut app = test_app("/allocations");
        app.node_names.resolve("n1", &app.nodes);
        assert_eq!(app.node_names.len(), 1);

        // Same nodes keep the cache
        let snapshot = Snapshot {
            allocations: app.allocations.clone(),
            nodes: app.nodes.clone(),
        };
        app.handle_data(DataEvent::SnapshotLoaded(snapshot));
        assert_eq!(app.node_names.len(), 1);

        let snapshot = Snapshot {
            allocations: app.allocations.clone(),
            nodes: vec![node("n1", "renamed")],
        };
        app.handle_data(DataEvent::SnapshotLoaded(snapshot));
        assert!(app.node_names.is_empty());
        assert_eq!(app.node_names.resolve("n1", &app.nodes), "renamed");
    }

    #[test]
    fn test_selection_clamped_after_filter_shrinks() {
        let mut app = test_app("/allocations");
        app.handle_input(key(KeyCode::Char('G')));
        assert_eq!(app.list_state.selected, 2);
        app.handle_input(key(KeyCode::Char('/')));
        app.handle_input(key(KeyCode::Char('a')));
        assert_eq!(app.list_state.selected, 1);
        assert_eq!(app.selected_allocation().map(|a| a.id.as_str()), Some("a2"));
    }

    #[test]
    fn test_yank_without_clipboard_reports_failure() {
        let mut app = test_app("/allocations?allocation_id=b3");
        app.handle_input(key(KeyCode::Char('o')));
        let feedback = app.current_clipboard_feedback().unwrap();
        assert!(!feedback.success);
        assert!(feedback.message.contains("not placed"));

        app.handle_input(key(KeyCode::Char('y')));
        assert!(!app.current_clipboard_feedback().unwrap().success);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let mut app = test_app("/allocations");
        app.handle_input(key(KeyCode::Char('?')));
        assert_eq!(app.modal, ModalState::Help);
        assert_eq!(app.handle_input(key(KeyCode::Char('x'))), EventResult::Unchanged);
        app.handle_input(key(KeyCode::Esc));
        assert_eq!(app.modal, ModalState::None);
    }

    #[test]
    fn test_quit() {
        let mut app = test_app("/allocations");
        assert_eq!(app.handle_input(key(KeyCode::Char('q'))), EventResult::Quit);
        assert!(!app.running);
    }
}
