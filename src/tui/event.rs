//! Event types for the TUI
//!
//! This module implements a dual-channel event architecture:
//! - InputEvent: Priority channel for user input (never dropped)
//! - DataEvent: Data channel for updates (may be dropped under load)

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};

use crate::snapshot::Snapshot;

/// Input events from the terminal (priority channel - never dropped)
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Keyboard input
    Key(KeyEvent),
    /// Mouse input
    Mouse(MouseEvent),
    /// Terminal resize
    Resize(u16, u16),
}

/// Data and control events (data channel - may be dropped under load)
#[derive(Debug)]
pub enum DataEvent {
    /// Once-per-second tick so ages and toasts stay current
    Tick,

    /// Fresh allocations and nodes from the snapshot files
    SnapshotLoaded(Snapshot),

    /// Snapshot reload failed; previous data stays on screen
    FetchError { error: String },
}

/// Result of processing an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Continue running, UI needs redraw
    Continue,
    /// Continue running, no UI change needed
    Unchanged,
    /// Quit the application
    Quit,
}

/// Key action mappings for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    // Navigation
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    PageUp,
    PageDown,

    // Filter controls
    EditAllocationId,
    OpenStatusMenu,
    OpenClientMenu,
    OpenJobMenu,
    ClearFilters,
    NavigateBack,

    // Links
    YankAllocationLink,
    YankLogsLink,
    YankNodeLink,

    // Actions
    Select,
    ClearNodeCache,

    // UI
    ShowHelp,
    Escape,
    Quit,

    // Text input specific
    InputClear,
    InputBackspace,
    InputChar(char),

    // Mouse actions
    MouseScrollUp,
    MouseScrollDown,

    // Unknown/unhandled
    Unknown,
}

impl KeyAction {
    /// Map a mouse event to an action
    pub fn from_mouse_event(event: MouseEvent) -> Self {
        use crossterm::event::MouseEventKind;

        match event.kind {
            MouseEventKind::ScrollUp => KeyAction::MouseScrollUp,
            MouseEventKind::ScrollDown => KeyAction::MouseScrollDown,
            _ => KeyAction::Unknown,
        }
    }

    /// Map a key event to an action based on current mode
    pub fn from_key_event(event: KeyEvent, in_text_input: bool) -> Self {
        let KeyEvent {
            code, modifiers, ..
        } = event;

        if in_text_input {
            return match code {
                KeyCode::Esc => KeyAction::Escape,
                KeyCode::Enter => KeyAction::Select,
                KeyCode::Backspace => KeyAction::InputBackspace,
                KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
                    KeyAction::InputClear
                }
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
                KeyCode::Char(c) => KeyAction::InputChar(c),
                _ => KeyAction::Unknown,
            };
        }

        match code {
            KeyCode::Char('q') => KeyAction::Quit,

            // Ctrl+ combinations must come before bare character matches
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
            KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::PageDown,
            KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::PageUp,

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => KeyAction::MoveDown,
            KeyCode::Char('k') | KeyCode::Up => KeyAction::MoveUp,
            KeyCode::Char('g') | KeyCode::Home => KeyAction::MoveToTop,
            KeyCode::Char('G') | KeyCode::End => KeyAction::MoveToBottom,
            KeyCode::PageDown => KeyAction::PageDown,
            KeyCode::PageUp => KeyAction::PageUp,

            // Filters
            KeyCode::Char('/') | KeyCode::Char('i') => KeyAction::EditAllocationId,
            KeyCode::Char('s') => KeyAction::OpenStatusMenu,
            KeyCode::Char('c') => KeyAction::OpenClientMenu,
            KeyCode::Char('J') => KeyAction::OpenJobMenu,
            KeyCode::Char('x') => KeyAction::ClearFilters,
            KeyCode::Backspace => KeyAction::NavigateBack,

            // Links
            KeyCode::Char('y') => KeyAction::YankAllocationLink,
            KeyCode::Char('l') => KeyAction::YankLogsLink,
            KeyCode::Char('o') => KeyAction::YankNodeLink,

            KeyCode::Enter => KeyAction::Select,
            KeyCode::Char('R') => KeyAction::ClearNodeCache,

            KeyCode::Char('?') | KeyCode::F(1) => KeyAction::ShowHelp,
            KeyCode::Esc => KeyAction::Escape,

            _ => KeyAction::Unknown,
        }
    }
}
