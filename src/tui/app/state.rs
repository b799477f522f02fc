//! Application state types for the TUI
//!
//! This module contains the state management types:
//! - Selection and navigation state (ListState)
//! - Modal states (Help, allocation-id input, filter menus)
//! - Feedback state for errors and clipboard notifications

use std::time::{Duration, Instant};

use super::panel::MenuField;

// ============================================================================
// Clipboard Feedback
// ============================================================================

/// Clipboard operation result for visual feedback
#[derive(Debug, Clone)]
pub struct ClipboardFeedback {
    pub message: String,
    pub success: bool,
    pub timestamp: Instant,
}

impl ClipboardFeedback {
    pub fn success(message: String) -> Self {
        Self {
            message,
            success: true,
            timestamp: Instant::now(),
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            message,
            success: false,
            timestamp: Instant::now(),
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.timestamp.elapsed() < Duration::from_secs(2)
    }
}

// ============================================================================
// List Navigation State
// ============================================================================

/// List state with selection and scroll tracking
#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub selected: usize,
    pub visible_count: usize,
}

impl ListState {
    pub fn clamp(&mut self, list_len: usize) {
        if list_len == 0 {
            self.selected = 0;
        } else {
            self.selected = self.selected.min(list_len - 1);
        }
    }

    pub fn move_up(&mut self, list_len: usize) {
        if self.selected > 0 {
            self.selected -= 1;
            self.clamp(list_len);
        }
    }

    pub fn move_down(&mut self, list_len: usize) {
        if list_len > 0 && self.selected < list_len - 1 {
            self.selected += 1;
        }
    }

    pub fn move_to_top(&mut self) {
        self.selected = 0;
    }

    pub fn move_to_bottom(&mut self, list_len: usize) {
        self.selected = list_len.saturating_sub(1);
    }

    pub fn page_up(&mut self, list_len: usize) {
        let jump = self.visible_count.max(2) / 2;
        self.selected = self.selected.saturating_sub(jump);
        self.clamp(list_len);
    }

    pub fn page_down(&mut self, list_len: usize) {
        let jump = self.visible_count.max(2) / 2;
        self.selected = self.selected.saturating_add(jump);
        self.clamp(list_len);
    }
}

// ============================================================================
// Modal State
// ============================================================================

/// Unified modal state. Only one overlay or input is active at a time.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    None,
    Help,
    /// Typing into the allocation-id input
    EditAllocationId,
    /// A filter menu is open with `selected` highlighted
    Menu { field: MenuField, selected: usize },
}

impl ModalState {
    #[must_use]
    pub fn is_text_input(&self) -> bool {
        matches!(self, ModalState::EditAllocationId)
    }

    #[must_use]
    pub fn open_menu(&self) -> Option<(MenuField, usize)> {
        match self {
            ModalState::Menu { field, selected } => Some((*field, *selected)),
            _ => None,
        }
    }
}

// ============================================================================
// Feedback State
// ============================================================================

/// Unified feedback state for errors, warnings, and transient messages
#[derive(Debug)]
pub struct FeedbackState {
    last_error: Option<(String, Instant)>,
    error_display_duration: Duration,
    pub config_warnings: Vec<String>,
    clipboard_feedback: Option<ClipboardFeedback>,
}

impl FeedbackState {
    pub fn new(config_warnings: Vec<String>) -> Self {
        Self {
            last_error: None,
            error_display_duration: Duration::from_secs(5),
            config_warnings,
            clipboard_feedback: None,
        }
    }

    pub fn set_error(&mut self, msg: String) {
        self.last_error = Some((msg, Instant::now()));
    }

    #[must_use]
    pub fn current_error(&self) -> Option<&str> {
        self.last_error
            .as_ref()
            .filter(|(_, t)| t.elapsed() < self.error_display_duration)
            .map(|(msg, _)| msg.as_str())
    }

    pub fn set_clipboard_feedback(&mut self, feedback: ClipboardFeedback) {
        self.clipboard_feedback = Some(feedback);
    }

    #[must_use]
    pub fn current_clipboard_feedback(&self) -> Option<&ClipboardFeedback> {
        self.clipboard_feedback.as_ref().filter(|f| f.is_visible())
    }
}
