//! Reusable UI widgets and helper functions
//!
//! This module contains shared rendering utilities used across different views.

use std::ops::Range;

use ratatui::prelude::*;
use ratatui::widgets::{Cell, Row};

use crate::tui::theme::Theme;

/// Create a styled table header row from column names
pub fn create_table_header<'a>(columns: &[&'a str], theme: &Theme) -> Row<'a> {
    let header_cells = columns
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(theme.header_fg).bold()));
    Row::new(header_cells)
        .style(Style::default().bg(theme.header_bg))
        .height(1)
}

/// Calculate scroll offset to keep selection visible
pub fn calculate_scroll_offset(selected: usize, visible_height: usize, total: usize) -> usize {
    if visible_height == 0 || total == 0 {
        return 0;
    }

    if selected < visible_height / 2 {
        0
    } else if selected > total.saturating_sub(visible_height / 2) {
        total.saturating_sub(visible_height)
    } else {
        selected.saturating_sub(visible_height / 2)
    }
}

/// Rows of a long list that are turned into widgets for one frame.
///
/// `rows` covers the visible range plus up to `overscan` rows on each side.
/// `offset` and `selected` are relative to `rows.start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualWindow {
    pub rows: Range<usize>,
    pub offset: usize,
    pub selected: Option<usize>,
}

impl VirtualWindow {
    pub fn compute(total: usize, selected: usize, visible_rows: usize, overscan: usize) -> Self {
        if total == 0 || visible_rows == 0 {
            return Self {
                rows: 0..0,
                offset: 0,
                selected: None,
            };
        }

        let selected = selected.min(total - 1);
        let first_visible = calculate_scroll_offset(selected, visible_rows, total);
        let start = first_visible.saturating_sub(overscan);
        let end = (first_visible + visible_rows + overscan).min(total);

        Self {
            rows: start..end,
            offset: first_visible - start,
            selected: Some(selected - start),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Create a centered rectangle
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
