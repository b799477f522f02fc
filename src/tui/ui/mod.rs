//! UI rendering for the TUI
//!
//! This module handles all rendering using ratatui. The rendering is event-driven -
//! we only render when an event triggers a state change, not at a fixed frame rate.

mod allocations;
mod filters;
mod overlays;
mod widgets;

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, ModalState};
use crate::tui::theme::Theme;

use allocations::AllocationTableView;
use filters::{render_filter_menu, render_filter_panel};
use overlays::{render_clipboard_toast, render_help_overlay};

/// Render the entire TUI
pub fn render(app: &App, frame: &mut Frame) {
    // Use theme from configuration
    let theme = Theme::from_name(&app.config.display.theme);
    let area = frame.area();

    // Main layout: title, filter panel, table, footer
    let layout = Layout::vertical([
        Constraint::Length(1), // Title bar
        Constraint::Length(3), // Filter panel
        Constraint::Min(0),    // Allocation table
        Constraint::Length(2), // Status bar
    ])
    .split(area);

    let table = AllocationTableView::new(app, &theme, chrono::Utc::now());

    render_title_bar(app, &table, frame, layout[0], &theme);
    render_filter_panel(app, frame, layout[1], &theme);
    table.render(frame, layout[2]);
    render_status_bar(app, frame, layout[3], &theme);

    // Overlays (render in order of z-index)
    match &app.modal {
        ModalState::Help => render_help_overlay(frame, area, &theme),
        ModalState::Menu { .. } => render_filter_menu(app, frame, layout[1], &theme),
        ModalState::EditAllocationId | ModalState::None => {}
    }

    // Clipboard feedback toast (always on top)
    if let Some(feedback) = app.current_clipboard_feedback() {
        render_clipboard_toast(feedback, frame, area, &theme);
    }
}

fn render_title_bar(
    app: &App,
    table: &AllocationTableView<'_>,
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
) {
    let line = Line::from(vec![
        Span::styled(" allocview ", Style::default().fg(theme.selected_fg).bold()),
        Span::styled(app.location.to_string(), Style::default().fg(theme.link)),
        Span::styled(
            format!(
                "  {} of {} allocations",
                table.row_count(),
                app.allocations.len()
            ),
            Style::default().fg(theme.border),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let layout = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);

    // Keybindings line - context-sensitive
    let keybinds = match &app.modal {
        ModalState::EditAllocationId => " type to filter  Ctrl+u:clear  Enter/Esc:done ",
        ModalState::Menu { .. } => " j/k:move  Enter:apply  Esc:close ",
        ModalState::Help => " Esc:close ",
        ModalState::None => {
            " j/k:move  /:id  s:status  c:client  J:job  x:clear  y/l/o:copy link  ?:help  q:quit "
        }
    };
    let keybinds_para = Paragraph::new(keybinds).style(Style::default().fg(theme.border));
    frame.render_widget(keybinds_para, layout[0]);

    let mut status_parts = Vec::new();

    if let Some(alloc) = app.selected_allocation() {
        status_parts.push(Span::styled(
            format!(" {} ", alloc.id),
            Style::default().fg(theme.link),
        ));
    }

    status_parts.push(Span::raw(" | "));
    match app.last_loaded {
        Some(loaded) => {
            let age_secs = loaded.elapsed().as_secs();
            let age_str = if age_secs < 60 {
                format!("{}s", age_secs)
            } else {
                format!("{}m", age_secs / 60)
            };
            status_parts.push(Span::styled(
                format!("Loaded: {} ago", age_str),
                Style::default().fg(theme.border),
            ));
        }
        None => {
            status_parts.push(Span::styled("Loading...", Style::default().fg(theme.pending)));
        }
    }

    // Config warnings display (persistent until fixed)
    if !app.feedback.config_warnings.is_empty() {
        let warning_text = if app.feedback.config_warnings.len() == 1 {
            format!(" | WARN: {}", app.feedback.config_warnings[0])
        } else {
            format!(
                " | WARN: {} (+{} more)",
                app.feedback.config_warnings[0],
                app.feedback.config_warnings.len() - 1
            )
        };
        status_parts.push(Span::styled(warning_text, Style::default().fg(theme.warn)));
    }

    // Error display (temporary, auto-dismisses)
    if let Some(error) = app.current_error() {
        status_parts.push(Span::styled(
            format!(" | ERROR: {} ", error),
            Style::default().fg(theme.failed),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(status_parts)), layout[1]);
}
