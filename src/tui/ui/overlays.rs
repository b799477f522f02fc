//! Overlay and popup rendering
//!
//! Handles rendering of the help overlay and toast notifications.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::ClipboardFeedback;
use crate::tui::theme::Theme;

use super::widgets::centered_rect;

fn section(title: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![Span::styled(
        title.to_string(),
        Style::default().fg(theme.link).bold(),
    )])
}

pub fn render_help_overlay(frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup_area = centered_rect(65, 80, area);

    // Clear the area first
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "allocview - Keyboard Shortcuts",
            Style::default().bold(),
        )]),
        Line::from(""),
        section("Navigation", theme),
        Line::from("  j / Down       Move selection down"),
        Line::from("  k / Up         Move selection up"),
        Line::from("  g / Home       Jump to top"),
        Line::from("  G / End        Jump to bottom"),
        Line::from("  Ctrl+d / PgDn  Page down"),
        Line::from("  Ctrl+u / PgUp  Page up"),
        Line::from("  Scroll wheel   Navigate up/down"),
        Line::from("  Backspace      Previous location"),
        Line::from(""),
        section("Filters", theme),
        Line::from("  / or i         Edit allocation ID (Esc to leave, Ctrl+u to clear)"),
        Line::from("  s              Client status menu"),
        Line::from("  c              Client menu"),
        Line::from("  J              Job menu"),
        Line::from("  x              Clear all filters"),
        Line::from(""),
        section("Links", theme),
        Line::from("  y / Enter      Copy allocation link"),
        Line::from("  l              Copy logs link"),
        Line::from("  o              Copy client link"),
        Line::from(""),
        section("General", theme),
        Line::from("  R              Forget cached node names"),
        Line::from("  ?/F1           Show this help"),
        Line::from("  Esc            Close overlay / cancel"),
        Line::from("  q              Quit application"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press ? or Esc to close this help",
            Style::default().fg(theme.border),
        )]),
    ];

    let help_para = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_focused))
                .title(" Help "),
        )
        .style(Style::default().fg(theme.fg));

    frame.render_widget(help_para, popup_area);
}

/// Render clipboard feedback toast
pub fn render_clipboard_toast(
    feedback: &ClipboardFeedback,
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
) {
    // Position toast at bottom-right
    let toast_width = ((feedback.message.chars().count() + 4).min(60) as u16).min(area.width);
    let toast_area = Rect {
        x: area.width.saturating_sub(toast_width + 2),
        y: area.height.saturating_sub(4),
        width: toast_width,
        height: 3.min(area.height),
    };

    frame.render_widget(Clear, toast_area);

    let border_color = if feedback.success {
        theme.running
    } else {
        theme.failed
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let para = Paragraph::new(format!(" {} ", feedback.message))
        .block(block)
        .style(Style::default().fg(theme.fg))
        .alignment(Alignment::Center);

    frame.render_widget(para, toast_area);
}
