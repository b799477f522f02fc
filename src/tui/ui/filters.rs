//! Filter control panel and filter menu rendering

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::formatting::truncate_string;
use crate::tui::app::{App, MenuField};
use crate::tui::theme::Theme;

/// Longest control title shown in the panel before truncation
const MAX_TITLE_LEN: usize = 32;

/// Clamp a count to terminal cell range
fn cells(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

fn menu_key(field: MenuField) -> &'static str {
    match field {
        MenuField::Status => "s",
        MenuField::Client => "c",
        MenuField::Job => "J",
    }
}

/// Render the panel: allocation-id input followed by one control per visible menu.
pub fn render_filter_panel(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let editing = app.modal.is_text_input();
    let border = if editing {
        theme.border_focused
    } else {
        theme.border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Filters ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let key_style = Style::default().fg(theme.link);
    let id_text = app.id_input_text();
    let id_prefix = "[/] Allocation ID: ";

    let mut spans = vec![
        Span::styled("[/]", key_style),
        Span::raw(" Allocation ID: "),
        Span::styled(
            if id_text.is_empty() && !editing {
                "-".to_string()
            } else {
                id_text.to_string()
            },
            if editing {
                Style::default().fg(theme.selected_fg).bg(theme.selected_bg)
            } else {
                Style::default().fg(theme.fg)
            },
        ),
    ];

    let panel = app.panel();
    let active_menu = app.modal.open_menu().map(|(field, _)| field);
    for field in panel.visible_menus() {
        let title = truncate_string(&panel.title(field), MAX_TITLE_LEN);
        let is_set = app.location.param(field.key()).is_some();
        let style = if active_menu == Some(field) {
            Style::default().fg(theme.selected_fg).bg(theme.selected_bg)
        } else if is_set {
            Style::default().fg(theme.warn).bold()
        } else {
            Style::default().fg(theme.fg)
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("[{}]", menu_key(field)), key_style));
        spans.push(Span::styled(format!(" {} \u{25be}", title), style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);

    if editing {
        let typed = id_prefix.chars().count() + id_text.chars().count();
        let cursor_x = inner.x.saturating_add(cells(typed));
        frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
    }
}

/// Render the open filter menu as a dropdown below the panel.
pub fn render_filter_menu(app: &App, frame: &mut Frame, panel_area: Rect, theme: &Theme) {
    let Some((field, selected)) = app.modal.open_menu() else {
        return;
    };

    let panel = app.panel();
    let options = panel.options(field);
    let active = app.location.param(field.key());
    let screen = frame.area();

    let widest = options
        .iter()
        .map(|opt| opt.label.chars().count())
        .max()
        .unwrap_or(0);
    let width = cells((widest + 8).max(field.title().len() + 6)).min(screen.width);
    let max_height = screen.height.saturating_sub(panel_area.bottom());
    let height = cells(options.len()).saturating_add(2).min(max_height);
    if height < 3 {
        return;
    }

    let popup_area = Rect {
        x: panel_area.x.saturating_add(1),
        y: panel_area.bottom(),
        width: width.min(screen.width.saturating_sub(panel_area.x.saturating_add(1))),
        height,
    };
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .title(format!(" {} ", field.title()));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    // Keep the highlighted option on screen in long menus
    let visible = inner.height as usize;
    let skip = (selected + 1).saturating_sub(visible);

    let lines: Vec<Line> = options
        .iter()
        .enumerate()
        .skip(skip)
        .take(visible)
        .map(|(i, opt)| {
            let is_selected = i == selected;
            let is_active = opt.value.as_deref() == active;
            let prefix = if is_selected { "> " } else { "  " };
            let suffix = if is_active { " *" } else { "" };
            let style = if is_selected {
                Style::default().fg(theme.selected_fg).bg(theme.selected_bg)
            } else if is_active {
                Style::default().fg(theme.link)
            } else {
                Style::default()
            };
            Line::from(Span::styled(format!("{}{}{}", prefix, opt.label, suffix), style))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).style(Style::default().fg(theme.fg)), inner);
}
