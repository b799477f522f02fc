//! Allocation table rendering
//!
//! Only the rows inside the current [`VirtualWindow`] are turned into ratatui
//! rows, so frame cost does not grow with the size of the collection.

use chrono::{DateTime, Utc};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::formatting::{format_age, truncate_string};
use crate::models::Allocation;
use crate::tui::app::App;
use crate::tui::theme::Theme;

use super::widgets::{VirtualWindow, create_table_header};

/// Header row plus the block's top and bottom borders
const CHROME_ROWS: u16 = 3;

pub struct AllocationTableView<'a> {
    app: &'a App,
    theme: &'a Theme,
    allocations: Vec<&'a Allocation>,
    now: DateTime<Utc>,
}

impl<'a> AllocationTableView<'a> {
    pub fn new(app: &'a App, theme: &'a Theme, now: DateTime<Utc>) -> Self {
        Self {
            app,
            theme,
            allocations: app.filtered(),
            now,
        }
    }

    pub fn row_count(&self) -> usize {
        self.allocations.len()
    }

    /// Table rect: the viewport-derived size, clamped to the space available.
    pub fn table_area(&self, area: Rect) -> Rect {
        let size = self.app.table_size();
        Rect {
            x: area.x,
            y: area.y,
            width: size.width.min(area.width),
            height: size.height.min(area.height),
        }
    }

    pub fn window(&self, visible_rows: usize) -> VirtualWindow {
        VirtualWindow::compute(
            self.row_count(),
            self.app.list_state.selected,
            visible_rows,
            self.app.config.layout.overscan,
        )
    }

    fn header(&self) -> Row<'static> {
        let columns = self.app.columns;
        let mut names = vec!["", "ID"];
        if columns.show_job {
            names.push("Job");
        }
        names.push("Task Group");
        names.push("Status");
        if columns.show_client {
            names.push("Client");
        }
        names.push("Age");
        names.push("Actions");
        create_table_header(&names, self.theme)
    }

    fn widths(&self) -> Vec<Constraint> {
        let columns = self.app.columns;
        let mut widths = vec![
            Constraint::Length(2), // status icon
            Constraint::Length(8), // short id
        ];
        if columns.show_job {
            widths.push(Constraint::Min(10));
        }
        widths.push(Constraint::Min(14)); // task group
        widths.push(Constraint::Length(9)); // status
        if columns.show_client {
            widths.push(Constraint::Min(12));
        }
        widths.push(Constraint::Length(8)); // age
        widths.push(Constraint::Length(7)); // actions
        widths
    }

    /// Rows for the window only.
    pub fn rows(&self, window: &VirtualWindow) -> Vec<Row<'a>> {
        self.allocations[window.rows.clone()]
            .iter()
            .map(|&alloc| self.row(alloc))
            .collect()
    }

    fn row(&self, alloc: &'a Allocation) -> Row<'a> {
        let theme = self.theme;
        let columns = self.app.columns;
        let status_style = Style::default().fg(theme.status_color(&alloc.client_status));
        let link_style = Style::default().fg(theme.link);

        let mut cells = vec![
            Cell::from(alloc.client_status.glyph()).style(status_style),
            Cell::from(alloc.short_id()).style(link_style),
        ];
        if columns.show_job {
            cells.push(Cell::from(truncate_string(&alloc.job_id, 24)).style(link_style));
        }
        cells.push(Cell::from(alloc.task_group_label()).style(link_style));
        cells.push(Cell::from(alloc.client_status.as_str()).style(status_style));
        if columns.show_client {
            let client = match alloc.node_id.as_deref() {
                Some(node_id) => self.app.node_names.resolve(node_id, &self.app.nodes),
                None => "-".to_string(),
            };
            cells.push(Cell::from(client).style(link_style));
        }
        cells.push(Cell::from(format_age(alloc.age_seconds(self.now))));
        cells.push(Cell::from("logs").style(link_style.add_modifier(Modifier::UNDERLINED)));

        Row::new(cells).height(1)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let area = self.table_area(area);
        let title = format!(" Allocations ({}) ", self.row_count());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused))
            .title(title);

        let visible_rows = area.height.saturating_sub(CHROME_ROWS) as usize;
        let window = self.window(visible_rows);

        let table = Table::new(self.rows(&window), self.widths())
            .header(self.header())
            .block(block)
            .row_highlight_style(
                Style::default()
                    .bg(self.theme.selected_bg)
                    .fg(self.theme.selected_fg),
            );

        let mut state = TableState::default()
            .with_offset(window.offset)
            .with_selected(window.selected);
        frame.render_stateful_widget(table, area, &mut state);

        if window.is_empty() {
            let msg = if self.app.is_loading() {
                "Loading allocations..."
            } else if self.app.allocations.is_empty() {
                "No allocations"
            } else {
                "No allocations match the current filters"
            };
            let body = Rect {
                x: area.x.saturating_add(1),
                y: area.y.saturating_add(2),
                width: area.width.saturating_sub(2),
                height: area.height.saturating_sub(CHROME_ROWS).min(1),
            };
            let para = Paragraph::new(msg)
                .style(Style::default().fg(self.theme.border))
                .alignment(Alignment::Center);
            frame.render_widget(para, body);
        }
    }
}
