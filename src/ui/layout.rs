use {
    crate::{
        query::RankedTable,
        ui::{
            app::{App, Focus, StatusKind},
            renderer::{header_cells, row_cells},
        },
    },
    ratatui::{
        layout::{Constraint, Direction, Layout as RatLayout, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Row, Table},
        Frame,
    },
};

const SIDEBAR_WIDTH: u16 = 24;

/// Render the main UI layout
pub fn render_layout(f: &mut Frame, area: Rect, app: &App) {
    let columns = RatLayout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(area);

    let sidebar = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(columns[0]);

    let main = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Tables
            Constraint::Length(3), // Status
        ])
        .split(columns[1]);

    render_clans(f, sidebar[0], app);
    render_seasons(f, sidebar[1], app);
    render_header(f, main[0], app);
    render_tables(f, main[1], app);
    render_footer(f, main[2], app);
}

fn focused_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn render_clans(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .clans
        .iter()
        .map(|c| ListItem::new(c.as_str()))
        .collect();

    let list = List::new(items)
        .block(focused_block("Clans", app.focus == Focus::Clans))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(app.selected_clan);
    f.render_stateful_widget(list, area, &mut state);
}

fn render_seasons(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .season_ids
        .iter()
        .map(|id| ListItem::new(id.to_string()))
        .collect();

    let list = List::new(items)
        .block(focused_block("Seasons", app.focus == Focus::Seasons))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(app.selected_season);
    f.render_stateful_widget(list, area, &mut state);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let title = match (app.selected_clan_name(), app.selected_season_id()) {
        (Some(clan), Some(season)) => format!("Clan ID {} - Season {}", clan, season),
        (Some(clan), None) => format!("Clan ID {}", clan),
        _ => "No clan selected".to_string(),
    };

    let text = vec![Line::from(vec![
        Span::styled(
            "Clan River Race Stats",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::raw(title),
    ])];

    f.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_tables(f: &mut Frame, area: Rect, app: &App) {
    let halves = RatLayout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    match app.current_view() {
        Some((_, view)) => {
            render_ranked_table(f, halves[0], &view.fame);
            render_ranked_table(f, halves[1], &view.decks_used);
        }
        None => {
            for (half, title) in halves.iter().zip(["Fame", "Decks Used"]) {
                f.render_widget(
                    Paragraph::new("No data").block(Block::default().borders(Borders::ALL).title(title)),
                    *half,
                );
            }
        }
    }
}

fn render_ranked_table(f: &mut Frame, area: Rect, table: &RankedTable) {
    let header = Row::new(header_cells(table))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = table.rows.iter().map(|r| Row::new(row_cells(r))).collect();

    let mut widths = vec![Constraint::Length(11), Constraint::Length(16)];
    widths.extend(table.sections.iter().map(|_| Constraint::Length(8)));
    widths.push(Constraint::Length(8));

    let widget = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(table.metric.label()));

    f.render_widget(widget, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let color = match app.status.kind {
        StatusKind::Info => Color::Gray,
        StatusKind::Success => Color::Green,
        StatusKind::Error => Color::Red,
    };

    let text = vec![Line::from(vec![
        Span::styled(app.status.text.as_str(), Style::default().fg(color)),
        Span::raw(" | "),
        Span::styled(
            "Tab focus  ↑/↓ select  u update  r reload  q quit",
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    f.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Status")),
        area,
    );
}
