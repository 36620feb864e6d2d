use crate::aggregate::{AggregatedReport, ReportEntry};
use crate::format::{format_revenue, total_revenue};
use crate::search::filter_report;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

const PAGE_SIZE: usize = 20;

pub struct App {
    pub report: AggregatedReport,
    pub displayed: AggregatedReport,
    pub query: String,
    pub state: TableState,
}

impl App {
    pub fn new(report: AggregatedReport) -> Self {
        let mut app = Self {
            displayed: report.clone(),
            report,
            query: String::new(),
            state: TableState::default(),
        };
        app.reset_selection();
        app
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.apply_query();
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
        self.apply_query();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
        self.apply_query();
    }

    /// Re-run the search against the full report
    fn apply_query(&mut self) {
        self.displayed = filter_report(&self.report, &self.query);
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        if self.displayed.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn total(&self) -> f64 {
        total_revenue(&self.displayed)
    }

    pub fn selected_entry(&self) -> Option<&ReportEntry> {
        self.state.selected().and_then(|i| self.displayed.entries().get(i))
    }

    pub fn next(&mut self) {
        let len = self.displayed.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.displayed.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.displayed.len();
        if len == 0 {
            return;
        }
        let i = self
            .state
            .selected()
            .map(|i| (i + PAGE_SIZE).min(len - 1))
            .unwrap_or(0);
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.displayed.is_empty() {
            return;
        }
        let i = self
            .state
            .selected()
            .map(|i| i.saturating_sub(PAGE_SIZE))
            .unwrap_or(0);
        self.state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                KeyCode::Esc if app.query.is_empty() => return Ok(()),
                KeyCode::Esc => app.clear_query(),
                KeyCode::Backspace => app.pop_char(),
                KeyCode::Char(c) => app.push_char(c),
                KeyCode::Down => app.next(),
                KeyCode::Up => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home if !app.displayed.is_empty() => app.state.select(Some(0)),
                KeyCode::End if !app.displayed.is_empty() => {
                    app.state.select(Some(app.displayed.len() - 1))
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search box
            Constraint::Min(0),    // Report table
            Constraint::Length(3), // Total
            Constraint::Length(1), // Key hints
        ])
        .split(f.size());

    render_search(f, chunks[0], app);
    render_table(f, chunks[1], app);
    render_total(f, chunks[2], app);
    render_hints(f, chunks[3]);
}

fn render_search(f: &mut Frame, area: Rect, app: &App) {
    let text = if app.query.is_empty() {
        Line::from(Span::styled(
            "Enter product name to search...",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    } else {
        Line::from(vec![
            Span::styled(app.query.as_str(), Style::default().fg(Color::Yellow)),
            Span::styled("█", Style::default().fg(Color::DarkGray)),
        ])
    };

    let search = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Search Products "),
    );

    f.render_widget(search, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Product", "Revenue"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.displayed.iter().map(|entry| {
        let color = if entry.revenue < 0.0 { Color::Red } else { Color::Green };
        Row::new(vec![
            Cell::from(entry.name.clone()),
            Cell::from(format!("{:>16}", format_revenue(entry.revenue))).style(Style::default().fg(color)),
        ])
        .height(1)
    });

    let title = format!(
        " Revenue Aggregator - {}/{} products ",
        app.displayed.len(),
        app.report.len()
    );

    let table = Table::new(rows, [Constraint::Min(20), Constraint::Length(18)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_total(f: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::styled("Total  ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled(
            format_revenue(app.total()),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
    ]);

    let total = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(total, area);
}

fn render_hints(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled(" type", Style::default().fg(Color::Yellow)),
        Span::raw(" Search | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Nav | "),
        Span::styled("PgUp/PgDn", Style::default().fg(Color::Yellow)),
        Span::raw(" Fast | "),
        Span::styled("Esc", Style::default().fg(Color::Red)),
        Span::raw(" Clear/Quit"),
    ]);

    f.render_widget(Paragraph::new(hints), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::build_report;
    use crate::feed::LineItem;

    fn app() -> App {
        let feeds = vec![
            vec![LineItem::new("Apple", 1.0, 10), LineItem::new("Banana", 0.5, 4)],
            vec![LineItem::new("Pineapple", 3.0, 2), LineItem::new("Cherry", 2.0, 1)],
        ];
        App::new(build_report(&feeds).unwrap())
    }

    #[test]
    fn test_typing_filters_and_updates_total() {
        let mut app = app();
        assert_eq!(app.displayed.len(), 4);
        assert_eq!(app.total(), 20.0);

        for c in "APP".chars() {
            app.push_char(c);
        }

        let names: Vec<&str> = app.displayed.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "Pineapple"]);
        assert_eq!(app.total(), 16.0);
        assert_eq!(app.selected_entry().map(|e| e.name.as_str()), Some("Apple"));
    }

    #[test]
    fn test_no_match_shows_empty_list() {
        let mut app = app();
        app.push_char('z');

        assert!(app.displayed.is_empty());
        assert_eq!(app.total(), 0.0);
        assert!(app.selected_entry().is_none());
    }

    #[test]
    fn test_backspace_and_clear_restore_full_report() {
        let mut app = app();
        app.push_char('c');
        app.push_char('h');
        assert_eq!(app.displayed.len(), 1);

        app.pop_char();
        assert_eq!(app.query, "c");

        app.clear_query();
        assert_eq!(app.displayed, app.report);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app();
        app.previous();
        assert_eq!(app.state.selected(), Some(3));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
        app.page_down();
        assert_eq!(app.state.selected(), Some(3));
        app.page_up();
        assert_eq!(app.state.selected(), Some(0));
    }
}
