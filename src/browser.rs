use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    style::Style,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table, TableState},
    DefaultTerminal, Frame,
};

use crate::error::Result;
use crate::filter::{self, FilterOutcome};
use crate::fmt::{format_k, y_axis_ticks};
use crate::models::{MonthlyRevenuePoint, PredictionMap, Transaction};
use crate::pager::Pager;
use crate::revenue::monthly_revenue;
use crate::tui::{
    self, ACTUAL_STYLE, FOOTER_STYLE, HEADER_STYLE, PREDICTED_STYLE, SELECTED_STYLE,
};

const CHART_HEIGHT: u16 = 12;

enum BrowseMode {
    Normal,
    /// Live search: every keystroke re-filters the dataset.
    Search,
    GotoPage(String),
}

enum BrowseAction {
    Continue,
    Close,
}

/// Interactive dataset browser: a paged transaction table with live search
/// and, when a user is selected, their monthly revenue timeline.
///
/// All state lives here; draw and key handling are pure functions of it.
pub struct DatasetBrowser {
    all: Vec<Transaction>,
    predictions: PredictionMap,
    query: String,
    filtered: Vec<Transaction>,
    selected_user: Option<String>,
    user_mode: bool,
    timeline: Vec<MonthlyRevenuePoint>,
    show_timeline: bool,
    pager: Pager,
    selected: usize,
    mode: BrowseMode,
    status_message: Option<String>,
    table_state: TableState,
}

impl DatasetBrowser {
    pub fn new(
        transactions: Vec<Transaction>,
        predictions: PredictionMap,
        query: String,
        page_size: usize,
    ) -> Self {
        let mut browser = Self {
            all: transactions,
            predictions,
            query,
            filtered: Vec::new(),
            selected_user: None,
            user_mode: false,
            timeline: Vec::new(),
            show_timeline: false,
            pager: Pager::new(page_size),
            selected: 0,
            mode: BrowseMode::Normal,
            status_message: None,
            table_state: TableState::default(),
        };
        browser.apply_query();
        browser
    }

    /// Seed the status line, e.g. with load warnings. Cleared on the next
    /// key press.
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    /// Re-run the filter for the current query and rebuild everything
    /// derived from it: the timeline, the page clamp, the selection.
    fn apply_query(&mut self) {
        let FilterOutcome {
            rows,
            selected_user,
            user_mode,
        } = filter::filter(&self.all, &self.query);
        self.filtered = rows;
        self.selected_user = selected_user;
        self.user_mode = user_mode;
        // the timeline is only aggregated for a selected user
        self.timeline = if self.user_mode {
            monthly_revenue(
                &self.filtered,
                &self.predictions,
                self.selected_user.as_deref(),
            )
        } else {
            Vec::new()
        };
        self.show_timeline = self.user_mode;
        self.pager.clamp_to(self.filtered.len());
        self.selected = 0;
    }

    pub fn run(&mut self) -> Result<()> {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            ratatui::restore();
            hook(info);
        }));

        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            terminal.draw(|frame| self.draw_frame(frame))?;

            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            {
                if kind != KeyEventKind::Press {
                    continue;
                }
                if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
                    break;
                }
                match self.handle_key_event(code) {
                    BrowseAction::Close => break,
                    BrowseAction::Continue => {}
                }
            }
        }
        Ok(())
    }

    /// Draw the browser into the given frame.
    pub fn draw_frame(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let narrow = area.width < 110;

        let chart_height = if self.show_timeline && !self.timeline.is_empty() {
            CHART_HEIGHT
        } else {
            0
        };

        let areas = Layout::vertical([
            Constraint::Length(1),            // title
            Constraint::Length(1),            // search line
            Constraint::Fill(1),              // table
            Constraint::Length(chart_height), // timeline chart
            Constraint::Length(1),            // status
            Constraint::Length(1),            // keys
        ])
        .split(area);
        let title_area = areas[0];
        let search_area = areas[1];
        let table_area = areas[2];
        let chart_area = areas[3];
        let status_area = areas[4];
        let keys_area = areas[5];

        frame.render_widget(
            Paragraph::new("Customer Transactions").style(HEADER_STYLE),
            title_area,
        );

        // Search line with a live cursor while typing
        let search_line = match &self.mode {
            BrowseMode::Search => format!("Search: {}\u{2588}", self.query),
            _ if self.query.is_empty() => "Search: (none)".to_string(),
            _ => format!("Search: {}", self.query),
        };
        let search_style = if matches!(self.mode, BrowseMode::Search) {
            Style::default()
        } else {
            FOOTER_STYLE
        };
        frame.render_widget(Paragraph::new(search_line).style(search_style), search_area);

        // Compute category column width from fixed columns + spacing
        let (fixed_cols, num_cols): (u16, u16) = if narrow {
            (6 + 12 + 19 + 9 + 12, 6)
        } else {
            (6 + 12 + 19 + 9 + 12 + 14 + 12, 8)
        };
        let spacing = num_cols - 1;
        let cat_width = table_area.width.saturating_sub(fixed_cols + spacing) as usize;
        let cat_width = cat_width.max(10);

        let page_rows = self.pager.slice(&self.filtered);
        let mut rendered_rows = Vec::new();
        for t in page_rows {
            let (wrapped_cat, line_count) = tui::wrap_text(&t.category_code, cat_width);
            let amt = tui::amount_span(t.amount, t.is_purchase());

            let cells: Vec<Cell> = if narrow {
                vec![
                    Cell::from(t.id.to_string()),
                    Cell::from(amt),
                    Cell::from(t.event_time.format("%Y-%m-%d %H:%M:%S").to_string()),
                    Cell::from(t.event_type.clone()),
                    Cell::from(t.user_id.clone()),
                    Cell::from(wrapped_cat),
                ]
            } else {
                vec![
                    Cell::from(t.id.to_string()),
                    Cell::from(amt),
                    Cell::from(t.event_time.format("%Y-%m-%d %H:%M:%S").to_string()),
                    Cell::from(t.event_type.clone()),
                    Cell::from(t.user_id.clone()),
                    Cell::from(wrapped_cat),
                    Cell::from(t.brand.clone()),
                    Cell::from(t.user_session.clone()),
                ]
            };
            rendered_rows.push(Row::new(cells).height(line_count));
        }

        let widths: Vec<Constraint> = if narrow {
            vec![
                Constraint::Length(6),
                Constraint::Length(12),
                Constraint::Length(19),
                Constraint::Length(9),
                Constraint::Length(12),
                Constraint::Fill(1),
            ]
        } else {
            vec![
                Constraint::Length(6),
                Constraint::Length(12),
                Constraint::Length(19),
                Constraint::Length(9),
                Constraint::Length(12),
                Constraint::Fill(1),
                Constraint::Length(14),
                Constraint::Length(12),
            ]
        };

        let header_cells: Vec<&str> = if narrow {
            vec!["ID", "Amount", "Event Time", "Type", "User ID", "Category"]
        } else {
            vec![
                "ID",
                "Amount",
                "Event Time",
                "Type",
                "User ID",
                "Category",
                "Brand",
                "Session",
            ]
        };

        self.selected = self.selected.min(page_rows.len().saturating_sub(1));
        self.table_state.select(Some(self.selected));
        let table = Table::new(rendered_rows, widths)
            .header(Row::new(header_cells).style(HEADER_STYLE).bottom_margin(1))
            .column_spacing(1)
            .row_highlight_style(SELECTED_STYLE);
        frame.render_stateful_widget(table, table_area, &mut self.table_state);

        if chart_height > 0 {
            self.draw_timeline(frame, chart_area);
        }

        // Status line
        let count = self.filtered.len();
        let mut status = match self.pager.row_range(count) {
            Some((start, end)) => format!(
                "Rows {start}-{end} of {count} | Page {} of {} | {} per page",
                self.pager.page(),
                self.pager.total_pages(count),
                self.pager.page_size(),
            ),
            None => "No matching transactions".to_string(),
        };
        if let Some(user) = &self.selected_user {
            status.push_str(&format!(" | user {user}"));
        }
        if let Some(msg) = &self.status_message {
            status.push_str(&format!(" | {msg}"));
        }
        frame.render_widget(Paragraph::new(status).style(FOOTER_STYLE), status_area);

        // Keys / input prompt
        let keys_widget = match &self.mode {
            BrowseMode::Normal => Paragraph::new(
                "/:search  n/\u{2192}:next  p/\u{2190}:prev  g:page  s:page size  t:timeline  q:quit",
            )
            .style(FOOTER_STYLE),
            BrowseMode::Search => {
                Paragraph::new("Type to filter, Enter/Esc=done").style(FOOTER_STYLE)
            }
            BrowseMode::GotoPage(input) => Paragraph::new(format!("Go to page: {input}\u{2588}")),
        };
        frame.render_widget(keys_widget, keys_area);
    }

    /// Monthly revenue bar chart: one group per month, an actual bar and,
    /// on the point carrying it, a predicted bar.
    fn draw_timeline(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let max_val = self
            .timeline
            .iter()
            .flat_map(|p| [p.actual, p.predicted.unwrap_or(0.0)])
            .fold(1.0f64, f64::max);

        let (top_tick, mid_tick) = y_axis_ticks(max_val);
        let top_label = format_k(top_tick);
        let mid_label = format_k(mid_tick);
        let y_label_width = top_label.len().max(mid_label.len()) as u16 + 1;

        let [y_axis_area, bar_area] = Layout::horizontal([
            Constraint::Length(y_label_width),
            Constraint::Fill(1),
        ])
        .areas(area);

        // Y-axis labels: top tick near top, mid tick at middle
        let inner_height = bar_area.height.saturating_sub(2); // title + month labels
        let mid_row = inner_height / 2;
        let mut y_lines: Vec<Line> = vec![Line::from("")];
        for row in 0..inner_height {
            if row == 0 {
                y_lines.push(Line::from(Span::styled(
                    format!("{:>width$}", top_label, width = y_label_width as usize),
                    FOOTER_STYLE,
                )));
            } else if row == mid_row {
                y_lines.push(Line::from(Span::styled(
                    format!("{:>width$}", mid_label, width = y_label_width as usize),
                    FOOTER_STYLE,
                )));
            } else {
                y_lines.push(Line::from(""));
            }
        }
        frame.render_widget(Paragraph::new(y_lines), y_axis_area);

        let groups: Vec<BarGroup> = self
            .timeline
            .iter()
            .map(|point| {
                let mut bars = vec![Bar::default()
                    .value(point.actual.round() as u64)
                    .style(ACTUAL_STYLE)];
                if let Some(predicted) = point.predicted {
                    bars.push(
                        Bar::default()
                            .value(predicted.round() as u64)
                            .style(PREDICTED_STYLE),
                    );
                }
                BarGroup::default()
                    .label(Line::from(point.month.as_str()))
                    .bars(&bars)
            })
            .collect();

        let user = self.selected_user.as_deref().unwrap_or("");
        let block = Block::default()
            .title(format!(
                "Revenue Timeline for user {user} (green: actual, magenta: predicted)"
            ))
            .title_style(HEADER_STYLE)
            .borders(Borders::NONE);

        let mut chart = BarChart::default()
            .block(block)
            .bar_width(3)
            .bar_gap(0)
            .group_gap(2);
        for group in &groups {
            chart = chart.data(group.clone());
        }
        frame.render_widget(chart, bar_area);
    }

    /// Handle a key event. Returns whether the caller should keep running.
    fn handle_key_event(&mut self, code: KeyCode) -> BrowseAction {
        self.status_message = None;

        match &self.mode {
            BrowseMode::Normal => match code {
                KeyCode::Char('q') | KeyCode::Esc => return BrowseAction::Close,
                KeyCode::Char('/') => {
                    self.mode = BrowseMode::Search;
                }
                KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
                    self.pager.next_page(self.filtered.len());
                    self.selected = 0;
                }
                KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
                    self.pager.prev_page();
                    self.selected = 0;
                }
                KeyCode::Home => {
                    self.pager.set_page(1, self.filtered.len());
                    self.selected = 0;
                }
                KeyCode::End => {
                    let last = self.pager.total_pages(self.filtered.len());
                    self.pager.set_page(last, self.filtered.len());
                    self.selected = 0;
                }
                KeyCode::Char('g') => {
                    self.mode = BrowseMode::GotoPage(String::new());
                }
                KeyCode::Char('s') => {
                    self.pager.cycle_page_size();
                    self.selected = 0;
                }
                KeyCode::Char('t') => {
                    if self.user_mode {
                        self.show_timeline = !self.show_timeline;
                    } else {
                        self.status_message =
                            Some("Timeline needs a user ID search".to_string());
                    }
                }
                KeyCode::Down => {
                    let page_len = self.pager.slice(&self.filtered).len();
                    if self.selected + 1 < page_len {
                        self.selected += 1;
                    }
                }
                KeyCode::Up => {
                    self.selected = self.selected.saturating_sub(1);
                }
                _ => {}
            },
            BrowseMode::Search => match code {
                KeyCode::Enter | KeyCode::Esc => self.mode = BrowseMode::Normal,
                KeyCode::Backspace => {
                    self.query.pop();
                    self.apply_query();
                }
                KeyCode::Char(c) => {
                    self.query.push(c);
                    self.apply_query();
                }
                _ => {}
            },
            BrowseMode::GotoPage(_) => match code {
                KeyCode::Esc => self.mode = BrowseMode::Normal,
                KeyCode::Enter => self.submit_goto_page(),
                KeyCode::Backspace => {
                    if let BrowseMode::GotoPage(s) = &mut self.mode {
                        s.pop();
                    }
                }
                KeyCode::Char(c) => {
                    if let BrowseMode::GotoPage(s) = &mut self.mode {
                        s.push(c);
                    }
                }
                _ => {}
            },
        }
        BrowseAction::Continue
    }

    fn submit_goto_page(&mut self) {
        let mode = std::mem::replace(&mut self.mode, BrowseMode::Normal);
        if let BrowseMode::GotoPage(input) = mode {
            if let Ok(page) = input.trim().parse::<usize>() {
                self.pager.set_page(page, self.filtered.len());
                self.selected = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn make_transactions(n: usize) -> Vec<Transaction> {
        (0..n)
            .map(|i| Transaction {
                id: (i + 1) as u64,
                event_time: Utc
                    .with_ymd_and_hms(2021, (i % 3) as u32 + 1, 5, 12, 0, 0)
                    .unwrap(),
                event_type: if i % 2 == 0 { "purchase" } else { "view" }.to_string(),
                amount: 10.0 + i as f64,
                user_id: if i < 4 { "7" } else { "44" }.to_string(),
                category_code: "electronics.video.tv".to_string(),
                brand: "lg".to_string(),
                user_session: format!("session-{i}"),
            })
            .collect()
    }

    fn make_browser(n: usize, query: &str) -> DatasetBrowser {
        DatasetBrowser::new(
            make_transactions(n),
            PredictionMap::new(),
            query.to_string(),
            5,
        )
    }

    #[test]
    fn test_empty_query_shows_everything() {
        let browser = make_browser(12, "");
        assert_eq!(browser.filtered.len(), 12);
        assert!(!browser.user_mode);
        assert!(!browser.show_timeline);
    }

    #[test]
    fn test_user_query_enables_timeline() {
        let browser = make_browser(12, "7");
        assert_eq!(browser.filtered.len(), 4);
        assert!(browser.user_mode);
        assert!(browser.show_timeline);
        assert!(!browser.timeline.is_empty());
    }

    #[test]
    fn test_timeline_toggle_refused_without_user() {
        let mut browser = make_browser(12, "lg");
        browser.handle_key_event(KeyCode::Char('t'));
        assert!(!browser.show_timeline);
        assert!(browser.status_message.is_some());
    }

    #[test]
    fn test_timeline_toggle_in_user_mode() {
        let mut browser = make_browser(12, "7");
        browser.handle_key_event(KeyCode::Char('t'));
        assert!(!browser.show_timeline);
        browser.handle_key_event(KeyCode::Char('t'));
        assert!(browser.show_timeline);
    }

    #[test]
    fn test_next_page_stops_on_last() {
        let mut browser = make_browser(12, "");
        browser.handle_key_event(KeyCode::Char('n'));
        assert_eq!(browser.pager.page(), 2);
        browser.handle_key_event(KeyCode::Char('n'));
        assert_eq!(browser.pager.page(), 3);
        browser.handle_key_event(KeyCode::Char('n'));
        assert_eq!(browser.pager.page(), 3);
    }

    #[test]
    fn test_live_search_refilters_per_keystroke() {
        let mut browser = make_browser(12, "");
        browser.handle_key_event(KeyCode::Char('/'));
        browser.handle_key_event(KeyCode::Char('v'));
        browser.handle_key_event(KeyCode::Char('i'));
        // "vi" matches the view events and the video category
        assert!(!browser.filtered.is_empty());
        browser.handle_key_event(KeyCode::Char('e'));
        browser.handle_key_event(KeyCode::Char('w'));
        assert_eq!(browser.filtered.len(), 6);
        assert!(!browser.user_mode);
        browser.handle_key_event(KeyCode::Enter);
        assert!(matches!(browser.mode, BrowseMode::Normal));
        // query persists after leaving search mode
        assert_eq!(browser.query, "view");
    }

    #[test]
    fn test_backspace_to_empty_restores_full_set() {
        let mut browser = make_browser(12, "");
        browser.handle_key_event(KeyCode::Char('/'));
        browser.handle_key_event(KeyCode::Char('7'));
        assert_eq!(browser.filtered.len(), 4);
        assert!(browser.user_mode);
        browser.handle_key_event(KeyCode::Backspace);
        assert_eq!(browser.filtered.len(), 12);
        assert!(!browser.user_mode);
        assert!(!browser.show_timeline);
    }

    #[test]
    fn test_goto_page_clamps() {
        let mut browser = make_browser(12, "");
        browser.handle_key_event(KeyCode::Char('g'));
        browser.handle_key_event(KeyCode::Char('9'));
        browser.handle_key_event(KeyCode::Char('9'));
        browser.handle_key_event(KeyCode::Enter);
        assert_eq!(browser.pager.page(), 3);
    }

    #[test]
    fn test_page_size_cycle_resets_page() {
        let mut browser = make_browser(50, "");
        browser.handle_key_event(KeyCode::Char('n'));
        assert_eq!(browser.pager.page(), 2);
        browser.handle_key_event(KeyCode::Char('s'));
        assert_eq!(browser.pager.page_size(), 10);
        assert_eq!(browser.pager.page(), 1);
    }

    #[test]
    fn test_narrowing_query_keeps_page_clamped() {
        let mut browser = make_browser(50, "");
        browser.handle_key_event(KeyCode::Char('n'));
        browser.handle_key_event(KeyCode::Char('n'));
        assert_eq!(browser.pager.page(), 3);
        browser.handle_key_event(KeyCode::Char('/'));
        browser.handle_key_event(KeyCode::Char('7'));
        // 4 matches at page size 5: page must be clamped back to 1
        assert_eq!(browser.pager.page(), 1);
    }
}
