use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use taskdeck_core::task::Task;
use taskdeck_service::ServiceError;
use tracing::debug;

use crate::components::{status_style, Notice};

pub const LIST_FAILED_MSG: &str = "Failed to load tasks";
pub const SEARCH_FAILED_MSG: &str = "Error fetching tasks by name";

/// The task list screen, including the explicit name search.
///
/// Holds the last successfully displayed set of tasks. A failed load or
/// search never clobbers it; the failure is surfaced as a notice instead.
/// Loads and searches share one generation counter because both replace
/// the visible set, and only the most recently issued one may commit.
pub struct ListScreen {
    tasks: Vec<Task>,
    pub list_state: ListState,
    /// The search input box is open and capturing keys.
    pub searching: bool,
    pub query: String,
    /// The query whose results are currently displayed, if any.
    active_query: Option<String>,
    load_gen: u64,
    pub loading: bool,
    pub notice: Option<Notice>,
}

impl ListScreen {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            list_state: ListState::default(),
            searching: false,
            query: String::new(),
            active_query: None,
            load_gen: 0,
            loading: false,
            notice: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn active_query(&self) -> Option<&str> {
        self.active_query.as_deref()
    }

    // ---- loading ----

    pub fn begin_load(&mut self, generation: u64) {
        self.load_gen = generation;
        self.loading = true;
    }

    pub fn finish_load(&mut self, generation: u64, result: Result<Vec<Task>, ServiceError>) {
        if generation != self.load_gen {
            debug!(generation, current = self.load_gen, "stale list discarded");
            return;
        }
        self.loading = false;
        match result {
            Ok(tasks) => {
                self.tasks = tasks;
                self.active_query = None;
                self.clamp_selection();
            }
            Err(e) => {
                // Previous set stays visible (empty on first load).
                self.notice = Some(Notice::Error(e.user_message(LIST_FAILED_MSG)));
            }
        }
    }

    // ---- search ----

    pub fn open_search(&mut self) {
        self.searching = true;
        self.query.clear();
        self.notice = None;
    }

    pub fn cancel_search(&mut self) {
        self.searching = false;
        self.query.clear();
    }

    /// Closes the input box. Returns the query to send, or None when the
    /// query is blank (a blank query restores the full set, which the
    /// caller issues as a plain load).
    pub fn submit_search(&mut self) -> Option<String> {
        self.searching = false;
        let query = self.query.trim().to_string();
        if query.is_empty() {
            None
        } else {
            Some(query)
        }
    }

    pub fn begin_search(&mut self, generation: u64) {
        self.load_gen = generation;
        self.loading = true;
    }

    pub fn finish_search(
        &mut self,
        generation: u64,
        query: String,
        result: Result<Vec<Task>, ServiceError>,
    ) {
        if generation != self.load_gen {
            debug!(generation, current = self.load_gen, "stale search discarded");
            return;
        }
        self.loading = false;
        match result {
            Ok(tasks) => {
                self.tasks = tasks;
                self.active_query = Some(query);
                self.clamp_selection();
            }
            Err(e) => {
                // Keep the previously displayed set stable.
                self.notice = Some(Notice::Error(e.user_message(SEARCH_FAILED_MSG)));
            }
        }
    }

    // ---- selection ----

    pub fn select_next(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        let next = match self.list_state.selected() {
            Some(i) if i + 1 < self.tasks.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.list_state.select(Some(next));
    }

    pub fn select_prev(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        let prev = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(prev));
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.list_state.selected()?)
    }

    fn clamp_selection(&mut self) {
        if self.tasks.is_empty() {
            self.list_state.select(None);
        } else {
            match self.list_state.selected() {
                Some(i) if i >= self.tasks.len() => {
                    self.list_state.select(Some(self.tasks.len() - 1))
                }
                Some(_) => {}
                None => self.list_state.select(Some(0)),
            }
        }
    }

    // ---- rendering ----

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        self.render_search_bar(frame, layout[0]);
        self.render_tasks(frame, layout[1]);
    }

    fn render_search_bar(&self, frame: &mut Frame, area: Rect) {
        let (text, style) = if self.searching {
            (
                format!("{}_", self.query),
                Style::default().fg(Color::Cyan),
            )
        } else if let Some(q) = &self.active_query {
            (
                format!("{q} (Esc to clear)"),
                Style::default().fg(Color::Yellow),
            )
        } else {
            (
                "press / to search by name".to_string(),
                Style::default().fg(Color::DarkGray),
            )
        };

        let block = Block::default()
            .title(" Search ")
            .borders(Borders::ALL)
            .border_style(if self.searching {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            });
        frame.render_widget(Paragraph::new(text).style(style).block(block), area);
    }

    fn render_tasks(&self, frame: &mut Frame, area: Rect) {
        let title = if self.loading {
            " Tasks (loading...) ".to_string()
        } else {
            format!(" Tasks ({}) ", self.tasks.len())
        };
        let block = Block::default().title(title).borders(Borders::ALL);

        if self.tasks.is_empty() {
            let text = if self.loading {
                "Loading tasks..."
            } else if self.active_query.is_some() {
                "No tasks match this search."
            } else {
                "No tasks yet. Press n to create one."
            };
            let paragraph = Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = self
            .tasks
            .iter()
            .map(|task| {
                let status = match task.last_status() {
                    Some(s) => Span::styled(s.display_name(), status_style(s)),
                    None => Span::styled("Never executed", Style::default().fg(Color::DarkGray)),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(&task.name, Style::default().bold()),
                    Span::styled(
                        format!(" ({})", task.owner),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw("  "),
                    Span::styled(&task.command, Style::default().fg(Color::Blue)),
                    Span::raw("  "),
                    status,
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
            .highlight_symbol("> ");

        let mut state = self.list_state.clone();
        frame.render_stateful_widget(list, area, &mut state);
    }
}

impl Default for ListScreen {
    fn default() -> Self {
        Self::new()
    }
}
