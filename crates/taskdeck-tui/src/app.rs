use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use taskdeck_core::task::{CreateTask, UpdateTask};
use taskdeck_service::TaskService;
use tokio::sync::mpsc::UnboundedSender;

use crate::components::form::FormField;
use crate::create::CreateScreen;
use crate::detail::{DetailController, TaskSlot};
use crate::event::AppEvent;
use crate::list::ListScreen;

/// Delay between a confirmed delete and the automatic return to the list,
/// long enough to read the confirmation notice.
pub const NAV_DELAY: Duration = Duration::from_millis(1200);

pub enum Screen {
    List(ListScreen),
    Create(CreateScreen),
    Detail(DetailController),
}

/// Top-level application state.
///
/// Owns the current screen and the app-wide generation counter. Service
/// calls are spawned onto the runtime; each sends exactly one `AppEvent`
/// back through `tx`, and `apply` routes it to the screen that issued it.
/// Events addressed to a screen the user has already left are dropped.
pub struct App {
    service: Arc<dyn TaskService>,
    tx: UnboundedSender<AppEvent>,
    screen: Screen,
    next_gen: u64,
    should_quit: bool,
}

impl App {
    pub fn new(service: Arc<dyn TaskService>, tx: UnboundedSender<AppEvent>) -> Self {
        let mut app = Self {
            service,
            tx,
            screen: Screen::List(ListScreen::new()),
            next_gen: 0,
            should_quit: false,
        };
        app.enter_list();
        app
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn next_generation(&mut self) -> u64 {
        self.next_gen += 1;
        self.next_gen
    }

    // ---- navigation ----

    fn enter_list(&mut self) {
        let gen = self.next_generation();
        let mut list = ListScreen::new();
        list.begin_load(gen);
        self.screen = Screen::List(list);
        self.spawn_list(gen);
    }

    fn enter_create(&mut self) {
        self.screen = Screen::Create(CreateScreen::new());
    }

    fn enter_detail(&mut self, task_id: String) {
        let gen = self.next_generation();
        let mut detail = DetailController::new(task_id.clone());
        detail.begin_load(gen);
        self.screen = Screen::Detail(detail);
        self.spawn_detail_load(gen, task_id);
    }

    fn reload_detail(&mut self) {
        let gen = self.next_generation();
        let Screen::Detail(detail) = &mut self.screen else {
            return;
        };
        detail.begin_load(gen);
        let task_id = detail.task_id.clone();
        self.spawn_detail_load(gen, task_id);
    }

    // ---- spawned service calls ----

    fn spawn_list(&self, generation: u64) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = service.list_tasks().await;
            let _ = tx.send(AppEvent::TasksListed { generation, result });
        });
    }

    fn spawn_search(&self, generation: u64, query: String) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = service.find_by_name(&query).await;
            let _ = tx.send(AppEvent::SearchFinished {
                generation,
                query,
                result,
            });
        });
    }

    fn spawn_create(&self, generation: u64, input: CreateTask) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = service.create_task(&input).await;
            let _ = tx.send(AppEvent::TaskCreated { generation, result });
        });
    }

    fn spawn_detail_load(&self, generation: u64, task_id: String) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = service.get_task(&task_id).await;
            let _ = tx.send(AppEvent::TaskLoaded { generation, result });
        });
    }

    fn spawn_run(&self, task_id: String) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = service.run_task(&task_id).await;
            let _ = tx.send(AppEvent::RunFinished { task_id, result });
        });
    }

    fn spawn_update(&self, task_id: String, update: UpdateTask) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = service.update_task(&task_id, &update).await;
            let _ = tx.send(AppEvent::UpdateFinished { task_id, result });
        });
    }

    fn spawn_delete(&self, task_id: String) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = service.delete_task(&task_id).await;
            let _ = tx.send(AppEvent::DeleteFinished { task_id, result });
        });
    }

    fn spawn_delete_settle_timer(&self) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(NAV_DELAY).await;
            let _ = tx.send(AppEvent::DeleteSettled);
        });
    }

    // ---- key handling ----

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        match &mut self.screen {
            Screen::List(_) => self.handle_list_key(key),
            Screen::Create(_) => self.handle_create_key(key),
            Screen::Detail(_) => self.handle_detail_key(key),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        let Screen::List(list) = &mut self.screen else {
            return;
        };

        if list.searching {
            match key.code {
                KeyCode::Esc => list.cancel_search(),
                KeyCode::Enter => match list.submit_search() {
                    Some(query) => {
                        let gen = self.next_generation();
                        let Screen::List(list) = &mut self.screen else {
                            return;
                        };
                        list.begin_search(gen);
                        self.spawn_search(gen, query);
                    }
                    None => {
                        // Blank query restores the full set.
                        let gen = self.next_generation();
                        let Screen::List(list) = &mut self.screen else {
                            return;
                        };
                        list.begin_load(gen);
                        self.spawn_list(gen);
                    }
                },
                KeyCode::Backspace => {
                    list.query.pop();
                }
                KeyCode::Char(c) => list.query.push(c),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => list.select_next(),
            KeyCode::Char('k') | KeyCode::Up => list.select_prev(),
            KeyCode::Char('n') => self.enter_create(),
            KeyCode::Char('/') | KeyCode::Char('s') => list.open_search(),
            KeyCode::Char('r') => {
                let gen = self.next_generation();
                let Screen::List(list) = &mut self.screen else {
                    return;
                };
                list.begin_load(gen);
                self.spawn_list(gen);
            }
            KeyCode::Esc => {
                if list.active_query().is_some() {
                    let gen = self.next_generation();
                    let Screen::List(list) = &mut self.screen else {
                        return;
                    };
                    list.begin_load(gen);
                    self.spawn_list(gen);
                }
            }
            KeyCode::Enter => {
                if let Some(task) = list.selected_task() {
                    let id = task.id.clone();
                    self.enter_detail(id);
                }
            }
            _ => {}
        }
    }

    fn handle_create_key(&mut self, key: KeyEvent) {
        let Screen::Create(create) = &mut self.screen else {
            return;
        };

        if key.code == KeyCode::Char('v') && key.modifiers.contains(KeyModifiers::CONTROL) {
            if let Some(task) = &create.saved {
                let id = task.id.clone();
                self.enter_detail(id);
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.enter_list(),
            KeyCode::Tab => create.form.focus_next(),
            KeyCode::BackTab => create.form.focus_prev(),
            KeyCode::Backspace => create.form.backspace(),
            KeyCode::Enter => {
                if create.form.focus == FormField::Command {
                    let gen = self.next_generation();
                    let Screen::Create(create) = &mut self.screen else {
                        return;
                    };
                    if let Some(input) = create.submit(gen) {
                        self.spawn_create(gen, input);
                    }
                } else {
                    create.form.focus_next();
                }
            }
            KeyCode::Char(c) => create.form.input(c),
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        let Screen::Detail(detail) = &mut self.screen else {
            return;
        };

        // Update modal captures everything while open.
        if detail.update_form_mut().is_some() {
            match key.code {
                KeyCode::Esc => detail.close_update(),
                KeyCode::Tab => {
                    if let Some(form) = detail.update_form_mut() {
                        form.focus_next();
                    }
                }
                KeyCode::BackTab => {
                    if let Some(form) = detail.update_form_mut() {
                        form.focus_prev();
                    }
                }
                KeyCode::Backspace => {
                    if let Some(form) = detail.update_form_mut() {
                        form.backspace();
                    }
                }
                KeyCode::Enter => {
                    if let Some(update) = detail.submit_update() {
                        let task_id = detail.task_id.clone();
                        self.spawn_update(task_id, update);
                    }
                }
                KeyCode::Char(c) => {
                    if let Some(form) = detail.update_form_mut() {
                        form.input(c);
                    }
                }
                _ => {}
            }
            return;
        }

        // Delete confirmation: y confirms, anything else cancels.
        if detail.ready().is_some_and(|r| r.confirm_delete) {
            if key.code == KeyCode::Char('y') {
                if detail.confirm_delete() {
                    let task_id = detail.task_id.clone();
                    self.spawn_delete(task_id);
                }
            } else {
                detail.cancel_delete();
            }
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                if !matches!(detail.slot(), TaskSlot::Removed) {
                    self.enter_list();
                }
            }
            KeyCode::Char('r') => {
                if detail.begin_run() {
                    let task_id = detail.task_id.clone();
                    self.spawn_run(task_id);
                }
            }
            KeyCode::Char('e') => detail.open_update(),
            KeyCode::Char('d') => detail.request_delete(),
            KeyCode::Char('j') | KeyCode::Down => detail.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => detail.scroll_up(),
            _ => {}
        }
    }

    // ---- completion events ----

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::TasksListed { generation, result } => {
                if let Screen::List(list) = &mut self.screen {
                    list.finish_load(generation, result);
                }
            }
            AppEvent::SearchFinished {
                generation,
                query,
                result,
            } => {
                if let Screen::List(list) = &mut self.screen {
                    list.finish_search(generation, query, result);
                }
            }
            AppEvent::TaskCreated { generation, result } => {
                if let Screen::Create(create) = &mut self.screen {
                    create.finish_create(generation, result);
                }
            }
            AppEvent::TaskLoaded { generation, result } => {
                if let Screen::Detail(detail) = &mut self.screen {
                    detail.finish_load(generation, result);
                }
            }
            AppEvent::RunFinished { task_id, result } => {
                let Screen::Detail(detail) = &mut self.screen else {
                    return;
                };
                if detail.finish_run(&task_id, result) {
                    self.reload_detail();
                }
            }
            AppEvent::UpdateFinished { task_id, result } => {
                let Screen::Detail(detail) = &mut self.screen else {
                    return;
                };
                if detail.finish_update(&task_id, result) {
                    self.reload_detail();
                }
            }
            AppEvent::DeleteFinished { task_id, result } => {
                let Screen::Detail(detail) = &mut self.screen else {
                    return;
                };
                if detail.finish_delete(&task_id, result) {
                    self.spawn_delete_settle_timer();
                }
            }
            AppEvent::DeleteSettled => {
                if let Screen::Detail(detail) = &self.screen {
                    if matches!(detail.slot(), TaskSlot::Removed) {
                        self.enter_list();
                    }
                }
            }
        }
    }

    // ---- rendering ----

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_title_bar(frame, layout[0]);
        match &self.screen {
            Screen::List(list) => list.render(frame, layout[1]),
            Screen::Create(create) => create.render(frame, layout[1]),
            Screen::Detail(detail) => detail.render(frame, layout[1]),
        }
        self.render_status_bar(frame, layout[2]);
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let screen_name = match &self.screen {
            Screen::List(_) => "Tasks",
            Screen::Create(_) => "New Task",
            Screen::Detail(_) => "Task Detail",
        };
        let title = Line::from(vec![
            Span::styled(" taskdeck ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("| "),
            Span::styled(screen_name, Style::default().fg(Color::Yellow)),
        ]);
        frame.render_widget(title, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let notice = match &self.screen {
            Screen::List(list) => list.notice.as_ref(),
            Screen::Create(create) => create.notice.as_ref(),
            Screen::Detail(detail) => detail.notice.as_ref(),
        };
        if let Some(notice) = notice {
            let line = Line::from(Span::styled(
                format!(" {}", notice.text()),
                notice.style(),
            ));
            frame.render_widget(line, area);
            return;
        }

        let hints: Vec<(&str, &str)> = match &self.screen {
            Screen::List(list) if list.searching => {
                vec![("Enter", "search"), ("Esc", "cancel")]
            }
            Screen::List(_) => vec![
                ("q", "quit"),
                ("j/k", "nav"),
                ("Enter", "detail"),
                ("n", "new"),
                ("/", "search"),
                ("r", "refresh"),
            ],
            Screen::Create(create) => {
                let mut hints = vec![
                    ("Tab", "next field"),
                    ("Enter", "save"),
                    ("Esc", "back"),
                ];
                if create.saved.is_some() {
                    hints.push(("Ctrl+V", "view saved"));
                }
                hints
            }
            Screen::Detail(detail) => match detail.slot() {
                TaskSlot::Ready(r) if r.update_form.is_some() => {
                    vec![("Tab", "next field"), ("Enter", "save"), ("Esc", "cancel")]
                }
                TaskSlot::Ready(r) if r.confirm_delete => {
                    vec![("y", "confirm"), ("any", "cancel")]
                }
                TaskSlot::Ready(_) => vec![
                    ("r", "run"),
                    ("e", "edit"),
                    ("d", "del"),
                    ("j/k", "scroll"),
                    ("Esc", "back"),
                ],
                TaskSlot::Removed => vec![],
                _ => vec![("Esc", "back")],
            },
        };

        let spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(format!(" {key}"), Style::default().fg(Color::Yellow).bold()),
                    Span::raw(format!(" {desc} ")),
                ]
            })
            .collect();

        frame.render_widget(Line::from(spans), area);
    }
}
