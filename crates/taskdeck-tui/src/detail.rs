use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use taskdeck_core::task::{Task, UpdateTask};
use taskdeck_service::ServiceError;
use tracing::debug;

use crate::components::form::TaskForm;
use crate::components::{centered_rect, status_style, Notice};

pub const NOT_FOUND_MSG: &str = "Task not found (404)";
pub const FETCH_FAILED_MSG: &str = "Failed to fetch task details";
pub const RUN_SUCCESS_MSG: &str = "Task executed successfully!";
pub const RUN_FALLBACK_MSG: &str = "Failed to run task. Command may be unsafe.";
pub const UPDATE_SUCCESS_MSG: &str = "Task updated successfully!";
pub const UPDATE_FALLBACK_MSG: &str = "Failed to update task";
pub const DELETE_SUCCESS_MSG: &str = "Task deleted successfully!";
pub const DELETE_FALLBACK_MSG: &str = "Failed to delete task.";

/// Why a task failed to load. The two cases give the user different
/// guidance: a missing task is gone (navigate away), a fetch failure is
/// worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFailure {
    NotFound,
    Fetch,
}

impl LoadFailure {
    pub fn message(self) -> &'static str {
        match self {
            LoadFailure::NotFound => NOT_FOUND_MSG,
            LoadFailure::Fetch => FETCH_FAILED_MSG,
        }
    }
}

/// Everything the detail screen holds while the task is present.
#[derive(Debug)]
pub struct ReadyTask {
    pub task: Task,
    /// An execution request is in flight.
    pub running: bool,
    /// A delete request is in flight; run and update are refused.
    pub deleting: bool,
    /// The delete confirmation dialog is showing.
    pub confirm_delete: bool,
    /// The update modal, when open.
    pub update_form: Option<TaskForm>,
}

impl ReadyTask {
    fn new(task: Task) -> Self {
        Self {
            task,
            running: false,
            deleting: false,
            confirm_delete: false,
            update_form: None,
        }
    }
}

/// The lifecycle state of the one task this screen owns. Exactly one
/// variant at a time; combinations like "deleted but still running" are
/// unrepresentable.
#[derive(Debug)]
pub enum TaskSlot {
    Loading,
    Failed(LoadFailure),
    Ready(ReadyTask),
    /// Deleted on the server. Every later completion event is ignored.
    Removed,
}

/// State machine for the task detail screen.
///
/// Does no I/O itself: `begin_*` methods report what the caller should
/// spawn, `finish_*` methods consume the completion events. The slot is
/// guarded by `load_gen`: only the most recently issued load may commit,
/// so a slow stale response can never clobber a fresher one. Mutation
/// completions are addressed by task id and ignored on mismatch.
pub struct DetailController {
    pub task_id: String,
    slot: TaskSlot,
    load_gen: u64,
    /// Output of the most recent run. Lives outside the slot so a reload
    /// does not wipe it.
    pub terminal_output: String,
    pub notice: Option<Notice>,
    pub output_scroll: u16,
}

impl DetailController {
    pub fn new(task_id: String) -> Self {
        Self {
            task_id,
            slot: TaskSlot::Loading,
            load_gen: 0,
            terminal_output: String::new(),
            notice: None,
            output_scroll: 0,
        }
    }

    pub fn slot(&self) -> &TaskSlot {
        &self.slot
    }

    pub fn ready(&self) -> Option<&ReadyTask> {
        match &self.slot {
            TaskSlot::Ready(r) => Some(r),
            _ => None,
        }
    }

    // ---- load ----

    pub fn begin_load(&mut self, generation: u64) {
        if matches!(self.slot, TaskSlot::Removed) {
            return;
        }
        self.load_gen = generation;
        self.slot = TaskSlot::Loading;
    }

    pub fn finish_load(&mut self, generation: u64, result: Result<Task, ServiceError>) {
        if generation != self.load_gen || matches!(self.slot, TaskSlot::Removed) {
            debug!(generation, current = self.load_gen, "stale load discarded");
            return;
        }
        self.slot = match result {
            Ok(task) => TaskSlot::Ready(ReadyTask::new(task)),
            Err(e) if e.is_not_found() => TaskSlot::Failed(LoadFailure::NotFound),
            Err(_) => TaskSlot::Failed(LoadFailure::Fetch),
        };
    }

    // ---- run ----

    /// Returns true if a run should be issued. Refused while another run
    /// or a delete is in flight; this is a mutual exclusion gate, not a
    /// queue.
    pub fn begin_run(&mut self) -> bool {
        let TaskSlot::Ready(r) = &mut self.slot else {
            return false;
        };
        if r.running || r.deleting {
            return false;
        }
        r.running = true;
        self.terminal_output.clear();
        self.output_scroll = 0;
        self.notice = None;
        true
    }

    /// Returns true when the task should be re-fetched (the server's
    /// execution history is authoritative; nothing is spliced locally).
    /// A completion addressed to a different task id is ignored: it belongs
    /// to a slot the user has already navigated away from.
    pub fn finish_run(
        &mut self,
        task_id: &str,
        result: Result<taskdeck_core::TaskExecution, ServiceError>,
    ) -> bool {
        if task_id != self.task_id {
            debug!(task_id, current = %self.task_id, "run completion for another task discarded");
            return false;
        }
        if matches!(self.slot, TaskSlot::Removed) {
            return false;
        }
        if let TaskSlot::Ready(r) = &mut self.slot {
            r.running = false;
        }
        match result {
            Ok(execution) => {
                self.terminal_output = execution.output;
                self.notice = Some(Notice::Success(RUN_SUCCESS_MSG.to_string()));
                true
            }
            Err(e) => {
                let msg = e.user_message(RUN_FALLBACK_MSG);
                self.terminal_output = msg.clone();
                self.notice = Some(Notice::Error(msg));
                false
            }
        }
    }

    // ---- update ----

    pub fn open_update(&mut self) {
        let TaskSlot::Ready(r) = &mut self.slot else {
            return;
        };
        if r.deleting || r.confirm_delete {
            return;
        }
        r.update_form = Some(TaskForm::prefilled(&r.task));
    }

    pub fn close_update(&mut self) {
        if let TaskSlot::Ready(r) = &mut self.slot {
            r.update_form = None;
        }
    }

    pub fn update_form_mut(&mut self) -> Option<&mut TaskForm> {
        match &mut self.slot {
            TaskSlot::Ready(r) => r.update_form.as_mut(),
            _ => None,
        }
    }

    /// Validates the open modal; on success marks it submitting and hands
    /// back the payload to send. On validation failure the modal stays
    /// open showing the field error.
    pub fn submit_update(&mut self) -> Option<UpdateTask> {
        let TaskSlot::Ready(r) = &mut self.slot else {
            return None;
        };
        if r.deleting {
            return None;
        }
        let form = r.update_form.as_mut()?;
        if form.submitting || !form.validate() {
            return None;
        }
        form.submitting = true;
        Some(form.as_update())
    }

    /// Returns true when the task should be re-fetched. Completions for
    /// another task id are ignored.
    pub fn finish_update(&mut self, task_id: &str, result: Result<Task, ServiceError>) -> bool {
        if task_id != self.task_id {
            debug!(task_id, current = %self.task_id, "update completion for another task discarded");
            return false;
        }
        let TaskSlot::Ready(r) = &mut self.slot else {
            return false;
        };
        match result {
            Ok(_) => {
                r.update_form = None;
                self.notice = Some(Notice::Success(UPDATE_SUCCESS_MSG.to_string()));
                true
            }
            Err(e) => {
                if let Some(form) = r.update_form.as_mut() {
                    form.submitting = false;
                }
                self.notice = Some(Notice::Error(e.user_message(UPDATE_FALLBACK_MSG)));
                false
            }
        }
    }

    // ---- delete ----

    pub fn request_delete(&mut self) {
        let TaskSlot::Ready(r) = &mut self.slot else {
            return;
        };
        if r.deleting || r.update_form.is_some() {
            return;
        }
        r.confirm_delete = true;
    }

    pub fn cancel_delete(&mut self) {
        if let TaskSlot::Ready(r) = &mut self.slot {
            r.confirm_delete = false;
        }
    }

    /// Returns true if the delete should be issued.
    pub fn confirm_delete(&mut self) -> bool {
        let TaskSlot::Ready(r) = &mut self.slot else {
            return false;
        };
        if !r.confirm_delete || r.deleting {
            return false;
        }
        r.confirm_delete = false;
        r.deleting = true;
        true
    }

    /// Returns true when the task is gone and the app should schedule
    /// navigation back to the list. Completions for another task id are
    /// ignored: a slow delete of an abandoned task must not remove this one.
    pub fn finish_delete(&mut self, task_id: &str, result: Result<(), ServiceError>) -> bool {
        if task_id != self.task_id {
            debug!(task_id, current = %self.task_id, "delete completion for another task discarded");
            return false;
        }
        let TaskSlot::Ready(r) = &mut self.slot else {
            return false;
        };
        match result {
            Ok(()) => {
                self.slot = TaskSlot::Removed;
                self.notice = Some(Notice::Success(DELETE_SUCCESS_MSG.to_string()));
                true
            }
            Err(e) => {
                r.deleting = false;
                self.notice = Some(Notice::Error(e.user_message(DELETE_FALLBACK_MSG)));
                false
            }
        }
    }

    // ---- scrolling ----

    pub fn scroll_down(&mut self) {
        self.output_scroll = self.output_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.output_scroll = self.output_scroll.saturating_sub(1);
    }

    // ---- rendering ----

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        match &self.slot {
            TaskSlot::Loading => self.render_message(frame, "Loading task...", Color::Yellow, area),
            TaskSlot::Failed(failure) => {
                self.render_message(frame, failure.message(), Color::Red, area)
            }
            TaskSlot::Removed => {
                self.render_message(frame, "Returning to task list...", Color::Green, area)
            }
            TaskSlot::Ready(r) => {
                self.render_ready(frame, r, area);
                if r.confirm_delete {
                    self.render_confirm_delete(frame, &r.task, area);
                }
                if let Some(form) = &r.update_form {
                    self.render_update_modal(frame, form, area);
                }
            }
        }
    }

    fn render_message(&self, frame: &mut Frame, text: &str, color: Color, area: Rect) {
        let block = Block::default()
            .title(" Task Detail ")
            .borders(Borders::ALL);
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(color))
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn render_ready(&self, frame: &mut Frame, r: &ReadyTask, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Min(4),
                Constraint::Percentage(40),
            ])
            .split(area);

        self.render_info(frame, r, layout[0]);
        self.render_history(frame, &r.task, layout[1]);
        self.render_output(frame, r, layout[2]);
    }

    fn render_info(&self, frame: &mut Frame, r: &ReadyTask, area: Rect) {
        let block = Block::default()
            .title(format!(" {} ", r.task.name))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let status = if r.running {
            Span::styled("running...", Style::default().fg(Color::Yellow))
        } else if r.deleting {
            Span::styled("deleting...", Style::default().fg(Color::Red))
        } else {
            match r.task.last_status() {
                Some(s) => Span::styled(s.display_name(), status_style(s)),
                None => Span::styled("Never executed", Style::default().fg(Color::DarkGray)),
            }
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("Id:      ", Style::default().fg(Color::DarkGray)),
                Span::raw(&r.task.id),
            ]),
            Line::from(vec![
                Span::styled("Owner:   ", Style::default().fg(Color::DarkGray)),
                Span::raw(&r.task.owner),
            ]),
            Line::from(vec![
                Span::styled("Command: ", Style::default().fg(Color::DarkGray)),
                Span::styled(&r.task.command, Style::default().fg(Color::Blue)),
            ]),
            Line::from(vec![
                Span::styled("Status:  ", Style::default().fg(Color::DarkGray)),
                status,
            ]),
        ];

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_history(&self, frame: &mut Frame, task: &Task, area: Rect) {
        let block = Block::default()
            .title(format!(" Executions ({}) ", task.executions.len()))
            .borders(Borders::ALL);

        if task.executions.is_empty() {
            let paragraph = Paragraph::new("No executions yet. Press r to run this task.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let lines: Vec<Line> = task
            .executions
            .iter()
            .map(|exec| {
                Line::from(vec![
                    Span::styled(
                        exec.start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw("  "),
                    Span::styled(exec.status.display_name(), status_style(exec.status)),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_output(&self, frame: &mut Frame, r: &ReadyTask, area: Rect) {
        let block = Block::default()
            .title(" Output ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        let text = if r.running {
            "Running..."
        } else if self.terminal_output.is_empty() {
            "(no output)"
        } else {
            &self.terminal_output
        };

        let paragraph = Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.output_scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn render_confirm_delete(&self, frame: &mut Frame, task: &Task, area: Rect) {
        let popup = centered_rect(50, 20, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Confirm Delete ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));

        let text = format!("Delete \"{}\"?\n\n(y)es / (any key) cancel", task.name);
        let paragraph = Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: false })
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, popup);
    }

    fn render_update_modal(&self, frame: &mut Frame, form: &TaskForm, area: Rect) {
        let popup = centered_rect(60, 45, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Update Task ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));

        let inner = block.inner(popup);
        frame.render_widget(block, popup);
        form.render_fields(frame, inner);
    }
}
