use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use taskdeck_core::task::{CreateTask, Task};
use taskdeck_service::ServiceError;

use crate::components::form::TaskForm;
use crate::components::Notice;

pub const CREATE_SUCCESS_MSG: &str = "Task saved successfully to database!";
pub const CREATE_FALLBACK_MSG: &str = "Something went wrong while saving the task.";

/// The task creation screen.
///
/// After a successful save the form resets and the created task (with its
/// server-assigned id) is shown in a panel; Ctrl+V opens its detail view.
pub struct CreateScreen {
    pub form: TaskForm,
    /// The most recently created task.
    pub saved: Option<Task>,
    pub notice: Option<Notice>,
    /// Generation of the in-flight submission. A completion under any
    /// other generation belongs to a screen the user already left.
    submit_gen: u64,
}

impl CreateScreen {
    pub fn new() -> Self {
        Self {
            form: TaskForm::new(),
            saved: None,
            notice: None,
            submit_gen: 0,
        }
    }

    /// Validates the form; on success marks it submitting under the given
    /// generation and hands back the payload to send. One submission per
    /// confirmation.
    pub fn submit(&mut self, generation: u64) -> Option<CreateTask> {
        if self.form.submitting || !self.form.validate() {
            return None;
        }
        self.form.submitting = true;
        self.submit_gen = generation;
        self.notice = None;
        Some(self.form.as_create())
    }

    pub fn finish_create(&mut self, generation: u64, result: Result<Task, ServiceError>) {
        if generation != self.submit_gen {
            return;
        }
        self.form.submitting = false;
        match result {
            Ok(task) => {
                self.saved = Some(task);
                self.form.reset();
                self.notice = Some(Notice::Success(CREATE_SUCCESS_MSG.to_string()));
            }
            Err(e) => {
                // Form keeps its values so the user can correct and retry.
                self.notice = Some(Notice::Error(e.user_message(CREATE_FALLBACK_MSG)));
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Min(0)])
            .split(area);

        let block = Block::default()
            .title(" New Task ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(layout[0]);
        frame.render_widget(block, layout[0]);
        self.form.render_fields(frame, inner);

        if let Some(task) = &self.saved {
            self.render_saved(frame, task, layout[1]);
        }
    }

    fn render_saved(&self, frame: &mut Frame, task: &Task, area: Rect) {
        let block = Block::default()
            .title(" Saved Task ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        let lines = vec![
            Line::from(vec![
                Span::styled("Id:      ", Style::default().fg(Color::DarkGray)),
                Span::raw(&task.id),
            ]),
            Line::from(vec![
                Span::styled("Name:    ", Style::default().fg(Color::DarkGray)),
                Span::styled(&task.name, Style::default().bold()),
            ]),
            Line::from(vec![
                Span::styled("Owner:   ", Style::default().fg(Color::DarkGray)),
                Span::raw(&task.owner),
            ]),
            Line::from(vec![
                Span::styled("Command: ", Style::default().fg(Color::DarkGray)),
                Span::styled(&task.command, Style::default().fg(Color::Blue)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "press Ctrl+V to view this task",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

impl Default for CreateScreen {
    fn default() -> Self {
        Self::new()
    }
}
