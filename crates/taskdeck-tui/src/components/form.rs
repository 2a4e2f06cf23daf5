use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use taskdeck_core::error::ValidationError;
use taskdeck_core::task::{validate_fields, CreateTask, Task, UpdateTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Owner,
    Command,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Name => FormField::Owner,
            FormField::Owner => FormField::Command,
            FormField::Command => FormField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Name => FormField::Command,
            FormField::Owner => FormField::Name,
            FormField::Command => FormField::Owner,
        }
    }

    fn label(self) -> &'static str {
        match self {
            FormField::Name => "Name:    ",
            FormField::Owner => "Owner:   ",
            FormField::Command => "Command: ",
        }
    }
}

/// Three-field task form shared by the create screen and the detail
/// screen's update modal.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub name: String,
    pub owner: String,
    pub command: String,
    pub focus: FormField,
    pub error: Option<ValidationError>,
    /// Set while a submission is in flight; blocks a second Enter.
    pub submitting: bool,
}

impl TaskForm {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            owner: String::new(),
            command: String::new(),
            focus: FormField::Name,
            error: None,
            submitting: false,
        }
    }

    pub fn prefilled(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            owner: task.owner.clone(),
            command: task.command.clone(),
            focus: FormField::Name,
            error: None,
            submitting: false,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    fn focused_field(&mut self) -> &mut String {
        match self.focus {
            FormField::Name => &mut self.name,
            FormField::Owner => &mut self.owner,
            FormField::Command => &mut self.command,
        }
    }

    pub fn input(&mut self, c: char) {
        self.error = None;
        self.focused_field().push(c);
    }

    pub fn backspace(&mut self) {
        self.error = None;
        self.focused_field().pop();
    }

    /// Validates in place; on failure records the first field error and
    /// returns false so the form stays open.
    pub fn validate(&mut self) -> bool {
        match validate_fields(&self.name, &self.owner, &self.command) {
            Ok(()) => {
                self.error = None;
                true
            }
            Err(e) => {
                self.error = Some(e);
                false
            }
        }
    }

    pub fn as_create(&self) -> CreateTask {
        CreateTask {
            name: self.name.trim().to_string(),
            owner: self.owner.trim().to_string(),
            command: self.command.trim().to_string(),
        }
    }

    pub fn as_update(&self) -> UpdateTask {
        UpdateTask {
            name: self.name.trim().to_string(),
            owner: self.owner.trim().to_string(),
            command: self.command.trim().to_string(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Renders the three field lines plus an error/status line into `area`.
    /// The caller draws its own surrounding block or popup.
    pub fn render_fields(&self, frame: &mut Frame, area: Rect) {
        let field_line = |field: FormField, value: &str| -> Line {
            let label_style = if field == self.focus {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default()
            };
            let cursor = if field == self.focus { "_" } else { "" };
            Line::from(vec![
                Span::styled(field.label(), label_style),
                Span::raw(value.to_string()),
                Span::styled(cursor, Style::default().fg(Color::Cyan)),
            ])
        };

        let mut lines = vec![
            field_line(FormField::Name, &self.name),
            Line::from(""),
            field_line(FormField::Owner, &self.owner),
            Line::from(""),
            field_line(FormField::Command, &self.command),
        ];

        if let Some(err) = self.error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                err.to_string(),
                Style::default().fg(Color::Red),
            )));
        } else if self.submitting {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Saving...",
                Style::default().fg(Color::Yellow),
            )));
        }

        frame.render_widget(Paragraph::new(lines), area);
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}
