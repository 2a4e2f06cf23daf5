pub mod form;

use ratatui::prelude::*;

/// Transient per-screen status message, cleared on the next action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Success(s) | Notice::Error(s) => s,
        }
    }

    pub fn style(&self) -> Style {
        match self {
            Notice::Success(_) => Style::default().fg(Color::Green),
            Notice::Error(_) => Style::default().fg(Color::Red),
        }
    }
}

pub fn status_style(s: taskdeck_core::ExecutionStatus) -> Style {
    use taskdeck_core::ExecutionStatus;
    match s {
        ExecutionStatus::Success => Style::default().fg(Color::Green),
        ExecutionStatus::Failed => Style::default().fg(Color::Red),
        ExecutionStatus::Running => Style::default().fg(Color::Yellow),
        ExecutionStatus::Unknown => Style::default().fg(Color::DarkGray),
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
