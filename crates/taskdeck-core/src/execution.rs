use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome tag of a single execution, as reported by the service.
///
/// The service may grow new in-progress tags over time; anything we do not
/// recognise deserialises to `Unknown` instead of failing decode, and is
/// never treated as terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Success,
    Failed,
    Running,
    #[serde(other)]
    Unknown,
}

impl ExecutionStatus {
    /// Only SUCCESS and FAILED are final outcomes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Success | ExecutionStatus::Failed)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ExecutionStatus::Success => "SUCCESS",
            ExecutionStatus::Failed => "FAILED",
            ExecutionStatus::Running => "RUNNING",
            ExecutionStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One immutable record of a past run. Produced by the server in response to
/// a run request; the client never edits one, it only re-fetches the owning
/// task to pick up the authoritative list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskExecution {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub output: String,
    pub status: ExecutionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(ExecutionStatus::Success.is_terminal());
        assert!(ExecutionStatus::Failed.is_terminal());
        assert!(!ExecutionStatus::Running.is_terminal());
        assert!(!ExecutionStatus::Unknown.is_terminal());
    }

    #[test]
    fn decodes_camel_case_wire_format() {
        let json = r#"{
            "startTime": "2024-05-01T10:00:00Z",
            "endTime": "2024-05-01T10:00:02Z",
            "output": "PONG",
            "status": "SUCCESS"
        }"#;
        let exec: TaskExecution = serde_json::from_str(json).unwrap();
        assert_eq!(exec.status, ExecutionStatus::Success);
        assert_eq!(exec.output, "PONG");
        assert!(exec.end_time >= exec.start_time);
    }

    #[test]
    fn unrecognised_status_is_unknown_not_an_error() {
        let json = r#"{
            "startTime": "2024-05-01T10:00:00Z",
            "endTime": "2024-05-01T10:00:00Z",
            "output": "",
            "status": "QUEUED"
        }"#;
        let exec: TaskExecution = serde_json::from_str(json).unwrap();
        assert_eq!(exec.status, ExecutionStatus::Unknown);
        assert!(!exec.status.is_terminal());
    }
}
