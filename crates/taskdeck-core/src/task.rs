use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::execution::{ExecutionStatus, TaskExecution};

pub const MAX_NAME_LEN: usize = 100;

/// A named, owned shell command plus its execution history.
///
/// The id is assigned by the server on creation and immutable after that.
/// `executions` is most-recent-first as returned by the service; the client
/// treats it as append-only and only ever replaces the whole list by
/// re-fetching the task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub command: String,
    #[serde(rename = "taskExecutions", default)]
    pub executions: Vec<TaskExecution>,
}

impl Task {
    /// Most recent execution, if the task has ever been run.
    pub fn last_execution(&self) -> Option<&TaskExecution> {
        self.executions.first()
    }

    pub fn last_status(&self) -> Option<ExecutionStatus> {
        self.last_execution().map(|e| e.status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub name: String,
    pub owner: String,
    pub command: String,
}

impl CreateTask {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, &self.owner, &self.command)
    }
}

/// Full replacement of the three mutable fields. The execution history is
/// never part of an update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTask {
    pub name: String,
    pub owner: String,
    pub command: String,
}

impl UpdateTask {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, &self.owner, &self.command)
    }
}

pub fn validate_fields(name: &str, owner: &str, command: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong);
    }
    if owner.trim().is_empty() {
        return Err(ValidationError::OwnerRequired);
    }
    if command.trim().is_empty() {
        return Err(ValidationError::CommandRequired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, owner: &str, command: &str) -> CreateTask {
        CreateTask {
            name: name.into(),
            owner: owner.into(),
            command: command.into(),
        }
    }

    #[test]
    fn valid_input_passes() {
        assert_eq!(input("Ping Test", "alice", "ping -c 1 localhost").validate(), Ok(()));
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert_eq!(
            input("", "alice", "ls").validate(),
            Err(ValidationError::NameRequired)
        );
        assert_eq!(
            input("  ", "alice", "ls").validate(),
            Err(ValidationError::NameRequired)
        );
        assert_eq!(
            input("a", "", "ls").validate(),
            Err(ValidationError::OwnerRequired)
        );
        assert_eq!(
            input("a", "alice", " ").validate(),
            Err(ValidationError::CommandRequired)
        );
    }

    #[test]
    fn name_length_limit() {
        let at_limit = "x".repeat(MAX_NAME_LEN);
        assert_eq!(input(&at_limit, "alice", "ls").validate(), Ok(()));

        let over = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            input(&over, "alice", "ls").validate(),
            Err(ValidationError::NameTooLong)
        );
    }

    #[test]
    fn task_decodes_wire_format() {
        let json = r#"{
            "id": "42",
            "name": "Ping Test",
            "owner": "alice",
            "command": "ping -c 1 localhost",
            "taskExecutions": []
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "42");
        assert!(task.executions.is_empty());
        assert!(task.last_execution().is_none());
    }
}
