use async_trait::async_trait;
use taskdeck_core::execution::TaskExecution;
use taskdeck_core::task::{CreateTask, Task, UpdateTask};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }

    /// The text shown to the user for this failure: the server-supplied
    /// message when there is one, otherwise the caller's fixed fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        let msg = match self {
            ServiceError::NotFound(m)
            | ServiceError::InvalidInput(m)
            | ServiceError::Internal(m) => m,
        };
        if msg.trim().is_empty() {
            fallback.to_string()
        } else {
            msg.clone()
        }
    }
}

/// Abstraction over the remote task-automation service.
///
/// The TUI programs against this trait. `HttpService` talks JSON-over-HTTP
/// to a running server; `LocalService` is an in-memory stand-in used by
/// `--local` mode and the tests.
///
/// Each method performs exactly one request: no retries here. Retry policy,
/// if any, belongs to the caller.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError>;
    async fn find_by_name(&self, name: &str) -> Result<Vec<Task>, ServiceError>;
    async fn get_task(&self, id: &str) -> Result<Task, ServiceError>;
    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError>;
    async fn update_task(&self, id: &str, update: &UpdateTask) -> Result<Task, ServiceError>;
    async fn delete_task(&self, id: &str) -> Result<(), ServiceError>;
    async fn run_task(&self, id: &str) -> Result<TaskExecution, ServiceError>;
}
