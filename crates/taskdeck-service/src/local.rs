use async_trait::async_trait;
use chrono::Utc;
use taskdeck_core::execution::{ExecutionStatus, TaskExecution};
use taskdeck_core::task::{CreateTask, Task, UpdateTask};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{ServiceError, TaskService};

/// Command fragments the service refuses to run, mirroring the remote
/// server's safety validation so `--local` mode and the tests exercise the
/// same rejection path the real service has.
const UNSAFE_FRAGMENTS: &[&str] = &["rm ", "sudo ", "shutdown", "reboot", "mkfs", ";", "&&", "|"];

/// In-memory implementation of TaskService.
///
/// Backs `--local` mode and the test suite. Executions are synthesized
/// (commands are not actually run) but the observable contract matches the
/// remote service: server-assigned ids, validation on create/update,
/// most-recent-first execution history, unsafe commands rejected.
pub struct LocalService {
    tasks: Mutex<Vec<Task>>,
}

impl LocalService {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
        }
    }
}

impl Default for LocalService {
    fn default() -> Self {
        Self::new()
    }
}

fn unsafe_fragment(command: &str) -> Option<&'static str> {
    UNSAFE_FRAGMENTS
        .iter()
        .copied()
        .find(|frag| command.contains(frag))
}

#[async_trait]
impl TaskService for LocalService {
    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        Ok(self.tasks.lock().await.clone())
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Task>, ServiceError> {
        let needle = name.to_lowercase();
        Ok(self
            .tasks
            .lock()
            .await
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn get_task(&self, id: &str) -> Result<Task, ServiceError> {
        self.tasks
            .lock()
            .await
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("No task found with id {id}")))
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;
        let task = Task {
            id: Uuid::new_v4().to_string(),
            name: input.name.clone(),
            owner: input.owner.clone(),
            command: input.command.clone(),
            executions: Vec::new(),
        };
        self.tasks.lock().await.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &str, update: &UpdateTask) -> Result<Task, ServiceError> {
        update
            .validate()
            .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;
        let mut tasks = self.tasks.lock().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("No task found with id {id}")))?;
        task.name = update.name.clone();
        task.owner = update.owner.clone();
        task.command = update.command.clone();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &str) -> Result<(), ServiceError> {
        let mut tasks = self.tasks.lock().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(ServiceError::NotFound(format!("No task found with id {id}")));
        }
        Ok(())
    }

    async fn run_task(&self, id: &str) -> Result<TaskExecution, ServiceError> {
        let mut tasks = self.tasks.lock().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("No task found with id {id}")))?;

        if let Some(frag) = unsafe_fragment(&task.command) {
            return Err(ServiceError::InvalidInput(format!(
                "Command rejected as unsafe: contains '{}'",
                frag.trim()
            )));
        }

        let now = Utc::now();
        let execution = TaskExecution {
            start_time: now,
            end_time: now,
            output: format!("$ {}\n(simulated output)", task.command),
            status: ExecutionStatus::Success,
        };
        // Most-recent-first, matching the service's wire contract.
        task.executions.insert(0, execution.clone());
        Ok(execution)
    }
}
