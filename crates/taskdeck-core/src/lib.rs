pub mod error;
pub mod execution;
pub mod task;

pub use error::ValidationError;
pub use execution::{ExecutionStatus, TaskExecution};
pub use task::{CreateTask, Task, UpdateTask, MAX_NAME_LEN};
