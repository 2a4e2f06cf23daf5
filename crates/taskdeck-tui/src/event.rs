use taskdeck_core::execution::TaskExecution;
use taskdeck_core::task::Task;
use taskdeck_service::ServiceError;

/// Completion events sent back to the UI loop by spawned service calls.
///
/// Each spawned call sends exactly one of these, addressed to the state
/// that issued it: loads carry the generation they were issued under, and
/// mutations carry the id of the task they were issued for. The receiving
/// screen discards any event whose address no longer matches, so a slow
/// response can neither clobber a fresher one nor land on a task the user
/// has navigated to since.
#[derive(Debug)]
pub enum AppEvent {
    TasksListed {
        generation: u64,
        result: Result<Vec<Task>, ServiceError>,
    },
    SearchFinished {
        generation: u64,
        query: String,
        result: Result<Vec<Task>, ServiceError>,
    },
    TaskCreated {
        generation: u64,
        result: Result<Task, ServiceError>,
    },
    TaskLoaded {
        generation: u64,
        result: Result<Task, ServiceError>,
    },
    RunFinished {
        task_id: String,
        result: Result<TaskExecution, ServiceError>,
    },
    UpdateFinished {
        task_id: String,
        result: Result<Task, ServiceError>,
    },
    DeleteFinished {
        task_id: String,
        result: Result<(), ServiceError>,
    },
    /// Fired by the timer spawned after a successful delete; the app
    /// navigates back to the list when it arrives.
    DeleteSettled,
}
