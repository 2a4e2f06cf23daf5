use thiserror::Error;

use crate::task::MAX_NAME_LEN;

/// Client-side field validation, checked before a create or update is
/// submitted so obviously bad input never costs a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a task name")]
    NameRequired,

    #[error("Task name cannot exceed {MAX_NAME_LEN} characters")]
    NameTooLong,

    #[error("Please enter owner name")]
    OwnerRequired,

    #[error("Please enter command")]
    CommandRequired,
}
