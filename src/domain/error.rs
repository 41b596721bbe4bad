//! Error types for domain validation and parsing.

use super::{BuddyRequestId, BuddyRequestStatus, TaskId, UserId};
use thiserror::Error;

/// Errors returned while mutating task aggregates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task's one-time completion reward was already recorded.
    #[error("xp already awarded for task {0}")]
    XpAlreadyAwarded(TaskId),
}

/// Errors returned while constructing or mutating buddy requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuddyDomainError {
    /// Sender and receiver are the same user.
    #[error("user {0} cannot send a buddy request to themselves")]
    SelfRequest(UserId),

    /// The request already left the pending state.
    #[error("buddy request {request_id} already resolved as {status}")]
    AlreadyResolved {
        /// Identifier of the resolved request.
        request_id: BuddyRequestId,
        /// Terminal status the request holds.
        status: BuddyRequestStatus,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing buddy request statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown buddy request status: {0}")]
pub struct ParseRequestStatusError(pub String);
