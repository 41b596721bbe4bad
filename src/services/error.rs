//! Service-level error taxonomy.

use crate::domain::{
    BuddyDomainError, BuddyRequestId, BuddyRequestStatus, TaskDomainError, TaskId, UserId,
};
use crate::ports::StoreError;
use thiserror::Error;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Transport-facing classification of a service failure.
///
/// The request layer maps these onto its own response vocabulary; the
/// core never retries and never leaves partial effects behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced entity is absent.
    NotFound,
    /// The actor lacks rights over the entity.
    Forbidden,
    /// The operation violates a state invariant.
    Conflict,
    /// The request is malformed.
    InvalidOperation,
    /// The backing store failed.
    Internal,
}

/// Errors returned by the task, buddy, and user services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The buddy request does not exist.
    #[error("buddy request not found: {0}")]
    RequestNotFound(BuddyRequestId),

    /// Only the assignee may change a task's status or notes.
    #[error("user {actor} is not the assignee of task {task}")]
    NotAssignee {
        /// Acting user.
        actor: UserId,
        /// Task being modified.
        task: TaskId,
    },

    /// Only the assigner or the assignee may delete a task.
    #[error("user {actor} is neither assigner nor assignee of task {task}")]
    NotTaskParticipant {
        /// Acting user.
        actor: UserId,
        /// Task being deleted.
        task: TaskId,
    },

    /// Only the receiver may accept or reject a request.
    #[error("user {actor} is not the receiver of buddy request {request}")]
    NotReceiver {
        /// Acting user.
        actor: UserId,
        /// Request being resolved.
        request: BuddyRequestId,
    },

    /// Only the sender may cancel a request.
    #[error("user {actor} is not the sender of buddy request {request}")]
    NotSender {
        /// Acting user.
        actor: UserId,
        /// Request being cancelled.
        request: BuddyRequestId,
    },

    /// Tasks may only be assigned to buddies.
    #[error("user {assignee} is not a buddy of {assigner}")]
    NotBuddies {
        /// Task creator.
        assigner: UserId,
        /// Intended assignee.
        assignee: UserId,
    },

    /// The two users are already buddies.
    #[error("users {0} and {1} are already buddies")]
    AlreadyBuddies(UserId, UserId),

    /// A pending request already exists between the pair, in either
    /// direction.
    #[error("a pending buddy request already exists between {0} and {1}")]
    PendingRequestExists(UserId, UserId),

    /// The request already left the pending state.
    #[error("buddy request {request} already resolved as {status}")]
    RequestResolved {
        /// Resolved request.
        request: BuddyRequestId,
        /// Terminal status it holds.
        status: BuddyRequestStatus,
    },

    /// A user tried to befriend themselves.
    #[error("user {0} cannot send a buddy request to themselves")]
    SelfRequest(UserId),

    /// Task domain invariant violation.
    #[error(transparent)]
    TaskDomain(#[from] TaskDomainError),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<BuddyDomainError> for ServiceError {
    fn from(err: BuddyDomainError) -> Self {
        match err {
            BuddyDomainError::SelfRequest(user) => Self::SelfRequest(user),
            BuddyDomainError::AlreadyResolved { request_id, status } => Self::RequestResolved {
                request: request_id,
                status,
            },
        }
    }
}

impl ServiceError {
    /// Classifies the error into the transport-facing taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::TaskNotFound(_) | Self::UserNotFound(_) | Self::RequestNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::NotAssignee { .. }
            | Self::NotTaskParticipant { .. }
            | Self::NotReceiver { .. }
            | Self::NotSender { .. }
            | Self::NotBuddies { .. } => ErrorKind::Forbidden,
            Self::AlreadyBuddies(_, _)
            | Self::PendingRequestExists(_, _)
            | Self::RequestResolved { .. }
            | Self::TaskDomain(_) => ErrorKind::Conflict,
            Self::SelfRequest(_) => ErrorKind::InvalidOperation,
            Self::Store(err) => match err {
                StoreError::DuplicatePendingRequest { .. }
                | StoreError::CompletionConflict(_)
                | StoreError::ResolutionConflict(_) => ErrorKind::Conflict,
                StoreError::UserNotFound(_)
                | StoreError::TaskNotFound(_)
                | StoreError::RequestNotFound(_) => ErrorKind::NotFound,
                StoreError::DuplicateUser(_)
                | StoreError::DuplicateTask(_)
                | StoreError::DuplicateRequest(_)
                | StoreError::Persistence(_) => ErrorKind::Internal,
            },
        }
    }
}
