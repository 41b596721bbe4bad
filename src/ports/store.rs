//! Store contracts for users, tasks, and buddy requests.
//!
//! The composite `commit_*` and `*_pair` methods are the transactional
//! seams of the crate: each one must apply every write it names or none
//! of them. A relational, document, or CAS-capable KV store can all
//! satisfy that contract.

use crate::domain::{BuddyRequest, BuddyRequestId, Task, TaskId, User, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// User persistence contract.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateUser`] when the ID already exists.
    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    /// Finds a user by identifier. Returns `None` when absent.
    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Persists changes to an existing user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UserNotFound`] when the user does not exist.
    async fn update_user(&self, user: &User) -> StoreResult<()>;

    /// Atomically persists two users, both or neither.
    ///
    /// Used for symmetric buddy-list changes, where a one-sided write
    /// would corrupt the mutual-buddy invariant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UserNotFound`] when either user is missing;
    /// neither is written in that case.
    async fn update_user_pair(&self, first: &User, second: &User) -> StoreResult<()>;
}

/// Task persistence contract.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Atomically stores a new task together with the assigner's updated
    /// record (assignment XP and counters).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateTask`] when the task ID already
    /// exists or [`StoreError::UserNotFound`] when the assigner is
    /// missing.
    async fn commit_task_creation(&self, task: &Task, assigner: &User) -> StoreResult<()>;

    /// Finds a task by identifier. Returns `None` when absent.
    async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>>;

    /// Atomically persists a task update and, when present, the
    /// assignee's updated record.
    ///
    /// When `assignee` is supplied the update is a first completion; the
    /// store must then verify that the persisted task has not already had
    /// its reward recorded, serializing racing completions. Every commit,
    /// with or without an assignee, must also refuse a write that would
    /// roll back recorded reward bookkeeping (`xp_awarded`,
    /// `completion_count`): a copy loaded before a completion committed is
    /// stale and must be reloaded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] or [`StoreError::UserNotFound`]
    /// when a referenced record is missing, or
    /// [`StoreError::CompletionConflict`] when a concurrent writer won the
    /// reward race or the update would regress recorded reward state.
    /// Nothing is written on failure.
    async fn commit_task_update(&self, task: &Task, assignee: Option<&User>) -> StoreResult<()>;

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] when absent.
    async fn delete_task(&self, id: TaskId) -> StoreResult<()>;

    /// Returns tasks assigned to the user, newest first.
    async fn tasks_for_assignee(&self, user: UserId) -> StoreResult<Vec<Task>>;

    /// Returns tasks assigned by the user, newest first.
    async fn tasks_assigned_by(&self, user: UserId) -> StoreResult<Vec<Task>>;
}

/// Buddy request persistence contract.
#[async_trait]
pub trait BuddyRequestStore: Send + Sync {
    /// Stores a new request.
    ///
    /// The store enforces at most one pending request per unordered user
    /// pair, regardless of direction, exactly like a partial unique index
    /// on `(sender, receiver, status = pending)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicatePendingRequest`] on a uniqueness
    /// violation or [`StoreError::DuplicateRequest`] when the ID already
    /// exists.
    async fn insert_request(&self, request: &BuddyRequest) -> StoreResult<()>;

    /// Finds a request by identifier. Returns `None` when absent.
    async fn find_request(&self, id: BuddyRequestId) -> StoreResult<Option<BuddyRequest>>;

    /// Returns whether a pending request exists between the two users in
    /// either direction.
    async fn has_pending_between(&self, first: UserId, second: UserId) -> StoreResult<bool>;

    /// Persists changes to an existing request.
    ///
    /// Only a request that is still pending in the store may be written;
    /// resolved requests are immutable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RequestNotFound`] when absent, or
    /// [`StoreError::ResolutionConflict`] when a concurrent writer already
    /// resolved the stored request.
    async fn update_request(&self, request: &BuddyRequest) -> StoreResult<()>;

    /// Deletes a request.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RequestNotFound`] when absent.
    async fn delete_request(&self, id: BuddyRequestId) -> StoreResult<()>;

    /// Atomically persists an accepted request together with both updated
    /// users, all three or none.
    ///
    /// The stored request must still be pending; resolved requests are
    /// immutable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RequestNotFound`] or
    /// [`StoreError::UserNotFound`] when a referenced record is missing,
    /// or [`StoreError::ResolutionConflict`] when a concurrent writer
    /// already resolved the stored request; nothing is written in any of
    /// those cases.
    async fn commit_acceptance(
        &self,
        request: &BuddyRequest,
        sender: &User,
        receiver: &User,
    ) -> StoreResult<()>;

    /// Returns pending requests addressed to the user, newest first.
    async fn pending_requests_for(&self, receiver: UserId) -> StoreResult<Vec<BuddyRequest>>;

    /// Returns pending requests sent by the user, newest first.
    async fn pending_requests_from(&self, sender: UserId) -> StoreResult<Vec<BuddyRequest>>;
}

/// Errors returned by store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A user with the same identifier already exists.
    #[error("duplicate user identifier: {0}")]
    DuplicateUser(UserId),

    /// The user was not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A request with the same identifier already exists.
    #[error("duplicate buddy request identifier: {0}")]
    DuplicateRequest(BuddyRequestId),

    /// The buddy request was not found.
    #[error("buddy request not found: {0}")]
    RequestNotFound(BuddyRequestId),

    /// A pending request already exists between the pair.
    #[error("pending buddy request already exists between {sender} and {receiver}")]
    DuplicatePendingRequest {
        /// Sender of the rejected insert.
        sender: UserId,
        /// Receiver of the rejected insert.
        receiver: UserId,
    },

    /// A concurrent writer already recorded the task's completion reward.
    #[error("completion reward already recorded for task {0}")]
    CompletionConflict(TaskId),

    /// A concurrent writer already resolved the buddy request.
    #[error("buddy request {0} already resolved")]
    ResolutionConflict(BuddyRequestId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
