//! Task assignment and status-transition orchestration.
//!
//! [`TaskService::update_task_status`] is the only code path that grants
//! task-completion XP. It evaluates the award gate against the task state
//! loaded from the store, applies the mutation to both aggregates, and
//! persists them through one atomic store commit.

use crate::domain::{
    Task, TaskDetails, TaskId, TaskStatus, User, UserId,
    progression::{self, TASK_COMPLETION_XP},
};
use crate::ports::{TaskStore, UserStore};
use crate::services::{ServiceError, ServiceResult};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// Requested change to a task's status and/or notes.
///
/// Absent fields are left untouched on the task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChange {
    status: Option<TaskStatus>,
    notes: Option<String>,
}

impl TaskChange {
    /// Creates an empty change.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: None,
            notes: None,
        }
    }

    /// Requests a status change.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Requests a notes change.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Result of a status update, reported to the caller for UI feedback.
///
/// `xp_earned` and `is_first_completion` are derived from the transition;
/// they are not persisted separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatusOutcome {
    /// The task after the update.
    pub task: Task,
    /// XP granted by this call: the completion reward or zero.
    pub xp_earned: u64,
    /// Whether this call recorded the task's first completion.
    pub is_first_completion: bool,
}

/// Task orchestration service.
#[derive(Clone)]
pub struct TaskService<S, C>
where
    S: TaskStore + UserStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> TaskService<S, C>
where
    S: TaskStore + UserStore,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Creates a task assigned by `creator` to one of their buddies.
    ///
    /// The task and the assigner's reward (assignment XP and counter) are
    /// persisted in one atomic commit.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::UserNotFound`] when the creator is absent,
    /// [`ServiceError::NotBuddies`] when the assignee is not in the
    /// creator's buddy set, or a store error when persistence fails.
    pub async fn create_task(
        &self,
        creator_id: UserId,
        assignee_id: UserId,
        details: TaskDetails,
    ) -> ServiceResult<Task> {
        let mut creator = self.find_user(creator_id).await?;
        if !creator.is_buddy(assignee_id) {
            return Err(ServiceError::NotBuddies {
                assigner: creator_id,
                assignee: assignee_id,
            });
        }

        let task = Task::new(creator_id, assignee_id, details, &*self.clock);
        creator.record_task_assignment();
        self.store.commit_task_creation(&task, &creator).await?;
        debug!(task = %task.id(), assigner = %creator_id, assignee = %assignee_id, "task created");
        Ok(task)
    }

    /// Applies a status/notes change as the acting user.
    ///
    /// Only the assignee may change a task. On the first transition into
    /// [`TaskStatus::Completed`] the assignee earns the completion XP and
    /// the task records the reward; both records are persisted in one
    /// atomic commit guarded by a compare-and-set on the reward flag.
    /// Later re-completions only increment the completion counter, and a
    /// repeated completed-to-completed call is not a transition at all.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::TaskNotFound`] or
    /// [`ServiceError::UserNotFound`] when a record is absent,
    /// [`ServiceError::NotAssignee`] when the actor is not the assignee,
    /// or a store error when the commit fails (including the concurrent
    /// completion conflict).
    pub async fn update_task_status(
        &self,
        task_id: TaskId,
        acting_user: UserId,
        change: TaskChange,
    ) -> ServiceResult<TaskStatusOutcome> {
        let mut task = self
            .store
            .find_task(task_id)
            .await?
            .ok_or(ServiceError::TaskNotFound(task_id))?;
        if task.assigned_to() != acting_user {
            return Err(ServiceError::NotAssignee {
                actor: acting_user,
                task: task_id,
            });
        }

        let previous_status = task.status();
        let new_status = change.status.unwrap_or(previous_status);
        // The award gate looks at the task as loaded, before mutation.
        let awards_xp = progression::should_award_xp(&task, new_status);

        if let Some(status) = change.status {
            task.set_status(status);
        }
        if let Some(notes) = change.notes {
            task.set_notes(notes);
        }

        if awards_xp {
            let mut assignee = self.find_user(acting_user).await?;
            assignee.record_task_completion();
            task.record_first_completion(&*self.clock)?;
            self.store.commit_task_update(&task, Some(&assignee)).await?;
            info!(
                task = %task_id,
                user = %acting_user,
                xp = TASK_COMPLETION_XP,
                level = assignee.level(),
                "completion xp awarded"
            );
        } else {
            let re_entered_completed = new_status == TaskStatus::Completed
                && previous_status != TaskStatus::Completed
                && task.xp_awarded();
            if re_entered_completed {
                task.record_recompletion();
                debug!(task = %task_id, count = task.completion_count(), "task re-completed");
            }
            self.store.commit_task_update(&task, None).await?;
        }

        Ok(TaskStatusOutcome {
            xp_earned: if awards_xp { TASK_COMPLETION_XP } else { 0 },
            is_first_completion: awards_xp,
            task,
        })
    }

    /// Deletes a task as either of its participants.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::TaskNotFound`] when the task is absent or
    /// [`ServiceError::NotTaskParticipant`] when the actor is neither the
    /// assigner nor the assignee.
    pub async fn delete_task(&self, task_id: TaskId, acting_user: UserId) -> ServiceResult<()> {
        let task = self
            .store
            .find_task(task_id)
            .await?
            .ok_or(ServiceError::TaskNotFound(task_id))?;
        if task.assigned_by() != acting_user && task.assigned_to() != acting_user {
            return Err(ServiceError::NotTaskParticipant {
                actor: acting_user,
                task: task_id,
            });
        }
        self.store.delete_task(task_id).await?;
        Ok(())
    }

    /// Returns tasks assigned to the user, newest first.
    ///
    /// # Errors
    ///
    /// Returns a store error when the lookup fails.
    pub async fn tasks_for_assignee(&self, user_id: UserId) -> ServiceResult<Vec<Task>> {
        Ok(self.store.tasks_for_assignee(user_id).await?)
    }

    /// Returns tasks assigned by the user, newest first.
    ///
    /// # Errors
    ///
    /// Returns a store error when the lookup fails.
    pub async fn tasks_assigned_by(&self, user_id: UserId) -> ServiceResult<Vec<Task>> {
        Ok(self.store.tasks_assigned_by(user_id).await?)
    }

    async fn find_user(&self, id: UserId) -> ServiceResult<User> {
        self.store
            .find_user(id)
            .await?
            .ok_or(ServiceError::UserNotFound(id))
    }
}
