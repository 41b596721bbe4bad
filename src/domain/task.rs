//! Task aggregate root and its status lifecycle.

use super::{ParseTaskStatusError, TaskDomainError, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task status lifecycle.
///
/// Serialized forms match the persisted wire strings, which contain
/// spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Work has not been done yet.
    #[serde(rename = "not completed")]
    NotCompleted,
    /// The assignee has read the linked material without completing it.
    #[serde(rename = "mark as read")]
    MarkAsRead,
    /// The task is done; first entry into this status awards XP.
    #[serde(rename = "completed")]
    Completed,
    /// The assigner asked for another pass.
    #[serde(rename = "need revision")]
    NeedRevision,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotCompleted => "not completed",
            Self::MarkAsRead => "mark as read",
            Self::Completed => "completed",
            Self::NeedRevision => "need revision",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "not completed" => Ok(Self::NotCompleted),
            "mark as read" => Ok(Self::MarkAsRead),
            "completed" => Ok(Self::Completed),
            "need revision" => Ok(Self::NeedRevision),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Descriptive fields supplied when creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetails {
    title: String,
    link: String,
    category: String,
    notes: String,
}

impl TaskDetails {
    /// Creates task details with required fields and empty notes.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            category: category.into(),
            notes: String::new(),
        }
    }

    /// Sets initial notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Task aggregate root.
///
/// A task is created by `assigned_by` for `assigned_to` and carries the
/// bookkeeping for the at-most-once completion reward: `xp_awarded` flips
/// to true exactly once, `first_completed_at` is stamped alongside it, and
/// `completion_count` tracks every transition into
/// [`TaskStatus::Completed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    link: String,
    category: String,
    notes: String,
    status: TaskStatus,
    assigned_by: UserId,
    assigned_to: UserId,
    xp_awarded: bool,
    first_completed_at: Option<DateTime<Utc>>,
    completion_count: u64,
    created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task in the [`TaskStatus::NotCompleted`] state.
    #[must_use]
    pub fn new(
        assigned_by: UserId,
        assigned_to: UserId,
        details: TaskDetails,
        clock: &impl Clock,
    ) -> Self {
        let TaskDetails {
            title,
            link,
            category,
            notes,
        } = details;
        Self {
            id: TaskId::new(),
            title,
            link,
            category,
            notes,
            status: TaskStatus::NotCompleted,
            assigned_by,
            assigned_to,
            xp_awarded: false,
            first_completed_at: None,
            completion_count: 0,
            created_at: clock.utc(),
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the linked study material.
    #[must_use]
    pub fn link(&self) -> &str {
        &self.link
    }

    /// Returns the task category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the assignee's notes.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the user who assigned the task.
    #[must_use]
    pub const fn assigned_by(&self) -> UserId {
        self.assigned_by
    }

    /// Returns the user the task is assigned to.
    #[must_use]
    pub const fn assigned_to(&self) -> UserId {
        self.assigned_to
    }

    /// Returns whether the one-time completion XP has been granted.
    #[must_use]
    pub const fn xp_awarded(&self) -> bool {
        self.xp_awarded
    }

    /// Returns the timestamp of the first completion, if any.
    #[must_use]
    pub const fn first_completed_at(&self) -> Option<DateTime<Utc>> {
        self.first_completed_at
    }

    /// Returns how many times the task has entered the completed status.
    #[must_use]
    pub const fn completion_count(&self) -> u64 {
        self.completion_count
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sets the task status.
    pub const fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    /// Replaces the assignee's notes.
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Records the first completion: stamps the reward flag and timestamp
    /// and sets the completion count to one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::XpAlreadyAwarded`] if the reward was
    /// recorded before; the aggregate is left untouched.
    pub fn record_first_completion(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if self.xp_awarded {
            return Err(TaskDomainError::XpAlreadyAwarded(self.id));
        }
        self.xp_awarded = true;
        self.first_completed_at = Some(clock.utc());
        self.completion_count = 1;
        Ok(())
    }

    /// Records a re-entry into the completed status after the reward was
    /// already granted. No XP is involved.
    pub const fn record_recompletion(&mut self) {
        self.completion_count = self.completion_count.saturating_add(1);
    }
}
