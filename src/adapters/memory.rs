//! Thread-safe in-memory store for tests and embedded use.
//!
//! All three collections live behind one lock, so every composite commit
//! is naturally atomic: the write lock is held for the duration of the
//! whole multi-document operation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::{BuddyRequest, BuddyRequestId, Task, TaskId, User, UserId};
use crate::ports::{BuddyRequestStore, StoreError, StoreResult, TaskStore, UserStore};

/// Thread-safe in-memory implementation of all store ports.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    users: HashMap<UserId, User>,
    tasks: HashMap<TaskId, Task>,
    requests: HashMap<BuddyRequestId, BuddyRequest>,
    // Unordered-pair index of pending requests, standing in for a partial
    // unique index on (sender, receiver, status = pending).
    pending_pairs: HashMap<(UserId, UserId), BuddyRequestId>,
}

/// Normalizes an unordered user pair into a stable index key.
fn pair_key(first: UserId, second: UserId) -> (UserId, UserId) {
    if first <= second {
        (first, second)
    } else {
        (second, first)
    }
}

fn newest_first<T>(mut items: Vec<T>, created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) -> Vec<T> {
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    items
}

impl InMemoryStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write_state(&self) -> StoreResult<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

impl StoreState {
    fn require_user(&self, id: UserId) -> StoreResult<&User> {
        self.users.get(&id).ok_or(StoreError::UserNotFound(id))
    }

    fn require_task(&self, id: TaskId) -> StoreResult<&Task> {
        self.tasks.get(&id).ok_or(StoreError::TaskNotFound(id))
    }

    fn require_request(&self, id: BuddyRequestId) -> StoreResult<&BuddyRequest> {
        self.requests
            .get(&id)
            .ok_or(StoreError::RequestNotFound(id))
    }

    /// Drops the pending-pair index entry owned by `request`, if any.
    fn unindex_pending(&mut self, request: &BuddyRequest) {
        let key = pair_key(request.sender(), request.receiver());
        if self.pending_pairs.get(&key) == Some(&request.id()) {
            self.pending_pairs.remove(&key);
        }
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut state = self.write_state()?;
        if state.users.contains_key(&user.id()) {
            return Err(StoreError::DuplicateUser(user.id()));
        }
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.read_state()?.users.get(&id).cloned())
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut state = self.write_state()?;
        state.require_user(user.id())?;
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn update_user_pair(&self, first: &User, second: &User) -> StoreResult<()> {
        let mut state = self.write_state()?;
        state.require_user(first.id())?;
        state.require_user(second.id())?;
        state.users.insert(first.id(), first.clone());
        state.users.insert(second.id(), second.clone());
        Ok(())
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn commit_task_creation(&self, task: &Task, assigner: &User) -> StoreResult<()> {
        let mut state = self.write_state()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(StoreError::DuplicateTask(task.id()));
        }
        state.require_user(assigner.id())?;
        state.tasks.insert(task.id(), task.clone());
        state.users.insert(assigner.id(), assigner.clone());
        Ok(())
    }

    async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        Ok(self.read_state()?.tasks.get(&id).cloned())
    }

    async fn commit_task_update(&self, task: &Task, assignee: Option<&User>) -> StoreResult<()> {
        let mut state = self.write_state()?;
        let stored = state.require_task(task.id())?;
        let reward_recorded = stored.xp_awarded();
        let recorded_completions = stored.completion_count();
        // First-completion commit: the reward flag acts as the
        // compare-and-set guard against a racing writer.
        if assignee.is_some() && reward_recorded {
            return Err(StoreError::CompletionConflict(task.id()));
        }
        // A stale copy loaded before the reward committed must not roll
        // the recorded bookkeeping back.
        if (reward_recorded && !task.xp_awarded())
            || task.completion_count() < recorded_completions
        {
            return Err(StoreError::CompletionConflict(task.id()));
        }
        if let Some(user) = assignee {
            state.require_user(user.id())?;
            state.users.insert(user.id(), user.clone());
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> StoreResult<()> {
        let mut state = self.write_state()?;
        state
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::TaskNotFound(id))
    }

    async fn tasks_for_assignee(&self, user: UserId) -> StoreResult<Vec<Task>> {
        let state = self.read_state()?;
        let tasks = state
            .tasks
            .values()
            .filter(|task| task.assigned_to() == user)
            .cloned()
            .collect();
        Ok(newest_first(tasks, Task::created_at))
    }

    async fn tasks_assigned_by(&self, user: UserId) -> StoreResult<Vec<Task>> {
        let state = self.read_state()?;
        let tasks = state
            .tasks
            .values()
            .filter(|task| task.assigned_by() == user)
            .cloned()
            .collect();
        Ok(newest_first(tasks, Task::created_at))
    }
}

#[async_trait]
impl BuddyRequestStore for InMemoryStore {
    async fn insert_request(&self, request: &BuddyRequest) -> StoreResult<()> {
        let mut state = self.write_state()?;
        if state.requests.contains_key(&request.id()) {
            return Err(StoreError::DuplicateRequest(request.id()));
        }
        let key = pair_key(request.sender(), request.receiver());
        if request.is_pending() {
            if state.pending_pairs.contains_key(&key) {
                return Err(StoreError::DuplicatePendingRequest {
                    sender: request.sender(),
                    receiver: request.receiver(),
                });
            }
            state.pending_pairs.insert(key, request.id());
        }
        state.requests.insert(request.id(), request.clone());
        Ok(())
    }

    async fn find_request(&self, id: BuddyRequestId) -> StoreResult<Option<BuddyRequest>> {
        Ok(self.read_state()?.requests.get(&id).cloned())
    }

    async fn has_pending_between(&self, first: UserId, second: UserId) -> StoreResult<bool> {
        let state = self.read_state()?;
        Ok(state.pending_pairs.contains_key(&pair_key(first, second)))
    }

    async fn update_request(&self, request: &BuddyRequest) -> StoreResult<()> {
        let mut state = self.write_state()?;
        let stored = state.require_request(request.id())?.clone();
        // Resolved requests are immutable; a racing writer that loaded
        // the record while it was still pending loses here.
        if !stored.is_pending() {
            return Err(StoreError::ResolutionConflict(request.id()));
        }
        if !request.is_pending() {
            state.unindex_pending(&stored);
        }
        state.requests.insert(request.id(), request.clone());
        Ok(())
    }

    async fn delete_request(&self, id: BuddyRequestId) -> StoreResult<()> {
        let mut state = self.write_state()?;
        let removed = state
            .requests
            .remove(&id)
            .ok_or(StoreError::RequestNotFound(id))?;
        state.unindex_pending(&removed);
        Ok(())
    }

    async fn commit_acceptance(
        &self,
        request: &BuddyRequest,
        sender: &User,
        receiver: &User,
    ) -> StoreResult<()> {
        let mut state = self.write_state()?;
        let stored = state.require_request(request.id())?.clone();
        if !stored.is_pending() {
            return Err(StoreError::ResolutionConflict(request.id()));
        }
        state.require_user(sender.id())?;
        state.require_user(receiver.id())?;
        state.unindex_pending(&stored);
        state.requests.insert(request.id(), request.clone());
        state.users.insert(sender.id(), sender.clone());
        state.users.insert(receiver.id(), receiver.clone());
        Ok(())
    }

    async fn pending_requests_for(&self, receiver: UserId) -> StoreResult<Vec<BuddyRequest>> {
        let state = self.read_state()?;
        let requests = state
            .requests
            .values()
            .filter(|request| request.is_pending() && request.receiver() == receiver)
            .cloned()
            .collect();
        Ok(newest_first(requests, BuddyRequest::created_at))
    }

    async fn pending_requests_from(&self, sender: UserId) -> StoreResult<Vec<BuddyRequest>> {
        let state = self.read_state()?;
        let requests = state
            .requests
            .values()
            .filter(|request| request.is_pending() && request.sender() == sender)
            .cloned()
            .collect();
        Ok(newest_first(requests, BuddyRequest::created_at))
    }
}
