//! User registration and login bookkeeping.
//!
//! Credential handling (password hashing, token issuance) is an external
//! collaborator; this service owns only the domain side of signup and
//! login: initial state and the daily streak.

use crate::domain::{User, UserId};
use crate::ports::UserStore;
use crate::services::{ServiceError, ServiceResult};
use mockable::Clock;
use std::sync::Arc;
use tracing::debug;

/// User lifecycle orchestration service.
#[derive(Clone)]
pub struct UserService<S, C>
where
    S: UserStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> UserService<S, C>
where
    S: UserStore,
    C: Clock + Send + Sync,
{
    /// Creates a new user service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Registers a user with the initial progression state: zero XP,
    /// level 1, no streak, no buddies.
    ///
    /// # Errors
    ///
    /// Returns a store error when persistence fails.
    pub async fn register(&self, username: impl Into<String>) -> ServiceResult<User> {
        let user = User::new(username, &*self.clock);
        self.store.insert_user(&user).await?;
        debug!(user = %user.id(), username = user.username(), "user registered");
        Ok(user)
    }

    /// Records a login, applying the streak rule and advancing the
    /// last-active timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::UserNotFound`] when the user is absent.
    pub async fn record_login(&self, user_id: UserId) -> ServiceResult<User> {
        let mut user = self.find(user_id).await?;
        user.record_login(&*self.clock);
        self.store.update_user(&user).await?;
        Ok(user)
    }

    /// Returns the user's record.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::UserNotFound`] when the user is absent.
    pub async fn find(&self, user_id: UserId) -> ServiceResult<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))
    }
}
