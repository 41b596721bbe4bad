//! Buddy relationship state machine orchestration.
//!
//! Governs the request lifecycle (`pending -> accepted | rejected`, or
//! deletion on cancellation) and keeps both users' buddy sets mutually
//! consistent: acceptance and removal always touch both sides in one
//! atomic commit.

use crate::domain::{BuddyRequest, BuddyRequestId, User, UserId};
use crate::ports::{BuddyRequestStore, StoreError, UserStore};
use crate::services::{ServiceError, ServiceResult};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// Buddy request and relationship orchestration service.
#[derive(Clone)]
pub struct BuddyService<S, C>
where
    S: BuddyRequestStore + UserStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> BuddyService<S, C>
where
    S: BuddyRequestStore + UserStore,
    C: Clock + Send + Sync,
{
    /// Creates a new buddy service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Sends a buddy request from `sender_id` to `receiver_id`.
    ///
    /// A store-level uniqueness violation on insert is reported as the
    /// same conflict as the pre-check, covering the race between two
    /// near-simultaneous sends.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SelfRequest`] for a self-request,
    /// [`ServiceError::UserNotFound`] when either user is absent,
    /// [`ServiceError::AlreadyBuddies`] when the pair is already linked,
    /// or [`ServiceError::PendingRequestExists`] when a pending request
    /// exists in either direction.
    pub async fn send_request(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
    ) -> ServiceResult<BuddyRequest> {
        let sender = self.find_user(sender_id).await?;
        // Receiver must exist before a request can address them.
        self.find_user(receiver_id).await?;

        if sender.is_buddy(receiver_id) {
            return Err(ServiceError::AlreadyBuddies(sender_id, receiver_id));
        }
        if self.store.has_pending_between(sender_id, receiver_id).await? {
            return Err(ServiceError::PendingRequestExists(sender_id, receiver_id));
        }

        let request = BuddyRequest::new(sender_id, receiver_id, &*self.clock)?;
        match self.store.insert_request(&request).await {
            Ok(()) => {
                debug!(request = %request.id(), sender = %sender_id, receiver = %receiver_id, "buddy request sent");
                Ok(request)
            }
            Err(StoreError::DuplicatePendingRequest { .. }) => {
                Err(ServiceError::PendingRequestExists(sender_id, receiver_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Accepts a pending request as its receiver, linking both users.
    ///
    /// The request flip and both buddy-set insertions are persisted in
    /// one atomic commit; a one-sided buddy relation can never be
    /// observed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::RequestNotFound`] when the request is
    /// absent, [`ServiceError::NotReceiver`] when the actor is not its
    /// receiver, or [`ServiceError::RequestResolved`] when it already
    /// left the pending state.
    pub async fn accept_request(
        &self,
        request_id: BuddyRequestId,
        acting_user: UserId,
    ) -> ServiceResult<()> {
        let mut request = self.find_request(request_id).await?;
        if request.receiver() != acting_user {
            return Err(ServiceError::NotReceiver {
                actor: acting_user,
                request: request_id,
            });
        }
        request.accept()?;

        let mut sender = self.find_user(request.sender()).await?;
        let mut receiver = self.find_user(request.receiver()).await?;
        sender.add_buddy(receiver.id());
        receiver.add_buddy(sender.id());

        self.store
            .commit_acceptance(&request, &sender, &receiver)
            .await?;
        info!(request = %request_id, sender = %sender.id(), receiver = %receiver.id(), "buddy request accepted");
        Ok(())
    }

    /// Rejects a pending request as its receiver.
    ///
    /// The record is retained with its terminal status and never blocks a
    /// future request between the pair.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::RequestNotFound`] when the request is
    /// absent, [`ServiceError::NotReceiver`] when the actor is not its
    /// receiver, or [`ServiceError::RequestResolved`] when it already
    /// left the pending state.
    pub async fn reject_request(
        &self,
        request_id: BuddyRequestId,
        acting_user: UserId,
    ) -> ServiceResult<()> {
        let mut request = self.find_request(request_id).await?;
        if request.receiver() != acting_user {
            return Err(ServiceError::NotReceiver {
                actor: acting_user,
                request: request_id,
            });
        }
        request.reject()?;
        self.store.update_request(&request).await?;
        debug!(request = %request_id, "buddy request rejected");
        Ok(())
    }

    /// Cancels a pending request as its sender, deleting the record.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::RequestNotFound`] when the request is
    /// absent, [`ServiceError::NotSender`] when the actor is not its
    /// sender, or [`ServiceError::RequestResolved`] when it already left
    /// the pending state.
    pub async fn cancel_request(
        &self,
        request_id: BuddyRequestId,
        acting_user: UserId,
    ) -> ServiceResult<()> {
        let request = self.find_request(request_id).await?;
        if request.sender() != acting_user {
            return Err(ServiceError::NotSender {
                actor: acting_user,
                request: request_id,
            });
        }
        if !request.is_pending() {
            return Err(ServiceError::RequestResolved {
                request: request_id,
                status: request.status(),
            });
        }
        self.store.delete_request(request_id).await?;
        debug!(request = %request_id, "buddy request cancelled");
        Ok(())
    }

    /// Removes the buddy link between two users, both sides at once.
    ///
    /// Idempotent when the pair is not linked. Requests between the pair
    /// are untouched, so a removed buddy can be re-requested immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::UserNotFound`] when either user is absent.
    pub async fn remove_buddy(&self, user_id: UserId, buddy_id: UserId) -> ServiceResult<()> {
        let mut user = self.find_user(user_id).await?;
        let mut buddy = self.find_user(buddy_id).await?;
        user.remove_buddy(buddy_id);
        buddy.remove_buddy(user_id);
        self.store.update_user_pair(&user, &buddy).await?;
        debug!(user = %user_id, buddy = %buddy_id, "buddy removed");
        Ok(())
    }

    /// Returns pending requests addressed to the user, newest first.
    ///
    /// # Errors
    ///
    /// Returns a store error when the lookup fails.
    pub async fn pending_received(&self, user_id: UserId) -> ServiceResult<Vec<BuddyRequest>> {
        Ok(self.store.pending_requests_for(user_id).await?)
    }

    /// Returns pending requests sent by the user, newest first.
    ///
    /// # Errors
    ///
    /// Returns a store error when the lookup fails.
    pub async fn pending_sent(&self, user_id: UserId) -> ServiceResult<Vec<BuddyRequest>> {
        Ok(self.store.pending_requests_from(user_id).await?)
    }

    /// Returns the user's buddies as full records.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::UserNotFound`] when the user is absent.
    /// Buddy entries whose records have vanished are skipped.
    pub async fn buddies(&self, user_id: UserId) -> ServiceResult<Vec<User>> {
        let user = self.find_user(user_id).await?;
        let mut buddies = Vec::with_capacity(user.buddies().len());
        for buddy_id in user.buddies() {
            if let Some(buddy) = self.store.find_user(*buddy_id).await? {
                buddies.push(buddy);
            }
        }
        Ok(buddies)
    }

    async fn find_user(&self, id: UserId) -> ServiceResult<User> {
        self.store
            .find_user(id)
            .await?
            .ok_or(ServiceError::UserNotFound(id))
    }

    async fn find_request(&self, id: BuddyRequestId) -> ServiceResult<BuddyRequest> {
        self.store
            .find_request(id)
            .await?
            .ok_or(ServiceError::RequestNotFound(id))
    }
}
