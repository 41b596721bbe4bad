//! Buddy request aggregate and its state machine.
//!
//! A request moves `pending -> accepted` or `pending -> rejected`, both
//! terminal. Cancellation deletes the record instead of transitioning it,
//! so a persisted request is never in a cancelled state.

use super::{BuddyDomainError, BuddyRequestId, ParseRequestStatusError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a buddy request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuddyRequestStatus {
    /// Awaiting a decision from the receiver.
    Pending,
    /// The receiver accepted; both users became buddies.
    Accepted,
    /// The receiver declined; the record is retained but inert.
    Rejected,
}

impl BuddyRequestStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for BuddyRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for BuddyRequestStatus {
    type Error = ParseRequestStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseRequestStatusError(value.to_owned())),
        }
    }
}

/// Buddy request aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuddyRequest {
    id: BuddyRequestId,
    sender: UserId,
    receiver: UserId,
    status: BuddyRequestStatus,
    created_at: DateTime<Utc>,
}

impl BuddyRequest {
    /// Creates a pending request from `sender` to `receiver`.
    ///
    /// # Errors
    ///
    /// Returns [`BuddyDomainError::SelfRequest`] when sender and receiver
    /// are the same user.
    pub fn new(
        sender: UserId,
        receiver: UserId,
        clock: &impl Clock,
    ) -> Result<Self, BuddyDomainError> {
        if sender == receiver {
            return Err(BuddyDomainError::SelfRequest(sender));
        }
        Ok(Self {
            id: BuddyRequestId::new(),
            sender,
            receiver,
            status: BuddyRequestStatus::Pending,
            created_at: clock.utc(),
        })
    }

    /// Returns the request identifier.
    #[must_use]
    pub const fn id(&self) -> BuddyRequestId {
        self.id
    }

    /// Returns the sending user.
    #[must_use]
    pub const fn sender(&self) -> UserId {
        self.sender
    }

    /// Returns the receiving user.
    #[must_use]
    pub const fn receiver(&self) -> UserId {
        self.receiver
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> BuddyRequestStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether the request is still awaiting a decision.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, BuddyRequestStatus::Pending)
    }

    /// Transitions the request to accepted.
    ///
    /// # Errors
    ///
    /// Returns [`BuddyDomainError::AlreadyResolved`] when the request has
    /// left the pending state; resolved requests are immutable.
    pub const fn accept(&mut self) -> Result<(), BuddyDomainError> {
        self.transition(BuddyRequestStatus::Accepted)
    }

    /// Transitions the request to rejected.
    ///
    /// # Errors
    ///
    /// Returns [`BuddyDomainError::AlreadyResolved`] when the request has
    /// left the pending state; resolved requests are immutable.
    pub const fn reject(&mut self) -> Result<(), BuddyDomainError> {
        self.transition(BuddyRequestStatus::Rejected)
    }

    const fn transition(&mut self, target: BuddyRequestStatus) -> Result<(), BuddyDomainError> {
        if !self.is_pending() {
            return Err(BuddyDomainError::AlreadyResolved {
                request_id: self.id,
                status: self.status,
            });
        }
        self.status = target;
        Ok(())
    }
}
