//! Domain model for buddy-based task tracking and XP progression.
//!
//! The domain models users with XP-derived levels, tasks with a one-time
//! completion reward, and buddy requests with a pending-only transition
//! window, keeping all infrastructure concerns outside of the domain
//! boundary.

mod error;
mod ids;
pub mod progression;
mod request;
mod task;
mod user;

pub use error::{
    BuddyDomainError, ParseRequestStatusError, ParseTaskStatusError, TaskDomainError,
};
pub use ids::{BuddyRequestId, TaskId, UserId};
pub use request::{BuddyRequest, BuddyRequestStatus};
pub use task::{Task, TaskDetails, TaskStatus};
pub use user::{User, UserStats};
