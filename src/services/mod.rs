//! Application services orchestrating domain operations.
//!
//! Each public operation executes as one atomic unit against the store:
//! either every state change it names becomes visible, or none does.

mod buddies;
mod error;
mod tasks;
mod users;

pub use buddies::BuddyService;
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use tasks::{TaskChange, TaskService, TaskStatusOutcome};
pub use users::UserService;
