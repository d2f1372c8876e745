//! Persistence of users and their embedded assignments.
//!
//! Names are not unique at the storage level. Every lookup and mutation acts
//! on the first user with a matching name in storage order, so duplicates
//! resolve deterministically.

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;

use crate::models::{Assignment, User};
use crate::utils::AppError;

/// Minimal storage contract used by the user repository.
///
/// Writes are conditional so callers never need a separate existence probe
/// before mutating. Each call is atomic on its own; nothing spans calls.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// First user named `name`, if any
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, AppError>;

    /// Inserts `user` unless one with the same name exists. Returns whether
    /// an insert happened.
    async fn insert_if_absent(&self, user: User) -> Result<bool, AppError>;

    /// Appends `assignment` to the user named `name`. Returns `false` when
    /// there is no such user.
    async fn push_assignment(&self, name: &str, assignment: Assignment) -> Result<bool, AppError>;

    /// Removes the user named `name` together with its assignments and
    /// returns the removed document.
    async fn remove_by_name(&self, name: &str) -> Result<Option<User>, AppError>;

    /// Every user in storage order
    async fn list_all(&self) -> Result<Vec<User>, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}
