//! Persistence seams for users and tasks.
//!
//! The services only see these traits. [`postgres`] is the production backend and
//! [`memory`] keeps everything in process for tests and local experiments.
//! Both implementations honour the same listing contract: owner scoping, exact
//! status match, `deadline <= filter` ordered by deadline, otherwise ordered by
//! creation time.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskFilter, User};

pub use memory::MemoryStore;
pub use postgres::{PgTaskStore, PgUserStore};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError>;

    /// Case-sensitive exact match.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Fails with `AppError::UsernameTaken` if the username already exists.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, task: NewTask) -> Result<Task, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Task>, AppError>;

    /// Every call runs a fresh query; nothing is cached between calls.
    async fn list_by_owner(&self, owner_id: i32, filter: TaskFilter) -> Result<Vec<Task>, AppError>;

    /// Persists the mutable fields of `task` and returns the stored row.
    async fn update(&self, task: &Task) -> Result<Task, AppError>;

    /// Returns `false` if no row had that id.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}
