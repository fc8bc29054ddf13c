pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskDraft, TaskFilter, TaskPatch, TaskQuery, TaskStatus};
pub use user::{NewUser, PublicUser, User};
