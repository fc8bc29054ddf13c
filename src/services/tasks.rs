//! Owner-scoped task operations.
//!
//! Every method takes the caller's `user_id` explicitly. It is resolved from the
//! bearer token by the HTTP layer and is never taken from task data. For a task that
//! exists but belongs to someone else, reads and writes fail with
//! `AppError::Unauthorized` before anything is written.

use log::{debug, info};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskDraft, TaskFilter, TaskPatch};
use crate::store::TaskStore;

#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    /// Creates a task owned and created by `owner_id`. Status defaults to `To Do`.
    pub async fn create(&self, owner_id: i32, draft: TaskDraft) -> Result<Task, AppError> {
        let task = self
            .tasks
            .create(NewTask {
                owner_id,
                creator_id: owner_id,
                title: draft.title,
                description: draft.description,
                status: draft.status.unwrap_or_default(),
                deadline: draft.deadline,
            })
            .await?;

        info!("user {} created task {}", owner_id, task.id);
        Ok(task)
    }

    /// Tasks of `owner_id` only.
    ///
    /// With a deadline filter the result holds tasks due at or before it, earliest
    /// first; otherwise it is ordered by creation time, oldest first.
    pub async fn list(&self, owner_id: i32, filter: TaskFilter) -> Result<Vec<Task>, AppError> {
        self.tasks.list_by_owner(owner_id, filter).await
    }

    pub async fn get_by_id(&self, task_id: Uuid, owner_id: i32) -> Result<Task, AppError> {
        self.fetch_owned(task_id, owner_id).await
    }

    pub async fn update(
        &self,
        task_id: Uuid,
        patch: TaskPatch,
        owner_id: i32,
    ) -> Result<Task, AppError> {
        let mut task = self.fetch_owned(task_id, owner_id).await?;
        patch.apply_to(&mut task);
        let task = self.tasks.update(&task).await?;

        info!("user {} updated task {}", owner_id, task.id);
        Ok(task)
    }

    pub async fn delete(&self, task_id: Uuid, owner_id: i32) -> Result<(), AppError> {
        self.fetch_owned(task_id, owner_id).await?;
        if !self.tasks.delete(task_id).await? {
            // Removed by a concurrent request after the ownership check.
            return Err(AppError::NotFound("Task not found".into()));
        }

        info!("user {} deleted task {}", owner_id, task_id);
        Ok(())
    }

    async fn fetch_owned(&self, task_id: Uuid, owner_id: i32) -> Result<Task, AppError> {
        let task = self
            .tasks
            .get(task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

        if task.owner_id != owner_id {
            debug!(
                "user {} denied access to task {} owned by {}",
                owner_id, task_id, task.owner_id
            );
            return Err(AppError::Unauthorized("Unauthorized".into()));
        }
        Ok(task)
    }
}
