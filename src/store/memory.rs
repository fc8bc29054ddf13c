use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskFilter, User};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    // Kept in insertion order so equal `created_at` values stay stable when sorted.
    tasks: Vec<Task>,
    next_user_id: i32,
}

/// In-memory user and task store for tests and local runs.
///
/// Clones share the same tables.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.lock()?;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::UsernameTaken);
        }

        tables.next_user_id += 1;
        let created = User {
            id: tables.next_user_id,
            name: user.name,
            username: user.username,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create(&self, task: NewTask) -> Result<Task, AppError> {
        let created = Task {
            id: Uuid::new_v4(),
            owner_id: task.owner_id,
            creator_id: task.creator_id,
            title: task.title,
            description: task.description,
            status: task.status,
            deadline: task.deadline,
            created_at: Utc::now(),
        };
        self.lock()?.tasks.push(created.clone());
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        Ok(self.lock()?.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_by_owner(&self, owner_id: i32, filter: TaskFilter) -> Result<Vec<Task>, AppError> {
        let mut tasks: Vec<Task> = self
            .lock()?
            .tasks
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .filter(|t| filter.status.map_or(true, |status| t.status == status))
            .filter(|t| match filter.deadline {
                Some(limit) => t.deadline.map_or(false, |deadline| deadline <= limit),
                None => true,
            })
            .cloned()
            .collect();

        match filter.deadline {
            Some(_) => tasks.sort_by_key(|t| t.deadline),
            None => tasks.sort_by_key(|t| t.created_at),
        }
        Ok(tasks)
    }

    async fn update(&self, task: &Task) -> Result<Task, AppError> {
        let mut tables = self.lock()?;
        let stored = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

        stored.title = task.title.clone();
        stored.description = task.description.clone();
        stored.status = task.status;
        stored.deadline = task.deadline;
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.lock()?;
        let before = tables.tasks.len();
        tables.tasks.retain(|t| t.id != id);
        Ok(tables.tasks.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;
    use chrono::{Duration, TimeZone};

    fn new_task(owner_id: i32, title: &str, status: TaskStatus) -> NewTask {
        NewTask {
            owner_id,
            creator_id: owner_id,
            title: title.to_string(),
            description: String::new(),
            status,
            deadline: None,
        }
    }

    #[tokio::test]
    async fn test_user_ids_are_assigned_and_usernames_unique() {
        let store = MemoryStore::new();
        let ann = UserStore::create(
            &store,
            NewUser {
                name: "Ann".into(),
                username: "ann".into(),
                password_hash: "h".into(),
            },
        )
        .await
        .unwrap();
        let bob = UserStore::create(
            &store,
            NewUser {
                name: "Bob".into(),
                username: "bob".into(),
                password_hash: "h".into(),
            },
        )
        .await
        .unwrap();
        assert_ne!(ann.id, bob.id);

        let dup = UserStore::create(
            &store,
            NewUser {
                name: "Other Ann".into(),
                username: "ann".into(),
                password_hash: "h2".into(),
            },
        )
        .await;
        assert_eq!(dup.unwrap_err(), AppError::UsernameTaken);

        assert!(store.find_by_username("Ann").await.unwrap().is_none());
        assert_eq!(store.find_by_id(bob.id).await.unwrap().unwrap().username, "bob");
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let store = MemoryStore::new();
        let base = Utc.with_ymd_and_hms(2030, 1, 10, 0, 0, 0).unwrap();

        let late = TaskStore::create(
            &store,
            NewTask {
                deadline: Some(base + Duration::days(3)),
                ..new_task(1, "late", TaskStatus::ToDo)
            },
        )
        .await
        .unwrap();
        let early = TaskStore::create(
            &store,
            NewTask {
                deadline: Some(base - Duration::days(3)),
                ..new_task(1, "early", TaskStatus::Done)
            },
        )
        .await
        .unwrap();
        TaskStore::create(&store, new_task(1, "no deadline", TaskStatus::Done))
            .await
            .unwrap();
        TaskStore::create(&store, new_task(2, "someone else", TaskStatus::Done))
            .await
            .unwrap();

        let all = store.list_by_owner(1, TaskFilter::default()).await.unwrap();
        let titles: Vec<_> = all.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["late", "early", "no deadline"]);

        let done = store
            .list_by_owner(
                1,
                TaskFilter {
                    status: Some(TaskStatus::Done),
                    deadline: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(done.len(), 2);
        assert!(done.iter().all(|t| t.owner_id == 1));

        let by_deadline = store
            .list_by_owner(
                1,
                TaskFilter {
                    status: None,
                    deadline: Some(base + Duration::days(5)),
                },
            )
            .await
            .unwrap();
        let ids: Vec<_> = by_deadline.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = MemoryStore::new();
        let mut task = TaskStore::create(&store, new_task(1, "a", TaskStatus::ToDo))
            .await
            .unwrap();

        task.status = TaskStatus::InProgress;
        let updated = store.update(&task).await.unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.created_at, task.created_at);

        assert!(store.delete(task.id).await.unwrap());
        assert!(!store.delete(task.id).await.unwrap());
        assert!(store.get(task.id).await.unwrap().is_none());
    }
}
