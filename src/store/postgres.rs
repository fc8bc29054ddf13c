use async_trait::async_trait;
use log::warn;
use sqlx::PgPool;
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskFilter, User};

const TASK_COLUMNS: &str =
    "id, owner_id, creator_id, title, description, status, deadline, created_at";

// PostgreSQL `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, username, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, username, password_hash) VALUES ($1, $2, $3)
             RETURNING id, name, username, password_hash, created_at",
        )
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => Ok(created),
            // Lost a race with a concurrent registration of the same username.
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                warn!("unique violation while inserting user {}", user.username);
                Err(AppError::UsernameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Builds the listing query. Placeholders follow the bind order: owner, status, deadline.
fn list_sql(filter: &TaskFilter) -> String {
    let mut sql = format!("SELECT {} FROM tasks WHERE owner_id = $1", TASK_COLUMNS);
    let mut conditions: Vec<(&str, &str)> = Vec::new();
    if filter.status.is_some() {
        conditions.push(("status", "="));
    }
    if filter.deadline.is_some() {
        conditions.push(("deadline", "<="));
    }

    for (offset, (column, op)) in conditions.into_iter().enumerate() {
        sql.push_str(&format!(" AND {} {} ${}", column, op, offset + 2));
    }

    if filter.deadline.is_some() {
        sql.push_str(" ORDER BY deadline ASC, created_at ASC");
    } else {
        sql.push_str(" ORDER BY created_at ASC");
    }
    sql
}

#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(&self, task: NewTask) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (owner_id, creator_id, title, description, status, deadline)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            TASK_COLUMNS
        );
        let created = sqlx::query_as::<_, Task>(&sql)
            .bind(task.owner_id)
            .bind(task.creator_id)
            .bind(task.title)
            .bind(task.description)
            .bind(task.status)
            .bind(task.deadline)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn list_by_owner(&self, owner_id: i32, filter: TaskFilter) -> Result<Vec<Task>, AppError> {
        let sql = list_sql(&filter);

        let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(owner_id);
        if let Some(status) = filter.status {
            query_builder = query_builder.bind(status);
        }
        if let Some(deadline) = filter.deadline {
            query_builder = query_builder.bind(deadline);
        }

        let tasks = query_builder.fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    async fn update(&self, task: &Task) -> Result<Task, AppError> {
        let sql = format!(
            "UPDATE tasks
             SET title = $1, description = $2, status = $3, deadline = $4
             WHERE id = $5
             RETURNING {}",
            TASK_COLUMNS
        );
        let updated = sqlx::query_as::<_, Task>(&sql)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status)
            .bind(task.deadline)
            .bind(task.id)
            .fetch_optional(&self.pool)
            .await?;

        updated.ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;
    use chrono::Utc;

    #[test]
    fn test_list_sql_placeholders_follow_bind_order() {
        let plain = list_sql(&TaskFilter::default());
        assert!(plain.ends_with("WHERE owner_id = $1 ORDER BY created_at ASC"));

        let deadline_only = list_sql(&TaskFilter {
            status: None,
            deadline: Some(Utc::now()),
        });
        assert!(deadline_only.contains("AND deadline <= $2 ORDER BY deadline ASC"));

        let both = list_sql(&TaskFilter {
            status: Some(TaskStatus::Done),
            deadline: Some(Utc::now()),
        });
        assert!(both.contains("AND status = $2 AND deadline <= $3"));
    }
}
