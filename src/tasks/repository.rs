//! Task repository for taskdeck.
//!
//! CRUD operations for tasks and their subtasks. Rows are plain records;
//! authorization and progress derivation live in the service layer.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, SqlitePool};

use super::types::{NewSubtask, NewTask, Subtask, Task, TaskFilter, TaskUpdate, SubtaskUpdate};
use crate::db::{SubtaskId, TaskId, UserId};
use crate::{Result, TaskdeckError};

const TASK_COLUMNS: &str = "id, title, description, status, task_type, priority, progress, \
     tags, category, due_date, creator_id, assignee_id, created_at, updated_at";

const SUBTASK_COLUMNS: &str = "id, task_id, text, completed, author_id, created_at, updated_at";

impl<'r> FromRow<'r, SqliteRow> for Task {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        let tags_json: String = row.try_get("tags")?;
        let tags: Vec<String> =
            serde_json::from_str(&tags_json).map_err(|e| sqlx::Error::ColumnDecode {
                index: "tags".to_string(),
                source: Box::new(e),
            })?;

        let status: String = row.try_get("status")?;
        let task_type: String = row.try_get("task_type")?;
        let priority: String = row.try_get("priority")?;

        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            status: status.parse().map_err(|e: String| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: e.into(),
            })?,
            task_type: task_type
                .parse()
                .map_err(|e: String| sqlx::Error::ColumnDecode {
                    index: "task_type".to_string(),
                    source: e.into(),
                })?,
            priority: priority
                .parse()
                .map_err(|e: String| sqlx::Error::ColumnDecode {
                    index: "priority".to_string(),
                    source: e.into(),
                })?,
            progress: row.try_get::<i64, _>("progress")? as u8,
            tags,
            category: row.try_get("category")?,
            due_date: row.try_get("due_date")?,
            creator_id: row.try_get("creator_id")?,
            assignee_id: row.try_get("assignee_id")?,
            // Filled in by the repository after the row is mapped
            subtasks: vec![],
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn tags_to_json(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags).map_err(|e| TaskdeckError::Database(e.to_string()))
}

/// Repository for task and subtask CRUD operations.
pub struct TaskRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TaskRepository<'a> {
    /// Create a new TaskRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new task in the database.
    ///
    /// Returns the created task with the assigned ID and an empty subtask
    /// list; `progress` starts at 0.
    pub async fn create(&self, new_task: &NewTask) -> Result<Task> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO tasks (title, description, status, task_type, priority, progress, \
             tags, category, due_date, creator_id, assignee_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_task.title)
        .bind(&new_task.description)
        .bind(new_task.status.as_str())
        .bind(new_task.task_type.as_str())
        .bind(new_task.priority.as_str())
        .bind(tags_to_json(&new_task.tags)?)
        .bind(&new_task.category)
        .bind(new_task.due_date)
        .bind(new_task.creator_id)
        .bind(new_task.assignee_id)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| TaskdeckError::Database(e.to_string()))?;

        let id = TaskId(result.last_insert_rowid());
        self.get_by_id(id)
            .await?
            .ok_or_else(|| TaskdeckError::NotFound("task".to_string()))
    }

    /// Get a task by ID, with its subtasks loaded in insertion order.
    pub async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| TaskdeckError::Database(e.to_string()))?;

        match task {
            Some(mut task) => {
                task.subtasks = self.list_subtasks(task.id).await?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    /// List tasks created by the given user, newest first.
    ///
    /// Applies optional exact-match filters on status/priority/category and a
    /// case-insensitive substring search across title and description.
    pub async fn list_by_creator(
        &self,
        creator_id: UserId,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>> {
        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE creator_id = "
        ));
        query.push_bind(creator_id);

        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(status.as_str().to_string());
        }
        if let Some(priority) = filter.priority {
            query.push(" AND priority = ");
            query.push_bind(priority.as_str().to_string());
        }
        if let Some(ref category) = filter.category {
            query.push(" AND category = ");
            query.push_bind(category.clone());
        }
        if let Some(ref search) = filter.search {
            let pattern = format!("%{search}%");
            query.push(" AND (title LIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR description LIKE ");
            query.push_bind(pattern);
            query.push(")");
        }

        query.push(" ORDER BY created_at DESC, id DESC");

        let mut tasks = query
            .build_query_as::<Task>()
            .fetch_all(self.pool)
            .await
            .map_err(|e| TaskdeckError::Database(e.to_string()))?;

        for task in &mut tasks {
            task.subtasks = self.list_subtasks(task.id).await?;
        }

        Ok(tasks)
    }

    /// Update a task by ID.
    ///
    /// Only fields that are set in the update will be modified.
    /// Returns the updated task, or None if not found.
    pub async fn update(&self, id: TaskId, update: &TaskUpdate) -> Result<Option<Task>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE tasks SET ");
        let mut separated = query.separated(", ");

        if let Some(ref title) = update.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title.clone());
        }
        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }
        if let Some(status) = update.status {
            separated.push("status = ");
            separated.push_bind_unseparated(status.as_str().to_string());
        }
        if let Some(task_type) = update.task_type {
            separated.push("task_type = ");
            separated.push_bind_unseparated(task_type.as_str().to_string());
        }
        if let Some(priority) = update.priority {
            separated.push("priority = ");
            separated.push_bind_unseparated(priority.as_str().to_string());
        }
        if let Some(ref tags) = update.tags {
            separated.push("tags = ");
            separated.push_bind_unseparated(tags_to_json(tags)?);
        }
        if let Some(ref category) = update.category {
            separated.push("category = ");
            separated.push_bind_unseparated(category.clone());
        }
        if let Some(due_date) = update.due_date {
            separated.push("due_date = ");
            separated.push_bind_unseparated(due_date);
        }
        if let Some(assignee_id) = update.assignee_id {
            separated.push("assignee_id = ");
            separated.push_bind_unseparated(assignee_id);
        }
        separated.push("updated_at = ");
        separated.push_bind_unseparated(Utc::now());

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| TaskdeckError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Persist a derived progress value for a task.
    pub async fn set_progress(&self, id: TaskId, progress: u8) -> Result<()> {
        sqlx::query("UPDATE tasks SET progress = ?, updated_at = ? WHERE id = ?")
            .bind(progress as i64)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| TaskdeckError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a task by ID. Subtasks are removed by the cascade.
    ///
    /// Returns true if a task was deleted, false if not found.
    pub async fn delete(&self, id: TaskId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| TaskdeckError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// List a task's subtasks in insertion order.
    pub async fn list_subtasks(&self, task_id: TaskId) -> Result<Vec<Subtask>> {
        let subtasks = sqlx::query_as::<_, Subtask>(&format!(
            "SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE task_id = ? ORDER BY id"
        ))
        .bind(task_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| TaskdeckError::Database(e.to_string()))?;

        Ok(subtasks)
    }

    /// Get a single subtask belonging to the given task.
    pub async fn get_subtask(
        &self,
        task_id: TaskId,
        subtask_id: SubtaskId,
    ) -> Result<Option<Subtask>> {
        let subtask = sqlx::query_as::<_, Subtask>(&format!(
            "SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE id = ? AND task_id = ?"
        ))
        .bind(subtask_id)
        .bind(task_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| TaskdeckError::Database(e.to_string()))?;

        Ok(subtask)
    }

    /// Insert a subtask for the given task.
    pub async fn insert_subtask(&self, task_id: TaskId, new: &NewSubtask) -> Result<Subtask> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO subtasks (task_id, text, completed, author_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(task_id)
        .bind(&new.text)
        .bind(new.completed)
        .bind(new.author_id)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| TaskdeckError::Database(e.to_string()))?;

        let id = SubtaskId(result.last_insert_rowid());
        self.get_subtask(task_id, id)
            .await?
            .ok_or_else(|| TaskdeckError::NotFound("subtask".to_string()))
    }

    /// Update a subtask belonging to the given task.
    ///
    /// Returns the updated subtask, or None if not found under that task.
    pub async fn update_subtask(
        &self,
        task_id: TaskId,
        subtask_id: SubtaskId,
        update: &SubtaskUpdate,
    ) -> Result<Option<Subtask>> {
        if update.is_empty() {
            return self.get_subtask(task_id, subtask_id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE subtasks SET ");
        let mut separated = query.separated(", ");

        if let Some(ref text) = update.text {
            separated.push("text = ");
            separated.push_bind_unseparated(text.clone());
        }
        if let Some(completed) = update.completed {
            separated.push("completed = ");
            separated.push_bind_unseparated(completed);
        }
        separated.push("updated_at = ");
        separated.push_bind_unseparated(Utc::now());

        query.push(" WHERE id = ");
        query.push_bind(subtask_id);
        query.push(" AND task_id = ");
        query.push_bind(task_id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| TaskdeckError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_subtask(task_id, subtask_id).await
    }

    /// Delete a subtask belonging to the given task.
    ///
    /// Returns true if a subtask was deleted, false if not found.
    pub async fn delete_subtask(&self, task_id: TaskId, subtask_id: SubtaskId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subtasks WHERE id = ? AND task_id = ?")
            .bind(subtask_id)
            .bind(task_id)
            .execute(self.pool)
            .await
            .map_err(|e| TaskdeckError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}
