//! Task service for taskdeck.
//!
//! The mutation engine on top of the repository: every operation resolves
//! the task first (not-found before permission, so a missing task never
//! leaks authorization information), consults the policy, applies the
//! explicit field changes, rederives progress when the subtask list changed,
//! persists, and returns the refreshed record enriched with the referenced
//! user summaries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::policy::{permit, TaskAction};
use super::progress;
use super::repository::TaskRepository;
use super::types::{
    NewSubtask, NewTask, Priority, Status, SubtaskUpdate, Task, TaskFilter, TaskType, TaskUpdate,
    MAX_SUBTASK_TEXT_LENGTH, MAX_TITLE_LENGTH,
};
use crate::db::{Database, SubtaskId, TaskId, User, UserId, UserRepository};
use crate::{Result, TaskdeckError};

/// Display summary of a referenced user (read-time join, not stored).
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Avatar image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
        }
    }
}

/// A task together with the display summaries of its collaborators.
#[derive(Debug, Clone)]
pub struct TaskWithUsers {
    /// The task record.
    pub task: Task,
    /// Summary of the task creator.
    pub creator: UserSummary,
    /// Summary of the assignee, if one is set and still exists.
    pub assignee: Option<UserSummary>,
}

/// Initial subtask supplied at task creation.
#[derive(Debug, Clone)]
pub struct SubtaskInput {
    /// Subtask text.
    pub text: String,
    /// Initial completion state.
    pub completed: bool,
}

/// Request to create a task.
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Task title.
    pub title: String,
    /// Description (optional).
    pub description: Option<String>,
    /// Initial status.
    pub status: Status,
    /// Task tier.
    pub task_type: TaskType,
    /// Priority.
    pub priority: Priority,
    /// Tags.
    pub tags: Vec<String>,
    /// Category (optional).
    pub category: Option<String>,
    /// Due date (optional).
    pub due_date: Option<DateTime<Utc>>,
    /// Assignee (optional).
    pub assignee_id: Option<UserId>,
    /// Initial subtasks.
    pub subtasks: Vec<SubtaskInput>,
}

impl CreateTask {
    /// Create a request with the required title and defaults everywhere else.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: Status::default(),
            task_type: TaskType::default(),
            priority: Priority::default(),
            tags: vec![],
            category: None,
            due_date: None,
            assignee_id: None,
            subtasks: vec![],
        }
    }
}

/// Deduplicate tags, preserving first-seen order.
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TaskdeckError::Validation("title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(TaskdeckError::Validation(format!(
            "title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(title.to_string())
}

fn validate_subtask_text(text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TaskdeckError::Validation(
            "subtask text is required".to_string(),
        ));
    }
    if text.chars().count() > MAX_SUBTASK_TEXT_LENGTH {
        return Err(TaskdeckError::Validation(format!(
            "subtask text must be at most {MAX_SUBTASK_TEXT_LENGTH} characters"
        )));
    }
    Ok(text.to_string())
}

/// Service for task operations.
pub struct TaskService<'a> {
    db: &'a Database,
}

impl<'a> TaskService<'a> {
    /// Create a new TaskService with the given database reference.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn tasks(&self) -> TaskRepository<'_> {
        TaskRepository::new(self.db.pool())
    }

    fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self.db.pool())
    }

    /// Ensure a prospective assignee actually exists.
    async fn check_assignee(&self, assignee_id: UserId) -> Result<()> {
        if self.users().get_by_id(assignee_id).await?.is_none() {
            return Err(TaskdeckError::Validation(
                "assignee does not exist".to_string(),
            ));
        }
        Ok(())
    }

    /// Attach creator/assignee summaries to a task.
    async fn enrich(&self, task: Task) -> Result<TaskWithUsers> {
        let users = self.users();
        let creator = users
            .get_by_id(task.creator_id)
            .await?
            .map(UserSummary::from)
            .ok_or_else(|| TaskdeckError::NotFound("user".to_string()))?;
        let assignee = match task.assignee_id {
            Some(id) => users.get_by_id(id).await?.map(UserSummary::from),
            None => None,
        };
        Ok(TaskWithUsers {
            task,
            creator,
            assignee,
        })
    }

    /// Resolve a task and check the policy for the requested action.
    ///
    /// Existence is checked before permission so a missing task id yields
    /// `NotFound` regardless of who asks.
    async fn resolve_permitted(
        &self,
        requester: UserId,
        task_id: TaskId,
        action: TaskAction,
    ) -> Result<Task> {
        let task = self
            .tasks()
            .get_by_id(task_id)
            .await?
            .ok_or_else(|| TaskdeckError::NotFound("task".to_string()))?;

        if !permit(requester, &task, action) {
            return Err(TaskdeckError::Forbidden(
                "not permitted for this task".to_string(),
            ));
        }

        Ok(task)
    }

    /// Rederive and persist a task's progress from its current subtasks.
    async fn refresh_progress(&self, task_id: TaskId) -> Result<()> {
        let repo = self.tasks();
        let subtasks = repo.list_subtasks(task_id).await?;
        repo.set_progress(task_id, progress::recompute(&subtasks))
            .await
    }

    /// Create a task owned by the requesting user.
    ///
    /// The creator is always the authenticated principal; initial subtasks
    /// are authored by the principal and the initial progress is derived
    /// from them.
    pub async fn create_task(&self, creator: UserId, request: CreateTask) -> Result<TaskWithUsers> {
        let title = validate_title(&request.title)?;
        let subtask_texts: Vec<(String, bool)> = request
            .subtasks
            .iter()
            .map(|s| validate_subtask_text(&s.text).map(|t| (t, s.completed)))
            .collect::<Result<_>>()?;

        if let Some(assignee_id) = request.assignee_id {
            self.check_assignee(assignee_id).await?;
        }

        let repo = self.tasks();
        let new_task = NewTask {
            title,
            description: request.description,
            status: request.status,
            task_type: request.task_type,
            priority: request.priority,
            tags: dedup_tags(request.tags),
            category: request.category,
            due_date: request.due_date,
            creator_id: creator,
            assignee_id: request.assignee_id,
        };
        let task = repo.create(&new_task).await?;

        for (text, completed) in &subtask_texts {
            repo.insert_subtask(
                task.id,
                &NewSubtask {
                    text: text.clone(),
                    completed: *completed,
                    author_id: creator,
                },
            )
            .await?;
        }

        if !subtask_texts.is_empty() {
            self.refresh_progress(task.id).await?;
        }

        let task = repo
            .get_by_id(task.id)
            .await?
            .ok_or_else(|| TaskdeckError::NotFound("task".to_string()))?;

        tracing::info!(task_id = %task.id, creator_id = %creator, "task created");
        self.enrich(task).await
    }

    /// Get a task by ID. Readable by the creator or the assignee.
    pub async fn get_task(&self, requester: UserId, task_id: TaskId) -> Result<TaskWithUsers> {
        let task = self
            .resolve_permitted(requester, task_id, TaskAction::Read)
            .await?;
        self.enrich(task).await
    }

    /// List/search the requesting user's created tasks, newest first.
    pub async fn list_tasks(
        &self,
        requester: UserId,
        filter: &TaskFilter,
    ) -> Result<Vec<TaskWithUsers>> {
        let tasks = self.tasks().list_by_creator(requester, filter).await?;

        let mut enriched = Vec::with_capacity(tasks.len());
        for task in tasks {
            enriched.push(self.enrich(task).await?);
        }
        Ok(enriched)
    }

    /// Update task fields. Creator only.
    pub async fn update_task(
        &self,
        requester: UserId,
        task_id: TaskId,
        mut update: TaskUpdate,
    ) -> Result<TaskWithUsers> {
        self.resolve_permitted(requester, task_id, TaskAction::UpdateFields)
            .await?;

        if let Some(ref title) = update.title {
            update.title = Some(validate_title(title)?);
        }
        if let Some(tags) = update.tags.take() {
            update.tags = Some(dedup_tags(tags));
        }
        if let Some(Some(assignee_id)) = update.assignee_id {
            self.check_assignee(assignee_id).await?;
        }

        let task = self
            .tasks()
            .update(task_id, &update)
            .await?
            .ok_or_else(|| TaskdeckError::NotFound("task".to_string()))?;

        self.enrich(task).await
    }

    /// Delete a task. Creator only.
    pub async fn delete_task(&self, requester: UserId, task_id: TaskId) -> Result<()> {
        self.resolve_permitted(requester, task_id, TaskAction::Delete)
            .await?;

        if !self.tasks().delete(task_id).await? {
            return Err(TaskdeckError::NotFound("task".to_string()));
        }
        tracing::info!(task_id = %task_id, "task deleted");
        Ok(())
    }

    /// Add a subtask to a task. Creator or assignee.
    ///
    /// The subtask starts incomplete and is authored by the requester.
    pub async fn add_subtask(
        &self,
        requester: UserId,
        task_id: TaskId,
        text: &str,
    ) -> Result<TaskWithUsers> {
        self.resolve_permitted(requester, task_id, TaskAction::CreateSubtask)
            .await?;
        let text = validate_subtask_text(text)?;

        let repo = self.tasks();
        repo.insert_subtask(
            task_id,
            &NewSubtask {
                text,
                completed: false,
                author_id: requester,
            },
        )
        .await?;

        self.refresh_progress(task_id).await?;

        let task = repo
            .get_by_id(task_id)
            .await?
            .ok_or_else(|| TaskdeckError::NotFound("task".to_string()))?;
        self.enrich(task).await
    }

    /// Update a subtask's text and/or completion state. Creator or assignee.
    pub async fn update_subtask(
        &self,
        requester: UserId,
        task_id: TaskId,
        subtask_id: SubtaskId,
        mut update: SubtaskUpdate,
    ) -> Result<TaskWithUsers> {
        self.resolve_permitted(requester, task_id, TaskAction::UpdateSubtask)
            .await?;

        if let Some(ref text) = update.text {
            update.text = Some(validate_subtask_text(text)?);
        }

        let repo = self.tasks();
        repo.update_subtask(task_id, subtask_id, &update)
            .await?
            .ok_or_else(|| TaskdeckError::NotFound("subtask".to_string()))?;

        self.refresh_progress(task_id).await?;

        let task = repo
            .get_by_id(task_id)
            .await?
            .ok_or_else(|| TaskdeckError::NotFound("task".to_string()))?;
        self.enrich(task).await
    }

    /// Delete a subtask. Creator only.
    pub async fn delete_subtask(
        &self,
        requester: UserId,
        task_id: TaskId,
        subtask_id: SubtaskId,
    ) -> Result<TaskWithUsers> {
        self.resolve_permitted(requester, task_id, TaskAction::DeleteSubtask)
            .await?;

        let repo = self.tasks();
        if !repo.delete_subtask(task_id, subtask_id).await? {
            // Nothing was removed, so progress stays untouched
            return Err(TaskdeckError::NotFound("subtask".to_string()));
        }

        self.refresh_progress(task_id).await?;

        let task = repo
            .get_by_id(task_id)
            .await?
            .ok_or_else(|| TaskdeckError::NotFound("task".to_string()))?;
        self.enrich(task).await
    }
}
