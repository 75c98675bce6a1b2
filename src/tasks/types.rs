//! Task and subtask types for taskdeck.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{SubtaskId, TaskId, UserId};

/// Maximum length for a task title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for a subtask text.
pub const MAX_SUBTASK_TEXT_LENGTH: usize = 500;

/// Task workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Not yet started.
    #[default]
    Draft,
    /// Actively being worked on.
    InProgress,
    /// Under revision.
    Editing,
    /// Finished.
    Done,
}

impl Status {
    /// Convert status to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::InProgress => "in_progress",
            Status::Editing => "editing",
            Status::Done => "done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Status::Draft),
            "in_progress" => Ok(Status::InProgress),
            "editing" => Ok(Status::Editing),
            "done" => Ok(Status::Done),
            _ => Err(format!("unknown status: {s}")),
        }
    }
}

/// Task tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Primary work item.
    #[default]
    Main,
    /// Supporting work item.
    Secondary,
    /// Minor work item.
    Tertiary,
}

impl TaskType {
    /// Convert type to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Main => "main",
            TaskType::Secondary => "secondary",
            TaskType::Tertiary => "tertiary",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "main" => Ok(TaskType::Main),
            "secondary" => Ok(TaskType::Secondary),
            "tertiary" => Ok(TaskType::Tertiary),
            _ => Err(format!("unknown task type: {s}")),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Normal priority.
    #[default]
    Medium,
    /// High priority.
    High,
    /// Needs immediate attention.
    Urgent,
}

impl Priority {
    /// Convert priority to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(format!("unknown priority: {s}")),
        }
    }
}

/// A subtask, owned exclusively by its parent task.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Subtask {
    /// Unique subtask ID.
    pub id: SubtaskId,
    /// Parent task ID.
    pub task_id: TaskId,
    /// Subtask text.
    pub text: String,
    /// Whether the subtask is completed.
    pub completed: bool,
    /// The user who created the subtask.
    pub author_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A task with its ordered subtask list.
#[derive(Debug, Clone)]
pub struct Task {
    /// Unique task ID.
    pub id: TaskId,
    /// Task title.
    pub title: String,
    /// Task description (optional).
    pub description: Option<String>,
    /// Workflow status.
    pub status: Status,
    /// Task tier.
    pub task_type: TaskType,
    /// Priority.
    pub priority: Priority,
    /// Completion percentage, derived from subtasks. Maintained server-side.
    pub progress: u8,
    /// Free-form tags (deduplicated).
    pub tags: Vec<String>,
    /// Category (optional).
    pub category: Option<String>,
    /// Due date (optional).
    pub due_date: Option<DateTime<Utc>>,
    /// The user who created the task. Immutable.
    pub creator_id: UserId,
    /// The user the task is assigned to (optional, singular).
    pub assignee_id: Option<UserId>,
    /// Subtasks in insertion order.
    pub subtasks: Vec<Subtask>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Check if the given user created this task.
    pub fn is_creator(&self, user_id: UserId) -> bool {
        self.creator_id == user_id
    }

    /// Check if the given user is the task's assignee.
    pub fn is_assignee(&self, user_id: UserId) -> bool {
        self.assignee_id == Some(user_id)
    }
}

/// Data for creating a new task row.
#[derive(Debug, Clone)]
pub struct NewTask {
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
    /// The creating user. Set from the authenticated principal, never from
    /// caller-supplied data.
    pub creator_id: UserId,
    /// Assignee (optional).
    pub assignee_id: Option<UserId>,
}

impl NewTask {
    /// Create a new task with default status/type/priority.
    pub fn new(title: impl Into<String>, creator_id: UserId) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: Status::default(),
            task_type: TaskType::default(),
            priority: Priority::default(),
            tags: vec![],
            category: None,
            due_date: None,
            creator_id,
            assignee_id: None,
        }
    }
}

/// Data for creating a new subtask row.
#[derive(Debug, Clone)]
pub struct NewSubtask {
    /// Subtask text.
    pub text: String,
    /// Initial completion state.
    pub completed: bool,
    /// The creating user.
    pub author_id: UserId,
}

/// Data for updating an existing task.
///
/// Exactly the fields an update may change are enumerated here; `progress`
/// and `creator_id` are not reachable through this struct.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    /// New title.
    pub title: Option<String>,
    /// New description. `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// New status.
    pub status: Option<Status>,
    /// New task tier.
    pub task_type: Option<TaskType>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New tags (replaces the whole set).
    pub tags: Option<Vec<String>>,
    /// New category. `Some(None)` clears it.
    pub category: Option<Option<String>>,
    /// New due date. `Some(None)` clears it.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// New assignee. `Some(None)` unassigns.
    pub assignee_id: Option<Option<UserId>>,
}

impl TaskUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set new description.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Set new status.
    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Set new task tier.
    pub fn task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    /// Set new priority.
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set new tags.
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Set new category.
    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = Some(category);
        self
    }

    /// Set new due date.
    pub fn due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Set new assignee.
    pub fn assignee_id(mut self, assignee_id: Option<UserId>) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.task_type.is_none()
            && self.priority.is_none()
            && self.tags.is_none()
            && self.category.is_none()
            && self.due_date.is_none()
            && self.assignee_id.is_none()
    }
}

/// Data for updating an existing subtask (text and/or completed).
#[derive(Debug, Clone, Default)]
pub struct SubtaskUpdate {
    /// New text.
    pub text: Option<String>,
    /// New completion state.
    pub completed: Option<bool>,
}

impl SubtaskUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set new completion state.
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.completed.is_none()
    }
}

/// Filters for listing a user's tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Exact status match.
    pub status: Option<Status>,
    /// Exact priority match.
    pub priority: Option<Priority>,
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring match on title or description.
    pub search: Option<String>,
}
