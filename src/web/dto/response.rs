//! Response DTOs for Web API.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{SubtaskId, TaskId, User, UserId};
use crate::tasks::{Priority, Status, Subtask, TaskType, TaskWithUsers, UserSummary};

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// Auth / User DTOs
// ============================================================================

/// User information in responses.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Avatar URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
        }
    }
}

/// Authentication response (register/login/external).
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Bearer token (JWT).
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    /// User information.
    pub user: UserInfo,
}

/// Current user profile response.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Avatar URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ============================================================================
// Task DTOs
// ============================================================================

/// Subtask in responses.
#[derive(Debug, Serialize)]
pub struct SubtaskResponse {
    /// Subtask ID.
    pub id: SubtaskId,
    /// Subtask text.
    pub text: String,
    /// Completion state.
    pub completed: bool,
    /// The user who created the subtask.
    pub author_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Subtask> for SubtaskResponse {
    fn from(subtask: Subtask) -> Self {
        Self {
            id: subtask.id,
            text: subtask.text,
            completed: subtask.completed,
            author_id: subtask.author_id,
            created_at: subtask.created_at,
            updated_at: subtask.updated_at,
        }
    }
}

/// Task in responses, enriched with collaborator summaries.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    /// Task ID.
    pub id: TaskId,
    /// Title.
    pub title: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Workflow status.
    pub status: Status,
    /// Task tier.
    pub task_type: TaskType,
    /// Priority.
    pub priority: Priority,
    /// Completion percentage derived from subtasks.
    pub progress: u8,
    /// Tags.
    pub tags: Vec<String>,
    /// Category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Creator summary.
    pub creator: UserSummary,
    /// Assignee summary, if assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserSummary>,
    /// Subtasks in insertion order.
    pub subtasks: Vec<SubtaskResponse>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<TaskWithUsers> for TaskResponse {
    fn from(enriched: TaskWithUsers) -> Self {
        let task = enriched.task;
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            task_type: task.task_type,
            priority: task.priority,
            progress: task.progress,
            tags: task.tags,
            category: task.category,
            due_date: task.due_date,
            creator: enriched.creator,
            assignee: enriched.assignee,
            subtasks: task.subtasks.into_iter().map(SubtaskResponse::from).collect(),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId(1),
            email: "alice@example.com".to_string(),
            password: "hash".to_string(),
            name: "Alice".to_string(),
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_info_omits_password() {
        let info = UserInfo::from(sample_user());
        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(json["name"], "Alice");
        assert_eq!(json["email"], "alice@example.com");
        assert!(json.get("password").is_none());
        // Absent avatar is omitted entirely
        assert!(json.get("avatar_url").is_none());
    }

    #[test]
    fn test_api_response_wrapper() {
        let resp = ApiResponse::new(UserInfo::from(sample_user()));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["data"]["name"], "Alice");
    }
}
