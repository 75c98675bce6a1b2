//! Request DTOs for Web API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::db::UserId;
use crate::tasks::{Priority, Status, TaskType};

use super::validation::{no_control_chars, not_empty_trimmed};

/// Deserialize a field that distinguishes "absent" from "explicitly null".
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`: an
/// absent field stays `None`, a `null` becomes `Some(None)` (clear), and a
/// value becomes `Some(Some(value))`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// User registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Password (plaintext; hashed server-side).
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// External-identity login request.
///
/// The triple is supplied by the external-identity collaborator after it has
/// verified the upstream provider token; this service does not re-verify the
/// provider signature.
#[derive(Debug, Deserialize)]
pub struct ExternalLoginRequest {
    /// Verified email address.
    pub email: String,
    /// Verified display name.
    pub name: String,
    /// Verified avatar URL (optional).
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Profile update request.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New email address.
    #[serde(default)]
    pub email: Option<String>,
    /// New avatar URL. An empty string clears it.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Password change request.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password.
    pub current_password: String,
    /// New password.
    pub new_password: String,
}

/// Initial subtask within a task creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubtaskItem {
    /// Subtask text.
    #[validate(length(min = 1, max = 500))]
    #[validate(custom(function = not_empty_trimmed))]
    #[validate(custom(function = no_control_chars))]
    pub text: String,
    /// Initial completion state.
    #[serde(default)]
    pub completed: bool,
}

/// Task creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title.
    #[validate(length(min = 1, max = 200))]
    #[validate(custom(function = not_empty_trimmed))]
    #[validate(custom(function = no_control_chars))]
    pub title: String,
    /// Description (optional).
    #[serde(default)]
    pub description: Option<String>,
    /// Initial status.
    #[serde(default)]
    pub status: Status,
    /// Task tier.
    #[serde(default)]
    pub task_type: TaskType,
    /// Priority.
    #[serde(default)]
    pub priority: Priority,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Category (optional).
    #[serde(default)]
    pub category: Option<String>,
    /// Due date (optional).
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Assignee (optional).
    #[serde(default)]
    pub assignee_id: Option<UserId>,
    /// Initial subtasks.
    #[serde(default)]
    #[validate(nested)]
    pub subtasks: Vec<CreateSubtaskItem>,
}

/// Task field update request.
///
/// Enumerates exactly the fields an update may change. Optional nullable
/// fields distinguish "leave untouched" (absent) from "clear" (null).
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title.
    #[serde(default)]
    #[validate(length(min = 1, max = 200))]
    #[validate(custom(function = not_empty_trimmed))]
    #[validate(custom(function = no_control_chars))]
    pub title: Option<String>,
    /// New description. Null clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    /// New status.
    #[serde(default)]
    pub status: Option<Status>,
    /// New task tier.
    #[serde(default)]
    pub task_type: Option<TaskType>,
    /// New priority.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// New tags (replaces the whole set).
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// New category. Null clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    /// New due date. Null clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// New assignee. Null unassigns.
    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<UserId>>,
}

/// Subtask creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubtaskRequest {
    /// Subtask text.
    #[validate(length(min = 1, max = 500))]
    #[validate(custom(function = not_empty_trimmed))]
    #[validate(custom(function = no_control_chars))]
    pub text: String,
}

/// Subtask update request.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSubtaskRequest {
    /// New text.
    #[serde(default)]
    #[validate(length(min = 1, max = 500))]
    #[validate(custom(function = not_empty_trimmed))]
    #[validate(custom(function = no_control_chars))]
    pub text: Option<String>,
    /// New completion state.
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Query parameters for listing tasks.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    /// Exact status match.
    #[serde(default)]
    pub status: Option<String>,
    /// Exact priority match.
    #[serde(default)]
    pub priority: Option<String>,
    /// Exact category match.
    #[serde(default)]
    pub category: Option<String>,
    /// Case-insensitive substring search on title or description.
    #[serde(default)]
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_task_request_defaults() {
        let req: CreateTaskRequest = serde_json::from_str(r#"{"title": "Only title"}"#).unwrap();
        assert_eq!(req.title, "Only title");
        assert_eq!(req.status, Status::Draft);
        assert_eq!(req.task_type, TaskType::Main);
        assert_eq!(req.priority, Priority::Medium);
        assert!(req.tags.is_empty());
        assert!(req.subtasks.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_task_request_rejects_blank_title() {
        let req: CreateTaskRequest = serde_json::from_str(r#"{"title": "   "}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_task_request_invalid_enum() {
        let result = serde_json::from_str::<CreateTaskRequest>(
            r#"{"title": "X", "status": "paused"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_update_request_absent_vs_null() {
        // Absent field: leave untouched
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"title": "New"}"#).unwrap();
        assert_eq!(req.title.as_deref(), Some("New"));
        assert!(req.due_date.is_none());
        assert!(req.assignee_id.is_none());

        // Explicit null: clear
        let req: UpdateTaskRequest =
            serde_json::from_str(r#"{"due_date": null, "assignee_id": null}"#).unwrap();
        assert_eq!(req.due_date, Some(None));
        assert_eq!(req.assignee_id, Some(None));
    }

    #[test]
    fn test_update_subtask_request() {
        let req: UpdateSubtaskRequest = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert_eq!(req.completed, Some(true));
        assert!(req.text.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_nested_subtask_validation() {
        let req: CreateTaskRequest = serde_json::from_str(
            r#"{"title": "Parent", "subtasks": [{"text": ""}]}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());
    }
}
