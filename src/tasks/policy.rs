//! Authorization policy for task operations.
//!
//! A pure decision function over (user, task, action). Assignees may report
//! progress (add work items, toggle completion) but may not reassign,
//! retitle, or destroy the task or its items; only the creator can.

use super::types::Task;
use crate::db::UserId;

/// The operations the policy decides on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Read the task and its subtasks.
    Read,
    /// Update task fields (title, status, priority, type, tags, category,
    /// due date, assignee).
    UpdateFields,
    /// Delete the task.
    Delete,
    /// Add a subtask.
    CreateSubtask,
    /// Update a subtask's text or completion state.
    UpdateSubtask,
    /// Delete a subtask.
    DeleteSubtask,
}

/// Decide whether `user_id` may perform `action` on `task`.
///
/// Pure and side-effect free. Comparison is by stored typed ids; callers
/// must pass the authenticated principal's id, never a client-supplied one.
pub fn permit(user_id: UserId, task: &Task, action: TaskAction) -> bool {
    match action {
        TaskAction::Read | TaskAction::CreateSubtask | TaskAction::UpdateSubtask => {
            task.is_creator(user_id) || task.is_assignee(user_id)
        }
        TaskAction::UpdateFields | TaskAction::Delete | TaskAction::DeleteSubtask => {
            task.is_creator(user_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::TaskId;
    use crate::tasks::types::{Priority, Status, TaskType};
    use chrono::Utc;

    const CREATOR: UserId = UserId(1);
    const ASSIGNEE: UserId = UserId(2);
    const STRANGER: UserId = UserId(3);

    fn task_with_assignee() -> Task {
        Task {
            id: TaskId(1),
            title: "Test".to_string(),
            description: None,
            status: Status::Draft,
            task_type: TaskType::Main,
            priority: Priority::Medium,
            progress: 0,
            tags: vec![],
            category: None,
            due_date: None,
            creator_id: CREATOR,
            assignee_id: Some(ASSIGNEE),
            subtasks: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    const ALL_ACTIONS: [TaskAction; 6] = [
        TaskAction::Read,
        TaskAction::UpdateFields,
        TaskAction::Delete,
        TaskAction::CreateSubtask,
        TaskAction::UpdateSubtask,
        TaskAction::DeleteSubtask,
    ];

    #[test]
    fn test_creator_may_do_everything() {
        let task = task_with_assignee();
        for action in ALL_ACTIONS {
            assert!(permit(CREATOR, &task, action), "{action:?}");
        }
    }

    #[test]
    fn test_assignee_progress_rights_only() {
        let task = task_with_assignee();

        assert!(permit(ASSIGNEE, &task, TaskAction::Read));
        assert!(permit(ASSIGNEE, &task, TaskAction::CreateSubtask));
        assert!(permit(ASSIGNEE, &task, TaskAction::UpdateSubtask));

        assert!(!permit(ASSIGNEE, &task, TaskAction::UpdateFields));
        assert!(!permit(ASSIGNEE, &task, TaskAction::Delete));
        assert!(!permit(ASSIGNEE, &task, TaskAction::DeleteSubtask));
    }

    #[test]
    fn test_stranger_may_do_nothing() {
        let task = task_with_assignee();
        for action in ALL_ACTIONS {
            assert!(!permit(STRANGER, &task, action), "{action:?}");
        }
    }

    #[test]
    fn test_unassigned_task_only_creator() {
        let task = Task {
            assignee_id: None,
            ..task_with_assignee()
        };

        assert!(permit(CREATOR, &task, TaskAction::Read));
        assert!(!permit(ASSIGNEE, &task, TaskAction::Read));
        assert!(!permit(ASSIGNEE, &task, TaskAction::UpdateSubtask));
    }

    #[test]
    fn test_delete_iff_creator() {
        let task = task_with_assignee();
        for user in [CREATOR, ASSIGNEE, STRANGER] {
            assert_eq!(
                permit(user, &task, TaskAction::Delete),
                user == task.creator_id
            );
        }
    }
}
