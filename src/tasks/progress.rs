//! Progress calculation for tasks.

use super::types::Subtask;

/// Derive a task's completion percentage from its subtasks.
///
/// Returns 0 for an empty list, otherwise the share of completed subtasks
/// rounded half-up to an integer percentage. The result is recomputed after
/// every subtask insert, update, or delete; it is never caller-settable.
pub fn recompute(subtasks: &[Subtask]) -> u8 {
    if subtasks.is_empty() {
        return 0;
    }

    let completed = subtasks.iter().filter(|s| s.completed).count();
    let ratio = completed as f64 / subtasks.len() as f64;
    (ratio * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{SubtaskId, TaskId, UserId};
    use chrono::Utc;

    fn subtasks(flags: &[bool]) -> Vec<Subtask> {
        flags
            .iter()
            .enumerate()
            .map(|(i, &completed)| Subtask {
                id: SubtaskId(i as i64 + 1),
                task_id: TaskId(1),
                text: format!("subtask {i}"),
                completed,
                author_id: UserId(1),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn test_empty_list_is_zero() {
        assert_eq!(recompute(&[]), 0);
    }

    #[test]
    fn test_none_completed() {
        assert_eq!(recompute(&subtasks(&[false, false, false])), 0);
    }

    #[test]
    fn test_all_completed() {
        assert_eq!(recompute(&subtasks(&[true, true])), 100);
    }

    #[test]
    fn test_one_of_two() {
        assert_eq!(recompute(&subtasks(&[true, false])), 50);
    }

    #[test]
    fn test_one_of_three_rounds_down() {
        // 33.33... rounds to 33
        assert_eq!(recompute(&subtasks(&[true, false, false])), 33);
    }

    #[test]
    fn test_two_of_three_rounds_up() {
        // 66.66... rounds to 67
        assert_eq!(recompute(&subtasks(&[true, true, false])), 67);
    }

    #[test]
    fn test_half_rounds_up() {
        // 1/8 = 12.5 rounds half-up to 13
        assert_eq!(recompute(&subtasks(&[true, false, false, false, false, false, false, false])), 13);
    }

    #[test]
    fn test_five_of_six() {
        // 83.33... rounds to 83
        let flags = [true, true, true, true, true, false];
        assert_eq!(recompute(&subtasks(&flags)), 83);
    }
}
