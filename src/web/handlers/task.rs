//! Task handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::db::{SubtaskId, TaskId};
use crate::tasks::{
    CreateTask, SubtaskInput, SubtaskUpdate, TaskFilter, TaskService, TaskUpdate,
};
use crate::web::dto::{
    ApiResponse, CreateSubtaskRequest, CreateTaskRequest, TaskListQuery, TaskResponse,
    UpdateSubtaskRequest, UpdateTaskRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

use super::AppState;

fn parse_filter(query: TaskListQuery) -> Result<TaskFilter, ApiError> {
    let status = query
        .status
        .map(|s| s.parse())
        .transpose()
        .map_err(|_| ApiError::bad_request("Invalid status filter"))?;
    let priority = query
        .priority
        .map(|p| p.parse())
        .transpose()
        .map_err(|_| ApiError::bad_request("Invalid priority filter"))?;

    Ok(TaskFilter {
        status,
        priority,
        category: query.category,
        search: query.search,
    })
}

/// GET /api/tasks - List/search the current user's tasks.
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<ApiResponse<Vec<TaskResponse>>>, ApiError> {
    let user = state.authenticate(&claims).await?;
    let filter = parse_filter(query)?;

    let tasks = TaskService::new(&state.db)
        .list_tasks(user.id, &filter)
        .await
        .map_err(|e| state.api_error(e))?;

    let responses: Vec<TaskResponse> = tasks.into_iter().map(TaskResponse::from).collect();
    Ok(Json(ApiResponse::new(responses)))
}

/// POST /api/tasks - Create a new task.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> Result<Json<ApiResponse<TaskResponse>>, ApiError> {
    let user = state.authenticate(&claims).await?;

    let request = CreateTask {
        title: req.title,
        description: req.description,
        status: req.status,
        task_type: req.task_type,
        priority: req.priority,
        tags: req.tags,
        category: req.category,
        due_date: req.due_date,
        assignee_id: req.assignee_id,
        subtasks: req
            .subtasks
            .into_iter()
            .map(|s| SubtaskInput {
                text: s.text,
                completed: s.completed,
            })
            .collect(),
    };

    let created = TaskService::new(&state.db)
        .create_task(user.id, request)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(ApiResponse::new(created.into())))
}

/// GET /api/tasks/:id - Get a task by ID.
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(task_id): Path<TaskId>,
) -> Result<Json<ApiResponse<TaskResponse>>, ApiError> {
    let user = state.authenticate(&claims).await?;

    let task = TaskService::new(&state.db)
        .get_task(user.id, task_id)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(ApiResponse::new(task.into())))
}

/// PUT /api/tasks/:id - Update task fields.
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(task_id): Path<TaskId>,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> Result<Json<ApiResponse<TaskResponse>>, ApiError> {
    let user = state.authenticate(&claims).await?;

    let update = TaskUpdate {
        title: req.title,
        description: req.description,
        status: req.status,
        task_type: req.task_type,
        priority: req.priority,
        tags: req.tags,
        category: req.category,
        due_date: req.due_date,
        assignee_id: req.assignee_id,
    };

    let updated = TaskService::new(&state.db)
        .update_task(user.id, task_id, update)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(ApiResponse::new(updated.into())))
}

/// DELETE /api/tasks/:id - Delete a task.
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(task_id): Path<TaskId>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = state.authenticate(&claims).await?;

    TaskService::new(&state.db)
        .delete_task(user.id, task_id)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(ApiResponse::new(())))
}

/// POST /api/tasks/:id/subtasks - Add a subtask.
pub async fn add_subtask(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(task_id): Path<TaskId>,
    ValidatedJson(req): ValidatedJson<CreateSubtaskRequest>,
) -> Result<Json<ApiResponse<TaskResponse>>, ApiError> {
    let user = state.authenticate(&claims).await?;

    let updated = TaskService::new(&state.db)
        .add_subtask(user.id, task_id, &req.text)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(ApiResponse::new(updated.into())))
}

/// PUT /api/tasks/:id/subtasks/:subtask_id - Update a subtask.
pub async fn update_subtask(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((task_id, subtask_id)): Path<(TaskId, SubtaskId)>,
    ValidatedJson(req): ValidatedJson<UpdateSubtaskRequest>,
) -> Result<Json<ApiResponse<TaskResponse>>, ApiError> {
    let user = state.authenticate(&claims).await?;

    let update = SubtaskUpdate {
        text: req.text,
        completed: req.completed,
    };

    let updated = TaskService::new(&state.db)
        .update_subtask(user.id, task_id, subtask_id, update)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(ApiResponse::new(updated.into())))
}

/// DELETE /api/tasks/:id/subtasks/:subtask_id - Delete a subtask.
pub async fn delete_subtask(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path((task_id, subtask_id)): Path<(TaskId, SubtaskId)>,
) -> Result<Json<ApiResponse<TaskResponse>>, ApiError> {
    let user = state.authenticate(&claims).await?;

    let updated = TaskService::new(&state.db)
        .delete_subtask(user.id, task_id, subtask_id)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(ApiResponse::new(updated.into())))
}
