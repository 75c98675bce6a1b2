//! taskdeck - Collaborative task-tracking backend.
//!
//! Accounts and collaborative tasks over a JSON HTTP API: bearer-token
//! sessions, a creator/assignee authorization policy, and task progress
//! derived from subtask state.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod tasks;
pub mod web;

pub use auth::{
    generate_password, hash_password, validate_password, verify_password, PasswordError,
    TokenCodec, TokenError,
};
pub use config::Config;
pub use db::{Database, NewUser, SubtaskId, TaskId, User, UserId, UserRepository, UserUpdate};
pub use error::{Result, TaskdeckError};
pub use tasks::{
    permit, CreateTask, Priority, Status, Subtask, SubtaskUpdate, Task, TaskAction, TaskFilter,
    TaskService, TaskType, TaskUpdate, TaskWithUsers,
};
pub use web::WebServer;
