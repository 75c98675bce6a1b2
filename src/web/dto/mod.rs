//! Data transfer objects for the Web API.

mod request;
mod response;
mod validation;

pub use request::{
    ChangePasswordRequest, CreateSubtaskItem, CreateSubtaskRequest, CreateTaskRequest,
    ExternalLoginRequest, LoginRequest, RegisterRequest, TaskListQuery, UpdateProfileRequest,
    UpdateSubtaskRequest, UpdateTaskRequest,
};
pub use response::{
    ApiResponse, AuthResponse, ProfileResponse, SubtaskResponse, TaskResponse, UserInfo,
};
pub use validation::{no_control_chars, not_empty_trimmed, ValidatedJson};
