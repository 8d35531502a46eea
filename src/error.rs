//! Error types for crowdguard
//!
//! This module defines the error hierarchy used throughout the crate.
//! We use `thiserror` for library-style errors that are part of the API;
//! the binary wraps them in `anyhow` at the boundary.

use crate::data_access::LevelSet;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Data access error: {0}")]
    DataAccess(#[from] DataAccessError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Authorization error: {0}")]
    Auth(#[from] AuthError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("Unknown access level '{level}' in {field}")]
    UnknownLevel { level: String, field: String },
}

/// Rejection raised by the task/project consistency guard
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataAccessError {
    #[error(
        "Invalid or insufficient permission for task assignment: task levels {} are not compatible with project levels {}",
        format_levels(.task_levels),
        format_levels(.project_levels)
    )]
    LevelMismatch {
        task_levels: LevelSet,
        project_levels: LevelSet,
    },

    #[error("Required project tracking id missing for project {project_id}")]
    MissingTrackingId { project_id: u64 },
}

fn format_levels(levels: &LevelSet) -> String {
    let names: Vec<&str> = levels.iter().map(|l| l.as_str()).collect();
    format!("[{}]", names.join(", "))
}

/// Task persistence errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error(transparent)]
    DataAccess(#[from] DataAccessError),

    #[error("Project {0} not found")]
    ProjectNotFound(u64),

    #[error("Task {0} not found")]
    NotFound(u64),
}

/// Bulk import errors
///
/// Messages are user-facing; the web layer shows them verbatim.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("The file you uploaded has two headers with the same name.")]
    DuplicatedHeaders,

    #[error("The file you uploaded has an empty header on column {position}.")]
    EmptyHeader { position: usize },

    #[error("The file you uploaded has missing required header(s): {}", .0.join(","))]
    MissingHeaders(Vec<String>),

    #[error(
        "The file you uploaded has incorrect/missing values for required header(s): {}",
        .0.join(",")
    )]
    InvalidRequiredFields(Vec<String>),

    #[error("The file you uploaded has an extra value on row {row}.")]
    RowLength { row: usize },

    #[error("Invalid value '{value}' for {field}")]
    InvalidValue { field: String, value: String },

    #[error("Invalid user_pref value on row {row}: {reason}")]
    InvalidUserPref { row: usize, reason: String },

    #[error("Oops! It looks like you don't have permission to access that file")]
    Forbidden,

    #[error("Oops! That file doesn't look like the right file.")]
    WrongFileType,

    #[error("Not a valid csv file for import")]
    InvalidFile,

    #[error("Invalid data access levels for user type '{user_type}' on row {row}: {}", .levels.join(","))]
    InvalidUserAccess {
        row: usize,
        user_type: String,
        levels: Vec<String>,
    },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// REST payload rule violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{reason}: task {task_id}")]
    Conflict { reason: String, task_id: u64 },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn duplicate_task(task_id: u64) -> Self {
        ApiError::Conflict {
            reason: "DUPLICATE_TASK".into(),
            task_id,
        }
    }

    /// JSON body the web layer returns with a 409
    pub fn conflict_body(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Conflict { reason, task_id } => Some(serde_json::json!({
                "reason": reason,
                "task_id": task_id,
            })),
            _ => None,
        }
    }
}

/// Authorization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Unknown action '{0}'")]
    UnknownAction(String),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for import operations
pub type ImportResult<T> = std::result::Result<T, ImportError>;

/// Result type alias for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;
