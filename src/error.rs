//! Error types for game operations and persistence

use crate::types::TaskKind;
use thiserror::Error;

/// Errors returned by game rule operations (tasks, jobs, templates)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("Please enter a task name")]
    EmptyName,

    #[error("A {kind} task named \"{name}\" already exists")]
    Duplicate { name: String, kind: TaskKind },

    #[error("Task {0} not found")]
    NotFound(String),

    #[error("Task already completed")]
    AlreadyCompleted,

    #[error("Unknown job: {0}")]
    UnknownJob(String),

    #[error("Requirements for {0} are not met")]
    RequirementsNotMet(String),

    #[error("Template {0} not found")]
    UnknownTemplate(String),
}

/// Errors from the JSON store and the SQLite database
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub type GameResult<T> = std::result::Result<T, GameError>;
