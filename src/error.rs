//! Error taxonomy shared by the query, render and menu layers.

use thiserror::Error;

/// A hardware/OS query failed, or the parallel join over queries failed.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("{query} information unavailable: {reason}")]
    Unavailable { query: &'static str, reason: String },

    #[error("I/O error while reading system information: {0}")]
    Io(#[from] std::io::Error),

    #[error("query task did not complete: {0}")]
    Join(String),
}

impl QueryError {
    pub fn unavailable(query: &'static str, reason: impl Into<String>) -> Self {
        QueryError::Unavailable {
            query,
            reason: reason.into(),
        }
    }
}

impl From<tokio::task::JoinError> for QueryError {
    fn from(err: tokio::task::JoinError) -> Self {
        QueryError::Join(err.to_string())
    }
}

/// Formatting or table construction failed.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("row {row} has {found} cells, table has {expected} columns")]
    ShapeMismatch {
        expected: usize,
        found: usize,
        row: usize,
    },

    #[error("table has no columns")]
    NoColumns,
}

/// Anything that can end a menu session.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("terminal prompt failed: {0}")]
    Prompt(#[from] std::io::Error),
}

impl AppError {
    /// Label printed in front of the error on stderr.
    pub fn context_label(&self) -> &'static str {
        match self {
            AppError::Query(_) => "Error fetching system info:",
            AppError::Render(_) | AppError::Prompt(_) => "An error occurred:",
        }
    }
}
