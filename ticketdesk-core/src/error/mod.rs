//! Unified error handling for Ticketdesk Core

use serde::Serialize;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Session bootstrap failed: {0}")]
    Bootstrap(String),

    #[error("Session not ready: {0}")]
    SessionPending(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Busy: {0}")]
    Busy(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// The three failure categories the shell distinguishes.
///
/// None of them is fatal: the worst outcome is an unauthenticated,
/// read-only landing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Init data exchange rejected or unreachable
    BootstrapFailure,
    /// Identity missing or lacking the required role
    UnauthorizedAccess,
    /// Any other backend or client-side request failure
    RequestFailure,
}

/// Error state rendered inline by a view
#[derive(Debug, Clone, Serialize)]
pub struct InlineError {
    pub kind: ErrorKind,
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Bootstrap(_) => ErrorKind::BootstrapFailure,
            AppError::Unauthorized(_) | AppError::Forbidden(_) => ErrorKind::UnauthorizedAccess,
            AppError::SessionPending(_)
            | AppError::NotFound(_)
            | AppError::Validation(_)
            | AppError::Busy(_)
            | AppError::Request(_)
            | AppError::Http(_)
            | AppError::Internal(_) => ErrorKind::RequestFailure,
        }
    }

    /// Convert into the inline error state shown next to the failing control.
    ///
    /// Transport and internal details are logged here and replaced by a
    /// generic message.
    pub fn to_inline(&self) -> InlineError {
        let (code, message) = match self {
            AppError::Bootstrap(msg) => ("bootstrap_failed", msg.clone()),
            AppError::SessionPending(msg) => ("session_pending", msg.clone()),
            AppError::Unauthorized(msg) => ("unauthorized", msg.clone()),
            AppError::Forbidden(msg) => ("forbidden", msg.clone()),
            AppError::NotFound(msg) => ("not_found", msg.clone()),
            AppError::Validation(msg) => ("validation", msg.clone()),
            AppError::Busy(msg) => ("busy", msg.clone()),
            AppError::Request(msg) => {
                tracing::error!("Request error: {}", msg);
                (
                    "request_failed",
                    "The request failed. Please try again.".to_string(),
                )
            }
            AppError::Http(e) => {
                tracing::error!("HTTP error: {:?}", e);
                (
                    "network_error",
                    "Could not reach the server. Please try again.".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        InlineError {
            kind: self.kind(),
            code,
            message,
        }
    }
}

// Conversion from validation errors
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}
