//! Error taxonomy shared by the ledger, session and statistics commands.

use std::fmt::{self, Display};
use thiserror::Error;

/// A single rejected input field and the message to show next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field error found while validating one input, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the message recorded for `field`, if any.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Converts into `Err(self)` when at least one field was rejected.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Errors surfaced by application commands.
///
/// None of these are fatal: callers report them and keep the previous state.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input was rejected before any request was sent.
    #[error("invalid input: {0}")]
    Validation(ValidationErrors),

    /// The token is missing, expired or was rejected by the server.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// The server answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The response arrived but could not be understood.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A command that needs a session ran while signed out.
    #[error("not signed in")]
    MissingSession,

    /// The local key-value store failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl AppError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized(_) | AppError::MissingSession)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::MalformedResponse(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}
