//! Shared primitives for all Rust crates in RolePilot.

#![forbid(unsafe_code)]

/// Acting-administrator identity shared across services.
pub mod auth;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::ActorIdentity;

/// Result type used across RolePilot crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Error categories surfaced by the access-control engine and its services.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Invalid input, such as a blank name or an unknown enum token.
    #[error("validation error: {0}")]
    Validation(String),

    /// Stored configuration violates a mandatory invariant.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A validity window starts after it ends.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation is not allowed from the record's current lifecycle status.
    #[error("invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// A dynamic scope could not be resolved because the caller's own value is unknown.
    #[error("ambiguous dynamic scope: {0}")]
    AmbiguousDynamicScope(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
