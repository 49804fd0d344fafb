//! Per-attribute scope evaluation.
//!
//! A scope is the value set one role declares for one attribute. Multiple
//! entries combine with OR; an empty scope denies everything.

use std::fmt::{Display, Formatter};

use rolepilot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::Attribute;

const ALL_SENTINEL: &str = "All";
const DYNAMIC_SENTINEL: &str = "Dynamic";

/// One scope token inside a role permission.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PermissionValue {
    /// Matches any context value.
    All,
    /// Matches only the caller's own value for the attribute.
    Dynamic,
    /// Matches one literal attribute value exactly.
    Value(String),
}

impl PermissionValue {
    /// Creates a literal scope value.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::from(value.into())
    }

    /// Returns the transport token for this value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_SENTINEL,
            Self::Dynamic => DYNAMIC_SENTINEL,
            Self::Value(value) => value.as_str(),
        }
    }
}

impl From<String> for PermissionValue {
    fn from(value: String) -> Self {
        match value.as_str() {
            ALL_SENTINEL => Self::All,
            DYNAMIC_SENTINEL => Self::Dynamic,
            _ => Self::Value(value),
        }
    }
}

impl From<&str> for PermissionValue {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<PermissionValue> for String {
    fn from(value: PermissionValue) -> Self {
        match value {
            PermissionValue::All => ALL_SENTINEL.to_owned(),
            PermissionValue::Dynamic => DYNAMIC_SENTINEL.to_owned(),
            PermissionValue::Value(value) => value,
        }
    }
}

impl Display for PermissionValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Evaluates one attribute scope against a request context value.
///
/// `All` short-circuits to `true` before anything else is inspected.
/// `Dynamic` compares the context value with the caller's own value and
/// fails with [`AppError::AmbiguousDynamicScope`] when that value is unknown.
/// Literal entries are exact, case-sensitive matches.
pub fn matches(
    values: &[PermissionValue],
    context_value: &str,
    caller_own_value: Option<&str>,
    attribute: Attribute,
) -> AppResult<bool> {
    if values.iter().any(|value| value == &PermissionValue::All) {
        return Ok(true);
    }

    if values.iter().any(|value| value == &PermissionValue::Dynamic) {
        let Some(own_value) = caller_own_value else {
            return Err(AppError::AmbiguousDynamicScope(format!(
                "caller has no own value for attribute '{attribute}'"
            )));
        };

        if own_value == context_value {
            return Ok(true);
        }
    }

    Ok(values.iter().any(|value| match value {
        PermissionValue::Value(literal) => literal == context_value,
        PermissionValue::All | PermissionValue::Dynamic => false,
    }))
}
