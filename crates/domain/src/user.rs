//! Users, their job attributes and their assignment history.

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use rolepilot_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{AssignmentStatus, AssignmentType, Attribute, RoleId, UserRole};

/// Unique identifier for a user record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a user identifier from an upstream value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::new(value)?.into()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for UserId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl Display for UserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Job attributes sourced from upstream HR systems.
///
/// Only the job title is mandatory; the other attributes are absent when the
/// upstream system does not provide them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProfile {
    /// Job title.
    pub job_title: String,
    /// Company code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Business function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    /// Operating unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Vessel code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship: Option<String>,
    /// Department.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl JobProfile {
    /// Creates a profile with only a job title.
    #[must_use]
    pub fn new(job_title: impl Into<String>) -> Self {
        Self {
            job_title: job_title.into(),
            company: None,
            function: None,
            operation: None,
            ship: None,
            department: None,
        }
    }

    /// Sets one attribute value on the profile.
    #[must_use]
    pub fn with(mut self, attribute: Attribute, value: impl Into<String>) -> Self {
        let value = value.into();
        match attribute {
            Attribute::Company => self.company = Some(value),
            Attribute::Function => self.function = Some(value),
            Attribute::Operation => self.operation = Some(value),
            Attribute::Ship => self.ship = Some(value),
            Attribute::Department => self.department = Some(value),
            Attribute::JobTitle => self.job_title = value,
        }
        self
    }

    /// Returns the profile value for an attribute.
    #[must_use]
    pub fn value(&self, attribute: Attribute) -> Option<&str> {
        match attribute {
            Attribute::Company => self.company.as_deref(),
            Attribute::Function => self.function.as_deref(),
            Attribute::Operation => self.operation.as_deref(),
            Attribute::Ship => self.ship.as_deref(),
            Attribute::Department => self.department.as_deref(),
            Attribute::JobTitle => Some(self.job_title.as_str()),
        }
    }
}

/// User with job attributes and an append-only assignment history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    name: NonEmptyString,
    #[serde(flatten)]
    profile: JobProfile,
    #[serde(default)]
    roles: Vec<UserRole>,
}

impl User {
    /// Creates a user without assignments.
    pub fn new(id: UserId, name: impl Into<String>, profile: JobProfile) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            profile,
            roles: Vec::new(),
        })
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the job profile.
    #[must_use]
    pub fn profile(&self) -> &JobProfile {
        &self.profile
    }

    /// Returns the assignment history in insertion order.
    #[must_use]
    pub fn roles(&self) -> &[UserRole] {
        &self.roles
    }

    /// Returns whether the user holds an active grant of the role.
    #[must_use]
    pub fn holds_active_role(&self, role_id: &RoleId, as_of: NaiveDate) -> bool {
        self.roles
            .iter()
            .any(|assignment| assignment.role_id() == role_id && assignment.is_active(as_of))
    }

    /// Counts active exception grants, as shown on the exception-handling list.
    #[must_use]
    pub fn active_exception_count(&self, as_of: NaiveDate) -> usize {
        self.roles
            .iter()
            .filter(|assignment| {
                assignment.assignment_type() == AssignmentType::Exception
                    && assignment.is_active(as_of)
            })
            .count()
    }

    /// Returns the history with active grants first, otherwise in insertion order.
    #[must_use]
    pub fn history_view(&self, as_of: NaiveDate) -> Vec<&UserRole> {
        let mut view: Vec<&UserRole> = self.roles.iter().collect();
        view.sort_by_key(|assignment| assignment.status(as_of) != AssignmentStatus::Active);
        view
    }

    pub(crate) fn roles_mut(&mut self) -> &mut Vec<UserRole> {
        &mut self.roles
    }
}
