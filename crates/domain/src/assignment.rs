//! Role assignment records and their computed lifecycle status.

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use rolepilot_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::RoleId;

const AUTO_ASSIGNER: &str = "Auto";

/// Who created an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssignedBy {
    /// Produced by a default-assignment rule.
    Auto,
    /// Granted manually by the named administrator.
    Admin(String),
}

impl AssignedBy {
    /// Returns the stored token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Auto => AUTO_ASSIGNER,
            Self::Admin(subject) => subject.as_str(),
        }
    }
}

impl From<String> for AssignedBy {
    fn from(value: String) -> Self {
        if value == AUTO_ASSIGNER {
            Self::Auto
        } else {
            Self::Admin(value)
        }
    }
}

impl From<AssignedBy> for String {
    fn from(value: AssignedBy) -> Self {
        match value {
            AssignedBy::Auto => AUTO_ASSIGNER.to_owned(),
            AssignedBy::Admin(subject) => subject,
        }
    }
}

/// Computed lifecycle status of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentStatus {
    /// Currently grants the role.
    Active,
    /// Validity window ended before the reference date.
    Expired,
    /// Soft-deleted by an administrator.
    Removed,
}

impl AssignmentStatus {
    /// Returns the stable display value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Expired => "Expired",
            Self::Removed => "Removed",
        }
    }
}

impl Display for AssignmentStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Origin of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentType {
    /// Created automatically from a default-assignment rule.
    Default,
    /// Granted manually as a time-boxed exception.
    Exception,
}

impl AssignmentType {
    /// Returns the stable display value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Exception => "Exception",
        }
    }
}

/// Composite key that identifies one of possibly several grants of a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssignmentKey {
    /// Granted role.
    pub role_id: RoleId,
    /// Date the grant was recorded.
    pub assigned_on: NaiveDate,
}

impl Display for AssignmentKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}@{}", self.role_id, self.assigned_on)
    }
}

/// One entry in a user's append-only assignment history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserRoleRecord", into = "UserRoleRecord")]
pub struct UserRole {
    role_id: RoleId,
    assigned_on: NaiveDate,
    assigned_by: AssignedBy,
    reason: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    removed_on: Option<NaiveDate>,
}

impl UserRole {
    /// Creates an automatic assignment produced by a default rule.
    #[must_use]
    pub fn default_grant(role_id: RoleId, assigned_on: NaiveDate) -> Self {
        Self {
            role_id,
            assigned_on,
            assigned_by: AssignedBy::Auto,
            reason: None,
            start_date: None,
            end_date: None,
            removed_on: None,
        }
    }

    /// Creates a time-boxed exception assignment.
    ///
    /// Reason and administrator must be non-blank and the window must not end
    /// before it starts.
    pub fn exception_grant(
        role_id: RoleId,
        assigned_on: NaiveDate,
        assigned_by: &str,
        reason: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<Self> {
        let assigned_by = NonEmptyString::new(assigned_by).map_err(|_| {
            AppError::Configuration("exception grant requires an acting administrator".to_owned())
        })?;
        if assigned_by.as_str() == AUTO_ASSIGNER {
            return Err(AppError::Validation(format!(
                "'{AUTO_ASSIGNER}' is reserved for default assignments"
            )));
        }
        let reason = NonEmptyString::new(reason).map_err(|_| {
            AppError::Configuration("exception grant requires a reason".to_owned())
        })?;
        validate_window(Some(start_date), Some(end_date))?;

        Ok(Self {
            role_id,
            assigned_on,
            assigned_by: AssignedBy::Admin(assigned_by.into()),
            reason: Some(reason.into()),
            start_date: Some(start_date),
            end_date: Some(end_date),
            removed_on: None,
        })
    }

    /// Returns the granted role.
    #[must_use]
    pub fn role_id(&self) -> &RoleId {
        &self.role_id
    }

    /// Returns the date the grant was recorded.
    #[must_use]
    pub fn assigned_on(&self) -> NaiveDate {
        self.assigned_on
    }

    /// Returns who created the grant.
    #[must_use]
    pub fn assigned_by(&self) -> &AssignedBy {
        &self.assigned_by
    }

    /// Returns the justification, for exceptions.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Returns the start of the validity window.
    #[must_use]
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// Returns the end of the validity window.
    #[must_use]
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Returns the soft-deletion date.
    #[must_use]
    pub fn removed_on(&self) -> Option<NaiveDate> {
        self.removed_on
    }

    /// Returns the composite key of this record.
    #[must_use]
    pub fn key(&self) -> AssignmentKey {
        AssignmentKey {
            role_id: self.role_id.clone(),
            assigned_on: self.assigned_on,
        }
    }

    /// Returns whether the record matches the composite key.
    #[must_use]
    pub fn has_key(&self, role_id: &RoleId, assigned_on: NaiveDate) -> bool {
        &self.role_id == role_id && self.assigned_on == assigned_on
    }

    /// Returns `Default` for automatic grants and `Exception` otherwise.
    #[must_use]
    pub fn assignment_type(&self) -> AssignmentType {
        match self.assigned_by {
            AssignedBy::Auto => AssignmentType::Default,
            AssignedBy::Admin(_) => AssignmentType::Exception,
        }
    }

    /// Computes the status as of a reference date.
    ///
    /// Removal wins over any window. A start date in the future does not
    /// delay activation.
    #[must_use]
    pub fn status(&self, as_of: NaiveDate) -> AssignmentStatus {
        if self.removed_on.is_some() {
            return AssignmentStatus::Removed;
        }

        match self.end_date {
            Some(end_date) if end_date < as_of => AssignmentStatus::Expired,
            _ => AssignmentStatus::Active,
        }
    }

    /// Returns whether the record is active as of the reference date.
    #[must_use]
    pub fn is_active(&self, as_of: NaiveDate) -> bool {
        self.status(as_of) == AssignmentStatus::Active
    }

    pub(crate) fn mark_removed(&mut self, removed_on: NaiveDate) {
        self.removed_on = Some(removed_on);
    }
}

/// Computes the status of an assignment as of a reference date.
#[must_use]
pub fn assignment_status(assignment: &UserRole, as_of: NaiveDate) -> AssignmentStatus {
    assignment.status(as_of)
}

fn validate_window(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> AppResult<()> {
    match (start_date, end_date) {
        (Some(start_date), Some(end_date)) if start_date > end_date => {
            Err(AppError::InvalidRange(format!(
                "start date {start_date} is after end date {end_date}"
            )))
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRoleRecord {
    role_id: RoleId,
    assigned_on: NaiveDate,
    assigned_by: AssignedBy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    removed_on: Option<NaiveDate>,
}

impl TryFrom<UserRoleRecord> for UserRole {
    type Error = AppError;

    fn try_from(record: UserRoleRecord) -> Result<Self, Self::Error> {
        validate_window(record.start_date, record.end_date)?;

        Ok(Self {
            role_id: record.role_id,
            assigned_on: record.assigned_on,
            assigned_by: record.assigned_by,
            reason: record.reason,
            start_date: record.start_date,
            end_date: record.end_date,
            removed_on: record.removed_on,
        })
    }
}

impl From<UserRole> for UserRoleRecord {
    fn from(value: UserRole) -> Self {
        Self {
            role_id: value.role_id,
            assigned_on: value.assigned_on,
            assigned_by: value.assigned_by,
            reason: value.reason,
            start_date: value.start_date,
            end_date: value.end_date,
            removed_on: value.removed_on,
        }
    }
}
