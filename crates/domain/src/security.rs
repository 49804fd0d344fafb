use std::str::FromStr;

use rolepilot_core::AppError;
use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by administrative use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when a role's permissions or access settings change.
    RoleUpdated,
    /// Emitted when a role is deleted.
    RoleDeleted,
    /// Emitted when an application is registered.
    ApplicationCreated,
    /// Emitted when an application's name or role collection changes.
    ApplicationUpdated,
    /// Emitted when an application is removed from the registry.
    ApplicationDeleted,
    /// Emitted when a default-assignment rule is created or replaced.
    DefaultRuleSaved,
    /// Emitted when a default-assignment rule is deleted.
    DefaultRuleDeleted,
    /// Emitted when reconciliation grants a default role.
    DefaultRoleAssigned,
    /// Emitted when an administrator grants an exception.
    ExceptionGranted,
    /// Emitted when an assignment is revoked.
    AssignmentRevoked,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleCreated => "role.created",
            Self::RoleUpdated => "role.updated",
            Self::RoleDeleted => "role.deleted",
            Self::ApplicationCreated => "application.created",
            Self::ApplicationUpdated => "application.updated",
            Self::ApplicationDeleted => "application.deleted",
            Self::DefaultRuleSaved => "default_rule.saved",
            Self::DefaultRuleDeleted => "default_rule.deleted",
            Self::DefaultRoleAssigned => "assignment.default_granted",
            Self::ExceptionGranted => "assignment.exception_granted",
            Self::AssignmentRevoked => "assignment.revoked",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AuditAction] = &[
            AuditAction::RoleCreated,
            AuditAction::RoleUpdated,
            AuditAction::RoleDeleted,
            AuditAction::ApplicationCreated,
            AuditAction::ApplicationUpdated,
            AuditAction::ApplicationDeleted,
            AuditAction::DefaultRuleSaved,
            AuditAction::DefaultRuleDeleted,
            AuditAction::DefaultRoleAssigned,
            AuditAction::ExceptionGranted,
            AuditAction::AssignmentRevoked,
        ];

        ALL
    }
}

impl FromStr for AuditAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown audit action '{value}'")))
    }
}
