//! Domain entities and invariants for attribute-scoped role access.

#![forbid(unsafe_code)]

mod access;
mod application;
mod assignment;
mod attribute;
mod audit;
mod default_rule;
mod lifecycle;
mod role;
mod scope;
mod security;
mod user;

pub use access::{AccessContext, authorize};
pub use application::{Application, ApplicationId};
pub use assignment::{
    AssignedBy, AssignmentKey, AssignmentStatus, AssignmentType, UserRole, assignment_status,
};
pub use attribute::Attribute;
pub use audit::{AccessSummary, AuditFilter, AuditRecord, access_summary, audit_records};
pub use default_rule::{DefaultAssignmentRule, RuleId, resolve_default_roles};
pub use lifecycle::{
    ExceptionGrant, grant_default, grant_exception, reconcile_default_assignments, revoke,
};
pub use role::{
    AppAccess, AppAction, DAY_TYPE_CODES, DayTypeAccess, FunctionalityAccess, Role, RoleId,
    RolePermission,
};
pub use scope::{PermissionValue, matches as scope_matches};
pub use security::AuditAction;
pub use user::{JobProfile, User, UserId};
