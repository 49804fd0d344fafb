//! Grant, revoke and reconcile operations over a user's assignment history.
//!
//! History is append-only: grants push a record, revocation stamps
//! `removed_on` on an existing one. Nothing is ever deleted.

use chrono::NaiveDate;
use rolepilot_core::{AppError, AppResult};

use crate::{
    AssignmentStatus, DefaultAssignmentRule, RoleId, User, UserRole, resolve_default_roles,
};

/// Parameters of a manual, time-boxed grant.
///
/// All fields are optional so incomplete submissions surface as
/// configuration errors instead of being defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionGrant {
    /// Justification recorded with the grant.
    pub reason: Option<String>,
    /// First day of the validity window.
    pub start_date: Option<NaiveDate>,
    /// Last day of the validity window.
    pub end_date: Option<NaiveDate>,
}

/// Appends an exception grant made by `acting_admin` on `today`.
///
/// Fails with `Conflict` when the user already holds the role actively.
pub fn grant_exception(
    user: &mut User,
    role_id: &RoleId,
    grant: ExceptionGrant,
    acting_admin: &str,
    today: NaiveDate,
) -> AppResult<UserRole> {
    let (Some(reason), Some(start_date), Some(end_date)) =
        (grant.reason, grant.start_date, grant.end_date)
    else {
        return Err(AppError::Configuration(
            "exception grant requires reason, start date and end date".to_owned(),
        ));
    };

    let assignment = UserRole::exception_grant(
        role_id.clone(),
        today,
        acting_admin,
        reason.as_str(),
        start_date,
        end_date,
    )?;
    ensure_not_actively_held(user, role_id, today)?;

    user.roles_mut().push(assignment.clone());
    Ok(assignment)
}

/// Appends an automatic grant recorded on `today`.
pub fn grant_default(user: &mut User, role_id: &RoleId, today: NaiveDate) -> AppResult<UserRole> {
    ensure_not_actively_held(user, role_id, today)?;

    let assignment = UserRole::default_grant(role_id.clone(), today);
    user.roles_mut().push(assignment.clone());
    Ok(assignment)
}

/// Stamps `removed_on = as_of` on the grant identified by role and assignment date.
///
/// Only an active grant can be revoked; a second revocation fails and leaves
/// the first removal date untouched.
pub fn revoke(
    user: &mut User,
    role_id: &RoleId,
    assigned_on: NaiveDate,
    as_of: NaiveDate,
) -> AppResult<UserRole> {
    let user_id = user.id().clone();
    let roles = user.roles_mut();

    // Several records may share a key when a role is re-granted on the day it was removed.
    let position = roles
        .iter()
        .position(|assignment| {
            assignment.has_key(role_id, assigned_on) && assignment.is_active(as_of)
        })
        .or_else(|| {
            roles
                .iter()
                .position(|assignment| assignment.has_key(role_id, assigned_on))
        });

    let Some(position) = position else {
        return Err(AppError::NotFound(format!(
            "user '{user_id}' has no assignment of role '{role_id}' on {assigned_on}"
        )));
    };

    let assignment = &mut roles[position];
    let status = assignment.status(as_of);
    if status != AssignmentStatus::Active {
        return Err(AppError::InvalidStateTransition(format!(
            "assignment of role '{role_id}' on {assigned_on} for user '{user_id}' is {status}"
        )));
    }

    assignment.mark_removed(as_of);
    Ok(assignment.clone())
}

/// Grants every default role the user's profile resolves to but does not actively hold.
///
/// Returns the appended records in role-id order.
pub fn reconcile_default_assignments(
    user: &mut User,
    rules: &[DefaultAssignmentRule],
    today: NaiveDate,
) -> AppResult<Vec<UserRole>> {
    let resolved = resolve_default_roles(rules, user.profile())?;

    let mut granted = Vec::new();
    for role_id in resolved {
        if !user.holds_active_role(&role_id, today) {
            granted.push(grant_default(user, &role_id, today)?);
        }
    }

    Ok(granted)
}

fn ensure_not_actively_held(user: &User, role_id: &RoleId, as_of: NaiveDate) -> AppResult<()> {
    if user.holds_active_role(role_id, as_of) {
        return Err(AppError::Conflict(format!(
            "user '{}' already holds role '{role_id}'",
            user.id()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rolepilot_core::AppError;

    use super::{
        ExceptionGrant, grant_default, grant_exception, reconcile_default_assignments, revoke,
    };
    use crate::{
        AssignmentStatus, Attribute, DefaultAssignmentRule, JobProfile, RoleId, RuleId, User,
        UserId,
    };

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or_else(|_| panic!("bad date"))
    }

    fn role_id(value: &str) -> RoleId {
        RoleId::new(value).unwrap_or_else(|_| panic!("id"))
    }

    fn captain() -> User {
        User::new(
            UserId::new("U001").unwrap_or_else(|_| panic!("id")),
            "Captain Müller",
            JobProfile::new("Captain").with(Attribute::Ship, "ATL"),
        )
        .unwrap_or_else(|error| panic!("user: {error}"))
    }

    fn window(start: &str, end: &str) -> ExceptionGrant {
        ExceptionGrant {
            reason: Some("Temporary project lead".to_owned()),
            start_date: Some(date(start)),
            end_date: Some(date(end)),
        }
    }

    #[test]
    fn exception_grant_is_appended_with_admin_and_today() {
        let mut user = captain();
        let today = date("2024-06-15");

        let granted = grant_exception(
            &mut user,
            &role_id("role-6"),
            window("2024-07-01", "2024-12-31"),
            "admin-7",
            today,
        )
        .unwrap_or_else(|error| panic!("grant: {error}"));

        assert_eq!(granted.assigned_on(), today);
        assert_eq!(granted.assigned_by().as_str(), "admin-7");
        assert_eq!(user.roles(), &[granted]);
    }

    #[test]
    fn inverted_window_creates_nothing() {
        let mut user = captain();
        let result = grant_exception(
            &mut user,
            &role_id("role-6"),
            window("2024-07-01", "2024-06-01"),
            "admin-7",
            date("2024-05-01"),
        );

        assert!(matches!(result, Err(AppError::InvalidRange(_))));
        assert!(user.roles().is_empty());
    }

    #[test]
    fn incomplete_exception_is_configuration_error() {
        let mut user = captain();
        let grant = ExceptionGrant {
            reason: Some("Project".to_owned()),
            start_date: Some(date("2024-07-01")),
            end_date: None,
        };
        let result = grant_exception(
            &mut user,
            &role_id("role-6"),
            grant,
            "admin-7",
            date("2024-05-01"),
        );

        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert!(user.roles().is_empty());
    }

    #[test]
    fn active_role_cannot_be_granted_twice() {
        let mut user = captain();
        let today = date("2025-01-01");
        assert!(grant_default(&mut user, &role_id("role-1"), today).is_ok());

        let result = grant_exception(
            &mut user,
            &role_id("role-1"),
            window("2025-01-01", "2025-02-01"),
            "admin-7",
            today,
        );
        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(user.roles().len(), 1);
    }

    #[test]
    fn expired_role_can_be_granted_again() {
        let mut user = captain();
        assert!(
            grant_exception(
                &mut user,
                &role_id("role-3"),
                window("2024-01-15", "2024-03-15"),
                "admin-7",
                date("2024-01-01"),
            )
            .is_ok()
        );

        let regrant = grant_exception(
            &mut user,
            &role_id("role-3"),
            window("2024-05-01", "2024-06-01"),
            "admin-7",
            date("2024-04-01"),
        );
        assert!(regrant.is_ok());
        assert_eq!(user.roles().len(), 2);
    }

    #[test]
    fn second_revoke_is_rejected_and_keeps_first_date() {
        let mut user = captain();
        let assigned_on = date("2025-01-01");
        assert!(grant_default(&mut user, &role_id("role-1"), assigned_on).is_ok());

        let first = revoke(&mut user, &role_id("role-1"), assigned_on, date("2025-02-01"))
            .unwrap_or_else(|error| panic!("revoke: {error}"));
        assert_eq!(first.removed_on(), Some(date("2025-02-01")));

        let second = revoke(&mut user, &role_id("role-1"), assigned_on, date("2025-03-01"));
        assert!(matches!(second, Err(AppError::InvalidStateTransition(_))));
        assert_eq!(user.roles()[0].removed_on(), Some(date("2025-02-01")));
    }

    #[test]
    fn expired_assignment_cannot_be_revoked() {
        let mut user = captain();
        assert!(
            grant_exception(
                &mut user,
                &role_id("role-3"),
                window("2024-01-15", "2024-03-15"),
                "admin-7",
                date("2024-01-01"),
            )
            .is_ok()
        );

        let result = revoke(
            &mut user,
            &role_id("role-3"),
            date("2024-01-01"),
            date("2024-06-01"),
        );
        assert!(matches!(result, Err(AppError::InvalidStateTransition(_))));
        assert_eq!(
            user.roles()[0].status(date("2024-06-01")),
            AssignmentStatus::Expired
        );
    }

    #[test]
    fn revoke_of_unknown_key_is_not_found() {
        let mut user = captain();
        let result = revoke(
            &mut user,
            &role_id("role-1"),
            date("2025-01-01"),
            date("2025-02-01"),
        );
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn revoke_targets_active_record_when_key_repeats() {
        let mut user = captain();
        let day = date("2025-01-01");
        assert!(grant_default(&mut user, &role_id("role-1"), day).is_ok());
        assert!(revoke(&mut user, &role_id("role-1"), day, day).is_ok());
        assert!(grant_default(&mut user, &role_id("role-1"), day).is_ok());

        let revoked = revoke(&mut user, &role_id("role-1"), day, day);
        assert!(revoked.is_ok());
        assert!(
            user.roles()
                .iter()
                .all(|assignment| assignment.status(day) == AssignmentStatus::Removed)
        );
    }

    #[test]
    fn reconcile_grants_only_missing_roles() {
        let mut user = captain();
        let today = date("2025-01-02");
        assert!(grant_default(&mut user, &role_id("role-1"), date("2025-01-01")).is_ok());

        let rules = vec![
            DefaultAssignmentRule::new(
                RuleId::new("rule-1").unwrap_or_else(|_| panic!("id")),
                "Captain",
                [role_id("role-1")],
            )
            .and_then(|rule| rule.with_constraint(Attribute::Ship, "ATL"))
            .unwrap_or_else(|error| panic!("rule: {error}")),
            DefaultAssignmentRule::new(
                RuleId::new("rule-9").unwrap_or_else(|_| panic!("id")),
                "Captain",
                [role_id("role-9")],
            )
            .unwrap_or_else(|error| panic!("rule: {error}")),
        ];

        let granted = reconcile_default_assignments(&mut user, &rules, today)
            .unwrap_or_else(|error| panic!("reconcile: {error}"));
        assert_eq!(granted.len(), 1);
        assert_eq!(granted[0].role_id().as_str(), "role-9");

        let again = reconcile_default_assignments(&mut user, &rules, today)
            .unwrap_or_else(|error| panic!("reconcile: {error}"));
        assert!(again.is_empty());
        assert_eq!(user.roles().len(), 2);
    }
}
