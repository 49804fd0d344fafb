use chrono::NaiveDate;
use rolepilot_domain::{
    AuditAction, ExceptionGrant, UserRole, grant_default, grant_exception, revoke,
};
use tracing::info;

use super::*;

use crate::AuditEvent;

impl AssignmentService {
    /// Grants a time-boxed exception on behalf of the acting administrator.
    pub async fn grant_exception(
        &self,
        actor: &ActorIdentity,
        user_id: &UserId,
        role_id: &RoleId,
        grant: ExceptionGrant,
    ) -> AppResult<UserRole> {
        let mut user = self.load_user(user_id).await?;
        let role = self.load_role(role_id).await?;
        let today = self.clock.today();

        let assignment = grant_exception(&mut user, role_id, grant, actor.subject(), today)?;
        self.user_repository.save_user(user).await?;

        info!(
            user_id = %user_id,
            role_id = %role_id,
            assigned_by = %actor.subject(),
            "exception granted"
        );

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::ExceptionGranted,
                resource_type: "user_role".to_owned(),
                resource_id: assignment_resource_id(user_id, assignment.key()),
                detail: Some(format!(
                    "granted exception role '{}' to '{user_id}': {}",
                    role.name(),
                    assignment.reason().unwrap_or_default()
                )),
            })
            .await?;

        Ok(assignment)
    }

    /// Grants a role automatically, as a default rule would.
    pub async fn grant_default(
        &self,
        actor: &ActorIdentity,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> AppResult<UserRole> {
        let mut user = self.load_user(user_id).await?;
        let role = self.load_role(role_id).await?;
        let today = self.clock.today();

        let assignment = grant_default(&mut user, role_id, today)?;
        self.user_repository.save_user(user).await?;

        info!(user_id = %user_id, role_id = %role_id, "default role granted");

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::DefaultRoleAssigned,
                resource_type: "user_role".to_owned(),
                resource_id: assignment_resource_id(user_id, assignment.key()),
                detail: Some(format!(
                    "granted default role '{}' to '{user_id}'",
                    role.name()
                )),
            })
            .await?;

        Ok(assignment)
    }

    /// Revokes the active grant of a role recorded on `assigned_on`.
    ///
    /// The removal date is today's date from the service clock.
    pub async fn revoke(
        &self,
        actor: &ActorIdentity,
        user_id: &UserId,
        role_id: &RoleId,
        assigned_on: NaiveDate,
    ) -> AppResult<UserRole> {
        let mut user = self.load_user(user_id).await?;
        let today = self.clock.today();

        let assignment = revoke(&mut user, role_id, assigned_on, today)?;
        self.user_repository.save_user(user).await?;

        info!(
            user_id = %user_id,
            role_id = %role_id,
            assigned_on = %assigned_on,
            removed_on = %today,
            "assignment revoked"
        );

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::AssignmentRevoked,
                resource_type: "user_role".to_owned(),
                resource_id: assignment_resource_id(user_id, assignment.key()),
                detail: Some(format!(
                    "revoked role '{role_id}' assigned on {assigned_on} from '{user_id}'"
                )),
            })
            .await?;

        Ok(assignment)
    }
}
