use rolepilot_domain::{AppAccess, DayTypeAccess, FunctionalityAccess, Role, RolePermission};
use tracing::info;

use super::*;

/// Input payload for creating or replacing a role definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInput {
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// One permission per attribute.
    pub permissions: Vec<RolePermission>,
    /// Application grants on registered applications. Entries without actions are dropped.
    pub app_access: Vec<AppAccess>,
    /// Write window in days; only allowed when some application grants write.
    pub write_restriction_days: Option<u32>,
    /// Functionality view access.
    pub functionality_access: FunctionalityAccess,
    /// Day-type access.
    pub day_type_access: DayTypeAccess,
}

impl RoleInput {
    fn apply_settings(self, role: &mut Role) -> AppResult<()> {
        role.set_app_access(self.app_access);
        role.set_write_restriction_days(self.write_restriction_days)?;
        role.set_functionality_access(self.functionality_access);
        role.set_day_type_access(self.day_type_access);
        Ok(())
    }
}

impl AccessAdminService {
    /// Lists every role.
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.role_repository.list_roles().await
    }

    /// Creates a role with a generated identifier and emits an audit event.
    pub async fn create_role(&self, actor: &ActorIdentity, input: RoleInput) -> AppResult<Role> {
        let mut role = Role::new(
            RoleId::generate(),
            input.name.as_str(),
            input.description.as_str(),
            input.permissions.clone(),
        )?;
        self.ensure_apps_registered(&input.app_access).await?;
        input.apply_settings(&mut role)?;

        self.role_repository.save_role(role.clone()).await?;
        info!(role_id = %role.id(), role_name = %role.name(), "role created");

        self.audit(
            actor,
            AuditAction::RoleCreated,
            "role",
            role.id().to_string(),
            format!("created role '{}'", role.name()),
        )
        .await?;

        Ok(role)
    }

    /// Replaces an existing role's definition and emits an audit event.
    pub async fn update_role(
        &self,
        actor: &ActorIdentity,
        role_id: &RoleId,
        input: RoleInput,
    ) -> AppResult<Role> {
        let mut role = self
            .role_repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        role.rename(input.name.as_str(), input.description.as_str())?;
        role.set_permissions(input.permissions.clone())?;
        self.ensure_apps_registered(&input.app_access).await?;
        input.apply_settings(&mut role)?;

        self.role_repository.save_role(role.clone()).await?;
        info!(role_id = %role_id, role_name = %role.name(), "role updated");

        self.audit(
            actor,
            AuditAction::RoleUpdated,
            "role",
            role_id.to_string(),
            format!("updated role '{}'", role.name()),
        )
        .await?;

        Ok(role)
    }

    /// Deletes a role and emits an audit event.
    ///
    /// Existing assignments keep referencing the deleted identifier.
    pub async fn delete_role(&self, actor: &ActorIdentity, role_id: &RoleId) -> AppResult<()> {
        self.role_repository.delete_role(role_id).await?;
        info!(role_id = %role_id, "role deleted");

        self.audit(
            actor,
            AuditAction::RoleDeleted,
            "role",
            role_id.to_string(),
            format!("deleted role '{role_id}'"),
        )
        .await
    }
}
