use std::sync::Arc;

use rolepilot_core::{ActorIdentity, AppError, AppResult};
use rolepilot_domain::{AppAccess, AuditAction, RoleId};

use crate::{
    ApplicationRepository, AuditEvent, AuditRepository, Clock, DefaultRuleRepository,
    RoleRepository,
};

mod applications;
mod default_rules;
mod roles;


pub use applications::ApplicationInput;
pub use default_rules::DefaultRuleInput;
pub use roles::RoleInput;

/// Application service for role, application and default-rule administration.
#[derive(Clone)]
pub struct AccessAdminService {
    role_repository: Arc<dyn RoleRepository>,
    rule_repository: Arc<dyn DefaultRuleRepository>,
    application_repository: Arc<dyn ApplicationRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
}

impl AccessAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        rule_repository: Arc<dyn DefaultRuleRepository>,
        application_repository: Arc<dyn ApplicationRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            role_repository,
            rule_repository,
            application_repository,
            audit_repository,
            clock,
        }
    }

    async fn ensure_roles_exist(&self, role_ids: &[RoleId]) -> AppResult<()> {
        for role_id in role_ids {
            if self.role_repository.find_role(role_id).await?.is_none() {
                return Err(AppError::NotFound(format!(
                    "role '{role_id}' does not exist"
                )));
            }
        }

        Ok(())
    }

    async fn ensure_apps_registered(&self, app_access: &[AppAccess]) -> AppResult<()> {
        let applications = self.application_repository.list_applications().await?;
        for entry in app_access {
            if !applications
                .iter()
                .any(|application| application.name() == entry.app_name())
            {
                return Err(AppError::NotFound(format!(
                    "application '{}' is not registered",
                    entry.app_name()
                )));
            }
        }

        Ok(())
    }

    async fn audit(
        &self,
        actor: &ActorIdentity,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action,
                resource_type: resource_type.to_owned(),
                resource_id,
                detail: Some(detail),
            })
            .await
    }
}
