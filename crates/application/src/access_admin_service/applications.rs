use rolepilot_domain::{Application, ApplicationId};
use tracing::info;

use super::*;

/// Input payload for registering or editing an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationInput {
    /// Name that role app grants reference. At least two characters.
    pub name: String,
    /// Role collection the application is bound to.
    pub role_collection_id: String,
}

impl AccessAdminService {
    /// Lists every registered application.
    pub async fn list_applications(&self) -> AppResult<Vec<Application>> {
        self.application_repository.list_applications().await
    }

    /// Registers an application and emits an audit event.
    ///
    /// The acting administrator's display name is recorded as the creator.
    pub async fn create_application(
        &self,
        actor: &ActorIdentity,
        input: ApplicationInput,
    ) -> AppResult<Application> {
        let application = Application::new(
            ApplicationId::generate(),
            input.name,
            input.role_collection_id,
            actor.display_name(),
            self.clock.today(),
        )?;
        self.ensure_application_name_free(&application).await?;

        self.application_repository
            .save_application(application.clone())
            .await?;
        info!(
            application_id = %application.id(),
            application_name = %application.name(),
            "application registered"
        );

        self.audit(
            actor,
            AuditAction::ApplicationCreated,
            "application",
            application.id().to_string(),
            format!("registered application '{}'", application.name()),
        )
        .await?;

        Ok(application)
    }

    /// Edits an application's name or role collection and emits an audit event.
    ///
    /// Renaming is refused while a role still grants access under the old name.
    pub async fn update_application(
        &self,
        actor: &ActorIdentity,
        application_id: &ApplicationId,
        input: ApplicationInput,
    ) -> AppResult<Application> {
        let mut application = self.load_application(application_id).await?;
        let previous_name = application.name().to_owned();

        application.update(input.name, input.role_collection_id)?;
        if application.name() != previous_name {
            self.ensure_application_unreferenced(&previous_name).await?;
            self.ensure_application_name_free(&application).await?;
        }

        self.application_repository
            .save_application(application.clone())
            .await?;
        info!(
            application_id = %application_id,
            application_name = %application.name(),
            "application updated"
        );

        self.audit(
            actor,
            AuditAction::ApplicationUpdated,
            "application",
            application_id.to_string(),
            format!("updated application '{}'", application.name()),
        )
        .await?;

        Ok(application)
    }

    /// Removes an application that no role grants access to, and emits an audit event.
    pub async fn delete_application(
        &self,
        actor: &ActorIdentity,
        application_id: &ApplicationId,
    ) -> AppResult<()> {
        let application = self.load_application(application_id).await?;
        self.ensure_application_unreferenced(application.name())
            .await?;

        self.application_repository
            .delete_application(application_id)
            .await?;
        info!(application_id = %application_id, "application deleted");

        self.audit(
            actor,
            AuditAction::ApplicationDeleted,
            "application",
            application_id.to_string(),
            format!("deleted application '{}'", application.name()),
        )
        .await
    }

    async fn load_application(&self, application_id: &ApplicationId) -> AppResult<Application> {
        self.application_repository
            .find_application(application_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("application '{application_id}' does not exist"))
            })
    }

    async fn ensure_application_name_free(&self, application: &Application) -> AppResult<()> {
        let taken = self
            .application_repository
            .list_applications()
            .await?
            .iter()
            .any(|other| other.id() != application.id() && other.name() == application.name());
        if taken {
            return Err(AppError::Conflict(format!(
                "application name '{}' is already registered",
                application.name()
            )));
        }

        Ok(())
    }

    async fn ensure_application_unreferenced(&self, app_name: &str) -> AppResult<()> {
        let referencing_role = self
            .role_repository
            .list_roles()
            .await?
            .into_iter()
            .find(|role| {
                role.app_access()
                    .iter()
                    .any(|entry| entry.app_name() == app_name)
            });
        if let Some(role) = referencing_role {
            return Err(AppError::Conflict(format!(
                "application '{app_name}' is still granted by role '{}'",
                role.id()
            )));
        }

        Ok(())
    }
}
