use std::sync::Arc;

use chrono::NaiveDate;
use rolepilot_core::{AppError, AppResult};
use rolepilot_domain::{AccessContext, Role, RoleId, UserId, authorize};
use tracing::{debug, warn};

use crate::{Clock, RoleRepository, UserRepository};

#[cfg(test)]
mod tests;

/// Application service answering access questions for stored roles and users.
#[derive(Clone)]
pub struct AuthorizationService {
    role_repository: Arc<dyn RoleRepository>,
    user_repository: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl AuthorizationService {
    /// Creates a new authorization service from repository implementations.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        user_repository: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            role_repository,
            user_repository,
            clock,
        }
    }

    /// Evaluates one stored role against a request context.
    pub async fn authorize_role(
        &self,
        role_id: &RoleId,
        context: &AccessContext,
    ) -> AppResult<bool> {
        let role = self
            .role_repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        authorize(&role, context)
    }

    /// Returns whether any role the user actively holds authorizes the context.
    ///
    /// Every held role is evaluated, so configuration and dynamic-scope errors
    /// surface regardless of the order of the assignment history.
    pub async fn authorize_user(
        &self,
        user_id: &UserId,
        context: &AccessContext,
    ) -> AppResult<bool> {
        let mut granted = false;
        for role in self.active_roles(user_id).await? {
            if authorize(&role, context)? {
                debug!(user_id = %user_id, role_id = %role.id(), "access granted");
                granted = true;
            }
        }

        Ok(granted)
    }

    /// Returns whether the user may read the application.
    pub async fn can_read_app(&self, user_id: &UserId, app_name: &str) -> AppResult<bool> {
        Ok(self
            .active_roles(user_id)
            .await?
            .iter()
            .any(|role| role.can_read_app(app_name)))
    }

    /// Returns whether the user may write a record dated `record_date` in the application.
    pub async fn can_write_record(
        &self,
        user_id: &UserId,
        app_name: &str,
        record_date: NaiveDate,
    ) -> AppResult<bool> {
        let today = self.clock.today();

        Ok(self.active_roles(user_id).await?.iter().any(|role| {
            role.can_write_app(app_name) && role.write_allowed_on(record_date, today)
        }))
    }

    async fn active_roles(&self, user_id: &UserId) -> AppResult<Vec<Role>> {
        let user = self
            .user_repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        let today = self.clock.today();

        let mut roles = Vec::new();
        for assignment in user.roles() {
            if !assignment.is_active(today) {
                continue;
            }

            match self.role_repository.find_role(assignment.role_id()).await? {
                Some(role) => roles.push(role),
                None => warn!(
                    user_id = %user_id,
                    role_id = %assignment.role_id(),
                    "active assignment references an unknown role"
                ),
            }
        }

        Ok(roles)
    }
}
