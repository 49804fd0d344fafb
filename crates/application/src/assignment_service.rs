use std::sync::Arc;

use rolepilot_core::{ActorIdentity, AppError, AppResult};
use rolepilot_domain::{Role, RoleId, User, UserId};

use crate::{AuditRepository, Clock, DefaultRuleRepository, RoleRepository, UserRepository};

mod grants;
mod reconcile;
mod reporting;


pub use reconcile::{ReconciliationReport, UserReconciliation};

/// Application service owning the assignment lifecycle of every user.
#[derive(Clone)]
pub struct AssignmentService {
    user_repository: Arc<dyn UserRepository>,
    role_repository: Arc<dyn RoleRepository>,
    rule_repository: Arc<dyn DefaultRuleRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
}

impl AssignmentService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        role_repository: Arc<dyn RoleRepository>,
        rule_repository: Arc<dyn DefaultRuleRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repository,
            role_repository,
            rule_repository,
            audit_repository,
            clock,
        }
    }

    async fn load_user(&self, user_id: &UserId) -> AppResult<User> {
        self.user_repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    async fn load_role(&self, role_id: &RoleId) -> AppResult<Role> {
        self.role_repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }
}

fn assignment_resource_id(user_id: &UserId, key: impl std::fmt::Display) -> String {
    format!("{user_id}:{key}")
}
