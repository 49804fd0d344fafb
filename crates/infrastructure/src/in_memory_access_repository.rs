use std::collections::HashMap;

use async_trait::async_trait;
use rolepilot_application::{
    ApplicationRepository, DefaultRuleRepository, RoleRepository, UserRepository,
};
use rolepilot_core::{AppError, AppResult};
use rolepilot_domain::{
    Application, ApplicationId, DefaultAssignmentRule, Role, RoleId, RuleId, User, UserId,
};
use tokio::sync::RwLock;

use crate::AccessSnapshot;

#[cfg(test)]
mod tests;

/// In-memory repository for roles, users, default rules and registered applications.
#[derive(Debug, Default)]
pub struct InMemoryAccessRepository {
    roles: RwLock<HashMap<RoleId, Role>>,
    users: RwLock<HashMap<UserId, User>>,
    rules: RwLock<HashMap<RuleId, DefaultAssignmentRule>>,
    applications: RwLock<HashMap<ApplicationId, Application>>,
}

impl InMemoryAccessRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository seeded from a snapshot.
    pub fn from_snapshot(snapshot: AccessSnapshot) -> AppResult<Self> {
        snapshot.ensure_unique_ids()?;

        Ok(Self {
            roles: RwLock::new(
                snapshot
                    .roles
                    .into_iter()
                    .map(|role| (role.id().clone(), role))
                    .collect(),
            ),
            users: RwLock::new(
                snapshot
                    .users
                    .into_iter()
                    .map(|user| (user.id().clone(), user))
                    .collect(),
            ),
            rules: RwLock::new(
                snapshot
                    .default_rules
                    .into_iter()
                    .map(|rule| (rule.id().clone(), rule))
                    .collect(),
            ),
            applications: RwLock::new(
                snapshot
                    .applications
                    .into_iter()
                    .map(|application| (application.id().clone(), application))
                    .collect(),
            ),
        })
    }

    /// Captures the current contents, ordered by identifier.
    pub async fn snapshot(&self) -> AccessSnapshot {
        let mut roles: Vec<Role> = self.roles.read().await.values().cloned().collect();
        roles.sort_by(|left, right| left.id().cmp(right.id()));

        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|left, right| left.id().cmp(right.id()));

        let mut default_rules: Vec<DefaultAssignmentRule> =
            self.rules.read().await.values().cloned().collect();
        default_rules.sort_by(|left, right| left.id().cmp(right.id()));

        let mut applications: Vec<Application> =
            self.applications.read().await.values().cloned().collect();
        applications.sort_by(|left, right| left.id().cmp(right.id()));

        AccessSnapshot {
            roles,
            users,
            default_rules,
            applications,
        }
    }
}

#[async_trait]
impl RoleRepository for InMemoryAccessRepository {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let mut roles: Vec<Role> = self.roles.read().await.values().cloned().collect();
        roles.sort_by(|left, right| left.id().cmp(right.id()));
        Ok(roles)
    }

    async fn find_role(&self, role_id: &RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.read().await.get(role_id).cloned())
    }

    async fn save_role(&self, role: Role) -> AppResult<()> {
        self.roles.write().await.insert(role.id().clone(), role);
        Ok(())
    }

    async fn delete_role(&self, role_id: &RoleId) -> AppResult<()> {
        self.roles
            .write()
            .await
            .remove(role_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }
}

#[async_trait]
impl UserRepository for InMemoryAccessRepository {
    async fn list_users(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|left, right| left.id().cmp(right.id()));
        Ok(users)
    }

    async fn find_user(&self, user_id: &UserId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn save_user(&self, user: User) -> AppResult<()> {
        self.users.write().await.insert(user.id().clone(), user);
        Ok(())
    }
}

#[async_trait]
impl DefaultRuleRepository for InMemoryAccessRepository {
    async fn list_rules(&self) -> AppResult<Vec<DefaultAssignmentRule>> {
        let mut rules: Vec<DefaultAssignmentRule> =
            self.rules.read().await.values().cloned().collect();
        rules.sort_by(|left, right| left.id().cmp(right.id()));
        Ok(rules)
    }

    async fn save_rule(&self, rule: DefaultAssignmentRule) -> AppResult<()> {
        self.rules.write().await.insert(rule.id().clone(), rule);
        Ok(())
    }

    async fn delete_rule(&self, rule_id: &RuleId) -> AppResult<()> {
        self.rules
            .write()
            .await
            .remove(rule_id)
            .map(|_| ())
            .ok_or_else(|| {
                AppError::NotFound(format!("default rule '{rule_id}' does not exist"))
            })
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryAccessRepository {
    async fn list_applications(&self) -> AppResult<Vec<Application>> {
        let mut applications: Vec<Application> =
            self.applications.read().await.values().cloned().collect();
        applications.sort_by(|left, right| left.id().cmp(right.id()));
        Ok(applications)
    }

    async fn find_application(
        &self,
        application_id: &ApplicationId,
    ) -> AppResult<Option<Application>> {
        Ok(self.applications.read().await.get(application_id).cloned())
    }

    async fn save_application(&self, application: Application) -> AppResult<()> {
        self.applications.write().await.insert(application.id().clone(), application);
        Ok(())
    }

    async fn delete_application(&self, application_id: &ApplicationId) -> AppResult<()> {
        self.applications
            .write()
            .await
            .remove(application_id)
            .map(|_| ())
            .ok_or_else(|| {
                AppError::NotFound(format!("application '{application_id}' does not exist"))
            })
    }
}
