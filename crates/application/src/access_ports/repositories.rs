use async_trait::async_trait;

use rolepilot_core::AppResult;
use rolepilot_domain::{
    Application, ApplicationId, DefaultAssignmentRule, Role, RoleId, RuleId, User, UserId,
};

/// Repository port for role definitions.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists every role.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Finds a role by identifier.
    async fn find_role(&self, role_id: &RoleId) -> AppResult<Option<Role>>;

    /// Creates or replaces a role.
    async fn save_role(&self, role: Role) -> AppResult<()>;

    /// Deletes a role. Fails with `NotFound` when it does not exist.
    async fn delete_role(&self, role_id: &RoleId) -> AppResult<()>;
}

/// Repository port for users and their assignment history.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Lists every user.
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Finds a user by identifier.
    async fn find_user(&self, user_id: &UserId) -> AppResult<Option<User>>;

    /// Creates or replaces a user record.
    async fn save_user(&self, user: User) -> AppResult<()>;
}

/// Repository port for default-assignment rules.
#[async_trait]
pub trait DefaultRuleRepository: Send + Sync {
    /// Lists every rule.
    async fn list_rules(&self) -> AppResult<Vec<DefaultAssignmentRule>>;

    /// Creates or replaces a rule.
    async fn save_rule(&self, rule: DefaultAssignmentRule) -> AppResult<()>;

    /// Deletes a rule. Fails with `NotFound` when it does not exist.
    async fn delete_rule(&self, rule_id: &RuleId) -> AppResult<()>;
}

/// Repository port for the application registry.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Lists every registered application.
    async fn list_applications(&self) -> AppResult<Vec<Application>>;

    /// Finds an application by identifier.
    async fn find_application(
        &self,
        application_id: &ApplicationId,
    ) -> AppResult<Option<Application>>;

    /// Creates or replaces an application.
    async fn save_application(&self, application: Application) -> AppResult<()>;

    /// Deletes an application. Fails with `NotFound` when it does not exist.
    async fn delete_application(&self, application_id: &ApplicationId) -> AppResult<()>;
}
