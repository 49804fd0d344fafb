use std::collections::BTreeSet;

use chrono::NaiveDate;
use rolepilot_domain::{
    AuditAction, DefaultAssignmentRule, UserRole, reconcile_default_assignments,
};
use tracing::{info, warn};

use super::*;

use crate::AuditEvent;

/// Default roles granted to one user during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserReconciliation {
    /// Reconciled user.
    pub user_id: UserId,
    /// Records appended to the user's history.
    pub granted: Vec<UserRole>,
}

/// Outcome of reconciling every user against the default rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationReport {
    /// Date the grants were recorded on.
    pub as_of: NaiveDate,
    /// Number of users examined.
    pub users_scanned: usize,
    /// Users that received at least one new grant.
    pub users: Vec<UserReconciliation>,
}

impl ReconciliationReport {
    /// Returns the total number of appended grants.
    #[must_use]
    pub fn granted_count(&self) -> usize {
        self.users.iter().map(|user| user.granted.len()).sum()
    }
}

impl AssignmentService {
    /// Appends every default role the user should hold but does not hold actively.
    pub async fn reconcile_user(
        &self,
        actor: &ActorIdentity,
        user_id: &UserId,
    ) -> AppResult<Vec<UserRole>> {
        let rules = self.rule_repository.list_rules().await?;
        let known_roles = self.known_role_ids().await?;
        let user = self.load_user(user_id).await?;

        self.reconcile_loaded_user(actor, user, &rules, &known_roles, self.clock.today())
            .await
    }

    /// Reconciles every user. Rules are read once for the whole pass.
    pub async fn reconcile_all(&self, actor: &ActorIdentity) -> AppResult<ReconciliationReport> {
        let rules = self.rule_repository.list_rules().await?;
        let known_roles = self.known_role_ids().await?;
        let users = self.user_repository.list_users().await?;
        let today = self.clock.today();

        let users_scanned = users.len();
        let mut reconciled = Vec::new();
        for user in users {
            let user_id = user.id().clone();
            let granted = self
                .reconcile_loaded_user(actor, user, &rules, &known_roles, today)
                .await?;
            if !granted.is_empty() {
                reconciled.push(UserReconciliation { user_id, granted });
            }
        }

        let report = ReconciliationReport {
            as_of: today,
            users_scanned,
            users: reconciled,
        };
        info!(
            as_of = %today,
            users_scanned = report.users_scanned,
            granted = report.granted_count(),
            "default assignments reconciled"
        );

        Ok(report)
    }

    async fn reconcile_loaded_user(
        &self,
        actor: &ActorIdentity,
        mut user: User,
        rules: &[DefaultAssignmentRule],
        known_roles: &BTreeSet<RoleId>,
        today: NaiveDate,
    ) -> AppResult<Vec<UserRole>> {
        let granted = reconcile_default_assignments(&mut user, rules, today)?;
        if granted.is_empty() {
            return Ok(granted);
        }

        let user_id = user.id().clone();
        self.user_repository.save_user(user).await?;

        for assignment in &granted {
            let role_id = assignment.role_id();
            if !known_roles.contains(role_id) {
                warn!(
                    user_id = %user_id,
                    role_id = %role_id,
                    "default rule grants an unknown role"
                );
            }
            info!(user_id = %user_id, role_id = %role_id, "default role granted");

            self.audit_repository
                .append_event(AuditEvent {
                    subject: actor.subject().to_owned(),
                    action: AuditAction::DefaultRoleAssigned,
                    resource_type: "user_role".to_owned(),
                    resource_id: assignment_resource_id(&user_id, assignment.key()),
                    detail: Some(format!(
                        "reconciled default role '{role_id}' for '{user_id}'"
                    )),
                })
                .await?;
        }

        Ok(granted)
    }

    async fn known_role_ids(&self) -> AppResult<BTreeSet<RoleId>> {
        Ok(self
            .role_repository
            .list_roles()
            .await?
            .into_iter()
            .map(|role| role.id().clone())
            .collect())
    }
}
