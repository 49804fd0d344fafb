use rolepilot_domain::{
    AccessSummary, AssignmentStatus, AssignmentType, AuditFilter, AuditRecord, UserRole,
    access_summary, audit_records,
};

use super::*;

use crate::AuditEvent;

impl AssignmentService {
    /// Returns the filtered audit view as of today, newest grants first.
    pub async fn audit_records(&self, filter: &AuditFilter) -> AppResult<Vec<AuditRecord>> {
        let users = self.user_repository.list_users().await?;
        let roles = self.role_repository.list_roles().await?;

        Ok(audit_records(&users, &roles, filter, self.clock.today()))
    }

    /// Returns exception grants whose validity window has ended.
    pub async fn expired_exceptions(&self) -> AppResult<Vec<AuditRecord>> {
        let filter = AuditFilter {
            assignment_type: Some(AssignmentType::Exception),
            ..AuditFilter::default()
        };
        let mut records = self.audit_records(&filter).await?;
        records.retain(|record| record.status == AssignmentStatus::Expired);

        Ok(records)
    }

    /// Returns one user's history with active grants first.
    pub async fn user_history(&self, user_id: &UserId) -> AppResult<Vec<UserRole>> {
        let user = self.load_user(user_id).await?;

        Ok(user
            .history_view(self.clock.today())
            .into_iter()
            .cloned()
            .collect())
    }

    /// Returns the landing-page counts as of today.
    pub async fn summary(&self) -> AppResult<AccessSummary> {
        let roles = self.role_repository.list_roles().await?;
        let rules = self.rule_repository.list_rules().await?;
        let users = self.user_repository.list_users().await?;

        Ok(access_summary(&roles, &rules, &users, self.clock.today()))
    }

    /// Returns administrative events in append order.
    pub async fn admin_events(&self) -> AppResult<Vec<AuditEvent>> {
        self.audit_repository.list_events().await
    }
}
