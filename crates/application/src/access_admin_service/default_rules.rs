use rolepilot_domain::{Attribute, DefaultAssignmentRule, RuleId};
use tracing::info;

use super::*;

/// Input payload for creating or replacing a default-assignment rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultRuleInput {
    /// Mandatory job title.
    pub job_title: String,
    /// Roles granted to matching users.
    pub role_ids: Vec<RoleId>,
    /// Optional attribute constraints. Blank values are ignored.
    pub constraints: Vec<(Attribute, String)>,
}

impl DefaultRuleInput {
    fn into_rule(self, rule_id: RuleId) -> AppResult<DefaultAssignmentRule> {
        self.constraints.into_iter().try_fold(
            DefaultAssignmentRule::new(rule_id, self.job_title, self.role_ids)?,
            |rule, (attribute, value)| rule.with_constraint(attribute, value),
        )
    }
}

impl AccessAdminService {
    /// Lists every default-assignment rule.
    pub async fn list_default_rules(&self) -> AppResult<Vec<DefaultAssignmentRule>> {
        self.rule_repository.list_rules().await
    }

    /// Creates a rule with a generated identifier and emits an audit event.
    pub async fn create_default_rule(
        &self,
        actor: &ActorIdentity,
        input: DefaultRuleInput,
    ) -> AppResult<DefaultAssignmentRule> {
        self.save_default_rule(actor, RuleId::generate(), input)
            .await
    }

    /// Replaces an existing rule and emits an audit event.
    pub async fn update_default_rule(
        &self,
        actor: &ActorIdentity,
        rule_id: &RuleId,
        input: DefaultRuleInput,
    ) -> AppResult<DefaultAssignmentRule> {
        let exists = self
            .rule_repository
            .list_rules()
            .await?
            .iter()
            .any(|rule| rule.id() == rule_id);
        if !exists {
            return Err(AppError::NotFound(format!(
                "default rule '{rule_id}' does not exist"
            )));
        }

        self.save_default_rule(actor, rule_id.clone(), input).await
    }

    /// Deletes a rule and emits an audit event.
    pub async fn delete_default_rule(
        &self,
        actor: &ActorIdentity,
        rule_id: &RuleId,
    ) -> AppResult<()> {
        self.rule_repository.delete_rule(rule_id).await?;
        info!(rule_id = %rule_id, "default rule deleted");

        self.audit(
            actor,
            AuditAction::DefaultRuleDeleted,
            "default_rule",
            rule_id.to_string(),
            format!("deleted default rule '{rule_id}'"),
        )
        .await
    }

    async fn save_default_rule(
        &self,
        actor: &ActorIdentity,
        rule_id: RuleId,
        input: DefaultRuleInput,
    ) -> AppResult<DefaultAssignmentRule> {
        self.ensure_roles_exist(&input.role_ids).await?;
        let rule = input.into_rule(rule_id)?;

        self.rule_repository.save_rule(rule.clone()).await?;
        info!(
            rule_id = %rule.id(),
            job_title = %rule.job_title(),
            role_count = rule.role_ids().len(),
            "default rule saved"
        );

        self.audit(
            actor,
            AuditAction::DefaultRuleSaved,
            "default_rule",
            rule.id().to_string(),
            format!("saved default rule for job title '{}'", rule.job_title()),
        )
        .await?;

        Ok(rule)
    }
}
