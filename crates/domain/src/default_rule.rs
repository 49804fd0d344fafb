//! Default-assignment rules keyed on job attributes.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use rolepilot_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Attribute, JobProfile, RoleId};

const OPTIONAL_ATTRIBUTES: &[Attribute] = &[
    Attribute::Company,
    Attribute::Function,
    Attribute::Operation,
    Attribute::Ship,
    Attribute::Department,
];

/// Stable default-rule identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleId(String);

impl RuleId {
    /// Creates a rule identifier from an existing value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::new(value)?.into()))
    }

    /// Generates a fresh rule identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("rule-{}", Uuid::new_v4()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for RuleId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RuleId> for String {
    fn from(value: RuleId) -> Self {
        value.0
    }
}

impl Display for RuleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Maps a job title plus optional attribute constraints to a set of roles.
///
/// An omitted constraint matches any value, including an absent one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultAssignmentRule {
    id: RuleId,
    job_title: String,
    role_ids: BTreeSet<RoleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ship: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    department: Option<String>,
}

impl DefaultAssignmentRule {
    /// Creates a rule for a job title granting at least one role.
    pub fn new(
        id: RuleId,
        job_title: impl Into<String>,
        role_ids: impl IntoIterator<Item = RoleId>,
    ) -> AppResult<Self> {
        let rule = Self {
            id,
            job_title: job_title.into(),
            role_ids: role_ids.into_iter().collect(),
            company: None,
            function: None,
            operation: None,
            ship: None,
            department: None,
        };
        rule.validate()?;
        if rule.role_ids.is_empty() {
            return Err(AppError::Validation(format!(
                "default rule '{}' must grant at least one role",
                rule.id
            )));
        }

        Ok(rule)
    }

    /// Adds an optional attribute constraint. Blank values leave the attribute unconstrained.
    pub fn with_constraint(
        mut self,
        attribute: Attribute,
        value: impl Into<String>,
    ) -> AppResult<Self> {
        let value = value.into();
        let value = (!value.trim().is_empty()).then_some(value);

        match attribute {
            Attribute::Company => self.company = value,
            Attribute::Function => self.function = value,
            Attribute::Operation => self.operation = value,
            Attribute::Ship => self.ship = value,
            Attribute::Department => self.department = value,
            Attribute::JobTitle => {
                return Err(AppError::Validation(
                    "job title is the mandatory rule key, not an optional constraint".to_owned(),
                ));
            }
        }

        Ok(self)
    }

    /// Returns the rule identifier.
    #[must_use]
    pub fn id(&self) -> &RuleId {
        &self.id
    }

    /// Returns the mandatory job title.
    #[must_use]
    pub fn job_title(&self) -> &str {
        self.job_title.as_str()
    }

    /// Returns the roles granted by the rule.
    #[must_use]
    pub fn role_ids(&self) -> &BTreeSet<RoleId> {
        &self.role_ids
    }

    /// Returns the constraint for an optional attribute.
    #[must_use]
    pub fn constraint(&self, attribute: Attribute) -> Option<&str> {
        match attribute {
            Attribute::Company => self.company.as_deref(),
            Attribute::Function => self.function.as_deref(),
            Attribute::Operation => self.operation.as_deref(),
            Attribute::Ship => self.ship.as_deref(),
            Attribute::Department => self.department.as_deref(),
            Attribute::JobTitle => None,
        }
    }

    /// Checks the mandatory job title.
    pub fn validate(&self) -> AppResult<()> {
        if self.job_title.trim().is_empty() {
            return Err(AppError::Configuration(format!(
                "default rule '{}' has no job title",
                self.id
            )));
        }

        Ok(())
    }

    /// Returns whether the rule applies to the profile.
    #[must_use]
    pub fn matches(&self, profile: &JobProfile) -> bool {
        self.job_title == profile.job_title
            && OPTIONAL_ATTRIBUTES.iter().all(|attribute| {
                self.constraint(*attribute)
                    .is_none_or(|required| profile.value(*attribute) == Some(required))
            })
    }
}

/// Resolves the roles a profile should receive automatically.
///
/// Every matching rule contributes its roles; the result is independent of
/// rule order. Any rule without a job title fails the whole resolution.
pub fn resolve_default_roles(
    rules: &[DefaultAssignmentRule],
    profile: &JobProfile,
) -> AppResult<BTreeSet<RoleId>> {
    let mut resolved = BTreeSet::new();
    for rule in rules {
        rule.validate()?;
        if rule.matches(profile) {
            resolved.extend(rule.role_ids.iter().cloned());
        }
    }

    Ok(resolved)
}
