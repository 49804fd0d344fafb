use std::collections::BTreeMap;

use rolepilot_core::{AppError, AppResult};

use crate::{Attribute, PermissionValue, Role, scope};

/// Request context a role is authorized against.
///
/// `resource` holds the attribute values of the record being accessed;
/// `caller` holds the caller's own values used to resolve `Dynamic` scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessContext {
    resource: BTreeMap<Attribute, String>,
    caller: BTreeMap<Attribute, String>,
}

impl AccessContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resource value for an attribute.
    #[must_use]
    pub fn with_resource_value(mut self, attribute: Attribute, value: impl Into<String>) -> Self {
        self.resource.insert(attribute, value.into());
        self
    }

    /// Sets the caller's own value for an attribute.
    #[must_use]
    pub fn with_caller_value(mut self, attribute: Attribute, value: impl Into<String>) -> Self {
        self.caller.insert(attribute, value.into());
        self
    }

    /// Returns the resource value for an attribute.
    #[must_use]
    pub fn resource_value(&self, attribute: Attribute) -> Option<&str> {
        self.resource.get(&attribute).map(String::as_str)
    }

    /// Returns the caller's own value for an attribute.
    #[must_use]
    pub fn caller_value(&self, attribute: Attribute) -> Option<&str> {
        self.caller.get(&attribute).map(String::as_str)
    }
}

/// Returns whether the role grants access to the context.
///
/// Every attribute must match. Configuration errors on the role surface
/// before any attribute is evaluated, so a broken role never reads as a
/// plain denial.
pub fn authorize(role: &Role, context: &AccessContext) -> AppResult<bool> {
    role.validate_permissions()?;

    for attribute in Attribute::all().iter().copied() {
        let permission = role.permission_for(attribute)?;
        let values = permission.values();

        if values.contains(&PermissionValue::All) {
            continue;
        }

        let Some(resource_value) = context.resource_value(attribute) else {
            return Err(AppError::Validation(format!(
                "access context has no value for attribute '{attribute}'"
            )));
        };

        if !scope::matches(
            values,
            resource_value,
            context.caller_value(attribute),
            attribute,
        )? {
            return Ok(false);
        }
    }

    Ok(true)
}
