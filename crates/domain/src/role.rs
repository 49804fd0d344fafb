use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use chrono::{Days, NaiveDate};
use rolepilot_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Attribute, PermissionValue};

/// Day-type codes a role may be restricted to, besides the `All` sentinel.
pub const DAY_TYPE_CODES: &[&str] = &[
    "W", "W1", "W-am", "W-pm", "WX", "V", "DO", "T", "TH", "X", "F", "NA",
];

const ALL_DAY_TYPES: &str = "All";

/// Stable role identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleId(String);

impl RoleId {
    /// Creates a role identifier from an existing value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::new(value)?.into()))
    }

    /// Generates a fresh role identifier for a newly created role.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("role-{}", Uuid::new_v4()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for RoleId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleId> for String {
    fn from(value: RoleId) -> Self {
        value.0
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Scope a role declares for one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
    attribute: Attribute,
    values: Vec<PermissionValue>,
}

impl RolePermission {
    /// Creates a permission entry, dropping duplicate values but keeping order.
    #[must_use]
    pub fn new(attribute: Attribute, values: impl IntoIterator<Item = PermissionValue>) -> Self {
        let mut seen = BTreeSet::new();
        let values = values
            .into_iter()
            .filter(|value| seen.insert(value.clone()))
            .collect();

        Self { attribute, values }
    }

    /// Returns the scoped attribute.
    #[must_use]
    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    /// Returns the ordered scope values.
    #[must_use]
    pub fn values(&self) -> &[PermissionValue] {
        &self.values
    }
}

/// Action an application grant allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AppAction {
    /// Read access.
    Read,
    /// Write access.
    Write,
}

/// Access a role grants to one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppAccess {
    app_name: NonEmptyString,
    actions: BTreeSet<AppAction>,
}

impl AppAccess {
    /// Creates a validated application access entry.
    pub fn new(
        app_name: impl Into<String>,
        actions: impl IntoIterator<Item = AppAction>,
    ) -> AppResult<Self> {
        Ok(Self {
            app_name: NonEmptyString::new(app_name)?,
            actions: actions.into_iter().collect(),
        })
    }

    /// Returns the application name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        self.app_name.as_str()
    }

    /// Returns the granted actions.
    #[must_use]
    pub fn actions(&self) -> &BTreeSet<AppAction> {
        &self.actions
    }

    /// Returns whether the entry grants the action.
    #[must_use]
    pub fn allows(&self, action: AppAction) -> bool {
        self.actions.contains(&action)
    }
}

/// Planning screens a role may open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionalityAccess {
    /// Planning view only.
    #[serde(rename = "Planning View")]
    PlanningView,
    /// Scheduling view only.
    #[serde(rename = "Scheduling View")]
    SchedulingView,
    /// Both views.
    #[default]
    Both,
}

impl FunctionalityAccess {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlanningView => "Planning View",
            Self::SchedulingView => "Scheduling View",
            Self::Both => "Both",
        }
    }
}

/// Day types a role may work with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub enum DayTypeAccess {
    /// Every day type.
    #[default]
    All,
    /// Only the listed day-type codes.
    Codes(BTreeSet<String>),
}

impl DayTypeAccess {
    /// Builds day-type access from a selection; selecting `All` collapses to `All` alone.
    pub fn from_selection<I, S>(selection: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut codes = BTreeSet::new();
        for value in selection {
            let value = value.into();
            if value == ALL_DAY_TYPES {
                return Ok(Self::All);
            }
            if !DAY_TYPE_CODES.contains(&value.as_str()) {
                return Err(AppError::Validation(format!(
                    "unknown day type code '{value}'"
                )));
            }
            codes.insert(value);
        }

        Ok(Self::Codes(codes))
    }

    /// Returns whether the day type is accessible.
    #[must_use]
    pub fn allows_day_type(&self, code: &str) -> bool {
        match self {
            Self::All => true,
            Self::Codes(codes) => codes.contains(code),
        }
    }
}

impl TryFrom<Vec<String>> for DayTypeAccess {
    type Error = AppError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_selection(value)
    }
}

impl From<DayTypeAccess> for Vec<String> {
    fn from(value: DayTypeAccess) -> Self {
        match value {
            DayTypeAccess::All => vec![ALL_DAY_TYPES.to_owned()],
            DayTypeAccess::Codes(codes) => codes.into_iter().collect(),
        }
    }
}

/// Role with attribute-scoped permissions and application grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    id: RoleId,
    name: NonEmptyString,
    #[serde(default)]
    description: String,
    permissions: Vec<RolePermission>,
    #[serde(default)]
    write_restriction_days: Option<u32>,
    #[serde(default)]
    functionality_access: FunctionalityAccess,
    #[serde(default)]
    day_type_access: DayTypeAccess,
    #[serde(default)]
    app_access: Vec<AppAccess>,
}

impl Role {
    /// Creates a role after checking that every attribute is declared exactly once.
    ///
    /// The role starts without application grants, with both functionality
    /// views and every day type.
    pub fn new(
        id: RoleId,
        name: impl Into<String>,
        description: impl Into<String>,
        permissions: Vec<RolePermission>,
    ) -> AppResult<Self> {
        let role = Self {
            id,
            name: NonEmptyString::new(name)?,
            description: description.into().trim().to_owned(),
            permissions,
            write_restriction_days: None,
            functionality_access: FunctionalityAccess::default(),
            day_type_access: DayTypeAccess::default(),
            app_access: Vec::new(),
        };
        role.validate_permissions()?;

        Ok(role)
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> &RoleId {
        &self.id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the role description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the declared permissions.
    #[must_use]
    pub fn permissions(&self) -> &[RolePermission] {
        &self.permissions
    }

    /// Returns the functionality view access.
    #[must_use]
    pub fn functionality_access(&self) -> FunctionalityAccess {
        self.functionality_access
    }

    /// Returns the day-type access.
    #[must_use]
    pub fn day_type_access(&self) -> &DayTypeAccess {
        &self.day_type_access
    }

    /// Returns the application grants.
    #[must_use]
    pub fn app_access(&self) -> &[AppAccess] {
        &self.app_access
    }

    /// Returns the stored write restriction, which may be stale when no app grants write.
    #[must_use]
    pub fn stored_write_restriction_days(&self) -> Option<u32> {
        self.write_restriction_days
    }

    /// Checks that each attribute is declared exactly once.
    pub fn validate_permissions(&self) -> AppResult<()> {
        for attribute in Attribute::all() {
            self.permission_for(*attribute)?;
        }

        Ok(())
    }

    /// Returns the permission for one attribute.
    ///
    /// A missing or duplicated declaration is a configuration error, never a
    /// silent allow or deny.
    pub fn permission_for(&self, attribute: Attribute) -> AppResult<&RolePermission> {
        let mut declared = self
            .permissions
            .iter()
            .filter(|permission| permission.attribute == attribute);

        match (declared.next(), declared.next()) {
            (Some(permission), None) => Ok(permission),
            (None, _) => Err(AppError::Configuration(format!(
                "role '{}' has no permission for attribute '{attribute}'",
                self.id
            ))),
            (Some(_), Some(_)) => Err(AppError::Configuration(format!(
                "role '{}' declares attribute '{attribute}' more than once",
                self.id
            ))),
        }
    }

    /// Replaces the declared permissions.
    pub fn set_permissions(&mut self, permissions: Vec<RolePermission>) -> AppResult<()> {
        let previous = std::mem::replace(&mut self.permissions, permissions);
        if let Err(error) = self.validate_permissions() {
            self.permissions = previous;
            return Err(error);
        }

        Ok(())
    }

    /// Replaces application grants, dropping entries without actions.
    ///
    /// When no remaining entry grants write, the write restriction is cleared.
    pub fn set_app_access(&mut self, app_access: Vec<AppAccess>) {
        self.app_access = app_access
            .into_iter()
            .filter(|entry| !entry.actions.is_empty())
            .collect();

        if !self.grants_any_write() {
            self.write_restriction_days = None;
        }
    }

    /// Sets the write restriction window in days.
    pub fn set_write_restriction_days(&mut self, days: Option<u32>) -> AppResult<()> {
        if days.is_some() && !self.grants_any_write() {
            return Err(AppError::Validation(format!(
                "role '{}' cannot restrict writes because no application grants write",
                self.id
            )));
        }

        self.write_restriction_days = days;
        Ok(())
    }

    /// Sets the functionality view access.
    pub fn set_functionality_access(&mut self, access: FunctionalityAccess) {
        self.functionality_access = access;
    }

    /// Sets the day-type access.
    pub fn set_day_type_access(&mut self, access: DayTypeAccess) {
        self.day_type_access = access;
    }

    /// Updates name and description.
    pub fn rename(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> AppResult<()> {
        self.name = NonEmptyString::new(name)?;
        self.description = description.into().trim().to_owned();
        Ok(())
    }

    /// Returns whether any application entry grants write.
    #[must_use]
    pub fn grants_any_write(&self) -> bool {
        self.app_access
            .iter()
            .any(|entry| entry.allows(AppAction::Write))
    }

    /// Returns the write restriction that applies, ignoring stale values on read-only roles.
    #[must_use]
    pub fn effective_write_restriction_days(&self) -> Option<u32> {
        if self.grants_any_write() {
            self.write_restriction_days
        } else {
            None
        }
    }

    /// Returns whether the role can read the application.
    #[must_use]
    pub fn can_read_app(&self, app_name: &str) -> bool {
        self.app_allows(app_name, AppAction::Read)
    }

    /// Returns whether the role can write to the application.
    #[must_use]
    pub fn can_write_app(&self, app_name: &str) -> bool {
        self.app_allows(app_name, AppAction::Write)
    }

    /// Returns whether a write may touch a record dated `record_date`.
    ///
    /// A restriction of `N` days allows records dated on or after
    /// `today - N`; zero means today only.
    #[must_use]
    pub fn write_allowed_on(&self, record_date: NaiveDate, today: NaiveDate) -> bool {
        if !self.grants_any_write() {
            return false;
        }

        match self.write_restriction_days {
            None => true,
            Some(days) => today
                .checked_sub_days(Days::new(u64::from(days)))
                .is_none_or(|earliest| record_date >= earliest),
        }
    }

    fn app_allows(&self, app_name: &str, action: AppAction) -> bool {
        self.app_access
            .iter()
            .any(|entry| entry.app_name() == app_name && entry.allows(action))
    }
}
