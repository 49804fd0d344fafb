//! Registry of applications that roles grant access to.

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use rolepilot_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MIN_APPLICATION_NAME_LEN: usize = 2;

/// Stable application identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Creates an application identifier from an existing value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::new(value)?.into()))
    }

    /// Generates a fresh identifier for a newly registered application.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("app-{}", Uuid::new_v4()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for ApplicationId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ApplicationId> for String {
    fn from(value: ApplicationId) -> Self {
        value.0
    }
}

impl Display for ApplicationId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Registered application. Role app grants refer to it by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ApplicationRecord")]
pub struct Application {
    id: ApplicationId,
    name: String,
    role_collection_id: String,
    created_by: String,
    created_date: NaiveDate,
}

impl Application {
    /// Registers an application on behalf of `created_by`.
    pub fn new(
        id: ApplicationId,
        name: impl Into<String>,
        role_collection_id: impl Into<String>,
        created_by: impl Into<String>,
        created_date: NaiveDate,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: application_name(name)?,
            role_collection_id: role_collection_id_value(role_collection_id)?,
            created_by: created_by.into(),
            created_date,
        })
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> &ApplicationId {
        &self.id
    }

    /// Returns the name that role app grants reference.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the role collection the application is bound to.
    #[must_use]
    pub fn role_collection_id(&self) -> &str {
        self.role_collection_id.as_str()
    }

    /// Returns who registered the application.
    #[must_use]
    pub fn created_by(&self) -> &str {
        self.created_by.as_str()
    }

    /// Returns the registration date.
    #[must_use]
    pub fn created_date(&self) -> NaiveDate {
        self.created_date
    }

    /// Replaces the editable fields. Creation metadata is kept.
    pub fn update(
        &mut self,
        name: impl Into<String>,
        role_collection_id: impl Into<String>,
    ) -> AppResult<()> {
        let name = application_name(name)?;
        self.role_collection_id = role_collection_id_value(role_collection_id)?;
        self.name = name;
        Ok(())
    }
}

fn application_name(value: impl Into<String>) -> AppResult<String> {
    let name = value.into().trim().to_owned();
    if name.chars().count() < MIN_APPLICATION_NAME_LEN {
        return Err(AppError::Validation(format!(
            "application name must be at least {MIN_APPLICATION_NAME_LEN} characters"
        )));
    }

    Ok(name)
}

fn role_collection_id_value(value: impl Into<String>) -> AppResult<String> {
    let value = value.into().trim().to_owned();
    if value.is_empty() {
        return Err(AppError::Validation(
            "role collection id is required".to_owned(),
        ));
    }

    Ok(value)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplicationRecord {
    id: ApplicationId,
    name: String,
    role_collection_id: String,
    #[serde(default)]
    created_by: String,
    created_date: NaiveDate,
}

impl TryFrom<ApplicationRecord> for Application {
    type Error = AppError;

    fn try_from(record: ApplicationRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.id,
            record.name,
            record.role_collection_id,
            record.created_by,
            record.created_date,
        )
    }
}
