use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rolepilot_core::AppError;
use serde::{Deserialize, Serialize};

/// Organisational dimension used to scope role permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// Legal company the record belongs to.
    Company,
    /// Business function, for example Nautical or Catering.
    Function,
    /// Operating unit.
    Operation,
    /// Vessel code.
    Ship,
    /// Department on board or ashore.
    Department,
    /// Job title of the crew member.
    #[serde(rename = "Job Title")]
    JobTitle,
}

impl Attribute {
    /// Returns the stable transport value for this attribute.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "Company",
            Self::Function => "Function",
            Self::Operation => "Operation",
            Self::Ship => "Ship",
            Self::Department => "Department",
            Self::JobTitle => "Job Title",
        }
    }

    /// Returns every attribute a role must declare, in display order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Attribute] = &[
            Attribute::Company,
            Attribute::Function,
            Attribute::Operation,
            Attribute::Ship,
            Attribute::Department,
            Attribute::JobTitle,
        ];

        ALL
    }
}

impl Display for Attribute {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Company" => Ok(Self::Company),
            "Function" => Ok(Self::Function),
            "Operation" => Ok(Self::Operation),
            "Ship" => Ok(Self::Ship),
            "Department" => Ok(Self::Department),
            "Job Title" => Ok(Self::JobTitle),
            _ => Err(AppError::Validation(format!(
                "unknown attribute value '{value}'"
            ))),
        }
    }
}
