//! Portfolio domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_NAME_LENGTH;
use crate::{errors::ValidationError, Error, Result};

/// Domain model representing a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl NewPortfolio {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)
    }
}

/// Input model for updating an existing portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioUpdate {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl PortfolioUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.as_deref().map_or(true, str::is_empty) {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Portfolio ID is required for updates".to_string(),
            )));
        }
        validate_name(&self.name)
    }
}

fn validate_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Portfolio name cannot be empty".to_string(),
        )));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Portfolio name cannot exceed {} characters",
            MAX_NAME_LENGTH
        ))));
    }
    Ok(())
}
