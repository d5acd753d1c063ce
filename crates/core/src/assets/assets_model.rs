//! Asset domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_NAME_LENGTH;
use crate::prices::Price;
use crate::{errors::ValidationError, Error, Result};

/// An instrument whose prices are tracked. Owned independently of portfolios.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

impl NewAsset {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)
    }
}

/// Input model for renaming an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetUpdate {
    pub id: Option<String>,
    pub name: String,
}

impl AssetUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.as_deref().map_or(true, str::is_empty) {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Asset ID is required for updates".to_string(),
            )));
        }
        validate_name(&self.name)
    }
}

fn validate_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Asset name cannot be empty".to_string(),
        )));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Asset name cannot exceed {} characters",
            MAX_NAME_LENGTH
        ))));
    }
    Ok(())
}

/// An asset together with its current price (the latest recorded one).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetWithPrice {
    #[serde(flatten)]
    pub asset: Asset,
    pub price: Option<Price>,
}
