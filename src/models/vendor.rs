use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::timestamp;
use super::validation::{Validate, ValidationError};

/// A vendor attached to a wedding (photographer, florist, venue, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vendor {
    pub id: Uuid,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub categories: Vec<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub user_id: String,
    pub wedding_id: Uuid,
    #[serde(rename = "wedding_vendor")]
    pub wedding: Option<Uuid>,
    pub image_url: Option<String>,
    pub address: Option<String>,
    pub web_url: Option<String>,
}

impl Vendor {
    pub fn new(wedding_id: Uuid, user_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            name: name.into(),
            categories: Vec::new(),
            email: None,
            phone: None,
            user_id: user_id.into(),
            wedding_id,
            wedding: None,
            image_url: None,
            address: None,
            web_url: None,
        }
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn serves(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }

    pub fn touch(&mut self) {
        self.updated_at = timestamp::now();
    }
}

impl Validate for Vendor {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.categories.is_empty() {
            write!(f, " ({})", self.categories.join(", "))?;
        }
        Ok(())
    }
}
