use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::timestamp;
use super::validation::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Permission {
    View,
    Edit,
    None,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::View => write!(f, "view"),
            Permission::Edit => write!(f, "edit"),
            Permission::None => write!(f, "none"),
        }
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view" => Ok(Permission::View),
            "edit" => Ok(Permission::Edit),
            "none" => Ok(Permission::None),
            _ => Err(format!(
                "Invalid permission '{}'. Valid options: view, edit, none",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShareStatus {
    Invited,
    Accepted,
    Denied,
}

impl fmt::Display for ShareStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareStatus::Invited => write!(f, "invited"),
            ShareStatus::Accepted => write!(f, "accepted"),
            ShareStatus::Denied => write!(f, "denied"),
        }
    }
}

/// Planning area a share grants access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShareArea {
    Budget,
    Checklist,
    Guests,
    Timelines,
    Vendors,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Share {
    pub id: Uuid,
    pub email: String,
    pub budget_permission: Permission,
    pub checklist_permission: Permission,
    pub guests_permission: Permission,
    pub timelines_permission: Permission,
    pub vendors_permission: Permission,
    pub status: ShareStatus,
    pub wedding_id: Uuid,
    #[serde(rename = "wedding_share")]
    pub wedding: Option<Uuid>,
    pub user_id: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Share {
    /// New invitation with view access to every area.
    pub fn new(wedding_id: Uuid, email: impl Into<String>) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            budget_permission: Permission::View,
            checklist_permission: Permission::View,
            guests_permission: Permission::View,
            timelines_permission: Permission::View,
            vendors_permission: Permission::View,
            status: ShareStatus::Invited,
            wedding_id,
            wedding: None,
            user_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn permission(&self, area: ShareArea) -> Permission {
        match area {
            ShareArea::Budget => self.budget_permission,
            ShareArea::Checklist => self.checklist_permission,
            ShareArea::Guests => self.guests_permission,
            ShareArea::Timelines => self.timelines_permission,
            ShareArea::Vendors => self.vendors_permission,
        }
    }

    pub fn set_permission(&mut self, area: ShareArea, permission: Permission) {
        let slot = match area {
            ShareArea::Budget => &mut self.budget_permission,
            ShareArea::Checklist => &mut self.checklist_permission,
            ShareArea::Guests => &mut self.guests_permission,
            ShareArea::Timelines => &mut self.timelines_permission,
            ShareArea::Vendors => &mut self.vendors_permission,
        };
        *slot = permission;
        self.touch();
    }

    /// Only accepted shares grant anything.
    pub fn can_view(&self, area: ShareArea) -> bool {
        self.status == ShareStatus::Accepted && self.permission(area) != Permission::None
    }

    pub fn can_edit(&self, area: ShareArea) -> bool {
        self.status == ShareStatus::Accepted && self.permission(area) == Permission::Edit
    }

    pub fn touch(&mut self) {
        self.updated_at = timestamp::now();
    }
}

impl Validate for Share {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}
