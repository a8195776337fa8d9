use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::budget::Budget;
use super::checklist::ChecklistCategory;
use super::guest::{Guest, InvitationStatus};
use super::location::LocationPoint;
use super::share::Share;
use super::timeline::Timeline;
use super::timestamp;
use super::validation::{Validate, ValidationError};
use super::vendor::Vendor;

/// The account that owns a wedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub email: String,
    pub id: Uuid,
}

impl UserInfo {
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            id,
        }
    }
}

/// Aggregate root. Child collections are embedded inline on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wedding {
    pub id: Uuid,
    pub name: String,
    pub location: LocationPoint,
    #[serde(with = "timestamp")]
    pub wedding_date: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub guests: Vec<Guest>,
    pub budget: Option<Budget>,
    pub timelines: Vec<Timeline>,
    pub checklist: Vec<ChecklistCategory>,
    pub selected_vendors: Vec<String>,
    pub shortlisted_vendors: Vec<String>,
    pub wedding_vendors: Vec<Vendor>,
    pub user: UserInfo,
    pub shared_with: Vec<Share>,
}

impl Wedding {
    pub fn new(
        name: impl Into<String>,
        location: LocationPoint,
        wedding_date: DateTime<Utc>,
        user: UserInfo,
    ) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            location,
            wedding_date,
            created_at: now,
            updated_at: now,
            user_id: user.id,
            guests: Vec::new(),
            budget: None,
            timelines: Vec::new(),
            checklist: Vec::new(),
            selected_vendors: Vec::new(),
            shortlisted_vendors: Vec::new(),
            wedding_vendors: Vec::new(),
            user,
            shared_with: Vec::new(),
        }
    }

    pub fn with_guests(mut self, guests: Vec<Guest>) -> Self {
        self.guests = guests;
        self
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_timelines(mut self, timelines: Vec<Timeline>) -> Self {
        self.timelines = timelines;
        self
    }

    pub fn with_checklist(mut self, checklist: Vec<ChecklistCategory>) -> Self {
        self.checklist = checklist;
        self
    }

    pub fn with_vendors(mut self, vendors: Vec<Vendor>) -> Self {
        self.wedding_vendors = vendors;
        self
    }

    pub fn with_shares(mut self, shares: Vec<Share>) -> Self {
        self.shared_with = shares;
        self
    }

    /// Guests plus the plus-ones they are allowed to bring.
    pub fn headcount(&self) -> u32 {
        self.guests
            .iter()
            .filter(|g| g.status != InvitationStatus::Declined)
            .map(|g| 1 + g.plus_one_options)
            .sum()
    }

    pub fn confirmed_guests(&self) -> impl Iterator<Item = &Guest> {
        self.guests
            .iter()
            .filter(|g| g.status == InvitationStatus::Confirmed)
    }

    pub fn touch(&mut self) {
        self.updated_at = timestamp::now();
    }
}

impl Validate for Wedding {
    fn validate(&self) -> Result<(), ValidationError> {
        self.location.validate()?;
        if self.user.id != self.user_id {
            return Err(ValidationError::OwnerMismatch {
                user_id: self.user_id,
                info_id: self.user.id,
            });
        }
        self.guests.iter().try_for_each(Validate::validate)?;
        if let Some(budget) = &self.budget {
            budget.validate()?;
        }
        self.timelines.iter().try_for_each(Validate::validate)?;
        self.checklist.iter().try_for_each(Validate::validate)?;
        self.wedding_vendors.iter().try_for_each(Validate::validate)?;
        self.shared_with.iter().try_for_each(Validate::validate)
    }
}

impl fmt::Display for Wedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.chars().count()))?;
        writeln!(f, "Date: {}", self.wedding_date.format("%Y-%m-%d"))?;
        writeln!(f, "Location: {}", self.location)?;
        writeln!(f, "Owner: {}", self.user.email)?;
        writeln!(
            f,
            "Guests: {} ({} confirmed, headcount {})",
            self.guests.len(),
            self.confirmed_guests().count(),
            self.headcount()
        )?;

        if let Some(budget) = &self.budget {
            writeln!(
                f,
                "Budget: {:.2} {} ({:.2} paid)",
                budget.total_amount,
                budget.currency,
                budget.paid_total()
            )?;
        }

        if !self.checklist.is_empty() {
            writeln!(f, "\nChecklist:")?;
            for category in &self.checklist {
                writeln!(
                    f,
                    "  - {} ({:.0}% done)",
                    category.name,
                    category.progress() * 100.0
                )?;
            }
        }

        if !self.timelines.is_empty() {
            writeln!(f, "\nTimelines:")?;
            for timeline in &self.timelines {
                writeln!(f, "  - {} ({} events)", timeline.title, timeline.events.len())?;
            }
        }

        if !self.wedding_vendors.is_empty() {
            writeln!(f, "\nVendors:")?;
            for vendor in &self.wedding_vendors {
                writeln!(f, "  - {}", vendor)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{full_wedding, wedding};

    #[test]
    fn test_wedding_new() {
        let w = wedding();
        assert_eq!(w.user_id, w.user.id);
        assert!(w.guests.is_empty());
        assert!(w.budget.is_none());
        assert!(w.validate().is_ok());
    }

    #[test]
    fn test_headcount_excludes_declined() {
        let w = wedding();
        let id = w.id;
        let w = w.with_guests(vec![
            Guest::new(id, "A", "A").with_plus_ones(2),
            Guest::new(id, "B", "B").with_status(InvitationStatus::Declined),
            Guest::new(id, "C", "C").with_status(InvitationStatus::Confirmed),
        ]);
        assert_eq!(w.headcount(), 4);
        assert_eq!(w.confirmed_guests().count(), 1);
    }

    #[test]
    fn test_owner_mismatch_is_invalid() {
        let mut w = wedding();
        w.user_id = Uuid::new_v4();
        assert!(matches!(
            w.validate(),
            Err(ValidationError::OwnerMismatch { .. })
        ));
    }

    #[test]
    fn test_nested_children_are_validated() {
        let mut w = full_wedding();
        assert!(w.validate().is_ok());

        w.budget.as_mut().unwrap().estimated_amount = -10.0;
        assert!(w.validate().is_err());
    }

    #[test]
    fn test_display() {
        let output = format!("{}", full_wedding());
        assert!(output.contains("Perfect Wedding"));
        assert!(output.contains("2025-06-21"));
        assert!(output.contains("Guests: 2 (1 confirmed, headcount 3)"));
        assert!(output.contains("Sign contract") || output.contains("Venue"));
    }

    #[test]
    fn test_json_roundtrip_all_optionals_absent() {
        let w = wedding();
        let json = serde_json::to_string(&w).unwrap();
        let parsed: Wedding = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, w);
    }

    #[test]
    fn test_json_roundtrip_all_optionals_present() {
        let w = full_wedding();
        let json = serde_json::to_string(&w).unwrap();
        let parsed: Wedding = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, w);
    }

    #[test]
    fn test_wire_keys_are_snake_case() {
        let json = serde_json::to_value(full_wedding()).unwrap();
        for key in [
            "wedding_date",
            "created_at",
            "user_id",
            "selected_vendors",
            "shortlisted_vendors",
            "wedding_vendors",
            "shared_with",
        ] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(json["location"]["type"], "Point");
    }

    #[test]
    fn test_missing_id_fails_to_decode() {
        let mut json = serde_json::to_value(wedding()).unwrap();
        json.as_object_mut().unwrap().remove("id");
        let err = serde_json::from_value::<Wedding>(json).unwrap_err();
        assert!(err.to_string().contains("id"));
    }
}
