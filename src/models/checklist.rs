use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::timestamp;
use super::validation::{Validate, ValidationError};

/// Weight of a task in the overall plan. Not a percentage despite the name.
pub const DEFAULT_PERCENT_IN_PLANNING: f64 = 10.5;
pub const DEFAULT_ACTION: &str = "check";

fn default_percent_in_planning() -> f64 {
    DEFAULT_PERCENT_IN_PLANNING
}

/// Cover image with a blurhash-style placeholder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HashImage {
    pub src: String,
    pub hash: String,
    pub position: Option<i32>,
    pub alt: Option<String>,
}

impl HashImage {
    pub fn new(src: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            hash: hash.into(),
            position: Some(0),
            alt: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChecklistCategory {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "desc")]
    pub description: Option<String>,
    pub category: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub budget_estimate: Option<f64>,
    pub is_done: bool,
    pub is_pinned: bool,
    pub estimated_cost: Option<f64>,
    pub position: i32,
    pub image: HashImage,
    pub wedding_id: Uuid,
    #[serde(rename = "wedding_category")]
    pub wedding: Option<Uuid>,
    pub tasks: Vec<ChecklistItem>,
}

impl ChecklistCategory {
    pub fn new(
        wedding_id: Uuid,
        name: impl Into<String>,
        category: impl Into<String>,
        position: i32,
        image: HashImage,
    ) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            category: category.into(),
            created_at: now,
            updated_at: now,
            budget_estimate: None,
            is_done: false,
            is_pinned: false,
            estimated_cost: None,
            position,
            image,
            wedding_id,
            wedding: None,
            tasks: Vec::new(),
        }
    }

    pub fn with_tasks(mut self, tasks: Vec<ChecklistItem>) -> Self {
        self.tasks = tasks;
        self
    }

    /// Share of the category's tasks that are done, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.tasks.is_empty() {
            return if self.is_done { 1.0 } else { 0.0 };
        }
        let done = self.tasks.iter().filter(|t| t.is_done).count();
        done as f64 / self.tasks.len() as f64
    }

    pub fn touch(&mut self) {
        self.updated_at = timestamp::now();
    }
}

impl Validate for ChecklistCategory {
    fn validate(&self) -> Result<(), ValidationError> {
        self.tasks.iter().try_for_each(Validate::validate)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "desc")]
    pub description: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub opened_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub finish_at: DateTime<Utc>,
    pub is_done: bool,
    pub is_pinned: bool,
    pub notes: Option<String>,
    #[serde(default = "default_percent_in_planning")]
    pub percent_in_planning: f64,
    pub position: i32,
    pub action: String,
    pub vendors: Option<Vec<String>>,
    pub category_id: Uuid,
    pub category: Option<Uuid>,
}

impl ChecklistItem {
    pub fn new(category_id: Uuid, name: impl Into<String>) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            created_at: now,
            opened_at: now,
            updated_at: now,
            finish_at: now,
            is_done: false,
            is_pinned: false,
            notes: None,
            percent_in_planning: DEFAULT_PERCENT_IN_PLANNING,
            position: 0,
            action: DEFAULT_ACTION.to_string(),
            vendors: None,
            category_id,
            category: None,
        }
    }

    pub fn with_position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }

    pub fn with_finish_at(mut self, finish_at: DateTime<Utc>) -> Self {
        self.finish_at = finish_at;
        self
    }

    pub fn complete(&mut self) {
        self.is_done = true;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = timestamp::now();
    }
}

impl Validate for ChecklistItem {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl fmt::Display for ChecklistItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.is_done { "x" } else { " " };
        write!(f, "[{}] {}", mark, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category() -> ChecklistCategory {
        ChecklistCategory::new(
            Uuid::new_v4(),
            "Venue",
            "venue",
            1,
            HashImage::new("https://cdn.example.com/venue.jpg", "LEHV6nWB2yk8"),
        )
    }

    #[test]
    fn test_item_defaults() {
        let item = ChecklistItem::new(Uuid::new_v4(), "Book venue");
        assert_eq!(item.percent_in_planning, 10.5);
        assert_eq!(item.action, "check");
        assert!(!item.is_done);
    }

    #[test]
    fn test_percent_in_planning_defaults_when_absent() {
        let mut json = serde_json::to_value(ChecklistItem::new(Uuid::new_v4(), "Task")).unwrap();
        json.as_object_mut().unwrap().remove("percent_in_planning");
        let parsed: ChecklistItem = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.percent_in_planning, DEFAULT_PERCENT_IN_PLANNING);
    }

    #[test]
    fn test_description_uses_desc_key() {
        let mut item = ChecklistItem::new(Uuid::new_v4(), "Task");
        item.description = Some("details".into());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["desc"], "details");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_progress() {
        let cat = category();
        assert_eq!(cat.progress(), 0.0);

        let mut done = ChecklistItem::new(cat.id, "Visit");
        done.complete();
        let cat = cat.with_tasks(vec![done, ChecklistItem::new(Uuid::new_v4(), "Sign")]);
        assert_eq!(cat.progress(), 0.5);
    }

    #[test]
    fn test_json_roundtrip_all_optionals_present() {
        let mut cat = category();
        cat.description = Some("Find and book".into());
        cat.budget_estimate = Some(50_000.0);
        cat.estimated_cost = Some(45_000.0);
        cat.wedding = Some(cat.wedding_id);
        cat.image.alt = Some("castle".into());

        let mut task = ChecklistItem::new(cat.id, "Visit castle").with_position(2);
        task.notes = Some("bring camera".into());
        task.vendors = Some(vec!["castle-hluboka".into()]);
        task.category = Some(cat.id);
        let cat = cat.with_tasks(vec![task]);

        let json = serde_json::to_string(&cat).unwrap();
        let parsed: ChecklistCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cat);
    }

    #[test]
    fn test_json_roundtrip_all_optionals_absent() {
        let mut cat = category();
        cat.image.position = None;
        let json = serde_json::to_string(&cat).unwrap();
        let parsed: ChecklistCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cat);
        assert!(parsed.description.is_none());
        assert!(parsed.image.position.is_none());
    }
}
