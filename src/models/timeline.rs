use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::timestamp;
use super::validation::{Validate, ValidationError};

pub const DEFAULT_EVENT_COLOR: &str = "#FFFFFF";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    pub id: Uuid,
    pub wedding_id: Uuid,
    #[serde(rename = "wedding_timeline")]
    pub wedding: Option<Uuid>,
    pub title: String,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub events: Vec<TimelineEvent>,
}

impl Timeline {
    pub fn new(wedding_id: Uuid, title: impl Into<String>, date: DateTime<Utc>) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::new_v4(),
            wedding_id,
            wedding: None,
            title: title.into(),
            date,
            created_at: now,
            updated_at: now,
            events: Vec::new(),
        }
    }

    pub fn with_events(mut self, events: Vec<TimelineEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = timestamp::now();
    }
}

impl Validate for Timeline {
    fn validate(&self) -> Result<(), ValidationError> {
        self.events.iter().try_for_each(Validate::validate)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEvent {
    pub id: Uuid,
    pub timeline_id: Uuid,
    pub hex_color: String,
    pub note: String,
    pub title: String,
    #[serde(with = "timestamp")]
    pub start_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub end_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub timeline: Option<Uuid>,
}

impl TimelineEvent {
    pub fn new(
        timeline_id: Uuid,
        title: impl Into<String>,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::new_v4(),
            timeline_id,
            hex_color: DEFAULT_EVENT_COLOR.to_string(),
            note: String::new(),
            title: title.into(),
            start_at,
            end_at,
            created_at: now,
            updated_at: now,
            timeline: None,
        }
    }

    pub fn with_color(mut self, hex_color: impl Into<String>) -> Self {
        self.hex_color = hex_color.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn duration(&self) -> Duration {
        self.end_at - self.start_at
    }

    pub fn touch(&mut self) {
        self.updated_at = timestamp::now();
    }
}

impl Validate for TimelineEvent {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.end_at < self.start_at {
            return Err(ValidationError::EventEndsBeforeStart(self.title.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for TimelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} {}",
            self.start_at.format("%H:%M"),
            self.end_at.format("%H:%M"),
            self.title
        )
    }
}
