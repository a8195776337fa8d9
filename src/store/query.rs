use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::Wedding;

/// Criteria for `weddings` queries. Every set criterion must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeddingQuery {
    pub id: Option<Uuid>,
    pub owner: Option<Uuid>,
    pub name_contains: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl WeddingQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn owned_by(mut self, user_id: Uuid) -> Self {
        self.owner = Some(user_id);
        self
    }

    pub fn name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = Some(needle.into());
        self
    }

    /// Inclusive on both ends.
    pub fn between(mut self, from: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.until = Some(until);
        self
    }

    pub fn matches(&self, wedding: &Wedding) -> bool {
        if self.id.is_some_and(|id| id != wedding.id) {
            return false;
        }
        if self.owner.is_some_and(|owner| owner != wedding.user_id) {
            return false;
        }
        if let Some(needle) = &self.name_contains {
            if !wedding
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if self.from.is_some_and(|from| wedding.wedding_date < from) {
            return false;
        }
        if self.until.is_some_and(|until| wedding.wedding_date > until) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::wedding;
    use chrono::TimeZone;

    #[test]
    fn test_all_matches_everything() {
        assert!(WeddingQuery::all().matches(&wedding()));
    }

    #[test]
    fn test_name_contains_ignores_case() {
        let w = wedding();
        assert!(WeddingQuery::all().name_contains("perfect").matches(&w));
        assert!(!WeddingQuery::all().name_contains("garden").matches(&w));
    }

    #[test]
    fn test_owner_and_id() {
        let w = wedding();
        assert!(WeddingQuery::by_id(w.id).owned_by(w.user_id).matches(&w));
        assert!(!WeddingQuery::by_id(w.id).owned_by(Uuid::new_v4()).matches(&w));
        assert!(!WeddingQuery::by_id(Uuid::new_v4()).matches(&w));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let w = wedding();
        let day = w.wedding_date;
        assert!(WeddingQuery::all().between(day, day).matches(&w));

        let july = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let august = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
        assert!(!WeddingQuery::all().between(july, august).matches(&w));
    }
}
