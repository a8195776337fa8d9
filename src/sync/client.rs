//! HTTP client for the WeddMate API.

use std::time::Duration;

use reqwest::Url;
use tracing::{debug, info};

use super::error::SyncError;
use crate::models::Wedding;

pub const DEFAULT_BASE_URL: &str = "https://api.weddmate.com";
pub const MY_WEDDINGS_PATH: &str = "/api/users/myWeddings";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches the current user's weddings with a bearer token.
#[derive(Debug, Clone)]
pub struct WeddingClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

impl WeddingClient {
    /// Client for the production API.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The `myWeddings` URL, nested under any path the base URL carries.
    pub fn endpoint(&self) -> Result<Url, SyncError> {
        let mut base = Url::parse(&self.base_url).map_err(|e| self.invalid_url(e))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(MY_WEDDINGS_PATH.trim_start_matches('/'))
            .map_err(|e| self.invalid_url(e))
    }

    fn invalid_url(&self, e: impl std::fmt::Display) -> SyncError {
        SyncError::Url(format!("{}: {}", self.base_url, e))
    }

    /// `GET /api/users/myWeddings`.
    ///
    /// Nothing is returned unless the whole body decoded.
    pub async fn fetch_my_weddings(&self) -> Result<Vec<Wedding>, SyncError> {
        let url = self.endpoint()?;
        debug!(%url, "fetching weddings");

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let weddings = decode_weddings(&body)?;

        info!(count = weddings.len(), "fetched weddings");
        Ok(weddings)
    }
}

/// Decodes a `myWeddings` response body.
pub fn decode_weddings(body: &[u8]) -> Result<Vec<Wedding>, SyncError> {
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GuestAge, InvitationStatus, DEFAULT_PERCENT_IN_PLANNING};
    use crate::models::timestamp;

    const WIRE_SAMPLE: &str = r##"[
      {
        "id": "5b2f0b7e-3c1a-4e43-9a55-0f6f3c1d2e01",
        "name": "Anna & Tomas",
        "location": { "type": "Point", "coordinates": [14.42076, 50.08804] },
        "wedding_date": "2025-06-21T14:00:00.000+02:00",
        "created_at": "2024-01-10T09:30:00.000Z",
        "updated_at": "2024-03-01T18:00:00.123Z",
        "user_id": "0d6a4b7c-8e9f-4a1b-b2c3-d4e5f6a7b8c9",
        "guests": [
          {
            "id": "9f8e7d6c-5b4a-4321-8fed-cba987654321",
            "wedding_id": "5b2f0b7e-3c1a-4e43-9a55-0f6f3c1d2e01",
            "created_at": "2024-01-11T10:00:00.000Z",
            "updated_at": "2024-01-11T10:00:00.000Z",
            "email": "jana@example.com",
            "first_name": "Jana",
            "last_name": "Novak",
            "allergens": ["nuts"],
            "age": 1,
            "status": 1,
            "need_hotel": true,
            "plus_one_options": 0
          }
        ],
        "budget": null,
        "timelines": [],
        "checklist": [
          {
            "id": "1a2b3c4d-0000-4000-8000-000000000001",
            "name": "Venue",
            "desc": "Find the place",
            "category": "venue",
            "created_at": "2024-01-10T09:30:00.000Z",
            "updated_at": "2024-01-10T09:30:00.000Z",
            "is_done": false,
            "is_pinned": true,
            "position": 0,
            "image": { "src": "https://cdn.weddmate.com/venue.jpg", "hash": "LEHV6nWB2yk8" },
            "wedding_id": "5b2f0b7e-3c1a-4e43-9a55-0f6f3c1d2e01",
            "tasks": [
              {
                "id": "1a2b3c4d-0000-4000-8000-000000000002",
                "name": "Visit castle",
                "created_at": "2024-01-10T09:30:00.000Z",
                "opened_at": "2024-01-10T09:30:00.000Z",
                "updated_at": "2024-01-10T09:30:00.000Z",
                "finish_at": "2024-05-01T00:00:00.000Z",
                "is_done": false,
                "is_pinned": false,
                "position": 0,
                "action": "check",
                "category_id": "1a2b3c4d-0000-4000-8000-000000000001"
              }
            ]
          }
        ],
        "selected_vendors": [],
        "shortlisted_vendors": [],
        "wedding_vendors": [],
        "user": { "email": "anna@example.com", "id": "0d6a4b7c-8e9f-4a1b-b2c3-d4e5f6a7b8c9" },
        "shared_with": []
      }
    ]"##;

    #[test]
    fn test_decode_wire_sample() {
        let weddings = decode_weddings(WIRE_SAMPLE.as_bytes()).unwrap();
        assert_eq!(weddings.len(), 1);

        let w = &weddings[0];
        assert_eq!(timestamp::format(&w.wedding_date), "2025-06-21T12:00:00.000Z");
        assert_eq!(w.location.longitude(), 14.42076);
        assert_eq!(w.location.latitude(), 50.08804);
        assert!(w.budget.is_none());

        let guest = &w.guests[0];
        assert_eq!(guest.full_name(), "Jana Novak");
        assert_eq!(guest.age, GuestAge::Child);
        assert_eq!(guest.status, InvitationStatus::Confirmed);
        assert_eq!(guest.wedding, None);
        assert_eq!(guest.diets, None);

        let task = &w.checklist[0].tasks[0];
        assert_eq!(w.checklist[0].description.as_deref(), Some("Find the place"));
        assert_eq!(task.percent_in_planning, DEFAULT_PERCENT_IN_PLANNING);
        assert_eq!(task.description, None);
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        assert!(matches!(
            decode_weddings(br#"{"weddings": []}"#),
            Err(SyncError::Decoding(_))
        ));
        assert!(matches!(
            decode_weddings(WIRE_SAMPLE.replace("\"age\": 1", "\"age\": 7").as_bytes()),
            Err(SyncError::Decoding(_))
        ));
    }

    #[test]
    fn test_endpoint() {
        let client = WeddingClient::new("token");
        assert_eq!(
            client.endpoint().unwrap().as_str(),
            "https://api.weddmate.com/api/users/myWeddings"
        );

        let client = WeddingClient::with_base_url("not a url", "token");
        assert!(matches!(client.endpoint(), Err(SyncError::Url(_))));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        for base in ["https://host.example/staging", "https://host.example/staging/"] {
            let client = WeddingClient::with_base_url(base, "token");
            assert_eq!(
                client.endpoint().unwrap().as_str(),
                "https://host.example/staging/api/users/myWeddings"
            );
        }

        let client = WeddingClient::with_base_url("http://localhost:3000/", "token");
        assert_eq!(
            client.endpoint().unwrap().as_str(),
            "http://localhost:3000/api/users/myWeddings"
        );
    }
}
