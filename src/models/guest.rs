use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::timestamp;
use super::validation::{Validate, ValidationError};

/// Age bracket. Encoded as an integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GuestAge {
    Adult,
    Child,
    Infant,
}

impl From<GuestAge> for u8 {
    fn from(age: GuestAge) -> Self {
        match age {
            GuestAge::Adult => 0,
            GuestAge::Child => 1,
            GuestAge::Infant => 2,
        }
    }
}

impl TryFrom<u8> for GuestAge {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(GuestAge::Adult),
            1 => Ok(GuestAge::Child),
            2 => Ok(GuestAge::Infant),
            _ => Err(format!("unknown guest age code {}", raw)),
        }
    }
}

impl fmt::Display for GuestAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuestAge::Adult => write!(f, "adult"),
            GuestAge::Child => write!(f, "child"),
            GuestAge::Infant => write!(f, "infant"),
        }
    }
}

impl FromStr for GuestAge {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "adult" => Ok(GuestAge::Adult),
            "child" => Ok(GuestAge::Child),
            "infant" => Ok(GuestAge::Infant),
            _ => Err(format!(
                "Invalid guest age '{}'. Valid options: adult, child, infant",
                s
            )),
        }
    }
}

/// RSVP state. Encoded as an integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum InvitationStatus {
    NoResponse,
    Confirmed,
    Declined,
    Maybe,
}

impl From<InvitationStatus> for u8 {
    fn from(status: InvitationStatus) -> Self {
        match status {
            InvitationStatus::NoResponse => 0,
            InvitationStatus::Confirmed => 1,
            InvitationStatus::Declined => 2,
            InvitationStatus::Maybe => 3,
        }
    }
}

impl TryFrom<u8> for InvitationStatus {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(InvitationStatus::NoResponse),
            1 => Ok(InvitationStatus::Confirmed),
            2 => Ok(InvitationStatus::Declined),
            3 => Ok(InvitationStatus::Maybe),
            _ => Err(format!("unknown invitation status code {}", raw)),
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvitationStatus::NoResponse => write!(f, "no-response"),
            InvitationStatus::Confirmed => write!(f, "confirmed"),
            InvitationStatus::Declined => write!(f, "declined"),
            InvitationStatus::Maybe => write!(f, "maybe"),
        }
    }
}

impl FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "no-response" | "noresponse" => Ok(InvitationStatus::NoResponse),
            "confirmed" => Ok(InvitationStatus::Confirmed),
            "declined" => Ok(InvitationStatus::Declined),
            "maybe" => Ok(InvitationStatus::Maybe),
            _ => Err(format!(
                "Invalid invitation status '{}'. Valid options: no-response, confirmed, declined, maybe",
                s
            )),
        }
    }
}

/// Postal address as captured by the geocoder. Every part is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Address {
    pub name: Option<String>,
    pub thoroughfare: Option<String>,
    pub sub_thoroughfare: Option<String>,
    pub locality: Option<String>,
    pub sub_locality: Option<String>,
    pub administrative_area: Option<String>,
    pub sub_administrative_area: Option<String>,
    pub postal_code: Option<String>,
    pub iso_country_code: Option<String>,
    pub country: Option<String>,
    pub inland_water: Option<String>,
    pub ocean: Option<String>,
    pub areas_of_interest: Option<Vec<String>>,
    pub postal_address: Option<String>,
}

impl Address {
    /// Street, number, district, city, country and postal code, in that order.
    pub fn formatted(&self) -> String {
        [
            &self.thoroughfare,
            &self.sub_thoroughfare,
            &self.sub_locality,
            &self.locality,
            &self.country,
            &self.postal_code,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Guest {
    pub id: Uuid,
    pub wedding_id: Uuid,
    /// Owning wedding, maintained by the store.
    #[serde(rename = "wedding_guest")]
    pub wedding: Option<Uuid>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub seat: Option<String>,
    pub message_from_guest: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub postal_address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub allergens: Option<Vec<String>>,
    pub diets: Option<Vec<String>>,
    pub age: GuestAge,
    pub status: InvitationStatus,
    pub need_hotel: bool,
    pub plus_one_options: u32,
}

impl Guest {
    pub fn new(
        wedding_id: Uuid,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::new_v4(),
            wedding_id,
            wedding: None,
            created_at: now,
            updated_at: now,
            email: None,
            notes: None,
            seat: None,
            message_from_guest: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: None,
            address: None,
            postal_address: None,
            latitude: None,
            longitude: None,
            allergens: None,
            diets: None,
            age: GuestAge::Adult,
            status: InvitationStatus::NoResponse,
            need_hotel: false,
            plus_one_options: 0,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_age(mut self, age: GuestAge) -> Self {
        self.age = age;
        self
    }

    pub fn with_status(mut self, status: InvitationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_allergens(mut self, allergens: Vec<String>) -> Self {
        self.allergens = Some(allergens);
        self
    }

    pub fn with_diets(mut self, diets: Vec<String>) -> Self {
        self.diets = Some(diets);
        self
    }

    pub fn with_plus_ones(mut self, plus_one_options: u32) -> Self {
        self.plus_one_options = plus_one_options;
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn touch(&mut self) {
        self.updated_at = timestamp::now();
    }
}

impl Validate for Guest {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl fmt::Display for Guest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.full_name(), self.age, self.status)?;
        if self.plus_one_options > 0 {
            write!(f, " +{}", self.plus_one_options)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_new() {
        let wedding_id = Uuid::new_v4();
        let guest = Guest::new(wedding_id, "Jana", "Novak");

        assert_eq!(guest.wedding_id, wedding_id);
        assert_eq!(guest.wedding, None);
        assert_eq!(guest.age, GuestAge::Adult);
        assert_eq!(guest.status, InvitationStatus::NoResponse);
        assert_eq!(guest.created_at, guest.updated_at);
    }

    #[test]
    fn test_full_name() {
        let guest = Guest::new(Uuid::new_v4(), "Jana", "Novak");
        assert_eq!(guest.full_name(), "Jana Novak");
    }

    #[test]
    fn test_age_and_status_are_integers_on_the_wire() {
        let guest = Guest::new(Uuid::new_v4(), "A", "B")
            .with_age(GuestAge::Infant)
            .with_status(InvitationStatus::Maybe);
        let json = serde_json::to_value(&guest).unwrap();
        assert_eq!(json["age"], 2);
        assert_eq!(json["status"], 3);
    }

    #[test]
    fn test_unknown_status_code_is_rejected() {
        let mut json = serde_json::to_value(Guest::new(Uuid::new_v4(), "A", "B")).unwrap();
        json["status"] = serde_json::json!(9);
        assert!(serde_json::from_value::<Guest>(json).is_err());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(
            "confirmed".parse::<InvitationStatus>().unwrap(),
            InvitationStatus::Confirmed
        );
        assert_eq!(
            "No-Response".parse::<InvitationStatus>().unwrap(),
            InvitationStatus::NoResponse
        );
        assert!("attending".parse::<InvitationStatus>().is_err());
        assert_eq!("CHILD".parse::<GuestAge>().unwrap(), GuestAge::Child);
    }

    #[test]
    fn test_json_roundtrip_all_optionals_absent() {
        let guest = Guest::new(Uuid::new_v4(), "Petr", "Svoboda");
        let json = serde_json::to_string(&guest).unwrap();
        let parsed: Guest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, guest);
        assert!(parsed.email.is_none());
        assert!(parsed.allergens.is_none());
    }

    #[test]
    fn test_json_roundtrip_all_optionals_present() {
        let mut guest = Guest::new(Uuid::new_v4(), "Petr", "Svoboda")
            .with_email("petr@example.com")
            .with_allergens(vec!["nuts".into()])
            .with_diets(vec!["vegan".into()])
            .with_plus_ones(1);
        guest.wedding = Some(guest.wedding_id);
        guest.notes = Some("Best man".into());
        guest.seat = Some("T1".into());
        guest.message_from_guest = Some("Can't wait".into());
        guest.phone = Some("+420 777 000 000".into());
        guest.postal_address = Some("Praha".into());
        guest.latitude = Some(50.08);
        guest.longitude = Some(14.42);
        guest.address = Some(Address {
            thoroughfare: Some("Karlova".into()),
            locality: Some("Praha".into()),
            areas_of_interest: Some(vec!["Old Town".into()]),
            ..Address::default()
        });

        let json = serde_json::to_string(&guest).unwrap();
        let parsed: Guest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, guest);
    }

    #[test]
    fn test_address_formatted_skips_missing_parts() {
        let address = Address {
            thoroughfare: Some("Infinite Loop".into()),
            sub_thoroughfare: Some("1".into()),
            locality: Some("Cupertino".into()),
            postal_code: Some("95014".into()),
            ..Address::default()
        };
        assert_eq!(address.formatted(), "Infinite Loop, 1, Cupertino, 95014");
        assert_eq!(Address::default().formatted(), "");
    }
}
