use serde::{Deserialize, Serialize};
use std::fmt;

use super::validation::{Validate, ValidationError};

const POINT: &str = "Point";

/// GeoJSON-style point. Coordinates are `[longitude, latitude]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

impl LocationPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: POINT.to_string(),
            coordinates: vec![longitude, latitude],
        }
    }

    pub fn prague() -> Self {
        Self::new(14.422247, 50.039261)
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.first().copied().unwrap_or(0.0)
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.last().copied().unwrap_or(0.0)
    }
}

impl Validate for LocationPoint {
    fn validate(&self) -> Result<(), ValidationError> {
        let well_formed = self.kind == POINT
            && self.coordinates.len() == 2
            && self.coordinates.iter().all(|c| c.is_finite());
        if well_formed {
            Ok(())
        } else {
            Err(ValidationError::InvalidLocation)
        }
    }
}

impl fmt::Display for LocationPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude(), self.longitude())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_read_first_and_last() {
        let point = LocationPoint::new(-122.431297, 37.773972);
        assert_eq!(point.longitude(), -122.431297);
        assert_eq!(point.latitude(), 37.773972);
    }

    #[test]
    fn test_empty_coordinates_default_to_zero() {
        let point = LocationPoint {
            kind: POINT.to_string(),
            coordinates: Vec::new(),
        };
        assert_eq!(point.longitude(), 0.0);
        assert_eq!(point.latitude(), 0.0);
        assert!(point.validate().is_err());
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(LocationPoint::new(14.5, 50.0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "Point", "coordinates": [14.5, 50.0]})
        );
    }

    #[test]
    fn test_rejects_non_point() {
        let point: LocationPoint =
            serde_json::from_str(r#"{"type": "Polygon", "coordinates": [1.0, 2.0]}"#).unwrap();
        assert_eq!(point.validate(), Err(ValidationError::InvalidLocation));
    }
}
