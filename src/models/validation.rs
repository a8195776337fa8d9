use thiserror::Error;

/// Value-level invariants that the type system does not already enforce.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a non-negative amount, got {value}")]
    NegativeAmount { field: &'static str, value: f64 },

    #[error("budget item '{0}' is marked paid but has no paid_at date")]
    MissingPaidAt(String),

    #[error("timeline event '{0}' ends before it starts")]
    EventEndsBeforeStart(String),

    #[error("location must be a Point with [longitude, latitude] coordinates")]
    InvalidLocation,

    #[error("wedding owner {user_id} does not match user info {info_id}")]
    OwnerMismatch {
        user_id: uuid::Uuid,
        info_id: uuid::Uuid,
    },
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NegativeAmount { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative() {
        assert!(non_negative("amount", 0.0).is_ok());
        assert!(non_negative("amount", 12.5).is_ok());
        assert_eq!(
            non_negative("amount", -1.0),
            Err(ValidationError::NegativeAmount {
                field: "amount",
                value: -1.0
            })
        );
        assert!(non_negative("amount", f64::NAN).is_err());
    }
}
