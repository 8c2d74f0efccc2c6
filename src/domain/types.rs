//! Strongly-typed value objects used by domain entities.
//!
//! Identifiers are wrapped so that once a value reaches the domain layer it is
//! known to be positive and cannot be confused with an identifier of another
//! aggregate.
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided identifier is zero or negative.
    #[error("id must be greater than zero")]
    NonPositiveId,
    /// Provided identifier could not be parsed as a number.
    #[error("id is not a number: {0}")]
    NotANumber(String),
    /// Provided quantity is negative or not finite.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),
    /// Stored state label is not one we know about.
    #[error("unknown state: {0}")]
    UnknownState(String),
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl FromStr for $name {
            type Err = TypeConstraintError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| TypeConstraintError::NotANumber(s.to_string()))?;
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(OrderId, "Unique identifier for a sales order.");
id_newtype!(OrderItemId, "Unique identifier for an order line.");
id_newtype!(ShipmentId, "Unique identifier for a stored shipment.");

/// Parses a submitted quantity, accepting decimal quantities like `1.5`.
pub fn parse_quantity(raw: &str) -> Result<f64, TypeConstraintError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(qty) if qty.is_finite() && qty >= 0.0 => Ok(qty),
        _ => Err(TypeConstraintError::InvalidQuantity(raw.to_string())),
    }
}
