//! Visit model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Visit record as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Visit {
    pub id: i64,
    /// User who imported the record, if any
    pub user_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw create/update request body.
///
/// Fields stay untyped until validation so that a wrong type is reported
/// as a field error instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct VisitPayload {
    #[schema(value_type = String, example = "Alice Martin")]
    pub name: Option<Value>,
    #[schema(value_type = String, example = "alice@example.com")]
    pub email: Option<Value>,
    #[schema(value_type = f64, example = 40.4168)]
    pub latitude: Option<Value>,
    #[schema(value_type = f64, example = 2.1734)]
    pub longitude: Option<Value>,
}

/// Business fields of a visit once they have the right types.
///
/// Produced by [`crate::validation::validate_visit`]; the store relies on
/// the constraints below already holding.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewVisit {
    #[validate(length(
        min = 3,
        max = 255,
        message = "The name field must be between 3 and 255 characters."
    ))]
    pub name: String,
    #[validate(
        email(message = "The email field must be a valid email address."),
        length(max = 255, message = "The email field must not be greater than 255 characters.")
    )]
    pub email: String,
    #[validate(range(
        min = -90.0,
        max = 90.0,
        message = "The latitude field must be between -90 and 90."
    ))]
    pub latitude: f64,
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "The longitude field must be between -180 and 180."
    ))]
    pub longitude: f64,
}
