use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{error::AppError, models::user::UserSummary};

pub const MSG_REQUIRED_FIELDS: &str = "Необходимо заполнить все обязательные поля";
pub const MSG_INVALID_DATE: &str = "Некорректный формат даты";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub total_cost: Option<f64>,
    pub image_url: Option<String>,
    pub is_public: bool,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripWithOwner {
    #[serde(flatten)]
    pub trip: Trip,
    pub user: UserSummary,
}

/// Request body for `POST /api/trips` and `PUT /api/trips/{id}`.
///
/// Every field is optional at the wire level so that a missing required
/// field maps to a 400 with a readable message instead of a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub total_cost: Option<f64>,
    pub image_url: Option<String>,
    pub is_public: Option<bool>,
    pub user_id: Option<String>,
}

/// The mutable fields of a trip after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct TripFields {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub total_cost: Option<f64>,
    pub image_url: Option<String>,
    pub is_public: bool,
}

impl TripPayload {
    /// Checks that every required field is present and non-empty.
    pub fn has_required_fields(&self) -> bool {
        [
            &self.title,
            &self.description,
            &self.location,
            &self.start_date,
            &self.end_date,
        ]
        .iter()
        .all(|field| field.as_deref().is_some_and(|value| !value.is_empty()))
    }

    pub fn into_fields(self) -> Result<TripFields, AppError> {
        if !self.has_required_fields() {
            return Err(AppError::BadRequest(MSG_REQUIRED_FIELDS.into()));
        }

        let start_date = parse_trip_date(self.start_date.as_deref().unwrap_or_default())?;
        let end_date = parse_trip_date(self.end_date.as_deref().unwrap_or_default())?;

        Ok(TripFields {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            start_date,
            end_date,
            latitude: self.latitude,
            longitude: self.longitude,
            total_cost: self.total_cost,
            image_url: self.image_url.filter(|url| !url.is_empty()),
            is_public: self.is_public.unwrap_or(true),
        })
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_trip_date(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::BadRequest(MSG_INVALID_DATE.into()))
}
