use chrono::Utc;
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::AuthenticatedUser,
    db::DbPool,
    error::AppError,
    models::{
        trip::{Trip, TripFields, TripPayload, TripWithOwner},
        user::UserSummary,
    },
};

pub const MSG_FORBIDDEN_VIEW: &str = "Нет доступа к этому путешествию";
pub const MSG_FORBIDDEN_CREATE: &str = "Нет доступа к созданию путешествия для другого пользователя";
pub const MSG_FORBIDDEN_EDIT: &str = "Нет доступа к редактированию этого путешествия";
pub const MSG_FORBIDDEN_DELETE: &str = "Нет доступа к удалению этого путешествия";

const SELECT_WITH_OWNER: &str = r#"
    SELECT t.*, u.name AS owner_name, u.image AS owner_image
    FROM trips t
    JOIN users u ON u.id = t.user_id
"#;

/// Trip persistence plus the visibility and ownership rules.
///
/// Every operation takes the caller as an explicit `Option<&AuthenticatedUser>`.
/// Checks run in a fixed order: authentication, existence, ownership,
/// then payload validation where the operation has one.
#[derive(Clone)]
pub struct TripService {
    db: DbPool,
}

impl TripService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Public trips, newest first, optionally restricted to one owner.
    /// Private trips are never listed, not even for their owner.
    pub async fn list_public(&self, owner_id: Option<&str>) -> Result<Vec<TripWithOwner>, AppError> {
        let owner_id = owner_id.filter(|id| !id.is_empty());
        let sql = format!(
            "{SELECT_WITH_OWNER} WHERE t.is_public = 1 AND (?1 IS NULL OR t.user_id = ?1) \
             ORDER BY t.created_at DESC, t.rowid DESC"
        );
        let rows = sqlx::query(&sql).bind(owner_id).fetch_all(&self.db).await?;
        rows.iter()
            .map(trip_with_owner)
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(AppError::from)
    }

    /// All trips of the given owner, private ones included.
    pub async fn list_owned_by(&self, owner: &AuthenticatedUser) -> Result<Vec<TripWithOwner>, AppError> {
        let sql = format!(
            "{SELECT_WITH_OWNER} WHERE t.user_id = ?1 ORDER BY t.created_at DESC, t.rowid DESC"
        );
        let rows = sqlx::query(&sql).bind(&owner.id).fetch_all(&self.db).await?;
        rows.iter()
            .map(trip_with_owner)
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(AppError::from)
    }

    pub async fn get(
        &self,
        caller: Option<&AuthenticatedUser>,
        trip_id: &str,
    ) -> Result<TripWithOwner, AppError> {
        let sql = format!("{SELECT_WITH_OWNER} WHERE t.id = ?1");
        let row = sqlx::query(&sql)
            .bind(trip_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        let found = trip_with_owner(&row)?;

        if !found.trip.is_public && !caller.is_some_and(|user| found.trip.is_owned_by(&user.id)) {
            return Err(AppError::Forbidden(MSG_FORBIDDEN_VIEW));
        }

        Ok(found)
    }

    pub async fn create(
        &self,
        caller: Option<&AuthenticatedUser>,
        payload: TripPayload,
    ) -> Result<Trip, AppError> {
        let caller = caller.ok_or(AppError::Unauthorized)?;
        let requested_owner = payload.user_id.clone();
        let fields = payload.into_fields()?;
        if requested_owner.as_deref() != Some(caller.id.as_str()) {
            return Err(AppError::Forbidden(MSG_FORBIDDEN_CREATE));
        }

        let trip = Trip {
            id: Uuid::new_v4().to_string(),
            title: fields.title,
            description: fields.description,
            location: fields.location,
            start_date: fields.start_date,
            end_date: fields.end_date,
            latitude: fields.latitude,
            longitude: fields.longitude,
            total_cost: fields.total_cost,
            image_url: fields.image_url,
            is_public: fields.is_public,
            user_id: caller.id.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO trips
               (id, title, description, location, start_date, end_date, latitude, longitude,
                total_cost, image_url, is_public, user_id, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"#,
        )
        .bind(&trip.id)
        .bind(&trip.title)
        .bind(&trip.description)
        .bind(&trip.location)
        .bind(trip.start_date)
        .bind(trip.end_date)
        .bind(trip.latitude)
        .bind(trip.longitude)
        .bind(trip.total_cost)
        .bind(&trip.image_url)
        .bind(trip.is_public)
        .bind(&trip.user_id)
        .bind(trip.created_at)
        .execute(&self.db)
        .await?;

        info!(trip_id = %trip.id, user_id = %trip.user_id, "trip created");
        Ok(trip)
    }

    pub async fn update(
        &self,
        caller: Option<&AuthenticatedUser>,
        trip_id: &str,
        payload: TripPayload,
    ) -> Result<Trip, AppError> {
        let caller = caller.ok_or(AppError::Unauthorized)?;
        let existing = self.find(trip_id).await?.ok_or(AppError::NotFound)?;
        if !existing.is_owned_by(&caller.id) {
            return Err(AppError::Forbidden(MSG_FORBIDDEN_EDIT));
        }
        let fields = payload.into_fields()?;

        sqlx::query(
            r#"UPDATE trips
               SET title = ?1, description = ?2, location = ?3, start_date = ?4, end_date = ?5,
                   latitude = ?6, longitude = ?7, total_cost = ?8, image_url = ?9, is_public = ?10
               WHERE id = ?11"#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.location)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.latitude)
        .bind(fields.longitude)
        .bind(fields.total_cost)
        .bind(&fields.image_url)
        .bind(fields.is_public)
        .bind(trip_id)
        .execute(&self.db)
        .await?;

        info!(trip_id, user_id = %caller.id, "trip updated");
        Ok(apply_fields(existing, fields))
    }

    pub async fn delete(
        &self,
        caller: Option<&AuthenticatedUser>,
        trip_id: &str,
    ) -> Result<(), AppError> {
        let caller = caller.ok_or(AppError::Unauthorized)?;
        let existing = self.find(trip_id).await?.ok_or(AppError::NotFound)?;
        if !existing.is_owned_by(&caller.id) {
            return Err(AppError::Forbidden(MSG_FORBIDDEN_DELETE));
        }

        sqlx::query("DELETE FROM trips WHERE id = ?1")
            .bind(trip_id)
            .execute(&self.db)
            .await?;

        info!(trip_id, user_id = %caller.id, "trip deleted");
        Ok(())
    }

    async fn find(&self, trip_id: &str) -> Result<Option<Trip>, AppError> {
        let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = ?1")
            .bind(trip_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(trip)
    }
}

fn trip_with_owner(row: &SqliteRow) -> Result<TripWithOwner, sqlx::Error> {
    let trip = Trip::from_row(row)?;
    let user = UserSummary {
        id: trip.user_id.clone(),
        name: row.try_get("owner_name")?,
        image: row.try_get("owner_image")?,
    };
    Ok(TripWithOwner { trip, user })
}

fn apply_fields(existing: Trip, fields: TripFields) -> Trip {
    Trip {
        title: fields.title,
        description: fields.description,
        location: fields.location,
        start_date: fields.start_date,
        end_date: fields.end_date,
        latitude: fields.latitude,
        longitude: fields.longitude,
        total_cost: fields.total_cost,
        image_url: fields.image_url,
        is_public: fields.is_public,
        ..existing
    }
}

/// Case-insensitive substring match over title, location and author name.
/// An empty term matches everything.
pub fn matches_search(item: &TripWithOwner, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    [&item.trip.title, &item.trip.location, &item.user.name]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
}
