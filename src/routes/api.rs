use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    auth::{self, AuthenticatedUser, CurrentUser},
    error::{AppError, MessageBody},
    models::trip::{Trip, TripPayload, TripWithOwner},
    state::AppState,
};

const MSG_DELETED: &str = "Путешествие успешно удалено";
const MSG_LOGGED_OUT: &str = "Вы вышли из системы";
const MSG_MALFORMED: &str = "Некорректный формат запроса";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips", get(list_trips).post(create_trip))
        .route(
            "/trips/:id",
            get(get_trip).put(update_trip).delete(delete_trip),
        )
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(session))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    user_id: Option<String>,
}

async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TripWithOwner>>, AppError> {
    let trips = state.trips.list_public(query.user_id.as_deref()).await?;
    Ok(Json(trips))
}

async fn get_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
) -> Result<Json<TripWithOwner>, AppError> {
    let trip = state.trips.get(current.principal(), &trip_id).await?;
    Ok(Json(trip))
}

async fn create_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    body: Result<Json<TripPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Trip>), AppError> {
    let trip = state
        .trips
        .create(current.principal(), payload_or_empty(body))
        .await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

async fn update_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
    body: Result<Json<TripPayload>, JsonRejection>,
) -> Result<Json<Trip>, AppError> {
    let trip = state
        .trips
        .update(current.principal(), &trip_id, payload_or_empty(body))
        .await?;
    Ok(Json(trip))
}

async fn delete_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
) -> Result<Json<MessageBody>, AppError> {
    state.trips.delete(current.principal(), &trip_id).await?;
    Ok(Json(MessageBody::new(MSG_DELETED)))
}

/// An unreadable body is treated like an empty one, so it fails the
/// required-field check at the same point in the check order.
fn payload_or_empty(body: Result<Json<TripPayload>, JsonRejection>) -> TripPayload {
    match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            debug!("unreadable trip payload: {rejection}");
            TripPayload::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    user: Option<AuthenticatedUser>,
}

async fn register(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, PrivateCookieJar, Json<AuthenticatedUser>), AppError> {
    let Json(req) = body.map_err(|_| AppError::BadRequest(MSG_MALFORMED.into()))?;
    let user = auth::register_user(&state, &req.name, &req.email, &req.password).await?;
    let session_id = auth::create_session(&state, &user.id).await?;
    Ok((
        StatusCode::CREATED,
        auth::apply_session_cookie(jar, &session_id),
        Json(AuthenticatedUser::from(&user)),
    ))
}

async fn login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(PrivateCookieJar, Json<AuthenticatedUser>), AppError> {
    let Json(req) = body.map_err(|_| AppError::BadRequest(MSG_MALFORMED.into()))?;
    let user = auth::authenticate_user(&state, &req.email, &req.password).await?;
    let session_id = auth::create_session(&state, &user.id).await?;
    Ok((
        auth::apply_session_cookie(jar, &session_id),
        Json(AuthenticatedUser::from(&user)),
    ))
}

async fn logout(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Json<MessageBody>), AppError> {
    if let Some(cookie) = jar.get(auth::SESSION_COOKIE) {
        auth::destroy_session(&state, cookie.value()).await?;
    }
    Ok((
        auth::clear_session_cookie(jar),
        Json(MessageBody::new(MSG_LOGGED_OUT)),
    ))
}

async fn session(current: CurrentUser) -> Json<SessionResponse> {
    Json(SessionResponse { user: current.0 })
}
