use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use serde_with::{serde_as, NoneAsEmptyString};

use crate::{
    auth::{AuthenticatedUser, CurrentUser},
    error::AppError,
    guard::{DASHBOARD_PATH, LOGIN_PATH},
    models::trip::{Trip, TripPayload},
    routes::views::{self, format_cost, format_range, map_link},
    services::trips::MSG_FORBIDDEN_EDIT,
    state::AppState,
};

const MSG_INVALID_COST: &str = "Некорректная стоимость";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips/new", get(new_form).post(new_submit))
        .route("/trips/:id", get(detail))
        .route("/trips/:id/edit", get(edit_form).post(edit_submit))
        .route("/trips/:id/delete", post(delete_submit))
}

#[derive(Template)]
#[template(path = "trips/detail.html")]
struct TripDetailTemplate {
    logged_in: bool,
    id: String,
    title: String,
    description: String,
    location: String,
    author: String,
    dates: String,
    cost: String,
    image_url: String,
    map_url: String,
    is_public: bool,
    is_owner: bool,
}

async fn detail(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let found = state.trips.get(current.principal(), &trip_id).await?;
    let is_owner = current
        .principal()
        .is_some_and(|user| found.trip.is_owned_by(&user.id));
    let trip = &found.trip;
    Ok(AskamaTemplateResponse::into_response(TripDetailTemplate {
        logged_in: current.0.is_some(),
        id: trip.id.clone(),
        title: trip.title.clone(),
        description: trip.description.clone(),
        location: trip.location.clone(),
        author: found.user.name.clone(),
        dates: format_range(trip),
        cost: trip.total_cost.map(format_cost).unwrap_or_default(),
        image_url: trip.image_url.clone().unwrap_or_default(),
        map_url: map_link(trip.latitude, trip.longitude).unwrap_or_default(),
        is_public: trip.is_public,
        is_owner,
    }))
}

#[derive(Template, Default)]
#[template(path = "trips/form.html")]
struct TripFormTemplate {
    logged_in: bool,
    heading: String,
    action: String,
    submit_label: String,
    error_message: String,
    title: String,
    description: String,
    location: String,
    start_date: String,
    end_date: String,
    latitude: String,
    longitude: String,
    total_cost: String,
    image_url: String,
    is_public: bool,
}

impl TripFormTemplate {
    fn for_new() -> Self {
        Self {
            logged_in: true,
            heading: "Новое путешествие".into(),
            action: "/trips/new".into(),
            submit_label: "Создать путешествие".into(),
            is_public: true,
            ..Self::default()
        }
    }

    fn for_edit(trip: &Trip) -> Self {
        Self {
            logged_in: true,
            heading: "Редактирование путешествия".into(),
            action: format!("/trips/{}/edit", trip.id),
            submit_label: "Сохранить изменения".into(),
            error_message: String::new(),
            title: trip.title.clone(),
            description: trip.description.clone(),
            location: trip.location.clone(),
            start_date: views::input_date(trip.start_date),
            end_date: views::input_date(trip.end_date),
            latitude: views::optional_number(trip.latitude),
            longitude: views::optional_number(trip.longitude),
            total_cost: views::optional_number(trip.total_cost),
            image_url: trip.image_url.clone().unwrap_or_default(),
            is_public: trip.is_public,
        }
    }

    /// Keeps what the user typed so a rejected submit can be corrected.
    fn with_submitted(self, form: &TripForm, error_message: String) -> Self {
        Self {
            error_message,
            title: form.title.clone(),
            description: form.description.clone(),
            location: form.location.clone(),
            start_date: form.start_date.clone(),
            end_date: form.end_date.clone(),
            latitude: views::optional_number(form.latitude),
            longitude: views::optional_number(form.longitude),
            total_cost: form.total_cost.clone(),
            image_url: form.image_url.clone(),
            is_public: form.is_public.is_some(),
            ..self
        }
    }
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct TripForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    start_date: String,
    #[serde(default)]
    end_date: String,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    latitude: Option<f64>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    total_cost: String,
    #[serde(default)]
    image_url: String,
    /// Unchecked checkboxes are simply absent from the form body.
    #[serde(default)]
    is_public: Option<String>,
}

impl TripForm {
    fn to_payload(&self, owner: &AuthenticatedUser) -> Result<TripPayload, AppError> {
        Ok(TripPayload {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            location: Some(self.location.trim().to_string()),
            start_date: Some(self.start_date.clone()),
            end_date: Some(self.end_date.clone()),
            latitude: self.latitude,
            longitude: self.longitude,
            total_cost: parse_cost(&self.total_cost)?,
            image_url: Some(self.image_url.trim().to_string()),
            is_public: Some(self.is_public.is_some()),
            user_id: Some(owner.id.clone()),
        })
    }
}

/// Accepts "45 000", "1500,50" and "1500.50 ₽". A blank field means no cost.
fn parse_cost(raw: &str) -> Result<Option<f64>, AppError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '₽')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|cost| cost.is_finite() && *cost >= 0.0)
        .map(Some)
        .ok_or_else(|| AppError::BadRequest(MSG_INVALID_COST.into()))
}

async fn owned_trip(state: &AppState, user: &AuthenticatedUser, trip_id: &str) -> Result<Trip, AppError> {
    let found = state.trips.get(Some(user), trip_id).await?;
    if !found.trip.is_owned_by(&user.id) {
        return Err(AppError::Forbidden(MSG_FORBIDDEN_EDIT));
    }
    Ok(found.trip)
}

fn render_form(status: StatusCode, template: TripFormTemplate) -> Response {
    (status, AskamaTemplateResponse::into_response(template)).into_response()
}

async fn new_form(current: CurrentUser) -> Response {
    if current.0.is_none() {
        return Redirect::to(LOGIN_PATH).into_response();
    }
    render_form(StatusCode::OK, TripFormTemplate::for_new())
}

async fn new_submit(
    State(state): State<AppState>,
    current: CurrentUser,
    Form(form): Form<TripForm>,
) -> Result<Response, AppError> {
    let user = current.require_user()?;
    let outcome = match form.to_payload(user) {
        Ok(payload) => state.trips.create(Some(user), payload).await.map(|_| ()),
        Err(err) => Err(err),
    };
    match outcome {
        Ok(()) => Ok(Redirect::to(DASHBOARD_PATH).into_response()),
        Err(AppError::BadRequest(msg)) => Ok(render_form(
            StatusCode::BAD_REQUEST,
            TripFormTemplate::for_new().with_submitted(&form, msg),
        )),
        Err(err) => Err(err),
    }
}

async fn edit_form(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
) -> Result<Response, AppError> {
    let Some(user) = current.principal() else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };
    let trip = owned_trip(&state, user, &trip_id).await?;
    Ok(render_form(StatusCode::OK, TripFormTemplate::for_edit(&trip)))
}

async fn edit_submit(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
    Form(form): Form<TripForm>,
) -> Result<Response, AppError> {
    let user = current.require_user()?;
    // Existence and ownership are checked before an unreadable cost is reported.
    let outcome = match form.to_payload(user) {
        Ok(payload) => state
            .trips
            .update(Some(user), &trip_id, payload)
            .await
            .map(|trip| trip.id),
        Err(err) => owned_trip(&state, user, &trip_id).await.and(Err(err)),
    };
    match outcome {
        Ok(id) => Ok(Redirect::to(&format!("/trips/{id}")).into_response()),
        Err(AppError::BadRequest(msg)) => {
            let template = TripFormTemplate {
                action: format!("/trips/{trip_id}/edit"),
                heading: "Редактирование путешествия".into(),
                submit_label: "Сохранить изменения".into(),
                logged_in: true,
                ..TripFormTemplate::default()
            };
            Ok(render_form(
                StatusCode::BAD_REQUEST,
                template.with_submitted(&form, msg),
            ))
        }
        Err(err) => Err(err),
    }
}

async fn delete_submit(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
) -> Result<Redirect, AppError> {
    state.trips.delete(current.principal(), &trip_id).await?;
    Ok(Redirect::to(DASHBOARD_PATH))
}
