use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{extract::State, response::IntoResponse, routing::get, Router};

use crate::{auth::CurrentUser, error::AppError, routes::views::TripCardView, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    logged_in: bool,
    display_name: String,
    trips: Vec<TripCardView>,
}

async fn dashboard(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    let trips = state.trips.list_owned_by(user).await?;
    Ok(AskamaTemplateResponse::into_response(DashboardTemplate {
        logged_in: true,
        display_name: user.name.clone(),
        trips: trips.iter().map(TripCardView::from).collect(),
    }))
}
