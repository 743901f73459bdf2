use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;

use crate::{
    auth::{self, CurrentUser},
    error::AppError,
    guard::DASHBOARD_PATH,
    routes::views::TripCardView,
    services::trips::matches_search,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/explore", get(explore))
        .route("/auth/login", get(login_form).post(login_submit))
        .route("/auth/register", get(register_form).post(register_submit))
        .route("/logout", post(logout))
}

#[derive(Template)]
#[template(path = "landing.html")]
struct LandingTemplate {
    logged_in: bool,
}

async fn landing(current: CurrentUser) -> impl IntoResponse {
    AskamaTemplateResponse::into_response(LandingTemplate {
        logged_in: current.0.is_some(),
    })
}

#[derive(Template)]
#[template(path = "explore.html")]
struct ExploreTemplate {
    logged_in: bool,
    query: String,
    trips: Vec<TripCardView>,
}

#[derive(Deserialize)]
struct ExploreQuery {
    #[serde(default)]
    q: String,
}

async fn explore(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<ExploreQuery>,
) -> Result<impl IntoResponse, AppError> {
    let trips = state.trips.list_public(None).await?;
    let cards = trips
        .iter()
        .filter(|item| matches_search(item, &params.q))
        .map(TripCardView::from)
        .collect();
    Ok(AskamaTemplateResponse::into_response(ExploreTemplate {
        logged_in: current.0.is_some(),
        query: params.q,
        trips: cards,
    }))
}

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    logged_in: bool,
    show_error: bool,
    error_message: String,
    email: String,
}

async fn login_form() -> impl IntoResponse {
    AskamaTemplateResponse::into_response(LoginTemplate {
        logged_in: false,
        show_error: false,
        error_message: String::new(),
        email: String::new(),
    })
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

async fn login_submit(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match auth::authenticate_user(&state, &form.email, &form.password).await {
        Ok(user) => {
            let session_id = auth::create_session(&state, &user.id).await?;
            Ok((
                auth::apply_session_cookie(jar, &session_id),
                Redirect::to(DASHBOARD_PATH),
            )
                .into_response())
        }
        Err(AppError::Unauthorized) => Ok(render_login_error(
            form.email,
            "Неверный email или пароль".into(),
        )),
        Err(AppError::BadRequest(msg)) => Ok(render_login_error(form.email, msg)),
        Err(err) => Err(err),
    }
}

fn render_login_error(email: String, message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        AskamaTemplateResponse::into_response(LoginTemplate {
            logged_in: false,
            show_error: true,
            error_message: message,
            email,
        }),
    )
        .into_response()
}

#[derive(Template)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    logged_in: bool,
    show_error: bool,
    error_message: String,
    name: String,
    email: String,
}

async fn register_form() -> impl IntoResponse {
    AskamaTemplateResponse::into_response(RegisterTemplate {
        logged_in: false,
        show_error: false,
        error_message: String::new(),
        name: String::new(),
        email: String::new(),
    })
}

#[derive(Deserialize)]
struct RegisterForm {
    name: String,
    email: String,
    password: String,
    password_confirm: String,
}

async fn register_submit(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if form.password != form.password_confirm {
        return Ok(render_register_error(
            form.name,
            form.email,
            "Пароли не совпадают".into(),
        ));
    }

    match auth::register_user(&state, &form.name, &form.email, &form.password).await {
        Ok(user) => {
            let session_id = auth::create_session(&state, &user.id).await?;
            Ok((
                auth::apply_session_cookie(jar, &session_id),
                Redirect::to(DASHBOARD_PATH),
            )
                .into_response())
        }
        Err(AppError::BadRequest(msg)) => Ok(render_register_error(form.name, form.email, msg)),
        Err(err) => Err(err),
    }
}

fn render_register_error(name: String, email: String, message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        AskamaTemplateResponse::into_response(RegisterTemplate {
            logged_in: false,
            show_error: true,
            error_message: message,
            name,
            email,
        }),
    )
        .into_response()
}

async fn logout(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Redirect), AppError> {
    if let Some(cookie) = jar.get(auth::SESSION_COOKIE) {
        auth::destroy_session(&state, cookie.value()).await?;
    }
    Ok((auth::clear_session_cookie(jar), Redirect::to("/")))
}
