pub mod api;
pub mod public;
pub mod trips;
pub mod user;
pub mod views;

use axum::{middleware, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{auth, guard, state::AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(public::router())
        .merge(user::router())
        .merge(trips::router())
        .nest("/api", api::router())
        // Layers run bottom-up: the session is resolved before the guard looks at it.
        .layer(middleware::from_fn(guard::route_guard))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::load_session,
        ))
        // Added after the session layers so assets never touch the sessions table.
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
