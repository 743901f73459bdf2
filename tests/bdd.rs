#![allow(dead_code)]

use std::{collections::HashMap, fmt, net::SocketAddr};

use anyhow::Context;
use cucumber::{given, then, when, World as _};
use tempfile::TempDir;
use travel_journal::{
    auth::{self, AuthenticatedUser},
    config::AppConfig,
    db::{init_pool, run_migrations},
    error::AppError,
    models::trip::TripPayload,
    state::AppState,
};

#[derive(Debug, cucumber::World, Default)]
struct AppWorld {
    state: Option<TestState>,
    users: HashMap<String, AuthenticatedUser>,
    trips: HashMap<String, String>,
    outcome: Option<String>,
    listing: Vec<String>,
}

impl AppWorld {
    fn app_state(&self) -> &AppState {
        self.state
            .as_ref()
            .expect("state must be initialised first")
            .app()
    }

    fn user(&self, name: &str) -> &AuthenticatedUser {
        self.users
            .get(name)
            .unwrap_or_else(|| panic!("unknown user {name}"))
    }

    fn trip_id(&self, label: &str) -> String {
        self.trips
            .get(label)
            .cloned()
            .unwrap_or_else(|| panic!("unknown trip {label}"))
    }

    fn record<T>(&mut self, result: Result<T, AppError>) {
        self.outcome = Some(outcome_name(&result).to_string());
    }
}

struct TestState {
    app: AppState,
    _root: TempDir,
}

impl fmt::Debug for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestState").finish()
    }
}

impl TestState {
    async fn new() -> anyhow::Result<Self> {
        let root = TempDir::new().context("create temp dir for bdd world")?;
        let db_path = root.path().join("bdd.sqlite");
        let config = AppConfig {
            database_url: format!("sqlite://{}", db_path.to_string_lossy()),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            cookie_secret: "bdd-cookie-secret".into(),
            session_ttl_days: 1,
        };

        let db = init_pool(&config.database_url).await?;
        run_migrations(&db).await?;

        let app = AppState::new(config, db);
        Ok(Self { app, _root: root })
    }

    fn app(&self) -> &AppState {
        &self.app
    }
}

fn outcome_name<T>(result: &Result<T, AppError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(AppError::Unauthorized) => "unauthorized",
        Err(AppError::Forbidden(_)) => "forbidden",
        Err(AppError::NotFound) => "not found",
        Err(AppError::BadRequest(_)) => "bad request",
        Err(_) => "internal",
    }
}

fn payload(title: &str, owner_id: &str, is_public: bool) -> TripPayload {
    TripPayload {
        title: Some(title.into()),
        description: Some(format!("{title}: заметки о поездке")),
        location: Some("Санкт-Петербург, Россия".into()),
        start_date: Some("2023-06-10".into()),
        end_date: Some("2023-06-17".into()),
        latitude: Some(59.9343),
        longitude: Some(30.3351),
        total_cost: Some(45000.0),
        image_url: None,
        is_public: Some(is_public),
        user_id: Some(owner_id.into()),
    }
}

#[given("a fresh application state")]
async fn given_fresh_state(world: &mut AppWorld) {
    world.state = Some(TestState::new().await.expect("state"));
    world.users.clear();
    world.trips.clear();
    world.outcome = None;
    world.listing.clear();
}

#[given(
    regex = r#"^a registered user "([^"]+)" with email "([^"]+)" and password "([^"]+)"$"#
)]
async fn given_registered_user(world: &mut AppWorld, name: String, email: String, password: String) {
    register_user(world, name, email, password).await;
}

#[when(
    regex = r#"^I register a user "([^"]+)" with email "([^"]+)" and password "([^"]+)"$"#
)]
async fn when_register_user(world: &mut AppWorld, name: String, email: String, password: String) {
    register_user(world, name, email, password).await;
}

#[then(regex = r#"^I can authenticate as "([^"]+)" using password "([^"]+)"$"#)]
async fn then_can_authenticate(world: &mut AppWorld, email: String, password: String) {
    let authed = auth::authenticate_user(world.app_state(), &email, &password)
        .await
        .expect("authentication");
    assert_eq!(authed.email, email);
}

#[then(regex = r#"^authenticating as "([^"]+)" with password "([^"]+)" is rejected$"#)]
async fn then_authentication_rejected(world: &mut AppWorld, email: String, password: String) {
    let result = auth::authenticate_user(world.app_state(), &email, &password).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[given(regex = r#"^"([^"]+)" has a (public|private) trip "([^"]+)"$"#)]
async fn given_trip(world: &mut AppWorld, owner: String, visibility: String, label: String) {
    let owner = world.user(&owner).clone();
    let trip = world
        .app_state()
        .trips
        .create(Some(&owner), payload(&label, &owner.id, visibility == "public"))
        .await
        .expect("create trip");
    world.trips.insert(label, trip.id);
}

#[when("an anonymous visitor lists trips")]
async fn when_anonymous_lists(world: &mut AppWorld) {
    let trips = world
        .app_state()
        .trips
        .list_public(None)
        .await
        .expect("list trips");
    world.listing = trips.into_iter().map(|item| item.trip.title).collect();
}

#[when(regex = r#"^"([^"]+)" lists trips owned by "([^"]+)"$"#)]
async fn when_lists_owned(world: &mut AppWorld, _caller: String, owner: String) {
    let owner_id = world.user(&owner).id.clone();
    let trips = world
        .app_state()
        .trips
        .list_public(Some(&owner_id))
        .await
        .expect("list trips");
    world.listing = trips.into_iter().map(|item| item.trip.title).collect();
}

#[then(regex = r#"^the listing contains exactly "([^"]*)"$"#)]
async fn then_listing(world: &mut AppWorld, expected: String) {
    let expected: Vec<&str> = expected
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    assert_eq!(world.listing, expected);
}

#[when(regex = r#"^"([^"]+)" views trip "([^"]+)"$"#)]
async fn when_user_views(world: &mut AppWorld, caller: String, label: String) {
    let caller = world.user(&caller).clone();
    let id = world.trip_id(&label);
    let result = world.app_state().trips.get(Some(&caller), &id).await;
    world.record(result);
}

#[when(regex = r#"^an anonymous visitor views trip "([^"]+)"$"#)]
async fn when_anonymous_views(world: &mut AppWorld, label: String) {
    let id = world.trip_id(&label);
    let result = world.app_state().trips.get(None, &id).await;
    world.record(result);
}

#[when(regex = r#"^"([^"]+)" deletes trip "([^"]+)"$"#)]
async fn when_user_deletes(world: &mut AppWorld, caller: String, label: String) {
    let caller = world.user(&caller).clone();
    let id = world.trip_id(&label);
    let result = world.app_state().trips.delete(Some(&caller), &id).await;
    world.record(result);
}

#[when(regex = r#"^"([^"]+)" creates a trip "([^"]+)" on behalf of "([^"]+)"$"#)]
async fn when_user_creates_for(world: &mut AppWorld, caller: String, title: String, owner: String) {
    let caller = world.user(&caller).clone();
    let owner_id = world.user(&owner).id.clone();
    let result = world
        .app_state()
        .trips
        .create(Some(&caller), payload(&title, &owner_id, true))
        .await;
    world.record(result);
}

#[when(regex = r#"^an anonymous visitor creates a trip "([^"]+)" on behalf of "([^"]+)"$"#)]
async fn when_anonymous_creates_for(world: &mut AppWorld, title: String, owner: String) {
    let owner_id = world.user(&owner).id.clone();
    let result = world
        .app_state()
        .trips
        .create(None, payload(&title, &owner_id, true))
        .await;
    world.record(result);
}

#[then(regex = r#"^the outcome is "([^"]+)"$"#)]
async fn then_outcome(world: &mut AppWorld, expected: String) {
    assert_eq!(world.outcome.as_deref(), Some(expected.as_str()));
}

async fn register_user(world: &mut AppWorld, name: String, email: String, password: String) {
    let created = auth::register_user(world.app_state(), &name, &email, &password)
        .await
        .expect("register user");
    world.users.insert(name, AuthenticatedUser::from(&created));
}

#[tokio::main]
async fn main() {
    AppWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}
