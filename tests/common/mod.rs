#![allow(dead_code)]

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use travel_journal::{
    config::AppConfig,
    db::{init_pool, run_migrations},
    routes::create_router,
    state::AppState,
};

pub struct TestApp {
    pub state: AppState,
    router: Router,
    _root: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
    pub location: Option<String>,
    pub session_cookie: Option<String>,
}

/// A registered user together with the cookie that authenticates them.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub cookie: String,
}

impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        let root = TempDir::new().context("create temp dir for test app")?;
        let db_path = root.path().join("travel.sqlite");
        let config = AppConfig {
            database_url: format!("sqlite://{}", db_path.to_string_lossy()),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            cookie_secret: "test-cookie-secret".into(),
            session_ttl_days: 1,
        };

        let db = init_pool(&config.database_url).await?;
        run_migrations(&db).await?;

        let state = AppState::new(config, db);
        let router = create_router(state.clone());
        Ok(Self {
            state,
            router,
            _root: root,
        })
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");
        self.dispatch(request).await
    }

    /// Posts an `application/x-www-form-urlencoded` body, the way the HTML
    /// forms submit.
    pub async fn post_form(&self, uri: &str, cookie: Option<&str>, form: &str) -> TestResponse {
        let mut builder = Request::builder().method(Method::POST).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .expect("build request");
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let session_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|pair| pair.starts_with("travel_session=") && pair.len() > "travel_session=".len())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            text,
            location,
            session_cookie,
        }
    }

    pub async fn get(&self, uri: &str, account: Option<&Account>) -> TestResponse {
        self.send(Method::GET, uri, account.map(|a| a.cookie.as_str()), None)
            .await
    }

    pub async fn register(&self, name: &str, email: &str) -> Account {
        let res = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "name": name, "email": email, "password": "password123" })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register {email}: {}", res.text);
        Account {
            id: res.body["id"].as_str().expect("user id").to_string(),
            cookie: res.session_cookie.expect("session cookie on register"),
        }
    }

    pub async fn create_trip(&self, owner: &Account, title: &str, is_public: bool) -> Value {
        let res = self
            .send(
                Method::POST,
                "/api/trips",
                Some(owner.cookie.as_str()),
                Some(trip_body(&owner.id, title, is_public)),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "create trip: {}", res.text);
        res.body
    }
}

pub fn trip_body(user_id: &str, title: &str, is_public: bool) -> Value {
    json!({
        "title": title,
        "description": "Прекрасный отпуск на Черноморском побережье",
        "location": "Сочи, Россия",
        "startDate": "2023-07-20",
        "endDate": "2023-07-31",
        "latitude": 43.6028,
        "longitude": 39.7342,
        "totalCost": 65000,
        "imageUrl": null,
        "isPublic": is_public,
        "userId": user_id,
    })
}
