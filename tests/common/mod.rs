#![allow(dead_code)]

use actix_http::Request;
use actix_web::{
    body::{to_bytes, MessageBody},
    dev::{Service, ServiceResponse},
    http::StatusCode,
    middleware::Logger,
    test, web, App, Error,
};
use chrono::Duration;
use serde_json::{json, Value};
use std::sync::Arc;

use taskforge::auth::{AuthMiddleware, PasswordHasher, TokenService};
use taskforge::routes;
use taskforge::services::{IdentityService, TaskService};
use taskforge::store::MemoryStore;

pub const SECRET: &[u8] = b"integration_test_secret_0123456789abcdef";

/// Everything an app instance needs, backed by one shared in-memory store.
#[derive(Clone)]
pub struct TestState {
    pub identity: IdentityService,
    pub tasks: TaskService,
    pub tokens: TokenService,
}

impl TestState {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let tokens = TokenService::new(SECRET, Duration::hours(1));
        Self {
            identity: IdentityService::new(
                Arc::new(store.clone()),
                PasswordHasher::new(4).unwrap(),
                tokens.clone(),
            ),
            tasks: TaskService::new(Arc::new(store)),
            tokens,
        }
    }
}

pub async fn init_app(
    state: &TestState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    test::init_service(
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(state.identity.clone()))
            .app_data(web::Data::new(state.tasks.clone()))
            .service(routes::health::health)
            .service(
                web::scope("/api/v1")
                    .wrap(AuthMiddleware::new(state.tokens.clone()))
                    .configure(routes::config),
            ),
    )
    .await
}

/// Sends `req` and returns the status with the decoded JSON body.
///
/// Requests rejected by the middleware surface as `Err` in the test harness; they are
/// rendered the same way the server would render them.
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let (status, body) = match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            (status, test::read_body(resp).await)
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            (status, to_bytes(resp.into_body()).await.unwrap())
        }
    };

    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

pub async fn register<S, B>(app: &S, name: &str, username: &str, password: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "name": name, "username": username, "password": password }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body["data"].clone()
}

pub async fn login<S, B>(app: &S, username: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["data"]["token"].as_str().unwrap().to_string()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
