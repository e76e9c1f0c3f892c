//! Axum request handlers for all service endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use fieldcloak::{Cloak, TransformError};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::middleware::attach_body_logs;
use super::state::AppState;
use crate::error::ServiceError;
use crate::model::{ApiResponse, CreateUserRequest, HealthResponse, User};

/// `POST /users`: validate and store a new user.
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Response {
    let request_log = fieldcloak::obscured(&req);
    let result = store_user(&state, req).await;
    respond(StatusCode::CREATED, result, request_log)
}

/// `GET /users/:id`: fetch a stored user.
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let result = match state.users.get(&id).await {
        Some(user) => Ok(ApiResponse::new(StatusCode::OK.as_u16(), "ok", user)),
        None => Err(ServiceError::NotFound(format!("no user with id {id}"))),
    };
    respond(StatusCode::OK, result, None)
}

/// `POST /users/reveal`: decrypt the tagged fields of an obscured request body.
///
/// Returns `403 Forbidden` unless reveal is enabled, and
/// `503 Service Unavailable` when no log key is configured.
pub async fn reveal(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Response {
    let request_log = fieldcloak::obscured(&req);
    let result = decrypt(&state, &req)
        .map(|plain| ApiResponse::new(StatusCode::OK.as_u16(), "revealed", plain));
    respond(StatusCode::OK, result, request_log)
}

/// `GET /health`: liveness check.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        log_key_installed: state.log_key.is_some(),
        users: state.users.len().await,
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    ServiceError::NotFound("the requested resource does not exist".into())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate(req: &CreateUserRequest) -> Result<(), ServiceError> {
    if req.name.trim().is_empty() {
        return Err(ServiceError::BadRequest("name must not be empty".into()));
    }
    if !req.email.contains('@') {
        return Err(ServiceError::BadRequest("email is not valid".into()));
    }
    if req.password.is_empty() {
        return Err(ServiceError::BadRequest("password must not be empty".into()));
    }
    Ok(())
}

async fn store_user(
    state: &AppState,
    req: CreateUserRequest,
) -> Result<ApiResponse<User>, ServiceError> {
    validate(&req)?;
    let user = User::from_request(Uuid::new_v4().to_string(), req, Utc::now());
    state.users.insert(user.clone()).await;
    info!(user_id = %user.id, "user created");
    Ok(ApiResponse::new(StatusCode::CREATED.as_u16(), "user created", user))
}

fn decrypt(state: &AppState, req: &CreateUserRequest) -> Result<CreateUserRequest, ServiceError> {
    if !state.reveal_enabled {
        return Err(ServiceError::Forbidden("reveal is disabled".into()));
    }
    let Some(key) = state.log_key.as_ref() else {
        return Err(ServiceError::Unavailable("no log key configured".into()));
    };

    Cloak::new()
        .decrypt(req, key.as_str())
        .map_err(|e| match e {
            TransformError::Leaf { path, .. } => {
                warn!(field = %path, "reveal failed");
                ServiceError::BadRequest(format!("field `{path}` could not be decrypted"))
            }
            other => {
                warn!(error = %other, "reveal failed");
                ServiceError::Internal("reveal failed".into())
            }
        })
}

/// Turn a handler outcome into a response with the exchange-log extensions
/// attached. Only the envelope's `data` goes into the response log.
fn respond<T>(
    status: StatusCode,
    result: Result<ApiResponse<T>, ServiceError>,
    request_log: Option<String>,
) -> Response
where
    T: fieldcloak::Transformable + Serialize,
{
    match result {
        Ok(body) => {
            let response_log = body.data.as_ref().and_then(fieldcloak::obscured);
            let mut resp = (status, Json(body)).into_response();
            attach_body_logs(&mut resp, request_log, response_log);
            resp
        }
        Err(e) => {
            let mut resp = e.into_response();
            attach_body_logs(&mut resp, request_log, None);
            resp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Address;
    use crate::server::middleware::{RequestBodyLog, ResponseBodyLog};
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, post};
    use axum::Router;
    use fieldcloak::LogKey;
    use tower::ServiceExt;

    const KEY: &str = "handler-test-key";

    fn request() -> CreateUserRequest {
        CreateUserRequest {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password: "hunter2".into(),
            phone: None,
            address: Some(Address {
                street: "1 Main St".into(),
                city: "Springfield".into(),
                postal_code: "12345".into(),
            }),
        }
    }

    fn router(state: AppState) -> Router {
        Router::new()
            .route("/users", post(create_user))
            .route("/users/reveal", post(reveal))
            .route("/users/:id", get(get_user))
            .route("/health", get(health))
            .with_state(state)
    }

    fn json_post(uri: &str, body: &impl Serialize) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn create_then_fetch() {
        let state = AppState::default();
        let resp = router(state.clone())
            .oneshot(json_post("/users", &request()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert_eq!(body["code"], 201);
        assert!(body["data"].get("password").is_none());
        let id = body["data"]["id"].as_str().unwrap().to_owned();

        let req = Request::builder()
            .uri(format!("/users/{id}"))
            .body(Body::empty())
            .unwrap();
        let resp = router(state).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn invalid_user_is_rejected() {
        let mut req = request();
        req.email = "not-an-email".into();
        let resp = router(AppState::default())
            .oneshot(json_post("/users", &req))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["code"], "bad_request");
    }

    #[tokio::test]
    async fn unknown_user_is_404() {
        let req = Request::builder()
            .uri("/users/nope")
            .body(Body::empty())
            .unwrap();
        let resp = router(AppState::default()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reveal_is_forbidden_by_default() {
        let state = AppState {
            log_key: Some(LogKey::new(KEY)),
            ..AppState::default()
        };
        let resp = router(state)
            .oneshot(json_post("/users/reveal", &request()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn reveal_without_key_is_503() {
        let state = AppState {
            reveal_enabled: true,
            ..AppState::default()
        };
        let resp = router(state)
            .oneshot(json_post("/users/reveal", &request()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn reveal_decrypts_obscured_body() {
        let state = AppState {
            log_key: Some(LogKey::new(KEY)),
            reveal_enabled: true,
            ..AppState::default()
        };
        let hidden = Cloak::new().encrypt(&request(), KEY).unwrap();
        assert_ne!(hidden.password, "hunter2");

        let resp = router(state)
            .oneshot(json_post("/users/reveal", &hidden))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["password"], "hunter2");
        assert_eq!(body["data"]["address"]["street"], "1 Main St");
    }

    #[tokio::test]
    async fn reveal_of_plaintext_names_the_field() {
        let state = AppState {
            log_key: Some(LogKey::new(KEY)),
            reveal_enabled: true,
            ..AppState::default()
        };
        let resp = router(state)
            .oneshot(json_post("/users/reveal", &request()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let message = body_json(resp).await["message"].as_str().unwrap().to_owned();
        assert!(message.contains("email"));
        assert!(!message.contains("alice@example.com"));
    }

    #[tokio::test]
    async fn body_logs_are_obscured_when_a_key_is_installed() {
        fieldcloak::set_log_key(KEY);
        let resp = router(AppState::default())
            .oneshot(json_post("/users", &request()))
            .await
            .unwrap();

        let logged = &resp.extensions().get::<RequestBodyLog>().unwrap().0;
        assert!(!logged.contains("hunter2"));
        assert!(!logged.contains("alice@example.com"));
        assert!(logged.contains("Springfield"));

        let logged = &resp.extensions().get::<ResponseBodyLog>().unwrap().0;
        assert!(!logged.contains("alice@example.com"));
        assert!(logged.contains("Alice"));
    }

    #[tokio::test]
    async fn health_reports_key_and_users() {
        let resp = router(AppState::default())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["log_key_installed"], false);
        assert_eq!(body["users"], 0);
    }
}
