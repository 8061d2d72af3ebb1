//! REST API layer using Axum.
//!
//! Wires the HTTP surface to the store:
//! - public routes: register, login, liveness
//! - session routes: claims echo, listing houses
//! - owner routes: create/update/delete, gated on the "house owner" role
//!
//! Control flow per request: session extraction (cookie -> verified claims
//! in request extensions) -> role gate -> handler -> store -> response.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::auth::{role_allows, Claims, TokenCodec, TOKEN_COOKIE, TOKEN_TTL_SECS};
use crate::error::ApiError;
use crate::models::{HouseFields, NewUser, Role};
use crate::storage::Storage;

/// Shared app state for REST handlers (Arc-wrapped for concurrency).
pub struct AppState {
    storage: Storage,
    codec: TokenCodec,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl RegisterRequest {
    /// Presence-validate every field; absent and empty both count as
    /// missing.
    fn into_new_user(self) -> Result<NewUser, ApiError> {
        let mut missing = Vec::new();
        let full_name = require(self.full_name, "fullName", &mut missing);
        let role = require(self.role, "role", &mut missing);
        let phone_number = require(self.phone_number, "phoneNumber", &mut missing);
        let email = require(self.email, "email", &mut missing);
        let password = require(self.password, "password", &mut missing);
        if !missing.is_empty() {
            return Err(ApiError::BadRequest(missing));
        }
        Ok(NewUser {
            full_name,
            role: Role::from(role),
            phone_number,
            email,
            password,
        })
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub data: NewUser,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub token: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub data: LoginData,
}

#[derive(Serialize)]
pub struct AuthenticatedUser {
    pub user: Claims,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub inserted_id: String,
}

fn require(
    field: Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> String {
    match field {
        Some(value) if !value.is_empty() => value,
        _ => {
            missing.push(name);
            String::new()
        }
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in raw.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key == name {
                return Some(value.to_string());
            }
        }
    }
    None
}

// HttpOnly keeps the token away from scripts; SameSite=None + Secure is what
// credentialed cross-origin requests require.
fn session_cookie(token: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&format!(
        "{TOKEN_COOKIE}={token}; HttpOnly; Secure; SameSite=None; Path=/; Max-Age={TOKEN_TTL_SECS}"
    ))
    .map_err(ApiError::internal)
}

/// Session extraction: read the token cookie, verify it, attach the claims
/// to the request. No cookie is 401, a cookie that fails verification is
/// 403. Never touches the store.
async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = cookie_value(req.headers(), TOKEN_COOKIE).ok_or(ApiError::Unauthenticated)?;
    let claims = state
        .codec
        .verify(&token)
        .map_err(|_| ApiError::Forbidden)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Role gate: requires the session layer to have populated claims; absent
/// claims and role mismatches are both 403. Stateless, no I/O.
async fn require_role(
    required: Role,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    match req.extensions().get::<Claims>() {
        Some(claims) if role_allows(&required, &claims.role) => Ok(next.run(req).await),
        _ => Err(ApiError::Forbidden),
    }
}

/// Create the Axum router over a store and token codec.
pub fn create_router(storage: Storage, codec: TokenCodec) -> Router {
    let state = Arc::new(AppState { storage, codec });

    let owner_routes = Router::new()
        .route("/api/v1/create-house", post(create_house))
        .route("/api/v1/update-house/:id", patch(update_house))
        .route("/api/v1/delete-house/:id", delete(delete_house))
        .route_layer(middleware::from_fn(|req: Request<Body>, next: Next| {
            require_role(Role::HouseOwner, req, next)
        }));

    let session_routes = Router::new()
        .route("/api/v1/authenticated-user", get(authenticated_user))
        .route("/api/v1/houses", get(list_houses))
        .merge(owner_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .route("/", get(liveness))
        .route("/api/v1/user/register", post(register))
        .route("/api/v1/user/login", post(login))
        .merge(session_routes)
        .with_state(state)
}

async fn liveness() -> &'static str {
    "Server is running"
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let new_user = payload.into_new_user()?;
    let inserted_id = state.storage.insert_user(new_user.clone())?;
    info!(user = %inserted_id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            data: new_user,
        }),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    let mut missing = Vec::new();
    let email = require(payload.email, "email", &mut missing);
    let password = require(payload.password, "password", &mut missing);
    if !missing.is_empty() {
        return Err(ApiError::BadRequest(missing));
    }

    let user = state
        .storage
        .find_user_by_email(&email)?
        .ok_or(ApiError::NotFound("User not found"))?;

    // Plaintext comparison; known defect, see DESIGN.md.
    if user.password != password {
        return Err(ApiError::Unauthorized("Invalid password"));
    }

    let claims = Claims::new(user.id.clone(), user.email.clone(), user.role.clone());
    let token = state.codec.issue(&claims).map_err(ApiError::internal)?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, session_cookie(&token)?);
    info!(user = %user.id, "login successful");

    Ok((
        headers,
        Json(LoginResponse {
            message: "Login successful".to_string(),
            data: LoginData {
                user_id: user.id,
                full_name: user.full_name,
                email: user.email,
                role: user.role,
                token,
            },
        }),
    ))
}

async fn authenticated_user(Extension(claims): Extension<Claims>) -> Json<AuthenticatedUser> {
    Json(AuthenticatedUser { user: claims })
}

async fn create_house(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(fields): Json<HouseFields>,
) -> Result<Json<InsertResult>, ApiError> {
    let inserted_id = state.storage.insert_house(fields, &claims.user_id)?;
    info!(house = %inserted_id, owner = %claims.user_id, "house created");
    Ok(Json(InsertResult { inserted_id }))
}

async fn list_houses(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let houses = state.storage.houses_by_owner(&claims.user_id)?;
    Ok(Json(houses))
}

async fn update_house(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(fields): Json<HouseFields>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.storage.update_house(&id, &claims.user_id, &fields)?;
    Ok(Json(outcome))
}

async fn delete_house(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.storage.delete_house(&id, &claims.user_id)?;
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::PathBuf;
    use tower::ServiceExt; // For .oneshot() testing

    const SECRET: &str = "rest-test-secret";

    fn test_router(name: &str) -> (Router, PathBuf) {
        let temp_dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&temp_dir);
        let storage = Storage::open(temp_dir.to_str().unwrap()).expect("Storage for REST test");
        (test_router_with(storage), temp_dir)
    }

    fn test_router_with(storage: Storage) -> Router {
        create_router(storage, TokenCodec::new(SECRET))
    }

    fn json_request(method: &str, uri: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
            .body(Body::from(serde_json::to_vec(body).expect("serialize")))
            .expect("request")
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).expect("request")
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    }

    fn register_body(email: &str, role: &str) -> Value {
        json!({
            "fullName": "Jane Owner",
            "role": role,
            "phoneNumber": "+8801700000000",
            "email": email,
            "password": "secret",
        })
    }

    fn house_body(rent: f64) -> Value {
        json!({
            "name": "Lakeside Duplex",
            "address": "12 Lake Road",
            "city": "Dhaka",
            "bedrooms": 3,
            "bathrooms": 2,
            "room_size": "1200 sqft",
            "picture": "https://example.com/house.jpg",
            "availability_date": "2026-09-01",
            "rent_per_month": rent,
            "phone_number": "+8801700000000",
            "description": "South facing, near the market",
        })
    }

    /// Register + login, returning the `token=...` cookie pair to send back.
    async fn login_cookie(app: &Router, email: &str, role: &str) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/user/register",
                &register_body(email, role),
                None,
            ))
            .await
            .expect("register request");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/user/login",
                &json!({ "email": email, "password": "secret" }),
                None,
            ))
            .await
            .expect("login request");
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("no Set-Cookie on login")
            .to_str()
            .expect("cookie header")
            .to_string();
        assert!(set_cookie.contains("HttpOnly"));
        set_cookie.split(';').next().expect("cookie pair").to_string()
    }

    #[tokio::test]
    async fn liveness_route_answers() {
        let (app, temp_dir) = test_router("hh_rest_liveness");

        let response = app
            .oneshot(get_request("/", None))
            .await
            .expect("liveness request");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        assert_eq!(&bytes[..], b"Server is running");

        let _ = fs::remove_dir_all(temp_dir);
    }

    #[tokio::test]
    async fn register_echoes_submitted_data() {
        let (app, temp_dir) = test_router("hh_rest_register");

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/user/register",
                &register_body("owner@example.com", "house owner"),
                None,
            ))
            .await
            .expect("register request");
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["message"], "User registered successfully");
        assert_eq!(body["data"]["fullName"], "Jane Owner");
        assert_eq!(body["data"]["role"], "house owner");
        assert_eq!(body["data"]["email"], "owner@example.com");

        let _ = fs::remove_dir_all(temp_dir);
    }

    #[tokio::test]
    async fn register_rejects_missing_field_by_name() {
        let (app, temp_dir) = test_router("hh_rest_register_missing");

        let mut body = register_body("owner@example.com", "house owner");
        body.as_object_mut().unwrap().remove("phoneNumber");

        let response = app
            .oneshot(json_request("POST", "/api/v1/user/register", &body, None))
            .await
            .expect("register request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        let message = body["message"].as_str().expect("message");
        assert!(message.contains("phoneNumber"));

        let _ = fs::remove_dir_all(temp_dir);
    }

    #[tokio::test]
    async fn login_distinguishes_unknown_user_and_bad_password() {
        let (app, temp_dir) = test_router("hh_rest_login_failures");

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/user/login",
                &json!({ "email": "nobody@example.com", "password": "secret" }),
                None,
            ))
            .await
            .expect("login request");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "User not found");

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/user/register",
                &register_body("owner@example.com", "house owner"),
                None,
            ))
            .await
            .expect("register request");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/user/login",
                &json!({ "email": "owner@example.com", "password": "wrong" }),
                None,
            ))
            .await
            .expect("login request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Invalid password");

        let _ = fs::remove_dir_all(temp_dir);
    }

    #[tokio::test]
    async fn login_sets_cookie_and_returns_claims_with_token() {
        let (app, temp_dir) = test_router("hh_rest_login_ok");

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/user/register",
                &register_body("owner@example.com", "house owner"),
                None,
            ))
            .await
            .expect("register request");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/user/login",
                &json!({ "email": "owner@example.com", "password": "secret" }),
                None,
            ))
            .await
            .expect("login request");
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("no Set-Cookie")
            .to_str()
            .expect("cookie header")
            .to_string();
        assert!(set_cookie.starts_with("token="));
        assert!(set_cookie.contains("HttpOnly"));

        let body = body_json(response).await;
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["data"]["email"], "owner@example.com");
        assert_eq!(body["data"]["role"], "house owner");
        assert!(!body["data"]["userId"].as_str().unwrap().is_empty());
        assert!(!body["data"]["token"].as_str().unwrap().is_empty());

        let _ = fs::remove_dir_all(temp_dir);
    }

    #[tokio::test]
    async fn session_extraction_rejects_missing_and_invalid_tokens() {
        let (app, temp_dir) = test_router("hh_rest_session");

        // No cookie at all.
        let response = app
            .clone()
            .oneshot(get_request("/api/v1/authenticated-user", None))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Cookie present but not a token.
        let response = app
            .clone()
            .oneshot(get_request("/api/v1/authenticated-user", Some("token=garbage")))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Syntactically valid token signed with the wrong secret.
        let forged = TokenCodec::new("some-other-secret")
            .issue(&Claims::new(
                "user-1".to_string(),
                "owner@example.com".to_string(),
                Role::HouseOwner,
            ))
            .expect("issue");
        let response = app
            .clone()
            .oneshot(get_request(
                "/api/v1/authenticated-user",
                Some(&format!("token={forged}")),
            ))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // A real session gets its claims echoed back.
        let cookie = login_cookie(&app, "owner@example.com", "house owner").await;
        let response = app
            .oneshot(get_request("/api/v1/authenticated-user", Some(&cookie)))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user"]["email"], "owner@example.com");
        assert_eq!(body["user"]["role"], "house owner");

        let _ = fs::remove_dir_all(temp_dir);
    }

    #[tokio::test]
    async fn role_gate_rejects_non_owners() {
        let (app, temp_dir) = test_router("hh_rest_role_gate");

        let cookie = login_cookie(&app, "tenant@example.com", "tenant").await;
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/create-house",
                &house_body(15000.0),
                Some(&cookie),
            ))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let _ = fs::remove_dir_all(temp_dir);
    }

    #[tokio::test]
    async fn mutations_are_scoped_to_the_owning_session() {
        let (app, temp_dir) = test_router("hh_rest_ownership");

        let cookie_a = login_cookie(&app, "owner-a@example.com", "house owner").await;
        let cookie_b = login_cookie(&app, "owner-b@example.com", "house owner").await;

        // A creates a house.
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/create-house",
                &house_body(15000.0),
                Some(&cookie_a),
            ))
            .await
            .expect("create request");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let house_id = body["insertedId"].as_str().expect("insertedId").to_string();

        // Listing is owner-scoped.
        let response = app
            .clone()
            .oneshot(get_request("/api/v1/houses", Some(&cookie_a)))
            .await
            .expect("list request");
        let houses = body_json(response).await;
        assert_eq!(houses.as_array().unwrap().len(), 1);
        let response = app
            .clone()
            .oneshot(get_request("/api/v1/houses", Some(&cookie_b)))
            .await
            .expect("list request");
        assert!(body_json(response).await.as_array().unwrap().is_empty());

        // B's update silently matches nothing.
        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/v1/update-house/{house_id}"),
                &house_body(18000.0),
                Some(&cookie_b),
            ))
            .await
            .expect("update request");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["matchedCount"], 0);
        assert_eq!(body["modifiedCount"], 0);

        // A's update modifies exactly one.
        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/v1/update-house/{house_id}"),
                &house_body(18000.0),
                Some(&cookie_a),
            ))
            .await
            .expect("update request");
        let body = body_json(response).await;
        assert_eq!(body["matchedCount"], 1);
        assert_eq!(body["modifiedCount"], 1);

        // Same story for delete.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/delete-house/{house_id}"))
                    .header(header::COOKIE, &cookie_b)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("delete request");
        assert_eq!(body_json(response).await["deletedCount"], 0);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/delete-house/{house_id}"))
                    .header(header::COOKIE, &cookie_a)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("delete request");
        assert_eq!(body_json(response).await["deletedCount"], 1);

        let _ = fs::remove_dir_all(temp_dir);
    }
}
