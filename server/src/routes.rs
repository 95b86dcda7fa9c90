use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{CurrentUser, LoginInput, SignupInput};
use crate::errors::AccountError;
use crate::state::AppState;

/// Build the application router with all routes
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Account routes
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        // The catalog UI is served from a different origin
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

// Missing fields default to empty strings so the account service can
// answer with its own validation messages instead of a deserialization
// rejection.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "displayName")]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
struct SignupResponse {
    success: bool,
    message: &'static str,
    token: String,
}

#[derive(Serialize)]
struct LoginResponse {
    success: bool,
    message: &'static str,
    token: String,
    identifier: String,
    #[serde(rename = "displayName")]
    display_name: String,
}

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Response, AccountError> {
    let issued = state
        .accounts
        .signup(SignupInput {
            identifier: req.identifier,
            password: req.password,
            display_name: req.display_name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            success: true,
            message: "User registered successfully",
            token: issued.token,
        }),
    )
        .into_response())
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AccountError> {
    let issued = state
        .accounts
        .login(LoginInput {
            identifier: req.identifier,
            password: req.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful",
        token: issued.token,
        identifier: issued.identifier,
        display_name: issued.display_name,
    })
    .into_response())
}

/// Echo the claims of a valid bearer token back to its holder
async fn me(user: CurrentUser) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "identifier": user.identifier,
        "displayName": user.display_name,
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Server is running",
        "database": "connected",
    }))
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Route not found" })),
    )
        .into_response()
}
