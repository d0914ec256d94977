//! Registration and login endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use super::{AppState, present};
use crate::auth::{self, DEFAULT_ROLE};
use crate::error::DatabaseError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/register
pub async fn register(State(state): State<AppState>, Json(req): Json<RegisterRequest>) -> Response {
    if !(present(&req.name) && present(&req.email) && present(&req.password)) {
        return message_response(StatusCode::BAD_REQUEST, "All fields are required");
    }
    let name = req.name.unwrap_or_default();
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    if !state.email_format.is_match(&email) {
        return message_response(StatusCode::BAD_REQUEST, "Invalid email address");
    }

    match state.db.get_user_by_email(&email).await {
        Ok(Some(_)) => return message_response(StatusCode::BAD_REQUEST, "User already exists"),
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "User lookup failed");
            return server_error();
        }
    }

    let password_hash = auth::hash_password(&password);
    match state
        .db
        .insert_user(&name, &email, &password_hash, DEFAULT_ROLE)
        .await
    {
        Ok(user) => {
            info!(user_id = %user.id, "User registered");
            Json(json!({ "message": "User registered successfully" })).into_response()
        }
        // Lost a race with a concurrent registration for the same email.
        Err(DatabaseError::Constraint(_)) => {
            message_response(StatusCode::BAD_REQUEST, "User already exists")
        }
        Err(e) => {
            error!(error = %e, "User insert failed");
            server_error()
        }
    }
}

/// POST /api/login
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    if !(present(&req.email) && present(&req.password)) {
        return message_response(StatusCode::BAD_REQUEST, "All fields are required");
    }
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let user = match state.db.get_user_by_email(&email).await {
        Ok(Some(user)) => user,
        // Unknown email reports the same way as a wrong password.
        Ok(None) => return message_response(StatusCode::BAD_REQUEST, "Invalid credentials"),
        Err(e) => {
            error!(error = %e, "User lookup failed");
            return server_error();
        }
    };

    if !auth::verify_password(&password, &user.password_hash) {
        return message_response(StatusCode::BAD_REQUEST, "Invalid credentials");
    }

    let issued = auth::issue_token(state.session_ttl_secs);
    if let Err(e) = state
        .db
        .insert_session(&issued.token_hash, &user.id, &user.role, issued.expires_at)
        .await
    {
        error!(error = %e, "Session insert failed");
        return server_error();
    }

    info!(user_id = %user.id, "User logged in");
    Json(json!({
        "token": issued.token,
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "role": user.role,
        },
    }))
    .into_response()
}

fn message_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn server_error() -> Response {
    message_response(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
}
