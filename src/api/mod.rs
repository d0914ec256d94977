//! HTTP surface — Axum router, shared state, and liveness endpoints.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use regex::Regex;
use tower_http::cors::CorsLayer;

use crate::mail::Mailer;
use crate::store::Database;

pub mod auth;
pub mod contact;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub mailer: Arc<dyn Mailer>,
    /// Lifetime of issued login tokens, in seconds.
    pub session_ttl_secs: u64,
    /// Shape check applied to registration emails.
    pub email_format: Regex,
}

impl AppState {
    pub fn new(db: Arc<dyn Database>, mailer: Arc<dyn Mailer>, session_ttl_secs: u64) -> Self {
        Self {
            db,
            mailer,
            session_ttl_secs,
            email_format: Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap(),
        }
    }
}

/// Build the Axum router for the full API surface.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/contact", post(contact::submit_contact))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/submissions", get(contact::list_submissions))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Whether an optional request field is present and non-empty.
pub(crate) fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.is_empty())
}

async fn root() -> &'static str {
    "Backend is running successfully 🚀"
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "inquiry-router"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::mail::RecordingMailer;
    use crate::store::LibSqlBackend;

    async fn test_state() -> AppState {
        let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        AppState::new(db, Arc::new(RecordingMailer::default()), 3600)
    }

    #[tokio::test]
    async fn root_reports_running() {
        let app = routes(test_state().await);
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("Backend is running successfully"));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = routes(test_state().await);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "inquiry-router");
    }

    #[test]
    fn present_rejects_missing_and_empty() {
        assert!(present(&Some("x".into())));
        assert!(!present(&Some(String::new())));
        assert!(!present(&None));
    }

    #[tokio::test]
    async fn email_format_accepts_plausible_addresses() {
        let re = test_state().await.email_format;
        assert!(re.is_match("alice@example.com"));
        assert!(re.is_match("a.b+c@sub.example.org"));
        assert!(!re.is_match("not-an-email"));
        assert!(!re.is_match("a@b"));
        assert!(!re.is_match("a b@example.com"));
    }
}
