//! Public contact endpoint and the operator submissions view.
//!
//! One handler serves every contact entry point: optional form fields
//! are just absent in the payload, and the routing classifier is invoked
//! exactly once per submission.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use super::{AppState, present};
use crate::error::AuthError;
use crate::mail::compose_contact_email;
use crate::routing::RoutingInput;
use crate::store::{DispatchState, NewSubmission};

/// Inbound contact-form payload. `name`, `email`, and `message` are
/// required; the rest are display/classification hints.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub organisation: Option<String>,
    pub category: Option<String>,
    pub message: Option<String>,
    pub stakeholder: Option<String>,
    pub domain: Option<String>,
    pub complexity: Option<String>,
}

/// POST /api/contact
///
/// Classifies the submission, records it, and dispatches the email.
/// A mail failure reports a bare `{"success": false}` — the caller is a
/// public form and gets no further detail.
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> Response {
    if !(present(&req.name) && present(&req.email) && present(&req.message)) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing required fields" })),
        )
            .into_response();
    }

    let input = RoutingInput {
        stakeholder: req.stakeholder.clone(),
        domain: req.domain.clone().unwrap_or_default(),
        complexity: req.complexity.clone().unwrap_or_default(),
    };
    let decision = input.classify();

    let submission = NewSubmission {
        name: req.name.unwrap_or_default(),
        email: req.email.unwrap_or_default(),
        organisation: req.organisation,
        category: req.category,
        message: req.message.unwrap_or_default(),
        stakeholder: req.stakeholder,
        domain: req.domain,
        complexity: req.complexity,
        routed_to: decision.target_entity.name().to_string(),
        routing_reason: decision.routing_reason.to_string(),
    };

    // Record the submission; a storage hiccup must not block dispatch.
    let submission_id = match state.db.insert_submission(&submission).await {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(error = %e, "Failed to record submission");
            None
        }
    };

    let mail = compose_contact_email(&submission);
    match state.mailer.send(&mail).await {
        Ok(()) => {
            record_dispatch(&state, submission_id.as_deref(), DispatchState::Sent).await;
            Json(json!({
                "success": true,
                "routedTo": submission.routed_to,
                "reason": submission.routing_reason,
            }))
            .into_response()
        }
        Err(e) => {
            error!(error = %e, routed_to = %submission.routed_to, "Contact dispatch failed");
            record_dispatch(&state, submission_id.as_deref(), DispatchState::Failed).await;
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false })),
            )
                .into_response()
        }
    }
}

async fn record_dispatch(state: &AppState, submission_id: Option<&str>, outcome: DispatchState) {
    if let Some(id) = submission_id
        && let Err(e) = state.db.set_submission_dispatch(id, outcome).await
    {
        warn!(error = %e, submission_id = %id, "Failed to record dispatch outcome");
    }
}

// ── Operator view ───────────────────────────────────────────────────

/// How many submissions the operator listing returns.
const SUBMISSION_PAGE: usize = 50;

/// A routed submission as shown to operators.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub organisation: Option<String>,
    pub category: Option<String>,
    pub stakeholder: Option<String>,
    pub domain: Option<String>,
    pub complexity: Option<String>,
    pub routed_to: String,
    pub reason: String,
    pub dispatch_state: &'static str,
    pub created_at: DateTime<Utc>,
}

/// GET /api/submissions (bearer-protected)
pub async fn list_submissions(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match crate::auth::verify_bearer(state.db.as_ref(), &headers).await {
        Ok(_ctx) => {}
        Err(AuthError::MissingToken) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Access denied. No token provided." })),
            )
                .into_response();
        }
        Err(AuthError::Database(e)) => {
            error!(error = %e, "Session lookup failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Server error" })),
            )
                .into_response();
        }
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Invalid token" })),
            )
                .into_response();
        }
    }

    match state.db.recent_submissions(SUBMISSION_PAGE).await {
        Ok(submissions) => {
            let views: Vec<SubmissionView> = submissions
                .into_iter()
                .map(|s| SubmissionView {
                    id: s.id,
                    name: s.name,
                    email: s.email,
                    organisation: s.organisation,
                    category: s.category,
                    stakeholder: s.stakeholder,
                    domain: s.domain,
                    complexity: s.complexity,
                    routed_to: s.routed_to,
                    reason: s.routing_reason,
                    dispatch_state: dispatch_label(s.dispatch_state),
                    created_at: s.created_at,
                })
                .collect();
            Json(views).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list submissions");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Server error" })),
            )
                .into_response()
        }
    }
}

fn dispatch_label(state: DispatchState) -> &'static str {
    match state {
        DispatchState::Pending => "pending",
        DispatchState::Sent => "sent",
        DispatchState::Failed => "failed",
    }
}
