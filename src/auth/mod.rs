//! Registration/login support: password hashing, token issuance, and
//! bearer-token verification against stored sessions.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{IssuedToken, issue_token, token_hash};

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use chrono::Utc;
use tracing::debug;

use crate::error::AuthError;
use crate::store::Database;

/// Role assigned to newly registered users.
pub const DEFAULT_ROLE: &str = "client";

/// The authenticated identity attached to a request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub role: String,
}

/// Verify the `Authorization: Bearer <token>` header against stored
/// sessions.
///
/// A missing header and an unusable token are distinct failures because
/// the API reports them differently (401 vs 400).
pub async fn verify_bearer(
    db: &dyn Database,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = header.to_str().map_err(|_| AuthError::InvalidToken)?;
    let token = value.strip_prefix("Bearer ").ok_or(AuthError::InvalidToken)?;

    let hash = token::token_hash(token);
    let session = db.get_session(&hash).await?.ok_or(AuthError::InvalidToken)?;

    if session.expires_at <= Utc::now() {
        debug!(user_id = %session.user_id, "Rejected expired session token");
        // Sweep expired sessions while we're here.
        let _ = db.delete_expired_sessions(Utc::now()).await;
        return Err(AuthError::InvalidToken);
    }

    Ok(AuthContext {
        user_id: session.user_id,
        role: session.role,
    })
}
