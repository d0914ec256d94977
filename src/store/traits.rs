//! Backend-agnostic `Database` trait — single async interface for all
//! persistence: users, login sessions, and routed submissions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DatabaseError;

/// A registered user.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A live login session. Only the hash of the bearer token is stored.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub token_hash: String,
    pub user_id: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of the email dispatch for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Recorded, email not yet attempted.
    Pending,
    /// Dispatch email sent.
    Sent,
    /// Dispatch email failed.
    Failed,
}

/// A routed contact submission, ready to persist.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub name: String,
    pub email: String,
    pub organisation: Option<String>,
    pub category: Option<String>,
    pub message: String,
    pub stakeholder: Option<String>,
    pub domain: Option<String>,
    pub complexity: Option<String>,
    pub routed_to: String,
    pub routing_reason: String,
}

/// A persisted contact submission with its routing outcome.
#[derive(Debug, Clone)]
pub struct SubmissionRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub organisation: Option<String>,
    pub category: Option<String>,
    pub message: String,
    pub stakeholder: Option<String>,
    pub domain: Option<String>,
    pub complexity: Option<String>,
    pub routed_to: String,
    pub routing_reason: String,
    pub dispatch_state: DispatchState,
    pub created_at: DateTime<Utc>,
}

/// Backend-agnostic database trait covering users, sessions, and submissions.
#[async_trait]
pub trait Database: Send + Sync {
    // ── Users ───────────────────────────────────────────────────────

    /// Insert a new user. Fails with `DatabaseError::Constraint` if the
    /// email is already registered.
    async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<UserRecord, DatabaseError>;

    /// Look up a user by email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError>;

    // ── Sessions ────────────────────────────────────────────────────

    /// Record a new login session.
    async fn insert_session(
        &self,
        token_hash: &str,
        user_id: &str,
        role: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError>;

    /// Look up a session by token hash. Returns expired sessions too;
    /// expiry is the caller's check.
    async fn get_session(&self, token_hash: &str) -> Result<Option<SessionRecord>, DatabaseError>;

    /// Delete all sessions that expired at or before `now`.
    /// Returns the number of sessions removed.
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, DatabaseError>;

    // ── Submissions ─────────────────────────────────────────────────

    /// Persist a routed submission. Returns the generated ID.
    async fn insert_submission(&self, submission: &NewSubmission)
    -> Result<String, DatabaseError>;

    /// Record the dispatch outcome for a submission.
    async fn set_submission_dispatch(
        &self,
        id: &str,
        state: DispatchState,
    ) -> Result<(), DatabaseError>;

    /// Most recent submissions, newest first, up to `limit`.
    async fn recent_submissions(&self, limit: usize)
    -> Result<Vec<SubmissionRecord>, DatabaseError>;
}
