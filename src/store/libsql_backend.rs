//! libSQL backend — async `Database` trait implementation.
//!
//! Supports local file and in-memory databases. A single connection is
//! reused for all operations; `libsql::Connection` is `Send + Sync` and
//! safe for concurrent async use.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{
    Database, DispatchState, NewSubmission, SessionRecord, SubmissionRecord, UserRecord,
};

/// libSQL database backend.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Connection(format!("Failed to open database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        info!(path = %path.display(), "Database opened");

        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;

        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn dispatch_to_str(state: DispatchState) -> &'static str {
    match state {
        DispatchState::Pending => "pending",
        DispatchState::Sent => "sent",
        DispatchState::Failed => "failed",
    }
}

fn str_to_dispatch(s: &str) -> DispatchState {
    match s {
        "sent" => DispatchState::Sent,
        "failed" => DispatchState::Failed,
        _ => DispatchState::Pending,
    }
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

/// Classify an insert failure: UNIQUE violations become `Constraint`.
fn insert_error(context: &str, e: libsql::Error) -> DatabaseError {
    let text = e.to_string();
    if text.contains("UNIQUE") {
        DatabaseError::Constraint(format!("{context}: {text}"))
    } else {
        DatabaseError::Query(format!("{context}: {text}"))
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

const SUBMISSION_COLUMNS: &str = "id, name, email, organisation, category, message, stakeholder, \
     domain, complexity, routed_to, routing_reason, dispatch_state, created_at";

/// Map a libsql Row to a UserRecord. Column order matches USER_COLUMNS.
fn row_to_user(row: &libsql::Row) -> Result<UserRecord, libsql::Error> {
    let created_str: String = row.get(5)?;
    let updated_str: String = row.get(6)?;
    Ok(UserRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

/// Map a libsql Row to a SubmissionRecord. Column order matches SUBMISSION_COLUMNS.
fn row_to_submission(row: &libsql::Row) -> Result<SubmissionRecord, libsql::Error> {
    let dispatch_str: String = row.get(11)?;
    let created_str: String = row.get(12)?;
    Ok(SubmissionRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        organisation: row.get(3).ok(),
        category: row.get(4).ok(),
        message: row.get(5)?,
        stakeholder: row.get(6).ok(),
        domain: row.get(7).ok(),
        complexity: row.get(8).ok(),
        routed_to: row.get(9)?,
        routing_reason: row.get(10)?,
        dispatch_state: str_to_dispatch(&dispatch_str),
        created_at: parse_datetime(&created_str),
    })
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl Database for LibSqlBackend {
    // ── Users ───────────────────────────────────────────────────────

    async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<UserRecord, DatabaseError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        self.conn()
            .execute(
                "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id.clone(),
                    name,
                    email,
                    password_hash,
                    role,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| insert_error("insert_user", e))?;

        debug!(user_id = %id, "User inserted");
        Ok(UserRecord {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role: role.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_user_by_email: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let user = row_to_user(&row)
                    .map_err(|e| DatabaseError::Query(format!("get_user_by_email row: {e}")))?;
                Ok(Some(user))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_user_by_email: {e}"))),
        }
    }

    // ── Sessions ────────────────────────────────────────────────────

    async fn insert_session(
        &self,
        token_hash: &str,
        user_id: &str,
        role: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO sessions (token_hash, user_id, role, expires_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    token_hash,
                    user_id,
                    role,
                    expires_at.to_rfc3339(),
                    Utc::now().to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| insert_error("insert_session", e))?;

        debug!(user_id = %user_id, "Session recorded");
        Ok(())
    }

    async fn get_session(&self, token_hash: &str) -> Result<Option<SessionRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT token_hash, user_id, role, expires_at, created_at
                 FROM sessions WHERE token_hash = ?1",
                params![token_hash],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_session: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let expires_str: String = row
                    .get(3)
                    .map_err(|e| DatabaseError::Query(format!("get_session row: {e}")))?;
                let created_str: String = row
                    .get(4)
                    .map_err(|e| DatabaseError::Query(format!("get_session row: {e}")))?;
                Ok(Some(SessionRecord {
                    token_hash: row
                        .get(0)
                        .map_err(|e| DatabaseError::Query(format!("get_session row: {e}")))?,
                    user_id: row
                        .get(1)
                        .map_err(|e| DatabaseError::Query(format!("get_session row: {e}")))?,
                    role: row
                        .get(2)
                        .map_err(|e| DatabaseError::Query(format!("get_session row: {e}")))?,
                    expires_at: parse_datetime(&expires_str),
                    created_at: parse_datetime(&created_str),
                }))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_session: {e}"))),
        }
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, DatabaseError> {
        let deleted = self
            .conn()
            .execute(
                "DELETE FROM sessions WHERE expires_at <= ?1",
                params![now.to_rfc3339()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_expired_sessions: {e}")))?;

        if deleted > 0 {
            debug!(count = deleted, "Expired sessions pruned");
        }
        Ok(deleted as usize)
    }

    // ── Submissions ─────────────────────────────────────────────────

    async fn insert_submission(
        &self,
        submission: &NewSubmission,
    ) -> Result<String, DatabaseError> {
        let id = Uuid::new_v4().to_string();

        self.conn()
            .execute(
                &format!(
                    "INSERT INTO submissions ({SUBMISSION_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
                ),
                params![
                    id.clone(),
                    submission.name.as_str(),
                    submission.email.as_str(),
                    opt_text(submission.organisation.as_deref()),
                    opt_text(submission.category.as_deref()),
                    submission.message.as_str(),
                    opt_text(submission.stakeholder.as_deref()),
                    opt_text(submission.domain.as_deref()),
                    opt_text(submission.complexity.as_deref()),
                    submission.routed_to.as_str(),
                    submission.routing_reason.as_str(),
                    dispatch_to_str(DispatchState::Pending),
                    Utc::now().to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| insert_error("insert_submission", e))?;

        debug!(submission_id = %id, routed_to = %submission.routed_to, "Submission recorded");
        Ok(id)
    }

    async fn set_submission_dispatch(
        &self,
        id: &str,
        state: DispatchState,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE submissions SET dispatch_state = ?1 WHERE id = ?2",
                params![dispatch_to_str(state), id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("set_submission_dispatch: {e}")))?;
        Ok(())
    }

    async fn recent_submissions(
        &self,
        limit: usize,
    ) -> Result<Vec<SubmissionRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SUBMISSION_COLUMNS} FROM submissions
                     ORDER BY created_at DESC LIMIT ?1"
                ),
                params![limit as i64],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("recent_submissions: {e}")))?;

        let mut submissions = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let record = row_to_submission(&row)
                .map_err(|e| DatabaseError::Query(format!("recent_submissions row: {e}")))?;
            submissions.push(record);
        }
        Ok(submissions)
    }
}
