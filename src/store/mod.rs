//! Persistence layer — SQLite-backed storage for users, sessions, and
//! routed submissions.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{
    Database, DispatchState, NewSubmission, SessionRecord, SubmissionRecord, UserRecord,
};
