//! Database access layer
//!
//! Plain async functions over `&PgPool`. Reads return `BoxError`; writes that
//! can hit a business constraint (unique slug, restricted delete) return
//! `ServiceResult` so the constraint surfaces as a typed error.

pub mod categories;
pub mod content;
pub mod orders;
pub mod reviews;
pub mod users;
pub mod webhook_events;

pub use crate::error::BoxError;

/// True when the error is a foreign-key violation (SQLSTATE 23503)
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}
