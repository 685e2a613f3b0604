//! Data models
//!
//! Shared between the server and the frontend (via API, camelCase JSON).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are UUIDs.

pub mod category;
pub mod content_item;
pub mod order;
pub mod review;
pub mod user;

// Re-exports
pub use category::*;
pub use content_item::*;
pub use order::*;
pub use review::*;
pub use user::*;
