//! Admin endpoints (JWT role `admin`, enforced by `require_admin`)

pub mod categories;
pub mod content;
pub mod orders;
pub mod reviews;
