//! Shared types for the storefront
//!
//! Domain models, the unified error system and the cart pricing
//! calculator, used by the server and mirrored by the frontend.

pub mod cart;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
